mod commands;
mod render;

use anyhow::Result;
use clap::{Parser, Subcommand};
use figoro_core::config::FigoroConfig;
use tracing_subscriber::EnvFilter;

use commands::events::EventsArgs;

#[derive(Parser)]
#[command(name = "figoro")]
#[command(about = "List events from multiple calendar accounts, offering customizable filtering")]
struct Cli {
    /// Config file (default: ~/.config/figoro/config.toml)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Log level or filter directive (e.g. "debug", "figoro_core=trace")
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List events or configured accounts
    List {
        #[command(subcommand)]
        target: ListTarget,
    },
    /// Upcoming events grouped by day
    Agenda {
        /// Number of days to show, starting now
        #[arg(short, long, default_value_t = 3)]
        days: i64,

        /// Only use this account (repeatable)
        #[arg(short, long)]
        account: Vec<String>,

        /// Print JSON instead of the day-grouped view
        #[arg(long)]
        json: bool,
    },
    Add {
        #[command(subcommand)]
        target: AddTarget,
    },
    Delete {
        #[command(subcommand)]
        target: DeleteTarget,
    },
    /// Refresh the stored calendar list of an account
    Sync {
        #[command(subcommand)]
        target: SyncTarget,
    },
}

#[derive(Subcommand)]
enum ListTarget {
    Events(EventsArgs),
    Accounts,
}

#[derive(Subcommand)]
enum AddTarget {
    Account {
        name: String,

        /// Provider binary to use (figoro-provider-<provider>)
        #[arg(short, long, default_value = "google")]
        provider: String,

        /// Only aggregate these calendars (repeatable)
        #[arg(long = "calendar")]
        calendars: Vec<String>,
    },
}

#[derive(Subcommand)]
enum DeleteTarget {
    Account { name: String },
}

#[derive(Subcommand)]
enum SyncTarget {
    Account { name: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = match &cli.config {
        Some(path) => FigoroConfig::expand_path(path),
        None => FigoroConfig::default_path()?,
    };
    let config = FigoroConfig::load(&config_path)?;

    init_logging(cli.log_level.as_deref(), config.log_level.as_deref());
    tracing::debug!(path = %config_path.display(), accounts = config.accounts.len(), "loaded config");

    match cli.command {
        Commands::List { target } => match target {
            ListTarget::Events(args) => commands::events::list(&config, &args).await,
            ListTarget::Accounts => commands::accounts::list(&config),
        },
        Commands::Agenda {
            days,
            account,
            json,
        } => commands::events::agenda(&config, days, &account, json).await,
        Commands::Add {
            target:
                AddTarget::Account {
                    name,
                    provider,
                    calendars,
                },
        } => commands::accounts::add(config, &config_path, &name, &provider, calendars).await,
        Commands::Delete {
            target: DeleteTarget::Account { name },
        } => commands::accounts::delete(config, &config_path, &name),
        Commands::Sync {
            target: SyncTarget::Account { name },
        } => commands::accounts::sync(config, &config_path, &name).await,
    }
}

/// `--log-level` wins over `RUST_LOG`, which wins over the config file.
fn init_logging(cli_level: Option<&str>, config_level: Option<&str>) {
    let filter = match cli_level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config_level.unwrap_or("off"))),
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
