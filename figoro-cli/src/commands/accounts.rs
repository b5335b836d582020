use std::path::Path;

use anyhow::Result;
use figoro_core::FigoroError;
use figoro_core::account::validate_account_name;
use figoro_core::config::{AccountConfig, FigoroConfig};
use owo_colors::OwoColorize;

pub fn list(config: &FigoroConfig) -> Result<()> {
    if config.accounts.is_empty() {
        println!("{}", "No accounts configured".dimmed());
        return Ok(());
    }

    for account in &config.accounts {
        let provider = format!("({})", account.provider);
        println!("{} {}", account.name.bold(), provider.dimmed());
    }

    Ok(())
}

pub async fn add(
    mut config: FigoroConfig,
    config_path: &Path,
    name: &str,
    provider: &str,
    whitelist: Vec<String>,
) -> Result<()> {
    validate_account_name(name)?;
    if config.account(name).is_some() {
        return Err(FigoroError::AccountExists(name.to_string()).into());
    }

    let mut entry = AccountConfig::new(name, provider);
    entry.calendars.whitelist = whitelist;

    println!("Fetching calendars for {}...", name);
    let mut account = entry.to_account(config.provider_timeout());
    account.sync_calendars().await?;
    entry.calendars.all = account.calendars.all;

    println!("Found {} calendar(s):\n", entry.calendars.all.len());
    for calendar in &entry.calendars.all {
        println!("  {}", calendar);
    }

    config.add_account(entry)?;
    config.save(config_path)?;

    println!("\nAdded account {}. Run `figoro agenda` to see what's coming up.", name.bold());
    Ok(())
}

pub fn delete(mut config: FigoroConfig, config_path: &Path, name: &str) -> Result<()> {
    config.remove_account(name)?;
    config.save(config_path)?;

    println!("Deleted account {}", name.bold());
    Ok(())
}

pub async fn sync(mut config: FigoroConfig, config_path: &Path, name: &str) -> Result<()> {
    let timeout = config.provider_timeout();
    let entry = config
        .account_mut(name)
        .ok_or_else(|| FigoroError::AccountNotFound(name.to_string()))?;

    let mut account = entry.to_account(timeout);
    account.sync_calendars().await?;

    let before = entry.calendars.all.len();
    entry.calendars.all = account.calendars.all;
    let after = entry.calendars.all.len();

    config.save(config_path)?;

    println!(
        "Synced {}: {} calendar(s) {}",
        name.bold(),
        after,
        format!("(was {})", before).dimmed()
    );
    Ok(())
}
