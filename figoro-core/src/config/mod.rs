//! figoro configuration at ~/.config/figoro/config.toml
//!
//! Values from the file can be overridden with `FIGORO_*` environment
//! variables (e.g. `FIGORO_PROVIDER_TIMEOUT_SECS=60`).

mod account_config;

pub use account_config::AccountConfig;

use std::path::{Path, PathBuf};
use std::time::Duration;

use ::config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::account::{Account, validate_account_name};
use crate::error::{FigoroError, FigoroResult};
use crate::remote::provider::DEFAULT_PROVIDER_TIMEOUT;

fn default_provider_timeout_secs() -> u64 {
    DEFAULT_PROVIDER_TIMEOUT.as_secs()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FigoroConfig {
    #[serde(default)]
    pub accounts: Vec<AccountConfig>,

    #[serde(default = "default_provider_timeout_secs")]
    pub provider_timeout_secs: u64,

    /// e.g. "debug", "info", "off"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

impl Default for FigoroConfig {
    fn default() -> Self {
        FigoroConfig {
            accounts: Vec::new(),
            provider_timeout_secs: default_provider_timeout_secs(),
            log_level: None,
        }
    }
}

impl FigoroConfig {
    pub fn default_path() -> FigoroResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| FigoroError::Config("Could not determine config directory".into()))?
            .join("figoro");

        Ok(config_dir.join("config.toml"))
    }

    /// Expand `~` in a user-supplied config path.
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).into_owned())
    }

    /// Load the config file, falling back to defaults when it doesn't exist.
    pub fn load(path: &Path) -> FigoroResult<Self> {
        Config::builder()
            .add_source(File::from(path).format(FileFormat::Toml).required(false))
            .add_source(Environment::with_prefix("FIGORO").try_parsing(true))
            .build()
            .map_err(|e| FigoroError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| FigoroError::Config(e.to_string()))
    }

    pub fn save(&self, path: &Path) -> FigoroResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                FigoroError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| FigoroError::Config(e.to_string()))?;

        std::fs::write(path, content)
            .map_err(|e| FigoroError::Config(format!("Could not write config file: {e}")))?;

        tracing::debug!(path = %path.display(), "saved config");
        Ok(())
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_secs)
    }

    pub fn account(&self, name: &str) -> Option<&AccountConfig> {
        self.accounts.iter().find(|a| a.name == name)
    }

    pub fn account_mut(&mut self, name: &str) -> Option<&mut AccountConfig> {
        self.accounts.iter_mut().find(|a| a.name == name)
    }

    pub fn add_account(&mut self, account: AccountConfig) -> FigoroResult<()> {
        validate_account_name(&account.name)?;
        if self.account(&account.name).is_some() {
            return Err(FigoroError::AccountExists(account.name));
        }
        self.accounts.push(account);
        Ok(())
    }

    pub fn remove_account(&mut self, name: &str) -> FigoroResult<AccountConfig> {
        let index = self
            .accounts
            .iter()
            .position(|a| a.name == name)
            .ok_or_else(|| FigoroError::AccountNotFound(name.to_string()))?;
        Ok(self.accounts.remove(index))
    }

    /// Accounts to aggregate over: all of them, or only those named.
    pub fn select_accounts(&self, names: &[String]) -> FigoroResult<Vec<Account>> {
        let timeout = self.provider_timeout();

        if names.is_empty() {
            return Ok(self
                .accounts
                .iter()
                .map(|a| a.to_account(timeout))
                .collect());
        }

        names
            .iter()
            .map(|name| {
                self.account(name)
                    .map(|a| a.to_account(timeout))
                    .ok_or_else(|| FigoroError::AccountNotFound(name.clone()))
            })
            .collect()
    }
}
