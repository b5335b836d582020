//! Per-account configuration.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::account::{Account, Calendars};
use crate::remote::RemoteAccount;
use crate::remote::provider::Provider;

fn default_provider() -> String {
    "google".to_string()
}

/// One `[[accounts]]` entry of the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountConfig {
    /// Also the identifier handed to the provider (e.g., an email address)
    pub name: String,

    #[serde(default = "default_provider")]
    pub provider: String,

    /// Program and arguments to run instead of `figoro-provider-<provider>`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub provider_command: Vec<String>,

    #[serde(default)]
    pub calendars: Calendars,
}

impl AccountConfig {
    pub fn new(name: &str, provider: &str) -> Self {
        AccountConfig {
            name: name.to_string(),
            provider: provider.to_string(),
            provider_command: Vec::new(),
            calendars: Calendars::default(),
        }
    }

    pub fn provider(&self, timeout: Duration) -> Provider {
        let provider = Provider::from_name(&self.provider).with_timeout(timeout);
        match self.provider_command.split_first() {
            Some((program, args)) => provider.with_command(program, args.to_vec()),
            None => provider,
        }
    }

    /// Bind this entry to a provider-backed source.
    pub fn to_account(&self, timeout: Duration) -> Account {
        let remote = RemoteAccount::new(self.provider(timeout), &self.name);
        Account::new(&self.name, self.calendars.clone(), Arc::new(remote))
    }
}
