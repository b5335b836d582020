//! Accounts and the calendars they contribute to an aggregation.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{FigoroError, FigoroResult};
use crate::source::Source;

const MIN_ACCOUNT_NAME_LEN: usize = 3;

/// Calendar selection for one account, as stored in the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Calendars {
    /// Every calendar id known for the account (refreshed by `sync account`)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub all: Vec<String>,
    /// When non-empty, exactly these calendars are used
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub whitelist: Vec<String>,
    /// Removed from `all` when no whitelist is set
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blacklist: Vec<String>,
}

impl Calendars {
    /// Calendars to fetch: the whitelist if set, otherwise `all` minus the blacklist.
    ///
    /// Each id appears once, in sorted order.
    pub fn resolve(&self) -> Vec<String> {
        if !self.whitelist.is_empty() {
            return Self::subtract(&self.whitelist, &[]);
        }
        Self::subtract(&self.all, &self.blacklist)
    }

    fn subtract(all: &[String], blacklist: &[String]) -> Vec<String> {
        let all: BTreeSet<&String> = all.iter().collect();
        let blacklist: BTreeSet<&String> = blacklist.iter().collect();
        all.difference(&blacklist).map(|id| id.to_string()).collect()
    }
}

/// A named account bound to the source that answers for it.
#[derive(Clone)]
pub struct Account {
    pub name: String,
    pub calendars: Calendars,
    source: Arc<dyn Source>,
}

impl Account {
    pub fn new(name: &str, calendars: Calendars, source: Arc<dyn Source>) -> Self {
        Account {
            name: name.to_string(),
            calendars,
            source,
        }
    }

    pub fn source(&self) -> Arc<dyn Source> {
        Arc::clone(&self.source)
    }

    /// Calendar ids to fan out over for this account.
    ///
    /// When neither a whitelist nor a known calendar list is configured, the
    /// source is asked for its calendars (the blacklist still applies).
    pub async fn resolve_calendars(&self) -> FigoroResult<Vec<String>> {
        if !self.calendars.whitelist.is_empty() || !self.calendars.all.is_empty() {
            return Ok(self.calendars.resolve());
        }

        let all = self
            .source
            .calendars()
            .await
            .map_err(|e| FigoroError::Enumeration {
                account: self.name.clone(),
                source: Box::new(e),
            })?;

        Ok(Calendars::subtract(&all, &self.calendars.blacklist))
    }

    /// Replace the known calendar list with what the source reports now.
    pub async fn sync_calendars(&mut self) -> FigoroResult<()> {
        let all = self.source.calendars().await.map_err(|e| FigoroError::Enumeration {
            account: self.name.clone(),
            source: Box::new(e),
        })?;
        tracing::debug!(account = %self.name, count = all.len(), "synced calendars");
        self.calendars.all = all;
        Ok(())
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Account")
            .field("name", &self.name)
            .field("calendars", &self.calendars)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

pub fn validate_account_name(name: &str) -> FigoroResult<()> {
    if name.is_empty() {
        return Err(FigoroError::InvalidAccountName(
            "account name cannot be empty".into(),
        ));
    }
    if name.chars().count() < MIN_ACCOUNT_NAME_LEN {
        return Err(FigoroError::InvalidAccountName(format!(
            "'{}' is shorter than {} characters",
            name, MIN_ACCOUNT_NAME_LEN
        )));
    }
    Ok(())
}
