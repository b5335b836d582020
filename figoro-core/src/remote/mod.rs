pub mod protocol;
pub mod provider;

use async_trait::async_trait;

use crate::error::{FigoroError, FigoroResult};
use crate::event::Event;
use crate::filter::EventsFilter;
use crate::remote::protocol::{ListCalendars, ListEvents};
use crate::remote::provider::Provider;
use crate::source::Source;

/// A provider-backed account (e.g., one Google account).
#[derive(Debug, Clone)]
pub struct RemoteAccount {
    provider: Provider,
    account_identifier: String,
}

impl RemoteAccount {
    pub fn new(provider: Provider, account_identifier: &str) -> Self {
        RemoteAccount {
            provider,
            account_identifier: account_identifier.to_string(),
        }
    }
}

#[async_trait]
impl Source for RemoteAccount {
    async fn events(&self, calendar_id: &str, filter: &EventsFilter) -> FigoroResult<Vec<Event>> {
        self.provider
            .call(ListEvents {
                account_identifier: self.account_identifier.clone(),
                calendar_id: calendar_id.to_string(),
                filter: filter.clone(),
            })
            .await
            .map_err(|e| FigoroError::Fetch {
                account: self.account_identifier.clone(),
                calendar: calendar_id.to_string(),
                reason: e.to_string(),
            })
    }

    async fn calendars(&self) -> FigoroResult<Vec<String>> {
        let calendars = self
            .provider
            .call(ListCalendars {
                account_identifier: self.account_identifier.clone(),
            })
            .await?;

        Ok(calendars.into_iter().map(|c| c.id).collect())
    }
}
