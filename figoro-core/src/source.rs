//! The capability an account needs to take part in an aggregation.

use async_trait::async_trait;

use crate::error::FigoroResult;
use crate::event::Event;
use crate::filter::EventsFilter;

/// An already-authenticated connection to one account.
///
/// Implementations are called concurrently, once per calendar, and must not
/// rely on shared mutable state between those calls. Transport or auth
/// failures are reported as errors, never as a partial list.
#[async_trait]
pub trait Source: Send + Sync {
    /// Events of one calendar matching `filter`.
    async fn events(&self, calendar_id: &str, filter: &EventsFilter) -> FigoroResult<Vec<Event>>;

    /// Ids of every calendar the account can see.
    async fn calendars(&self) -> FigoroResult<Vec<String>>;
}
