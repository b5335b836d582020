//! One aggregation run over several accounts.
//!
//! Every (account, calendar) pair becomes one concurrent fetch. The run is
//! all-or-nothing: the first failing fetch aborts it and no partial list is
//! returned. Once every batch is in, events are merged, re-sorted according
//! to the filter and cut down to its result cap.

use std::sync::Arc;
use std::time::Instant;

use crate::account::Account;
use crate::concurrent::ConcurrentResult;
use crate::error::{FigoroError, FigoroResult};
use crate::event::{Event, cmp_start, cmp_updated};
use crate::filter::EventsFilter;

#[derive(Debug, Clone)]
pub struct CombinedAccount {
    accounts: Vec<Account>,
}

/// The unit of concurrent work.
struct CalendarFetch {
    account: Account,
    calendar_id: String,
}

impl CombinedAccount {
    pub fn new(accounts: Vec<Account>) -> Self {
        CombinedAccount { accounts }
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    fn account_names(&self) -> Vec<String> {
        self.accounts.iter().map(|a| a.name.clone()).collect()
    }

    /// Fetch, merge, order and cap events from every calendar of every account.
    pub async fn events(&self, filter: &EventsFilter) -> FigoroResult<Vec<Event>> {
        let started = Instant::now();

        tracing::debug!(accounts = self.accounts.len(), "enumerating calendars");
        let fetches = self.enumerate().await?;
        if fetches.is_empty() {
            tracing::debug!("no calendars to fetch");
            return Ok(Vec::new());
        }

        tracing::debug!(fetches = fetches.len(), "fetching events");
        let filter = Arc::new(filter.clone());
        let batches = self.fetch_all(fetches, &filter).await.map_err(|e| {
            FigoroError::Aggregation {
                accounts: self.account_names(),
                source: Box::new(e),
            }
        })?;

        tracing::debug!(batches = batches.len(), "merging events");
        let events = merge(batches, &filter);

        tracing::debug!(
            events = events.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "aggregation finished"
        );
        Ok(events)
    }

    async fn enumerate(&self) -> FigoroResult<Vec<CalendarFetch>> {
        let mut fetches = Vec::new();
        for account in &self.accounts {
            let calendars = account.resolve_calendars().await?;
            tracing::trace!(account = %account.name, calendars = ?calendars, "resolved calendars");
            fetches.extend(calendars.into_iter().map(|calendar_id| CalendarFetch {
                account: account.clone(),
                calendar_id,
            }));
        }
        Ok(fetches)
    }

    async fn fetch_all(
        &self,
        fetches: Vec<CalendarFetch>,
        filter: &Arc<EventsFilter>,
    ) -> FigoroResult<Vec<Vec<Event>>> {
        let coordinator: ConcurrentResult<Vec<Event>> = ConcurrentResult::new(fetches.len());

        for CalendarFetch {
            account,
            calendar_id,
        } in fetches
        {
            let filter = Arc::clone(filter);
            coordinator.spawn(async move {
                let source = account.source();
                let events = source.events(&calendar_id, &filter).await?;
                tracing::trace!(
                    account = %account.name,
                    calendar = %calendar_id,
                    events = events.len(),
                    "fetched calendar"
                );
                let events: Vec<Event> = events
                    .into_iter()
                    .map(|event| event.with_origin(&account.name, &calendar_id))
                    .collect();
                Ok::<_, FigoroError>(events)
            });
        }

        coordinator.results().await
    }
}

/// Flatten batches, then apply the filter's ordering and result cap.
pub fn merge(batches: Vec<Vec<Event>>, filter: &EventsFilter) -> Vec<Event> {
    let mut events: Vec<Event> = batches.into_iter().flatten().collect();

    if filter.is_ordered_by_start_time() {
        events.sort_by(cmp_start);
    } else if filter.is_ordered_by_updated() {
        events.sort_by(cmp_updated);
    }

    if let Some(cap) = filter.result_cap() {
        // No-op when the cap exceeds the number of events
        events.truncate(usize::try_from(cap).unwrap_or(usize::MAX));
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventStart;
    use crate::filter::OrderBy;

    fn event(id: &str, start: EventStart, updated: Option<&str>) -> Event {
        Event {
            id: id.to_string(),
            summary: id.to_string(),
            description: None,
            location: None,
            account: None,
            calendar_id: None,
            start,
            end: None,
            status: Default::default(),
            event_type: None,
            updated: updated.map(|u| u.parse().unwrap()),
            html_link: None,
        }
    }

    fn ids(events: &[Event]) -> Vec<&str> {
        events.iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn start_order_mixes_dates_and_instants_as_strings() {
        let batches = vec![
            vec![event("late", EventStart::at("2024-01-02T09:00:00Z"), None)],
            vec![
                event("timed", EventStart::at("2024-01-01T08:00:00Z"), None),
                event("all-day", EventStart::on("2024-01-01"), None),
            ],
            vec![event("next-day", EventStart::on("2024-01-02"), None)],
        ];
        let filter = EventsFilter::new().order_by(OrderBy::StartTime);

        let merged = merge(batches, &filter);

        assert_eq!(ids(&merged), vec!["all-day", "timed", "next-day", "late"]);
    }

    #[test]
    fn updated_order_is_ascending() {
        let day = EventStart::on("2024-01-01");
        let batches = vec![
            vec![event("b", day.clone(), Some("2024-02-02T00:00:00Z"))],
            vec![
                event("c", day.clone(), Some("2024-03-01T00:00:00Z")),
                event("a", day.clone(), Some("2024-01-15T12:00:00Z")),
            ],
        ];
        let filter = EventsFilter::new().order_by(OrderBy::Updated);

        let merged = merge(batches, &filter);

        assert_eq!(ids(&merged), vec!["a", "b", "c"]);
    }

    #[test]
    fn cap_larger_than_result_is_a_no_op() {
        let batches = vec![vec![
            event("a", EventStart::on("2024-01-01"), None),
            event("b", EventStart::on("2024-01-02"), None),
        ]];
        let filter = EventsFilter::new().max_results(10);

        assert_eq!(merge(batches, &filter).len(), 2);
    }

    #[test]
    fn unordered_cap_keeps_flattened_prefix() {
        let batches = vec![
            vec![
                event("1", EventStart::on("2024-01-05"), None),
                event("2", EventStart::on("2024-01-01"), None),
            ],
            vec![
                event("3", EventStart::on("2024-01-03"), None),
                event("4", EventStart::on("2024-01-02"), None),
                event("5", EventStart::on("2024-01-04"), None),
            ],
        ];
        let filter = EventsFilter::new().max_results(3);

        let merged = merge(batches, &filter);

        assert_eq!(ids(&merged), vec!["1", "2", "3"]);
    }

    #[test]
    fn zero_cap_returns_nothing() {
        let batches = vec![vec![event("a", EventStart::on("2024-01-01"), None)]];
        let filter = EventsFilter::new().max_results(0);

        assert!(merge(batches, &filter).is_empty());
    }
}
