//! Query parameters for listing events.
//!
//! An `EventsFilter` is built once by the caller and then shared, read-only,
//! by every fetch of an aggregation run. It serializes straight into the
//! `list_events` provider request; unset fields are left out so the provider
//! applies its own defaults.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Sort key accepted by `--order-by`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderBy {
    #[serde(rename = "startTime")]
    StartTime,
    #[serde(rename = "updated")]
    Updated,
}

impl OrderBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderBy::StartTime => "startTime",
            OrderBy::Updated => "updated",
        }
    }
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "startTime" => Ok(OrderBy::StartTime),
            "updated" => Ok(OrderBy::Updated),
            other => Err(format!(
                "Unknown order '{}'. Expected 'startTime' or 'updated'",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventsFilter {
    /// Lower bound (exclusive) for an event's end time, RFC 3339
    #[serde(default, skip_serializing_if = "Option::is_none")]
    min_end_time: Option<String>,
    /// Upper bound (exclusive) for an event's start time, RFC 3339
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_results: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    event_types: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    order_by: Option<OrderBy>,
    /// Expand recurring events into single instances
    #[serde(default)]
    single_events: bool,
    #[serde(default)]
    show_deleted: bool,
}

impl EventsFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn min_end_time(mut self, time: impl Into<String>) -> Self {
        self.min_end_time = Some(time.into());
        self
    }

    pub fn max_start_time(mut self, time: impl Into<String>) -> Self {
        self.max_start_time = Some(time.into());
        self
    }

    pub fn max_results(mut self, results: u32) -> Self {
        self.max_results = Some(results);
        self
    }

    pub fn event_types(mut self, types: impl Into<String>) -> Self {
        self.event_types = Some(types.into());
        self
    }

    pub fn order_by(mut self, order: OrderBy) -> Self {
        self.order_by = Some(order);
        self
    }

    pub fn show_single(mut self) -> Self {
        self.single_events = true;
        self
    }

    pub fn show_deleted(mut self) -> Self {
        self.show_deleted = true;
        self
    }

    pub fn is_ordered_by_start_time(&self) -> bool {
        self.order_by == Some(OrderBy::StartTime)
    }

    pub fn is_ordered_by_updated(&self) -> bool {
        self.order_by == Some(OrderBy::Updated)
    }

    /// Cap on the number of events returned after merging, if one was set.
    pub fn result_cap(&self) -> Option<u32> {
        self.max_results
    }

    pub fn min_end(&self) -> Option<&str> {
        self.min_end_time.as_deref()
    }

    pub fn max_start(&self) -> Option<&str> {
        self.max_start_time.as_deref()
    }

    pub fn types(&self) -> Option<&str> {
        self.event_types.as_deref()
    }

    pub fn order(&self) -> Option<OrderBy> {
        self.order_by
    }

    pub fn is_single(&self) -> bool {
        self.single_events
    }

    pub fn is_showing_deleted(&self) -> bool {
        self.show_deleted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unordered_filter_satisfies_neither_order() {
        let filter = EventsFilter::new();

        assert!(!filter.is_ordered_by_start_time());
        assert!(!filter.is_ordered_by_updated());
        assert_eq!(filter.result_cap(), None);
    }

    #[test]
    fn builder_only_touches_its_own_field() {
        let filter = EventsFilter::new()
            .min_end_time("2024-01-01T00:00:00Z")
            .order_by(OrderBy::Updated)
            .max_results(5)
            .show_single();

        assert_eq!(filter.min_end(), Some("2024-01-01T00:00:00Z"));
        assert_eq!(filter.max_start(), None);
        assert_eq!(filter.types(), None);
        assert!(filter.is_ordered_by_updated());
        assert!(!filter.is_ordered_by_start_time());
        assert_eq!(filter.result_cap(), Some(5));
        assert!(filter.is_single());
        assert!(!filter.is_showing_deleted());
    }

    #[test]
    fn later_setter_replaces_same_field() {
        let filter = EventsFilter::new()
            .order_by(OrderBy::Updated)
            .order_by(OrderBy::StartTime);

        assert!(filter.is_ordered_by_start_time());
    }

    #[test]
    fn parses_order_names() {
        assert_eq!("startTime".parse::<OrderBy>(), Ok(OrderBy::StartTime));
        assert_eq!("updated".parse::<OrderBy>(), Ok(OrderBy::Updated));
        assert!("start_time".parse::<OrderBy>().is_err());
        assert!("".parse::<OrderBy>().is_err());
    }

    #[test]
    fn serializes_only_set_fields() {
        let filter = EventsFilter::new()
            .max_start_time("2024-02-01T00:00:00Z")
            .order_by(OrderBy::StartTime);

        let json = serde_json::to_value(&filter).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "max_start_time": "2024-02-01T00:00:00Z",
                "order_by": "startTime",
                "single_events": false,
                "show_deleted": false,
            })
        );
    }
}
