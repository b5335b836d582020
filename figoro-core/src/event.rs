//! Provider-neutral event types.
//!
//! Providers convert their API responses into these types. The aggregator
//! only looks at the start marker and the update timestamp; everything else
//! is carried through untouched for rendering.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A calendar event as returned by a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// Account the event was fetched from (filled in during aggregation)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    /// Calendar the event was fetched from (filled in during aggregation)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calendar_id: Option<String>,

    pub start: EventStart,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<EventStart>,
    #[serde(default)]
    pub status: EventStatus,
    /// e.g. "default", "focusTime", "outOfOffice"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,

    /// Last modification timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_link: Option<String>,
}

/// Start or end marker of an event, in the shape the source sent it.
///
/// Exactly one of `date_time` (an RFC 3339 instant) or `date` (YYYY-MM-DD,
/// whole-day events) is set. The raw strings are kept because ordering by
/// start time compares them as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventStart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    #[default]
    Confirmed,
    Tentative,
    Cancelled,
}

impl EventStart {
    pub fn at(date_time: &str) -> Self {
        EventStart {
            date_time: Some(date_time.to_string()),
            date: None,
        }
    }

    pub fn on(date: &str) -> Self {
        EventStart {
            date_time: None,
            date: Some(date.to_string()),
        }
    }

    pub fn is_all_day(&self) -> bool {
        self.date_time.is_none() && self.date.is_some()
    }

    /// The string compared when ordering by start time.
    ///
    /// Instants and whole-day dates are compared lexicographically against
    /// each other without normalizing to a common timeline, so
    /// `"2024-01-01"` sorts before `"2024-01-01T00:00:00Z"`.
    pub fn sort_key(&self) -> &str {
        self.date_time
            .as_deref()
            .or(self.date.as_deref())
            .unwrap_or_default()
    }

    pub fn instant(&self) -> Option<DateTime<Utc>> {
        let raw = self.date_time.as_deref()?;
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    pub fn day(&self) -> Option<NaiveDate> {
        match (&self.date_time, &self.date) {
            (Some(_), _) => self.instant().map(|dt| dt.date_naive()),
            (None, Some(date)) => NaiveDate::parse_from_str(date, "%Y-%m-%d").ok(),
            (None, None) => None,
        }
    }
}

impl Event {
    /// Tag the event with the account and calendar it came from, keeping
    /// whatever the provider already reported.
    pub fn with_origin(mut self, account: &str, calendar_id: &str) -> Self {
        self.account.get_or_insert_with(|| account.to_string());
        self.calendar_id.get_or_insert_with(|| calendar_id.to_string());
        self
    }

    fn identity(&self) -> (&str, &str, &str) {
        (
            self.account.as_deref().unwrap_or_default(),
            self.calendar_id.as_deref().unwrap_or_default(),
            &self.id,
        )
    }
}

/// Ascending by start marker string, then by origin and id.
pub fn cmp_start(a: &Event, b: &Event) -> Ordering {
    a.start
        .sort_key()
        .cmp(b.start.sort_key())
        .then_with(|| a.identity().cmp(&b.identity()))
}

/// Ascending by update timestamp (missing timestamps first), then by origin and id.
pub fn cmp_updated(a: &Event, b: &Event) -> Ordering {
    a.updated
        .cmp(&b.updated)
        .then_with(|| a.identity().cmp(&b.identity()))
}
