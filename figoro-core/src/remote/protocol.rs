//! Defines the JSON protocol used between figoro and provider binaries
//! over stdin/stdout.
//!
//! A request is one line of JSON: `{"command": "...", "params": {...}}`.
//! The provider answers with one JSON document, either
//! `{"status": "success", "data": ...}` or `{"status": "error", "error": "..."}`.

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::event::Event;
use crate::filter::EventsFilter;

pub trait ProviderCommand: Serialize {
    type Response: DeserializeOwned;
    fn command() -> Command;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    ListCalendars,
    ListEvents,
}

/// Request sent from figoro to a provider.
#[derive(Debug, Serialize, Deserialize)]
pub struct Request {
    pub command: Command,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Response sent from a provider to figoro.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response<T> {
    Success { data: T },
    Error { error: String },
}

/// A calendar as reported by a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderCalendar {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// List all calendars of an authenticated account.
#[derive(Debug, Serialize, Deserialize)]
pub struct ListCalendars {
    pub account_identifier: String,
}

impl ProviderCommand for ListCalendars {
    type Response = Vec<ProviderCalendar>;
    fn command() -> Command {
        Command::ListCalendars
    }
}

/// List events of one calendar.
#[derive(Debug, Serialize, Deserialize)]
pub struct ListEvents {
    pub account_identifier: String,
    pub calendar_id: String,
    /// Unset filter fields are omitted so the provider uses its defaults
    #[serde(flatten)]
    pub filter: EventsFilter,
}

impl ProviderCommand for ListEvents {
    type Response = Vec<Event>;
    fn command() -> Command {
        Command::ListEvents
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::OrderBy;

    #[test]
    fn list_events_flattens_filter_into_params() {
        let cmd = ListEvents {
            account_identifier: "me@example.com".into(),
            calendar_id: "primary".into(),
            filter: EventsFilter::new()
                .min_end_time("2024-01-01T00:00:00Z")
                .order_by(OrderBy::StartTime)
                .show_single(),
        };

        let request = Request {
            command: ListEvents::command(),
            params: serde_json::to_value(&cmd).unwrap(),
        };
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["command"], "list_events");
        assert_eq!(json["params"]["calendar_id"], "primary");
        assert_eq!(json["params"]["min_end_time"], "2024-01-01T00:00:00Z");
        assert_eq!(json["params"]["order_by"], "startTime");
        assert_eq!(json["params"]["single_events"], true);
        assert!(json["params"].get("max_results").is_none());
    }

    #[test]
    fn parses_error_response() {
        let response: Response<Vec<Event>> =
            serde_json::from_str(r#"{"status":"error","error":"token expired"}"#).unwrap();

        assert!(matches!(response, Response::Error { ref error } if error == "token expired"));
    }

    #[test]
    fn parses_calendar_list() {
        let response: Response<Vec<ProviderCalendar>> = serde_json::from_str(
            r#"{"status":"success","data":[{"id":"primary","name":"Me"},{"id":"team"}]}"#,
        )
        .unwrap();

        let Response::Success { data } = response else {
            panic!("expected success");
        };
        let ids: Vec<_> = data.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["primary", "team"]);
    }
}
