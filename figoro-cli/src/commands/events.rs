use anyhow::{Context, Result};
use chrono::{DateTime, Local, SecondsFormat, TimeDelta, Utc};
use clap::Args;
use figoro_core::config::FigoroConfig;
use figoro_core::{CombinedAccount, Event, EventsFilter, OrderBy};

use crate::render;

#[derive(Args, Debug, Default)]
pub struct EventsArgs {
    /// Only events ending after this time (RFC 3339, default: now)
    #[arg(long)]
    pub min_end_time: Option<String>,

    /// Only events starting before this time (RFC 3339)
    #[arg(long)]
    pub max_start_time: Option<String>,

    /// Event types passed through to providers (e.g. "default,focusTime")
    #[arg(long)]
    pub event_types: Option<String>,

    /// "startTime" or "updated"
    #[arg(long)]
    pub order_by: Option<OrderBy>,

    /// Maximum number of events in the merged result
    #[arg(long)]
    pub max_results: Option<u32>,

    /// Expand recurring events into single instances
    #[arg(long)]
    pub single: bool,

    /// Include deleted events
    #[arg(long)]
    pub deleted: bool,

    /// Only use this account (repeatable)
    #[arg(short, long)]
    pub account: Vec<String>,
}

impl EventsArgs {
    pub fn to_filter(&self, now: DateTime<Utc>) -> Result<EventsFilter> {
        let min_end = match &self.min_end_time {
            Some(time) => check_time("--min-end-time", time)?,
            None => rfc3339(now),
        };

        let mut filter = EventsFilter::new().min_end_time(min_end);
        if let Some(time) = &self.max_start_time {
            filter = filter.max_start_time(check_time("--max-start-time", time)?);
        }
        if let Some(types) = &self.event_types {
            filter = filter.event_types(types.as_str());
        }
        if let Some(order) = self.order_by {
            filter = filter.order_by(order);
        }
        if let Some(max) = self.max_results {
            filter = filter.max_results(max);
        }
        if self.single {
            filter = filter.show_single();
        }
        if self.deleted {
            filter = filter.show_deleted();
        }

        Ok(filter)
    }
}

/// Single events from `now` until `days` later, in start order.
pub fn agenda_filter(now: DateTime<Utc>, days: i64) -> Result<EventsFilter> {
    if days < 1 {
        anyhow::bail!("--days must be at least 1");
    }
    let until = TimeDelta::try_days(days)
        .and_then(|window| now.checked_add_signed(window))
        .with_context(|| format!("--days out of range: {days}"))?;

    Ok(EventsFilter::new()
        .min_end_time(rfc3339(now))
        .max_start_time(rfc3339(until))
        .order_by(OrderBy::StartTime)
        .show_single())
}

fn rfc3339(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn check_time(flag: &str, value: &str) -> Result<String> {
    DateTime::parse_from_rfc3339(value)
        .with_context(|| format!("{flag} must be an RFC 3339 time, got '{value}'"))?;
    Ok(value.to_string())
}

async fn fetch(config: &FigoroConfig, accounts: &[String], filter: &EventsFilter) -> Result<Vec<Event>> {
    let combined = CombinedAccount::new(config.select_accounts(accounts)?);
    Ok(combined.events(filter).await?)
}

pub async fn list(config: &FigoroConfig, args: &EventsArgs) -> Result<()> {
    let filter = args.to_filter(Utc::now())?;
    tracing::debug!(?filter, "listing events");

    let events = fetch(config, &args.account, &filter).await?;
    println!("{}", serde_json::to_string_pretty(&events)?);

    Ok(())
}

pub async fn agenda(config: &FigoroConfig, days: i64, accounts: &[String], json: bool) -> Result<()> {
    if config.accounts.is_empty() && !json {
        eprintln!(
            "No accounts configured. Add one with:\n  \
            figoro add account <name> --provider <provider>\n"
        );
    }

    println!("{}", agenda_output(config, days, accounts, json, Utc::now()).await?);
    Ok(())
}

async fn agenda_output(
    config: &FigoroConfig,
    days: i64,
    accounts: &[String],
    json: bool,
    now: DateTime<Utc>,
) -> Result<String> {
    let events = fetch(config, accounts, &agenda_filter(now, days)?).await?;

    if json {
        Ok(serde_json::to_string_pretty(&events)?)
    } else {
        Ok(render::agenda(&events, Local::now().date_naive()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        "2024-05-01T12:30:00Z".parse().unwrap()
    }

    #[test]
    fn min_end_time_defaults_to_now() {
        let filter = EventsArgs::default().to_filter(now()).unwrap();

        assert_eq!(filter.min_end(), Some("2024-05-01T12:30:00Z"));
        assert_eq!(filter.max_start(), None);
        assert_eq!(filter.order(), None);
        assert!(!filter.is_single());
    }

    #[test]
    fn flags_map_onto_the_filter() {
        let args = EventsArgs {
            min_end_time: Some("2024-01-01T00:00:00+02:00".into()),
            max_start_time: Some("2024-02-01T00:00:00Z".into()),
            event_types: Some("default,focusTime".into()),
            order_by: Some(OrderBy::Updated),
            max_results: Some(25),
            single: true,
            deleted: true,
            account: vec![],
        };

        let filter = args.to_filter(now()).unwrap();

        assert_eq!(filter.min_end(), Some("2024-01-01T00:00:00+02:00"));
        assert_eq!(filter.max_start(), Some("2024-02-01T00:00:00Z"));
        assert_eq!(filter.types(), Some("default,focusTime"));
        assert!(filter.is_ordered_by_updated());
        assert_eq!(filter.result_cap(), Some(25));
        assert!(filter.is_single());
        assert!(filter.is_showing_deleted());
    }

    #[test]
    fn malformed_times_are_rejected() {
        let args = EventsArgs {
            max_start_time: Some("next tuesday".into()),
            ..EventsArgs::default()
        };

        let err = args.to_filter(now()).unwrap_err();

        assert!(err.to_string().contains("--max-start-time"));
    }

    #[test]
    fn agenda_covers_the_requested_days() {
        let filter = agenda_filter(now(), 3).unwrap();

        assert_eq!(filter.min_end(), Some("2024-05-01T12:30:00Z"));
        assert_eq!(filter.max_start(), Some("2024-05-04T12:30:00Z"));
        assert!(filter.is_ordered_by_start_time());
        assert!(filter.is_single());
    }

    #[test]
    fn agenda_rejects_windows_chrono_cannot_represent() {
        let err = agenda_filter(now(), 100_000_000).unwrap_err();
        assert!(err.to_string().contains("--days out of range"));

        let err = agenda_filter(now(), i64::MAX).unwrap_err();
        assert!(err.to_string().contains("--days out of range"));

        assert!(agenda_filter(now(), 0).is_err());
    }

    #[tokio::test]
    async fn agenda_without_accounts_is_an_empty_result() {
        let config = FigoroConfig::default();

        let text = agenda_output(&config, 3, &[], false, now()).await.unwrap();
        assert!(text.contains("No events found"));

        let json = agenda_output(&config, 3, &[], true, now()).await.unwrap();
        assert_eq!(json, "[]");
    }
}
