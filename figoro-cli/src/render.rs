//! Terminal rendering of aggregated events.

use chrono::{Local, NaiveDate};
use figoro_core::{Event, EventStart, EventStatus};
use owo_colors::OwoColorize;

/// Events grouped under a bold label per day, in the order given.
pub fn agenda(events: &[Event], today: NaiveDate) -> String {
    if events.is_empty() {
        return "No events found".dimmed().to_string();
    }

    let mut lines = Vec::new();
    let mut current_date: Option<String> = None;

    for event in events {
        let date_label = match local_day(&event.start) {
            Some(day) => format_date_label(day, today),
            None => "Undated".to_string(),
        };

        if current_date.as_ref() != Some(&date_label) {
            if current_date.is_some() {
                lines.push(String::new());
            }
            lines.push(date_label.bold().to_string());
            current_date = Some(date_label);
        }

        lines.push(render_event(event));
    }

    lines.join("\n")
}

fn render_event(event: &Event) -> String {
    let time = format_time(&event.start);
    let origin = format!("[{}]", event.account.as_deref().unwrap_or_default());

    let summary = if event.status == EventStatus::Cancelled {
        event.summary.strikethrough().to_string()
    } else {
        event.summary.clone()
    };

    format!("  {} {} {}", time, summary, origin.dimmed())
}

fn local_day(start: &EventStart) -> Option<NaiveDate> {
    match start.instant() {
        Some(instant) => Some(instant.with_timezone(&Local).date_naive()),
        None => start.day(),
    }
}

/// Format a date as a human-readable label (e.g. "Today", "Tomorrow", "Wed Feb 25")
fn format_date_label(date: NaiveDate, today: NaiveDate) -> String {
    match (date - today).num_days() {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        _ => date.format("%a %b %-d").to_string(),
    }
}

/// Format the time portion of an event (e.g. "15:00" or "all-day")
fn format_time(start: &EventStart) -> String {
    match start.instant() {
        Some(instant) => format!("{:>7}", instant.with_timezone(&Local).format("%H:%M")),
        None => "all-day".to_string(),
    }
}
