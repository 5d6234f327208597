//! Conversions between edtsync types and Google Calendar API payloads.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use edtsync_core::window::local_midnight;
use edtsync_core::{CalendarInfo, NewEvent, RemoteEvent};
use google_calendar::types::{CalendarListEntry, Event, EventDateTime};

pub fn to_google_event(event: &NewEvent) -> Event {
    Event {
        summary: event.title.clone(),
        location: event.location.clone(),
        description: event.description.clone(),
        start: Some(date_time_to_google(event.start, &event.timezone)),
        end: Some(date_time_to_google(event.end, &event.timezone)),
        color_id: event.color.clone().unwrap_or_default(),
        ..Default::default()
    }
}

fn date_time_to_google(at: DateTime<Utc>, timezone: &str) -> EventDateTime {
    EventDateTime {
        date: None,
        date_time: Some(at),
        time_zone: timezone.to_string(),
    }
}

/// Convert a listed Google event, or `None` for events that cannot be
/// deleted by id (cancelled, id-less, or without a start).
///
/// All-day starts are placed at local midnight in `timezone`.
pub fn from_google_event(event: Event, timezone: Tz) -> Option<RemoteEvent> {
    if event.status == "cancelled" || event.id.is_empty() {
        return None;
    }

    let start = event.start.as_ref()?;
    let start = match (start.date_time, start.date) {
        (Some(dt), _) => dt,
        (None, Some(d)) => local_midnight(d, timezone)?.with_timezone(&Utc),
        (None, None) => return None,
    };

    Some(RemoteEvent {
        id: event.id,
        start,
        summary: event.summary,
    })
}

pub fn from_google_calendar(entry: CalendarListEntry) -> Option<CalendarInfo> {
    if entry.id.is_empty() {
        return None;
    }

    Some(CalendarInfo {
        id: entry.id,
        name: entry.summary,
    })
}
