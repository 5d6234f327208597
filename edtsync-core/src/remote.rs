//! The remote calendar capability and the remote state reader.

use std::fmt;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::classify::Palette;
use crate::error::{SyncError, SyncResult};
use crate::event::{Event, RemoteEvent};
use crate::window::SyncWindow;

/// A calendar as listed by the remote system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarInfo {
    pub id: String,
    pub name: String,
}

/// The destination calendar of a sync pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarHandle {
    pub name: String,
    pub id: String,
}

impl fmt::Display for CalendarHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl From<CalendarInfo> for CalendarHandle {
    fn from(info: CalendarInfo) -> Self {
        CalendarHandle {
            name: info.name,
            id: info.id,
        }
    }
}

impl CalendarHandle {
    /// Look up the calendar called `name` without changing anything.
    pub async fn find<R: RemoteCalendar>(remote: &R, name: &str) -> SyncResult<Option<Self>> {
        let calendars = remote.list_calendars().await.map_err(|e| SyncError::Calendar {
            name: name.to_string(),
            message: e.to_string(),
        })?;

        Ok(calendars
            .into_iter()
            .find(|c| c.name == name)
            .map(CalendarHandle::from))
    }

    pub async fn create<R: RemoteCalendar>(remote: &R, name: &str, timezone: Tz) -> SyncResult<Self> {
        tracing::info!(calendar = name, timezone = %timezone, "Creating calendar");

        remote
            .create_calendar(name, timezone.name())
            .await
            .map_err(|e| SyncError::Calendar {
                name: name.to_string(),
                message: e.to_string(),
            })
    }
}

/// Fields sent to the remote calendar when creating an event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewEvent {
    pub title: String,
    pub location: String,
    pub description: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// IANA timezone the event should be displayed in.
    pub timezone: String,
    pub category: String,
    /// Remote color label for the category, if the palette has one.
    pub color: Option<String>,
}

impl NewEvent {
    pub fn from_event(event: &Event, palette: &Palette) -> Self {
        NewEvent {
            title: event.title().to_string(),
            location: event.location().to_string(),
            description: event.description().to_string(),
            start: event.start().with_timezone(&Utc),
            end: event.end().with_timezone(&Utc),
            timezone: event.timezone().to_string(),
            category: event.category().to_string(),
            color: palette.color_for(event.category()).map(str::to_string),
        }
    }
}

/// Operations a remote calendar must support.
///
/// Implementations map their own (often untyped) API payloads into these
/// types and report failures as [`SyncError::Remote`].
#[allow(async_fn_in_trait)]
pub trait RemoteCalendar {
    async fn list_calendars(&self) -> SyncResult<Vec<CalendarInfo>>;

    async fn create_calendar(&self, name: &str, timezone: &str) -> SyncResult<CalendarHandle>;

    /// Events of `calendar`, optionally bounded below.
    async fn list_events(
        &self,
        calendar: &CalendarHandle,
        start_bound: Option<DateTime<Utc>>,
    ) -> SyncResult<Vec<RemoteEvent>>;

    /// Create an event and return its remote id.
    async fn insert_event(&self, calendar: &CalendarHandle, event: &NewEvent) -> SyncResult<String>;

    async fn delete_event(&self, calendar: &CalendarHandle, event_id: &str) -> SyncResult<()>;
}

/// Read the remote events starting inside `window`, ordered by start.
///
/// Remote APIs may bound their listing on event end rather than start, so
/// events that began before the cutoff are dropped here. Any failure is
/// fatal for the pass; there is no retry.
pub async fn fetch_events<R: RemoteCalendar>(
    remote: &R,
    calendar: &CalendarHandle,
    window: &SyncWindow,
) -> SyncResult<Vec<RemoteEvent>> {
    let mut events = remote
        .list_events(calendar, window.start_bound())
        .await
        .map_err(|e| SyncError::RemoteQuery {
            calendar: calendar.name.clone(),
            message: e.to_string(),
        })?;

    events.retain(|e| window.contains(&e.start));
    events.sort_by_key(|e| e.start);

    tracing::debug!(calendar = %calendar, count = events.len(), "Fetched remote events");

    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Classifier;
    use crate::testing::FakeRemote;
    use chrono::TimeZone;
    use chrono_tz::Europe::Paris;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, hour, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_created_calendar_is_found_by_name() {
        let remote = FakeRemote::new();
        remote.add_calendar("cal-1", "Perso");

        let created = CalendarHandle::create(&remote, "Cours", Paris).await.unwrap();
        let found = CalendarHandle::find(&remote, "Cours").await.unwrap();

        assert_eq!(found, Some(created));
        assert_eq!(remote.calendars().len(), 2);
    }

    #[tokio::test]
    async fn test_find_never_creates() {
        let remote = FakeRemote::new();
        remote.add_calendar("cal-1", "Perso");

        let missing = CalendarHandle::find(&remote, "Cours").await.unwrap();
        let found = CalendarHandle::find(&remote, "Perso").await.unwrap();

        assert_eq!(missing, None);
        assert_eq!(found.map(|c| c.id).as_deref(), Some("cal-1"));
        assert_eq!(remote.calendars().len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_orders_by_start_and_respects_cutoff() {
        let remote = FakeRemote::new();
        let calendar = remote.add_calendar("cal-1", "Cours");
        remote.seed(&calendar, "late", at(20, 8));
        remote.seed(&calendar, "early", at(5, 8));
        remote.seed(&calendar, "middle", at(12, 8));

        let window = SyncWindow::from_cutoff(at(10, 0));
        let events = fetch_events(&remote, &calendar, &window).await.unwrap();

        let summaries: Vec<_> = events.iter().map(|e| e.summary.as_str()).collect();
        assert_eq!(summaries, vec!["middle", "late"]);
    }

    #[tokio::test]
    async fn test_fetch_everything_without_bound() {
        let remote = FakeRemote::new();
        let calendar = remote.add_calendar("cal-1", "Cours");
        remote.seed(&calendar, "old", at(1, 8));
        remote.seed(&calendar, "new", at(25, 8));

        let events = fetch_events(&remote, &calendar, &SyncWindow::everything())
            .await
            .unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(remote.last_start_bound(), Some(None));
    }

    #[tokio::test]
    async fn test_fetch_failure_is_remote_query_error() {
        let remote = FakeRemote::new();
        let calendar = remote.add_calendar("cal-1", "Cours");
        remote.fail_listing();

        let err = fetch_events(&remote, &calendar, &SyncWindow::everything())
            .await
            .unwrap_err();

        assert!(matches!(err, SyncError::RemoteQuery { ref calendar, .. } if calendar == "Cours"));
    }

    #[test]
    fn test_new_event_carries_color_and_timezone() {
        let classifier = Classifier::default();
        let event = Event::new(
            "DS Final",
            "Amphi B",
            "",
            Paris.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap(),
            Paris.with_ymd_and_hms(2024, 1, 16, 0, 0, 0).unwrap(),
            &classifier,
        )
        .unwrap();

        let new_event = NewEvent::from_event(&event, &Palette::default());

        assert_eq!(new_event.color.as_deref(), Some("9"));
        assert_eq!(new_event.category, "exam");
        assert_eq!(new_event.timezone, "Europe/Paris");
        assert_eq!(new_event.start, Utc.with_ymd_and_hms(2024, 1, 14, 23, 0, 0).unwrap());
    }
}
