use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use edtsync_core::{
    CalendarHandle, CalendarInfo, NewEvent, RemoteCalendar, RemoteEvent, SyncError, SyncResult,
};
use google_calendar::Client;
use google_calendar::types::{MinAccessRole, OrderBy, SendUpdates};

use crate::convert::{from_google_calendar, from_google_event, to_google_event};
use crate::session::Session;

/// Google Calendar as a sync destination.
pub struct GoogleCalendar {
    client: Client,
    account_email: String,
    timezone: Tz,
}

impl GoogleCalendar {
    /// Connect with the stored session of `account_email`.
    ///
    /// `timezone` is used to place all-day remote events.
    pub async fn connect(account_email: &str, timezone: Tz) -> Result<Self> {
        let session = Session::load_valid(account_email).await?;

        Ok(GoogleCalendar {
            client: session.client()?,
            account_email: session.account_email().to_string(),
            timezone,
        })
    }

    pub fn account_email(&self) -> &str {
        &self.account_email
    }

    async fn fetch_calendars(&self) -> Result<Vec<CalendarInfo>> {
        let response = self
            .client
            .calendar_list()
            .list_all(MinAccessRole::default(), false, false)
            .await
            .context("Failed to fetch calendars")?;

        Ok(response
            .body
            .into_iter()
            .filter_map(from_google_calendar)
            .collect())
    }

    async fn insert_calendar(&self, name: &str, timezone: &str) -> Result<CalendarHandle> {
        let body: google_calendar::types::Calendar = serde_json::from_value(serde_json::json!({
            "summary": name,
            "timeZone": timezone,
        }))?;

        let created = self
            .client
            .calendars()
            .insert(&body)
            .await
            .with_context(|| format!("Failed to create calendar: {}", name))?
            .body;

        Ok(CalendarHandle {
            name: name.to_string(),
            id: created.id,
        })
    }

    async fn fetch_events(
        &self,
        calendar_id: &str,
        start_bound: Option<DateTime<Utc>>,
    ) -> Result<Vec<RemoteEvent>> {
        let time_min = start_bound.map(|t| t.to_rfc3339()).unwrap_or_default();

        let response = self
            .client
            .events()
            .list_all(
                calendar_id,
                "",
                0,
                OrderBy::StartTime,
                &[],
                "", // search query
                &[],
                false,
                false,
                true, // expand recurring events so every instance has its own id
                "",
                &time_min,
                "",
                "",
            )
            .await
            .context("Failed to fetch events")?;

        Ok(response
            .body
            .into_iter()
            .filter_map(|event| from_google_event(event, self.timezone))
            .collect())
    }

    async fn create_event(&self, calendar_id: &str, event: &NewEvent) -> Result<String> {
        let google_event = to_google_event(event);

        let response = self
            .client
            .events()
            .insert(
                calendar_id,
                0,
                0,
                false,
                SendUpdates::None,
                false,
                &google_event,
            )
            .await
            .with_context(|| format!("Failed to create event: {}", event.title))?;

        Ok(response.body.id)
    }

    async fn remove_event(&self, calendar_id: &str, event_id: &str) -> Result<()> {
        let result = self
            .client
            .events()
            .delete(calendar_id, event_id, false, SendUpdates::None)
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) => {
                let error_str = e.to_string();
                if error_str.contains("410") || error_str.contains("Gone") {
                    Ok(())
                } else {
                    Err(e).with_context(|| format!("Failed to delete event: {}", event_id))
                }
            }
        }
    }
}

fn remote_error(e: anyhow::Error) -> SyncError {
    SyncError::Remote(format!("{:#}", e))
}

impl RemoteCalendar for GoogleCalendar {
    async fn list_calendars(&self) -> SyncResult<Vec<CalendarInfo>> {
        self.fetch_calendars().await.map_err(remote_error)
    }

    async fn create_calendar(&self, name: &str, timezone: &str) -> SyncResult<CalendarHandle> {
        self.insert_calendar(name, timezone)
            .await
            .map_err(remote_error)
    }

    async fn list_events(
        &self,
        calendar: &CalendarHandle,
        start_bound: Option<DateTime<Utc>>,
    ) -> SyncResult<Vec<RemoteEvent>> {
        self.fetch_events(&calendar.id, start_bound)
            .await
            .map_err(remote_error)
    }

    async fn insert_event(&self, calendar: &CalendarHandle, event: &NewEvent) -> SyncResult<String> {
        self.create_event(&calendar.id, event)
            .await
            .map_err(remote_error)
    }

    async fn delete_event(&self, calendar: &CalendarHandle, event_id: &str) -> SyncResult<()> {
        self.remove_event(&calendar.id, event_id)
            .await
            .map_err(remote_error)
    }
}
