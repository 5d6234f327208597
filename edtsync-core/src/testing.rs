//! In-memory remote calendar for tests.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};

use crate::error::{SyncError, SyncResult};
use crate::event::RemoteEvent;
use crate::remote::{CalendarHandle, CalendarInfo, NewEvent, RemoteCalendar};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    List,
    Insert(String),
    Delete(String),
}

#[derive(Default)]
struct State {
    calendars: Vec<CalendarInfo>,
    events: HashMap<String, Vec<RemoteEvent>>,
    next_id: usize,
    calls: Vec<Call>,
    last_start_bound: Option<Option<DateTime<Utc>>>,
    fail_listing: bool,
    failing_deletes: HashSet<String>,
    failing_inserts: HashSet<String>,
}

#[derive(Default)]
pub struct FakeRemote {
    state: RefCell<State>,
}

impl FakeRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_calendar(&self, id: &str, name: &str) -> CalendarHandle {
        self.state.borrow_mut().calendars.push(CalendarInfo {
            id: id.to_string(),
            name: name.to_string(),
        });
        CalendarHandle {
            name: name.to_string(),
            id: id.to_string(),
        }
    }

    pub fn calendars(&self) -> Vec<CalendarInfo> {
        self.state.borrow().calendars.clone()
    }

    /// Put an event straight into the store, bypassing the call log.
    pub fn seed(&self, calendar: &CalendarHandle, summary: &str, start: DateTime<Utc>) -> String {
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        let id = format!("evt-{}", state.next_id);

        state
            .events
            .entry(calendar.id.clone())
            .or_default()
            .push(RemoteEvent {
                id: id.clone(),
                start,
                summary: summary.to_string(),
            });

        id
    }

    pub fn events(&self, calendar: &CalendarHandle) -> Vec<RemoteEvent> {
        self.state
            .borrow()
            .events
            .get(&calendar.id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    pub fn last_start_bound(&self) -> Option<Option<DateTime<Utc>>> {
        self.state.borrow().last_start_bound
    }

    pub fn fail_listing(&self) {
        self.state.borrow_mut().fail_listing = true;
    }

    pub fn fail_delete(&self, event_id: &str) {
        self.state
            .borrow_mut()
            .failing_deletes
            .insert(event_id.to_string());
    }

    pub fn fail_insert(&self, title: &str) {
        self.state
            .borrow_mut()
            .failing_inserts
            .insert(title.to_string());
    }
}

impl RemoteCalendar for FakeRemote {
    async fn list_calendars(&self) -> SyncResult<Vec<CalendarInfo>> {
        Ok(self.calendars())
    }

    async fn create_calendar(&self, name: &str, _timezone: &str) -> SyncResult<CalendarHandle> {
        let id = format!("cal-{}", self.state.borrow().calendars.len() + 1);
        Ok(self.add_calendar(&id, name))
    }

    async fn list_events(
        &self,
        calendar: &CalendarHandle,
        start_bound: Option<DateTime<Utc>>,
    ) -> SyncResult<Vec<RemoteEvent>> {
        let mut state = self.state.borrow_mut();
        state.calls.push(Call::List);
        state.last_start_bound = Some(start_bound);

        if state.fail_listing {
            return Err(SyncError::Remote("503 Service Unavailable".into()));
        }

        let events = state
            .events
            .get(&calendar.id)
            .map(|events| {
                events
                    .iter()
                    .filter(|e| start_bound.is_none_or(|bound| e.start >= bound))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        Ok(events)
    }

    async fn insert_event(&self, calendar: &CalendarHandle, event: &NewEvent) -> SyncResult<String> {
        self.state
            .borrow_mut()
            .calls
            .push(Call::Insert(event.title.clone()));

        if self.state.borrow().failing_inserts.contains(&event.title) {
            return Err(SyncError::Remote(format!("400 Bad Request: {}", event.title)));
        }

        Ok(self.seed(calendar, &event.title, event.start))
    }

    async fn delete_event(&self, calendar: &CalendarHandle, event_id: &str) -> SyncResult<()> {
        let mut state = self.state.borrow_mut();
        state.calls.push(Call::Delete(event_id.to_string()));

        if state.failing_deletes.contains(event_id) {
            return Err(SyncError::Remote(format!("500 Internal Error: {}", event_id)));
        }

        if let Some(events) = state.events.get_mut(&calendar.id) {
            events.retain(|e| e.id != event_id);
        }

        Ok(())
    }
}
