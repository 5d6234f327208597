//! Canonical event types.
//!
//! `Event` is what the normalizer produces from the ICS export, `RemoteEvent`
//! is what the remote calendar reports back. The two are never matched
//! against each other: a sync pass deletes remote events and recreates local
//! ones inside the window.

use std::fmt;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::classify::Classifier;

/// Semantic tag derived from an event title (e.g. "lecture", "exam").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Category(String);

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Category(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A normalized event from the calendar file.
///
/// Start and end are always full date-times in the configured timezone.
/// The category is computed from the title when the event is built and
/// cannot be changed afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    title: String,
    location: String,
    description: String,
    start: DateTime<Tz>,
    end: DateTime<Tz>,
    category: Category,
}

impl Event {
    /// Build an event, classifying its title.
    ///
    /// Returns `None` when `end` is before `start`.
    pub fn new(
        title: impl Into<String>,
        location: impl Into<String>,
        description: impl Into<String>,
        start: DateTime<Tz>,
        end: DateTime<Tz>,
        classifier: &Classifier,
    ) -> Option<Self> {
        if end < start {
            return None;
        }

        let title = title.into();
        let category = classifier.classify(&title);

        Some(Event {
            title,
            location: location.into(),
            description: description.into(),
            start,
            end,
            category,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn start(&self) -> DateTime<Tz> {
        self.start
    }

    pub fn end(&self) -> DateTime<Tz> {
        self.end
    }

    pub fn category(&self) -> &Category {
        &self.category
    }

    /// IANA name of the timezone the event times are expressed in.
    pub fn timezone(&self) -> &'static str {
        self.start.timezone().name()
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.title.is_empty() {
            write!(f, "(No title)")
        } else {
            write!(f, "{}", self.title)
        }
    }
}

/// An event as reported by the remote calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteEvent {
    /// Identifier assigned by the remote system, used for deletion.
    pub id: String,
    pub start: DateTime<Utc>,
    pub summary: String,
}

impl fmt::Display for RemoteEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.summary.is_empty() {
            write!(f, "(No title)")
        } else {
            write!(f, "{}", self.summary)
        }
    }
}
