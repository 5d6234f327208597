//! Applying a [`MutationPlan`] to the remote calendar.
//!
//! The executor exposes the pass as a stream of per-item [`Outcome`]s so a
//! caller can render progress however it likes; [`MutationExecutor::apply`]
//! is the plain "run it and give me the counts" entry point.

use std::fmt;

use async_stream::stream;
use futures::{Stream, StreamExt};
use serde::Serialize;

use crate::classify::Palette;
use crate::error::SyncError;
use crate::reconcile::MutationPlan;
use crate::remote::{CalendarHandle, NewEvent, RemoteCalendar};

/// The result of one attempted remote mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Deleted { id: String, summary: String },
    DeleteFailed { id: String, summary: String, error: String },
    Created { id: String, title: String },
    CreateFailed { title: String, error: String },
}

impl Outcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::DeleteFailed { .. } | Outcome::CreateFailed { .. })
    }

    pub fn is_delete(&self) -> bool {
        matches!(self, Outcome::Deleted { .. } | Outcome::DeleteFailed { .. })
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Deleted { summary, .. } => write!(f, "deleted {}", summary),
            Outcome::DeleteFailed { summary, error, .. } => {
                write!(f, "could not delete {}: {}", summary, error)
            }
            Outcome::Created { title, .. } => write!(f, "created {}", title),
            Outcome::CreateFailed { title, error } => {
                write!(f, "could not create {}: {}", title, error)
            }
        }
    }
}

/// Counts of a completed pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub deleted: usize,
    pub delete_failed: usize,
    pub created: usize,
    pub create_failed: usize,
}

impl SyncReport {
    pub fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Deleted { .. } => self.deleted += 1,
            Outcome::DeleteFailed { .. } => self.delete_failed += 1,
            Outcome::Created { .. } => self.created += 1,
            Outcome::CreateFailed { .. } => self.create_failed += 1,
        }
    }

    pub fn failed(&self) -> usize {
        self.delete_failed + self.create_failed
    }

    pub fn is_clean(&self) -> bool {
        self.failed() == 0
    }
}

pub struct MutationExecutor<'a, R> {
    remote: &'a R,
    calendar: &'a CalendarHandle,
    palette: &'a Palette,
}

impl<'a, R: RemoteCalendar> MutationExecutor<'a, R> {
    pub fn new(remote: &'a R, calendar: &'a CalendarHandle, palette: &'a Palette) -> Self {
        MutationExecutor {
            remote,
            calendar,
            palette,
        }
    }

    /// Delete everything in `to_delete`, then create everything in `to_create`.
    ///
    /// Nothing is sent until the stream is polled, and each item is one remote
    /// call. A failed call is logged and yields a failure outcome; the stream
    /// carries on with the next item. Calling this again on the same plan
    /// replays the whole pass.
    pub fn outcomes<'p>(&'p self, plan: &'p MutationPlan) -> impl Stream<Item = Outcome> + 'p {
        stream! {
            for event in &plan.to_delete {
                match self.remote.delete_event(self.calendar, &event.id).await {
                    Ok(()) => {
                        yield Outcome::Deleted {
                            id: event.id.clone(),
                            summary: event.summary.clone(),
                        };
                    }
                    Err(e) => {
                        let error = SyncError::RemoteMutation(e.to_string());
                        tracing::warn!(
                            calendar = %self.calendar,
                            id = %event.id,
                            summary = %event,
                            "{}",
                            error
                        );
                        yield Outcome::DeleteFailed {
                            id: event.id.clone(),
                            summary: event.summary.clone(),
                            error: e.to_string(),
                        };
                    }
                }
            }

            for event in &plan.to_create {
                let new_event = NewEvent::from_event(event, self.palette);

                match self.remote.insert_event(self.calendar, &new_event).await {
                    Ok(id) => {
                        yield Outcome::Created {
                            id,
                            title: new_event.title,
                        };
                    }
                    Err(e) => {
                        let error = SyncError::RemoteMutation(e.to_string());
                        tracing::warn!(
                            calendar = %self.calendar,
                            title = %event,
                            start = %event.start(),
                            "{}",
                            error
                        );
                        yield Outcome::CreateFailed {
                            title: new_event.title,
                            error: e.to_string(),
                        };
                    }
                }
            }
        }
    }

    /// Run the whole plan and return the counts.
    pub async fn apply(&self, plan: &MutationPlan) -> SyncReport {
        let report = self
            .outcomes(plan)
            .fold(SyncReport::default(), |mut report, outcome| async move {
                report.record(&outcome);
                report
            })
            .await;

        tracing::info!(
            calendar = %self.calendar,
            deleted = report.deleted,
            delete_failed = report.delete_failed,
            created = report.created,
            create_failed = report.create_failed,
            "Applied mutations"
        );

        report
    }
}
