//! Core of edtsync: mirroring a timetable export into a remote calendar.
//!
//! A pass reads an ICS file, normalizes its events into the configured
//! timezone, classifies them by title prefix, then wipes and reloads the
//! remote calendar from the cutoff onwards:
//! - [`ics`] turns the file into [`Event`]s
//! - [`remote`] defines the [`RemoteCalendar`] capability and reads its state
//! - [`reconcile`] decides what to delete and create
//! - [`execute`] performs the mutations and reports [`Outcome`]s
//!
//! Provider crates implement [`RemoteCalendar`]; nothing here talks to the
//! network.

pub mod classify;
pub mod config;
pub mod error;
pub mod event;
pub mod execute;
pub mod ics;
pub mod reconcile;
pub mod remote;
pub mod sync;
pub mod window;

#[cfg(test)]
mod testing;

pub use classify::{Classifier, Palette};
pub use config::SyncConfig;
pub use error::{SyncError, SyncResult};
pub use event::{Category, Event, RemoteEvent};
pub use execute::{MutationExecutor, Outcome, SyncReport};
pub use reconcile::MutationPlan;
pub use remote::{CalendarHandle, CalendarInfo, NewEvent, RemoteCalendar};
pub use window::SyncWindow;
