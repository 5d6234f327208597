//! Google Calendar backend for edtsync.
//!
//! Implements [`edtsync_core::RemoteCalendar`] on top of the `google-calendar`
//! client, plus the OAuth flow and session storage it needs.

mod app_config;
mod auth;
mod calendar;
mod convert;
mod session;

pub use app_config::AppConfig;
pub use auth::authenticate;
pub use calendar::GoogleCalendar;
pub use session::Session;
