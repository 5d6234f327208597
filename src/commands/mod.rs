pub mod auth;
pub mod calendars;
pub mod status;
pub mod sync;

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono_tz::Tz;
use edtsync_core::classify::{Classifier, Palette};
use edtsync_core::ics::{IcsSource, Normalizer};
use edtsync_core::sync::{PreparedSync, preview};
use edtsync_core::{CalendarHandle, SyncConfig, SyncWindow};
use edtsync_provider_google::{GoogleCalendar, Session};

use crate::PassArgs;
use crate::source;

/// Google account to use: the configured one, or the only stored session.
pub fn resolve_account(config: &SyncConfig) -> Result<String> {
    if let Some(account) = &config.account {
        return Ok(account.clone());
    }

    let accounts = Session::accounts()?;

    match accounts.as_slice() {
        [only] => Ok(only.clone()),
        [] => anyhow::bail!(
            "No Google account connected.\n\n\
            Sign in with:\n  \
            edtsync auth"
        ),
        _ => anyhow::bail!(
            "Several Google accounts are connected ({}).\n\
            Set `account` in {}",
            accounts.join(", "),
            SyncConfig::config_path()?.display()
        ),
    }
}

/// Everything a pass needs, resolved from the config and command-line flags.
pub struct Pass {
    pub remote: GoogleCalendar,
    pub calendar_name: String,
    /// `None` until the calendar exists remotely.
    pub calendar: Option<CalendarHandle>,
    pub window: SyncWindow,
    pub source: IcsSource,
    pub source_label: String,
    timezone: Tz,
    classifier: Classifier,
    palette: Palette,
    timings: Vec<(&'static str, Duration)>,
}

impl Pass {
    pub async fn open(args: &PassArgs) -> Result<Self> {
        let mut config = SyncConfig::load()?;

        if args.include_past {
            config.include_past = true;
        }
        if let Some(ics) = &args.ics {
            config.ics_source = Some(ics.clone());
        }
        if let Some(calendar) = &args.calendar {
            config.calendar_name = calendar.clone();
        }

        let timezone = config.tz()?;

        let window = SyncWindow::resolve(args.from.as_deref(), config.include_past, timezone)?;

        let source_label = config.ics_source().ok_or_else(|| {
            anyhow::anyhow!(
                "No timetable to read.\n\n\
                Pass --ics <PATH|URL> or set `ics_source` in {}",
                SyncConfig::config_path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|_| "the config file".into())
            )
        })?;

        let mut timings = Vec::new();

        let started = Instant::now();
        let source = source::load(&source_label)
            .await
            .with_context(|| format!("Could not load timetable from {}", source_label))?;
        timings.push(("read timetable", started.elapsed()));

        let account = resolve_account(&config)?;

        let started = Instant::now();
        let remote = GoogleCalendar::connect(&account, timezone)
            .await
            .with_context(|| format!("Could not connect to Google as {}", account))?;
        let calendar = CalendarHandle::find(&remote, &config.calendar_name).await?;
        timings.push(("connect", started.elapsed()));

        Ok(Pass {
            remote,
            calendar_name: config.calendar_name.clone(),
            calendar,
            window,
            source,
            source_label,
            timezone,
            classifier: config.classifier(),
            palette: config.palette(),
            timings,
        })
    }

    /// The destination calendar, created if it does not exist yet.
    pub async fn ensure_calendar(&mut self) -> Result<CalendarHandle> {
        if let Some(calendar) = &self.calendar {
            return Ok(calendar.clone());
        }

        let calendar = CalendarHandle::create(&self.remote, &self.calendar_name, self.timezone).await?;
        self.calendar = Some(calendar.clone());

        Ok(calendar)
    }

    /// Build the plan. Nothing is written, even if the calendar is missing.
    pub async fn prepare(&mut self) -> Result<PreparedSync> {
        let started = Instant::now();
        let normalizer = Normalizer::new(self.timezone, &self.classifier);

        let prepared = preview(
            &self.remote,
            self.calendar.as_ref(),
            &self.source,
            &normalizer,
            &self.window,
        )
        .await?;

        self.timings.push(("plan", started.elapsed()));

        Ok(prepared)
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn record_timing(&mut self, phase: &'static str, elapsed: Duration) {
        self.timings.push((phase, elapsed));
    }

    pub fn timings(&self) -> &[(&'static str, Duration)] {
        &self.timings
    }
}
