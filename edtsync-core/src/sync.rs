//! One sync pass: normalize, read remote state, reconcile, apply.

use crate::classify::Palette;
use crate::error::SyncResult;
use crate::execute::{MutationExecutor, SyncReport};
use crate::ics::{IcsSource, MalformedComponent, Normalizer};
use crate::reconcile::{MutationPlan, reconcile};
use crate::remote::{CalendarHandle, RemoteCalendar, fetch_events};
use crate::window::SyncWindow;

/// Everything decided before the first remote mutation.
#[derive(Debug, Clone)]
pub struct PreparedSync {
    pub plan: MutationPlan,
    /// Components of the calendar file that could not be normalized.
    pub skipped: Vec<MalformedComponent>,
}

/// Normalize the source, fetch the remote window and build the plan.
///
/// Any error returned here happens before the remote calendar is touched.
pub async fn prepare<R: RemoteCalendar>(
    remote: &R,
    calendar: &CalendarHandle,
    source: &IcsSource,
    normalizer: &Normalizer<'_>,
    window: &SyncWindow,
) -> SyncResult<PreparedSync> {
    let normalized = normalizer.normalize(source)?;
    let remote_events = fetch_events(remote, calendar, window).await?;

    let plan = reconcile(normalized.events, remote_events, window);

    tracing::info!(
        calendar = %calendar,
        delete = plan.to_delete.len(),
        create = plan.to_create.len(),
        skipped = normalized.skipped.len(),
        "Prepared sync"
    );

    Ok(PreparedSync {
        plan,
        skipped: normalized.skipped,
    })
}

/// Like [`prepare`], but `calendar` may not exist yet.
///
/// A missing calendar has no remote events, so the plan only creates. Only
/// the calendar's events are read; nothing is written.
pub async fn preview<R: RemoteCalendar>(
    remote: &R,
    calendar: Option<&CalendarHandle>,
    source: &IcsSource,
    normalizer: &Normalizer<'_>,
    window: &SyncWindow,
) -> SyncResult<PreparedSync> {
    if let Some(calendar) = calendar {
        return prepare(remote, calendar, source, normalizer, window).await;
    }

    let normalized = normalizer.normalize(source)?;
    let plan = reconcile(normalized.events, Vec::new(), window);

    tracing::info!(
        create = plan.to_create.len(),
        skipped = normalized.skipped.len(),
        "Prepared sync for a calendar that does not exist yet"
    );

    Ok(PreparedSync {
        plan,
        skipped: normalized.skipped,
    })
}

/// Run a full pass and return the counts.
pub async fn run<R: RemoteCalendar>(
    remote: &R,
    calendar: &CalendarHandle,
    source: &IcsSource,
    normalizer: &Normalizer<'_>,
    window: &SyncWindow,
    palette: &Palette,
) -> SyncResult<SyncReport> {
    let prepared = prepare(remote, calendar, source, normalizer, window).await?;

    Ok(MutationExecutor::new(remote, calendar, palette)
        .apply(&prepared.plan)
        .await)
}
