//! Terminal rendering for plans, outcomes and reports.

use std::time::Duration;

use chrono_tz::Tz;
use edtsync_core::ics::MalformedComponent;
use edtsync_core::{CalendarHandle, Event, MutationPlan, Outcome, RemoteEvent, SyncReport, SyncWindow};
use owo_colors::OwoColorize;

use crate::utils::tui::format_elapsed;

/// Threshold for compact view (show counts instead of individual events)
const COMPACT_THRESHOLD: usize = 5;

const TIME_FORMAT: &str = "%a %d %b %Y %H:%M";

pub fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{}s", word)
    }
}

pub fn render_calendar(calendar: &CalendarHandle) -> String {
    format!("📅 {}", calendar)
}

pub fn render_missing_calendar(name: &str) -> String {
    format!("📅 {} {}", name, "(will be created)".yellow())
}

pub fn render_window(window: &SyncWindow, timezone: Tz) -> String {
    if window.include_past {
        "all events, past included".to_string()
    } else {
        format!(
            "events from {}",
            window.cutoff.with_timezone(&timezone).format("%Y-%m-%d")
        )
    }
}

fn render_delete(event: &RemoteEvent, timezone: Tz) -> String {
    let time = event.start.with_timezone(&timezone).format(TIME_FORMAT).to_string();
    format!("{} {} {}", "-".red(), event.to_string().red(), time.dimmed())
}

fn render_create(event: &Event) -> String {
    let time = event.start().format(TIME_FORMAT).to_string();
    let category = format!("({})", event.category());
    format!(
        "{} {} {} {}",
        "+".green(),
        event.to_string().green(),
        time.dimmed(),
        category.dimmed()
    )
}

pub fn render_plan(plan: &MutationPlan, timezone: Tz, verbose: bool) -> String {
    if plan.is_empty() {
        return "   No changes".dimmed().to_string();
    }

    let mut lines = Vec::new();

    if verbose || plan.len() <= COMPACT_THRESHOLD {
        for event in &plan.to_delete {
            lines.push(format!("   {}", render_delete(event, timezone)));
        }
        for event in &plan.to_create {
            lines.push(format!("   {}", render_create(event)));
        }
    } else {
        let deletes = plan.to_delete.len();
        let creates = plan.to_create.len();

        if deletes > 0 {
            let label = format!("({} {} to delete)", deletes, pluralize("event", deletes));
            lines.push(format!("   {} {}", "-".red(), label.red()));
        }
        if creates > 0 {
            let label = format!("({} {} to create)", creates, pluralize("event", creates));
            lines.push(format!("   {} {}", "+".green(), label.green()));
        }
    }

    lines.join("\n")
}

pub fn render_skipped(skipped: &[MalformedComponent]) -> String {
    skipped
        .iter()
        .map(|component| {
            let uid = component
                .uid
                .as_deref()
                .map(|uid| format!(" ({})", uid))
                .unwrap_or_default();
            format!(
                "   {} event #{}{} skipped: {}",
                "!".yellow(),
                component.index,
                uid,
                component.reason
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_failure(outcome: &Outcome) -> String {
    format!("   {} {}", "✗".red(), outcome.to_string().red())
}

pub fn render_report(report: &SyncReport) -> String {
    let mut deleted = format!("{} deleted", report.deleted);
    let mut created = format!("{} created", report.created);
    if report.delete_failed > 0 {
        deleted = format!("{} ({} failed)", deleted, report.delete_failed);
    }
    if report.create_failed > 0 {
        created = format!("{} ({} failed)", created, report.create_failed);
    }

    if report.is_clean() {
        format!("{}, {}", deleted, created).green().to_string()
    } else {
        format!("{}, {}", deleted, created).yellow().to_string()
    }
}

pub fn render_timings(timings: &[(&'static str, Duration)]) -> String {
    timings
        .iter()
        .map(|(phase, elapsed)| format!("{} {}", phase, format_elapsed(*elapsed)))
        .collect::<Vec<_>>()
        .join(", ")
        .dimmed()
        .to_string()
}
