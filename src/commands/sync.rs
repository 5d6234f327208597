use std::time::Instant;

use anyhow::Result;
use edtsync_core::{MutationExecutor, Outcome, SyncReport};
use futures::StreamExt;
use owo_colors::OwoColorize;

use super::Pass;
use crate::PassArgs;
use crate::render::{
    render_calendar, render_failure, render_report, render_skipped, render_timings, render_window,
};
use crate::utils::tui;

pub async fn run(args: &PassArgs, json: bool) -> Result<()> {
    let spinner = (!json).then(|| tui::create_spinner("Reading timetable and calendar".to_string()));
    let result = async {
        let mut pass = Pass::open(args).await?;
        let calendar = pass.ensure_calendar().await?;
        let prepared = pass.prepare().await?;
        Ok::<_, anyhow::Error>((pass, calendar, prepared))
    }
    .await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    let (mut pass, calendar, prepared) = result?;
    let plan = &prepared.plan;

    if !json {
        println!(
            "{} {}",
            render_calendar(&calendar),
            render_window(&pass.window, pass.timezone()).dimmed()
        );
        if !prepared.skipped.is_empty() {
            println!("{}", render_skipped(&prepared.skipped));
        }
    }

    let started = Instant::now();
    let mut report = SyncReport::default();
    let mut failures: Vec<Outcome> = Vec::new();
    {
        let executor = MutationExecutor::new(&pass.remote, &calendar, pass.palette());
        let bar = (!json).then(|| tui::create_progress_bar(plan.len()));

        let outcomes = executor.outcomes(plan);
        futures::pin_mut!(outcomes);

        while let Some(outcome) = outcomes.next().await {
            report.record(&outcome);

            if let Some(bar) = &bar {
                bar.set_message(if outcome.is_delete() { "Deleting" } else { "Creating" });
                bar.inc(1);
            }

            if outcome.is_failure() {
                failures.push(outcome);
            }
        }

        if let Some(bar) = bar {
            bar.finish_and_clear();
        }
    }
    pass.record_timing("apply", started.elapsed());

    tracing::info!(
        calendar = %calendar,
        deleted = report.deleted,
        created = report.created,
        failed = report.failed(),
        "Sync finished"
    );

    if json {
        let output = serde_json::json!({
            "calendar": calendar.name,
            "source": pass.source_label,
            "cutoff": (!pass.window.include_past).then_some(pass.window.cutoff),
            "skipped": prepared.skipped.len(),
            "report": report,
            "failures": failures.iter().map(|f| f.to_string()).collect::<Vec<_>>(),
            "timings_ms": pass
                .timings()
                .iter()
                .map(|(phase, elapsed)| (phase.to_string(), elapsed.as_millis() as u64))
                .collect::<std::collections::BTreeMap<_, _>>(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        for failure in &failures {
            println!("{}", render_failure(failure));
        }
        println!("\n{}", render_report(&report));
        println!("{}", render_timings(pass.timings()));
    }

    if !report.is_clean() {
        std::process::exit(2);
    }

    Ok(())
}
