use anyhow::Result;
use owo_colors::OwoColorize;

use super::Pass;
use crate::PassArgs;
use crate::render::{
    render_calendar, render_missing_calendar, render_plan, render_skipped, render_window,
};
use crate::utils::tui;

pub async fn run(args: &PassArgs, verbose: bool) -> Result<()> {
    let spinner = tui::create_spinner("Reading timetable and calendar".to_string());
    let result = async {
        let mut pass = Pass::open(args).await?;
        let prepared = pass.prepare().await?;
        Ok::<_, anyhow::Error>((pass, prepared))
    }
    .await;
    spinner.finish_and_clear();

    let (pass, prepared) = result?;

    let calendar = match &pass.calendar {
        Some(calendar) => render_calendar(calendar),
        None => render_missing_calendar(&pass.calendar_name),
    };
    println!(
        "{} {}",
        calendar,
        render_window(&pass.window, pass.timezone()).dimmed()
    );
    println!("   {}", format!("from {}", pass.source_label).dimmed());
    println!("{}", render_plan(&prepared.plan, pass.timezone(), verbose));

    if !prepared.skipped.is_empty() {
        println!("{}", render_skipped(&prepared.skipped));
    }

    if !prepared.plan.is_empty() {
        println!("\nRun `edtsync sync` to apply.");
    }

    Ok(())
}
