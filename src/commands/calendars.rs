use anyhow::Result;
use edtsync_core::{RemoteCalendar, SyncConfig};
use edtsync_provider_google::GoogleCalendar;
use owo_colors::OwoColorize;

use super::resolve_account;
use crate::utils::tui;

pub async fn run() -> Result<()> {
    let config = SyncConfig::load()?;
    let account = resolve_account(&config)?;

    let spinner = tui::create_spinner(format!("Fetching calendars of {}", account));
    let result = async {
        let remote = GoogleCalendar::connect(&account, config.tz()?).await?;
        let calendars = remote.list_calendars().await?;
        Ok::<_, anyhow::Error>((remote, calendars))
    }
    .await;
    spinner.finish_and_clear();

    let (remote, calendars) = result?;

    if calendars.is_empty() {
        println!("No calendars found.");
        return Ok(());
    }

    println!("{}:\n", remote.account_email());

    for calendar in calendars {
        if calendar.name == config.calendar_name {
            println!("  {} {}", "*".green(), calendar.name.green());
        } else {
            println!("    {}", calendar.name);
        }
    }

    println!(
        "\n{}",
        format!("Timetable calendar: {}", config.calendar_name).dimmed()
    );

    Ok(())
}
