use anyhow::Result;
use edtsync_core::SyncConfig;
use owo_colors::OwoColorize;

pub async fn run() -> Result<()> {
    println!("Authenticating with Google...");

    let account = edtsync_provider_google::authenticate().await?;

    println!("Authenticated as: {}\n", account.green());

    let config = SyncConfig::load()?;

    match &config.account {
        Some(configured) if configured != &account => println!(
            "Note: {} is configured to sync with {}.\nEdit {} to switch accounts.",
            "edtsync".bold(),
            configured,
            SyncConfig::config_path()?.display()
        ),
        _ => println!("Run `edtsync status` to preview a sync."),
    }

    Ok(())
}
