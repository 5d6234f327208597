//! Loading the timetable export from a file or a URL.

use std::path::Path;

use anyhow::{Context, Result};
use edtsync_core::ics::IcsSource;

/// The URL to download, or `None` when `source` is a local path.
///
/// `webcal://` links are fetched over https.
fn fetch_url(source: &str) -> Option<String> {
    if let Some(rest) = source.strip_prefix("webcal://") {
        return Some(format!("https://{}", rest));
    }

    if source.starts_with("http://") || source.starts_with("https://") {
        return Some(source.to_string());
    }

    None
}

pub async fn load(source: &str) -> Result<IcsSource> {
    match fetch_url(source) {
        Some(url) => {
            tracing::debug!(url = %url, "Downloading timetable");

            let content = reqwest::get(&url)
                .await
                .with_context(|| format!("Failed to download {}", url))?
                .error_for_status()
                .with_context(|| format!("Failed to download {}", url))?
                .text()
                .await
                .with_context(|| format!("Failed to read response from {}", url))?;

            Ok(IcsSource::from_string(&content)?)
        }
        None => Ok(IcsSource::from_path(Path::new(source))?),
    }
}
