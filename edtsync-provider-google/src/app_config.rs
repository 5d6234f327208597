//! OAuth client credentials for the Google backend.
//!
//! User-provided, stored at:
//!   ~/.config/edtsync/google/app_config.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub client_id: String,
    pub client_secret: String,
}

pub fn base_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .context("Could not determine config directory")?
        .join("edtsync")
        .join("google"))
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        Self::load_from(&base_dir()?.join("app_config.toml"))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            anyhow::bail!(
                "Google credentials not found.\n\n\
                Create {} with:\n\n\
                client_id = \"your-client-id.apps.googleusercontent.com\"\n\
                client_secret = \"your-client-secret\"\n\n\
                See https://console.cloud.google.com/apis/credentials for setup.",
                path.display()
            );
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read credentials from {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse credentials from {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credentials_explain_setup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app_config.toml");

        let err = AppConfig::load_from(&path).unwrap_err().to_string();

        assert!(err.contains("client_id"));
        assert!(err.contains(&path.display().to_string()));
    }

    #[test]
    fn test_credentials_are_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app_config.toml");
        std::fs::write(&path, "client_id = \"abc\"\nclient_secret = \"shh\"\n").unwrap();

        let config = AppConfig::load_from(&path).unwrap();

        assert_eq!(config.client_id, "abc");
        assert_eq!(config.client_secret, "shh");
    }
}
