//! Stored OAuth session (access + refresh token) for a Google account.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use google_calendar::{AccessToken, Client};
use serde::{Deserialize, Serialize};

use crate::app_config::{AppConfig, base_dir};

pub struct Session {
    account_email: String,
    data: SessionData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    access_token: String,
    refresh_token: String,
    expires_at: DateTime<Utc>,
}

impl From<&AccessToken> for SessionData {
    fn from(tokens: &AccessToken) -> Self {
        SessionData {
            access_token: tokens.access_token.clone(),
            refresh_token: tokens.refresh_token.clone(),
            expires_at: Utc::now() + Duration::seconds(tokens.expires_in),
        }
    }
}

fn sessions_dir() -> Result<PathBuf> {
    Ok(base_dir()?.join("session"))
}

fn path_in(dir: &Path, account_email: &str) -> PathBuf {
    let email_slug = account_email.replace(['/', '\\', ':'], "_");
    dir.join(format!("{}.toml", email_slug))
}

fn accounts_in(dir: &Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut accounts: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "toml"))
        .filter_map(|path| path.file_stem().map(|s| s.to_string_lossy().into_owned()))
        .collect();

    accounts.sort();
    accounts
}

impl Session {
    pub fn new(account_email: &str, data: SessionData) -> Self {
        Session {
            account_email: account_email.to_string(),
            data,
        }
    }

    pub fn account_email(&self) -> &str {
        &self.account_email
    }

    /// Accounts with a stored session.
    pub fn accounts() -> Result<Vec<String>> {
        Ok(accounts_in(&sessions_dir()?))
    }

    pub fn client(&self) -> Result<Client> {
        let app_config = AppConfig::load()?;

        Ok(Client::new(
            app_config.client_id,
            app_config.client_secret,
            String::new(),
            self.data.access_token.clone(),
            self.data.refresh_token.clone(),
        ))
    }

    /// Load a session, refreshing it first if it has expired.
    pub async fn load_valid(account_email: &str) -> Result<Self> {
        let mut session = Self::load_from(&sessions_dir()?, account_email)?;

        if session.is_expired() {
            tracing::debug!(account = account_email, "Refreshing expired Google session");
            session.refresh().await?;
        }

        Ok(session)
    }

    fn load_from(dir: &Path, account_email: &str) -> Result<Self> {
        let path = path_in(dir, account_email);

        if !path.exists() {
            anyhow::bail!(
                "Google OAuth session for {} not found. Run `edtsync auth` first.",
                account_email
            );
        }

        let contents = std::fs::read_to_string(&path).with_context(|| {
            format!(
                "Failed to read Google OAuth session from {}",
                path.display()
            )
        })?;

        let data: SessionData = toml::from_str(&contents).with_context(|| {
            format!(
                "Failed to parse Google OAuth session from {}",
                path.display()
            )
        })?;

        Ok(Session::new(account_email, data))
    }

    pub fn save(&self) -> Result<()> {
        self.save_in(&sessions_dir()?)
    }

    fn save_in(&self, dir: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(&self.data).context("Failed to serialize session")?;

        let path = path_in(dir, &self.account_email);

        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;

        std::fs::write(&path, contents)
            .with_context(|| format!("Failed to write session to {}", path.display()))?;

        // Owner-only, the file holds OAuth tokens
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600))
                .with_context(|| format!("Failed to set permissions on {}", path.display()))?;
        }

        Ok(())
    }

    fn is_expired(&self) -> bool {
        Utc::now() >= self.data.expires_at
    }

    async fn refresh(&mut self) -> Result<()> {
        let mut tokens = self
            .client()?
            .refresh_access_token()
            .await
            .context("Failed to refresh token")?;

        // Google usually omits the refresh token on refresh
        if tokens.refresh_token.is_empty() {
            tokens.refresh_token = self.data.refresh_token.clone();
        }

        self.data = (&tokens).into();
        self.save()?;

        Ok(())
    }
}
