//! Sync configuration.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::classify::{
    CategoryRule, Classifier, DEFAULT_CATEGORY, DEFAULT_COLOR, PREFIX_LEN, Palette, default_rules,
};
use crate::error::{SyncError, SyncResult};

static DEFAULT_CALENDAR_NAME: &str = "Cours";

fn default_timezone() -> String {
    iana_time_zone::get_timezone()
        .ok()
        .filter(|name| name.parse::<Tz>().is_ok())
        .unwrap_or_else(|| "UTC".to_string())
}

fn default_calendar_name() -> String {
    DEFAULT_CALENDAR_NAME.to_string()
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

fn default_color() -> Option<String> {
    Some(DEFAULT_COLOR.to_string())
}

/// Configuration at ~/.config/edtsync/config.toml
///
/// Every key can be overridden with an `EDTSYNC_`-prefixed environment
/// variable (e.g. `EDTSYNC_CALENDAR_NAME`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// IANA timezone the timetable is expressed in.
    #[serde(default = "default_timezone")]
    pub timezone: String,

    #[serde(default = "default_calendar_name")]
    pub calendar_name: String,

    #[serde(default)]
    pub include_past: bool,

    /// Path or URL of the timetable export.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ics_source: Option<String>,

    /// Google account whose stored session is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,

    #[serde(default = "default_category")]
    pub default_category: String,

    #[serde(default = "default_color")]
    pub default_color: Option<String>,

    #[serde(default = "default_rules")]
    pub categories: Vec<CategoryRule>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            timezone: default_timezone(),
            calendar_name: default_calendar_name(),
            include_past: false,
            ics_source: None,
            account: None,
            default_category: default_category(),
            default_color: default_color(),
            categories: default_rules(),
        }
    }
}

impl SyncConfig {
    pub fn config_path() -> SyncResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| SyncError::Config("Could not determine config directory".into()))?
            .join("edtsync");

        Ok(config_dir.join("config.toml"))
    }

    /// Load ~/.config/edtsync/config.toml, creating it if missing.
    pub fn load() -> SyncResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> SyncResult<Self> {
        let config: SyncConfig = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix("EDTSYNC"))
            .build()
            .map_err(|e| SyncError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| SyncError::Config(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> SyncResult<()> {
        self.tz()?;

        if let Some(rule) = self
            .categories
            .iter()
            .find(|rule| rule.prefix.chars().count() != PREFIX_LEN)
        {
            return Err(SyncError::Config(format!(
                "Category prefix '{}' must be exactly {} characters",
                rule.prefix, PREFIX_LEN
            )));
        }

        let mut names = HashSet::new();
        if let Some(rule) = self.categories.iter().find(|rule| !names.insert(&rule.name)) {
            return Err(SyncError::Config(format!(
                "Category '{}' is defined more than once",
                rule.name
            )));
        }

        Ok(())
    }

    pub fn tz(&self) -> SyncResult<Tz> {
        self.timezone
            .parse()
            .map_err(|_| SyncError::Config(format!("Unknown timezone '{}'", self.timezone)))
    }

    pub fn classifier(&self) -> Classifier {
        Classifier::new(&self.categories, &self.default_category)
    }

    pub fn palette(&self) -> Palette {
        Palette::new(&self.categories, self.default_color.as_deref())
    }

    /// The configured ICS source with `~` expanded. URLs pass through.
    pub fn ics_source(&self) -> Option<String> {
        self.ics_source
            .as_deref()
            .map(|source| shellexpand::tilde(source).into_owned())
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> SyncResult<()> {
        let contents = format!(
            "\
# edtsync configuration

# Timezone of the timetable (defaults to the system timezone):
# timezone = \"Europe/Paris\"

# Calendar that receives the timetable:
# calendar_name = \"{}\"

# Also replace events that already happened:
# include_past = false

# Timetable export, a file path or an http(s) URL:
# ics_source = \"~/Downloads/edt.ics\"

# Google account to sync with (see `edtsync auth`):
# account = \"me@example.com\"

# Title prefixes and their calendar colors:
# default_category = \"{}\"
# default_color = \"{}\"
#
# [[categories]]
# prefix = \"CM\"
# name = \"lecture\"
# color = \"6\"
",
            DEFAULT_CALENDAR_NAME, DEFAULT_CATEGORY, DEFAULT_COLOR
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                SyncError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| SyncError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}
