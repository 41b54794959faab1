use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use lettre::message::Mailbox;
use serde::{Deserialize, Serialize};
use std::{
    fmt, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::model::LocationKey;

pub const ACCU_API_KEY: &str = "ACCU_API_KEY";
pub const EMAIL_ORIGIN: &str = "EMAIL_ORIGIN";
pub const EMAIL_DESTINATIONS: &str = "EMAIL_DESTINATIONS";
pub const GMAIL_PWORD: &str = "GMAIL_PWORD";
pub const LOCATION_KEY: &str = "LOCATION_KEY";
pub const NYC_PRIMARY_KEY: &str = "NYC_PRIMARY_KEY";

/// Non-secret tunables, stored as TOML.
///
/// Example TOML:
/// smtp_host = "smtp.gmail.com"
/// smtp_port = 465
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub accuweather_url: String,
    pub nyc_url: String,
    pub smtp_host: String,
    /// Implicit TLS port.
    pub smtp_port: u16,
    pub timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            accuweather_url: "http://dataservice.accuweather.com/".to_string(),
            nyc_url: "https://api.nyc.gov/public/api/".to_string(),
            smtp_host: "smtp.gmail.com".to_string(),
            smtp_port: 465,
            timeout_secs: 10,
        }
    }
}

impl Settings {
    /// Load settings from disk, or return defaults if the file doesn't exist yet.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;

        let settings: Settings = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse settings file: {}", path.display()))?;

        Ok(settings)
    }

    /// Save settings to disk, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml = toml::to_string_pretty(self).context("Failed to serialize settings to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write settings file: {}", path.display()))?;

        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("dev", "morning-announcements", "announce")
        .ok_or_else(|| anyhow!("Could not determine platform config directory"))
}

/// Path to the settings file.
pub fn default_settings_path() -> Result<PathBuf> {
    Ok(project_dirs()?.config_dir().join("settings.toml"))
}

/// Path to the dotenv file: `./.env` when present, otherwise one in the platform config directory.
pub fn default_env_file() -> Result<PathBuf> {
    let local = PathBuf::from(".env");
    if local.exists() {
        return Ok(local);
    }

    Ok(project_dirs()?.config_dir().join("announce.env"))
}

/// Seed the process environment from a dotenv file. Variables already set are kept.
pub fn load_env_file(path: &Path) -> Result<()> {
    if !path.exists() {
        tracing::debug!(message = "no env file found", path = %path.display());
        return Ok(());
    }

    dotenvy::from_path(path)
        .with_context(|| format!("Failed to load env file: {}", path.display()))?;

    tracing::debug!(message = "loaded env file", path = %path.display());
    Ok(())
}

/// Everything a run needs, gathered once at startup.
#[derive(Clone)]
pub struct Config {
    pub accu_api_key: String,
    pub email_origin: Mailbox,
    pub email_destinations: Vec<Mailbox>,
    pub mailbox_password: String,
    pub location_key: Option<LocationKey>,
    pub nyc_primary_key: String,
    pub settings: Settings,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("email_origin", &self.email_origin)
            .field("email_destinations", &self.email_destinations)
            .field("location_key", &self.location_key)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Build the config from the process environment.
    pub fn from_env(settings: Settings) -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok(), settings)
    }

    /// Build the config from any variable source.
    pub fn from_lookup<F>(lookup: F, settings: Settings) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let origin = required(&lookup, EMAIL_ORIGIN)?;
        let email_origin = origin
            .parse::<Mailbox>()
            .with_context(|| format!("{EMAIL_ORIGIN} is not a valid email address: {origin}"))?;

        Ok(Self {
            accu_api_key: required(&lookup, ACCU_API_KEY)?,
            email_origin,
            email_destinations: parse_recipients(&required(&lookup, EMAIL_DESTINATIONS)?)?,
            mailbox_password: required(&lookup, GMAIL_PWORD)?,
            location_key: optional(&lookup, LOCATION_KEY).map(LocationKey::new),
            nyc_primary_key: required(&lookup, NYC_PRIMARY_KEY)?,
            settings,
        })
    }

    #[cfg(test)]
    pub(crate) fn for_tests() -> Self {
        Self::from_lookup(
            |name| match name {
                ACCU_API_KEY => Some("ACCU".into()),
                EMAIL_ORIGIN => Some("me@example.com".into()),
                EMAIL_DESTINATIONS => Some("you@example.com".into()),
                GMAIL_PWORD => Some("hunter2".into()),
                NYC_PRIMARY_KEY => Some("NYC".into()),
                _ => None,
            },
            Settings::default(),
        )
        .expect("test config must be valid")
    }
}

/// Read one required variable from the process environment.
pub fn require_env(name: &str) -> Result<String> {
    required(&|n: &str| std::env::var(n).ok(), name)
}

fn optional<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn required<F>(lookup: &F, name: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    optional(lookup, name).ok_or_else(|| {
        anyhow!(
            "Missing required setting {name}.\n\
             Hint: export it or add `{name}=...` to your env file."
        )
    })
}

/// Parse a comma- and/or whitespace-delimited list of addresses.
pub fn parse_recipients(raw: &str) -> Result<Vec<Mailbox>> {
    let recipients = raw
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<Mailbox>()
                .with_context(|| format!("{EMAIL_DESTINATIONS} contains an invalid address: {s}"))
        })
        .collect::<Result<Vec<_>>>()?;

    if recipients.is_empty() {
        return Err(anyhow!("{EMAIL_DESTINATIONS} does not list any recipients"));
    }

    Ok(recipients)
}
