use anyhow::{Context, Result};
use std::{
    fs::OpenOptions,
    io::Write,
    path::{Path, PathBuf},
};

use crate::{config::LOCATION_KEY, model::LocationKey};

/// Append-only dotenv file holding the resolved location key.
///
/// Entries are never rewritten or deduplicated. When the file holds more than
/// one key, the first one wins, matching how the file is loaded into the
/// environment.
#[derive(Debug, Clone)]
pub struct LocationStore {
    path: PathBuf,
}

impl LocationStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append_location_key(&self, key: &LocationKey) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create env file directory: {}", parent.display())
            })?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open env file: {}", self.path.display()))?;

        write!(file, "\n\n# Location key for AccuWeather searches\n{LOCATION_KEY}='{key}'")
            .with_context(|| format!("Failed to write env file: {}", self.path.display()))?;

        tracing::info!(message = "persisted location key", key = %key, path = %self.path.display());
        Ok(())
    }

    pub fn read_location_key(&self) -> Result<Option<LocationKey>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let iter = dotenvy::from_path_iter(&self.path)
            .with_context(|| format!("Failed to open env file: {}", self.path.display()))?;

        for item in iter {
            let (name, value) =
                item.with_context(|| format!("Failed to parse env file: {}", self.path.display()))?;

            if name == LOCATION_KEY && !value.trim().is_empty() {
                return Ok(Some(LocationKey::new(value.trim())));
            }
        }

        Ok(None)
    }
}
