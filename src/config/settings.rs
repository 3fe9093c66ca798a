use crate::errors::{PatchStackError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Every key accepted by `config get/set`
pub const KNOWN_KEYS: &[&str] = &[
    "review.diff_command",
    "review.land_command",
    "display.show_commit_counts",
    "display.log_limit",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub review: ReviewSettings,
    pub display: DisplaySettings,
}

/// Commands run by `arcdiff` / `arcland`.
///
/// Templates are split on whitespace. `{base}` and `{head}` expand to the
/// parent and patch tips, `{update}` expands to `--update REV` when a
/// revision is given and disappears otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewSettings {
    pub diff_command: String,
    pub land_command: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// Show the number of commits each patch adds in `show`
    pub show_commit_counts: bool,
    /// Maximum commits printed by `log`
    pub log_limit: usize,
}

impl Default for ReviewSettings {
    fn default() -> Self {
        Self {
            diff_command: "arc diff {update} {base}".to_string(),
            land_command: "arc land {head}".to_string(),
        }
    }
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            show_commit_counts: true,
            log_limit: 50,
        }
    }
}

impl Settings {
    /// Load settings from a file, defaults when it does not exist
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| PatchStackError::config(format!("Failed to read config file: {e}")))?;

        let settings: Settings = serde_json::from_str(&content)
            .map_err(|e| PatchStackError::config(format!("Failed to parse config file: {e}")))?;

        Ok(settings)
    }

    /// Save settings to a file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                PatchStackError::config(format!("Failed to create config directory: {e}"))
            })?;
        }
        crate::utils::atomic_file::write_json(path, self)
    }

    /// Update a configuration value by key
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();
        if parts.len() != 2 {
            return Err(PatchStackError::config(format!(
                "Invalid config key format: {key}"
            )));
        }

        match (parts[0], parts[1]) {
            ("review", "diff_command") => self.review.diff_command = value.to_string(),
            ("review", "land_command") => self.review.land_command = value.to_string(),
            ("display", "show_commit_counts") => {
                self.display.show_commit_counts = value.parse().map_err(|_| {
                    PatchStackError::config(format!("Invalid boolean value: {value}"))
                })?;
            }
            ("display", "log_limit") => {
                self.display.log_limit = value
                    .parse()
                    .map_err(|_| PatchStackError::config(format!("Invalid number: {value}")))?;
            }
            _ => {
                return Err(PatchStackError::config(format!(
                    "Unknown config key: {key}"
                )))
            }
        }

        Ok(())
    }

    /// Get a configuration value by key
    pub fn get_value(&self, key: &str) -> Result<String> {
        let parts: Vec<&str> = key.split('.').collect();
        if parts.len() != 2 {
            return Err(PatchStackError::config(format!(
                "Invalid config key format: {key}"
            )));
        }

        let value = match (parts[0], parts[1]) {
            ("review", "diff_command") => self.review.diff_command.clone(),
            ("review", "land_command") => self.review.land_command.clone(),
            ("display", "show_commit_counts") => self.display.show_commit_counts.to_string(),
            ("display", "log_limit") => self.display.log_limit.to_string(),
            _ => {
                return Err(PatchStackError::config(format!(
                    "Unknown config key: {key}"
                )))
            }
        };

        Ok(value)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        for (key, command) in [
            ("review.diff_command", &self.review.diff_command),
            ("review.land_command", &self.review.land_command),
        ] {
            if command.split_whitespace().next().is_none() {
                return Err(PatchStackError::config(format!("{key} must not be empty")));
            }
        }

        if self.display.log_limit == 0 {
            return Err(PatchStackError::config(
                "display.log_limit must be at least 1",
            ));
        }

        Ok(())
    }
}
