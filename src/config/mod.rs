pub mod settings;

pub use settings::{DisplaySettings, ReviewSettings, Settings, KNOWN_KEYS};

use crate::errors::{PatchStackError, Result};
use crate::git::resolve_git_dir;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the settings file in both the global and repository directories
pub const CONFIG_FILE: &str = "config.json";

/// Get the user-wide configuration directory (~/.patchstack/)
pub fn get_config_dir() -> Result<PathBuf> {
    let home_dir = dirs::home_dir()
        .ok_or_else(|| PatchStackError::config("Could not find home directory"))?;
    Ok(home_dir.join(".patchstack"))
}

/// Get the per-repository state directory (`<git-dir>/patchstack/`)
pub fn get_state_dir(workdir: &Path) -> Result<PathBuf> {
    Ok(resolve_git_dir(workdir)?.join("patchstack"))
}

pub fn global_config_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join(CONFIG_FILE))
}

pub fn repo_config_path(workdir: &Path) -> Result<PathBuf> {
    Ok(get_state_dir(workdir)?.join(CONFIG_FILE))
}

/// Effective settings for a repository: repository values override
/// user-wide ones key by key, defaults fill the rest.
pub fn load_settings(workdir: &Path) -> Result<Settings> {
    let global = global_config_path().ok();
    load_layered(global.as_deref(), &repo_config_path(workdir)?)
}

/// Merge two settings files, `repo` winning over `global`
pub fn load_layered(global: Option<&Path>, repo: &Path) -> Result<Settings> {
    let mut merged = Value::Object(Default::default());
    if let Some(global) = global {
        merge_values(&mut merged, read_value(global)?);
    }
    merge_values(&mut merged, read_value(repo)?);

    let settings: Settings = serde_json::from_value(merged)
        .map_err(|e| PatchStackError::config(format!("Invalid configuration: {e}")))?;
    settings.validate()?;

    tracing::debug!("Loaded settings: {:?}", settings);
    Ok(settings)
}

fn read_value(path: &Path) -> Result<Value> {
    if !path.exists() {
        return Ok(Value::Null);
    }

    let content = fs::read_to_string(path)
        .map_err(|e| PatchStackError::config(format!("Failed to read config file: {e}")))?;
    serde_json::from_str(&content).map_err(|e| {
        PatchStackError::config(format!("Failed to parse {}: {e}", path.display()))
    })
}

fn merge_values(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                merge_values(base.entry(key).or_insert(Value::Null), value);
            }
        }
        (_, Value::Null) => {}
        (slot, value) => *slot = value,
    }
}
