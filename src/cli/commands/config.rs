use crate::cli::output::Output;
use crate::cli::ConfigAction;
use crate::config::{global_config_path, load_settings, repo_config_path, Settings, KNOWN_KEYS};
use crate::errors::{PatchStackError, Result};
use crate::git::find_repository_root;
use std::env;
use std::path::{Path, PathBuf};

/// Handle configuration commands
pub async fn run(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Set { key, value, global } => {
            let file = if global {
                global_config_path()?
            } else {
                repo_config_path(&repo_root()?)?
            };
            set_config_value(&file, &key, &value)
        }
        ConfigAction::Get { key, global } => {
            let settings = settings_for(global)?;
            println!("{}", settings.get_value(&key)?);
            Ok(())
        }
        ConfigAction::List { global } => {
            let settings = settings_for(global)?;
            for key in KNOWN_KEYS {
                println!("{key} = {}", settings.get_value(key)?);
            }
            Ok(())
        }
    }
}

fn set_config_value(config_file: &Path, key: &str, value: &str) -> Result<()> {
    let mut settings = Settings::load_from_file(config_file)?;
    settings.set_value(key, value)?;
    settings.validate()?;
    settings.save_to_file(config_file)?;

    Output::success(format!("Configuration updated: {key} = {value}"));
    if key.starts_with("review.") && !value.contains("{base}") && !value.contains("{head}") {
        Output::tip("Use {base} and {head} to pass the parent and patch tips");
    }
    Ok(())
}

fn settings_for(global: bool) -> Result<Settings> {
    if global {
        Settings::load_from_file(&global_config_path()?)
    } else {
        load_settings(&repo_root()?)
    }
}

fn repo_root() -> Result<PathBuf> {
    let current_dir = env::current_dir()
        .map_err(|e| PatchStackError::config(format!("Could not get current directory: {e}")))?;
    find_repository_root(&current_dir)
}
