use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use crate::models::TrackerSettings;

pub const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to write settings file {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize settings")]
    Serialize(#[from] serde_json::Error),
}

pub fn get_settings_file_path() -> PathBuf {
    PathBuf::from(SETTINGS_FILE)
}

pub fn load_settings(file_path: &Path) -> TrackerSettings {
    if !file_path.exists() {
        tracing::debug!(path = %file_path.display(), "No settings file found, using defaults");
        return TrackerSettings::default();
    }

    match fs::read_to_string(file_path) {
        Ok(content) => match serde_json::from_str::<TrackerSettings>(&content) {
            Ok(mut settings) => {
                settings.sanitize();
                tracing::debug!(
                    storage_dir = %settings.storage_dir.display(),
                    restore_draft = settings.restore_draft,
                    "Loaded settings"
                );
                settings
            }
            Err(e) => {
                tracing::warn!(path = %file_path.display(), error = %e, "Error parsing settings JSON, using defaults");
                TrackerSettings::default()
            }
        },
        Err(e) => {
            tracing::warn!(path = %file_path.display(), error = %e, "Error reading settings file, using defaults");
            TrackerSettings::default()
        }
    }
}

pub fn save_settings(file_path: &Path, settings: &TrackerSettings) -> Result<(), SettingsError> {
    let json_content = serde_json::to_string_pretty(settings)?;

    let write = |path: &Path| -> std::io::Result<()> {
        let mut file = fs::File::create(path)?;
        file.write_all(json_content.as_bytes())?;
        file.flush()
    };
    write(file_path).map_err(|source| SettingsError::Write {
        path: file_path.to_path_buf(),
        source,
    })?;

    tracing::debug!(path = %file_path.display(), "Saved settings");
    Ok(())
}

pub fn auto_save_settings(file_path: &Path, settings: &TrackerSettings) {
    if let Err(e) = save_settings(file_path, settings) {
        tracing::error!(error = %e, "Failed to auto-save settings");
    }
}
