use std::path::PathBuf;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerSettings {
    /// Directory holding the persisted history and draft
    pub storage_dir: PathBuf,
    /// Whether to offer the saved draft at startup
    pub restore_draft: bool,
    /// chrono format string used when listing history timestamps
    pub timestamp_format: String,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from("pvp_tracker_data"),
            restore_draft: true,
            timestamp_format: "%Y-%m-%d %H:%M".to_string(),
        }
    }
}

impl TrackerSettings {
    /// Replaces values that cannot be used with their defaults
    pub fn sanitize(&mut self) {
        let defaults = Self::default();
        if self.timestamp_format.trim().is_empty() {
            self.timestamp_format = defaults.timestamp_format;
        }
        if self.storage_dir.as_os_str().is_empty() {
            self.storage_dir = defaults.storage_dir;
        }
    }
}
