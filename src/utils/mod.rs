pub mod hash;
pub mod time;
pub mod settings_persistence;

pub use hash::{fingerprint, fingerprint_raw};
pub use time::{format_timestamp, get_current_timestamp_millis};
pub use settings_persistence::{auto_save_settings, load_settings, save_settings, SettingsError};
