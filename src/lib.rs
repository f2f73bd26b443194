pub mod cli;
pub mod history;
pub mod models;
pub mod parsing;
pub mod storage;
pub mod tracker;
pub mod utils;


pub use history::{HistoryStore, HISTORY_CAPACITY, HISTORY_KEY};
pub use models::{CombatantStats, FightRecord, HistoryEntry, TrackerSettings, resolve_winner};
pub use parsing::{parse_fight_data, ValidationError};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
pub use tracker::{Deletion, Rejection, Submission, Tracker, DRAFT_KEY, DUPLICATE_MESSAGE};
pub use utils::{fingerprint, fingerprint_raw};
