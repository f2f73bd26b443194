pub mod stats;
pub mod fight;
pub mod history;
pub mod settings;

pub use stats::CombatantStats;
pub use fight::{FightRecord, resolve_winner};
pub use history::HistoryEntry;
pub use settings::TrackerSettings;
