use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use crate::models::stats::CombatantStats;

/// A validated, normalized encounter between two combatants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FightRecord {
    pub competitor: CombatantStats,
    pub opponent: CombatantStats,
    /// Top-level keys of the submission other than the two combatants.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FightRecord {
    pub fn winner(&self) -> Option<&str> {
        resolve_winner(self)
    }
}

/// The survivor's name when exactly one side died, otherwise `None`.
pub fn resolve_winner(record: &FightRecord) -> Option<&str> {
    match (record.competitor.dead, record.opponent.dead) {
        (false, true) => Some(record.competitor.name.as_str()),
        (true, false) => Some(record.opponent.name.as_str()),
        _ => None,
    }
}
