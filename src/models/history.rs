use serde::{Deserialize, Serialize};
use crate::models::fight::FightRecord;

/// One accepted submission as kept in the history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: u64,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
    pub data: FightRecord,
    pub competitor_name: String,
    pub opponent_name: String,
    /// Fingerprint of the raw submission that produced `data`.
    pub hash: String,
}

impl HistoryEntry {
    pub fn new(id: u64, timestamp: u64, data: FightRecord, hash: String) -> Self {
        Self {
            id,
            timestamp,
            competitor_name: data.competitor.name.clone(),
            opponent_name: data.opponent.name.clone(),
            data,
            hash,
        }
    }

    pub fn winner(&self) -> Option<&str> {
        self.data.winner()
    }
}
