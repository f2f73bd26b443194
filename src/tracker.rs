use crate::history::HistoryStore;
use crate::models::{FightRecord, HistoryEntry};
use crate::parsing::{parse_fight_data, ValidationError};
use crate::storage::KeyValueStore;
use crate::utils::hash::fingerprint_raw;
use crate::utils::time::get_current_timestamp_millis;

pub const DRAFT_KEY: &str = "pvpFightDraft";
pub const DUPLICATE_MESSAGE: &str = "This fight data has already been added to history.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Duplicate,
}

impl Rejection {
    pub fn message(&self) -> &'static str {
        match self {
            Rejection::Duplicate => DUPLICATE_MESSAGE,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    Accepted {
        entry: HistoryEntry,
        winner: Option<String>,
    },
    Rejected(Rejection),
}

impl Submission {
    /// The normalized record of an accepted submission.
    pub fn record(&self) -> Option<&FightRecord> {
        match self {
            Submission::Accepted { entry, .. } => Some(&entry.data),
            Submission::Rejected(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deletion {
    pub removed: bool,
    /// The deleted entry was on display and the display must be cleared.
    pub display_cleared: bool,
}

/// Submission flow over the history store. Also remembers which entry is on
/// display so front ends know when a deletion invalidates what they show.
pub struct Tracker<S: KeyValueStore> {
    history: HistoryStore<S>,
    current_id: Option<u64>,
}

impl<S: KeyValueStore> Tracker<S> {
    pub fn new(storage: S) -> Self {
        Self {
            history: HistoryStore::load(storage),
            current_id: None,
        }
    }

    pub fn submit(&mut self, raw: &str) -> Result<Submission, ValidationError> {
        self.submit_at(raw, get_current_timestamp_millis())
    }

    /// `submit` with an explicit creation time in Unix milliseconds.
    pub fn submit_at(&mut self, raw: &str, now_ms: u64) -> Result<Submission, ValidationError> {
        let raw = raw.trim();
        let record = parse_fight_data(raw).inspect_err(|e| {
            tracing::debug!(error = %e, "Rejected invalid fight data");
        })?;

        let hash = fingerprint_raw(raw);
        if self.history.contains_hash(&hash) {
            tracing::info!(%hash, "Duplicate fight submission");
            return Ok(Submission::Rejected(Rejection::Duplicate));
        }

        let id = self.history.next_id(now_ms);
        let entry = HistoryEntry::new(id, now_ms, record, hash);
        let winner = entry.winner().map(str::to_string);
        self.history.insert(entry.clone());
        self.current_id = Some(id);
        self.discard_draft();

        tracing::info!(
            id,
            competitor = %entry.competitor_name,
            opponent = %entry.opponent_name,
            winner = winner.as_deref().unwrap_or("none"),
            "Accepted fight"
        );
        Ok(Submission::Accepted { entry, winner })
    }

    /// Puts a stored entry on display. Unknown ids leave the display as is.
    pub fn select(&mut self, id: u64) -> Option<&HistoryEntry> {
        let entry = self.history.get(id)?;
        self.current_id = Some(id);
        Some(entry)
    }

    pub fn delete_entry(&mut self, id: u64) -> Deletion {
        let before = self.history.len();
        let removed = self.history.delete(id).len() != before;
        let display_cleared = self.current_id == Some(id);
        if display_cleared {
            self.current_id = None;
        }
        Deletion {
            removed,
            display_cleared,
        }
    }

    pub fn clear_display(&mut self) {
        self.current_id = None;
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
        self.current_id = None;
    }

    /// Erases the history and every other stored value, including the draft.
    pub fn clear_all_storage(&mut self) {
        self.history.clear_all();
        self.current_id = None;
    }

    pub fn current(&self) -> Option<&HistoryEntry> {
        self.current_id.and_then(|id| self.history.get(id))
    }

    pub fn history(&self) -> &[HistoryEntry] {
        self.history.entries()
    }

    pub fn get(&self, id: u64) -> Option<&HistoryEntry> {
        self.history.get(id)
    }

    pub fn save_draft(&mut self, text: &str) {
        if let Err(e) = self.history.storage_mut().set(DRAFT_KEY, text) {
            tracing::error!(error = %e, "Failed to save draft");
        }
    }

    pub fn draft(&self) -> Option<String> {
        match self.history.storage().get(DRAFT_KEY) {
            Ok(draft) => draft.filter(|text| !text.trim().is_empty()),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read draft");
                None
            }
        }
    }

    pub fn discard_draft(&mut self) {
        if let Err(e) = self.history.storage_mut().remove(DRAFT_KEY) {
            tracing::error!(error = %e, "Failed to discard draft");
        }
    }
}
