use std::collections::HashSet;
use serde::Deserialize;
use serde_json::Value;
use crate::models::{FightRecord, HistoryEntry};
use crate::storage::KeyValueStore;
use crate::utils::hash::{fingerprint, fingerprint_raw};

pub const HISTORY_KEY: &str = "pvpFightHistory";
pub const HISTORY_CAPACITY: usize = 50;

/// Shape of a persisted entry. Older versions did not store `hash`, and the
/// name columns are rebuilt from `data` when missing.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredEntry {
    id: u64,
    timestamp: u64,
    data: Value,
    #[serde(default)]
    competitor_name: Option<String>,
    #[serde(default)]
    opponent_name: Option<String>,
    #[serde(default)]
    hash: Option<String>,
}

#[derive(Debug, Default)]
struct LoadReport {
    skipped: usize,
    backfilled: usize,
    dropped: usize,
}

impl LoadReport {
    fn needs_rewrite(&self) -> bool {
        // Skipped entries keep their bytes until the next mutation.
        self.skipped == 0 && (self.backfilled > 0 || self.dropped > 0)
    }
}

/// Bounded, newest-first history kept under `pvpFightHistory`. Every mutation
/// is written through; write failures are logged and the in-memory state
/// stays authoritative.
pub struct HistoryStore<S: KeyValueStore> {
    storage: S,
    entries: Vec<HistoryEntry>,
}

impl<S: KeyValueStore> HistoryStore<S> {
    /// Restores the history from `storage`. Missing or unreadable data
    /// yields an empty history; this never fails.
    pub fn load(storage: S) -> Self {
        let mut store = Self {
            storage,
            entries: Vec::new(),
        };

        let raw = match store.storage.get(HISTORY_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::debug!("No saved fight history, starting empty");
                return store;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read fight history, starting empty");
                return store;
            }
        };

        let items = match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Array(items)) => items,
            Ok(_) => {
                tracing::warn!("Saved fight history is not a list, starting empty");
                return store;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Saved fight history is corrupt, starting empty");
                return store;
            }
        };

        let (entries, report) = decode_entries(items);
        store.entries = entries;
        tracing::info!(
            entries = store.entries.len(),
            skipped = report.skipped,
            backfilled = report.backfilled,
            "Loaded fight history"
        );

        if report.needs_rewrite() {
            store.persist();
        }
        store
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: u64) -> Option<&HistoryEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn contains_hash(&self, hash: &str) -> bool {
        self.entries.iter().any(|entry| entry.hash == hash)
    }

    /// Whether a raw submission was already accepted. Surrounding
    /// whitespace is ignored, as it is on submit.
    pub fn is_duplicate(&self, raw: &str) -> bool {
        self.contains_hash(&fingerprint_raw(raw.trim()))
    }

    /// An id not used by any entry, at least `now`.
    pub fn next_id(&self, now: u64) -> u64 {
        match self.entries.iter().map(|entry| entry.id).max() {
            Some(max) if max >= now => max.saturating_add(1),
            _ => now,
        }
    }

    /// Prepends `entry`, evicting the oldest entries beyond capacity.
    /// Duplicate checks are the caller's job.
    pub fn insert(&mut self, entry: HistoryEntry) -> &[HistoryEntry] {
        tracing::debug!(id = entry.id, hash = %entry.hash, "Inserting history entry");
        self.entries.insert(0, entry);
        if self.entries.len() > HISTORY_CAPACITY {
            let evicted = self.entries.len() - HISTORY_CAPACITY;
            self.entries.truncate(HISTORY_CAPACITY);
            tracing::debug!(evicted, "Evicted oldest history entries");
        }
        self.persist();
        &self.entries
    }

    /// Removes the entry with `id`; unknown ids are ignored.
    pub fn delete(&mut self, id: u64) -> &[HistoryEntry] {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        if self.entries.len() != before {
            tracing::info!(id, "Deleted history entry");
        }
        self.persist();
        &self.entries
    }

    /// Empties the history and removes its key from storage.
    pub fn clear(&mut self) -> &[HistoryEntry] {
        self.entries.clear();
        if let Err(e) = self.storage.remove(HISTORY_KEY) {
            tracing::error!(error = %e, "Failed to remove saved fight history");
        }
        tracing::info!("Cleared fight history");
        &self.entries
    }

    /// Empties the history and erases everything else in the storage too.
    pub fn clear_all(&mut self) -> &[HistoryEntry] {
        self.entries.clear();
        if let Err(e) = self.storage.clear() {
            tracing::error!(error = %e, "Failed to clear storage");
        }
        tracing::info!("Cleared all stored data");
        &self.entries
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    fn persist(&mut self) {
        let json = match serde_json::to_string(&self.entries) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize fight history");
                return;
            }
        };
        if let Err(e) = self.storage.set(HISTORY_KEY, &json) {
            tracing::error!(error = %e, "Failed to save fight history");
        }
    }
}

fn decode_entries(items: Vec<Value>) -> (Vec<HistoryEntry>, LoadReport) {
    let mut report = LoadReport::default();
    let mut seen = HashSet::new();
    let mut entries = Vec::with_capacity(items.len().min(HISTORY_CAPACITY));

    for (index, item) in items.into_iter().enumerate() {
        let Some((entry, backfilled)) = decode_entry(index, item) else {
            report.skipped += 1;
            continue;
        };
        if entries.len() == HISTORY_CAPACITY || !seen.insert(entry.hash.clone()) {
            report.dropped += 1;
            continue;
        }
        if backfilled {
            report.backfilled += 1;
        }
        entries.push(entry);
    }
    (entries, report)
}

/// Decodes one persisted entry, returning whether its hash had to be
/// recomputed.
fn decode_entry(index: usize, item: Value) -> Option<(HistoryEntry, bool)> {
    let stored: StoredEntry = match serde_json::from_value(item) {
        Ok(stored) => stored,
        Err(e) => {
            tracing::warn!(index, error = %e, "Skipping unreadable history entry");
            return None;
        }
    };

    let (hash, backfilled) = match stored.hash.filter(|hash| !hash.is_empty()) {
        Some(hash) => (hash, false),
        None => (fingerprint(&stored.data), true),
    };

    let data: FightRecord = match serde_json::from_value(stored.data) {
        Ok(data) => data,
        Err(e) => {
            tracing::warn!(index, id = stored.id, error = %e, "Skipping history entry with unreadable fight data");
            return None;
        }
    };

    let competitor_name = stored
        .competitor_name
        .unwrap_or_else(|| data.competitor.name.clone());
    let opponent_name = stored
        .opponent_name
        .unwrap_or_else(|| data.opponent.name.clone());

    Some((
        HistoryEntry {
            id: stored.id,
            timestamp: stored.timestamp,
            data,
            competitor_name,
            opponent_name,
            hash,
        },
        backfilled,
    ))
}
