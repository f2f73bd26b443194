pub mod store;

pub use store::{HistoryStore, HISTORY_CAPACITY, HISTORY_KEY};
