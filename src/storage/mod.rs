pub mod error;
pub mod file_store;
pub mod memory_store;

pub use error::StorageError;
pub use file_store::FileStore;
pub use memory_store::MemoryStore;

// Synchronous and process-local; writers in other processes overwrite each other.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removing an absent key is not an error.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;

    /// Erases every key held by this store.
    fn clear(&mut self) -> Result<(), StorageError>;
}

/// Keys double as file names, so they are kept to a portable alphabet.
pub fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey { key: key.to_string() })
    }
}
