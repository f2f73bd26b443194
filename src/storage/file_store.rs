use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use super::{KeyValueStore, StorageError, validate_key};

// Marks the files this store owns, so a shared directory is safe to clear.
const VALUE_SUFFIX: &str = ".store.json";

/// Stores every key as `<dir>/<key>.store.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Opens the store, creating its directory when missing.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StorageError::CreateDir {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}{VALUE_SUFFIX}")))
    }

    fn is_value_file(path: &Path) -> bool {
        path.is_file()
            && path
                .file_name()
                .and_then(|name| name.to_str())
                .and_then(|name| name.strip_suffix(VALUE_SUFFIX))
                .is_some_and(|key| validate_key(key).is_ok())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Read { path, source }),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let write = |path: &Path| -> io::Result<()> {
            let mut file = fs::File::create(path)?;
            file.write_all(value.as_bytes())?;
            file.flush()
        };
        write(&path).map_err(|source| StorageError::Write { path, source })
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Remove { path, source }),
        }
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(source) => {
                return Err(StorageError::Read {
                    path: self.dir.clone(),
                    source,
                });
            }
        };

        for path in entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| Self::is_value_file(path))
        {
            fs::remove_file(&path).map_err(|source| StorageError::Remove { path: path.clone(), source })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_survive_reopening() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(dir.path()).unwrap();
        store.set("pvpFightHistory", "[]").unwrap();

        let reopened = FileStore::open(dir.path()).unwrap();
        assert_eq!(reopened.get("pvpFightHistory").unwrap().as_deref(), Some("[]"));
        assert!(dir.path().join("pvpFightHistory.store.json").exists());
    }

    #[test]
    fn missing_key_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(dir.path()).unwrap();
        assert_eq!(store.get("absent").unwrap(), None);
        store.remove("absent").unwrap();
    }

    #[test]
    fn creates_nested_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let store = FileStore::open(&nested).unwrap();
        assert!(store.dir().is_dir());
    }

    #[test]
    fn clear_only_touches_value_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(dir.path()).unwrap();
        store.set("one", "1").unwrap();
        store.set("two", "2").unwrap();
        fs::write(dir.path().join("notes.txt"), "keep").unwrap();
        fs::write(dir.path().join("settings.json"), "{}").unwrap();
        fs::write(dir.path().join("package.json"), "{}").unwrap();

        store.clear().unwrap();

        assert_eq!(store.get("one").unwrap(), None);
        assert_eq!(store.get("two").unwrap(), None);
        assert!(dir.path().join("notes.txt").exists());
        assert!(dir.path().join("settings.json").exists());
        assert!(dir.path().join("package.json").exists());
    }
}
