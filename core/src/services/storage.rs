use directories::ProjectDirs;
use parking_lot::Mutex;
use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::warn;

const STORAGE_FILE: &str = "storage.json";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage encoding: {0}")]
    Json(#[from] serde_json::Error),
}

/// Local string keyed store. Values are opaque strings, callers own the
/// encoding. Writes replace whatever was stored under the key.
pub trait KeyValueStore: Send + Sync {
    /// Retrieve a value by key.
    fn get(&self, key: &str) -> Option<String>;
    /// Store a value under a key.
    fn set(&self, key: &str, value: String) -> Result<(), StorageError>;
}

/// Simple JSON file based key-value storage.
///
/// The whole map lives in memory and is rewritten on every change, so two
/// processes sharing a directory see last-writer-wins semantics.
pub struct FileStorage {
    file: PathBuf,
    data: Mutex<HashMap<String, String>>,
}

impl FileStorage {
    /// Open (or create) the storage file inside `dir`.
    pub fn open(dir: &Path) -> Result<Self, StorageError> {
        fs::create_dir_all(dir)?;
        let file = dir.join(STORAGE_FILE);
        let data = match fs::read(&file) {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|err| {
                warn!(path = %file.display(), "discarding unreadable storage file: {err}");
                HashMap::new()
            }),
            Err(err) if err.kind() == io::ErrorKind::NotFound => HashMap::new(),
            Err(err) => return Err(err.into()),
        };
        Ok(Self {
            file,
            data: Mutex::new(data),
        })
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.file
    }

    fn flush(&self, data: &HashMap<String, String>) -> Result<(), StorageError> {
        let bytes = serde_json::to_vec(data)?;
        fs::write(&self.file, bytes)?;
        Ok(())
    }
}

impl KeyValueStore for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.data.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        let mut data = self.data.lock();
        data.insert(key.to_string(), value);
        self.flush(&data)
    }
}

/// Volatile storage, used when nothing should outlive the process.
#[derive(Default)]
pub struct MemoryStorage {
    data: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.data.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        self.data.lock().insert(key.to_string(), value);
        Ok(())
    }
}

/// Determine the default data directory for local state.
pub fn default_data_dir() -> PathBuf {
    ProjectDirs::from("org", "lounge", "lounge")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("./lounge_data"))
}
