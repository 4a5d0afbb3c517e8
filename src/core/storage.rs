//! Key-value settings storage.
//!
//! Mirrors the extension storage area: an asynchronous `get_all` returning
//! every stored key and a `set` that merges the given keys into the store.
//! No schema is enforced here; validation against the defaults happens when
//! settings are loaded.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Mutex;

use serde_json::Value;

/// Flat option-name → value mapping as stored.
pub type SettingsMap = serde_json::Map<String, Value>;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("settings storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("settings file does not hold a JSON object")]
    NotAnObject,
}

pub trait SettingsStorage: Send + Sync + 'static {
    /// Every stored key and value.
    fn get_all(&self) -> impl Future<Output = Result<SettingsMap, StorageError>> + Send;

    /// Merge `values` into the store.
    fn set(&self, values: SettingsMap) -> impl Future<Output = Result<(), StorageError>> + Send;
}

// ───────────────────────────────────────── JSON file ─────────

/// Settings kept in a single JSON object on disk.
///
/// Writes read-modify-write the whole file and replace it by rename; a mutex
/// keeps concurrent `set` calls from interleaving.
pub struct JsonFileStorage {
    path: PathBuf,
    write_lock: tokio::sync::Mutex<()>,
}

impl JsonFileStorage {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Sibling file the new contents are written to before being renamed
    /// over the real one, so a reader never sees a partial file.
    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    async fn read(&self) -> Result<SettingsMap, StorageError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(SettingsMap::new()),
            Err(e) => return Err(e.into()),
        };
        if contents.trim().is_empty() {
            return Ok(SettingsMap::new());
        }
        match serde_json::from_str(&contents)? {
            Value::Object(map) => Ok(map),
            _ => Err(StorageError::NotAnObject),
        }
    }
}

impl SettingsStorage for JsonFileStorage {
    async fn get_all(&self) -> Result<SettingsMap, StorageError> {
        self.read().await
    }

    async fn set(&self, values: SettingsMap) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        // An unreadable file is left alone; writing over it would drop every
        // key not in `values`.
        let mut current = self.read().await?;
        current.extend(values);

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(&Value::Object(current))?;
        let staging = self.staging_path();
        tokio::fs::write(&staging, json).await?;
        tokio::fs::rename(&staging, &self.path).await?;
        tracing::debug!("settings written to {}", self.path.display());
        Ok(())
    }
}

// ───────────────────────────────────────── in-memory ─────────

/// Settings that live only as long as the process.
///
/// Every `set` is also logged with the (tokio) instant it happened, which is
/// what the debounce tests assert against.
#[derive(Default)]
pub struct MemoryStorage {
    values: Mutex<SettingsMap>,
    writes: Mutex<Vec<(tokio::time::Instant, SettingsMap)>>,
}

impl MemoryStorage {
    pub fn with_values(values: SettingsMap) -> Self {
        Self {
            values: Mutex::new(values),
            writes: Mutex::default(),
        }
    }

    /// Every `set` call so far, oldest first.
    pub fn writes(&self) -> Vec<(tokio::time::Instant, SettingsMap)> {
        self.writes.lock().map(|w| w.clone()).unwrap_or_default()
    }

    pub fn snapshot(&self) -> SettingsMap {
        self.values.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

impl SettingsStorage for MemoryStorage {
    async fn get_all(&self) -> Result<SettingsMap, StorageError> {
        Ok(self.snapshot())
    }

    async fn set(&self, values: SettingsMap) -> Result<(), StorageError> {
        if let Ok(mut w) = self.writes.lock() {
            w.push((tokio::time::Instant::now(), values.clone()));
        }
        if let Ok(mut v) = self.values.lock() {
            v.extend(values);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> SettingsMap {
        match value {
            Value::Object(m) => m,
            _ => unreachable!(),
        }
    }

    #[tokio::test]
    async fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path().join("nope.json"));
        assert!(storage.get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn set_merges_and_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path().join("nested/settings.json"));
        storage.set(map(json!({"showTime": true}))).await.unwrap();
        storage.set(map(json!({"zoomLevel": 120}))).await.unwrap();
        let all = storage.get_all().await.unwrap();
        assert_eq!(all.get("showTime"), Some(&json!(true)));
        assert_eq!(all.get("zoomLevel"), Some(&json!(120)));
    }

    #[tokio::test]
    async fn non_object_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "[1, 2]").unwrap();
        let storage = JsonFileStorage::new(path);
        assert!(matches!(storage.get_all().await, Err(StorageError::NotAnObject)));
    }

    #[tokio::test]
    async fn unreadable_file_is_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let truncated = r#"{"zoomLevel": 150, "customCSS": "body {"#;
        std::fs::write(&path, truncated).unwrap();

        let storage = JsonFileStorage::new(path.clone());
        let result = storage.set(map(json!({"showTime": false}))).await;
        assert!(matches!(result, Err(StorageError::Parse(_))));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), truncated);
    }

    #[tokio::test]
    async fn set_leaves_no_staging_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let storage = JsonFileStorage::new(path.clone());
        storage.set(map(json!({"showTime": true}))).await.unwrap();

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, [std::ffi::OsString::from("settings.json")]);
    }

    #[tokio::test]
    async fn memory_storage_logs_writes() {
        let storage = MemoryStorage::default();
        storage.set(map(json!({"a": 1}))).await.unwrap();
        storage.set(map(json!({"a": 2, "b": "x"}))).await.unwrap();
        assert_eq!(storage.writes().len(), 2);
        assert_eq!(storage.snapshot().get("a"), Some(&json!(2)));
    }
}
