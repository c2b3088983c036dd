use serde::{Serialize, de::DeserializeOwned};
use std::io::{ErrorKind, Write};
use std::marker::PhantomData;
use std::path::PathBuf;

use super::RecordStore;
use crate::error::{AppError, AppResult};

/// JSON 文件存储
/// - 文件不存在时返回 T::default()
/// - 写入先落到同目录临时文件，再 rename 覆盖，保证原子性
pub struct JsonFileStore<T> {
    path: PathBuf,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonFileStore<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _marker: PhantomData,
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl<T> RecordStore<T> for JsonFileStore<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    fn load(&self) -> AppResult<T> {
        let data = match std::fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(T::default()),
            Err(e) => {
                log::error!("Failed to read {}: {e}", self.path.display());
                return Err(e.into());
            }
        };
        if data.iter().all(u8::is_ascii_whitespace) {
            return Ok(T::default());
        }
        serde_json::from_slice(&data).map_err(|e| {
            log::error!("Corrupted data file {}: {e}", self.path.display());
            AppError::StorageError(format!("{}: {e}", self.path.display()))
        })
    }

    fn save(&self, value: &T) -> AppResult<()> {
        let bytes = serde_json::to_vec_pretty(value)?;
        let tmp = self.temp_path();

        let result = (|| -> std::io::Result<()> {
            let mut file = std::fs::File::create(&tmp)?;
            file.write_all(&bytes)?;
            file.sync_all()?;
            std::fs::rename(&tmp, &self.path)
        })();

        if let Err(e) = result {
            log::error!("Failed to write {}: {e}", self.path.display());
            let _ = std::fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{VisitorLedger, VisitorRecord};

    fn temp_file(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("lucky-tree-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir.join(name)
    }

    #[test]
    fn test_missing_file_loads_default() {
        let store: JsonFileStore<VisitorLedger> = JsonFileStore::new(temp_file("users.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_then_load() {
        let path = temp_file("users.json");
        let store: JsonFileStore<VisitorLedger> = JsonFileStore::new(&path);

        let mut ledger = VisitorLedger::new();
        ledger.insert("10.0.0.1".into(), VisitorRecord::new(99));
        store.save(&ledger).unwrap();

        assert_eq!(store.load().unwrap(), ledger);
        assert!(!store.temp_path().exists());

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"firstSeen\": 99"));
    }

    #[test]
    fn test_corrupted_file_is_storage_error() {
        let path = temp_file("rewards.json");
        std::fs::write(&path, "{not json").unwrap();
        let store: JsonFileStore<VisitorLedger> = JsonFileStore::new(&path);
        assert!(matches!(store.load(), Err(AppError::StorageError(_))));
    }

    #[test]
    fn test_failed_save_keeps_previous_content() {
        let path = temp_file("users.json");
        let store: JsonFileStore<VisitorLedger> = JsonFileStore::new(&path);
        store.save(&VisitorLedger::new()).unwrap();

        // 临时文件路径被目录占用 -> 写入失败
        std::fs::create_dir_all(store.temp_path()).unwrap();
        let mut ledger = VisitorLedger::new();
        ledger.insert("x".into(), VisitorRecord::new(1));
        assert!(store.save(&ledger).is_err());
        assert!(store.load().unwrap().is_empty());
    }
}
