use std::sync::RwLock;

use super::RecordStore;
use crate::error::{AppError, AppResult};

/// 进程内存储，用于测试和无数据目录的临时运行
pub struct MemoryStore<T> {
    value: RwLock<T>,
}

impl<T> MemoryStore<T> {
    pub fn new(value: T) -> Self {
        Self {
            value: RwLock::new(value),
        }
    }
}

impl<T> RecordStore<T> for MemoryStore<T>
where
    T: Clone + Send + Sync,
{
    fn load(&self) -> AppResult<T> {
        self.value
            .read()
            .map(|v| v.clone())
            .map_err(|_| AppError::StorageError("memory store poisoned".into()))
    }

    fn save(&self, value: &T) -> AppResult<()> {
        let mut guard = self
            .value
            .write()
            .map_err(|_| AppError::StorageError("memory store poisoned".into()))?;
        *guard = value.clone();
        Ok(())
    }
}
