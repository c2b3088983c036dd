pub mod json_file;
pub mod memory;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

use std::path::Path;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

use crate::error::{AppError, AppResult};
use crate::models::{
    GateConfig, PROBABILITY_TOLERANCE, Prize, VisitorLedger, total_probability, validate_ledger,
    validate_prizes,
};

pub const REWARDS_FILE: &str = "rewards.json";
pub const USERS_FILE: &str = "users.json";
pub const CONFIG_FILE: &str = "config.json";

/// 整体读写的记录存储 (load 整个集合 / save 整个集合)
///
/// save 必须是全有或全无：失败时磁盘上保留旧内容
pub trait RecordStore<T>: Send + Sync {
    fn load(&self) -> AppResult<T>;
    fn save(&self, value: &T) -> AppResult<()>;
}

pub type CatalogStore = Arc<dyn RecordStore<Vec<Prize>>>;
pub type LedgerStore = Arc<dyn RecordStore<VisitorLedger>>;
pub type GateStore = Arc<dyn RecordStore<GateConfig>>;

/// 三个存储的集合，由 main 注入各个服务
///
/// 所有写操作 (读-改-写) 必须先持有 `write_lock()`，同一时刻只有一个写者
#[derive(Clone)]
pub struct Stores {
    pub catalog: CatalogStore,
    pub ledger: LedgerStore,
    pub gate: GateStore,
    writer: Arc<Mutex<()>>,
}

impl Stores {
    /// 数据目录下的 JSON 文件存储
    pub fn open(data_dir: impl AsRef<Path>) -> AppResult<Self> {
        let dir = data_dir.as_ref();
        std::fs::create_dir_all(dir)?;
        log::info!("Using data directory {}", dir.display());

        Ok(Self {
            catalog: Arc::new(JsonFileStore::new(dir.join(REWARDS_FILE))),
            ledger: Arc::new(JsonFileStore::new(dir.join(USERS_FILE))),
            gate: Arc::new(JsonFileStore::new(dir.join(CONFIG_FILE))),
            writer: Arc::new(Mutex::new(())),
        })
    }

    /// 内存存储 (测试 / 临时运行)
    pub fn in_memory(catalog: Vec<Prize>) -> Self {
        Self {
            catalog: Arc::new(MemoryStore::new(catalog)),
            ledger: Arc::new(MemoryStore::new(VisitorLedger::new())),
            gate: Arc::new(MemoryStore::new(GateConfig::default())),
            writer: Arc::new(Mutex::new(())),
        }
    }

    pub fn from_parts(catalog: CatalogStore, ledger: LedgerStore, gate: GateStore) -> Self {
        Self {
            catalog,
            ledger,
            gate,
            writer: Arc::new(Mutex::new(())),
        }
    }

    /// 加载并校验奖品配置
    pub fn load_catalog(&self) -> AppResult<Vec<Prize>> {
        let catalog = self.catalog.load()?;
        validate_prizes(&catalog).map_err(|e| AppError::StorageError(e.to_string()))?;
        let total = total_probability(&catalog);
        if !catalog.is_empty() && (total - 1.0).abs() > PROBABILITY_TOLERANCE {
            log::warn!("Catalog probabilities sum to {total:.4}, expected 1.0");
        }
        Ok(catalog)
    }

    /// 加载访客台账，不校验记录
    ///
    /// 单条损坏的记录不能影响其他访客，也不能阻止管理员删除/重置它；
    /// 由调用方校验自己访问的那条记录
    pub fn load_ledger(&self) -> AppResult<VisitorLedger> {
        self.ledger.load()
    }

    /// 加载并校验整个台账 (启动时)
    pub fn load_ledger_strict(&self, max_attempts: u32) -> AppResult<VisitorLedger> {
        let ledger = self.ledger.load()?;
        validate_ledger(&ledger, max_attempts)?;
        Ok(ledger)
    }

    /// 全局单写者锁
    pub async fn write_lock(&self) -> MutexGuard<'_, ()> {
        self.writer.lock().await
    }
}
