//! 存储抽象
//!
//! 两个按短码索引的键值存储：
//! - `LinkStore`：短码 → 当前目标地址（跳转的主数据）
//! - `RecordStore`：短码 → 统计文档 `LinkStats`
//!
//! 两者分开保存，统计文档读写失败不会影响链接创建和跳转。
//!
//! `LimiterStateStore` 保存认证限流器的状态，供不常驻的前端跨进程使用。

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::analytics::LinkStats;
use crate::config::StorageConfig;
use crate::security::LimiterSnapshot;
use crate::errors::{LinkstatError, Result};

pub mod file;
pub mod locks;
pub mod memory;

pub use file::FileStore;
pub use locks::{KeyGuard, KeyLocks};
pub use memory::MemoryStore;

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn get(&self, short_code: &str) -> Result<Option<LinkStats>>;
    /// 创建或整体替换
    async fn put(&self, short_code: &str, stats: LinkStats) -> Result<()>;
    async fn exists(&self, short_code: &str) -> Result<bool>;
    fn backend_name(&self) -> &'static str;
}

#[async_trait]
pub trait LinkStore: Send + Sync {
    async fn get_target(&self, short_code: &str) -> Result<Option<String>>;
    async fn put_target(&self, short_code: &str, target_url: &str) -> Result<()>;
    async fn has_link(&self, short_code: &str) -> Result<bool>;
}

#[async_trait]
pub trait LimiterStateStore: Send + Sync {
    async fn load_limiter(&self) -> Result<Option<LimiterSnapshot>>;
    async fn save_limiter(&self, snapshot: LimiterSnapshot) -> Result<()>;
}

/// 同一后端提供的存储句柄
#[derive(Clone)]
pub struct Stores {
    pub links: Arc<dyn LinkStore>,
    pub records: Arc<dyn RecordStore>,
    pub limiter: Arc<dyn LimiterStateStore>,
}

impl Stores {
    pub fn from_backend<S>(backend: Arc<S>) -> Self
    where
        S: LinkStore + RecordStore + LimiterStateStore + 'static,
    {
        Self {
            links: backend.clone(),
            records: backend.clone(),
            limiter: backend,
        }
    }
}

pub struct StorageFactory;

impl StorageFactory {
    pub async fn create(config: &StorageConfig) -> Result<Stores> {
        let stores = match config.backend.as_str() {
            "memory" => Stores::from_backend(Arc::new(MemoryStore::new())),
            "file" => Stores::from_backend(Arc::new(
                FileStore::open(&config.urls_dir, &config.stats_dir).await?,
            )),
            other => {
                return Err(LinkstatError::storage_backend(format!(
                    "Unknown storage backend: '{}'. Valid: file, memory",
                    other
                )));
            }
        };
        info!("Using storage backend: {}", stores.records.backend_name());
        Ok(stores)
    }
}
