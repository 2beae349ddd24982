use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::trace;

use super::{LimiterStateStore, LinkStore, RecordStore};
use crate::analytics::LinkStats;
use crate::security::LimiterSnapshot;
use crate::errors::Result;

/// 进程内存储，用于测试和临时运行
#[derive(Default)]
pub struct MemoryStore {
    links: DashMap<String, String>,
    records: DashMap<String, LinkStats>,
    limiter: Mutex<Option<LimiterSnapshot>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn get(&self, short_code: &str) -> Result<Option<LinkStats>> {
        Ok(self.records.get(short_code).map(|r| r.value().clone()))
    }

    async fn put(&self, short_code: &str, stats: LinkStats) -> Result<()> {
        trace!("MemoryStore: put stats for {}", short_code);
        self.records.insert(short_code.to_string(), stats);
        Ok(())
    }

    async fn exists(&self, short_code: &str) -> Result<bool> {
        Ok(self.records.contains_key(short_code))
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[async_trait]
impl LinkStore for MemoryStore {
    async fn get_target(&self, short_code: &str) -> Result<Option<String>> {
        Ok(self.links.get(short_code).map(|t| t.value().clone()))
    }

    async fn put_target(&self, short_code: &str, target_url: &str) -> Result<()> {
        self.links
            .insert(short_code.to_string(), target_url.to_string());
        Ok(())
    }

    async fn has_link(&self, short_code: &str) -> Result<bool> {
        Ok(self.links.contains_key(short_code))
    }
}

#[async_trait]
impl LimiterStateStore for MemoryStore {
    async fn load_limiter(&self) -> Result<Option<LimiterSnapshot>> {
        Ok(*self.limiter.lock())
    }

    async fn save_limiter(&self, snapshot: LimiterSnapshot) -> Result<()> {
        *self.limiter.lock() = Some(snapshot);
        Ok(())
    }
}
