//! 应用上下文
//!
//! 按配置创建存储、限流器和服务，前端只持有 `AppContext`。
//!
//! 限流状态有两种延续方式：
//! - 常驻进程调用 `spawn_limiter_reset`，由后台任务按窗口清零
//! - 单次运行的 CLI 通过 `build` 恢复、`persist_limiter` 保存，窗口跨进程延续

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::config::{DEFAULT_PASSWORD, StaticConfig};
use crate::errors::Result;
use crate::security::{AuthGate, RateLimiter};
use crate::services::{LinkService, StatsService};
use crate::storage::{StorageFactory, Stores};
use crate::utils::clock::Clock;

pub struct AppContext {
    pub stores: Stores,
    pub limiter: Arc<RateLimiter>,
    pub stats: Arc<StatsService>,
    pub links: Arc<LinkService>,
}

impl AppContext {
    pub async fn build(config: &StaticConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        let stores = StorageFactory::create(&config.storage).await?;
        let ctx = Self::with_stores(config, stores, clock);
        ctx.restore_limiter().await?;
        Ok(ctx)
    }

    /// 使用已有的存储句柄组装（测试中注入内存或故障存储）
    pub fn with_stores(config: &StaticConfig, stores: Stores, clock: Arc<dyn Clock>) -> Self {
        if config.auth.password == DEFAULT_PASSWORD {
            warn!("Using the default password, set auth.password or PASSWORD before exposing this instance");
        }

        let limiter = Arc::new(RateLimiter::from_config(&config.rate_limit, clock.clone()));
        let gate = Arc::new(AuthGate::new(config.auth.password.clone(), limiter.clone()));
        let stats = Arc::new(StatsService::new(
            stores.records.clone(),
            config.analytics,
        ));
        let links = Arc::new(LinkService::new(
            stores.links.clone(),
            stats.clone(),
            gate,
            clock,
        ));

        debug!(
            "AppContext ready: {} attempts per {:?}",
            limiter.max_attempts(),
            limiter.window()
        );

        Self {
            stores,
            limiter,
            stats,
            links,
        }
    }

    /// 从存储恢复上次保存的限流状态
    pub async fn restore_limiter(&self) -> Result<()> {
        if let Some(snapshot) = self.stores.limiter.load_limiter().await? {
            self.limiter.restore(snapshot);
            debug!(
                "Limiter state restored: {}/{} failures",
                self.limiter.failures(),
                self.limiter.max_attempts()
            );
        }
        Ok(())
    }

    pub async fn persist_limiter(&self) -> Result<()> {
        self.stores
            .limiter
            .save_limiter(self.limiter.snapshot())
            .await
    }

    /// 启动限流窗口的周期清零任务（长驻进程使用）
    pub fn spawn_limiter_reset(&self) -> JoinHandle<()> {
        let limiter = self.limiter.clone();
        tokio::spawn(async move { limiter.run_reset_loop().await })
    }
}
