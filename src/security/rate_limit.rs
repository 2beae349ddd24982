//! 失败尝试限流器
//!
//! 进程级共享计数器：每次认证失败加一，达到上限后所有受保护的操作都被拒绝，
//! 直到固定窗口到期、计数器被无条件清零。
//!
//! 状态机：`Open` → (failures >= max) → `Blocked` → (reset) → `Open`
//!
//! 清零由 `run_reset_loop` 按窗口周期驱动，与请求流无关；`reset()` 也可以
//! 由其他调度方式直接调用。
//!
//! 短命进程（CLI）没有后台任务，通过 `snapshot` / `restore` 把计数器和窗口
//! 起点保存在存储中，跨进程延续同一个窗口。

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::RateLimitConfig;
use crate::utils::clock::Clock;

/// 限流器状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimiterState {
    Open,
    Blocked,
}

/// 被限流时返回，携带距离下次清零的时间
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Blocked {
    pub retry_after: Duration,
}

/// 可持久化的限流状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LimiterSnapshot {
    pub failures: u32,
    pub window_started: DateTime<Utc>,
}

/// 窗口最短 1 秒
const MIN_WINDOW: Duration = Duration::from_secs(1);

struct LimiterInner {
    failures: u32,
    window_started: DateTime<Utc>,
}

pub struct RateLimiter {
    max_attempts: u32,
    window: Duration,
    clock: Arc<dyn Clock>,
    inner: Mutex<LimiterInner>,
}

impl RateLimiter {
    pub fn new(max_attempts: u32, window: Duration, clock: Arc<dyn Clock>) -> Self {
        let window_started = clock.now();
        Self {
            max_attempts: max_attempts.max(1),
            window: window.max(MIN_WINDOW),
            clock,
            inner: Mutex::new(LimiterInner {
                failures: 0,
                window_started,
            }),
        }
    }

    pub fn from_config(config: &RateLimitConfig, clock: Arc<dyn Clock>) -> Self {
        Self::new(
            config.max_attempts,
            Duration::from_secs(config.window_secs),
            clock,
        )
    }

    pub fn state(&self) -> LimiterState {
        if self.inner.lock().failures >= self.max_attempts {
            LimiterState::Blocked
        } else {
            LimiterState::Open
        }
    }

    /// 检查是否允许继续尝试
    pub fn check(&self) -> Result<(), Blocked> {
        let inner = self.inner.lock();
        if inner.failures >= self.max_attempts {
            Err(Blocked {
                retry_after: self.remaining(&inner),
            })
        } else {
            Ok(())
        }
    }

    /// 记录一次失败，返回记录后的状态
    pub fn record_failure(&self) -> LimiterState {
        let mut inner = self.inner.lock();
        inner.failures = inner.failures.saturating_add(1);
        if inner.failures >= self.max_attempts {
            warn!(
                "RateLimiter: {} failed attempts, blocking until window reset",
                inner.failures
            );
            LimiterState::Blocked
        } else {
            debug!(
                "RateLimiter: failed attempt {}/{}",
                inner.failures, self.max_attempts
            );
            LimiterState::Open
        }
    }

    /// 认证成功后清零失败计数（不影响窗口起点）
    pub fn record_success(&self) {
        self.inner.lock().failures = 0;
    }

    /// 清零计数并开始新窗口
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        if inner.failures > 0 {
            debug!("RateLimiter: window reset, clearing {} failures", inner.failures);
        }
        inner.failures = 0;
        inner.window_started = self.clock.now();
    }

    pub fn failures(&self) -> u32 {
        self.inner.lock().failures
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// 距离下次清零的时间
    pub fn retry_after(&self) -> Duration {
        let inner = self.inner.lock();
        self.remaining(&inner)
    }

    fn remaining(&self, inner: &LimiterInner) -> Duration {
        let elapsed = (self.clock.now() - inner.window_started)
            .to_std()
            .unwrap_or(Duration::ZERO);
        // 清零任务稍有延迟时至少让调用方等 1 秒
        self.window
            .saturating_sub(elapsed)
            .max(Duration::from_secs(1))
    }

    pub fn snapshot(&self) -> LimiterSnapshot {
        let inner = self.inner.lock();
        LimiterSnapshot {
            failures: inner.failures,
            window_started: inner.window_started,
        }
    }

    /// 恢复保存的状态
    ///
    /// 保存后已经过去的整窗口视为已清零，窗口起点按周期对齐；
    /// 起点晚于当前时间时从现在开始计窗口。
    pub fn restore(&self, snapshot: LimiterSnapshot) {
        let now = self.clock.now();
        let mut inner = self.inner.lock();

        let Ok(elapsed) = (now - snapshot.window_started).to_std() else {
            inner.failures = snapshot.failures;
            inner.window_started = now;
            return;
        };

        let window_ms = self.window.as_millis();
        let passed = elapsed.as_millis() / window_ms;
        if passed == 0 {
            inner.failures = snapshot.failures;
            inner.window_started = snapshot.window_started;
        } else {
            let offset = elapsed.as_millis() - passed * window_ms;
            let offset = chrono::Duration::milliseconds(i64::try_from(offset).unwrap_or(0));
            debug!(
                "RateLimiter: {} window(s) elapsed since snapshot, clearing {} failures",
                passed, snapshot.failures
            );
            inner.failures = 0;
            inner.window_started = now - offset;
        }
    }

    /// 按窗口周期清零，作为后台任务运行
    ///
    /// 启动时先清零，使 `retry_after` 与清零周期从同一时刻起算。
    pub async fn run_reset_loop(&self) {
        self.reset();
        let start = tokio::time::Instant::now() + self.window;
        let mut ticker = tokio::time::interval_at(start, self.window);
        loop {
            ticker.tick().await;
            self.reset();
        }
    }
}
