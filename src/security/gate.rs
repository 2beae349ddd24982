//! 受保护操作的认证关口
//!
//! 共享密码 + 失败尝试限流。被限流、密码错误、资源不存在是三种不同的结果，
//! 调用方据此返回不同的响应。

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use subtle::ConstantTimeEq;
use tracing::{info, warn};

use super::rate_limit::{LimiterState, RateLimiter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateError {
    /// 失败次数过多，服务暂不可用
    TemporarilyUnavailable { retry_after: Duration },
    InvalidCredentials,
}

impl fmt::Display for GateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TemporarilyUnavailable { retry_after } => write!(
                f,
                "Too many failed attempts. Service temporarily unavailable, retry in {}s",
                retry_after.as_secs()
            ),
            Self::InvalidCredentials => write!(f, "Invalid password"),
        }
    }
}

impl std::error::Error for GateError {}

pub struct AuthGate {
    password: String,
    limiter: Arc<RateLimiter>,
}

impl AuthGate {
    pub fn new(password: impl Into<String>, limiter: Arc<RateLimiter>) -> Self {
        Self {
            password: password.into(),
            limiter,
        }
    }

    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    /// 仅检查限流状态，不消耗尝试次数
    pub fn ensure_open(&self) -> Result<(), GateError> {
        self.limiter
            .check()
            .map_err(|blocked| GateError::TemporarilyUnavailable {
                retry_after: blocked.retry_after,
            })
    }

    /// 校验密码
    ///
    /// 已被限流时即使密码正确也拒绝；导致达到上限的那次失败直接返回
    /// `TemporarilyUnavailable`。成功会清零失败计数。
    pub fn authorize(&self, supplied: &str) -> Result<(), GateError> {
        self.ensure_open()?;

        if bool::from(supplied.as_bytes().ct_eq(self.password.as_bytes())) {
            self.limiter.record_success();
            info!("AuthGate: authorization succeeded");
            return Ok(());
        }

        match self.limiter.record_failure() {
            LimiterState::Blocked => Err(GateError::TemporarilyUnavailable {
                retry_after: self.limiter.retry_after(),
            }),
            LimiterState::Open => {
                warn!("AuthGate: invalid password");
                Err(GateError::InvalidCredentials)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::clock::SystemClock;

    fn gate(max: u32) -> AuthGate {
        let limiter = Arc::new(RateLimiter::new(
            max,
            Duration::from_secs(60),
            SystemClock::arc(),
        ));
        AuthGate::new("s3cret", limiter)
    }

    #[test]
    fn test_correct_password() {
        assert_eq!(gate(3).authorize("s3cret"), Ok(()));
    }

    #[test]
    fn test_wrong_password_then_block() {
        let gate = gate(2);
        assert_eq!(gate.authorize("nope"), Err(GateError::InvalidCredentials));
        assert!(matches!(
            gate.authorize("nope"),
            Err(GateError::TemporarilyUnavailable { .. })
        ));
        // 正确密码同样被拒绝
        assert!(matches!(
            gate.authorize("s3cret"),
            Err(GateError::TemporarilyUnavailable { .. })
        ));
    }

    #[test]
    fn test_success_clears_failures() {
        let gate = gate(3);
        gate.authorize("a").unwrap_err();
        gate.authorize("b").unwrap_err();
        gate.authorize("s3cret").unwrap();
        assert_eq!(gate.limiter().failures(), 0);
    }

    #[test]
    fn test_prefix_is_not_enough() {
        let gate = gate(5);
        assert_eq!(gate.authorize("s3c"), Err(GateError::InvalidCredentials));
        assert_eq!(gate.authorize(""), Err(GateError::InvalidCredentials));
    }
}
