//! Link service layer
//!
//! User-facing operations shared by every front end:
//! - `create_link`: gated; the target mapping is the primary effect, the
//!   analytics record is best-effort
//! - `resolve_visit`: lookup with redirect-loop protection, visit recorded
//!   best-effort
//! - `stats`: gated stats query, "no data" is `Ok(None)`

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, trace, warn};

use super::stats_service::{StatsReport, StatsService, VisitOutcome};
use crate::analytics::{Granularity, UNKNOWN_IP};
use crate::errors::LinkstatError;
use crate::security::{AuthGate, GateError};
use crate::utils::clock::Clock;
use crate::utils::url_validator::{UrlValidationError, is_self_redirect, validate_target_url};
use crate::utils::{is_valid_short_code, normalize_short_code};

use crate::storage::{KeyLocks, LinkStore};

#[derive(Debug)]
pub enum ServiceError {
    Gate(GateError),
    Validation(String),
    Storage(LinkstatError),
}

impl ServiceError {
    /// 被限流时的重试等待时间
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::Gate(GateError::TemporarilyUnavailable { retry_after }) => Some(*retry_after),
            _ => None,
        }
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gate(e) => write!(f, "{}", e),
            Self::Validation(msg) => write!(f, "{}", msg),
            Self::Storage(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ServiceError {}

impl From<GateError> for ServiceError {
    fn from(err: GateError) -> Self {
        Self::Gate(err)
    }
}

impl From<LinkstatError> for ServiceError {
    fn from(err: LinkstatError) -> Self {
        Self::Storage(err)
    }
}

impl From<UrlValidationError> for ServiceError {
    fn from(err: UrlValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct CreateLinkRequest {
    pub short_code: String,
    pub target_url: String,
    pub password: String,
    /// 访问域名，用于拼接短链接和识别自引用
    pub host: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreatedLink {
    pub short_code: String,
    pub target_url: String,
    pub short_url: Option<String>,
    /// 统计记录是否写入成功
    pub analytics_recorded: bool,
}

/// 访问短码的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Redirect(String),
    NotFound,
    /// 目标为空或指回本站
    Invalid,
}

pub struct LinkService {
    links: Arc<dyn LinkStore>,
    stats: Arc<StatsService>,
    gate: Arc<AuthGate>,
    clock: Arc<dyn Clock>,
    /// 同一短码的创建串行执行，目标地址与统计记录顺序一致
    locks: KeyLocks,
}

impl LinkService {
    pub fn new(
        links: Arc<dyn LinkStore>,
        stats: Arc<StatsService>,
        gate: Arc<AuthGate>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            links,
            stats,
            gate,
            clock,
            locks: KeyLocks::new(),
        }
    }

    pub fn gate(&self) -> &Arc<AuthGate> {
        &self.gate
    }

    pub async fn create_link(&self, req: CreateLinkRequest) -> Result<CreatedLink, ServiceError> {
        self.gate.ensure_open()?;

        let short_code = normalize_short_code(&req.short_code);
        let target_url = req.target_url.trim();
        if short_code.is_empty() || target_url.is_empty() || req.password.is_empty() {
            return Err(ServiceError::Validation("All fields are required".into()));
        }

        self.gate.authorize(&req.password)?;

        if !is_valid_short_code(&short_code) {
            return Err(ServiceError::Validation(
                "Short name may only contain letters, numbers, and hyphens".into(),
            ));
        }
        validate_target_url(target_url, req.host.as_deref())?;

        let _guard = self.locks.acquire(&short_code).await;
        self.links.put_target(&short_code, target_url).await?;

        let analytics_recorded = match self
            .stats
            .start_record(&short_code, target_url, self.clock.now())
            .await
        {
            Ok(()) => true,
            Err(e) => {
                error!("Error updating stats for creation of {}: {}", short_code, e);
                false
            }
        };

        info!("Created short link: {} -> {}", short_code, target_url);

        Ok(CreatedLink {
            short_url: req
                .host
                .as_deref()
                .map(|host| format!("https://{}/{}", host, short_code)),
            short_code,
            target_url: target_url.to_string(),
            analytics_recorded,
        })
    }

    /// 解析访问并记录统计
    ///
    /// 统计写入失败只记录日志，不影响跳转结果。
    pub async fn resolve_visit(
        &self,
        short_code: &str,
        host: Option<&str>,
        source_ip: Option<&str>,
    ) -> Result<Resolution, LinkstatError> {
        if !is_valid_short_code(short_code) {
            trace!("Invalid short code rejected: {}", short_code);
            return Ok(Resolution::NotFound);
        }

        let Some(target) = self.links.get_target(short_code).await? else {
            return Ok(Resolution::NotFound);
        };

        if target.is_empty() {
            warn!("Short link {} has an empty target", short_code);
            return Ok(Resolution::Invalid);
        }
        if let Some(host) = host
            && is_self_redirect(&target, host)
        {
            warn!("Short link {} points back to {}", short_code, host);
            return Ok(Resolution::Invalid);
        }

        let ip = source_ip.unwrap_or(UNKNOWN_IP);
        match self
            .stats
            .record_visit(short_code, &target, ip, self.clock.now())
            .await
        {
            Ok(VisitOutcome::Recorded(kind)) => {
                trace!("Visit to {} recorded ({:?})", short_code, kind);
            }
            Ok(VisitOutcome::Unmatched) => {
                warn!(
                    "No stats record matches current target of {}, only total visits updated",
                    short_code
                );
            }
            Ok(VisitOutcome::NoDocument) => {
                trace!("No stats document for {}, visit not recorded", short_code);
            }
            Err(e) => {
                error!("Error updating stats for visit to {}: {}", short_code, e);
            }
        }

        Ok(Resolution::Redirect(target))
    }

    /// 查询统计（需要密码）
    pub async fn stats(
        &self,
        short_code: &str,
        password: &str,
        granularity: Option<Granularity>,
    ) -> Result<Option<StatsReport>, ServiceError> {
        self.gate.ensure_open()?;

        let short_code = short_code.trim();
        if short_code.is_empty() || password.is_empty() {
            return Err(ServiceError::Validation("All fields are required".into()));
        }

        self.gate.authorize(password)?;

        if !is_valid_short_code(short_code) {
            return Ok(None);
        }

        Ok(self
            .stats
            .report(short_code, self.clock.now(), granularity)
            .await?)
    }
}
