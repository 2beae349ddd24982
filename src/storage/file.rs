//! 文件存储后端
//!
//! 目录布局：
//! - `{urls_dir}/{code}.url`：纯文本目标地址
//! - `{stats_dir}/{code}.json`：格式化的统计文档
//! - `{stats_dir}/.ratelimit.json`：认证限流状态（以 `.` 开头，不会与短码冲突）
//!
//! 写入先落到同目录的临时文件再 rename，读方不会看到写了一半的文件。
//! 临时文件名带进程号和序号，并发写入同一短码时各自独立，最后一次 rename 生效。

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, error, info, warn};

use super::{LimiterStateStore, LinkStore, RecordStore};
use crate::analytics::LinkStats;
use crate::errors::{LinkstatError, Result};
use crate::security::LimiterSnapshot;
use crate::utils::is_valid_short_code;

const LIMITER_FILE: &str = ".ratelimit.json";

/// 临时文件序号，同一进程内的并发写入互不覆盖
static TMP_SEQ: AtomicU64 = AtomicU64::new(0);

pub struct FileStore {
    urls_dir: PathBuf,
    stats_dir: PathBuf,
}

impl FileStore {
    /// 打开存储目录，不存在时创建
    pub async fn open(urls_dir: impl AsRef<Path>, stats_dir: impl AsRef<Path>) -> Result<Self> {
        let store = Self {
            urls_dir: urls_dir.as_ref().to_path_buf(),
            stats_dir: stats_dir.as_ref().to_path_buf(),
        };

        for dir in [&store.urls_dir, &store.stats_dir] {
            fs::create_dir_all(dir).await.map_err(|e| {
                error!("Failed to create storage directory {}: {}", dir.display(), e);
                LinkstatError::file_operation(format!(
                    "Failed to create directory {}: {}",
                    dir.display(),
                    e
                ))
            })?;
        }

        info!(
            "FileStore ready (urls: {}, stats: {})",
            store.urls_dir.display(),
            store.stats_dir.display()
        );
        Ok(store)
    }

    fn url_path(&self, short_code: &str) -> Result<PathBuf> {
        Self::ensure_safe_code(short_code)?;
        Ok(self.urls_dir.join(format!("{}.url", short_code)))
    }

    fn stats_path(&self, short_code: &str) -> Result<PathBuf> {
        Self::ensure_safe_code(short_code)?;
        Ok(self.stats_dir.join(format!("{}.json", short_code)))
    }

    /// 短码直接映射为文件名，必须拒绝路径分隔符等字符
    fn ensure_safe_code(short_code: &str) -> Result<()> {
        if is_valid_short_code(short_code) {
            Ok(())
        } else {
            Err(LinkstatError::validation(format!(
                "Invalid short code: '{}'",
                short_code
            )))
        }
    }

    async fn read_optional(path: &Path) -> Result<Option<String>> {
        match fs::read_to_string(path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(LinkstatError::file_operation(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    fn tmp_path(path: &Path) -> PathBuf {
        let seq = TMP_SEQ.fetch_add(1, Ordering::Relaxed);
        let mut tmp = path.as_os_str().to_owned();
        tmp.push(format!(".{}.{}.tmp", process::id(), seq));
        PathBuf::from(tmp)
    }

    async fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
        let tmp = Self::tmp_path(path);
        let written = match fs::write(&tmp, content).await {
            Ok(()) => fs::rename(&tmp, path).await.map_err(|e| {
                LinkstatError::file_operation(format!(
                    "Failed to replace {}: {}",
                    path.display(),
                    e
                ))
            }),
            Err(e) => Err(LinkstatError::file_operation(format!(
                "Failed to write {}: {}",
                tmp.display(),
                e
            ))),
        };
        if written.is_err() {
            let _ = fs::remove_file(&tmp).await;
        }
        written
    }

    async fn file_exists(path: &Path) -> Result<bool> {
        fs::try_exists(path).await.map_err(|e| {
            LinkstatError::file_operation(format!("Failed to stat {}: {}", path.display(), e))
        })
    }
}

#[async_trait]
impl RecordStore for FileStore {
    async fn get(&self, short_code: &str) -> Result<Option<LinkStats>> {
        let path = self.stats_path(short_code)?;
        let Some(raw) = Self::read_optional(&path).await? else {
            return Ok(None);
        };
        let stats = serde_json::from_str::<LinkStats>(&raw).map_err(|e| {
            LinkstatError::serialization(format!("Malformed stats file {}: {}", path.display(), e))
        })?;
        Ok(Some(stats))
    }

    async fn put(&self, short_code: &str, stats: LinkStats) -> Result<()> {
        let path = self.stats_path(short_code)?;
        let json = serde_json::to_string_pretty(&stats)?;
        Self::write_atomic(&path, json.as_bytes()).await?;
        debug!("FileStore: wrote {}", path.display());
        Ok(())
    }

    async fn exists(&self, short_code: &str) -> Result<bool> {
        Self::file_exists(&self.stats_path(short_code)?).await
    }

    fn backend_name(&self) -> &'static str {
        "file"
    }
}

#[async_trait]
impl LinkStore for FileStore {
    async fn get_target(&self, short_code: &str) -> Result<Option<String>> {
        let path = self.url_path(short_code)?;
        Ok(Self::read_optional(&path)
            .await?
            .map(|content| content.trim().to_string()))
    }

    async fn put_target(&self, short_code: &str, target_url: &str) -> Result<()> {
        let path = self.url_path(short_code)?;
        Self::write_atomic(&path, target_url.as_bytes()).await?;
        debug!("FileStore: wrote {}", path.display());
        Ok(())
    }

    async fn has_link(&self, short_code: &str) -> Result<bool> {
        Self::file_exists(&self.url_path(short_code)?).await
    }
}

#[async_trait]
impl LimiterStateStore for FileStore {
    async fn load_limiter(&self) -> Result<Option<LimiterSnapshot>> {
        let path = self.stats_dir.join(LIMITER_FILE);
        let Some(raw) = Self::read_optional(&path).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(e) => {
                // 损坏的限流状态不应阻止访问，按新窗口处理
                warn!("Ignoring malformed limiter state {}: {}", path.display(), e);
                Ok(None)
            }
        }
    }

    async fn save_limiter(&self, snapshot: LimiterSnapshot) -> Result<()> {
        let path = self.stats_dir.join(LIMITER_FILE);
        let json = serde_json::to_string(&snapshot)?;
        Self::write_atomic(&path, json.as_bytes()).await
    }
}
