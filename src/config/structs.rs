use std::env;

use serde::{Deserialize, Serialize};

use crate::analytics::GranularityThresholds;
use crate::errors::Result;

/// 默认共享密码，启动时会给出警告
pub const DEFAULT_PASSWORD: &str = "password";

/// 静态配置（从 TOML 和环境变量加载，启动时使用）
///
/// 包含：
/// - storage: 存储后端与目录
/// - auth: 共享密码
/// - rate_limit: 失败尝试限流
/// - analytics: 图表粒度阈值
/// - logging: 日志配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub analytics: GranularityThresholds,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl StaticConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：ENV(LS__*) > 旧版 ENV > 配置文件 > 默认值
    /// ENV 前缀：LS，分隔符：__
    /// 示例：LS__RATE_LIMIT__MAX_ATTEMPTS=5
    pub fn load(path: Option<&str>) -> Self {
        let path = path.unwrap_or("config.toml");
        match Self::try_load(path) {
            Ok(config) => {
                if std::path::Path::new(path).exists() {
                    eprintln!("[INFO] Configuration loaded from: {}", path);
                }
                config
            }
            Err(e) => {
                eprintln!("[ERROR] Failed to load config: {}", e);
                let mut config = Self::default();
                config.apply_legacy_env();
                config
            }
        }
    }

    pub fn try_load(path: &str) -> Result<Self> {
        use config::{Config, Environment, File};

        let settings = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("LS")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut config = settings.try_deserialize::<StaticConfig>()?;
        config.apply_legacy_env();
        config.rate_limit.max_attempts = config.rate_limit.max_attempts.max(1);
        config.rate_limit.window_secs = config.rate_limit.window_secs.max(1);
        Ok(config)
    }

    /// 兼容旧版部署使用的环境变量
    ///
    /// `PASSWORD`、`URLS_DIR`、`RATE_LIMIT_MAX`、`RATE_LIMIT_TIME`（分钟），
    /// 对应的 `LS__*` 变量存在时忽略。
    fn apply_legacy_env(&mut self) {
        if let Some(password) = legacy_env("PASSWORD", "LS__AUTH__PASSWORD") {
            self.auth.password = password;
        }
        if let Some(dir) = legacy_env("URLS_DIR", "LS__STORAGE__URLS_DIR") {
            self.storage.urls_dir = dir;
        }
        if let Some(max) = legacy_env("RATE_LIMIT_MAX", "LS__RATE_LIMIT__MAX_ATTEMPTS")
            .and_then(|v| v.parse::<u32>().ok())
            .filter(|v| *v > 0)
        {
            self.rate_limit.max_attempts = max;
        }
        if let Some(minutes) = legacy_env("RATE_LIMIT_TIME", "LS__RATE_LIMIT__WINDOW_SECS")
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|v| *v > 0)
        {
            self.rate_limit.window_secs = minutes * 60;
        }
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }

    /// 保存配置到 TOML 文件
    pub fn save_to_file<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| {
            crate::errors::LinkstatError::serialization(format!("Failed to encode config: {}", e))
        })?;

        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

fn legacy_env(name: &str, modern: &str) -> Option<String> {
    if env::var_os(modern).is_some() {
        return None;
    }
    env::var(name).ok().filter(|v| !v.is_empty())
}

/// 存储配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// file / memory
    #[serde(default = "default_storage_backend")]
    pub backend: String,
    #[serde(default = "default_urls_dir")]
    pub urls_dir: String,
    #[serde(default = "default_stats_dir")]
    pub stats_dir: String,
}

/// 认证配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_password")]
    pub password: String,
}

/// 失败尝试限流配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// text / json
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

// ============================================================
// Default value functions
// ============================================================

fn default_storage_backend() -> String {
    "file".to_string()
}

fn default_urls_dir() -> String {
    "urls".to_string()
}

fn default_stats_dir() -> String {
    "stats".to_string()
}

fn default_password() -> String {
    DEFAULT_PASSWORD.to_string()
}

fn default_max_attempts() -> u32 {
    10
}

fn default_window_secs() -> u64 {
    60
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

// ============================================================
// Default implementations
// ============================================================

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_storage_backend(),
            urls_dir: default_urls_dir(),
            stats_dir: default_stats_dir(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            password: default_password(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            window_secs: default_window_secs(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StaticConfig::default();
        assert_eq!(config.storage.backend, "file");
        assert_eq!(config.storage.urls_dir, "urls");
        assert_eq!(config.rate_limit.max_attempts, 10);
        assert_eq!(config.rate_limit.window_secs, 60);
        assert_eq!(config.analytics.daily_max_days, 30.0);
        assert_eq!(config.analytics.weekly_max_days, 730.0);
    }

    #[test]
    fn test_sample_config_round_trips() {
        let sample = StaticConfig::generate_sample_config();
        assert!(sample.contains("[rate_limit]"));
        let parsed: StaticConfig = toml::from_str(&sample).unwrap();
        assert_eq!(parsed.auth.password, DEFAULT_PASSWORD);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let parsed: StaticConfig = toml::from_str(
            r#"
            [storage]
            backend = "memory"

            [analytics]
            daily_max_days = 14.0
            "#,
        )
        .unwrap();
        assert_eq!(parsed.storage.backend, "memory");
        assert_eq!(parsed.storage.stats_dir, "stats");
        assert_eq!(parsed.analytics.daily_max_days, 14.0);
        assert_eq!(parsed.analytics.weekly_max_days, 730.0);
    }
}
