//! 日志初始化测试
//!
//! 全局 subscriber 每个进程只能安装一次，本文件只有一个测试。

use linkstat::config::LoggingConfig;
use linkstat::system::init_logging;
use tempfile::TempDir;

#[test]
fn test_dropping_guard_flushes_file_output() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("linkstat.log");

    let config = LoggingConfig {
        level: "info".to_string(),
        format: "text".to_string(),
        file: Some(path.to_string_lossy().into_owned()),
        max_backups: 1,
        enable_rotation: false,
    };
    let guard = init_logging(&config).unwrap();

    tracing::error!("failed before exit: disk full");
    tracing::debug!("filtered out");
    drop(guard);

    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.contains("failed before exit: disk full"));
    assert!(written.contains("ERROR"));
    assert!(!written.contains("filtered out"));
}
