use std::fmt;

#[derive(Debug, Clone)]
pub enum LinkstatError {
    Config(String),
    StorageBackend(String),
    FileOperation(String),
    Serialization(String),
    Validation(String),
    NotFound(String),
    DateParse(String),
}

impl LinkstatError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            LinkstatError::Config(_) => "E001",
            LinkstatError::StorageBackend(_) => "E002",
            LinkstatError::FileOperation(_) => "E003",
            LinkstatError::Serialization(_) => "E004",
            LinkstatError::Validation(_) => "E005",
            LinkstatError::NotFound(_) => "E006",
            LinkstatError::DateParse(_) => "E007",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            LinkstatError::Config(_) => "Configuration Error",
            LinkstatError::StorageBackend(_) => "Storage Backend Error",
            LinkstatError::FileOperation(_) => "File Operation Error",
            LinkstatError::Serialization(_) => "Serialization Error",
            LinkstatError::Validation(_) => "Validation Error",
            LinkstatError::NotFound(_) => "Resource Not Found",
            LinkstatError::DateParse(_) => "Date Parse Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            LinkstatError::Config(msg)
            | LinkstatError::StorageBackend(msg)
            | LinkstatError::FileOperation(msg)
            | LinkstatError::Serialization(msg)
            | LinkstatError::Validation(msg)
            | LinkstatError::NotFound(msg)
            | LinkstatError::DateParse(msg) => msg,
        }
    }

    /// 格式化为彩色输出（用于终端）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出（用于日志）
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for LinkstatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for LinkstatError {}

// 便捷的构造函数
impl LinkstatError {
    pub fn config<T: Into<String>>(msg: T) -> Self {
        LinkstatError::Config(msg.into())
    }

    pub fn storage_backend<T: Into<String>>(msg: T) -> Self {
        LinkstatError::StorageBackend(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        LinkstatError::FileOperation(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        LinkstatError::Serialization(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        LinkstatError::Validation(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        LinkstatError::NotFound(msg.into())
    }

    pub fn date_parse<T: Into<String>>(msg: T) -> Self {
        LinkstatError::DateParse(msg.into())
    }
}

impl From<std::io::Error> for LinkstatError {
    fn from(err: std::io::Error) -> Self {
        LinkstatError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for LinkstatError {
    fn from(err: serde_json::Error) -> Self {
        LinkstatError::Serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for LinkstatError {
    fn from(err: chrono::ParseError) -> Self {
        LinkstatError::DateParse(err.to_string())
    }
}

impl From<config::ConfigError> for LinkstatError {
    fn from(err: config::ConfigError) -> Self {
        LinkstatError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LinkstatError>;
