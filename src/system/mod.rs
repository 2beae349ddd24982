//! System-level modules
//!
//! - Logging initialization
//! - Application context (stores, limiter, services wired from config)

pub mod context;
pub mod logging;

pub use context::AppContext;
pub use logging::init_logging;
