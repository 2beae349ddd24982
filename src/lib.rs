//! linkstat - URL shortener core with per-link visit analytics
//!
//! Short codes map to target URLs; every visit updates a per-link analytics
//! record (total visits, unique visitors, per-IP counts, clicks per day), and
//! stats queries turn the daily counts into a gap-free chart series whose
//! granularity follows the age of the link.
//!
//! # Features
//! - **cli**: Command-line front end (default)
//!
//! # Architecture
//! - `analytics`: Records, visit recording, granularity selection, series aggregation
//! - `storage`: Link and record stores (file, memory) and per-key locks
//! - `security`: Failed-attempt rate limiter and password gate
//! - `services`: Link creation, visit resolution, stats queries
//! - `config`: Configuration management
//! - `system`: Logging and application wiring
//! - `interfaces`: User interfaces (CLI)

pub mod analytics;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod errors;
#[cfg(feature = "cli")]
pub mod interfaces;
pub mod security;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;
