//! CLI command implementations
//!
//! This module re-exports all CLI command functions.

mod config_gen;
mod create;
mod stats;
mod visit;

pub use config_gen::*;
pub use create::*;
pub use stats::*;
pub use visit::*;
