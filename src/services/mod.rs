//! Service layer for business logic
//!
//! This module provides the link and stats operations shared by every front
//! end (CLI today, an HTTP adapter on top of the same calls).

mod link_service;
mod stats_service;

pub use link_service::*;
pub use stats_service::*;
