//! Access control for gated operations (link creation, stats queries)

pub mod gate;
pub mod rate_limit;

pub use gate::{AuthGate, GateError};
pub use rate_limit::{Blocked, LimiterSnapshot, LimiterState, RateLimiter};
