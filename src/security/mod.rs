//! Cross-request protections around the forwarding core.
//!
//! Rate limiting and the security-header baseline live here; both run as
//! middleware outside the core, which stays free of shared mutable state.

pub mod headers;
pub mod rate_limit;

pub use rate_limit::RateLimiterState;
