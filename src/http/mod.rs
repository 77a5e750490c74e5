//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, dispatch)
//!     → /proxy   → proxy core (validate, forward, relay via response.rs)
//!     → /search  → search.rs (redirect to /proxy)
//!     → fallback → static frontend
//! ```

pub mod response;
pub mod search;
pub mod server;

pub use server::HttpServer;
