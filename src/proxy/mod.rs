//! The forwarding core.
//!
//! # Data Flow
//! ```text
//! inbound request
//!     → validate.rs (target URL checks, no I/O)
//!     → headers.rs (request-direction policy)
//!     → engine.rs (single upstream attempt)
//!     → headers.rs (response-direction policy)
//!     → UpstreamResult (buffered bytes or byte-chunk stream)
//! ```
//!
//! # Design Decisions
//! - The engine depends on validation output only through the already
//!   validated `Url`, never on the validator itself
//! - Failures are an explicit tagged error type, not exceptions or callbacks
//! - One attempt per request; retry semantics are unknowable here

pub mod engine;
pub mod error;
pub mod headers;
pub mod validate;

pub use engine::{ForwardingEngine, ProxyRequest, RelayBody, UpstreamResult};
pub use error::ProxyError;
pub use validate::validate;
