//! Observability concerns. Logging only; metrics exposition is out of scope.

pub mod logging;
