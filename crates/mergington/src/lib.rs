//! The shared library for Mergington, the extracurricular activity sign-up service.
//!
//! This library holds the wire data structures exchanged with clients, shared
//! error types and the logging setup used by the backend.

pub mod data;
pub mod errors;
pub mod log;

pub use serde;
pub use serde_json;
pub use tracing;
