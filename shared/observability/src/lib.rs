//! MediSense observability
//!
//! Tracing subscriber setup plus an actix-web middleware that tags every
//! request with a trace id and logs its outcome and latency.

pub mod init;
pub mod middleware;
pub mod trace_context;

pub use init::*;
pub use middleware::*;
pub use trace_context::*;

// Re-export tracing for convenience
pub use tracing::{debug, error, info, instrument, warn, Instrument};
