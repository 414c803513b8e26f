//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! transport/middleware.rs
//!     → Logger::log (one formatted line per event)
//!     → DefaultLogger → tracing DEBUG event
//!     → tracing-subscriber fmt layer → stderr
//! ```
//!
//! # Design Decisions
//! - No logger configured means no request/response logging at all
//! - Config loading and reload use tracing macros directly

pub mod logging;

pub use logging::{init_tracing, logging_enabled, DefaultLogger, Logger};
