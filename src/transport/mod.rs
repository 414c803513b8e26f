//! HTTP transport subsystem.
//!
//! # Data Flow
//! ```text
//! Caller request
//!     → middleware.rs (merge headers, force no-cache)
//!     → format.rs + replay.rs (log redacted headers and JSON body)
//!     → round_tripper.rs (underlying hyper client)
//!     → On no response: middleware.rs retries immediately, up to max_retries
//!     → format.rs + replay.rs (log response)
//!     → Caller response (body unconsumed)
//! ```
//!
//! # Design Decisions
//! - Only a missing response is retried; any HTTP status is a response
//! - Configuration is read once per call from an atomically swapped snapshot
//! - Bodies are buffered only when they are logged or may be re-sent

pub mod error;
pub mod format;
pub mod middleware;
pub mod replay;
pub mod round_tripper;

pub use error::{BoxError, TransportError, TransportResult};
pub use format::{canonical_header_name, format_headers, DEFAULT_SEPARATOR};
pub use middleware::{BodyFormatter, Settings, Transport};
pub use replay::{is_json, replay_body, Replay};
pub use round_tripper::RoundTripper;
