//! OpenStack HTTP transport middleware.
//!
//! Wraps the HTTP client used by every OpenStack API call to inject
//! headers, retry calls that produced no response, and log requests and
//! responses with credentials redacted.

pub mod config;
pub mod observability;
pub mod redaction;
pub mod transport;

pub use config::TransportConfig;
pub use observability::{DefaultLogger, Logger};
pub use redaction::{default_sensitive_headers, RedactionPolicy};
pub use transport::{RoundTripper, Transport, TransportError};
