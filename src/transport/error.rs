//! Transport error definitions.

use thiserror::Error;

/// Error type produced by underlying transports.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that stop a round trip.
#[derive(Debug, Error)]
pub enum TransportError {
    /// No underlying transport has been configured.
    #[error("underlying transport is nil, aborting")]
    NilTransport,

    /// Every attempt failed without producing a response.
    #[error("OpenStack connection error, retries exhausted after {retries} retries. Aborting. Last error was: {source}")]
    RetriesExhausted {
        retries: u32,
        #[source]
        source: BoxError,
    },

    /// A request or response body could not be read while buffering it.
    #[error("failed to read body: {0}")]
    BodyIo(#[from] axum::Error),
}

/// Convenience result alias for round trips.
pub type TransportResult<T> = Result<T, TransportError>;
