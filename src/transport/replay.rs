//! Body buffering and replay.
//!
//! # Responsibilities
//! - Drain JSON bodies so they can be logged
//! - Hand a fresh, unconsumed body back to the next consumer
//! - Leave every other body untouched and unread
//!
//! # Design Decisions
//! - The whole body is held in memory for the duration of one call
//! - A failed read returns the error, never a partial body

use axum::body::{Body, Bytes};
use axum::http::{header::CONTENT_TYPE, HeaderMap};

use crate::transport::error::TransportResult;

/// Outcome of [`replay_body`].
pub enum Replay {
    /// JSON body drained into `bytes`; `body` yields the same bytes again.
    Buffered { body: Body, bytes: Bytes },
    /// Not JSON; the original body, unread.
    Passthrough(Body),
}

impl Replay {
    pub fn into_body(self) -> Body {
        match self {
            Replay::Buffered { body, .. } => body,
            Replay::Passthrough(body) => body,
        }
    }

    pub fn bytes(&self) -> Option<&Bytes> {
        match self {
            Replay::Buffered { bytes, .. } => Some(bytes),
            Replay::Passthrough(_) => None,
        }
    }
}

/// Whether a declared content type is eligible for body logging.
pub fn is_json(content_type: &str) -> bool {
    content_type.starts_with("application/json")
}

/// The `Content-Type` header value, or an empty string.
pub fn content_type(headers: &HeaderMap) -> &str {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

/// Buffer a JSON body and return a replayable copy of it.
///
/// The original body is consumed and dropped once fully read.
pub async fn replay_body(body: Body, content_type: &str) -> TransportResult<Replay> {
    if !is_json(content_type) {
        return Ok(Replay::Passthrough(body));
    }

    let bytes = buffer_body(body).await?;
    Ok(Replay::Buffered {
        body: Body::from(bytes.clone()),
        bytes,
    })
}

/// Read a body fully into memory.
pub async fn buffer_body(body: Body) -> TransportResult<Bytes> {
    Ok(axum::body::to_bytes(body, usize::MAX).await?)
}
