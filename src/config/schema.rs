//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML files.

use std::collections::BTreeMap;

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};

use crate::redaction::SensitiveHeaders;

/// Root configuration for the transport middleware.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct TransportConfig {
    /// Extra attempts after the underlying transport returns no response.
    pub max_retries: u32,

    /// Force `Cache-Control: no-cache` on every request.
    pub no_cache_header: bool,

    /// Log requests and responses (also enabled by `OS_DEBUG`).
    pub enable_logger: bool,

    /// Headers set (not appended) on every request.
    pub additional_headers: BTreeMap<String, Vec<String>>,

    /// Replaces the default masked header list when present.
    pub sensitive_headers: Option<Vec<String>>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            max_retries: 0,
            no_cache_header: true,
            enable_logger: false,
            additional_headers: BTreeMap::new(),
            sensitive_headers: None,
        }
    }
}

impl TransportConfig {
    /// Additional headers as a `HeaderMap`. Invalid entries are skipped.
    pub fn header_map(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (name, values) in &self.additional_headers {
            let Ok(name) = HeaderName::from_bytes(name.as_bytes()) else {
                tracing::warn!(header = %name, "Skipping invalid header name");
                continue;
            };
            for value in values {
                match HeaderValue::from_str(value) {
                    Ok(value) => {
                        headers.append(name.clone(), value);
                    }
                    Err(_) => tracing::warn!(header = %name, "Skipping invalid header value"),
                }
            }
        }
        headers
    }

    pub fn sensitive_header_set(&self) -> SensitiveHeaders {
        match &self.sensitive_headers {
            Some(names) => SensitiveHeaders::new(names),
            None => SensitiveHeaders::default(),
        }
    }
}
