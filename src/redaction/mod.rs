//! Redaction subsystem.
//!
//! # Data Flow
//! ```text
//! Request/response headers
//!     → headers.rs (is this name sensitive?)
//!     → transport/format.rs renders "Name: ***"
//!
//! JSON body bytes
//!     → json.rs (decode, mask known paths, pretty-print)
//!     → log line
//! ```
//!
//! # Design Decisions
//! - A policy is an immutable value; replacing it swaps the whole set
//! - Masking never changes the structure of a payload, only leaf values

pub mod headers;
pub mod json;

pub use headers::{default_sensitive_headers, SensitiveHeaders};
pub use json::{
    format_json, format_json_with, mask_fields, mask_sensitive_fields, FormatError, SENSITIVE_FIELDS,
};

/// Replacement text for every redacted value.
pub const MASK: &str = "***";

/// Header and JSON field redaction rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedactionPolicy {
    headers: SensitiveHeaders,
    fields: &'static [&'static [&'static str]],
}

impl Default for RedactionPolicy {
    fn default() -> Self {
        Self::new(SensitiveHeaders::default())
    }
}

impl RedactionPolicy {
    /// Masks `headers` and the [`SENSITIVE_FIELDS`] body paths.
    pub fn new(headers: SensitiveHeaders) -> Self {
        Self {
            headers,
            fields: SENSITIVE_FIELDS,
        }
    }

    /// Replace the JSON paths masked in bodies.
    pub fn with_fields(mut self, fields: &'static [&'static [&'static str]]) -> Self {
        self.fields = fields;
        self
    }

    pub fn sensitive_headers(&self) -> &SensitiveHeaders {
        &self.headers
    }

    pub fn fields(&self) -> &'static [&'static [&'static str]] {
        self.fields
    }

    /// Mask this policy's fields and pretty-print a JSON body.
    pub fn format_body(&self, raw: &[u8]) -> Result<String, FormatError> {
        format_json_with(raw, self.fields)
    }
}
