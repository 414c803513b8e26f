//! Sensitive header names.
//!
//! # Responsibilities
//! - Hold the default list of credential-carrying headers
//! - Case-insensitive membership checks for the header formatter
//!
//! # Design Decisions
//! - Names are lowercased once on construction, lookups lowercase the queried name
//! - An explicitly empty set disables masking entirely

use std::collections::HashSet;

/// Headers that carry tokens, temp-URL keys or cookies.
const DEFAULT_SENSITIVE_HEADERS: &[&str] = &[
    "x-auth-token",
    "x-auth-key",
    "x-service-token",
    "x-storage-token",
    "x-account-meta-temp-url-key",
    "x-account-meta-temp-url-key-2",
    "x-container-meta-temp-url-key",
    "x-container-meta-temp-url-key-2",
    "set-cookie",
    "x-subject-token",
];

/// Returns the default list of headers to be masked in logs.
pub fn default_sensitive_headers() -> Vec<String> {
    DEFAULT_SENSITIVE_HEADERS
        .iter()
        .map(|h| h.to_string())
        .collect()
}

/// A case-insensitive set of header names whose values are never logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensitiveHeaders {
    names: HashSet<String>,
}

impl SensitiveHeaders {
    /// Build a set from arbitrary-case names.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            names: names
                .into_iter()
                .map(|n| n.as_ref().to_ascii_lowercase())
                .collect(),
        }
    }

    /// A set that masks nothing.
    pub fn empty() -> Self {
        Self {
            names: HashSet::new(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(&name.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for SensitiveHeaders {
    fn default() -> Self {
        Self::new(DEFAULT_SENSITIVE_HEADERS)
    }
}
