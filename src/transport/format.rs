//! Header block rendering for logs.
//!
//! # Responsibilities
//! - Render `Name: v1 v2` lines with canonical MIME casing
//! - Replace sensitive values with the mask
//! - Sort lines so identical header sets always log identically

use axum::http::HeaderMap;

use crate::redaction::{SensitiveHeaders, MASK};

/// Separator used for header blocks in request/response log lines.
pub const DEFAULT_SEPARATOR: &str = "\n";

/// Render a header map as sorted, redacted lines joined by `separator`.
pub fn format_headers(headers: &HeaderMap, sensitive: &SensitiveHeaders, separator: &str) -> String {
    let mut lines: Vec<String> = headers
        .keys()
        .map(|name| {
            let display = canonical_header_name(name.as_str());
            if sensitive.contains(name.as_str()) {
                format!("{}: {}", display, MASK)
            } else {
                let values: Vec<String> = headers
                    .get_all(name)
                    .iter()
                    .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
                    .collect();
                format!("{}: {}", display, values.join(" "))
            }
        })
        .collect();

    lines.sort();
    lines.join(separator)
}

/// `x-auth-token` → `X-Auth-Token`.
pub fn canonical_header_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = true;
    for c in name.chars() {
        if upper {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c.to_ascii_lowercase());
        }
        upper = c == '-';
    }
    out
}
