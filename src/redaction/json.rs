//! JSON body masking and pretty-printing.
//!
//! # Responsibilities
//! - Mask credentials inside Keystone authentication payloads
//! - Elide the service catalog from token responses
//! - Pretty-print with sorted keys so log output is diffable
//!
//! # Design Decisions
//! - Paths are data, not nested lookups; a missing segment stops the walk
//! - Masking only replaces keys that already exist
//! - Decode failures hand back the raw body so callers can still log it

use serde_json::Value;
use thiserror::Error;

use crate::redaction::MASK;

/// Field paths whose values are replaced with [`MASK`].
pub const SENSITIVE_FIELDS: &[&[&str]] = &[
    // v2 auth methods
    &["auth", "passwordCredentials", "password"],
    &["auth", "token", "id"],
    // v3 auth methods
    &["auth", "identity", "password", "user", "password"],
    &["auth", "identity", "application_credential", "secret"],
    &["auth", "identity", "token", "id"],
    // not secret, just huge
    &["token", "catalog"],
];

/// A body could not be decoded or re-encoded as JSON.
///
/// `raw` is the body as lossy UTF-8, suitable for logging in place of the
/// formatted output.
#[derive(Debug, Error)]
#[error("unable to {stage} OpenStack JSON: {reason}")]
pub struct FormatError {
    pub stage: &'static str,
    pub reason: String,
    pub raw: String,
}

impl FormatError {
    fn new(stage: &'static str, reason: impl ToString, raw: &[u8]) -> Self {
        Self {
            stage,
            reason: reason.to_string(),
            raw: String::from_utf8_lossy(raw).into_owned(),
        }
    }
}

/// Replace every existing value at a [`SENSITIVE_FIELDS`] path with the mask.
pub fn mask_sensitive_fields(value: &mut Value) {
    mask_fields(value, SENSITIVE_FIELDS);
}

/// Replace every existing value at one of `paths` with the mask.
///
/// Non-object values are left alone.
pub fn mask_fields(value: &mut Value, paths: &[&[&str]]) {
    if !value.is_object() {
        return;
    }
    for path in paths {
        mask_path(value, path);
    }
}

fn mask_path(value: &mut Value, path: &[&str]) {
    let Some((last, parents)) = path.split_last() else {
        return;
    };

    let mut current = value;
    for segment in parents {
        match current.get_mut(*segment) {
            Some(next) if next.is_object() => current = next,
            _ => return,
        }
    }

    if let Some(field) = current.as_object_mut().and_then(|obj| obj.get_mut(*last)) {
        *field = Value::String(MASK.to_string());
    }
}

/// Default body formatter: decode, mask known fields, pretty-print.
pub fn format_json(raw: &[u8]) -> Result<String, FormatError> {
    format_json_with(raw, SENSITIVE_FIELDS)
}

/// [`format_json`] masking `paths` instead of the default set.
pub fn format_json_with(raw: &[u8], paths: &[&[&str]]) -> Result<String, FormatError> {
    let mut data: Value =
        serde_json::from_slice(raw).map_err(|e| FormatError::new("parse", e, raw))?;

    mask_fields(&mut data, paths);

    serde_json::to_string_pretty(&data).map_err(|e| FormatError::new("re-marshal", e, raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeSet;

    fn keys(value: &Value) -> BTreeSet<String> {
        value
            .as_object()
            .map(|o| o.keys().cloned().collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_masks_only_password_in_v2_credentials() {
        let raw = br#"{"auth":{"passwordCredentials":{"username":"admin","password":"s3cret"},"tenantName":"demo"}}"#;
        let formatted = format_json(raw).unwrap();
        assert!(!formatted.contains("s3cret"));

        let logged: Value = serde_json::from_str(&formatted).unwrap();
        let original: Value = serde_json::from_slice(raw).unwrap();

        let creds = &logged["auth"]["passwordCredentials"];
        assert_eq!(creds["password"], "***");
        assert_eq!(creds["username"], "admin");
        assert_eq!(keys(&logged), keys(&original));
        assert_eq!(keys(&logged["auth"]), keys(&original["auth"]));
        assert_eq!(keys(creds), keys(&original["auth"]["passwordCredentials"]));
    }

    #[test]
    fn test_masks_v3_identity_fields() {
        let mut body = json!({
            "auth": {
                "identity": {
                    "methods": ["password", "application_credential", "token"],
                    "password": {"user": {"name": "admin", "password": "pw"}},
                    "application_credential": {"id": "ac", "secret": "shh"},
                    "token": {"id": "tok"}
                },
                "token": {"id": "legacy"}
            }
        });
        mask_sensitive_fields(&mut body);

        let identity = &body["auth"]["identity"];
        assert_eq!(identity["password"]["user"]["password"], "***");
        assert_eq!(identity["password"]["user"]["name"], "admin");
        assert_eq!(identity["application_credential"]["secret"], "***");
        assert_eq!(identity["application_credential"]["id"], "ac");
        assert_eq!(identity["token"]["id"], "***");
        assert_eq!(body["auth"]["token"]["id"], "***");
        assert_eq!(identity["methods"][0], "password");
    }

    #[test]
    fn test_elides_catalog() {
        let mut body = json!({"token": {"catalog": [{"type": "compute"}], "expires_at": "x"}});
        mask_sensitive_fields(&mut body);
        assert_eq!(body["token"]["catalog"], "***");
        assert_eq!(body["token"]["expires_at"], "x");
    }

    #[test]
    fn test_missing_fields_are_not_added() {
        let mut body = json!({"auth": {"passwordCredentials": {"username": "admin"}}, "token": {}});
        let before = body.clone();
        mask_sensitive_fields(&mut body);
        assert_eq!(body, before);
    }

    #[test]
    fn test_non_object_paths_are_skipped() {
        let mut body = json!({"auth": {"identity": "not-an-object"}, "token": ["a"]});
        let before = body.clone();
        mask_sensitive_fields(&mut body);
        assert_eq!(body, before);
    }

    #[test]
    fn test_top_level_array_is_pretty_printed_as_is() {
        let raw = br#"[{"auth":{"token":{"id":"keep"}}}]"#;
        let formatted = format_json(raw).unwrap();
        assert!(formatted.contains("keep"));
        assert!(formatted.contains("\n  {"));
    }

    #[test]
    fn test_explicit_paths_replace_defaults() {
        let raw = br#"{"auth":{"token":{"id":"keep"}},"volume":{"encryption_key":"k"}}"#;
        let formatted = format_json_with(raw, &[&["volume", "encryption_key"]]).unwrap();
        let logged: Value = serde_json::from_str(&formatted).unwrap();
        assert_eq!(logged["volume"]["encryption_key"], "***");
        assert_eq!(logged["auth"]["token"]["id"], "keep");
    }

    #[test]
    fn test_keys_are_sorted() {
        let formatted = format_json(br#"{"b":1,"a":2}"#).unwrap();
        assert_eq!(formatted, "{\n  \"a\": 2,\n  \"b\": 1\n}");
    }

    #[test]
    fn test_invalid_json_returns_raw_fallback() {
        let err = format_json(b"not json").unwrap_err();
        assert_eq!(err.raw, "not json");
        assert_eq!(err.stage, "parse");
        assert!(err.to_string().starts_with("unable to parse OpenStack JSON"));
    }
}
