//! Typed error hierarchy and upstream-error normalization for graphctl.
//!
//! `CliError` is the single error shape consumers observe. Every pipeline
//! stage (validation, resolution, confirmation, execution) converges on it,
//! so callers and tests can always assert against one message string
//! regardless of which stage failed or which error envelope variant the
//! upstream API used.
//!
//! Design rationale:
//! - Variants map to the failure taxonomy of the pipeline, not to internal
//!   implementation details: `Validation` for contradictory/malformed
//!   options, `NotFound`/`Ambiguous` for name resolution, `Api` for
//!   upstream rejections, `Auth` for the token endpoint, `Network`/`Parse`
//!   for transport and deserialization.
//! - `Api` carries the *unwrapped* message from the upstream error
//!   envelope, not the raw body. [`parse_api_error`] does the unwrapping
//!   with exhaustive shape matching and a stringify-as-is fallback.
//! - A declined confirmation prompt is **not** an error and has no variant
//!   here; it surfaces as `Outcome::Aborted` from the pipeline.

use reqwest::StatusCode;

/// Unified error type for all graphctl operations.
///
/// The `#[source]` attribute on inner errors enables `Error::source()`
/// chaining so callers can traverse the full cause chain.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Malformed or contradictory options, surfaced before any network
    /// call. The message is the descriptive failure string produced by
    /// schema validation.
    #[error("{0}")]
    Validation(String),

    /// A name-based lookup matched zero resources.
    ///
    /// The message embeds the queried name verbatim, e.g.
    /// `The specified administrative unit 'European' does not exist.`
    #[error("The specified {entity} '{name}' does not exist.")]
    NotFound {
        /// Singular entity label, e.g. `"group"`.
        entity: String,
        /// The name that was looked up.
        name: String,
    },

    /// A name-based lookup matched more than one resource and interactive
    /// disambiguation was disabled.
    ///
    /// `ids` is the comma-joined list of every candidate identifier, in
    /// response order, so the caller can disambiguate manually, e.g.
    /// `Multiple groups with name 'CLI Test Group' found. Found: <id1>, <id2>.`
    #[error("Multiple {entity} with name '{name}' found. Found: {ids}.")]
    Ambiguous {
        /// Plural entity label, e.g. `"groups"`.
        entity: String,
        /// The name that was looked up.
        name: String,
        /// Comma-joined candidate identifiers.
        ids: String,
    },

    /// The Graph API rejected the request with a non-success status.
    ///
    /// `message` is the embedded message unwrapped from the upstream error
    /// envelope (or the stringified body when the envelope shape is not
    /// recognized). Display surfaces the message verbatim — the status
    /// code is kept for diagnostics but not prepended, so tests can assert
    /// the exact upstream text.
    #[error("{message}")]
    Api {
        /// The HTTP status code returned by the API.
        status: StatusCode,
        /// The normalized, human-readable error message.
        message: String,
    },

    /// Authentication failure at the Azure AD token endpoint.
    #[error("authentication failed: {message}")]
    Auth {
        /// Human-readable description, including the AADSTS error body
        /// when available.
        message: String,
        /// The underlying transport or parse error, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An interactive prompt could not be read or written.
    #[error("prompt failed: {0}")]
    Prompt(#[source] std::io::Error),

    /// JSON deserialization failed when parsing an API response body.
    #[error("failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    /// Transport-level failure (DNS, TCP, TLS, timeout) with no HTTP
    /// status available.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl CliError {
    /// Process exit code for a failing invocation. Every error maps to 1;
    /// argument parse errors exit with 2 via clap before reaching here.
    pub fn exit_code(&self) -> u8 {
        1
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CliError>;

// ── Upstream envelope shapes ───────────────────────────────────────────
//
// Microsoft services answer failures in more than one envelope. The two
// shapes observed across Graph and SharePoint are:
//
//   { "error": { "odata.error": { "message": { "value": "X" } } } }
//   { "error": { "message": "Y" } }
//
// The untagged enums below try each shape in order; anything else falls
// through to the raw-body fallback in `parse_api_error`.

#[derive(serde::Deserialize)]
struct Envelope {
    error: InnerError,
}

#[derive(serde::Deserialize)]
#[serde(untagged)]
enum InnerError {
    OData {
        #[serde(rename = "odata.error")]
        odata_error: ODataError,
    },
    Plain {
        message: MessageText,
    },
}

#[derive(serde::Deserialize)]
struct ODataError {
    message: MessageText,
}

/// Graph returns `message` as a plain string; the OData V3 envelope nests
/// it as `{ "lang": ..., "value": ... }`. Accept both.
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum MessageText {
    Text(String),
    Localized { value: String },
}

impl MessageText {
    fn into_string(self) -> String {
        match self {
            MessageText::Text(s) => s,
            MessageText::Localized { value } => value,
        }
    }
}

/// Unwraps a raw error response body to its embedded human-readable
/// message.
///
/// Returns `None` when the body matches no known envelope shape; the
/// caller decides the fallback (stringify the body as-is, or fall back to
/// the HTTP status line for empty bodies). Pure function — no I/O.
pub fn parse_api_error(body: &str) -> Option<String> {
    let envelope: Envelope = serde_json::from_str(body).ok()?;
    let message = match envelope.error {
        InnerError::OData { odata_error } => odata_error.message.into_string(),
        InnerError::Plain { message } => message.into_string(),
    };
    Some(message)
}

/// Builds the `Api` error variant for a non-success response.
///
/// Normalization order:
/// 1. Known envelope shape → its embedded message, verbatim.
/// 2. Non-empty unrecognized body → the body, trimmed, as-is.
/// 3. Empty body → a status-line fallback.
pub fn api_error(status: StatusCode, body: &str) -> CliError {
    let message = match parse_api_error(body) {
        Some(message) => message,
        None if !body.trim().is_empty() => body.trim().to_string(),
        None => format!("request failed with status {status}"),
    };
    CliError::Api { status, message }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    // ── parse_api_error shape matching ───────────────────────────────

    #[test]
    fn odata_v3_envelope_unwraps_to_value() {
        let body = r#"{"error":{"odata.error":{"message":{"value":"X"}}}}"#;
        assert_eq!(parse_api_error(body).as_deref(), Some("X"));
    }

    #[test]
    fn plain_message_envelope_unwraps_to_message() {
        let body = r#"{"error":{"message":"Y"}}"#;
        assert_eq!(parse_api_error(body).as_deref(), Some("Y"));
    }

    #[test]
    fn graph_envelope_with_code_unwraps_message() {
        // The standard Graph shape carries extra fields (code, innerError)
        // that must not break message extraction.
        let body = r#"{
            "error": {
                "code": "Request_ResourceNotFound",
                "message": "Resource 'x' does not exist.",
                "innerError": {"request-id": "abc"}
            }
        }"#;
        assert_eq!(
            parse_api_error(body).as_deref(),
            Some("Resource 'x' does not exist.")
        );
    }

    #[test]
    fn odata_envelope_with_lang_unwraps_value() {
        let body = r#"{"error":{"odata.error":{"code":"-1, InvalidClientQueryException","message":{"lang":"en-US","value":"The filter is invalid."}}}}"#;
        assert_eq!(
            parse_api_error(body).as_deref(),
            Some("The filter is invalid.")
        );
    }

    #[test]
    fn unrecognized_body_yields_none() {
        assert!(parse_api_error("upstream exploded").is_none());
        assert!(parse_api_error(r#"{"unexpected":"shape"}"#).is_none());
        assert!(parse_api_error("").is_none());
    }

    // ── api_error fallbacks ──────────────────────────────────────────

    #[test]
    fn api_error_surfaces_envelope_message_verbatim() {
        let err = api_error(
            StatusCode::BAD_REQUEST,
            r#"{"error":{"odata.error":{"message":{"value":"X"}}}}"#,
        );
        assert_eq!(err.to_string(), "X");
    }

    #[test]
    fn api_error_stringifies_unrecognized_body() {
        let err = api_error(StatusCode::BAD_GATEWAY, "  upstream exploded  ");
        assert_eq!(err.to_string(), "upstream exploded");
    }

    #[test]
    fn api_error_empty_body_falls_back_to_status() {
        let err = api_error(StatusCode::FORBIDDEN, "");
        assert!(
            err.to_string().contains("403"),
            "status fallback should include the code"
        );
    }

    // ── message formats ──────────────────────────────────────────────

    #[test]
    fn not_found_message_embeds_name_verbatim() {
        let err = CliError::NotFound {
            entity: "administrative unit".to_string(),
            name: "European".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "The specified administrative unit 'European' does not exist."
        );
    }

    #[test]
    fn ambiguous_message_lists_candidates_comma_joined() {
        let err = CliError::Ambiguous {
            entity: "groups".to_string(),
            name: "CLI Test Group".to_string(),
            ids: "9b1b1e42-794b-4c71-93ac-5ed92488b67f, 3f98f41d-8e21-4d12-9a64-91d6b2b7f9a3"
                .to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Multiple groups with name 'CLI Test Group' found. Found: \
             9b1b1e42-794b-4c71-93ac-5ed92488b67f, 3f98f41d-8e21-4d12-9a64-91d6b2b7f9a3."
        );
    }

    #[test]
    fn auth_error_with_source_chains_correctly() {
        let json_err: serde_json::Error = serde_json::from_str::<String>("not-json").unwrap_err();
        let err = CliError::Auth {
            message: "failed to parse token response".to_string(),
            source: Some(Box::new(json_err)),
        };
        assert!(err.source().is_some());
    }

    #[test]
    fn every_error_exits_nonzero() {
        let err = CliError::Validation("Specify one of the following options: id, name.".into());
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CliError>();
    }
}
