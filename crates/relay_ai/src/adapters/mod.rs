//! Protocol adapters: one per streaming wire format.
//!
//! Every adapter exposes the same contract: a single `POST` with a
//! streaming body, incremental decoding into text deltas, and a callback
//! bundle driven token by token. Adapter futures never fail — errors travel
//! through [`StreamCallbacks::on_error`] and the returned [`StreamOutcome`],
//! so callers need no rejection handling for network failures. Retry policy,
//! if any, belongs to the caller; a finished or failed stream is terminal.

pub mod anthropic;
pub mod gemini;
pub mod legacy;
pub mod openai;

use once_cell::sync::Lazy;
use serde::Deserialize;

/// Process-wide HTTP client. No request timeout is configured: a hung
/// provider hangs the request, matching the documented gap in the contract.
pub(crate) static HTTP: Lazy<reqwest::Client> = Lazy::new(reqwest::Client::new);

// ---------------------------------------------------------------------------
// Error taxonomy
// ---------------------------------------------------------------------------

/// Errors an adapter can report. The `Display` strings are the user-facing
/// messages surfaced through `on_error`.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Invalid API key")]
    InvalidKey,

    #[error("Rate limit exceeded. Please wait and try again.")]
    RateLimit,

    #[error("Access forbidden. Check your API key permissions.")]
    Forbidden,

    /// Gemini rejects unusable keys with a 400 rather than a 401.
    #[error("Invalid request. Check your API key.")]
    InvalidRequest,

    /// Message the provider reported in a structured JSON error body.
    #[error("{0}")]
    Api(String),

    /// Non-success status with no parseable detail in the body.
    #[error("API Error ({0})")]
    Status(u16),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorDetail>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: Option<String>,
}

/// What an HTTP error body turned out to contain.
pub(crate) enum ErrorBody {
    /// Structured JSON with a usable message field.
    Message(String),
    /// Valid JSON, but no recognizable message.
    Json,
    /// Not JSON at all.
    Opaque,
}

pub(crate) fn parse_error_body(body: &str) -> ErrorBody {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => match envelope.error.and_then(|e| e.message).or(envelope.message) {
            Some(msg) => ErrorBody::Message(msg),
            None => ErrorBody::Json,
        },
        Err(_) => ErrorBody::Opaque,
    }
}

/// Classify a non-success response.
///
/// The provider's own message wins when the body is structured JSON; an
/// opaque body falls back to the status-keyed table. Valid JSON without a
/// recognizable message field gets the generic status message.
pub(crate) fn classify_status(status: u16, body: &str) -> ProviderError {
    match parse_error_body(body) {
        ErrorBody::Message(msg) => ProviderError::Api(msg),
        ErrorBody::Json => ProviderError::Status(status),
        ErrorBody::Opaque => match status {
            401 => ProviderError::InvalidKey,
            429 => ProviderError::RateLimit,
            403 => ProviderError::Forbidden,
            _ => ProviderError::Status(status),
        },
    }
}

/// Reject a non-success response, reading its body for classification.
pub(crate) async fn check_status(
    resp: reqwest::Response,
    classify: fn(u16, &str) -> ProviderError,
) -> Result<reqwest::Response, ProviderError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(classify(status.as_u16(), &body))
}

// ---------------------------------------------------------------------------
// Callbacks and outcome
// ---------------------------------------------------------------------------

/// Caller hooks driven during one stream. All optional.
///
/// `on_token` fires once per decoded text delta; exactly one of
/// `on_complete` (with the accumulated full text) or `on_error` fires at
/// the end, never both.
#[derive(Default)]
pub struct StreamCallbacks<'a> {
    on_token: Option<Box<dyn FnMut(&str) + Send + 'a>>,
    on_complete: Option<Box<dyn FnMut(&str) + Send + 'a>>,
    on_error: Option<Box<dyn FnMut(&ProviderError) + Send + 'a>>,
}

impl<'a> StreamCallbacks<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_token(mut self, f: impl FnMut(&str) + Send + 'a) -> Self {
        self.on_token = Some(Box::new(f));
        self
    }

    pub fn on_complete(mut self, f: impl FnMut(&str) + Send + 'a) -> Self {
        self.on_complete = Some(Box::new(f));
        self
    }

    pub fn on_error(mut self, f: impl FnMut(&ProviderError) + Send + 'a) -> Self {
        self.on_error = Some(Box::new(f));
        self
    }

    pub(crate) fn emit_token(&mut self, text: &str) {
        if let Some(f) = self.on_token.as_mut() {
            f(text);
        }
    }

    pub(crate) fn emit_complete(&mut self, full_text: &str) {
        if let Some(f) = self.on_complete.as_mut() {
            f(full_text);
        }
    }

    pub(crate) fn emit_error(&mut self, err: &ProviderError) {
        if let Some(f) = self.on_error.as_mut() {
            f(err);
        }
    }
}

impl std::fmt::Debug for StreamCallbacks<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamCallbacks")
            .field("on_token", &self.on_token.is_some())
            .field("on_complete", &self.on_complete.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

/// Terminal state of one stream invocation: either the accumulated full
/// text or the classified failure. This is the value-level encoding of the
/// never-rejects contract.
#[derive(Debug)]
pub enum StreamOutcome {
    Complete(String),
    Failed(ProviderError),
}

impl StreamOutcome {
    /// Fold an adapter result into the terminal callback and outcome.
    pub(crate) fn settle(
        result: Result<String, ProviderError>,
        callbacks: &mut StreamCallbacks<'_>,
    ) -> Self {
        match result {
            Ok(full_text) => {
                callbacks.emit_complete(&full_text);
                Self::Complete(full_text)
            }
            Err(err) => {
                callbacks.emit_error(&err);
                Self::Failed(err)
            }
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete(_))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn classify_prefers_provider_message() {
        let err = classify_status(402, r#"{"error":{"message":"Insufficient credits"}}"#);
        assert_eq!(err.to_string(), "Insufficient credits");
    }

    #[test]
    fn classify_accepts_flat_message_field() {
        let err = classify_status(500, r#"{"message":"backend exploded"}"#);
        assert_eq!(err.to_string(), "backend exploded");
    }

    #[test]
    fn classify_json_without_message_is_generic() {
        let err = classify_status(502, r#"{"detail":"nope"}"#);
        assert_eq!(err.to_string(), "API Error (502)");
    }

    #[test]
    fn classify_opaque_body_uses_status_table() {
        assert!(matches!(
            classify_status(401, "unauthorized"),
            ProviderError::InvalidKey
        ));
        assert!(matches!(
            classify_status(429, "slow down"),
            ProviderError::RateLimit
        ));
        assert!(matches!(
            classify_status(403, "no"),
            ProviderError::Forbidden
        ));
        assert_eq!(classify_status(500, "boom").to_string(), "API Error (500)");
    }

    #[test]
    fn rate_limit_message_names_the_limit() {
        assert!(ProviderError::RateLimit.to_string().contains("Rate limit"));
    }

    #[tokio::test]
    async fn check_status_passes_success_through() {
        let resp = http::Response::builder()
            .status(200)
            .body(reqwest::Body::from("ok"))
            .unwrap();
        assert!(check_status(reqwest::Response::from(resp), classify_status)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn check_status_classifies_429() {
        let resp = http::Response::builder()
            .status(429)
            .body(reqwest::Body::from("too many requests"))
            .unwrap();
        let err = check_status(reqwest::Response::from(resp), classify_status)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Rate limit"));
    }

    #[test]
    fn settle_fires_complete_exactly_once() {
        let completions = Arc::new(Mutex::new(Vec::new()));
        let errors = Arc::new(Mutex::new(0u32));

        let c = completions.clone();
        let e = errors.clone();
        let mut callbacks = StreamCallbacks::new()
            .on_complete(move |text| c.lock().unwrap().push(text.to_string()))
            .on_error(move |_| *e.lock().unwrap() += 1);

        let outcome = StreamOutcome::settle(Ok("full text".into()), &mut callbacks);
        assert!(outcome.is_complete());
        assert_eq!(*completions.lock().unwrap(), vec!["full text"]);
        assert_eq!(*errors.lock().unwrap(), 0);
    }

    #[test]
    fn settle_fires_error_not_complete() {
        let completions = Arc::new(Mutex::new(0u32));
        let errors = Arc::new(Mutex::new(Vec::new()));

        let c = completions.clone();
        let e = errors.clone();
        let mut callbacks = StreamCallbacks::new()
            .on_complete(move |_| *c.lock().unwrap() += 1)
            .on_error(move |err| e.lock().unwrap().push(err.to_string()));

        let outcome = StreamOutcome::settle(Err(ProviderError::RateLimit), &mut callbacks);
        assert!(!outcome.is_complete());
        assert_eq!(*completions.lock().unwrap(), 0);
        let errors = errors.lock().unwrap();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("Rate limit"));
    }

    #[test]
    fn missing_hooks_are_fine() {
        let mut callbacks = StreamCallbacks::new();
        callbacks.emit_token("t");
        callbacks.emit_complete("full");
        callbacks.emit_error(&ProviderError::InvalidKey);
    }
}
