//! Gemini `streamGenerateContent` streaming.
//!
//! The credential rides in the query string (`key=...&alt=sse`) rather
//! than a header, assistant turns are renamed to `model`, the system
//! instruction is its own request field, and the text delta lives at
//! `candidates[0].content.parts[0].text`. Connection close ends the
//! stream. Gemini also has its own status-code conventions: an unusable
//! key is typically a 400, not a 401.

use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{check_status, ProviderError, StreamCallbacks, StreamOutcome, HTTP};
use crate::sse::{self, LineBuffer};
use crate::types::{ChatMessage, MessageRole};

pub(crate) const API_BASE: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 4096;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Instruction<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Instruction<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct SseFrame {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

// ---------------------------------------------------------------------------
// Request construction
// ---------------------------------------------------------------------------

fn build_request<'a>(messages: &'a [ChatMessage]) -> GenerateRequest<'a> {
    let system_instruction = messages
        .iter()
        .find(|m| m.role == MessageRole::System)
        .map(|m| Instruction {
            parts: vec![Part { text: &m.content }],
        });

    let contents = messages
        .iter()
        .filter(|m| m.role != MessageRole::System)
        .map(|m| Content {
            role: match m.role {
                MessageRole::Assistant => "model",
                _ => "user",
            },
            parts: vec![Part { text: &m.content }],
        })
        .collect();

    GenerateRequest {
        contents,
        system_instruction,
        generation_config: GenerationConfig {
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
        },
    }
}

fn endpoint(base: &str, model: &str) -> String {
    format!(
        "{}/v1beta/models/{}:streamGenerateContent",
        base.trim_end_matches('/'),
        model
    )
}

/// Gemini's catch-all table differs from the common one: bad keys usually
/// surface as 400s, and 401 has no special meaning.
fn classify_status(status: u16, body: &str) -> ProviderError {
    match super::parse_error_body(body) {
        super::ErrorBody::Message(msg) => ProviderError::Api(msg),
        super::ErrorBody::Json => ProviderError::Status(status),
        super::ErrorBody::Opaque => match status {
            400 => ProviderError::InvalidRequest,
            403 => ProviderError::Forbidden,
            429 => ProviderError::RateLimit,
            _ => ProviderError::Status(status),
        },
    }
}

// ---------------------------------------------------------------------------
// Streaming
// ---------------------------------------------------------------------------

/// Stream one completion against `base` (the canonical host or a custom
/// base URL). Never fails: the outcome carries any error after it has been
/// delivered through `on_error`.
pub async fn stream(
    base: &str,
    api_key: &str,
    model: &str,
    messages: &[ChatMessage],
    callbacks: &mut StreamCallbacks<'_>,
) -> StreamOutcome {
    let result = run(base, api_key, model, messages, callbacks).await;
    StreamOutcome::settle(result, callbacks)
}

async fn run(
    base: &str,
    api_key: &str,
    model: &str,
    messages: &[ChatMessage],
    callbacks: &mut StreamCallbacks<'_>,
) -> Result<String, ProviderError> {
    let body = build_request(messages);

    let resp = HTTP
        .post(endpoint(base, model))
        .query(&[("key", api_key), ("alt", "sse")])
        .json(&body)
        .send()
        .await
        .map_err(|e| ProviderError::Network(e.to_string()))?;
    let resp = check_status(resp, classify_status).await?;

    decode_stream(resp, callbacks).await
}

async fn decode_stream(
    resp: reqwest::Response,
    callbacks: &mut StreamCallbacks<'_>,
) -> Result<String, ProviderError> {
    let mut body = resp.bytes_stream();
    let mut lines = LineBuffer::new();
    let mut full_text = String::new();

    while let Some(read) = body.next().await {
        let bytes = read.map_err(|e| ProviderError::Network(e.to_string()))?;
        for line in lines.push(&bytes) {
            consume_line(&line, &mut full_text, callbacks);
        }
    }
    if let Some(line) = lines.finish() {
        consume_line(&line, &mut full_text, callbacks);
    }

    Ok(full_text)
}

fn consume_line(line: &str, full_text: &mut String, callbacks: &mut StreamCallbacks<'_>) {
    let Some(data) = sse::data_payload(line) else {
        return;
    };

    match serde_json::from_str::<SseFrame>(data) {
        Ok(frame) => {
            let text = frame
                .candidates
                .first()
                .and_then(|c| c.content.as_ref())
                .and_then(|c| c.parts.first())
                .and_then(|p| p.text.as_deref())
                .unwrap_or_default();
            if !text.is_empty() {
                full_text.push_str(text);
                callbacks.emit_token(text);
            }
        }
        Err(e) => debug!("Skipping malformed SSE JSON: {e} -- data: {data}"),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
