//! Anthropic Messages API streaming.
//!
//! Differs from the OpenAI-compatible family on every axis that matters:
//! auth is an `x-api-key` header rather than a bearer token, the system
//! instruction travels in its own request field instead of the message
//! list, and only SSE events typed `content_block_delta` carry text. The
//! stream has no `[DONE]` sentinel; connection close is the end marker.

use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{check_status, classify_status, ProviderError, StreamCallbacks, StreamOutcome, HTTP};
use crate::sse::{self, LineBuffer};
use crate::types::{ChatMessage, MessageRole};

pub(crate) const API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 4096;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<Turn<'a>>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct Turn<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct SseEvent {
    #[serde(rename = "type", default)]
    kind: String,
    delta: Option<SseDelta>,
}

#[derive(Debug, Deserialize)]
struct SseDelta {
    text: Option<String>,
}

// ---------------------------------------------------------------------------
// Request construction
// ---------------------------------------------------------------------------

/// Pull the system instruction out of the message list; everything else
/// becomes a chat turn. Roles other than assistant map to `user`.
fn build_request<'a>(model: &'a str, messages: &'a [ChatMessage]) -> MessagesRequest<'a> {
    let system = messages
        .iter()
        .find(|m| m.role == MessageRole::System)
        .map(|m| m.content.as_str())
        .unwrap_or("");

    let turns = messages
        .iter()
        .filter(|m| m.role != MessageRole::System)
        .map(|m| Turn {
            role: match m.role {
                MessageRole::Assistant => "assistant",
                _ => "user",
            },
            content: &m.content,
        })
        .collect();

    MessagesRequest {
        model,
        max_tokens: DEFAULT_MAX_TOKENS,
        system,
        messages: turns,
        stream: true,
    }
}

/// Endpoint for a custom base URL. Idempotent: a base already ending in
/// `/messages` is used as-is.
pub fn endpoint_from_base(base: &str) -> String {
    if base.ends_with("/messages") {
        base.to_string()
    } else {
        format!("{}/v1/messages", base.trim_end_matches('/'))
    }
}

// ---------------------------------------------------------------------------
// Streaming
// ---------------------------------------------------------------------------

/// Stream one completion. Never fails: the outcome carries any error after
/// it has been delivered through `on_error`.
pub async fn stream(
    endpoint: &str,
    api_key: &str,
    model: &str,
    messages: &[ChatMessage],
    callbacks: &mut StreamCallbacks<'_>,
) -> StreamOutcome {
    let result = run(endpoint, api_key, model, messages, callbacks).await;
    StreamOutcome::settle(result, callbacks)
}

async fn run(
    endpoint: &str,
    api_key: &str,
    model: &str,
    messages: &[ChatMessage],
    callbacks: &mut StreamCallbacks<'_>,
) -> Result<String, ProviderError> {
    let body = build_request(model, messages);

    let resp = HTTP
        .post(endpoint)
        .header("x-api-key", api_key)
        .header("anthropic-version", ANTHROPIC_VERSION)
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

    match serde_json::from_str::<SseEvent>(data) {
        Ok(event) => {
            // message_start, ping, message_delta etc. carry no text.
            if event.kind != "content_block_delta" {
                return;
            }
            if let Some(text) = event.delta.and_then(|d| d.text) {
                if !text.is_empty() {
                    full_text.push_str(&text);
                    callbacks.emit_token(&text);
                }
            }
        }
        Err(e) => debug!("Skipping malformed SSE JSON: {e} -- data: {data}"),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
