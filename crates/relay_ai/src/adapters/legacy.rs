//! Legacy OpenAI-shaped streaming for non-conforming endpoints.
//!
//! Close to the OpenAI-compatible format but looser on both sides of the
//! wire: the request carries no model field (the endpoint decides), the
//! delta may appear at the usual nested path or as a top-level `content`
//! field, and a data line that is not JSON at all is passed through as a
//! literal token. That last behavior is deliberate compatibility with
//! servers that stream bare text; it can mask a misbehaving endpoint, so
//! it stays confined to this adapter.

use futures::StreamExt;
use serde::{Deserialize, Serialize};

use super::{check_status, classify_status, ProviderError, StreamCallbacks, StreamOutcome, HTTP};
use crate::sse::{self, LineBuffer};
use crate::types::ChatMessage;

const DONE_SENTINEL: &str = "[DONE]";

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct LegacyRequest<'a> {
    messages: &'a [ChatMessage],
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct LegacyFrame {
    #[serde(default)]
    choices: Vec<LegacyChoice>,
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LegacyChoice {
    delta: Option<LegacyDelta>,
}

#[derive(Debug, Deserialize)]
struct LegacyDelta {
    content: Option<String>,
}

// ---------------------------------------------------------------------------
// Streaming
// ---------------------------------------------------------------------------

/// Stream one completion. Never fails: the outcome carries any error after
/// it has been delivered through `on_error`.
pub async fn stream(
    endpoint: &str,
    api_key: &str,
    messages: &[ChatMessage],
    callbacks: &mut StreamCallbacks<'_>,
) -> StreamOutcome {
    let result = run(endpoint, api_key, messages, callbacks).await;
    StreamOutcome::settle(result, callbacks)
}

async fn run(
    endpoint: &str,
    api_key: &str,
    messages: &[ChatMessage],
    callbacks: &mut StreamCallbacks<'_>,
) -> Result<String, ProviderError> {
    let body = LegacyRequest {
        messages,
        stream: true,
    };

    let resp = HTTP
        .post(endpoint)
        .bearer_auth(api_key)
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
    if data == DONE_SENTINEL {
        return;
    }

    match serde_json::from_str::<LegacyFrame>(data) {
        Ok(frame) => {
            let content = frame
                .choices
                .first()
                .and_then(|c| c.delta.as_ref())
                .and_then(|d| d.content.clone())
                .or(frame.content);
            if let Some(content) = content {
                if !content.is_empty() {
                    full_text.push_str(&content);
                    callbacks.emit_token(&content);
                }
            }
        }
        Err(_) => {
            // Raw text passthrough. Valid JSON of an unexpected shape and
            // anything that looks like a truncated JSON object both count
            // as incomplete data, not text.
            if !data.is_empty()
                && !data.starts_with('{')
                && serde_json::from_str::<serde_json::Value>(data).is_err()
            {
                full_text.push_str(data);
                callbacks.emit_token(data);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn response_from_chunks(chunks: Vec<&'static str>) -> reqwest::Response {
        let stream = futures::stream::iter(
            chunks
                .into_iter()
                .map(|c| Ok::<_, std::io::Error>(bytes::Bytes::from(c))),
        );
        let resp = http::Response::builder()
            .status(200)
            .body(reqwest::Body::wrap_stream(stream))
            .unwrap();
        reqwest::Response::from(resp)
    }

    async fn decode_collecting(chunks: Vec<&'static str>) -> (String, Vec<String>) {
        let tokens = Arc::new(Mutex::new(Vec::new()));
        let sink = tokens.clone();
        let mut callbacks =
            StreamCallbacks::new().on_token(move |t| sink.lock().unwrap().push(t.to_string()));

        let full = decode_stream(response_from_chunks(chunks), &mut callbacks)
            .await
            .unwrap();
        let tokens = tokens.lock().unwrap().clone();
        (full, tokens)
    }

    #[tokio::test]
    async fn nested_delta_path_wins() {
        let chunks =
            vec!["data: {\"choices\":[{\"delta\":{\"content\":\"Hello\"}}],\"content\":\"ignored\"}\n\n"];
        let (full, tokens) = decode_collecting(chunks).await;
        assert_eq!(full, "Hello");
        assert_eq!(tokens, vec!["Hello"]);
    }

    #[tokio::test]
    async fn top_level_content_is_the_fallback() {
        let chunks = vec!["data: {\"content\":\"plain\"}\n\n"];
        let (full, tokens) = decode_collecting(chunks).await;
        assert_eq!(full, "plain");
        assert_eq!(tokens, vec!["plain"]);
    }

    #[tokio::test]
    async fn bare_text_lines_pass_through() {
        let chunks = vec!["data: streamed without json\n\n"];
        let (full, tokens) = decode_collecting(chunks).await;
        assert_eq!(full, "streamed without json");
        assert_eq!(tokens, vec!["streamed without json"]);
    }

    #[tokio::test]
    async fn truncated_json_objects_are_not_passed_through() {
        let chunks = vec!["data: {\"choices\":[{\"del\n\n"];
        let (full, tokens) = decode_collecting(chunks).await;
        assert_eq!(full, "");
        assert!(tokens.is_empty());
    }

    #[tokio::test]
    async fn json_scalars_are_not_passed_through() {
        let (full, tokens) = decode_collecting(vec!["data: \"quoted\"\n\ndata: 42\n\n"]).await;
        assert_eq!(full, "");
        assert!(tokens.is_empty());
    }

    #[tokio::test]
    async fn done_sentinel_is_not_raw_text() {
        let chunks = vec![
            "data: {\"choices\":[{\"delta\":{\"content\":\"hi\"}}]}\n\n",
            "data: [DONE]\n\n",
        ];
        let (full, tokens) = decode_collecting(chunks).await;
        assert_eq!(full, "hi");
        assert_eq!(tokens, vec!["hi"]);
    }

    #[test]
    fn request_body_has_no_model_field() {
        let messages = vec![ChatMessage::user("hi")];
        let json = serde_json::to_value(LegacyRequest {
            messages: &messages,
            stream: true,
        })
        .unwrap();
        assert!(json.get("model").is_none());
        assert_eq!(json["stream"], true);
    }
}
