//! OpenAI-compatible chat completion streaming.
//!
//! The workhorse format: xAI, DeepSeek, Qwen, Moonshot, Mistral, OpenRouter,
//! Perplexity, and most self-hosted gateways all speak it.
//!
//! ```text
//! data: {"id":"...","choices":[{"delta":{"content":"Hello"},...}]}
//! data: {"id":"...","choices":[{"delta":{"content":" world"},...}]}
//! data: [DONE]
//! ```

use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{check_status, classify_status, ProviderError, StreamCallbacks, StreamOutcome, HTTP};
use crate::sse::{self, LineBuffer};
use crate::types::ChatMessage;

const DONE_SENTINEL: &str = "[DONE]";

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct CompletionsRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct SseFrame {
    #[serde(default)]
    choices: Vec<SseChoice>,
}

#[derive(Debug, Deserialize)]
struct SseChoice {
    delta: Option<SseDelta>,
}

#[derive(Debug, Deserialize)]
struct SseDelta {
    content: Option<String>,
}

// ---------------------------------------------------------------------------
// Endpoint construction
// ---------------------------------------------------------------------------

/// Endpoint for a custom base URL. Idempotent: a base that already ends in
/// the canonical path is used as-is.
pub fn endpoint_from_base(base: &str) -> String {
    if base.ends_with("/chat/completions") {
        base.to_string()
    } else {
        format!("{}/chat/completions", base.trim_end_matches('/'))
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
    extra_headers: &[(&str, &str)],
    callbacks: &mut StreamCallbacks<'_>,
) -> StreamOutcome {
    let result = run(endpoint, api_key, model, messages, extra_headers, callbacks).await;
    StreamOutcome::settle(result, callbacks)
}

async fn run(
    endpoint: &str,
    api_key: &str,
    model: &str,
    messages: &[ChatMessage],
    extra_headers: &[(&str, &str)],
    callbacks: &mut StreamCallbacks<'_>,
) -> Result<String, ProviderError> {
    let body = CompletionsRequest {
        model,
        messages,
        stream: true,
    };

    let mut request = HTTP.post(endpoint).bearer_auth(api_key).json(&body);
    for (name, value) in extra_headers {
        request = request.header(*name, *value);
    }

    let resp = request
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

    match serde_json::from_str::<SseFrame>(data) {
        Ok(frame) => {
            let content = frame
                .choices
                .first()
                .and_then(|c| c.delta.as_ref())
                .and_then(|d| d.content.as_deref())
                .unwrap_or_default();
            if !content.is_empty() {
                full_text.push_str(content);
                callbacks.emit_token(content);
            }
        }
        // A chunk boundary can split a JSON payload; incomplete data is
        // not an error.
        Err(e) => debug!("Skipping malformed SSE JSON: {e} -- data: {data}"),
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

    const PAYLOAD: &str = concat!(
        "data: {\"id\":\"1\",\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n\n",
        "data: {\"id\":\"1\",\"choices\":[{\"delta\":{\"content\":\"Hello\"}}]}\n\n",
        "data: {\"id\":\"1\",\"choices\":[{\"delta\":{\"content\":\" world\"}}]}\n\n",
        "data: [DONE]\n\n",
    );

    #[tokio::test]
    async fn decodes_single_chunk_stream() {
        let (full, tokens) = decode_collecting(vec![PAYLOAD]).await;
        assert_eq!(full, "Hello world");
        assert_eq!(tokens, vec!["Hello", " world"]);
    }

    #[tokio::test]
    async fn chunk_boundaries_do_not_change_the_result() {
        // Split mid-line, mid-JSON-object, and mid-sentinel; every framing
        // must accumulate the same text as the single-chunk stream.
        let splits: Vec<Vec<&str>> = vec![
            vec![
                "data: {\"id\":\"1\",\"choices\":[{\"del",
                "ta\":{\"content\":\"Hello\"}}]}\n\ndata: {\"id\":\"1\",",
                "\"choices\":[{\"delta\":{\"content\":\" world\"}}]}\n\nda",
                "ta: [DONE]\n\n",
            ],
            vec![
                "data: {\"id\":\"1\",\"choices\":[{\"delta\":{\"content\":\"Hello\"}}]}",
                "\n\ndata: {\"id\":\"1\",\"choices\":[{\"delta\":{\"content\":\" world\"}}]}\n\n",
                "data: [DONE]\n\n",
            ],
        ];

        for chunks in splits {
            let (full, tokens) = decode_collecting(chunks).await;
            assert_eq!(full, "Hello world");
            assert_eq!(tokens, vec!["Hello", " world"]);
        }
    }

    #[tokio::test]
    async fn done_sentinel_emits_nothing() {
        let (full, tokens) = decode_collecting(vec!["data: [DONE]\n\n"]).await;
        assert_eq!(full, "");
        assert!(tokens.is_empty());
    }

    #[tokio::test]
    async fn malformed_json_lines_are_skipped() {
        let chunks = vec![
            "data: {not json at all\n\n",
            "data: {\"id\":\"1\",\"choices\":[{\"delta\":{\"content\":\"ok\"}}]}\n\n",
        ];
        let (full, tokens) = decode_collecting(chunks).await;
        assert_eq!(full, "ok");
        assert_eq!(tokens, vec!["ok"]);
    }

    #[tokio::test]
    async fn comments_and_other_fields_are_skipped() {
        let chunks = vec![
            ": keep-alive\n",
            "event: completion\n",
            "data: {\"id\":\"1\",\"choices\":[{\"delta\":{\"content\":\"ok\"}}]}\n\n",
        ];
        let (full, _) = decode_collecting(chunks).await;
        assert_eq!(full, "ok");
    }

    #[tokio::test]
    async fn multibyte_tokens_survive_arbitrary_splits() {
        let line = "data: {\"id\":\"1\",\"choices\":[{\"delta\":{\"content\":\"héllo 世界\"}}]}\n\n";
        // Leak to get 'static chunks for the fake body stream.
        let line: &'static str = Box::leak(line.to_string().into_boxed_str());
        let mid = line
            .char_indices()
            .map(|(i, _)| i)
            .find(|&i| i > line.len() / 2)
            .unwrap();
        let (a, b) = line.split_at(mid);

        let (full, _) = decode_collecting(vec![a, b]).await;
        assert_eq!(full, "héllo 世界");
    }

    #[tokio::test]
    async fn stream_without_done_completes_on_body_end() {
        let (full, tokens) =
            decode_collecting(vec!["data: {\"choices\":[{\"delta\":{\"content\":\"hi\"}}]}\n"])
                .await;
        assert_eq!(full, "hi");
        assert_eq!(tokens, vec!["hi"]);
    }

    #[test]
    fn endpoint_suffixing_is_idempotent() {
        assert_eq!(
            endpoint_from_base("http://localhost:8000/v1"),
            "http://localhost:8000/v1/chat/completions"
        );
        assert_eq!(
            endpoint_from_base("http://localhost:8000/v1/"),
            "http://localhost:8000/v1/chat/completions"
        );
        assert_eq!(
            endpoint_from_base("http://localhost:8000/v1/chat/completions"),
            "http://localhost:8000/v1/chat/completions"
        );
    }

    #[test]
    fn request_body_wire_shape() {
        let messages = vec![ChatMessage::user("hi")];
        let body = CompletionsRequest {
            model: "gpt-4o",
            messages: &messages,
            stream: true,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "gpt-4o");
        assert_eq!(json["stream"], true);
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "hi");
    }
}
