//! Top-level entry points: provider-level streaming and the orchestrating
//! [`send_message`].
//!
//! Everything here upholds the same contract as the adapters: the returned
//! futures always resolve. Failures surface through `on_error` and, for
//! [`send_message`], as a clearly labeled error string in the outcome, so
//! callers never need rejection handling around a chat request.

use crate::adapters::{self, StreamCallbacks, StreamOutcome};
use crate::prompts;
use crate::registry::{self, ProviderWire};
use crate::routing;
use crate::types::{
    ApiFormat, ChatMessage, ChatMode, ChatOutcome, Credentials, CustomModel, ProviderKey,
};

/// Model label reported when the offline canned reply is used.
pub const MOCK_MODEL: &str = "mock";

// ---------------------------------------------------------------------------
// Provider-level streaming
// ---------------------------------------------------------------------------

/// Stream a completion from a catalog provider, dispatching on its wire
/// format.
pub async fn stream_chat(
    provider: ProviderKey,
    api_key: &str,
    model: &str,
    messages: &[ChatMessage],
    callbacks: &mut StreamCallbacks<'_>,
) -> StreamOutcome {
    let entry = registry::provider(provider);

    match entry.wire {
        ProviderWire::OpenAiCompat { endpoint } => {
            let model = match entry.model_prefix {
                Some(prefix) => format!("{prefix}{model}"),
                None => model.to_string(),
            };
            adapters::openai::stream(
                endpoint,
                api_key,
                &model,
                messages,
                entry.extra_headers,
                callbacks,
            )
            .await
        }
        ProviderWire::Anthropic => {
            adapters::anthropic::stream(
                adapters::anthropic::API_URL,
                api_key,
                model,
                messages,
                callbacks,
            )
            .await
        }
        ProviderWire::Gemini => {
            adapters::gemini::stream(
                adapters::gemini::API_BASE,
                api_key,
                model,
                messages,
                callbacks,
            )
            .await
        }
        ProviderWire::Legacy { endpoint } => {
            adapters::legacy::stream(endpoint, api_key, messages, callbacks).await
        }
    }
}

/// Stream a completion from a user-defined endpoint. The adapter is chosen
/// from the record's wire-format tag alone; endpoint suffixing tolerates
/// base URLs that already carry the canonical path.
pub async fn stream_custom_model(
    model: &CustomModel,
    messages: &[ChatMessage],
    callbacks: &mut StreamCallbacks<'_>,
) -> StreamOutcome {
    match model.api_format {
        ApiFormat::OpenAi => {
            adapters::openai::stream(
                &adapters::openai::endpoint_from_base(&model.base_url),
                &model.api_key,
                &model.model_id,
                messages,
                &[],
                callbacks,
            )
            .await
        }
        ApiFormat::Anthropic => {
            adapters::anthropic::stream(
                &adapters::anthropic::endpoint_from_base(&model.base_url),
                &model.api_key,
                &model.model_id,
                messages,
                callbacks,
            )
            .await
        }
        ApiFormat::Gemini => {
            adapters::gemini::stream(
                &model.base_url,
                &model.api_key,
                &model.model_id,
                messages,
                callbacks,
            )
            .await
        }
    }
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// Inputs of one [`send_message`] call.
pub struct SendMessageOptions<'a> {
    pub message: String,
    pub mode: ChatMode,
    pub credentials: &'a Credentials,
    /// Pin a specific catalog model instead of routing by intent.
    pub selected_model_id: Option<String>,
    /// Prior turns, oldest first, without system messages.
    pub history: Vec<ChatMessage>,
    pub callbacks: StreamCallbacks<'a>,
}

impl<'a> SendMessageOptions<'a> {
    pub fn new(message: impl Into<String>, mode: ChatMode, credentials: &'a Credentials) -> Self {
        Self {
            message: message.into(),
            mode,
            credentials,
            selected_model_id: None,
            history: Vec::new(),
            callbacks: StreamCallbacks::new(),
        }
    }
}

struct Resolved {
    provider: ProviderKey,
    model_id: &'static str,
    model_name: &'static str,
    api_key: String,
}

/// Pick the backend for this call, or `None` for the mock path.
///
/// An explicitly selected model never falls back to routing: if its
/// provider has no credential the call degrades to mock even when other
/// providers are credentialed.
fn resolve(
    credentials: &Credentials,
    selected_model_id: Option<&str>,
    message: &str,
    mode: ChatMode,
) -> Option<Resolved> {
    match selected_model_id {
        Some(model_id) => {
            let model = registry::model_by_id(model_id)?;
            let api_key = credentials.get(model.provider)?;
            Some(Resolved {
                provider: model.provider,
                model_id: model.id,
                model_name: model.name,
                api_key: api_key.to_string(),
            })
        }
        None => {
            let available = credentials.available();
            let selection = routing::select_smart(message, mode, &available)?;
            let api_key = credentials.get(selection.provider)?;
            Some(Resolved {
                provider: selection.provider,
                model_id: selection.model.id,
                model_name: selection.model.name,
                api_key: api_key.to_string(),
            })
        }
    }
}

/// The message list for one request: mode persona, then history, then the
/// new user turn.
fn build_messages(mode: ChatMode, history: Vec<ChatMessage>, message: String) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessage::system(prompts::system_prompt(mode)));
    messages.extend(history);
    messages.push(ChatMessage::user(message));
    messages
}

/// Send one chat message, streaming tokens through the caller's hooks.
///
/// Resolution order: an explicitly selected model, else smart routing over
/// the credentialed providers, else the mode's canned mock reply (which
/// performs no network I/O). The future always resolves with a
/// [`ChatOutcome`]; adapter failures become a labeled error string in
/// `content` after `on_error` has fired.
pub async fn send_message(options: SendMessageOptions<'_>) -> ChatOutcome {
    let SendMessageOptions {
        message,
        mode,
        credentials,
        selected_model_id,
        history,
        mut callbacks,
    } = options;

    let Some(resolved) = resolve(credentials, selected_model_id.as_deref(), &message, mode)
    else {
        let content = prompts::mock_response(mode);
        callbacks.emit_complete(content);
        return ChatOutcome {
            content: content.to_string(),
            model: MOCK_MODEL.to_string(),
        };
    };

    let messages = build_messages(mode, history, message);

    match stream_chat(
        resolved.provider,
        &resolved.api_key,
        resolved.model_id,
        &messages,
        &mut callbacks,
    )
    .await
    {
        StreamOutcome::Complete(content) => ChatOutcome {
            content,
            model: resolved.model_name.to_string(),
        },
        StreamOutcome::Failed(err) => ChatOutcome {
            content: format!("**Error from {}:** {err}", resolved.model_name),
            model: resolved.model_name.to_string(),
        },
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
