use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

/// A single chat turn. Serializes directly to the OpenAI-compatible wire
/// shape (`{"role": "...", "content": "..."}`); the other adapters convert
/// from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }
}

// ---------------------------------------------------------------------------
// Modes
// ---------------------------------------------------------------------------

/// Conversation mode selected by the user. Drives the system prompt, the
/// routing fallback order, and the offline mock reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatMode {
    General,
    Innovation,
    Code,
    Research,
}

impl ChatMode {
    pub const ALL: [ChatMode; 4] = [
        ChatMode::General,
        ChatMode::Innovation,
        ChatMode::Code,
        ChatMode::Research,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::General => "General",
            Self::Innovation => "Innovation",
            Self::Code => "Prototype",
            Self::Research => "Research",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::General => "Open conversation and Q&A",
            Self::Innovation => "High-intensity brainstorming",
            Self::Code => "Build rapid prototypes and MVPs",
            Self::Research => "Synthesize and analyze research",
        }
    }
}

// ---------------------------------------------------------------------------
// Providers
// ---------------------------------------------------------------------------

/// Identity of an upstream LLM vendor known to the static registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKey {
    Grok,
    OpenAi,
    Anthropic,
    Gemini,
    DeepSeek,
    Qwen,
    Perplexity,
    Gab,
    Kimi,
    OpenRouter,
    Meta,
    Mistral,
}

impl std::fmt::Display for ProviderKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Grok => write!(f, "grok"),
            Self::OpenAi => write!(f, "openai"),
            Self::Anthropic => write!(f, "anthropic"),
            Self::Gemini => write!(f, "gemini"),
            Self::DeepSeek => write!(f, "deepseek"),
            Self::Qwen => write!(f, "qwen"),
            Self::Perplexity => write!(f, "perplexity"),
            Self::Gab => write!(f, "gab"),
            Self::Kimi => write!(f, "kimi"),
            Self::OpenRouter => write!(f, "openrouter"),
            Self::Meta => write!(f, "meta"),
            Self::Mistral => write!(f, "mistral"),
        }
    }
}

// ---------------------------------------------------------------------------
// Custom models
// ---------------------------------------------------------------------------

/// Wire-format family of a user-defined endpoint. Chosen explicitly when
/// the endpoint is created; the base URL is never used to guess it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiFormat {
    OpenAi,
    Anthropic,
    Gemini,
}

/// A user-defined endpoint with its own credential and target model.
///
/// Lives in the user's local profile and is persisted by the storage layer;
/// this crate only reads it at call time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomModel {
    pub id: String,
    pub name: String,
    pub base_url: String,
    pub api_key: String,
    pub model_id: String,
    pub api_format: ApiFormat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CustomModel {
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model_id: impl Into<String>,
        api_format: ApiFormat,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            model_id: model_id.into(),
            api_format,
            description: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Bump the update timestamp after an edit.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// Per-provider API secrets, read from the storage layer.
///
/// This crate never mutates a caller's credential set during a request;
/// an empty secret counts as absent.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    keys: HashMap<ProviderKey, String>,
}

impl Credentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, provider: ProviderKey, secret: impl Into<String>) {
        self.keys.insert(provider, secret.into());
    }

    /// The secret for a provider, if one is configured and non-empty.
    pub fn get(&self, provider: ProviderKey) -> Option<&str> {
        self.keys
            .get(&provider)
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }

    /// Providers that currently hold a usable secret, in registry order so
    /// the result is deterministic regardless of insertion order.
    pub fn available(&self) -> Vec<ProviderKey> {
        crate::registry::providers()
            .iter()
            .map(|p| p.id)
            .filter(|id| self.get(*id).is_some())
            .collect()
    }
}

impl FromIterator<(ProviderKey, String)> for Credentials {
    fn from_iter<T: IntoIterator<Item = (ProviderKey, String)>>(iter: T) -> Self {
        Self {
            keys: iter.into_iter().collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Terminal result of [`crate::chat::send_message`]. `model` is the display
/// name of the backend that answered, or `"mock"` for the offline fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatOutcome {
    pub content: String,
    pub model: String,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_message_wire_shape() {
        let msg = ChatMessage::user("Hello");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["role"], "user");
        assert_eq!(json["content"], "Hello");
    }

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_value(MessageRole::Assistant).unwrap();
        assert_eq!(json, "assistant");
    }

    #[test]
    fn provider_key_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(ProviderKey::DeepSeek).unwrap(),
            "deepseek"
        );
        assert_eq!(
            serde_json::to_value(ProviderKey::OpenRouter).unwrap(),
            "openrouter"
        );
    }

    #[test]
    fn empty_secret_counts_as_absent() {
        let mut creds = Credentials::new();
        creds.set(ProviderKey::OpenAi, "");
        creds.set(ProviderKey::Anthropic, "sk-ant-test");

        assert!(creds.get(ProviderKey::OpenAi).is_none());
        assert_eq!(creds.get(ProviderKey::Anthropic), Some("sk-ant-test"));
        assert_eq!(creds.available(), vec![ProviderKey::Anthropic]);
    }

    #[test]
    fn available_follows_registry_order() {
        let mut creds = Credentials::new();
        // Insert in reverse of registry order.
        creds.set(ProviderKey::Mistral, "m");
        creds.set(ProviderKey::Grok, "g");

        assert_eq!(
            creds.available(),
            vec![ProviderKey::Grok, ProviderKey::Mistral]
        );
    }

    #[test]
    fn custom_model_construction() {
        let model = CustomModel::new(
            "My vLLM",
            "http://localhost:8000/v1",
            "key",
            "meta-llama/Llama-3.1-8B",
            ApiFormat::OpenAi,
        );
        assert!(!model.id.is_empty());
        assert_eq!(model.created_at, model.updated_at);
        assert_eq!(model.api_format, ApiFormat::OpenAi);
    }

    #[test]
    fn api_format_serializes_lowercase() {
        assert_eq!(serde_json::to_value(ApiFormat::OpenAi).unwrap(), "openai");
        assert_eq!(serde_json::to_value(ApiFormat::Gemini).unwrap(), "gemini");
    }

    #[test]
    fn mode_metadata() {
        assert_eq!(ChatMode::Code.label(), "Prototype");
        assert_eq!(ChatMode::ALL.len(), 4);
    }
}
