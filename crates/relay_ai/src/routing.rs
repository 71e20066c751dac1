//! Provider selection over the credentialed subset of the catalog.
//!
//! Priority lists are hand-ordered per intent and per mode; the first listed
//! provider present in the candidate set always wins. No scoring, no
//! randomization — routing must be reproducible.

use crate::intent::{self, IntentTag};
use crate::registry::{self, Model};
use crate::types::ProviderKey::{self, *};
use crate::types::ChatMode;

// ---------------------------------------------------------------------------
// Priority tables
// ---------------------------------------------------------------------------

fn intent_priorities(intent: IntentTag) -> &'static [ProviderKey] {
    match intent {
        IntentTag::Math => &[DeepSeek, OpenAi, Anthropic, Qwen],
        IntentTag::Code => &[Anthropic, DeepSeek, Mistral, OpenAi],
        IntentTag::Research => &[Perplexity, Gemini, Anthropic, OpenAi],
        IntentTag::Multilingual => &[Qwen, Mistral, Gemini, Kimi],
        IntentTag::Reasoning => &[DeepSeek, Anthropic, OpenAi, Mistral],
        IntentTag::Agentic => &[Kimi, Anthropic, OpenAi, DeepSeek],
        IntentTag::Uncensored => &[Gab, Grok, OpenRouter],
        IntentTag::General => &[OpenAi, Anthropic, Gemini, Grok],
    }
}

fn mode_priorities(mode: ChatMode) -> &'static [ProviderKey] {
    match mode {
        ChatMode::Innovation => &[Grok, OpenAi, Anthropic, DeepSeek, Gemini],
        ChatMode::Code => &[Anthropic, DeepSeek, Mistral, OpenAi, Gemini],
        ChatMode::General => &[OpenAi, Anthropic, Gemini, Grok, Qwen],
        ChatMode::Research => &[Perplexity, Gemini, Anthropic, OpenAi, DeepSeek],
    }
}

/// Priority table of [`select_basic`]. Kept separate from the smart-select
/// fallback table: its innovation ordering predates intent routing and is
/// preserved as-is for callers that still depend on it.
fn basic_mode_priorities(mode: ChatMode) -> &'static [ProviderKey] {
    match mode {
        ChatMode::Innovation => &[Grok, OpenAi, Anthropic, Gemini, DeepSeek],
        ChatMode::Code => &[Anthropic, DeepSeek, Mistral, OpenAi, Gemini],
        ChatMode::General => &[OpenAi, Anthropic, Gemini, Grok, Qwen],
        ChatMode::Research => &[Perplexity, Gemini, Anthropic, OpenAi, DeepSeek],
    }
}

fn first_available(
    priorities: &[ProviderKey],
    available: &[ProviderKey],
) -> Option<ProviderKey> {
    priorities.iter().copied().find(|p| available.contains(p))
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// A routed (provider, model) pair. The model is always the provider's
/// first-listed catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub provider: ProviderKey,
    pub model: &'static Model,
}

impl Selection {
    fn of(provider: ProviderKey) -> Self {
        Self {
            provider,
            model: registry::default_model(provider),
        }
    }
}

/// Pick a provider and model for a message.
///
/// Walks three tiers in order: the per-intent priority lists (in intent
/// detection order), then the mode fallback list, then the first available
/// provider. Returns `None` only when `available` is empty; otherwise the
/// result is always drawn from `available`.
pub fn select_smart(
    message: &str,
    mode: ChatMode,
    available: &[ProviderKey],
) -> Option<Selection> {
    if available.is_empty() {
        return None;
    }

    for tag in intent::classify(message) {
        if let Some(provider) = first_available(intent_priorities(tag), available) {
            return Some(Selection::of(provider));
        }
    }

    if let Some(provider) = first_available(mode_priorities(mode), available) {
        return Some(Selection::of(provider));
    }

    Some(Selection::of(available[0]))
}

/// Mode-only selection, without intent detection.
pub fn select_basic(mode: ChatMode, available: &[ProviderKey]) -> Option<ProviderKey> {
    if available.is_empty() {
        return None;
    }

    first_available(basic_mode_priorities(mode), available).or_else(|| available.first().copied())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
