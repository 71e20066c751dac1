//! Static catalog of providers, their models, and wire-format endpoints.
//!
//! Pure lookups, no I/O. Absence is reported as `None`, never as an error.
//! The catalog order is load-bearing: [`crate::types::Credentials::available`]
//! and the arbitrary-fallback tier of the routing engine both follow it.

use crate::types::ProviderKey;

// ---------------------------------------------------------------------------
// Catalog types
// ---------------------------------------------------------------------------

/// Which wire protocol a provider speaks. The adapter is always chosen from
/// this tag, never guessed from the endpoint URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderWire {
    /// `POST {endpoint}` with a bearer token and `data: {json}` SSE lines
    /// terminated by a `data: [DONE]` sentinel.
    OpenAiCompat { endpoint: &'static str },
    /// Anthropic Messages API: `x-api-key` header auth, event-typed SSE.
    Anthropic,
    /// Gemini `streamGenerateContent`: key in the query string, `alt=sse`.
    Gemini,
    /// OpenAI-shaped request without a model field; data lines may carry
    /// bare text instead of JSON.
    Legacy { endpoint: &'static str },
}

/// One inference target offered by a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Model {
    pub id: &'static str,
    pub name: &'static str,
    pub provider: ProviderKey,
    pub description: &'static str,
    /// Capability tags consumed by the routing priority tables.
    pub tags: &'static [&'static str],
}

/// A catalog entry for one upstream vendor.
#[derive(Debug, Clone, Copy)]
pub struct Provider {
    pub id: ProviderKey,
    pub name: &'static str,
    pub description: &'static str,
    pub wire: ProviderWire,
    /// Prepended to the model id on the wire (e.g. Llama models routed
    /// through OpenRouter).
    pub model_prefix: Option<&'static str>,
    /// Extra request headers some aggregators require for attribution.
    pub extra_headers: &'static [(&'static str, &'static str)],
    pub models: &'static [Model],
}

// ---------------------------------------------------------------------------
// Catalog data
// ---------------------------------------------------------------------------

const OPENROUTER_ENDPOINT: &str = "https://openrouter.ai/api/v1/chat/completions";
const OPENROUTER_HEADERS: &[(&str, &str)] = &[("HTTP-Referer", "https://relay-ai.dev")];

static PROVIDERS: [Provider; 12] = [
    Provider {
        id: ProviderKey::Grok,
        name: "Grok (xAI)",
        description: "Rebellious, innovative thinking",
        wire: ProviderWire::OpenAiCompat {
            endpoint: "https://api.x.ai/v1/chat/completions",
        },
        model_prefix: None,
        extra_headers: &[],
        models: &[
            Model {
                id: "grok-2",
                name: "Grok-2",
                provider: ProviderKey::Grok,
                description: "Latest and most capable",
                tags: &["uncensored", "creative"],
            },
            Model {
                id: "grok-2-mini",
                name: "Grok-2 Mini",
                provider: ProviderKey::Grok,
                description: "Faster, lighter version",
                tags: &["uncensored"],
            },
        ],
    },
    Provider {
        id: ProviderKey::Anthropic,
        name: "Claude (Anthropic)",
        description: "Structured, thoughtful analysis",
        wire: ProviderWire::Anthropic,
        model_prefix: None,
        extra_headers: &[],
        models: &[
            Model {
                id: "claude-sonnet-4-20250514",
                name: "Claude Sonnet 4",
                provider: ProviderKey::Anthropic,
                description: "Best balance of speed and capability",
                tags: &["code", "reasoning"],
            },
            Model {
                id: "claude-3-5-sonnet-20241022",
                name: "Claude 3.5 Sonnet",
                provider: ProviderKey::Anthropic,
                description: "Previous generation, still excellent",
                tags: &["code"],
            },
            Model {
                id: "claude-3-opus-20240229",
                name: "Claude 3 Opus",
                provider: ProviderKey::Anthropic,
                description: "Most capable, slower",
                tags: &["reasoning"],
            },
        ],
    },
    Provider {
        id: ProviderKey::OpenAi,
        name: "GPT (OpenAI)",
        description: "Creative, broad capabilities",
        wire: ProviderWire::OpenAiCompat {
            endpoint: "https://api.openai.com/v1/chat/completions",
        },
        model_prefix: None,
        extra_headers: &[],
        models: &[
            Model {
                id: "gpt-4o",
                name: "GPT-4o",
                provider: ProviderKey::OpenAi,
                description: "Flagship multimodal model",
                tags: &["general", "creative"],
            },
            Model {
                id: "gpt-4o-mini",
                name: "GPT-4o Mini",
                provider: ProviderKey::OpenAi,
                description: "Fast and cost-effective",
                tags: &["general"],
            },
            Model {
                id: "o1-preview",
                name: "o1 Preview",
                provider: ProviderKey::OpenAi,
                description: "Advanced reasoning model",
                tags: &["math", "reasoning"],
            },
        ],
    },
    Provider {
        id: ProviderKey::Gemini,
        name: "Gemini (Google)",
        description: "Multimodal, research-focused",
        wire: ProviderWire::Gemini,
        model_prefix: None,
        extra_headers: &[],
        models: &[
            Model {
                id: "gemini-1.5-pro",
                name: "Gemini 1.5 Pro",
                provider: ProviderKey::Gemini,
                description: "Most capable, long context",
                tags: &["research", "multimodal"],
            },
            Model {
                id: "gemini-1.5-flash",
                name: "Gemini 1.5 Flash",
                provider: ProviderKey::Gemini,
                description: "Fast and efficient",
                tags: &["general"],
            },
            Model {
                id: "gemini-2.0-flash-exp",
                name: "Gemini 2.0 Flash",
                provider: ProviderKey::Gemini,
                description: "Next-gen experimental",
                tags: &["research"],
            },
        ],
    },
    Provider {
        id: ProviderKey::DeepSeek,
        name: "DeepSeek",
        description: "Cost-effective reasoning powerhouse",
        wire: ProviderWire::OpenAiCompat {
            endpoint: "https://api.deepseek.com/v1/chat/completions",
        },
        model_prefix: None,
        extra_headers: &[],
        models: &[
            Model {
                id: "deepseek-reasoner",
                name: "DeepSeek R1",
                provider: ProviderKey::DeepSeek,
                description: "Cost-effective reasoning",
                tags: &["math", "reasoning", "code"],
            },
            Model {
                id: "deepseek-chat",
                name: "DeepSeek V3",
                provider: ProviderKey::DeepSeek,
                description: "Fast general chat",
                tags: &["general", "code"],
            },
        ],
    },
    Provider {
        id: ProviderKey::Qwen,
        name: "Qwen (Alibaba)",
        description: "Multilingual powerhouse",
        wire: ProviderWire::OpenAiCompat {
            endpoint: "https://dashscope.aliyuncs.com/compatible-mode/v1/chat/completions",
        },
        model_prefix: None,
        extra_headers: &[],
        models: &[
            Model {
                id: "qwen-max",
                name: "Qwen3 Max",
                provider: ProviderKey::Qwen,
                description: "Multilingual power",
                tags: &["multilingual", "reasoning"],
            },
            Model {
                id: "qwen-plus",
                name: "Qwen3 Plus",
                provider: ProviderKey::Qwen,
                description: "Balanced performance",
                tags: &["multilingual", "general"],
            },
            Model {
                id: "qwen-turbo",
                name: "Qwen3 Turbo",
                provider: ProviderKey::Qwen,
                description: "Fast and efficient",
                tags: &["multilingual"],
            },
        ],
    },
    Provider {
        id: ProviderKey::Perplexity,
        name: "Perplexity",
        description: "AI-powered research with citations",
        wire: ProviderWire::OpenAiCompat {
            endpoint: "https://api.perplexity.ai/chat/completions",
        },
        model_prefix: None,
        extra_headers: &[],
        models: &[
            Model {
                id: "sonar-pro",
                name: "Sonar Pro",
                provider: ProviderKey::Perplexity,
                description: "Research mode with citations",
                tags: &["research", "citations"],
            },
            Model {
                id: "sonar",
                name: "Sonar",
                provider: ProviderKey::Perplexity,
                description: "Fast web-grounded answers",
                tags: &["research"],
            },
            Model {
                id: "sonar-reasoning",
                name: "Sonar Reasoning",
                provider: ProviderKey::Perplexity,
                description: "Chain-of-thought with search",
                tags: &["research", "reasoning"],
            },
        ],
    },
    Provider {
        id: ProviderKey::Gab,
        name: "Gab AI",
        description: "Uncensored, bold responses",
        wire: ProviderWire::Legacy {
            endpoint: "https://api.gab.ai/v1/chat/completions",
        },
        model_prefix: None,
        extra_headers: &[],
        models: &[Model {
            id: "gab-ai",
            name: "Gab AI",
            provider: ProviderKey::Gab,
            description: "Uncensored bold responses",
            tags: &["uncensored"],
        }],
    },
    Provider {
        id: ProviderKey::Kimi,
        name: "Moonshot Kimi",
        description: "Agentic AI with tool use",
        wire: ProviderWire::OpenAiCompat {
            endpoint: "https://api.moonshot.cn/v1/chat/completions",
        },
        model_prefix: None,
        extra_headers: &[],
        models: &[
            Model {
                id: "moonshot-v1-128k",
                name: "Kimi 128K",
                provider: ProviderKey::Kimi,
                description: "Agentic long context",
                tags: &["agentic", "multilingual"],
            },
            Model {
                id: "moonshot-v1-32k",
                name: "Kimi 32K",
                provider: ProviderKey::Kimi,
                description: "Balanced context window",
                tags: &["agentic"],
            },
            Model {
                id: "moonshot-v1-8k",
                name: "Kimi 8K",
                provider: ProviderKey::Kimi,
                description: "Fast responses",
                tags: &["agentic"],
            },
        ],
    },
    Provider {
        id: ProviderKey::OpenRouter,
        name: "OpenRouter",
        description: "Unified access to 100+ models",
        wire: ProviderWire::OpenAiCompat {
            endpoint: OPENROUTER_ENDPOINT,
        },
        model_prefix: None,
        extra_headers: OPENROUTER_HEADERS,
        models: &[
            Model {
                id: "openrouter/auto",
                name: "Auto Router",
                provider: ProviderKey::OpenRouter,
                description: "Best model for your query",
                tags: &["general"],
            },
            Model {
                id: "anthropic/claude-3.5-sonnet",
                name: "Claude 3.5 (OR)",
                provider: ProviderKey::OpenRouter,
                description: "Via OpenRouter",
                tags: &["code", "reasoning"],
            },
            Model {
                id: "google/gemini-pro-1.5",
                name: "Gemini Pro (OR)",
                provider: ProviderKey::OpenRouter,
                description: "Via OpenRouter",
                tags: &["research"],
            },
            Model {
                id: "deepseek/deepseek-r1",
                name: "DeepSeek R1 (OR)",
                provider: ProviderKey::OpenRouter,
                description: "Via OpenRouter",
                tags: &["math", "reasoning"],
            },
        ],
    },
    Provider {
        id: ProviderKey::Meta,
        name: "Meta Llama",
        description: "Open-weight powerhouse",
        // Llama models are served through OpenRouter.
        wire: ProviderWire::OpenAiCompat {
            endpoint: OPENROUTER_ENDPOINT,
        },
        model_prefix: Some("meta-llama/"),
        extra_headers: OPENROUTER_HEADERS,
        models: &[
            Model {
                id: "llama-3.3-70b",
                name: "Llama 3.3 70B",
                provider: ProviderKey::Meta,
                description: "Most capable open model",
                tags: &["code", "general"],
            },
            Model {
                id: "llama-3.1-405b",
                name: "Llama 3.1 405B",
                provider: ProviderKey::Meta,
                description: "Largest Llama model",
                tags: &["reasoning", "code"],
            },
            Model {
                id: "llama-3.2-90b-vision",
                name: "Llama 3.2 Vision",
                provider: ProviderKey::Meta,
                description: "Multimodal capabilities",
                tags: &["multimodal"],
            },
        ],
    },
    Provider {
        id: ProviderKey::Mistral,
        name: "Mistral AI",
        description: "European AI excellence",
        wire: ProviderWire::OpenAiCompat {
            endpoint: "https://api.mistral.ai/v1/chat/completions",
        },
        model_prefix: None,
        extra_headers: &[],
        models: &[
            Model {
                id: "mistral-large-latest",
                name: "Mistral Large 3",
                provider: ProviderKey::Mistral,
                description: "Flagship model",
                tags: &["reasoning", "multilingual"],
            },
            Model {
                id: "mistral-small-latest",
                name: "Mistral Small 3",
                provider: ProviderKey::Mistral,
                description: "Fast and efficient",
                tags: &["general", "code"],
            },
            Model {
                id: "codestral-latest",
                name: "Codestral",
                provider: ProviderKey::Mistral,
                description: "Optimized for code",
                tags: &["code"],
            },
        ],
    },
];

// ---------------------------------------------------------------------------
// Lookups
// ---------------------------------------------------------------------------

/// All known providers in catalog order.
pub fn providers() -> &'static [Provider] {
    &PROVIDERS
}

/// The catalog entry for a provider key. Total because [`ProviderKey`] is a
/// closed set mirrored by the catalog (see `catalog_covers_every_key`).
pub fn provider(id: ProviderKey) -> &'static Provider {
    PROVIDERS
        .iter()
        .find(|p| p.id == id)
        .expect("catalog entry for every provider key")
}

/// Every model across all providers, in catalog order.
pub fn models() -> impl Iterator<Item = &'static Model> {
    PROVIDERS.iter().flat_map(|p| p.models.iter())
}

/// Look up a model by its id, if present in the catalog.
pub fn model_by_id(id: &str) -> Option<&'static Model> {
    models().find(|m| m.id == id)
}

/// The provider owning a catalog model id, if any.
pub fn provider_for_model(model_id: &str) -> Option<&'static Provider> {
    model_by_id(model_id).map(|m| provider(m.provider))
}

/// The first-listed model of a provider, used when routing picks a provider
/// rather than a specific model.
pub fn default_model(id: ProviderKey) -> &'static Model {
    &provider(id).models[0]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_covers_every_key() {
        // `provider` panics on a gap, so walking all keys is the whole test.
        for key in [
            ProviderKey::Grok,
            ProviderKey::OpenAi,
            ProviderKey::Anthropic,
            ProviderKey::Gemini,
            ProviderKey::DeepSeek,
            ProviderKey::Qwen,
            ProviderKey::Perplexity,
            ProviderKey::Gab,
            ProviderKey::Kimi,
            ProviderKey::OpenRouter,
            ProviderKey::Meta,
            ProviderKey::Mistral,
        ] {
            assert_eq!(provider(key).id, key);
        }
    }

    #[test]
    fn every_provider_has_models() {
        for p in providers() {
            assert!(!p.models.is_empty(), "{} has no models", p.name);
        }
    }

    #[test]
    fn every_model_points_at_its_provider() {
        for p in providers() {
            for m in p.models {
                assert_eq!(m.provider, p.id, "{} owned by wrong provider", m.id);
            }
        }
    }

    #[test]
    fn model_ids_are_unique() {
        let ids: Vec<&str> = models().map(|m| m.id).collect();
        let mut deduped = ids.clone();
        deduped.sort_unstable();
        deduped.dedup();
        assert_eq!(ids.len(), deduped.len());
    }

    #[test]
    fn model_lookup() {
        let model = model_by_id("deepseek-reasoner").unwrap();
        assert_eq!(model.name, "DeepSeek R1");
        assert_eq!(model.provider, ProviderKey::DeepSeek);

        assert!(model_by_id("no-such-model").is_none());
    }

    #[test]
    fn provider_for_model_lookup() {
        let p = provider_for_model("claude-3-opus-20240229").unwrap();
        assert_eq!(p.id, ProviderKey::Anthropic);

        assert!(provider_for_model("no-such-model").is_none());
    }

    #[test]
    fn default_model_is_first_listed() {
        assert_eq!(default_model(ProviderKey::OpenAi).id, "gpt-4o");
        assert_eq!(default_model(ProviderKey::DeepSeek).id, "deepseek-reasoner");
        assert_eq!(default_model(ProviderKey::Perplexity).id, "sonar-pro");
    }

    #[test]
    fn meta_routes_through_openrouter_with_prefix() {
        let meta = provider(ProviderKey::Meta);
        assert_eq!(meta.model_prefix, Some("meta-llama/"));
        assert!(matches!(
            meta.wire,
            ProviderWire::OpenAiCompat { endpoint } if endpoint.contains("openrouter.ai")
        ));
        assert!(!meta.extra_headers.is_empty());
    }

    #[test]
    fn gab_speaks_the_legacy_wire_format() {
        assert!(matches!(
            provider(ProviderKey::Gab).wire,
            ProviderWire::Legacy { .. }
        ));
    }
}
