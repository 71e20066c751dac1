pub mod adapters;
pub mod chat;
pub mod intent;
pub mod prompts;
pub mod registry;
pub mod routing;
pub(crate) mod sse;
pub mod types;

// Re-export the main entry points and core types at crate root.
pub use adapters::{ProviderError, StreamCallbacks, StreamOutcome};
pub use chat::{send_message, stream_chat, stream_custom_model, SendMessageOptions, MOCK_MODEL};
pub use intent::{classify, IntentTag};
pub use registry::{Model, Provider, ProviderWire};
pub use routing::{select_basic, select_smart, Selection};
pub use types::*;
