pub mod provider;
pub mod providers;
pub mod types;

pub use provider::{CompletionProvider, CompletionRequest, ProviderError};
pub use providers::{GeminiProvider, LmStudioProvider};
pub use types::{Conversation, DEFAULT_GREETING, Message, Role, RoleParseError};
