use std::fmt;

use async_trait::async_trait;

use super::types::Conversation;

/// Errors that can occur during provider operations.
///
/// None of these ever reach the transcript verbatim: the store turns every
/// variant into the same fallback reply and logs the detail.
#[derive(Debug)]
pub enum ProviderError {
    /// Provider misconfigured (missing API key, bad URL).
    Config(String),
    /// Network-level failure (timeout, DNS, connection refused).
    Network(String),
    /// API returned an error response.
    Api { status: u16, message: String },
    /// Failed to parse the provider's response.
    Parse(String),
    /// The response parsed but carried no candidate at all.
    Empty,
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::Config(msg) => write!(f, "config error: {msg}"),
            ProviderError::Network(msg) => write!(f, "network error: {msg}"),
            ProviderError::Api { status, message } => {
                write!(f, "API error (HTTP {status}): {message}")
            }
            ProviderError::Parse(msg) => write!(f, "parse error: {msg}"),
            ProviderError::Empty => write!(f, "response contained no candidates"),
        }
    }
}

impl std::error::Error for ProviderError {}

/// Everything a provider needs to fulfill a completion request.
///
/// `conversation` already ends with the user turn being answered.
pub struct CompletionRequest<'a> {
    pub conversation: &'a Conversation,
    pub model: &'a str,
}

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Returns the name of the provider.
    fn name(&self) -> &str;

    /// Sends the whole transcript and awaits one complete reply.
    async fn generate(&self, request: CompletionRequest<'_>) -> Result<String, ProviderError>;
}
