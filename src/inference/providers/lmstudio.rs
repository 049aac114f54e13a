//! LM Studio provider implementation using the OpenAI-compatible
//! `/chat/completions` endpoint.
//!
//! Requests are sent with `stream: false`; the whole reply arrives as one
//! JSON body.

use async_trait::async_trait;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::inference::{
    CompletionProvider, CompletionRequest, Conversation, ProviderError, Role,
};

pub const DEFAULT_LMSTUDIO_BASE_URL: &str = "http://localhost:1234/v1";

// ============================================================================
// Chat Completions API Types
// ============================================================================

/// Role in an input message (OpenAI terminology)
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
enum WireRole {
    System,
    User,
    Assistant,
}

#[derive(Serialize, Debug, Clone)]
struct ChatMessage {
    role: WireRole,
    content: String,
}

#[derive(Serialize, Debug)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
}

#[derive(Deserialize, Debug)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize, Debug)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize, Debug)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

// ============================================================================
// Translation Layer
// ============================================================================

fn conversation_to_messages(conversation: &Conversation) -> Vec<ChatMessage> {
    conversation
        .messages()
        .iter()
        .map(|msg| ChatMessage {
            role: match msg.role {
                Role::System => WireRole::System,
                Role::User => WireRole::User,
                Role::Bot => WireRole::Assistant,
            },
            content: msg.content.clone(),
        })
        .collect()
}

// ============================================================================
// Provider Implementation
// ============================================================================

/// LM Studio API provider (local inference server, no auth)
pub struct LmStudioProvider {
    base_url: String,
    client: reqwest::Client,
}

impl LmStudioProvider {
    pub fn new(base_url: Option<String>) -> Self {
        Self {
            base_url: base_url.unwrap_or_else(|| DEFAULT_LMSTUDIO_BASE_URL.to_string()),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl CompletionProvider for LmStudioProvider {
    fn name(&self) -> &str {
        "lmstudio"
    }

    async fn generate(&self, request: CompletionRequest<'_>) -> Result<String, ProviderError> {
        let body = ChatRequest {
            model: request.model.to_string(),
            messages: conversation_to_messages(request.conversation),
            stream: false,
        };

        info!(
            "LM Studio chat request: model={}, message_count={}",
            request.model,
            body.messages.len()
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        debug!("LM Studio response status: {}", response.status());

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let err_body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            warn!("LM Studio API error: {} - {}", status, err_body);
            return Err(ProviderError::Api {
                status,
                message: err_body,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        let choice = parsed.choices.into_iter().next().ok_or(ProviderError::Empty)?;
        Ok(choice.message.content.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_keep_system_role() {
        let mut conv = Conversation::seeded("hello", "code");
        conv.add_user_message("q".to_string());
        conv.add_bot_message("a".to_string());

        let roles: Vec<WireRole> = conversation_to_messages(&conv)
            .iter()
            .map(|m| m.role)
            .collect();
        assert_eq!(
            roles,
            vec![
                WireRole::System,
                WireRole::System,
                WireRole::User,
                WireRole::Assistant
            ]
        );
    }

    #[test]
    fn test_request_is_not_streamed() {
        let conv = Conversation::seeded("hello", "code");
        let body = ChatRequest {
            model: "m".to_string(),
            messages: conversation_to_messages(&conv),
            stream: false,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["stream"], false);
        assert_eq!(json["messages"][1]["content"], "code");
    }
}
