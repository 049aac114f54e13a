//! Gemini provider implementation using the `generateContent` endpoint.
//!
//! This module uses Gemini terminology:
//! - "contents" (array of turns, not "conversation")
//! - "parts" (each turn carries a list of text parts)
//! - only two roles exist on the wire: `user` and `model`

use async_trait::async_trait;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::inference::{
    CompletionProvider, CompletionRequest, Conversation, ProviderError, Role,
};

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

// ============================================================================
// Gemini API Types
// ============================================================================

/// Role on the wire. Gemini has no system role inside `contents`.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
enum WireRole {
    User,
    Model,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Serialize, Debug)]
struct Content {
    role: WireRole,
    parts: Vec<Part>,
}

#[derive(Serialize, Debug)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

// ============================================================================
// Translation Layer
// ============================================================================

fn wire_role(role: Role) -> WireRole {
    match role {
        // Seeds (greeting + code) are context the user supplied
        Role::System | Role::User => WireRole::User,
        Role::Bot => WireRole::Model,
    }
}

/// Maps the transcript, in order, to `Content` entries.
///
/// Gemini expects turns to alternate, so consecutive messages with the same
/// wire role share one entry, one part per message.
fn conversation_to_contents(conversation: &Conversation) -> Vec<Content> {
    let mut contents: Vec<Content> = Vec::new();
    for msg in conversation.messages() {
        let role = wire_role(msg.role);
        let part = Part {
            text: msg.content.clone(),
        };
        match contents.last_mut() {
            Some(last) if last.role == role => last.parts.push(part),
            _ => contents.push(Content {
                role,
                parts: vec![part],
            }),
        }
    }
    contents
}

/// Concatenates the text parts of the first candidate.
fn response_text(response: GenerateContentResponse) -> Result<String, ProviderError> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or(ProviderError::Empty)?;

    if let Some(reason) = &candidate.finish_reason {
        debug!("Gemini finish reason: {}", reason);
    }

    Ok(candidate
        .content
        .map(|c| c.parts.into_iter().map(|p| p.text).collect::<String>())
        .unwrap_or_default())
}

// ============================================================================
// Provider Implementation
// ============================================================================

/// Google Gemini API provider
pub struct GeminiProvider {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl GeminiProvider {
    /// Creates a new Gemini provider.
    ///
    /// # Arguments
    /// * `api_key` - Generative Language API key
    /// * `base_url` - Optional custom base URL (defaults to Google's v1beta API)
    pub fn new(api_key: String, base_url: Option<String>) -> Self {
        Self {
            api_key,
            base_url: base_url.unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl CompletionProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, request: CompletionRequest<'_>) -> Result<String, ProviderError> {
        if self.api_key.is_empty() {
            return Err(ProviderError::Config("Gemini API key is empty".to_string()));
        }

        let body = GenerateContentRequest {
            contents: conversation_to_contents(request.conversation),
        };

        info!(
            "Gemini generateContent request: model={}, contents={}",
            request.model,
            body.contents.len()
        );

        let response = self
            .client
            .post(format!(
                "{}/models/{}:generateContent",
                self.base_url, request.model
            ))
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        debug!("Gemini response status: {}", response.status());

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let err_body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            warn!("Gemini API error: {} - {}", status, err_body);
            return Err(ProviderError::Api {
                status,
                message: err_body,
            });
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        let text = response_text(parsed)?;
        info!("Gemini reply received: {} bytes", text.len());
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contents_map_roles_in_order() {
        let mut conv = Conversation::seeded("hello", "print(1)");
        conv.add_user_message("what?".to_string());
        conv.add_bot_message("prints one".to_string());

        let contents = conversation_to_contents(&conv);
        let roles: Vec<WireRole> = contents.iter().map(|c| c.role).collect();
        assert_eq!(roles, vec![WireRole::User, WireRole::Model]);

        let texts: Vec<&str> = contents[0].parts.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(texts, vec!["hello", "print(1)", "what?"]);
        assert_eq!(contents[1].parts[0].text, "prints one");
    }

    #[test]
    fn test_contents_alternate_across_turns() {
        let mut conv = Conversation::seeded("hello", "print(1)");
        conv.add_user_message("q1".to_string());
        conv.add_bot_message("a1".to_string());
        conv.add_user_message("q2".to_string());

        let contents = conversation_to_contents(&conv);
        assert!(contents.windows(2).all(|w| w[0].role != w[1].role));
        assert_eq!(contents.len(), 3);
        assert_eq!(contents[2].parts[0].text, "q2");
    }

    #[test]
    fn test_request_serializes_gemini_shape() {
        let conv = Conversation::seeded("hello", "code");
        let body = GenerateContentRequest {
            contents: conversation_to_contents(&conv),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hello");
    }

    #[test]
    fn test_response_text_joins_parts() {
        let raw = r#"{"candidates":[{"content":{"parts":[{"text":"Hello"},{"text":" world"}]},"finishReason":"STOP"}]}"#;
        let parsed: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response_text(parsed).unwrap(), "Hello world");
    }

    #[test]
    fn test_response_without_candidates_is_empty_error() {
        let parsed: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert!(matches!(response_text(parsed), Err(ProviderError::Empty)));
    }

    #[test]
    fn test_candidate_without_content_yields_empty_text() {
        let raw = r#"{"candidates":[{"finishReason":"SAFETY"}]}"#;
        let parsed: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response_text(parsed).unwrap(), "");
    }
}
