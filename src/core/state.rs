//! # Application State
//!
//! Core business state for one chat session. This module contains domain
//! logic only - no TUI-specific types. Presentation state lives in the `tui`
//! module.
//!
//! ```text
//! App
//! ├── provider: Arc<dyn CompletionProvider>  // backend handle, built once
//! ├── conversation: Conversation    // ordered transcript, seeded
//! ├── turn: TurnState               // Idle | AwaitingResponse
//! ├── generation: u64               // session identity for stale replies
//! ├── session_id: String            // log correlation
//! ├── code: String                  // artifact under discussion
//! ├── greeting: String              // first seed message
//! ├── model_name: String            // current model
//! └── status_message: String        // status bar text
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.

use std::sync::Arc;

use crate::inference::{CompletionProvider, Conversation};

/// Transcript appended when the backend call fails.
pub const FALLBACK_REPLY: &str = "Something went wrong. Please try again.";
/// Transcript appended when the backend answers with no text.
pub const EMPTY_REPLY: &str = "I couldn't understand that.";

pub const STATUS_READY: &str = "Ready";
pub const STATUS_THINKING: &str = "AI is thinking...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    Idle,
    AwaitingResponse,
}

pub struct App {
    pub provider: Arc<dyn CompletionProvider>,
    pub conversation: Conversation,
    pub turn: TurnState,
    /// Bumped every time a session is (re)opened.
    pub generation: u64,
    pub session_id: String,
    pub code: String,
    pub greeting: String,
    pub model_name: String,
    pub status_message: String,
}

impl App {
    pub fn new(
        provider: Arc<dyn CompletionProvider>,
        model_name: String,
        greeting: String,
        code: String,
    ) -> Self {
        Self {
            provider,
            conversation: Conversation::seeded(&greeting, &code),
            turn: TurnState::Idle,
            generation: 0,
            session_id: new_session_id(),
            code,
            greeting,
            model_name,
            status_message: String::from(STATUS_READY),
        }
    }

    pub fn from_config(
        provider: Arc<dyn CompletionProvider>,
        config: &crate::core::config::ResolvedConfig,
        code: String,
    ) -> Self {
        Self::new(
            provider,
            config.model_name.clone(),
            config.greeting.clone(),
            code,
        )
    }

    pub fn is_awaiting(&self) -> bool {
        self.turn == TurnState::AwaitingResponse
    }

    /// Whether the "thinking" placeholder should be displayed.
    pub fn is_thinking(&self) -> bool {
        self.is_awaiting()
    }

    /// Discards the transcript and starts over with the given artifact.
    pub(crate) fn reseed(&mut self, code: String) {
        self.generation += 1;
        self.session_id = new_session_id();
        self.conversation = Conversation::seeded(&self.greeting, &code);
        self.code = code;
        self.turn = TurnState::Idle;
        self.status_message = String::from(STATUS_READY);
    }
}

fn new_session_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use crate::inference::Role;
    use crate::test_support::test_app;

    use super::*;

    #[test]
    fn test_app_new_defaults() {
        let app = test_app();
        assert_eq!(app.status_message, STATUS_READY);
        assert_eq!(app.turn, TurnState::Idle);
        assert_eq!(app.generation, 0);
        assert_eq!(app.model_name, "test-model");
        assert_eq!(app.conversation.len(), 2);
        assert!(
            app.conversation
                .messages()
                .iter()
                .all(|m| m.role == Role::System)
        );
    }

    #[test]
    fn test_reseed_bumps_generation_and_resets_log() {
        let mut app = test_app();
        let old_session = app.session_id.clone();
        app.conversation.add_user_message("hi".to_string());
        app.turn = TurnState::AwaitingResponse;

        app.reseed("new code".to_string());

        assert_eq!(app.generation, 1);
        assert_ne!(app.session_id, old_session);
        assert_eq!(app.conversation.len(), 2);
        assert_eq!(app.conversation.messages()[1].content, "new code");
        assert_eq!(app.turn, TurnState::Idle);
    }
}
