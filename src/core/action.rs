//! # Actions
//!
//! Everything that can happen in a session becomes an `Action`.
//! User presses Enter? That's `Action::Submit(text)`.
//! Backend answers? That's `Action::ResponseReceived { .. }`.
//!
//! The `update()` function takes the current state and an action, mutates
//! the state, and returns an `Effect` describing the I/O the caller must
//! perform. No side effects happen here besides logging.
//!
//! ```text
//! State + Action  →  update()  →  New State + Effect
//! ```
//!
//! Turn lifecycle:
//!
//! ```text
//!          Submit(text)                 ResponseReceived / ResponseFailed
//! Idle ───────────────────▶ Awaiting ─────────────────────────────────────▶ Idle
//!   ▲  blank text: no-op       │  Submit: no-op
//!   └──────────────────────────┘
//! ```

use log::{debug, info, warn};

use crate::core::state::{
    App, EMPTY_REPLY, FALLBACK_REPLY, STATUS_READY, STATUS_THINKING, TurnState,
};
use crate::inference::ProviderError;

#[derive(Debug)]
pub enum Action {
    /// The user submitted the input box.
    Submit(String),
    /// The backend answered the request spawned in `generation`.
    ResponseReceived { generation: u64, text: String },
    /// The backend request spawned in `generation` failed.
    ResponseFailed { generation: u64, error: ProviderError },
    /// Start over with a fresh transcript about `code`.
    OpenSession { code: String },
    /// The panel was closed.
    Close,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    /// Send the current transcript to the backend.
    SpawnRequest,
    /// A message was appended; re-layout and apply auto-scroll.
    MessageAppended,
    /// The session was replaced; drop all per-message view state.
    ResetView,
    Quit,
}

pub fn update(app: &mut App, action: Action) -> Effect {
    match action {
        Action::Submit(text) => {
            if text.trim().is_empty() {
                debug!("Ignoring blank submission");
                return Effect::None;
            }
            if app.turn == TurnState::AwaitingResponse {
                debug!("Ignoring submission while a turn is in flight");
                return Effect::None;
            }
            app.conversation.add_user_message(text);
            app.turn = TurnState::AwaitingResponse;
            app.status_message = String::from(STATUS_THINKING);
            info!(
                "Turn {} submitted (session {}, generation {})",
                app.conversation.turn_count(),
                app.session_id,
                app.generation
            );
            Effect::SpawnRequest
        }
        Action::ResponseReceived { generation, text } => {
            if !accepts_completion(app, generation) {
                return Effect::None;
            }
            let text = if text.trim().is_empty() {
                String::from(EMPTY_REPLY)
            } else {
                text
            };
            app.conversation.add_bot_message(text);
            settle(app);
            Effect::MessageAppended
        }
        Action::ResponseFailed { generation, error } => {
            if !accepts_completion(app, generation) {
                return Effect::None;
            }
            warn!("Error generating message: {}", error);
            app.conversation.add_bot_message(String::from(FALLBACK_REPLY));
            settle(app);
            Effect::MessageAppended
        }
        Action::OpenSession { code } => {
            app.reseed(code);
            info!(
                "Opened session {} (generation {})",
                app.session_id, app.generation
            );
            Effect::ResetView
        }
        Action::Close => {
            if app.turn == TurnState::AwaitingResponse {
                info!("Closing with a request still in flight; its reply will be dropped");
            }
            Effect::Quit
        }
    }
}

/// A completion applies only to the current session and only while waiting.
fn accepts_completion(app: &App, generation: u64) -> bool {
    if generation != app.generation {
        debug!(
            "Discarding reply from stale generation {} (current {})",
            generation, app.generation
        );
        return false;
    }
    if app.turn != TurnState::AwaitingResponse {
        warn!("Discarding reply with no turn in flight");
        return false;
    }
    true
}

fn settle(app: &mut App) {
    app.turn = TurnState::Idle;
    app.status_message = String::from(STATUS_READY);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::Role;
    use crate::test_support::test_app;

    #[test]
    fn test_blank_submit_changes_nothing() {
        let mut app = test_app();
        for text in ["", "   ", "\n\t"] {
            assert_eq!(update(&mut app, Action::Submit(text.to_string())), Effect::None);
            assert_eq!(app.turn, TurnState::Idle);
            assert_eq!(app.conversation.len(), 2);
        }
    }

    #[test]
    fn test_submit_then_reply_appends_one_bot_message() {
        let mut app = test_app();

        let effect = update(&mut app, Action::Submit("What does this do?".to_string()));
        assert_eq!(effect, Effect::SpawnRequest);
        assert_eq!(app.conversation.len(), 3);
        assert_eq!(app.conversation.last().map(|m| m.role), Some(Role::User));
        assert_eq!(app.turn, TurnState::AwaitingResponse);
        assert!(app.is_thinking());

        let effect = update(
            &mut app,
            Action::ResponseReceived {
                generation: 0,
                text: "It prints.".to_string(),
            },
        );
        assert_eq!(effect, Effect::MessageAppended);
        assert_eq!(app.conversation.len(), 4);
        assert_eq!(app.conversation.last().map(|m| m.role), Some(Role::Bot));
        assert_eq!(app.turn, TurnState::Idle);
        assert_eq!(app.status_message, STATUS_READY);
    }

    #[test]
    fn test_submit_while_awaiting_is_rejected() {
        let mut app = test_app();
        update(&mut app, Action::Submit("first".to_string()));
        assert_eq!(update(&mut app, Action::Submit("second".to_string())), Effect::None);
        assert_eq!(app.conversation.len(), 3);
        assert_eq!(app.conversation.messages()[2].content, "first");
    }

    #[test]
    fn test_failure_appends_generic_fallback() {
        let mut app = test_app();
        update(&mut app, Action::Submit("q".to_string()));
        update(
            &mut app,
            Action::ResponseFailed {
                generation: 0,
                error: ProviderError::Api {
                    status: 500,
                    message: "internal detail".to_string(),
                },
            },
        );
        let last = app.conversation.last().unwrap();
        assert_eq!(last.role, Role::Bot);
        assert_eq!(last.content, FALLBACK_REPLY);
        assert!(!last.content.contains("internal detail"));
        assert_eq!(app.turn, TurnState::Idle);
    }

    #[test]
    fn test_empty_reply_becomes_placeholder() {
        let mut app = test_app();
        update(&mut app, Action::Submit("q".to_string()));
        update(
            &mut app,
            Action::ResponseReceived {
                generation: 0,
                text: "  ".to_string(),
            },
        );
        assert_eq!(app.conversation.last().unwrap().content, EMPTY_REPLY);
    }

    #[test]
    fn test_stale_generation_reply_is_discarded() {
        let mut app = test_app();
        update(&mut app, Action::Submit("q".to_string()));
        assert_eq!(
            update(
                &mut app,
                Action::OpenSession {
                    code: "fresh".to_string()
                }
            ),
            Effect::ResetView
        );

        let effect = update(
            &mut app,
            Action::ResponseReceived {
                generation: 0,
                text: "late answer".to_string(),
            },
        );
        assert_eq!(effect, Effect::None);
        assert_eq!(app.conversation.len(), 2);
        assert_eq!(app.turn, TurnState::Idle);

        let effect = update(
            &mut app,
            Action::ResponseFailed {
                generation: 0,
                error: ProviderError::Network("timeout".to_string()),
            },
        );
        assert_eq!(effect, Effect::None);
        assert_eq!(app.conversation.len(), 2);
    }

    #[test]
    fn test_reply_without_pending_turn_is_discarded() {
        let mut app = test_app();
        let effect = update(
            &mut app,
            Action::ResponseReceived {
                generation: 0,
                text: "unsolicited".to_string(),
            },
        );
        assert_eq!(effect, Effect::None);
        assert_eq!(app.conversation.len(), 2);
    }

    #[test]
    fn test_each_turn_gets_exactly_one_reply() {
        let mut app = test_app();
        for i in 0..3 {
            update(&mut app, Action::Submit(format!("q{i}")));
            update(
                &mut app,
                Action::ResponseReceived {
                    generation: 0,
                    text: format!("a{i}"),
                },
            );
            // A duplicate completion must not add a second reply
            update(
                &mut app,
                Action::ResponseReceived {
                    generation: 0,
                    text: "dup".to_string(),
                },
            );
        }
        let roles: Vec<Role> = app.conversation.messages().iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![
                Role::System,
                Role::System,
                Role::User,
                Role::Bot,
                Role::User,
                Role::Bot,
                Role::User,
                Role::Bot
            ]
        );
    }

    #[test]
    fn test_close_quits() {
        let mut app = test_app();
        assert_eq!(update(&mut app, Action::Close), Effect::Quit);
    }
}
