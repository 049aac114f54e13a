//! Backend round-trip for one turn.
//!
//! Takes a snapshot of the transcript, awaits the provider once, and folds
//! the outcome into exactly one completion `Action` tagged with the
//! generation the request was spawned in. No retries.

use std::sync::Arc;
use std::time::Instant;

use log::{debug, info};

use crate::core::action::Action;
use crate::core::state::App;
use crate::inference::{CompletionProvider, CompletionRequest, Conversation};

/// Everything the background task needs, detached from `App`.
pub struct TurnRequest {
    pub provider: Arc<dyn CompletionProvider>,
    pub conversation: Conversation,
    pub model: String,
    pub generation: u64,
}

impl TurnRequest {
    pub fn from_app(app: &App) -> Self {
        Self {
            provider: app.provider.clone(),
            conversation: app.conversation.clone(),
            model: app.model_name.clone(),
            generation: app.generation,
        }
    }

    pub async fn run(self) -> Action {
        let started = Instant::now();
        let request = CompletionRequest {
            conversation: &self.conversation,
            model: &self.model,
        };
        debug!(
            "Requesting completion from {} ({} messages)",
            self.provider.name(),
            self.conversation.len()
        );

        let outcome = self.provider.generate(request).await;
        info!(
            "Completion finished in {}ms (generation {}, ok={})",
            started.elapsed().as_millis(),
            self.generation,
            outcome.is_ok()
        );

        match outcome {
            Ok(text) => Action::ResponseReceived {
                generation: self.generation,
                text,
            },
            Err(error) => Action::ResponseFailed {
                generation: self.generation,
                error,
            },
        }
    }
}
