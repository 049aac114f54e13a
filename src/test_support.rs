//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::core::clipboard::{Clipboard, ClipboardError};
use crate::inference::{CompletionProvider, CompletionRequest, Message, ProviderError};

/// A no-op provider for tests that don't need real API calls.
pub struct NoopProvider;

#[async_trait]
impl CompletionProvider for NoopProvider {
    fn name(&self) -> &str {
        "noop"
    }

    async fn generate(&self, _request: CompletionRequest<'_>) -> Result<String, ProviderError> {
        Ok(String::new())
    }
}

/// Answers every request with the same text and records what it was sent.
pub struct ScriptedProvider {
    reply: String,
    seen: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedProvider {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn last_request(&self) -> Option<Vec<Message>> {
        self.seen.lock().ok()?.last().cloned()
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, request: CompletionRequest<'_>) -> Result<String, ProviderError> {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(request.conversation.messages().to_vec());
        }
        Ok(self.reply.clone())
    }
}

/// Always fails with a network error.
pub struct FailingProvider;

#[async_trait]
impl CompletionProvider for FailingProvider {
    fn name(&self) -> &str {
        "failing"
    }

    async fn generate(&self, _request: CompletionRequest<'_>) -> Result<String, ProviderError> {
        Err(ProviderError::Network("connection refused".to_string()))
    }
}

pub const TEST_CODE: &str = "def add(a, b):\n    return a + b";

/// Creates a test App with a NoopProvider.
pub fn test_app() -> crate::core::state::App {
    app_with(Arc::new(NoopProvider))
}

pub fn app_with(provider: Arc<dyn CompletionProvider>) -> crate::core::state::App {
    crate::core::state::App::new(
        provider,
        "test-model".to_string(),
        crate::inference::DEFAULT_GREETING.to_string(),
        TEST_CODE.to_string(),
    )
}

/// In-memory clipboard; clones share the same history.
#[derive(Clone, Default)]
pub struct MemoryClipboard {
    pub writes: Rc<RefCell<Vec<String>>>,
}

impl MemoryClipboard {
    pub fn last(&self) -> Option<String> {
        self.writes.borrow().last().cloned()
    }
}

impl Clipboard for MemoryClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.writes.borrow_mut().push(text.to_string());
        Ok(())
    }
}
