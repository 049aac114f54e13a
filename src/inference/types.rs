use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Greeting that opens every session, ahead of the code artifact.
pub const DEFAULT_GREETING: &str =
    "Hello! I'm here to help you with your code. Here's the code you provided:";

/// Who authored a message. Closed set: anything else is rejected at parse time.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy)]
pub enum Role {
    #[serde(rename = "system")]
    System,
    #[serde(rename = "user")]
    User,
    #[serde(rename = "bot")]
    Bot,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Bot => "bot",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name one of the three roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleParseError(pub String);

impl fmt::Display for RoleParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown message role: {:?}", self.0)
    }
}

impl std::error::Error for RoleParseError {}

impl FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "system" => Ok(Role::System),
            "user" => Ok(Role::User),
            // Backends call the model side by different names
            "bot" | "model" | "assistant" => Ok(Role::Bot),
            _ => Err(RoleParseError(s.to_string())),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Builds a message from an untyped role string, validating the role.
    pub fn parse(role: &str, content: impl Into<String>) -> Result<Self, RoleParseError> {
        Ok(Self::new(role.parse()?, content))
    }
}

/// The ordered transcript of one session.
///
/// Append-only. A fresh conversation always starts with two `System` seed
/// messages: the greeting, then the code under discussion.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    /// Number of seed messages every conversation starts with.
    pub const SEED_LEN: usize = 2;

    pub fn seeded(greeting: &str, code: &str) -> Self {
        Self {
            messages: vec![
                Message::new(Role::System, greeting),
                Message::new(Role::System, code),
            ],
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Always false for a seeded conversation; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn push(&mut self, message: Message) -> &Message {
        self.messages.push(message);
        &self.messages[self.messages.len() - 1]
    }

    pub fn add_user_message(&mut self, content: String) -> &Message {
        self.push(Message::new(Role::User, content))
    }

    pub fn add_bot_message(&mut self, content: String) -> &Message {
        self.push(Message::new(Role::Bot, content))
    }

    /// Turns exchanged so far (user messages), seeds excluded.
    pub fn turn_count(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| m.role == Role::User)
            .count()
    }
}
