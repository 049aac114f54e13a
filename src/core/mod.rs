//! # Core Session Logic
//!
//! This module contains the conversation session manager and the pieces of
//! the rendering pipeline that are not tied to any UI technology.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • State (transcript)   │
//!                    │  • Action (events)      │
//!                    │  • update() (reducer)   │
//!                    │  • segment parser       │
//!                    │  • scroll / timers      │
//!                    │                         │
//!                    │  No UI. Clock passed in.│
//!                    └───────────┬─────────────┘
//!                                │
//!                         ┌────────────┐
//!                         │    TUI     │
//!                         │  Adapter   │
//!                         │ (ratatui)  │
//!                         └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`state`]: The `App` struct, one session's state
//! - [`action`]: The `Action` enum and `update()` turn state machine
//! - [`request`]: One backend round-trip folded into a completion `Action`
//! - [`segment`]: Splits replies into text and fenced code
//! - [`clipboard`]: Copy-to-clipboard with a short-lived acknowledgment
//! - [`reveal`]: Typewriter timer for plain replies
//! - [`autoscroll`]: Follow-the-bottom policy
//! - [`config`]: Settings resolution

pub mod action;
pub mod autoscroll;
pub mod clipboard;
pub mod config;
pub mod request;
pub mod reveal;
pub mod segment;
pub mod state;
