//! # TUI Components
//!
//! All UI components of the chat panel.
//!
//! ## Component Architecture
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! Display components that receive all data as fields and are rebuilt each
//! frame:
//! - `TitleBar`: Top status line with provider, model and status
//! - `MessageView`: One transcript entry, styled by role
//! - `CodeBlock`: One fenced code segment with language label and copy control
//!
//! ### Stateful Components (Event-Driven)
//!
//! Components that manage local state and emit events:
//! - `InputBox`: Single-line text field
//! - `MessageList`: Scrollable transcript with layout caching, auto-scroll,
//!   reveal timers and copy hit areas
//!
//! ## Props-Based Data Flow
//!
//! Components receive external data as props, not by reaching into `App`:
//!
//! ```rust,ignore
//! // Dependencies are explicit
//! let mut title_bar = TitleBar::new(provider, app.model_name.clone(), app.status_message.clone());
//! title_bar.render(frame, area);
//! ```
//!
//! ## Module Structure
//!
//! ```text
//! components/
//! ├── mod.rs           (this file)
//! ├── title_bar.rs     (Top status line)
//! ├── message.rs       (Single message renderer)
//! ├── code_block.rs    (Fenced code segment)
//! ├── message_list.rs  (Scrollable message container)
//! └── input_box.rs     (Text input)
//! ```

pub mod code_block;
pub mod input_box;
pub mod message;
pub mod message_list;
mod title_bar;

pub use code_block::CodeBlock;
pub use input_box::{InputBox, InputEvent};
pub use message::MessageView;
pub use message_list::{MessageList, MessageListState};
pub use title_bar::TitleBar;

/// Terminal units for a measured line or column count, saturating at
/// `u16::MAX`.
pub(crate) fn to_cells(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}
