//! # InputBox Component
//!
//! Single-line text field at the bottom of the panel.
//!
//! ## Responsibilities
//!
//! - Capture text input (typing, paste, backspace/delete, cursor movement)
//! - Emit `Submit` on Enter
//! - Show a placeholder when empty and a waiting hint while a turn is in flight
//!
//! ## State Management
//!
//! The buffer and cursor are internal state. The buffer is *not* cleared on
//! Enter: the parent clears it once the session accepted the submission, so a
//! rejected submit (blank, or a turn already in flight) keeps the text.
//! Long input scrolls horizontally to keep the cursor visible.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, BorderType, Padding, Paragraph};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::tui::component::{Component, EventHandler};
use crate::tui::components::to_cells;
use crate::tui::event::TuiEvent;

/// Fixed height: borders + one line.
pub const HEIGHT: u16 = 3;
/// Border (2) + padding (2) consumed horizontally.
const HORIZONTAL_OVERHEAD: u16 = 4;
/// Offset from area edge to the first text column (border + padding).
const TEXT_OFFSET: u16 = 2;
const PLACEHOLDER: &str = "Type a message...";

/// High-level events emitted by the InputBox
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Enter pressed with this buffer content
    Submit(String),
    /// Text or cursor changed
    ContentChanged,
}

pub struct InputBox {
    /// Text buffer (Internal State)
    pub buffer: String,
    /// Cursor position as byte offset in buffer (0..=buffer.len())
    cursor: usize,
    /// A turn is in flight (Prop)
    pub waiting: bool,
}

impl Default for InputBox {
    fn default() -> Self {
        Self::new()
    }
}

impl InputBox {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            cursor: 0,
            waiting: false,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Empties the buffer after an accepted submission.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
    }

    fn insert_str(&mut self, text: &str) {
        self.buffer.insert_str(self.cursor, text);
        self.cursor += text.len();
    }

    /// Byte offset where the visible window starts so the cursor fits in
    /// `width` columns.
    fn scroll_start(&self, width: usize) -> usize {
        let mut start = 0;
        let mut before = self.buffer[..self.cursor].width();
        // Keep one column free for the cursor itself
        while before >= width && start < self.cursor {
            let Some(c) = self.buffer[start..].chars().next() else {
                break;
            };
            before = before.saturating_sub(c.width().unwrap_or(0));
            start += c.len_utf8();
        }
        start
    }
}

impl Component for InputBox {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let width = area.width.saturating_sub(HORIZONTAL_OVERHEAD) as usize;
        let title = if self.waiting {
            "Input (waiting for reply…)"
        } else {
            "Input"
        };
        let border_style = if self.waiting {
            Style::default().fg(Color::Green).add_modifier(Modifier::DIM)
        } else {
            Style::default().fg(Color::Green)
        };
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .padding(Padding::horizontal(1))
            .title(title);

        let start = self.scroll_start(width);
        let paragraph = if self.buffer.is_empty() {
            Paragraph::new(PLACEHOLDER).style(
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            )
        } else {
            Paragraph::new(&self.buffer[start..]).style(Style::default().fg(Color::Green))
        };
        frame.render_widget(paragraph.block(block), area);

        let column = to_cells(self.buffer[start..self.cursor].width());
        frame.set_cursor_position((
            area.x.saturating_add(TEXT_OFFSET).saturating_add(column),
            area.y.saturating_add(1),
        ));
    }
}

impl EventHandler for InputBox {
    type Event = InputEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::InputChar(c) => {
                self.buffer.insert(self.cursor, *c);
                self.cursor += c.len_utf8();
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Paste(text) => {
                // Single line: fold pasted line breaks into spaces
                let flat: String = text
                    .chars()
                    .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
                    .collect();
                self.insert_str(&flat);
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Backspace => {
                let prev = self.buffer[..self.cursor].char_indices().next_back()?.0;
                self.buffer.drain(prev..self.cursor);
                self.cursor = prev;
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Delete => {
                let c = self.buffer[self.cursor..].chars().next()?;
                self.buffer.drain(self.cursor..self.cursor + c.len_utf8());
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::CursorLeft => {
                let prev = self.buffer[..self.cursor].char_indices().next_back()?.0;
                self.cursor = prev;
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::CursorRight => {
                let c = self.buffer[self.cursor..].chars().next()?;
                self.cursor += c.len_utf8();
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::CursorHome => (self.cursor != 0).then(|| {
                self.cursor = 0;
                InputEvent::ContentChanged
            }),
            TuiEvent::CursorEnd => (self.cursor != self.buffer.len()).then(|| {
                self.cursor = self.buffer.len();
                InputEvent::ContentChanged
            }),
            TuiEvent::Submit => Some(InputEvent::Submit(self.buffer.clone())),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn typed(text: &str) -> InputBox {
        let mut input = InputBox::new();
        for c in text.chars() {
            input.handle_event(&TuiEvent::InputChar(c));
        }
        input
    }

    fn render_to_string(input: &mut InputBox, width: u16) -> String {
        let backend = TestBackend::new(width, HEIGHT);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| {
                let area = f.area();
                input.render(f, area);
            })
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_handle_input() {
        let mut input = InputBox::new();

        let res = input.handle_event(&TuiEvent::InputChar('a'));
        assert_eq!(res, Some(InputEvent::ContentChanged));
        assert_eq!(input.buffer, "a");

        input.handle_event(&TuiEvent::InputChar('b'));
        assert_eq!(input.buffer, "ab");

        let res = input.handle_event(&TuiEvent::Backspace);
        assert_eq!(res, Some(InputEvent::ContentChanged));
        assert_eq!(input.buffer, "a");
    }

    #[test]
    fn test_submit_keeps_buffer_until_cleared() {
        let mut input = typed("hello");
        let res = input.handle_event(&TuiEvent::Submit);
        assert_eq!(res, Some(InputEvent::Submit("hello".to_string())));
        assert_eq!(input.buffer, "hello");

        input.clear();
        assert!(input.buffer.is_empty());
        assert_eq!(input.cursor(), 0);
    }

    #[test]
    fn test_cursor_editing_respects_char_boundaries() {
        let mut input = typed("héllo");
        input.handle_event(&TuiEvent::CursorHome);
        input.handle_event(&TuiEvent::CursorRight);
        input.handle_event(&TuiEvent::CursorRight);
        assert_eq!(input.cursor(), "hé".len());

        input.handle_event(&TuiEvent::Backspace);
        assert_eq!(input.buffer, "hllo");

        input.handle_event(&TuiEvent::Delete);
        assert_eq!(input.buffer, "hlo");

        input.handle_event(&TuiEvent::CursorEnd);
        assert_eq!(input.cursor(), input.buffer.len());
    }

    #[test]
    fn test_boundaries_are_no_ops() {
        let mut input = InputBox::new();
        assert_eq!(input.handle_event(&TuiEvent::Backspace), None);
        assert_eq!(input.handle_event(&TuiEvent::Delete), None);
        assert_eq!(input.handle_event(&TuiEvent::CursorLeft), None);
        assert_eq!(input.handle_event(&TuiEvent::CursorRight), None);
        assert_eq!(input.handle_event(&TuiEvent::CursorHome), None);
    }

    #[test]
    fn test_paste_flattens_newlines() {
        let mut input = InputBox::new();
        input.handle_event(&TuiEvent::Paste("line one\nline two".to_string()));
        assert_eq!(input.buffer, "line one line two");
        assert_eq!(input.cursor(), input.buffer.len());
    }

    #[test]
    fn test_render_shows_placeholder_when_empty() {
        let text = render_to_string(&mut InputBox::new(), 40);
        assert!(text.contains(PLACEHOLDER));
    }

    #[test]
    fn test_render_shows_waiting_hint() {
        let mut input = typed("next question");
        input.waiting = true;
        let text = render_to_string(&mut input, 60);
        assert!(text.contains("waiting for reply"));
        assert!(text.contains("next question"));
    }

    #[test]
    fn test_long_input_scrolls_to_keep_cursor_visible() {
        let mut input = typed(&format!("{}END", "x".repeat(50)));
        let text = render_to_string(&mut input, 20);
        assert!(text.contains("END"));
    }
}
