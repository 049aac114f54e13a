//! # TitleBar Component
//!
//! Top status line of the panel.
//!
//! ```text
//! Chat with AI (gemini: gemini-2.5-flash) | AI is thinking...      Esc close · Ctrl+N new · Ctrl+Y copy
//! ```
//!
//! Purely presentational: every field is a prop supplied by the parent each
//! frame. The key hints are right-aligned and dropped first when the terminal
//! is too narrow for both halves.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthStr;

use crate::tui::component::Component;
use crate::tui::components::to_cells;

pub const PANEL_TITLE: &str = "Chat with AI";
const KEY_HINTS: &str = "Esc close · Ctrl+N new · Ctrl+Y copy";

pub struct TitleBar {
    pub provider_name: String,
    pub model_name: String,
    /// Status message (e.g. "Ready", "AI is thinking...")
    pub status_message: String,
}

impl TitleBar {
    pub fn new(provider_name: String, model_name: String, status_message: String) -> Self {
        Self {
            provider_name,
            model_name,
            status_message,
        }
    }

    fn left_text(&self) -> String {
        let base = format!(
            "{PANEL_TITLE} ({}: {})",
            self.provider_name, self.model_name
        );
        if self.status_message.is_empty() {
            base
        } else {
            format!("{base} | {}", self.status_message)
        }
    }
}

impl Component for TitleBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let left = self.left_text();
        let hints_width = to_cells(KEY_HINTS.width());
        let fits = to_cells(left.width())
            .saturating_add(hints_width)
            .saturating_add(1)
            <= area.width;

        let title = Line::from(Span::styled(
            left,
            Style::default().add_modifier(Modifier::BOLD),
        ));
        if !fits {
            frame.render_widget(title, area);
            return;
        }

        let [left_area, right_area] =
            Layout::horizontal([Constraint::Min(0), Constraint::Length(hints_width)]).areas(area);
        frame.render_widget(title, left_area);
        frame.render_widget(
            Line::from(Span::styled(KEY_HINTS, Style::default().fg(Color::DarkGray))),
            right_area,
        );
    }
}
