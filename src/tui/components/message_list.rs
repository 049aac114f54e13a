//! # MessageList Component
//!
//! Scrollable view of the transcript.
//!
//! ## Responsibilities
//!
//! - Display the messages of the current session
//! - Follow new messages to the bottom, or offer "jump to latest" when the
//!   reader has scrolled away (see [`AutoScroll`])
//! - Own per-message view state: reveal timers and copy-control hit areas
//! - Show a thinking placeholder while a turn is in flight
//! - Cache message heights
//!
//! ## Architecture
//!
//! `MessageList` is a transient component (created each frame) that wraps
//! `&'a mut MessageListState` (persistent state) and the transcript (props).
//! `render` takes `&mut self`, so the layout cache, scroll offset and hit
//! areas are refreshed during the render pass, the same way ratatui's
//! `StatefulWidget` works.
//!
//! ## Coordinates
//!
//! Layout heights and copy targets live in *content* coordinates (row 0 is
//! the top of the first message). The jump affordance and `area` are in
//! *screen* coordinates. [`MessageListState::copy_target_at`] converts.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use log::debug;
use ratatui::Frame;
use ratatui::layout::{Position, Rect, Size};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Paragraph};
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};
use unicode_width::UnicodeWidthStr;

use crate::core::autoscroll::{AutoScroll, ScrollDecision, Viewport};
use crate::core::clipboard::{CopyController, SegmentKey};
use crate::core::reveal::RevealTimer;
use crate::core::state::STATUS_THINKING;
use crate::inference::Message;
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::message::MessageView;
use crate::tui::components::to_cells;
use crate::tui::event::TuiEvent;

/// Rows taken by the thinking placeholder (borders + one line).
const THINKING_HEIGHT: u16 = 3;
const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
pub const JUMP_LABEL: &str = " ↓ Jump to latest (Ctrl+G) ";

/// A copy control drawn during the last render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopyTarget {
    pub key: SegmentKey,
    /// Content coordinates.
    pub area: Rect,
}

/// Layout, scroll and per-message view state for the message list.
/// Must be persisted in the parent TuiState.
pub struct MessageListState {
    /// Scroll offset and view state
    pub scroll_state: ScrollViewState,
    /// Cached layout measurements
    pub layout: LayoutCache,
    /// Follow-the-bottom policy, measured in rows
    pub auto_scroll: AutoScroll,
    /// Easing toward the bottom over the next few frames
    following: bool,
    /// Typewriter timers keyed by message index
    pub reveals: HashMap<usize, RevealTimer>,
    /// Copy controls visible in the last frame
    pub copy_targets: Vec<CopyTarget>,
    /// Screen rect of the jump affordance, when it was drawn
    pub jump_area: Option<Rect>,
    /// Screen rect the list occupied in the last frame
    pub area: Rect,
    /// Canvas height in the last frame (messages + placeholder)
    pub canvas_height: u16,
}

impl MessageListState {
    pub fn new(slack_rows: u32) -> Self {
        Self {
            scroll_state: ScrollViewState::default(),
            layout: LayoutCache::new(),
            auto_scroll: AutoScroll::new(slack_rows),
            following: true,
            reveals: HashMap::new(),
            copy_targets: Vec::new(),
            jump_area: None,
            area: Rect::default(),
            canvas_height: 0,
        }
    }

    /// The viewport as measured by the last render.
    pub fn viewport(&self) -> Viewport {
        Viewport {
            scroll_height: u32::from(self.canvas_height),
            scroll_top: u32::from(self.scroll_state.offset().y),
            client_height: u32::from(self.area.height),
        }
    }

    /// A message was appended. Must be called before the next render so the
    /// decision is taken on the pre-append layout.
    pub fn on_append(&mut self) -> ScrollDecision {
        let decision = self.auto_scroll.on_append(self.viewport());
        debug!("Append with viewport {:?}: {:?}", self.viewport(), decision);
        if decision == ScrollDecision::ScrollToBottom {
            self.following = true;
        }
        decision
    }

    pub fn jump_to_latest(&mut self) {
        self.auto_scroll.jump_to_latest();
        self.following = true;
    }

    pub fn is_following(&self) -> bool {
        self.following
    }

    /// Starts the typewriter reveal for the message at `index`.
    pub fn start_reveal(&mut self, index: usize, text: &str, interval: Duration, now: Instant) {
        self.reveals
            .insert(index, RevealTimer::start(text, interval, now));
    }

    /// Drops finished reveals. Returns true while any is still running.
    pub fn tick_reveals(&mut self, now: Instant) -> bool {
        self.reveals.retain(|_, timer| !timer.is_complete(now));
        !self.reveals.is_empty()
    }

    /// Whether another frame is needed soon without any input.
    pub fn is_animating(&self, now: Instant) -> bool {
        self.following || self.reveals.values().any(|t| !t.is_complete(now))
    }

    /// Tears down all per-message view state (session replaced).
    pub fn reset(&mut self) {
        for timer in self.reveals.values_mut() {
            timer.cancel();
        }
        *self = Self::new(self.auto_scroll.slack());
    }

    /// Copy control under the screen position `(column, row)`, if any.
    pub fn copy_target_at(&self, column: u16, row: u16) -> Option<SegmentKey> {
        if !self.area.contains(Position::new(column, row)) {
            return None;
        }
        let content = Position::new(
            column - self.area.x,
            (row - self.area.y).saturating_add(self.scroll_state.offset().y),
        );
        self.copy_targets
            .iter()
            .find(|t| t.area.contains(content))
            .map(|t| t.key)
    }

    pub fn jump_hit(&self, column: u16, row: u16) -> bool {
        self.jump_area
            .is_some_and(|a| a.contains(Position::new(column, row)))
    }

    fn max_offset(&self) -> u16 {
        self.canvas_height.saturating_sub(self.area.height)
    }

    /// Clamp scroll offset so it never exceeds the content bounds.
    pub fn clamp_scroll(&mut self) {
        let max_y = self.max_offset();
        let current = self.scroll_state.offset();
        if current.y > max_y {
            self.scroll_state.set_offset(Position {
                x: current.x,
                y: max_y,
            });
        }
    }

    /// One easing step toward the bottom: half the remaining distance, at
    /// least one row.
    fn step_follow(&mut self) {
        let max_y = self.max_offset();
        let current = self.scroll_state.offset().y;
        if current >= max_y {
            self.scroll_state.set_offset(Position { x: 0, y: max_y });
            self.following = false;
            return;
        }
        let step = ((max_y - current) / 2).max(1);
        self.scroll_state.set_offset(Position {
            x: 0,
            y: current + step,
        });
    }

    fn after_manual_scroll(&mut self) {
        self.following = false;
        self.clamp_scroll();
        self.auto_scroll.on_scroll(self.viewport());
    }
}

/// Scrollable conversation view component.
/// Created fresh each frame with references to state and data.
pub struct MessageList<'a> {
    pub state: &'a mut MessageListState,
    pub messages: &'a [Message],
    pub copies: &'a CopyController,
    pub is_thinking: bool,
    pub spinner_frame: usize,
    pub now: Instant,
}

impl<'a> MessageList<'a> {
    pub fn new(
        state: &'a mut MessageListState,
        messages: &'a [Message],
        copies: &'a CopyController,
        is_thinking: bool,
        spinner_frame: usize,
        now: Instant,
    ) -> Self {
        Self {
            state,
            messages,
            copies,
            is_thinking,
            spinner_frame,
            now,
        }
    }
}

impl Component for MessageList<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let content_width = area.width.saturating_sub(1); // -1 for scrollbar safe area
        let num_items = self.messages.len();

        // 1. Update layout cache
        let layout = &mut self.state.layout;
        let reusable = layout.reusable_count(num_items, content_width);
        layout.heights.truncate(reusable.min(layout.heights.len()));
        for message in self.messages.iter().skip(layout.heights.len()) {
            layout
                .heights
                .push(MessageView::calculate_height(message, content_width));
        }
        layout.rebuild_prefix_heights();
        layout.update_metadata(num_items, content_width);

        let total_height = layout.total_height();
        self.state.canvas_height = layout.canvas_height(self.is_thinking);
        self.state.area = area;

        // 2. Follow or clamp
        if self.state.following {
            self.state.step_follow();
        } else {
            self.state.clamp_scroll();
        }

        let scroll_offset = self.state.scroll_state.offset().y;
        let visible_range = self.state.layout.visible_range(scroll_offset, area.height);

        // 3. Render visible messages into a ScrollView
        let mut scroll_view = ScrollView::new(Size::new(content_width, self.state.canvas_height))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Always)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);

        self.state.copy_targets.clear();
        for i in visible_range {
            let message = &self.messages[i];
            let top = self.state.layout.top_of(i);
            let rect = Rect::new(0, top, content_width, self.state.layout.heights[i]);

            let mut copied = Vec::new();
            for (segment, control) in MessageView::copy_targets(message, rect) {
                let key = SegmentKey {
                    message: i,
                    segment,
                };
                if self.copies.is_copied(key, self.now) {
                    copied.push(segment);
                }
                self.state.copy_targets.push(CopyTarget { key, area: control });
            }

            let revealed = self
                .state
                .reveals
                .get(&i)
                .filter(|t| !t.is_complete(self.now))
                .map(|t| t.visible(&message.content, self.now));

            let view = MessageView::new(message).revealed(revealed).copied(&copied);
            scroll_view.render_widget(view, rect);
        }

        if self.is_thinking {
            let rect = Rect::new(0, total_height, content_width, THINKING_HEIGHT);
            scroll_view.render_widget(thinking_placeholder(self.spinner_frame), rect);
        }

        frame.render_stateful_widget(scroll_view, area, &mut self.state.scroll_state);

        // 4. Jump affordance, bottom-right above the last row
        self.state.jump_area = None;
        if self.state.auto_scroll.shows_jump() {
            let width = to_cells(JUMP_LABEL.width()).min(content_width);
            if width > 0 && area.height >= 2 {
                let jump = Rect::new(
                    area.x + content_width - width,
                    area.y + area.height - 2,
                    width,
                    1,
                );
                let badge = Paragraph::new(Span::styled(
                    JUMP_LABEL,
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ));
                frame.render_widget(badge, jump);
                self.state.jump_area = Some(jump);
            }
        }
    }
}

fn thinking_placeholder(spinner_frame: usize) -> Paragraph<'static> {
    let style = Style::default()
        .fg(Color::Blue)
        .add_modifier(Modifier::DIM | Modifier::ITALIC);
    let glyph = SPINNER[spinner_frame % SPINNER.len()];
    Paragraph::new(Line::from(vec![
        Span::styled(format!("{glyph} "), Style::default().fg(Color::Blue)),
        Span::styled(STATUS_THINKING, style),
    ]))
    .block(
        Block::bordered()
            .title("ai")
            .border_type(BorderType::Rounded)
            .border_style(style),
    )
}

/// EventHandler is implemented on `MessageListState` rather than `MessageList`
/// because scrolling mutates persistent state and needs no props.
impl EventHandler for MessageListState {
    type Event = ();

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::ScrollUp => {
                self.scroll_state.scroll_up();
                self.after_manual_scroll();
            }
            TuiEvent::ScrollDown => {
                self.scroll_state.scroll_down();
                self.after_manual_scroll();
            }
            TuiEvent::ScrollPageUp => {
                self.scroll_state.scroll_page_up();
                self.after_manual_scroll();
            }
            TuiEvent::ScrollPageDown => {
                self.scroll_state.scroll_page_down();
                self.after_manual_scroll();
            }
            TuiEvent::JumpToLatest => self.jump_to_latest(),
            _ => {}
        }
        None
    }
}

/// Cached layout measurements.
///
/// Messages never change once appended, so heights stay valid until the
/// width changes or the transcript is replaced by a shorter one.
#[derive(Default)]
pub struct LayoutCache {
    pub heights: Vec<u16>,
    pub prefix_heights: Vec<u16>,
    message_count: usize,
    content_width: u16,
}

impl LayoutCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reusable_count(&self, message_count: usize, content_width: u16) -> usize {
        if self.content_width != content_width || self.heights.is_empty() {
            return 0;
        }
        // Fewer messages than cached means a new session
        if message_count < self.message_count {
            return 0;
        }
        message_count
    }

    pub fn update_metadata(&mut self, message_count: usize, content_width: u16) {
        self.message_count = message_count;
        self.content_width = content_width;
    }

    pub fn rebuild_prefix_heights(&mut self) {
        self.prefix_heights = self
            .heights
            .iter()
            .scan(0u16, |acc, &h| {
                *acc = acc.saturating_add(h);
                Some(*acc)
            })
            .collect();
    }

    pub fn total_height(&self) -> u16 {
        self.prefix_heights.last().copied().unwrap_or(0)
    }

    /// Scrollable height: every message plus the thinking placeholder.
    pub fn canvas_height(&self, is_thinking: bool) -> u16 {
        let placeholder = if is_thinking { THINKING_HEIGHT } else { 0 };
        self.total_height().saturating_add(placeholder)
    }

    /// Content row where item `index` starts.
    pub fn top_of(&self, index: usize) -> u16 {
        match index {
            0 => 0,
            i => self.prefix_heights.get(i - 1).copied().unwrap_or(0),
        }
    }

    pub fn visible_range(&self, scroll_offset: u16, viewport_height: u16) -> std::ops::Range<usize> {
        let buffer = viewport_height / 2;
        let buffered_start = scroll_offset.saturating_sub(buffer);
        let buffered_end = scroll_offset
            .saturating_add(viewport_height)
            .saturating_add(buffer);

        let start = self
            .prefix_heights
            .partition_point(|&end| end <= buffered_start);
        let end = self
            .prefix_heights
            .partition_point(|&end| end < buffered_end)
            .saturating_add(1)
            .min(self.prefix_heights.len());

        start..end
    }
}
