use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Text};
use ratatui::widgets::{Block, BorderType, Padding, Paragraph, Widget, Wrap};
use unicode_width::UnicodeWidthStr;

use crate::core::segment::{self, Segment};
use crate::inference::{Message, Role};
use crate::tui::component::Component;
use crate::tui::components::code_block::CodeBlock;
use crate::tui::components::to_cells;
use crate::tui::markdown;

/// Horizontal padding (per side) between the border and text content.
const CONTENT_PAD_H: u16 = 1;
/// Total horizontal space consumed by borders (1 left + 1 right) and padding.
const HORIZONTAL_OVERHEAD: u16 = 2 + CONTENT_PAD_H * 2;
/// Total vertical space consumed by borders (1 top + 1 bottom).
const VERTICAL_OVERHEAD: u16 = 2;
/// Narrowest a user bubble gets, so its title stays readable.
const MIN_BUBBLE_WIDTH: u16 = 10;

/// Renders one transcript entry according to its role.
///
/// - **User**: plain text in a bubble hugging the right edge.
/// - **System**: plain text, full width, no markup interpretation.
/// - **Bot**: split into prose and fenced code. Prose goes through the
///   markdown renderer, code through [`CodeBlock`] with a language label and
///   copy control. A bot reply without any fence can be shown partially
///   (`revealed`) while its typewriter reveal runs.
///
/// Like every transient component, this is rebuilt each frame; the parent
/// `MessageList` owns the reveal timers and copy acknowledgments and passes
/// the outcome in as props.
///
/// # Height Calculation
///
/// [`calculate_height`](Self::calculate_height) always measures the full
/// content, even while a reveal is running, so the layout doesn't grow line
/// by line under the reader.
#[derive(Clone, Copy)]
pub struct MessageView<'a> {
    pub message: &'a Message,
    /// Visible prefix while a reveal is running; `None` shows everything.
    pub revealed: Option<&'a str>,
    /// Indices of code segments whose "Copied!" acknowledgment is showing.
    pub copied: &'a [usize],
}

/// One vertical slice of a bot message body.
enum Part {
    Prose { text: Text<'static>, height: u16 },
    Code { index: usize, segment: Segment, height: u16 },
}

impl Part {
    fn height(&self) -> u16 {
        match self {
            Part::Prose { height, .. } | Part::Code { height, .. } => *height,
        }
    }
}

impl<'a> MessageView<'a> {
    pub fn new(message: &'a Message) -> Self {
        Self {
            message,
            revealed: None,
            copied: &[],
        }
    }

    pub fn revealed(mut self, visible: Option<&'a str>) -> Self {
        self.revealed = visible;
        self
    }

    pub fn copied(mut self, copied: &'a [usize]) -> Self {
        self.copied = copied;
        self
    }

    /// Rows needed to draw `message` at `width`.
    pub fn calculate_height(message: &Message, width: u16) -> u16 {
        let content_width = width.saturating_sub(HORIZONTAL_OVERHEAD);
        if content_width == 0 {
            // Degenerate case: terminal too narrow for borders + padding.
            return 1;
        }

        let body = match message.role {
            Role::System => to_cells(
                plain_paragraph(&message.content, system_style()).line_count(content_width),
            ),
            Role::User => {
                let inner = user_bubble_width(&message.content, width)
                    .saturating_sub(HORIZONTAL_OVERHEAD);
                to_cells(plain_paragraph(&message.content, user_style()).line_count(inner))
            }
            Role::Bot => bot_parts(&message.content, content_width)
                .iter()
                .fold(0u16, |total, part| total.saturating_add(part.height())),
        };
        body.max(1).saturating_add(VERTICAL_OVERHEAD)
    }

    /// Clickable copy controls of `message` drawn at `area`, keyed by
    /// segment index. Empty for anything but bot messages with code.
    pub fn copy_targets(message: &Message, area: Rect) -> Vec<(usize, Rect)> {
        if message.role != Role::Bot || !segment::has_fence(&message.content) {
            return Vec::new();
        }
        let inner = bot_block(bot_style()).inner(area);
        let mut targets = Vec::new();
        let mut y = inner.y;
        for part in bot_parts(&message.content, inner.width) {
            if let Part::Code { index, height, .. } = part {
                let rect = Rect::new(inner.x, y, inner.width, height);
                targets.push((index, CodeBlock::copy_control_area(rect)));
            }
            y = y.saturating_add(part.height());
        }
        targets
    }

    fn render_system(&self, area: Rect, buf: &mut Buffer) {
        let style = system_style();
        let block = Block::bordered()
            .title("system")
            .border_type(BorderType::Rounded)
            .border_style(style.add_modifier(Modifier::DIM))
            .padding(Padding::horizontal(CONTENT_PAD_H));
        plain_paragraph(&self.message.content, style)
            .block(block)
            .render(area, buf);
    }

    fn render_user(&self, area: Rect, buf: &mut Buffer) {
        let style = user_style();
        let bubble_width = user_bubble_width(&self.message.content, area.width);
        let bubble = Rect {
            x: area.x + area.width.saturating_sub(bubble_width),
            width: bubble_width,
            ..area
        };
        let block = Block::bordered()
            .title(Line::from("you").right_aligned())
            .border_type(BorderType::Rounded)
            .border_style(style.add_modifier(Modifier::DIM))
            .padding(Padding::horizontal(CONTENT_PAD_H));
        plain_paragraph(&self.message.content, style)
            .alignment(Alignment::Right)
            .block(block)
            .render(bubble, buf);
    }

    fn render_bot(&self, area: Rect, buf: &mut Buffer) {
        let style = bot_style();
        let block = bot_block(style);
        let inner = block.inner(area);
        block.render(area, buf);

        if let Some(visible) = self.revealed {
            Paragraph::new(markdown::render(visible, Color::Blue))
                .wrap(Wrap { trim: false })
                .render(inner, buf);
            return;
        }

        let mut y = inner.y;
        for part in bot_parts(&self.message.content, inner.width) {
            if y >= inner.bottom() {
                break;
            }
            let height = part.height().min(inner.bottom() - y);
            let rect = Rect::new(inner.x, y, inner.width, height);
            match &part {
                Part::Prose { text, .. } => {
                    Paragraph::new(text.clone())
                        .wrap(Wrap { trim: false })
                        .render(rect, buf);
                }
                Part::Code { index, segment, .. } => {
                    CodeBlock::new(segment, self.copied.contains(index)).render(rect, buf);
                }
            }
            y = y.saturating_add(part.height());
        }
    }
}

impl Widget for MessageView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.message.role {
            Role::System => self.render_system(area, buf),
            Role::User => self.render_user(area, buf),
            Role::Bot => self.render_bot(area, buf),
        }
    }
}

impl Component for MessageView<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        frame.render_widget(*self, area);
    }
}

fn system_style() -> Style {
    Style::default().fg(Color::Yellow)
}

fn user_style() -> Style {
    Style::default().fg(Color::Green)
}

fn bot_style() -> Style {
    Style::default().fg(Color::Blue)
}

fn bot_block(style: Style) -> Block<'static> {
    Block::bordered()
        .title("ai")
        .border_type(BorderType::Rounded)
        .border_style(style.add_modifier(Modifier::DIM))
        .padding(Padding::horizontal(CONTENT_PAD_H))
}

/// Drops blank lines around `content`, keeping the first line's indentation.
fn trim_blank_lines(content: &str) -> &str {
    let trimmed = content.trim_end();
    let start = trimmed
        .char_indices()
        .take_while(|(_, c)| c.is_whitespace())
        .filter(|(_, c)| *c == '\n')
        .last()
        .map_or(0, |(i, _)| i + 1);
    &trimmed[start..]
}

fn plain_paragraph(content: &str, style: Style) -> Paragraph<'static> {
    // ratatui renders \t as zero-width
    Paragraph::new(trim_blank_lines(content).replace('\t', "    "))
        .style(style)
        .wrap(Wrap { trim: false })
}

/// Outer width of a user bubble: as wide as its longest line, capped at `width`.
fn user_bubble_width(content: &str, width: u16) -> u16 {
    let longest = trim_blank_lines(content)
        .lines()
        .map(UnicodeWidthStr::width)
        .max()
        .unwrap_or(0);
    let wanted = to_cells(longest).saturating_add(HORIZONTAL_OVERHEAD);
    wanted.max(MIN_BUBBLE_WIDTH).min(width)
}

/// Lays out a bot reply as prose and code parts at `inner_width`.
///
/// Whitespace-only prose between adjacent fences is dropped.
fn bot_parts(content: &str, inner_width: u16) -> Vec<Part> {
    segment::parse(content)
        .into_iter()
        .enumerate()
        .filter_map(|(index, segment)| {
            if segment.is_code() {
                let height = CodeBlock::calculate_height(&segment, inner_width);
                Some(Part::Code {
                    index,
                    segment,
                    height,
                })
            } else if segment.body.trim().is_empty() {
                None
            } else {
                let text = markdown::render(&segment.body, Color::Blue);
                let height = to_cells(
                    Paragraph::new(text.clone())
                        .wrap(Wrap { trim: false })
                        .line_count(inner_width),
                );
                Some(Part::Prose { text, height })
            }
        })
        .collect()
}
