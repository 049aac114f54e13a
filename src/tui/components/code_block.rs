//! # CodeBlock Component
//!
//! One fenced code segment of a bot reply: a bordered box with the language
//! label on the left of the top border, a copy control on the right, and the
//! syntax-highlighted body inside.
//!
//! ```text
//! ╭ python ───────────────── Copy ╮
//! │print(1)                        │
//! ╰────────────────────────────────╯
//! ```
//!
//! The control reads `Copied!` while the segment's acknowledgment window is
//! open; the parent decides that and passes it in as a prop.

use std::sync::LazyLock;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Paragraph, Widget, Wrap};
use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;
use unicode_width::UnicodeWidthStr;

use crate::core::segment::Segment;
use crate::tui::components::to_cells;

static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static THEME_SET: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

const THEME: &str = "base16-ocean.dark";

pub const COPY_LABEL: &str = " Copy ";
pub const COPIED_LABEL: &str = " Copied! ";

/// Border rows above and below the body.
const VERTICAL_OVERHEAD: u16 = 2;
/// Left and right border columns.
const HORIZONTAL_OVERHEAD: u16 = 2;

const FRAME_STYLE: Style = Style::new().fg(Color::DarkGray);

#[derive(Clone, Copy)]
pub struct CodeBlock<'a> {
    pub segment: &'a Segment,
    /// Whether the copy acknowledgment is showing for this segment.
    pub copied: bool,
}

impl<'a> CodeBlock<'a> {
    pub fn new(segment: &'a Segment, copied: bool) -> Self {
        Self { segment, copied }
    }

    /// Rows needed to draw `segment` at `width`, borders included.
    pub fn calculate_height(segment: &Segment, width: u16) -> u16 {
        let inner = width.saturating_sub(HORIZONTAL_OVERHEAD);
        if inner == 0 {
            return VERTICAL_OVERHEAD + 1;
        }
        let body = to_cells(body_paragraph(segment).line_count(inner));
        body.max(1).saturating_add(VERTICAL_OVERHEAD)
    }

    /// Clickable region of the copy control for a block drawn at `area`.
    ///
    /// Covers the wider of the two labels so the target doesn't shift while
    /// the acknowledgment is showing.
    pub fn copy_control_area(area: Rect) -> Rect {
        let label_width = COPY_LABEL.width().max(COPIED_LABEL.width()) as u16;
        let right = area.x + area.width.saturating_sub(1);
        let width = label_width.min(area.width.saturating_sub(HORIZONTAL_OVERHEAD));
        Rect::new(right.saturating_sub(width), area.y, width, 1)
    }
}

impl Widget for CodeBlock<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let label = Line::from(Span::styled(
            format!(" {} ", self.segment.display_language()),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ));
        let control = if self.copied {
            Line::from(Span::styled(
                COPIED_LABEL,
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ))
        } else {
            Line::from(Span::styled(
                COPY_LABEL,
                Style::default().fg(Color::Black).bg(Color::Gray),
            ))
        };

        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(FRAME_STYLE)
            .title_top(label.left_aligned())
            .title_top(control.right_aligned());

        body_paragraph(self.segment).block(block).render(area, buf);
    }
}

fn body_paragraph(segment: &Segment) -> Paragraph<'static> {
    Paragraph::new(highlight(&segment.body, segment.language.as_deref()))
        .wrap(Wrap { trim: false })
}

/// Syntax-highlight `code` for the given language tag.
///
/// Unknown or missing tags fall back to plain white text.
pub fn highlight(code: &str, language: Option<&str>) -> Vec<Line<'static>> {
    // ratatui renders \t as zero-width
    let code = code.replace('\t', "    ");

    let syntax = language.and_then(|lang| SYNTAX_SET.find_syntax_by_token(lang));
    let theme = THEME_SET.themes.get(THEME);
    let (Some(syntax), Some(theme)) = (syntax, theme) else {
        return plain_lines(&code);
    };

    let mut highlighter = HighlightLines::new(syntax, theme);
    let mut lines = Vec::new();
    for line in LinesWithEndings::from(&code) {
        let Ok(ranges) = highlighter.highlight_line(line, &SYNTAX_SET) else {
            return plain_lines(&code);
        };
        let spans: Vec<Span<'static>> = ranges
            .into_iter()
            .map(|(style, text)| {
                let fg = Color::Rgb(style.foreground.r, style.foreground.g, style.foreground.b);
                Span::styled(
                    text.trim_end_matches(['\n', '\r']).to_owned(),
                    Style::default().fg(fg),
                )
            })
            .filter(|span| !span.content.is_empty())
            .collect();
        lines.push(Line::from(spans));
    }
    lines
}

fn plain_lines(code: &str) -> Vec<Line<'static>> {
    code.lines()
        .map(|line| Line::from(Span::styled(line.to_owned(), Style::default().fg(Color::White))))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::segment::parse;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn code_segment(fragment: &str) -> Segment {
        Segment::code(fragment)
    }

    fn render_to_string(segment: &Segment, copied: bool, width: u16) -> String {
        let height = CodeBlock::calculate_height(segment, width);
        let backend = TestBackend::new(width, height);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| {
                let area = f.area();
                f.render_widget(CodeBlock::new(segment, copied), area)
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
    fn height_counts_body_lines_plus_borders() {
        let seg = code_segment("python\nprint(1)\nprint(2)\n");
        assert_eq!(CodeBlock::calculate_height(&seg, 40), 4);
    }

    #[test]
    fn empty_body_still_gets_a_row() {
        let seg = code_segment("rust\n");
        assert_eq!(CodeBlock::calculate_height(&seg, 40), 3);
    }

    #[test]
    fn long_lines_wrap_inside_the_box() {
        let seg = code_segment(&format!("\n{}", "x".repeat(30)));
        // inner width 8 → 30 chars need 4 rows
        assert_eq!(CodeBlock::calculate_height(&seg, 10), 4 + VERTICAL_OVERHEAD);
    }

    #[test]
    fn renders_language_label_and_copy_control() {
        let seg = code_segment("python\nprint(1)\n");
        let text = render_to_string(&seg, false, 40);
        assert!(text.contains("python"));
        assert!(text.contains("Copy"));
        assert!(text.contains("print(1)"));
        assert!(!text.contains("Copied!"));
    }

    #[test]
    fn untagged_block_is_labelled_plain() {
        let seg = code_segment("\nx = 1\n");
        let text = render_to_string(&seg, false, 40);
        assert!(text.contains("plain"));
        assert!(text.contains("x = 1"));
    }

    #[test]
    fn acknowledged_block_shows_copied() {
        let segments = parse("Here:\n```python\nprint(1)\n```\nDone.");
        let text = render_to_string(&segments[1], true, 40);
        assert!(text.contains("Copied!"));
    }

    #[test]
    fn copy_control_sits_on_top_border_at_right_edge() {
        let area = Rect::new(2, 10, 40, 5);
        let control = CodeBlock::copy_control_area(area);
        assert_eq!(control.y, 10);
        assert_eq!(control.height, 1);
        assert_eq!(control.x + control.width, area.x + area.width - 1);
    }

    #[test]
    fn known_language_gets_rgb_highlighting() {
        let lines = highlight("fn main() {}\n", Some("rust"));
        assert_eq!(lines.len(), 1);
        assert!(
            lines[0]
                .spans
                .iter()
                .all(|s| matches!(s.style.fg, Some(Color::Rgb(..))))
        );
    }

    #[test]
    fn unknown_language_is_plain_white() {
        let lines = highlight("a\nb", Some("no-such-language"));
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].spans[0].style.fg, Some(Color::White));
    }

    #[test]
    fn tabs_expanded_to_spaces() {
        let lines = highlight("\tx", None);
        assert_eq!(lines[0].spans[0].content, "    x");
    }
}
