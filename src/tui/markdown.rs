//! Markdown prose → ratatui `Text`.
//!
//! Only the prose between fences comes through here; the segment parser has
//! already cut fenced code out. Replies mostly carry paragraphs, lists,
//! emphasis and inline code, so that is what gets styled. Everything else
//! degrades to plain text in the base colour.

use pulldown_cmark::{Event, Parser, Tag, TagEnd};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};

const QUOTE_BAR: &str = "│ ";
const CODE_INDENT: &str = "  ";

pub fn render(content: &str, base_fg: Color) -> Text<'static> {
    let mut prose = Prose::new(base_fg);
    for event in Parser::new(content) {
        prose.event(event);
    }
    prose.finish()
}

enum ListKind {
    Bullet,
    Numbered(u64),
}

/// Builds lines one at a time: spans collect in `current` and are flushed
/// into `lines` at block boundaries and hard breaks.
struct Prose {
    base: Style,
    lines: Vec<Line<'static>>,
    current: Vec<Span<'static>>,
    /// Open inline modifiers (bold, italic, ...), innermost last.
    modifiers: Vec<Modifier>,
    quote_depth: usize,
    lists: Vec<ListKind>,
    /// Inside an indented code block.
    verbatim: bool,
    link: Option<String>,
    /// A blank line goes before the next block.
    pending_gap: bool,
}

impl Prose {
    fn new(base_fg: Color) -> Self {
        Self {
            base: Style::default().fg(base_fg),
            lines: Vec::new(),
            current: Vec::new(),
            modifiers: Vec::new(),
            quote_depth: 0,
            lists: Vec::new(),
            verbatim: false,
            link: None,
            pending_gap: false,
        }
    }

    fn inline_style(&self) -> Style {
        let modifier = self
            .modifiers
            .iter()
            .fold(Modifier::empty(), |acc, m| acc | *m);
        self.base.add_modifier(modifier)
    }

    fn flush(&mut self) {
        if self.current.is_empty() {
            return;
        }
        let mut spans = Vec::with_capacity(self.quote_depth + self.current.len());
        for _ in 0..self.quote_depth {
            spans.push(Span::styled(QUOTE_BAR, Style::default().fg(Color::DarkGray)));
        }
        spans.append(&mut self.current);
        self.lines.push(Line::from(spans));
    }

    fn start_block(&mut self) {
        self.flush();
        if self.pending_gap && !self.lines.is_empty() {
            self.lines.push(Line::default());
        }
        self.pending_gap = false;
    }

    fn end_block(&mut self) {
        self.flush();
        self.pending_gap = true;
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.open(tag),
            Event::End(tag) => self.close(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.current.push(Span::styled(
                code.to_string(),
                Style::default().fg(Color::White).bg(Color::DarkGray),
            )),
            Event::SoftBreak => self.current.push(Span::raw(" ")),
            Event::HardBreak => self.flush(),
            Event::Rule => {
                self.start_block();
                self.current.push(Span::styled(
                    "─".repeat(20),
                    Style::default().fg(Color::DarkGray),
                ));
                self.end_block();
            }
            _ => {}
        }
    }

    fn open(&mut self, tag: Tag<'_>) {
        match tag {
            // Item paragraphs continue the marker line
            Tag::Paragraph if self.current.is_empty() => self.start_block(),
            Tag::Heading { .. } => {
                self.start_block();
                self.modifiers.push(Modifier::BOLD);
            }
            Tag::BlockQuote(_) => {
                self.start_block();
                self.quote_depth += 1;
                self.modifiers.push(Modifier::ITALIC);
            }
            Tag::CodeBlock(_) => {
                self.start_block();
                self.verbatim = true;
            }
            Tag::List(first) => {
                if self.lists.is_empty() {
                    self.start_block();
                }
                self.lists.push(match first {
                    Some(n) => ListKind::Numbered(n),
                    None => ListKind::Bullet,
                });
            }
            Tag::Item => {
                self.flush();
                let indent = CODE_INDENT.repeat(self.lists.len().saturating_sub(1));
                let marker = match self.lists.last_mut() {
                    Some(ListKind::Numbered(n)) => {
                        *n += 1;
                        format!("{indent}{}. ", *n - 1)
                    }
                    Some(ListKind::Bullet) | None => format!("{indent}- "),
                };
                self.current
                    .push(Span::styled(marker, Style::default().fg(Color::DarkGray)));
            }
            Tag::Emphasis => self.modifiers.push(Modifier::ITALIC),
            Tag::Strong => self.modifiers.push(Modifier::BOLD),
            Tag::Link { dest_url, .. } => {
                self.link = Some(dest_url.to_string());
                self.modifiers.push(Modifier::UNDERLINED);
            }
            _ => {}
        }
    }

    fn close(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph | TagEnd::Item => self.flush(),
            TagEnd::Heading(_) => {
                self.modifiers.pop();
                self.end_block();
            }
            TagEnd::BlockQuote(_) => {
                self.flush();
                self.quote_depth = self.quote_depth.saturating_sub(1);
                self.modifiers.pop();
                self.pending_gap = true;
            }
            TagEnd::CodeBlock => {
                self.verbatim = false;
                self.end_block();
            }
            TagEnd::List(_) => {
                self.lists.pop();
                if self.lists.is_empty() {
                    self.end_block();
                }
            }
            TagEnd::Emphasis | TagEnd::Strong => {
                self.modifiers.pop();
            }
            TagEnd::Link => {
                self.modifiers.pop();
                if let Some(url) = self.link.take() {
                    self.current.push(Span::styled(
                        format!(" ({url})"),
                        Style::default().fg(Color::DarkGray),
                    ));
                }
            }
            _ => {}
        }
        if matches!(tag, TagEnd::Paragraph) && self.lists.is_empty() {
            self.pending_gap = true;
        }
    }

    fn text(&mut self, text: &str) {
        // ratatui renders \t as zero-width
        let text = text.replace('\t', "    ");
        if self.verbatim {
            let style = self.base.add_modifier(Modifier::DIM);
            for line in text.lines() {
                self.current.push(Span::styled(format!("{CODE_INDENT}{line}"), style));
                self.flush();
            }
            return;
        }
        let style = self.inline_style();
        self.current.push(Span::styled(text, style));
    }

    fn finish(mut self) -> Text<'static> {
        self.flush();
        Text::from(self.lines)
    }
}
