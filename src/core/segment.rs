//! # Code Segments
//!
//! Splits a model reply into prose and fenced code.
//!
//! ```text
//! "Here:\n```python\nprint(1)\n```\nDone."
//!            │
//!            ▼  split on ```
//! [ "Here:\n" , "python\nprint(1)\n" , "\nDone." ]
//!    even=Text      odd=Code              even=Text
//! ```
//!
//! A code fragment's first line is its language tag; the rest, trimmed, is the
//! body. An unterminated fence (odd number of delimiters) still yields a
//! trailing code segment: that is a defined case, not an error.

/// The fence delimiter.
pub const FENCE: &str = "```";

/// Label used when a code segment carries no language tag.
pub const PLAIN_LANGUAGE: &str = "plain";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Text,
    Code,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub kind: SegmentKind,
    /// Language tag of a code segment. `None` for text and for untagged code.
    pub language: Option<String>,
    /// Display body: verbatim for text, tag-stripped and trimmed for code.
    pub body: String,
    /// The exact fragment between fences, before any trimming.
    pub raw: String,
}

impl Segment {
    pub fn text(body: impl Into<String>) -> Self {
        let body = body.into();
        Self {
            kind: SegmentKind::Text,
            language: None,
            raw: body.clone(),
            body,
        }
    }

    /// Interprets one fragment found between fences.
    pub fn code(fragment: &str) -> Self {
        let (first_line, rest) = match fragment.split_once('\n') {
            Some((first, rest)) => (first, rest),
            None => (fragment, ""),
        };
        let tag = first_line.trim();
        Self {
            kind: SegmentKind::Code,
            language: (!tag.is_empty()).then(|| tag.to_string()),
            body: rest.trim().to_string(),
            raw: fragment.to_string(),
        }
    }

    pub fn is_code(&self) -> bool {
        self.kind == SegmentKind::Code
    }

    /// Language label shown above a code block.
    pub fn display_language(&self) -> &str {
        self.language.as_deref().unwrap_or(PLAIN_LANGUAGE)
    }
}

/// Splits `content` into alternating text/code segments, starting with text.
///
/// Pure: the same input always yields the same sequence.
pub fn parse(content: &str) -> Vec<Segment> {
    content
        .split(FENCE)
        .enumerate()
        .map(|(i, fragment)| {
            if i % 2 == 0 {
                Segment::text(fragment)
            } else {
                Segment::code(fragment)
            }
        })
        .collect()
}

pub fn fence_count(content: &str) -> usize {
    content.matches(FENCE).count()
}

pub fn has_fence(content: &str) -> bool {
    content.contains(FENCE)
}

/// Rebuilds the original content by rejoining raw fragments with fences.
pub fn reassemble(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(|s| s.raw.as_str())
        .collect::<Vec<_>>()
        .join(FENCE)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: &[&str] = &[
        "",
        "plain prose with no fences",
        "Here:\n```python\nprint(1)\n```\nDone.",
        "```\nno tag\n```",
        "a```rs\nfn x() {}\n```b```js\nlet y = 1;\n```c",
        "```python\nunterminated",
        "``` \n  padded  \n```",
        "inline ``` only-tag```",
    ];

    #[test]
    fn test_no_fence_yields_single_text_segment() {
        for c in ["", "hello", "multi\nline\n  text  ", "two `` ticks"] {
            let segments = parse(c);
            assert_eq!(segments.len(), 1, "input {c:?}");
            assert_eq!(segments[0].kind, SegmentKind::Text);
            assert_eq!(segments[0].body, c);
        }
    }

    #[test]
    fn test_even_fences_alternate_starting_with_text() {
        for c in SAMPLES.iter().filter(|c| fence_count(c) % 2 == 0) {
            let segments = parse(c);
            assert_eq!(segments.len(), fence_count(c) + 1, "input {c:?}");
            for (i, seg) in segments.iter().enumerate() {
                let expected = if i % 2 == 0 {
                    SegmentKind::Text
                } else {
                    SegmentKind::Code
                };
                assert_eq!(seg.kind, expected, "input {c:?} segment {i}");
            }
        }
    }

    #[test]
    fn test_reassemble_is_lossless() {
        for c in SAMPLES {
            assert_eq!(reassemble(&parse(c)), *c);
        }
    }

    #[test]
    fn test_bodies_with_fences_rebuild_canonical_blocks() {
        let c = "Intro\n```rust\nfn main() {}\n```\nOutro";
        let rebuilt: String = parse(c)
            .iter()
            .map(|s| match s.kind {
                SegmentKind::Text => s.body.clone(),
                SegmentKind::Code => format!(
                    "{FENCE}{}\n{}\n{FENCE}",
                    s.language.as_deref().unwrap_or(""),
                    s.body
                ),
            })
            .collect();
        assert_eq!(rebuilt, c);
    }

    #[test]
    fn test_scenario_python_block() {
        let segments = parse("Here:\n```python\nprint(1)\n```\nDone.");
        assert_eq!(
            segments
                .iter()
                .map(|s| (s.kind, s.language.as_deref(), s.body.as_str()))
                .collect::<Vec<_>>(),
            vec![
                (SegmentKind::Text, None, "Here:\n"),
                (SegmentKind::Code, Some("python"), "print(1)"),
                (SegmentKind::Text, None, "\nDone."),
            ]
        );
    }

    #[test]
    fn test_untagged_code_displays_plain() {
        let segments = parse("```\nx = 1\n```");
        assert_eq!(segments[1].language, None);
        assert_eq!(segments[1].display_language(), PLAIN_LANGUAGE);
        assert_eq!(segments[1].body, "x = 1");
    }

    #[test]
    fn test_unterminated_fence_is_trailing_code() {
        let segments = parse("look:\n```python\nprint(2)");
        assert_eq!(segments.len(), 2);
        assert!(segments[1].is_code());
        assert_eq!(segments[1].language.as_deref(), Some("python"));
        assert_eq!(segments[1].body, "print(2)");
    }

    #[test]
    fn test_single_line_fragment_is_all_tag() {
        let segments = parse("a```bash```b");
        assert_eq!(segments[1].language.as_deref(), Some("bash"));
        assert_eq!(segments[1].body, "");
    }

    #[test]
    fn test_parse_is_deterministic() {
        for c in SAMPLES {
            assert_eq!(parse(c), parse(c));
        }
    }
}
