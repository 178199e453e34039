//! Structure parser: rebuild typed structural elements from markdown text.
//!
//! Converters hand us a flat markdown stream. Downstream consumers (heading
//! outlines, chunkers, the CLI `parse` command) want it as an ordered list of
//! typed blocks instead. This module walks the stream once, line by line,
//! with a three-state machine:
//!
//! ```text
//!            ``` fence                 ``` fence
//!  Normal ──────────────▶ InCodeBlock ──────────▶ Normal
//!    │  ▲
//!    │  └── blank line / heading
//!    ▼
//!  InList  (bullet or numbered marker)
//! ```
//!
//! Blank lines only separate elements; they are kept verbatim inside code
//! blocks. The parser is total: unbalanced fences and stray markers degrade
//! into the nearest element kind instead of failing.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

static RE_HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(#{1,6}) (.+)$").unwrap());

static RE_LIST_ITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(?:[-*+]|\d+\.) ").unwrap());

const FENCE: &str = "```";

/// Kind of a structural element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    #[serde(rename = "heading_1")]
    Heading1,
    #[serde(rename = "heading_2")]
    Heading2,
    #[serde(rename = "heading_3")]
    Heading3,
    #[serde(rename = "heading_4")]
    Heading4,
    #[serde(rename = "heading_5")]
    Heading5,
    #[serde(rename = "heading_6")]
    Heading6,
    #[serde(rename = "paragraph")]
    Paragraph,
    #[serde(rename = "list")]
    List,
    #[serde(rename = "code_block")]
    CodeBlock,
}

impl ElementKind {
    /// Heading kind for a level in `1..=6`.
    pub fn heading(level: u8) -> Option<Self> {
        match level {
            1 => Some(Self::Heading1),
            2 => Some(Self::Heading2),
            3 => Some(Self::Heading3),
            4 => Some(Self::Heading4),
            5 => Some(Self::Heading5),
            6 => Some(Self::Heading6),
            _ => None,
        }
    }

    /// The heading level, or `None` for non-heading kinds.
    pub fn heading_level(self) -> Option<u8> {
        match self {
            Self::Heading1 => Some(1),
            Self::Heading2 => Some(2),
            Self::Heading3 => Some(3),
            Self::Heading4 => Some(4),
            Self::Heading5 => Some(5),
            Self::Heading6 => Some(6),
            _ => None,
        }
    }

    pub fn is_heading(self) -> bool {
        self.heading_level().is_some()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Heading1 => "heading_1",
            Self::Heading2 => "heading_2",
            Self::Heading3 => "heading_3",
            Self::Heading4 => "heading_4",
            Self::Heading5 => "heading_5",
            Self::Heading6 => "heading_6",
            Self::Paragraph => "paragraph",
            Self::List => "list",
            Self::CodeBlock => "code_block",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One classified block of a parsed document.
///
/// `content` keeps the original line breaks of multi-line elements. Heading
/// content excludes the `#` marker; code-block content excludes the fences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuralElement {
    #[serde(rename = "type")]
    pub kind: ElementKind,
    pub content: String,
}

impl StructuralElement {
    pub fn new(kind: ElementKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Normal,
    InList,
    InCodeBlock,
}

struct StructureParser<'a> {
    elements: Vec<StructuralElement>,
    buffer: Vec<&'a str>,
    mode: Mode,
}

impl<'a> StructureParser<'a> {
    fn new() -> Self {
        Self {
            elements: Vec::new(),
            buffer: Vec::new(),
            mode: Mode::Normal,
        }
    }

    /// Kind the pending buffer would be emitted as outside a code block.
    fn active_kind(&self) -> ElementKind {
        match self.mode {
            Mode::InList => ElementKind::List,
            Mode::InCodeBlock => ElementKind::CodeBlock,
            Mode::Normal => ElementKind::Paragraph,
        }
    }

    fn flush(&mut self, kind: ElementKind) {
        if self.buffer.is_empty() {
            return;
        }
        let content = self.buffer.join("\n");
        self.buffer.clear();
        self.elements.push(StructuralElement::new(kind, content));
    }

    fn feed(&mut self, line: &'a str) {
        if self.mode == Mode::InCodeBlock {
            if line.starts_with(FENCE) {
                self.flush(ElementKind::CodeBlock);
                self.mode = Mode::Normal;
            } else {
                self.buffer.push(line);
            }
            return;
        }

        if line.starts_with(FENCE) {
            self.flush(ElementKind::Paragraph);
            self.mode = Mode::InCodeBlock;
            return;
        }

        if let Some(caps) = RE_HEADING.captures(line) {
            self.flush(self.active_kind());
            self.mode = Mode::Normal;
            let level = caps[1].len() as u8;
            if let Some(kind) = ElementKind::heading(level) {
                self.elements.push(StructuralElement::new(kind, &caps[2]));
            }
            return;
        }

        if RE_LIST_ITEM.is_match(line) {
            if self.mode != Mode::InList {
                self.flush(ElementKind::Paragraph);
                self.mode = Mode::InList;
            }
            self.buffer.push(line);
            return;
        }

        if line.trim().is_empty() {
            self.flush(self.active_kind());
            self.mode = Mode::Normal;
            return;
        }

        self.buffer.push(line);
    }

    fn finish(mut self) -> Vec<StructuralElement> {
        let kind = self.active_kind();
        self.flush(kind);
        self.elements
    }
}

/// Parse markdown-flavoured text into an ordered sequence of elements.
///
/// Never fails: empty input yields an empty vector and an unterminated code
/// fence is emitted as a `code_block` at end of input.
pub fn parse(markdown: &str) -> Vec<StructuralElement> {
    let mut parser = StructureParser::new();
    for line in markdown.lines() {
        parser.feed(line);
    }
    parser.finish()
}

/// Flatten elements back into markdown, one blank line between elements.
///
/// Heading markers and code fences are restored, so re-parsing the result
/// yields the same sequence of kinds for documents without code blocks
/// containing blank-line-separated fences.
pub fn render_markdown(elements: &[StructuralElement]) -> String {
    elements
        .iter()
        .map(|el| match el.kind.heading_level() {
            Some(level) => format!("{} {}", "#".repeat(level as usize), el.content),
            None if el.kind == ElementKind::CodeBlock => {
                format!("{FENCE}\n{}\n{FENCE}", el.content)
            }
            None => el.content.clone(),
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Element contents joined by a blank line, without any markup restored.
pub fn plain_text(elements: &[StructuralElement]) -> String {
    elements
        .iter()
        .map(|el| el.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}
