//! Markdown Abstract Syntax Tree
//!
//! This module defines the intermediate nodes produced by the Markdown parser
//! before they are lowered into a [`Document`](crate::Document) tree.

/// A block-level Markdown node
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// Heading with level (1-6) and inline content
    Heading { level: u8, content: Vec<Inline> },

    /// Paragraph containing inline content
    Paragraph(Vec<Inline>),

    /// Block quote containing nested blocks
    BlockQuote(Vec<Block>),

    /// List (ordered or unordered); start numbers are not kept
    List { ordered: bool, items: Vec<ListItem> },

    /// Fenced or indented code block
    CodeBlock {
        language: Option<String>,
        code: String,
        fenced: bool,
    },

    /// Thematic break (horizontal rule)
    ThematicBreak,

    /// Table with headers and rows
    Table {
        headers: Vec<Vec<Inline>>,
        rows: Vec<Vec<Vec<Inline>>>,
    },
}

/// A list item: its own inline text plus any nested lists
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListItem {
    pub content: Vec<Inline>,
    pub children: Vec<Block>,
}

impl ListItem {
    pub fn from_inlines(content: Vec<Inline>) -> Self {
        Self {
            content,
            children: Vec::new(),
        }
    }
}

/// An inline Markdown node
#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    /// Plain text
    Text(String),

    /// Strong emphasis (bold)
    Strong(Vec<Inline>),

    /// Emphasis (italic)
    Emphasis(Vec<Inline>),

    /// Strikethrough
    Strikethrough(Vec<Inline>),

    /// Inline code
    Code(String),

    /// Link with content and URL
    Link { content: Vec<Inline>, url: String },

    /// Image with alt text and URL
    Image { alt: String, url: String },

    /// Hard line break
    LineBreak,
}

impl Block {
    /// Check if this block is empty/blank
    pub fn is_blank(&self) -> bool {
        match self {
            Block::Paragraph(inlines) => inlines.iter().all(|i| i.is_blank()),
            Block::Heading { content, .. } => content.iter().all(|i| i.is_blank()),
            Block::BlockQuote(blocks) => blocks.iter().all(|b| b.is_blank()),
            Block::List { items, .. } => items.is_empty(),
            Block::CodeBlock { .. } | Block::ThematicBreak | Block::Table { .. } => false,
        }
    }
}

impl Inline {
    /// Check if this inline is empty/blank
    pub fn is_blank(&self) -> bool {
        match self {
            Inline::Text(text) => text.trim().is_empty(),
            Inline::Strong(inlines) | Inline::Emphasis(inlines) | Inline::Strikethrough(inlines) => {
                inlines.iter().all(|i| i.is_blank())
            }
            Inline::Code(code) => code.is_empty(),
            Inline::Link { .. } | Inline::Image { .. } | Inline::LineBreak => false,
        }
    }

    /// Visible text, formatting dropped
    pub fn plain_text(&self) -> String {
        match self {
            Inline::Text(text) | Inline::Code(text) => text.clone(),
            Inline::Strong(inner) | Inline::Emphasis(inner) | Inline::Strikethrough(inner) => {
                inlines_plain_text(inner)
            }
            Inline::Link { content, .. } => inlines_plain_text(content),
            Inline::Image { alt, .. } => alt.clone(),
            Inline::LineBreak => "\n".to_string(),
        }
    }
}

/// Append text, merging with a trailing text node
pub fn push_text(inlines: &mut Vec<Inline>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Inline::Text(last)) = inlines.last_mut() {
        last.push_str(text);
    } else {
        inlines.push(Inline::Text(text.to_string()));
    }
}

/// Helper to collect plain text of an inline vec
pub fn inlines_plain_text(inlines: &[Inline]) -> String {
    inlines.iter().map(|i| i.plain_text()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_text_merges() {
        let mut inlines = vec![Inline::Strong(vec![Inline::Text("a".to_string())])];
        push_text(&mut inlines, "b");
        push_text(&mut inlines, "");
        push_text(&mut inlines, "c");
        assert_eq!(
            inlines,
            vec![
                Inline::Strong(vec![Inline::Text("a".to_string())]),
                Inline::Text("bc".to_string()),
            ]
        );
    }

    #[test]
    fn test_plain_text() {
        let inlines = vec![
            Inline::Text("Hello ".to_string()),
            Inline::Strong(vec![Inline::Emphasis(vec![Inline::Text("big".to_string())])]),
            Inline::LineBreak,
            Inline::Image {
                alt: "logo".to_string(),
                url: "l.png".to_string(),
            },
        ];
        assert_eq!(inlines_plain_text(&inlines), "Hello big\nlogo");
    }

    #[test]
    fn test_blank() {
        assert!(Block::Paragraph(vec![Inline::Text("  ".to_string())]).is_blank());
        assert!(!Block::ThematicBreak.is_blank());
        assert!(!Inline::LineBreak.is_blank());
    }
}
