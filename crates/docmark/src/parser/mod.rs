//! Markdown parsing (Markdown → document tree)
//!
//! Pipeline: Markdown string → lines → block grammar (inline text through
//! the Logos tokenizer and inline grammar) → Markdown AST → document tree.
//!
//! Parsing never fails. Anything the grammar cannot place ends up as literal
//! paragraph text.
//!
//! Known limitations:
//! - reference-style links (`[text][id]`) are not resolved and stay literal
//! - ordered list start numbers are not kept
//! - delimiters inside code spans are literal text, never re-parsed

mod block;
mod inline;
mod lexer;

use docmark_core::{Block, Document, Inline, ListItem, NodeId, TreeError};
use log::debug;

pub use lexer::{lex, Token, TokenKind};

/// Parse Markdown into the Markdown AST
pub fn parse_markdown(markdown: &str) -> Vec<Block> {
    let normalized = markdown.replace("\r\n", "\n").replace('\r', "\n");
    let lines: Vec<&str> = normalized.lines().collect();
    block::parse_blocks(&lines)
}

/// Parse Markdown into a document tree
pub fn parse(markdown: &str) -> Document {
    let blocks = parse_markdown(markdown);
    let mut doc = Document::new();
    let root = doc.root();

    if let Err(err) = lower_blocks(&mut doc, root, &blocks) {
        debug!("document tree left incomplete: {err}");
    }

    doc
}

fn lower_blocks(doc: &mut Document, parent: NodeId, blocks: &[Block]) -> Result<(), TreeError> {
    for block in blocks {
        lower_block(doc, parent, block)?;
    }
    Ok(())
}

fn lower_block(doc: &mut Document, parent: NodeId, block: &Block) -> Result<(), TreeError> {
    match block {
        Block::Heading { level, content } => {
            let heading = doc.append_element(parent, &format!("h{}", (*level).clamp(1, 6)))?;
            lower_inlines(doc, heading, content)
        }

        Block::Paragraph(inlines) => {
            let p = doc.append_element(parent, "p")?;
            lower_inlines(doc, p, inlines)
        }

        Block::BlockQuote(blocks) => {
            let quote = doc.append_element(parent, "blockquote")?;
            lower_blocks(doc, quote, blocks)
        }

        Block::List { ordered, items } => {
            let list = doc.append_element(parent, if *ordered { "ol" } else { "ul" })?;
            for item in items {
                lower_list_item(doc, list, item)?;
            }
            Ok(())
        }

        Block::CodeBlock { language, code, .. } => {
            let pre = doc.append_element(parent, "pre")?;
            let code_el = match language {
                Some(lang) => {
                    doc.append_element_with_attrs(pre, "code", [("class", format!("language-{lang}"))])?
                }
                None => doc.append_element(pre, "code")?,
            };
            if !code.is_empty() {
                doc.append_text(code_el, code.as_str())?;
            }
            Ok(())
        }

        Block::ThematicBreak => doc.append_element(parent, "hr").map(|_| ()),

        Block::Table { headers, rows } => {
            let table = doc.append_element(parent, "table")?;
            let thead = doc.append_element(table, "thead")?;
            lower_row(doc, thead, "th", headers)?;

            if !rows.is_empty() {
                let tbody = doc.append_element(table, "tbody")?;
                for row in rows {
                    lower_row(doc, tbody, "td", row)?;
                }
            }
            Ok(())
        }
    }
}

fn lower_list_item(doc: &mut Document, list: NodeId, item: &ListItem) -> Result<(), TreeError> {
    let li = doc.append_element(list, "li")?;
    lower_inlines(doc, li, &item.content)?;
    lower_blocks(doc, li, &item.children)
}

fn lower_row(
    doc: &mut Document,
    parent: NodeId,
    cell_tag: &str,
    cells: &[Vec<Inline>],
) -> Result<(), TreeError> {
    let tr = doc.append_element(parent, "tr")?;
    for cell in cells {
        let cell_el = doc.append_element(tr, cell_tag)?;
        lower_inlines(doc, cell_el, cell)?;
    }
    Ok(())
}

fn lower_inlines(doc: &mut Document, parent: NodeId, inlines: &[Inline]) -> Result<(), TreeError> {
    for inline in inlines {
        match inline {
            Inline::Text(text) => {
                doc.append_text(parent, text.as_str())?;
            }
            Inline::Strong(inner) => wrap(doc, parent, "strong", inner)?,
            Inline::Emphasis(inner) => wrap(doc, parent, "em", inner)?,
            Inline::Strikethrough(inner) => wrap(doc, parent, "s", inner)?,
            Inline::Code(code) => {
                let el = doc.append_element(parent, "code")?;
                doc.append_text(el, code.as_str())?;
            }
            Inline::Link { content, url } => {
                let a = doc.append_element_with_attrs(parent, "a", [("href", url.as_str())])?;
                lower_inlines(doc, a, content)?;
            }
            Inline::Image { alt, url } => {
                doc.append_element_with_attrs(
                    parent,
                    "img",
                    [("src", url.as_str()), ("alt", alt.as_str())],
                )?;
            }
            Inline::LineBreak => {
                doc.append_element(parent, "br")?;
            }
        }
    }
    Ok(())
}

fn wrap(doc: &mut Document, parent: NodeId, tag: &str, inner: &[Inline]) -> Result<(), TreeError> {
    let el = doc.append_element(parent, tag)?;
    lower_inlines(doc, el, inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_input() {
        let doc = parse("");
        assert!(doc.is_empty());
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn test_heading() {
        let doc = parse("# Title");
        let h1 = doc.root_ref().children().next().unwrap();
        assert_eq!(h1.tag_name(), "h1");
        assert_eq!(h1.text_content(), "Title");
    }

    #[test]
    fn test_crlf_input() {
        assert_eq!(parse("a\r\nb\r\n\r\nc").to_html(), "<p>a\nb</p><p>c</p>");
    }

    #[test]
    fn test_reserved_characters_survive_as_text() {
        let doc = parse("a <b> & c");
        let p = doc.root_ref().children().next().unwrap();
        assert_eq!(p.children().count(), 1);
        assert_eq!(p.text_content(), "a <b> & c");
        assert_eq!(doc.to_html(), "<p>a &lt;b&gt; &amp; c</p>");
    }

    #[test]
    fn test_fenced_code_markup() {
        assert_eq!(
            parse("```html\n<p>x</p>\n```").to_html(),
            "<pre><code class=\"language-html\">&lt;p&gt;x&lt;/p&gt;</code></pre>"
        );
    }

    #[test]
    fn test_lists_and_inline_markup() {
        assert_eq!(
            parse("1. **a**\n2. [b](/b)\n\n---\n\n![i](i.png)  \nx").to_html(),
            "<ol><li><strong>a</strong></li><li><a href=\"/b\">b</a></li></ol><hr>\
             <p><img src=\"i.png\" alt=\"i\"><br>x</p>"
        );
    }

    #[test]
    fn test_table_markup() {
        assert_eq!(
            parse("| A | B |\n|---|---|\n| 1 | 2 |").to_html(),
            "<table><thead><tr><th>A</th><th>B</th></tr></thead>\
             <tbody><tr><td>1</td><td>2</td></tr></tbody></table>"
        );
    }

    #[test]
    fn test_nested_blockquote_and_strike() {
        assert_eq!(
            parse("> ~~old~~ new\n> > deeper").to_html(),
            "<blockquote><p><s>old</s> new</p><blockquote><p>deeper</p></blockquote></blockquote>"
        );
    }
}
