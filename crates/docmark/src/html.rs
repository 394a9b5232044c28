//! HTML parsing support.
//!
//! This module parses HTML strings into the [`Document`] tree the serializer
//! works on, for hosts that hold markup rather than a structured tree.

use docmark_core::{Document, NodeId, TreeError};
use log::debug;
use scraper::{ElementRef, Html, Node as ScraperNode};

use crate::utilities::collapse_whitespace;

/// Parse an HTML string into a document tree.
///
/// Whitespace outside `pre` is collapsed the way a browser renders it, and
/// whitespace-only text spanning lines (source indentation) is dropped.
///
/// # Example
///
/// ```rust
/// use docmark::{parse_html, MarkdownService};
///
/// let doc = parse_html("<h1>Hello <em>World</em></h1>");
///
/// let service = MarkdownService::new();
/// assert_eq!(service.export(&doc), "# Hello *World*");
/// ```
pub fn parse_html(html: &str) -> Document {
    let fragment = Html::parse_fragment(html);
    let mut doc = Document::new();
    let root = doc.root();

    if let Err(err) = append_children(&mut doc, root, fragment.root_element(), false) {
        debug!("document tree left incomplete: {err}");
    }

    doc
}

fn append_children(
    doc: &mut Document,
    parent: NodeId,
    element: ElementRef,
    preformatted: bool,
) -> Result<(), TreeError> {
    for child in element.children() {
        match child.value() {
            ScraperNode::Text(text) => {
                let text: &str = &text.text;
                if preformatted {
                    doc.append_text(parent, text)?;
                } else if !(text.trim().is_empty() && text.contains('\n')) {
                    doc.append_text(parent, collapse_whitespace(text))?;
                }
            }
            ScraperNode::Element(_) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    let tag = child_element.value().name();
                    let id = doc.append_element_with_attrs(
                        parent,
                        tag,
                        child_element.value().attrs(),
                    )?;
                    append_children(doc, id, child_element, preformatted || tag == "pre")?;
                }
            }
            _ => {}
        }
    }
    Ok(())
}
