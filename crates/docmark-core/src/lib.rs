//! docmark-core - document tree, Markdown AST, escaping and export options
//!
//! This crate provides the data structures shared by both directions of the
//! `docmark` converter.
//!
//! # Architecture
//!
//! ```text
//!                 ┌──────────────┐  serialize
//!  Document  ───▶ │  rule engine │ ─────────▶ Markdown String
//!  (arena)        └──────────────┘
//!     ▲
//!     │ lower     ┌──────────────┐  tokenize + descend
//!     └────────── │ Markdown AST │ ◀───────── Markdown String
//!                 └──────────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use docmark_core::{Document, ExportConfig, HeadingStyle};
//!
//! let mut doc = Document::new();
//! let h1 = doc.append_element(doc.root(), "h1").unwrap();
//! doc.append_text(h1, "Hello World").unwrap();
//!
//! assert_eq!(doc.to_html(), "<h1>Hello World</h1>");
//!
//! let config = ExportConfig::default().with_heading_style(HeadingStyle::Setext);
//! assert_eq!(config.heading_style, HeadingStyle::Setext);
//! ```

pub mod ast;
mod escape;
mod options;
mod tree;

pub use ast::{push_text, Block, Inline, ListItem};
pub use escape::{escape_attribute, escape_for_export, escape_for_import, MARKDOWN_SPECIAL};
pub use options::{
    BulletMarker, CodeBlockStyle, ConfigError, ExportConfig, HeadingStyle, LinkStyle,
};
pub use tree::{Descendants, Document, NodeId, NodeKind, NodeRef, TreeError, DOCUMENT_TAG};
