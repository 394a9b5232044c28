//! # docmark
//!
//! Convert structured editor documents to Markdown and back.
//!
//! Both directions work on the arena [`Document`] tree from `docmark-core`:
//!
//! - **Export** walks the tree post-order and applies one production rule per
//!   element kind, driven by [`ExportConfig`].
//! - **Import** runs Markdown through a block grammar and a token-based inline
//!   grammar, then lowers the resulting AST into a fresh tree.
//!
//! Neither direction fails. Unknown elements pass their content through on
//! export, and Markdown the grammar cannot place is kept as literal text on
//! import.
//!
//! ## Example
//!
//! ```rust
//! use docmark::{export, import, ExportConfig};
//!
//! let doc = import("Hello **world**");
//! assert_eq!(doc.to_html(), "<p>Hello <strong>world</strong></p>");
//!
//! let markdown = export(&doc, &ExportConfig::default());
//! assert_eq!(markdown, "Hello **world**");
//! ```
//!
//! ## Example (custom rules)
//!
//! ```rust
//! use docmark::{Filter, MarkdownService, Rule};
//!
//! let mut service = MarkdownService::new();
//! service
//!     .add_rule("kbd", Rule::for_tag("kbd", |_, content, _, _| format!("<kbd>{content}</kbd>")))
//!     .remove(Filter::tag("script"));
//!
//! let doc = service.import("Press it");
//! assert_eq!(service.export(&doc), "Press it");
//! ```

#[cfg(feature = "html")]
pub mod html;
mod parser;
mod rules;
mod service;
mod utilities;

pub use docmark_core::{
    ast, escape_attribute, escape_for_export, escape_for_import, Block, BulletMarker,
    CodeBlockStyle, ConfigError, Document, ExportConfig, HeadingStyle, Inline, LinkStyle,
    ListItem, NodeId, NodeKind, NodeRef, TreeError,
};
#[cfg(feature = "html")]
pub use html::parse_html;
pub use parser::{lex, parse_markdown, Token, TokenKind};
pub use rules::{commonmark_rules, Filter, Frame, ReplacementFn, Rule, Rules};
pub use service::MarkdownService;

/// Error type for docmark operations
#[derive(Debug, thiserror::Error)]
pub enum DocmarkError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid tree operation: {0}")]
    Tree(#[from] TreeError),
}

pub type Result<T> = std::result::Result<T, DocmarkError>;

/// Serialize a document tree to Markdown with the built-in rules
pub fn export(document: &Document, config: &ExportConfig) -> String {
    MarkdownService::with_config(*config).export(document)
}

/// Parse Markdown into a document tree
pub fn import(markdown: &str) -> Document {
    parser::parse(markdown)
}

/// Render Markdown as markup, text escaped
pub fn markdown_to_html(markdown: &str) -> String {
    import(markdown).to_html()
}
