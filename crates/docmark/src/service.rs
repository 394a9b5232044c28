//! MarkdownService - the main entry point for both conversion directions.

use docmark_core::{
    escape_for_export, Document, ExportConfig, NodeId, NodeKind, NodeRef, TreeError, DOCUMENT_TAG,
};
use log::{debug, trace};

use crate::rules::{Filter, Frame, Rule, Rules};
use crate::utilities::{is_list, is_structural, join};
use crate::Result;

/// The main service for converting document trees to Markdown and back
pub struct MarkdownService {
    config: ExportConfig,
    rules: Rules,
}

impl MarkdownService {
    /// Create a new MarkdownService with default options
    pub fn new() -> Self {
        Self::with_config(ExportConfig::default())
    }

    /// Create a MarkdownService with custom options
    pub fn with_config(config: ExportConfig) -> Self {
        Self {
            config,
            rules: Rules::new(),
        }
    }

    /// Create a MarkdownService from string settings, e.g. read from a host
    /// settings panel
    pub fn from_settings<I, K, V>(settings: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        Ok(Self::with_config(ExportConfig::from_pairs(settings)?))
    }

    /// Convert a document tree to Markdown
    pub fn export(&self, document: &Document) -> String {
        let output = self.process_node(document.root_ref(), Frame::default());
        self.post_process(&output)
    }

    /// Convert the subtree rooted at `id` to Markdown
    pub fn export_node(&self, document: &Document, id: NodeId) -> Result<String> {
        let node = document.get(id).ok_or(TreeError::UnknownNode(id))?;

        // Rebuild the list context the node sits in
        let mut frame = Frame::default();
        let mut ancestors: Vec<&str> = Vec::new();
        let mut current = node.parent();
        while let Some(parent) = current {
            ancestors.push(parent.tag_name());
            current = parent.parent();
        }
        for tag in ancestors.into_iter().rev() {
            frame = frame.enter(tag);
        }

        let output = self.process_node(node, frame);
        Ok(self.post_process(&output))
    }

    /// Convert Markdown to a document tree
    pub fn import(&self, markdown: &str) -> Document {
        crate::parser::parse(markdown)
    }

    /// Parse an HTML string and convert it to Markdown
    #[cfg(feature = "html")]
    pub fn export_html(&self, html: &str) -> String {
        self.export(&crate::html::parse_html(html))
    }

    /// Add a custom rule
    pub fn add_rule(&mut self, key: &str, rule: Rule) -> &mut Self {
        self.rules.add(key, rule);
        self
    }

    /// Keep elements matching the filter as raw markup
    pub fn keep(&mut self, filter: Filter) -> &mut Self {
        self.rules.keep(filter);
        self
    }

    /// Remove elements matching the filter
    pub fn remove(&mut self, filter: Filter) -> &mut Self {
        self.rules.remove(filter);
        self
    }

    /// Apply a plugin
    pub fn use_plugin<F>(&mut self, plugin: F) -> &mut Self
    where
        F: FnOnce(&mut Self),
    {
        plugin(self);
        self
    }

    /// Escape Markdown special characters in a string
    pub fn escape(&self, text: &str) -> String {
        escape_for_export(text)
    }

    /// Get the current options
    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Get mutable access to options
    pub fn config_mut(&mut self) -> &mut ExportConfig {
        &mut self.config
    }

    fn process_node(&self, node: NodeRef, frame: Frame) -> String {
        match node.kind() {
            NodeKind::Text(text) => self.process_text(node, text, frame),
            NodeKind::Element { .. } => self.process_element(node, frame),
        }
    }

    fn process_text(&self, node: NodeRef, text: &str, frame: Frame) -> String {
        // Indentation between structural elements is not content
        if text.trim().is_empty() && node.parent_tag().is_some_and(is_structural) {
            return String::new();
        }

        if frame.in_code {
            text.to_string()
        } else {
            escape_for_export(text)
        }
    }

    fn process_element(&self, node: NodeRef, frame: Frame) -> String {
        if self.rules.should_remove(&node, &self.config) {
            trace!("removing <{}>", node.tag_name());
            return String::new();
        }

        if self.rules.should_keep(&node, &self.config) {
            trace!("keeping <{}> as markup", node.tag_name());
            return node.outer_html();
        }

        let tag = node.tag_name();
        let content = self.process_children(node, frame.enter(tag));

        match self.rules.for_node(&node, &self.config) {
            Some(rule) => {
                trace!("applying rule for <{tag}>");
                rule.replace(&node, &content, &self.config, frame)
            }
            None => {
                if tag != DOCUMENT_TAG {
                    debug!("no rule for <{tag}>, passing content through");
                }
                content
            }
        }
    }

    fn process_children(&self, node: NodeRef, frame: Frame) -> String {
        let list = is_list(node.tag_name());
        let mut output = String::new();

        for child in node.children() {
            // Lists only produce items
            if list && child.tag_name() != "li" {
                continue;
            }
            join(&mut output, &self.process_node(child, frame));
        }

        output
    }

    /// Trim leading and trailing blank lines
    fn post_process(&self, output: &str) -> String {
        output.trim_matches('\n').to_string()
    }
}

impl Default for MarkdownService {
    fn default() -> Self {
        Self::new()
    }
}
