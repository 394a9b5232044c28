//! Rule system for tree to Markdown serialization.

mod commonmark;
mod rule;

pub use commonmark::commonmark_rules;
pub use rule::{Filter, Frame, ReplacementFn, Rule};

use docmark_core::{ExportConfig, NodeRef};
use indexmap::IndexMap;

/// Collection of rules for conversion
pub struct Rules {
    /// Custom rules added by the host (checked first)
    custom_rules: IndexMap<String, Rule>,
    /// Keep rules (emit as raw markup)
    keep_rules: Vec<Filter>,
    /// Remove rules (drop entirely)
    remove_rules: Vec<Filter>,
    /// Built-in CommonMark rules
    commonmark_rules: Vec<Rule>,
}

impl Rules {
    /// Create a new Rules instance with CommonMark rules
    pub fn new() -> Self {
        Self {
            custom_rules: IndexMap::new(),
            keep_rules: Vec::new(),
            remove_rules: Vec::new(),
            commonmark_rules: commonmark_rules(),
        }
    }

    /// Add a custom rule; re-adding a key replaces the rule in place
    pub fn add(&mut self, key: &str, rule: Rule) {
        self.custom_rules.insert(key.to_string(), rule);
    }

    /// Add a keep filter
    pub fn keep(&mut self, filter: Filter) {
        self.keep_rules.push(filter);
    }

    /// Add a remove filter
    pub fn remove(&mut self, filter: Filter) {
        self.remove_rules.push(filter);
    }

    /// Find the appropriate rule for a node
    pub fn for_node<'a>(&'a self, node: &NodeRef, config: &ExportConfig) -> Option<&'a Rule> {
        let tag = node.tag_name();

        self.custom_rules
            .values()
            .chain(self.commonmark_rules.iter())
            .find(|rule| rule.filter.matches(tag, node, config))
    }

    /// Check if a node should be kept as raw markup
    pub fn should_keep(&self, node: &NodeRef, config: &ExportConfig) -> bool {
        // Don't keep if a custom or commonmark rule matches
        if self.for_node(node, config).is_some() {
            return false;
        }

        let tag = node.tag_name();
        self.keep_rules
            .iter()
            .any(|filter| filter.matches(tag, node, config))
    }

    /// Check if a node should be removed
    pub fn should_remove(&self, node: &NodeRef, config: &ExportConfig) -> bool {
        if self.for_node(node, config).is_some() || self.should_keep(node, config) {
            return false;
        }

        let tag = node.tag_name();
        self.remove_rules
            .iter()
            .any(|filter| filter.matches(tag, node, config))
    }
}

impl Default for Rules {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docmark_core::Document;

    #[test]
    fn test_builtin_and_custom_precedence() {
        let mut doc = Document::new();
        let strong = doc.append_element(doc.root(), "strong").unwrap();
        let node = doc.node(strong);
        let config = ExportConfig::default();

        let mut rules = Rules::new();
        let builtin = rules.for_node(&node, &config).unwrap();
        assert_eq!(builtin.replace(&node, "x", &config, Frame::default()), "**x**");

        rules.add(
            "loud",
            Rule::for_tag("strong", |_, content, _, _| content.to_uppercase()),
        );
        let custom = rules.for_node(&node, &config).unwrap();
        assert_eq!(custom.replace(&node, "x", &config, Frame::default()), "X");
    }

    #[test]
    fn test_keep_and_remove_yield_to_rules() {
        let mut doc = Document::new();
        let mark = doc.append_element(doc.root(), "mark").unwrap();
        let em = doc.append_element(doc.root(), "em").unwrap();
        let script = doc.append_element(doc.root(), "script").unwrap();
        let config = ExportConfig::default();

        let mut rules = Rules::new();
        rules.keep(Filter::tags(&["mark", "em"]));
        rules.remove(Filter::tags(&["script", "mark"]));

        assert!(rules.should_keep(&doc.node(mark), &config));
        assert!(!rules.should_keep(&doc.node(em), &config));
        assert!(!rules.should_remove(&doc.node(mark), &config));
        assert!(rules.should_remove(&doc.node(script), &config));
    }
}
