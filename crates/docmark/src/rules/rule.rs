//! Rule and Filter types for tree serialization.

use docmark_core::{ExportConfig, NodeRef};

/// Position of the walk when a rule is applied
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Frame {
    /// Number of `ul`/`ol` elements enclosing the node
    pub list_depth: usize,
    /// Inside `code` or `pre`: text is taken verbatim
    pub in_code: bool,
}

impl Frame {
    /// Frame for the children of an element with `tag`
    pub fn enter(self, tag: &str) -> Self {
        match tag {
            "ul" | "ol" => Self {
                list_depth: self.list_depth + 1,
                ..self
            },
            "code" | "pre" => Self {
                in_code: true,
                ..self
            },
            _ => self,
        }
    }
}

/// Type alias for replacement functions
pub type ReplacementFn =
    Box<dyn Fn(&NodeRef, &str, &ExportConfig, Frame) -> String + Send + Sync>;

/// A filter determines which elements a rule applies to
pub enum Filter {
    /// Match a single tag name
    TagName(String),
    /// Match any of multiple tag names
    TagNames(Vec<String>),
    /// Match using a predicate function
    Predicate(Box<dyn Fn(&str, &NodeRef, &ExportConfig) -> bool + Send + Sync>),
}

impl Filter {
    /// Create a filter for a single tag
    pub fn tag(name: &str) -> Self {
        Filter::TagName(name.to_lowercase())
    }

    /// Create a filter for multiple tags
    pub fn tags(names: &[&str]) -> Self {
        Filter::TagNames(names.iter().map(|s| s.to_lowercase()).collect())
    }

    /// Create a filter with a predicate
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&str, &NodeRef, &ExportConfig) -> bool + Send + Sync + 'static,
    {
        Filter::Predicate(Box::new(f))
    }

    /// Check if this filter matches an element
    pub fn matches(&self, tag: &str, node: &NodeRef, config: &ExportConfig) -> bool {
        match self {
            Filter::TagName(t) => tag == t.as_str(),
            Filter::TagNames(tags) => tags.iter().any(|t| t == tag),
            Filter::Predicate(f) => f(tag, node, config),
        }
    }
}

/// A rule defines how to turn a matched element into Markdown
pub struct Rule {
    /// Filter to determine which elements this rule applies to
    pub filter: Filter,
    /// Replacement function that generates Markdown
    pub replacement: ReplacementFn,
}

impl Rule {
    /// Create a new rule
    pub fn new<F>(filter: Filter, replacement: F) -> Self
    where
        F: Fn(&NodeRef, &str, &ExportConfig, Frame) -> String + Send + Sync + 'static,
    {
        Self {
            filter,
            replacement: Box::new(replacement),
        }
    }

    /// Create a rule that matches a single tag
    pub fn for_tag<F>(tag: &str, replacement: F) -> Self
    where
        F: Fn(&NodeRef, &str, &ExportConfig, Frame) -> String + Send + Sync + 'static,
    {
        Self::new(Filter::tag(tag), replacement)
    }

    /// Create a rule that matches multiple tags
    pub fn for_tags<F>(tags: &[&str], replacement: F) -> Self
    where
        F: Fn(&NodeRef, &str, &ExportConfig, Frame) -> String + Send + Sync + 'static,
    {
        Self::new(Filter::tags(tags), replacement)
    }

    /// Apply this rule's replacement
    pub fn replace(
        &self,
        node: &NodeRef,
        content: &str,
        config: &ExportConfig,
        frame: Frame,
    ) -> String {
        (self.replacement)(node, content, config, frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docmark_core::Document;

    #[test]
    fn test_filters() {
        let mut doc = Document::new();
        let id = doc.append_element(doc.root(), "B").unwrap();
        let node = doc.node(id);
        let config = ExportConfig::default();

        assert!(Filter::tag("b").matches(node.tag_name(), &node, &config));
        assert!(Filter::tags(&["STRONG", "B"]).matches("b", &node, &config));
        assert!(!Filter::tag("i").matches("b", &node, &config));
        assert!(Filter::predicate(|tag, _, _| tag.len() == 1).matches("b", &node, &config));
    }

    #[test]
    fn test_frame_enter() {
        let frame = Frame::default().enter("ul").enter("li").enter("ol");
        assert_eq!(frame.list_depth, 2);
        assert!(!frame.in_code);
        assert!(frame.enter("pre").in_code);
    }
}
