//! Utility functions for tree serialization.

use docmark_core::NodeRef;

/// Elements whose whitespace-only text children are formatting, not content
const STRUCTURAL_ELEMENTS: &[&str] = &["ul", "ol", "table", "thead", "tbody", "tfoot", "tr"];

/// Check if a tag is a list container
pub fn is_list(tag: &str) -> bool {
    matches!(tag, "ul" | "ol")
}

/// Check if whitespace-only text under `tag` is dropped
pub fn is_structural(tag: &str) -> bool {
    STRUCTURAL_ELEMENTS.contains(&tag)
}

/// Clean an attribute value (trim and handle empty)
pub fn clean_attribute(value: Option<&str>) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_default()
}

/// Language named by a `language-*` class token
pub fn code_language(node: &NodeRef) -> Option<String> {
    node.attr("class")?
        .split_whitespace()
        .find_map(|class| class.strip_prefix("language-"))
        .filter(|lang| !lang.is_empty())
        .map(str::to_string)
}

/// Nearest `table` ancestor
pub fn enclosing_table<'a>(node: &NodeRef<'a>) -> Option<NodeRef<'a>> {
    let mut current = node.parent();
    while let Some(parent) = current {
        if parent.tag_name() == "table" {
            return Some(parent);
        }
        current = parent.parent();
    }
    None
}

/// Append `chunk` to `output`, keeping at most one blank line between them.
///
/// Newlines at the seam are merged: the separator is the larger of the
/// trailing newlines of `output` and the leading newlines of `chunk`, capped
/// at two. Text away from the seam, code block bodies included, is never
/// touched.
pub fn join(output: &mut String, chunk: &str) {
    if chunk.is_empty() {
        return;
    }

    let trailing = output.len() - output.trim_end_matches('\n').len();
    let body = chunk.trim_start_matches('\n');
    let leading = chunk.len() - body.len();
    let separator = trailing.max(leading).min(2);

    output.truncate(output.len() - trailing);
    output.push_str(&"\n".repeat(separator));
    output.push_str(body);
}

/// Collapse whitespace runs into single spaces
#[cfg(feature = "html")]
pub fn collapse_whitespace(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut prev_was_whitespace = false;

    for c in s.chars() {
        if c.is_whitespace() {
            if !prev_was_whitespace {
                result.push(' ');
                prev_was_whitespace = true;
            }
        } else {
            result.push(c);
            prev_was_whitespace = false;
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use docmark_core::Document;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("a", "b", "ab")]
    #[case("a\n\n", "\n\nb", "a\n\nb")]
    #[case("a\n", "b", "a\nb")]
    #[case("a", "\n\n\n\nb\n", "a\n\nb\n")]
    #[case("", "\n\nb", "\n\nb")]
    #[case("a\n\n", "", "a\n\n")]
    fn test_join(#[case] output: &str, #[case] chunk: &str, #[case] expected: &str) {
        let mut out = output.to_string();
        join(&mut out, chunk);
        assert_eq!(out, expected);
    }

    #[test]
    fn test_join_leaves_inner_newlines() {
        let mut out = "x".to_string();
        join(&mut out, "\n\n```\na\n\n\n\nb\n```\n\n");
        assert_eq!(out, "x\n\n```\na\n\n\n\nb\n```\n\n");
    }

    #[test]
    fn test_clean_attribute() {
        assert_eq!(clean_attribute(Some("  url ")), "url");
        assert_eq!(clean_attribute(Some("   ")), "");
        assert_eq!(clean_attribute(None), "");
    }

    #[test]
    fn test_code_language() {
        let mut doc = Document::new();
        let code = doc
            .append_element_with_attrs(doc.root(), "code", [("class", "hljs language-rust")])
            .unwrap();
        let plain = doc.append_element(doc.root(), "code").unwrap();

        assert_eq!(code_language(&doc.node(code)), Some("rust".to_string()));
        assert_eq!(code_language(&doc.node(plain)), None);
    }

    #[cfg(feature = "html")]
    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace(" a \n\t b "), " a b ");
    }
}
