//! Text escaping for both conversion directions.

/// Characters that carry meaning in Markdown and are backslash-escaped when
/// plain text is exported.
pub const MARKDOWN_SPECIAL: &[char] = &[
    '\\', '`', '*', '_', '{', '}', '[', ']', '(', ')', '#', '+', '-', '.', '!',
];

/// Backslash-escape Markdown special characters in plain text.
pub fn escape_for_export(text: &str) -> String {
    let mut result = String::with_capacity(text.len());

    for c in text.chars() {
        if MARKDOWN_SPECIAL.contains(&c) {
            result.push('\\');
        }
        result.push(c);
    }

    result
}

/// Escape the characters that markup reserves (`&`, `<`, `>`).
///
/// Applied to text whenever a document tree is rendered back to markup, so
/// literal user text never turns into structure.
pub fn escape_for_import(text: &str) -> String {
    let mut result = String::with_capacity(text.len());

    for c in text.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            _ => result.push(c),
        }
    }

    result
}

/// Escape an attribute value for a double-quoted markup attribute.
pub fn escape_attribute(value: &str) -> String {
    escape_for_import(value).replace('"', "&quot;")
}
