//! CommonMark rules for tree to Markdown serialization.

use docmark_core::{CodeBlockStyle, HeadingStyle, LinkStyle, NodeRef};

use super::{Filter, Rule};
use crate::utilities::{clean_attribute, code_language, enclosing_table};

/// Create all CommonMark rules
pub fn commonmark_rules() -> Vec<Rule> {
    vec![
        paragraph_rule(),
        line_break_rule(),
        heading_rule(),
        blockquote_rule(),
        list_rule(),
        list_item_rule(),
        indented_code_block_rule(),
        fenced_code_block_rule(),
        horizontal_rule(),
        table_rule(),
        table_row_rule(),
        table_cell_rule(),
        inline_link_rule(),
        reference_link_rule(),
        emphasis_rule(),
        strong_rule(),
        strikethrough_rule(),
        underline_rule(),
        code_rule(),
        image_rule(),
    ]
}

fn paragraph_rule() -> Rule {
    Rule::for_tag("p", |_, content, _, _| {
        let content = content.trim();
        if content.is_empty() {
            return String::new();
        }
        format!("\n\n{}\n\n", content)
    })
}

fn line_break_rule() -> Rule {
    Rule::for_tag("br", |_, _, _, _| "  \n".to_string())
}

fn heading_rule() -> Rule {
    Rule::for_tags(
        &["h1", "h2", "h3", "h4", "h5", "h6"],
        |node, content, config, _| {
            let level: usize = node.tag_name()[1..].parse().unwrap_or(1);

            let content = content.trim();
            if content.is_empty() {
                return String::new();
            }

            match config.heading_style {
                HeadingStyle::Setext if level <= 2 => {
                    let underline = if level == 1 { "=" } else { "-" };
                    format!(
                        "\n\n{}\n{}\n\n",
                        content,
                        underline.repeat(content.chars().count())
                    )
                }
                _ => format!("\n\n{} {}\n\n", "#".repeat(level), content),
            }
        },
    )
}

fn blockquote_rule() -> Rule {
    Rule::for_tag("blockquote", |_, content, _, _| {
        let content = content.trim_matches('\n');
        if content.trim().is_empty() {
            return String::new();
        }
        let quoted: Vec<String> = content
            .lines()
            .map(|line| {
                if line.is_empty() {
                    ">".to_string()
                } else {
                    format!("> {}", line)
                }
            })
            .collect();
        format!("\n\n{}\n\n", quoted.join("\n"))
    })
}

fn list_rule() -> Rule {
    Rule::for_tags(&["ul", "ol"], |_, content, _, frame| {
        let content = content.trim_matches('\n');
        if content.is_empty() {
            return String::new();
        }

        if frame.list_depth > 0 {
            // Nested lists hang off the item line without a blank line
            format!("\n{}\n", content)
        } else {
            format!("\n\n{}\n\n", content)
        }
    })
}

fn list_item_rule() -> Rule {
    Rule::for_tag("li", |node, content, config, frame| {
        let depth = frame.list_depth.saturating_sub(1);
        let indent = "  ".repeat(depth);
        let child_indent = "  ".repeat(depth + 1);

        let prefix = match node.parent_tag() {
            Some("ol") => format!("{}. ", node.index_among("li")),
            _ => format!("{} ", config.bullet_list_marker.as_char()),
        };

        let mut lines = content
            .trim_matches('\n')
            .lines()
            .filter(|line| !line.trim().is_empty())
            .peekable();

        // An item opening with a nested list keeps the marker on its own line
        let opens_with_list = content.trim_start_matches([' ', '\t']).starts_with('\n')
            && lines.peek().is_some_and(|line| line.starts_with(&child_indent));

        let mut item = if opens_with_list {
            format!("{}{}", indent, prefix.trim_end())
        } else {
            format!(
                "{}{}{}",
                indent,
                prefix,
                lines.next().map(str::trim_start).unwrap_or("")
            )
        };
        for line in lines {
            item.push('\n');
            // Nested list lines already carry their own indentation
            if line.starts_with(&child_indent) {
                item.push_str(line);
            } else {
                item.push_str(&child_indent);
                item.push_str(line.trim_start());
            }
        }
        item.push('\n');
        item
    })
}

/// Code text and fence language of a `pre` element
fn code_block_parts(node: &NodeRef) -> (String, String) {
    let code_node = node.descendants().find(|c| c.tag_name() == "code");

    let code = code_node
        .map(|c| c.text_content())
        .unwrap_or_else(|| node.text_content());
    let language = code_node
        .and_then(|c| code_language(&c))
        .or_else(|| code_language(node))
        .unwrap_or_default();

    (code.trim_end_matches('\n').to_string(), language)
}

fn indented_code_block_rule() -> Rule {
    Rule::new(
        Filter::predicate(|tag, _, config| {
            tag == "pre" && config.code_block_style == CodeBlockStyle::Indented
        }),
        |node, _, _, _| {
            let (code, _) = code_block_parts(node);
            if code.is_empty() {
                return String::new();
            }

            let indented: Vec<String> = code.lines().map(|line| format!("    {}", line)).collect();
            format!("\n\n{}\n\n", indented.join("\n"))
        },
    )
}

fn fenced_code_block_rule() -> Rule {
    Rule::new(
        Filter::predicate(|tag, _, config| {
            tag == "pre" && config.code_block_style == CodeBlockStyle::Fenced
        }),
        |node, _, _, _| {
            let (code, language) = code_block_parts(node);
            format!("\n\n```{}\n{}\n```\n\n", language, code)
        },
    )
}

fn horizontal_rule() -> Rule {
    Rule::for_tag("hr", |_, _, _, _| "\n\n---\n\n".to_string())
}

fn table_rule() -> Rule {
    Rule::for_tag("table", |_, content, _, _| {
        let content = content.trim_matches('\n');
        if content.is_empty() {
            return String::new();
        }
        format!("\n\n{}\n\n", content)
    })
}

/// The first row of a table is its header
fn is_header_row(node: &NodeRef) -> bool {
    match enclosing_table(node) {
        Some(table) => table
            .descendants()
            .find(|n| n.tag_name() == "tr")
            .is_some_and(|first| first.id() == node.id()),
        None => node.index_among("tr") == 1,
    }
}

fn table_row_rule() -> Rule {
    Rule::for_tag("tr", |node, content, _, _| {
        let mut row = format!("|{}", content.trim_matches('\n'));

        if is_header_row(node) {
            let columns = node
                .element_children()
                .filter(|cell| matches!(cell.tag_name(), "th" | "td"))
                .count();
            row.push_str("\n|");
            row.push_str(&" --- |".repeat(columns));
        }

        format!("\n{}\n", row)
    })
}

fn table_cell_rule() -> Rule {
    Rule::for_tags(&["th", "td"], |_, content, _, _| {
        format!(" {} |", content.trim().replace('\n', " ").replace('|', "\\|"))
    })
}

fn inline_link_rule() -> Rule {
    Rule::new(
        Filter::predicate(|tag, _, config| tag == "a" && config.link_style == LinkStyle::Inline),
        |node, content, _, _| {
            let href = clean_attribute(node.attr("href"));
            if href.is_empty() {
                return content.to_string();
            }
            format!("[{}]({})", content, href)
        },
    )
}

fn reference_link_rule() -> Rule {
    Rule::new(
        Filter::predicate(|tag, _, config| {
            tag == "a" && config.link_style == LinkStyle::Reference
        }),
        |node, content, _, _| {
            let href = clean_attribute(node.attr("href"));
            if href.is_empty() {
                return content.to_string();
            }
            // The text doubles as the label; no definitions section is written
            format!("[{}][{}]", content, content)
        },
    )
}

fn emphasis_rule() -> Rule {
    Rule::for_tags(&["em", "i"], |_, content, _, _| wrap(content, "*"))
}

fn strong_rule() -> Rule {
    Rule::for_tags(&["strong", "b"], |_, content, _, _| wrap(content, "**"))
}

fn strikethrough_rule() -> Rule {
    Rule::for_tags(&["s", "del", "strike"], |_, content, _, _| wrap(content, "~~"))
}

fn underline_rule() -> Rule {
    Rule::for_tag("u", |_, content, _, _| {
        if content.trim().is_empty() {
            return String::new();
        }
        format!("<u>{}</u>", content)
    })
}

fn wrap(content: &str, delimiter: &str) -> String {
    if content.trim().is_empty() {
        return String::new();
    }
    format!("{delimiter}{content}{delimiter}")
}

fn code_rule() -> Rule {
    Rule::new(
        Filter::predicate(|tag, node, _| tag == "code" && node.parent_tag() != Some("pre")),
        |node, _, _, _| {
            let code = node.text_content();
            if code.is_empty() {
                return String::new();
            }
            format!("`{}`", code)
        },
    )
}

fn image_rule() -> Rule {
    Rule::for_tag("img", |node, _, _, _| {
        let alt = clean_attribute(node.attr("alt"));
        let src = clean_attribute(node.attr("src"));

        if src.is_empty() {
            return String::new();
        }

        format!("![{}]({})", alt, src)
    })
}
