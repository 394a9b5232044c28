//! Block-level grammar rules.
//!
//! Blocks are recognized line by line. Where two constructs could claim the
//! same lines the checks run in this order: setext underline (through the
//! paragraph rule), atx heading, fenced code, indented code, thematic break,
//! blockquote, list, table, paragraph.

use docmark_core::{Block, ListItem};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use super::inline::parse_inlines;

static ATX_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^ {0,3}(#{1,6})(?:[ \t]+(.*?))?[ \t]*$").unwrap());

static CLOSING_HASHES: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:^|[ \t]+)#+$").unwrap());

static SETEXT_UNDERLINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^ {0,3}(={3,}|-{3,})[ \t]*$").unwrap());

static FENCE_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^ {0,3}`{3,}[ \t]*([^`\s]*)[^`]*$").unwrap());

static FENCE_CLOSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^ {0,3}`{3,}[ \t]*$").unwrap());

static LIST_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([ \t]*)([-*+]|\d{1,9}\.)(?:[ \t]+(.*))?$").unwrap());

static TABLE_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[ \t]*\|?(?:[ \t]*:?-+:?[ \t]*\|)*[ \t]*:?-+:?[ \t]*\|?[ \t]*$").unwrap());

/// Deepest nesting of blockquotes and lists; deeper markers are read as
/// text or as items of the innermost list
pub const MAX_BLOCK_NESTING: usize = 32;

/// Parse a sequence of lines into blocks
pub fn parse_blocks(lines: &[&str]) -> Vec<Block> {
    parse_nested(lines, 0)
}

fn parse_nested(lines: &[&str], depth: usize) -> Vec<Block> {
    let mut parser = BlockParser {
        lines,
        pos: 0,
        depth,
    };
    let mut blocks = Vec::new();

    while let Some(block) = parser.block() {
        if !block.is_blank() {
            blocks.push(block);
        }
    }

    blocks
}

struct BlockParser<'l, 'a> {
    lines: &'l [&'a str],
    pos: usize,
    /// Enclosing blockquotes and lists
    depth: usize,
}

/// A recognized list marker
struct Marker<'a> {
    indent: usize,
    ordered: bool,
    content: &'a str,
}

impl<'l, 'a> BlockParser<'l, 'a> {
    /// Parse the next block, or `None` at the end of input
    fn block(&mut self) -> Option<Block> {
        while self.current().is_some_and(is_blank) {
            self.pos += 1;
        }
        let line = self.current()?;

        if let Some(block) = self.atx_heading(line) {
            return Some(block);
        }
        if let Some(block) = self.fenced_code() {
            return Some(block);
        }
        if is_indented(line) {
            return Some(self.indented_code());
        }
        if is_thematic_break(line) {
            self.pos += 1;
            return Some(Block::ThematicBreak);
        }
        if self.at_blockquote(line) {
            return Some(self.blockquote());
        }
        if let Some(marker) = list_marker(line) {
            return Some(self.list(marker.indent, marker.ordered));
        }
        if self.at_table() {
            return Some(self.table());
        }

        Some(self.paragraph())
    }

    fn current(&self) -> Option<&'a str> {
        self.lines.get(self.pos).copied()
    }

    fn nth(&self, n: usize) -> Option<&'a str> {
        self.lines.get(self.pos + n).copied()
    }

    fn atx_heading(&mut self, line: &str) -> Option<Block> {
        let caps = ATX_HEADING.captures(line)?;
        let level = caps.get(1)?.as_str().len() as u8;
        let text = caps.get(2).map_or("", |m| m.as_str());
        let text = CLOSING_HASHES.replace(text, "");

        self.pos += 1;
        Some(Block::Heading {
            level,
            content: parse_inlines(text.trim()),
        })
    }

    fn fenced_code(&mut self) -> Option<Block> {
        let caps = FENCE_OPEN.captures(self.current()?)?;
        let language = caps
            .get(1)
            .map(|m| m.as_str())
            .filter(|lang| !lang.is_empty())
            .map(str::to_string);

        let body_start = self.pos + 1;
        let Some(offset) = self.lines[body_start..]
            .iter()
            .position(|line| FENCE_CLOSE.is_match(line))
        else {
            debug!("unterminated code fence at line {}, kept as text", self.pos + 1);
            return None;
        };

        let close = body_start + offset;
        let code = self.lines[body_start..close].join("\n");
        self.pos = close + 1;

        Some(Block::CodeBlock {
            language,
            code,
            fenced: true,
        })
    }

    /// Indented lines; runs separated only by blank lines merge
    fn indented_code(&mut self) -> Block {
        let mut code_lines: Vec<&str> = Vec::new();
        let mut end = self.pos;

        while let Some(line) = self.lines.get(end).copied() {
            if is_indented(line) {
                code_lines.extend(self.lines[self.pos..end].iter().map(|l| strip_indent(l)));
                code_lines.push(strip_indent(line));
                end += 1;
                self.pos = end;
            } else if is_blank(line) {
                end += 1;
            } else {
                break;
            }
        }

        Block::CodeBlock {
            language: None,
            code: code_lines.join("\n"),
            fenced: false,
        }
    }

    fn blockquote(&mut self) -> Block {
        let mut inner = Vec::new();

        while let Some(line) = self.current().filter(|l| is_blockquote(l)) {
            let rest = line.trim_start().strip_prefix('>').unwrap_or(line);
            inner.push(rest.strip_prefix(' ').unwrap_or(rest));
            self.pos += 1;
        }

        Block::BlockQuote(parse_nested(&inner, self.depth + 1))
    }

    fn at_blockquote(&self, line: &str) -> bool {
        self.depth < MAX_BLOCK_NESTING && is_blockquote(line)
    }

    /// A run of items sharing one marker kind at `base` indentation.
    ///
    /// Items indented at least two columns deeper open a nested list inside
    /// the previous item.
    fn list(&mut self, base: usize, ordered: bool) -> Block {
        let mut items: Vec<(Vec<&'a str>, Vec<Block>)> = Vec::new();

        while let Some(line) = self.current() {
            if is_blank(line) {
                let next = self.next_non_blank();
                if self.list_continues_at(next, base, ordered) {
                    self.pos = next;
                    continue;
                }
                break;
            }

            if let Some(marker) = list_marker(line).filter(|_| !is_thematic_break(line)) {
                if marker.indent < base {
                    break;
                }
                if marker.indent >= base + 2 && self.depth < MAX_BLOCK_NESTING {
                    if let Some((_, children)) = items.last_mut() {
                        self.depth += 1;
                        let nested = self.list(marker.indent, marker.ordered);
                        self.depth -= 1;
                        children.push(nested);
                        continue;
                    }
                }
                if marker.ordered != ordered {
                    break;
                }
                items.push((vec![marker.content], Vec::new()));
                self.pos += 1;
                continue;
            }

            let continues = indentation(line) > base && !self.interrupts_paragraph(line);
            match items.last_mut() {
                Some((text, _)) if continues => {
                    text.push(line.trim_start());
                    self.pos += 1;
                }
                _ => break,
            }
        }

        Block::List {
            ordered,
            items: items
                .into_iter()
                .map(|(text, children)| ListItem {
                    content: parse_inlines(text.join("\n").trim()),
                    children,
                })
                .collect(),
        }
    }

    /// Index of the first non-blank line at or after the current one
    fn next_non_blank(&self) -> usize {
        self.lines[self.pos..]
            .iter()
            .position(|l| !is_blank(l))
            .map_or(self.lines.len(), |offset| self.pos + offset)
    }

    /// Whether the list resumes at line `index` after a run of blank lines
    fn list_continues_at(&self, index: usize, base: usize, ordered: bool) -> bool {
        match self.lines.get(index).and_then(|l| list_marker(l)) {
            Some(marker) => {
                marker.indent > base || (marker.indent == base && marker.ordered == ordered)
            }
            None => false,
        }
    }

    fn at_table(&self) -> bool {
        let (Some(header), Some(separator)) = (self.current(), self.nth(1)) else {
            return false;
        };
        header.contains('|')
            && TABLE_SEPARATOR.is_match(separator)
            && (separator.contains('|') || header.trim_start().starts_with('|'))
    }

    fn table(&mut self) -> Block {
        let headers = split_row(self.lines[self.pos]);
        self.pos += 2;

        let mut rows = Vec::new();
        while let Some(line) = self.current().filter(|l| !is_blank(l) && l.contains('|')) {
            rows.push(split_row(line));
            self.pos += 1;
        }

        Block::Table { headers, rows }
    }

    /// Lines up to a blank line or a block start; a setext underline turns
    /// the collected lines into a heading.
    fn paragraph(&mut self) -> Block {
        let mut text: Vec<&str> = vec![self.lines[self.pos].trim_start()];
        self.pos += 1;

        while let Some(line) = self.current() {
            if let Some(caps) = SETEXT_UNDERLINE.captures(line) {
                self.pos += 1;
                let level = if caps[1].starts_with('=') { 1 } else { 2 };
                return Block::Heading {
                    level,
                    content: parse_inlines(text.join("\n").trim()),
                };
            }
            if is_blank(line) || self.interrupts_paragraph(line) {
                break;
            }
            text.push(line.trim_start());
            self.pos += 1;
        }

        Block::Paragraph(parse_inlines(text.join("\n").trim_end()))
    }

    /// Block starts that end a paragraph or list item text
    fn interrupts_paragraph(&self, line: &str) -> bool {
        ATX_HEADING.is_match(line)
            || FENCE_OPEN.is_match(line)
            || is_thematic_break(line)
            || self.at_blockquote(line)
            || list_marker(line).is_some()
            || self.at_table()
    }
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

fn indentation(line: &str) -> usize {
    line.chars()
        .take_while(|c| c.is_whitespace())
        .map(|c| if c == '\t' { 4 } else { 1 })
        .sum()
}

fn is_indented(line: &str) -> bool {
    !is_blank(line) && (line.starts_with("    ") || line.starts_with('\t'))
}

fn strip_indent(line: &str) -> &str {
    line.strip_prefix("    ")
        .or_else(|| line.strip_prefix('\t'))
        .unwrap_or_else(|| line.trim_start())
}

fn is_blockquote(line: &str) -> bool {
    indentation(line) <= 3 && line.trim_start().starts_with('>')
}

/// 3+ of the same `-`, `*` or `_`, optionally separated by spaces
fn is_thematic_break(line: &str) -> bool {
    if indentation(line) > 3 {
        return false;
    }
    let mut marks = line.chars().filter(|c| !c.is_whitespace());
    let Some(first) = marks.next() else {
        return false;
    };
    matches!(first, '-' | '*' | '_') && {
        let rest: Vec<char> = marks.collect();
        rest.len() >= 2 && rest.iter().all(|&c| c == first)
    }
}

fn list_marker(line: &str) -> Option<Marker<'_>> {
    let caps = LIST_MARKER.captures(line)?;
    let indent = caps.get(1).map_or(0, |m| indentation(m.as_str()));
    let ordered = caps
        .get(2)
        .is_some_and(|m| m.as_str().starts_with(|c: char| c.is_ascii_digit()));
    let content = caps.get(3).map_or("", |m| m.as_str());

    Some(Marker {
        indent,
        ordered,
        content,
    })
}

/// Split a pipe table row into parsed cells; `\|` stays inside a cell
fn split_row(line: &str) -> Vec<Vec<docmark_core::Inline>> {
    let trimmed = line.trim();
    let trimmed = trimmed.strip_prefix('|').unwrap_or(trimmed);
    let trimmed = match trimmed.strip_suffix('|') {
        Some(rest) if !rest.ends_with('\\') => rest,
        _ => trimmed,
    };

    let mut cells = Vec::new();
    let mut cell = String::new();
    let mut chars = trimmed.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'|') => {
                cell.push('|');
                chars.next();
            }
            '|' => cells.push(std::mem::take(&mut cell)),
            _ => cell.push(c),
        }
    }
    cells.push(cell);

    cells.iter().map(|c| parse_inlines(c.trim())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use docmark_core::Inline;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn parse(input: &str) -> Vec<Block> {
        let lines: Vec<&str> = input.lines().collect();
        parse_blocks(&lines)
    }

    fn text(s: &str) -> Vec<Inline> {
        vec![Inline::Text(s.to_string())]
    }

    #[rstest]
    #[case("# One", 1, "One")]
    #[case("### Three ###", 3, "Three")]
    #[case("###### Six", 6, "Six")]
    #[case("Title\n=====", 1, "Title")]
    #[case("Sub\n---", 2, "Sub")]
    fn test_headings(#[case] input: &str, #[case] level: u8, #[case] title: &str) {
        assert_eq!(
            parse(input),
            vec![Block::Heading {
                level,
                content: text(title),
            }]
        );
    }

    #[test]
    fn test_seven_hashes_is_paragraph() {
        assert_eq!(
            parse("####### no"),
            vec![Block::Paragraph(text("####### no"))]
        );
    }

    #[test]
    fn test_fenced_code_keeps_content() {
        assert_eq!(
            parse("```js\nconst a = `<b>` * 2;\n\n# not a heading\n```"),
            vec![Block::CodeBlock {
                language: Some("js".to_string()),
                code: "const a = `<b>` * 2;\n\n# not a heading".to_string(),
                fenced: true,
            }]
        );
    }

    #[test]
    fn test_unterminated_fence_is_text() {
        assert_eq!(
            parse("```\ncode"),
            vec![Block::Paragraph(text("```\ncode"))]
        );
    }

    #[test]
    fn test_indented_code_merges_across_blank_lines() {
        assert_eq!(
            parse("    a\n\n\tb\n\nafter"),
            vec![
                Block::CodeBlock {
                    language: None,
                    code: "a\n\nb".to_string(),
                    fenced: false,
                },
                Block::Paragraph(text("after")),
            ]
        );
    }

    #[rstest]
    #[case("---")]
    #[case("* * *")]
    #[case("___")]
    fn test_thematic_break(#[case] input: &str) {
        assert_eq!(parse(input), vec![Block::ThematicBreak]);
    }

    #[test]
    fn test_blockquote_lines_merge() {
        assert_eq!(
            parse("> one\n> two\n>\n> # h"),
            vec![Block::BlockQuote(vec![
                Block::Paragraph(text("one\ntwo")),
                Block::Heading {
                    level: 1,
                    content: text("h"),
                },
            ])]
        );
    }

    #[test]
    fn test_lists() {
        assert_eq!(
            parse("- a\n* b\n+ c\n\n1. one\n7. two"),
            vec![
                Block::List {
                    ordered: false,
                    items: vec![
                        ListItem::from_inlines(text("a")),
                        ListItem::from_inlines(text("b")),
                        ListItem::from_inlines(text("c")),
                    ],
                },
                Block::List {
                    ordered: true,
                    items: vec![
                        ListItem::from_inlines(text("one")),
                        ListItem::from_inlines(text("two")),
                    ],
                },
            ]
        );
    }

    #[test]
    fn test_nested_list() {
        assert_eq!(
            parse("- a\n  - b\n  - c\n- d"),
            vec![Block::List {
                ordered: false,
                items: vec![
                    ListItem {
                        content: text("a"),
                        children: vec![Block::List {
                            ordered: false,
                            items: vec![
                                ListItem::from_inlines(text("b")),
                                ListItem::from_inlines(text("c")),
                            ],
                        }],
                    },
                    ListItem::from_inlines(text("d")),
                ],
            }]
        );
    }

    #[test]
    fn test_list_item_continuation() {
        assert_eq!(
            parse("- first\n  line\nnext"),
            vec![
                Block::List {
                    ordered: false,
                    items: vec![ListItem::from_inlines(text("first\nline"))],
                },
                Block::Paragraph(text("next")),
            ]
        );
    }

    #[test]
    fn test_table() {
        assert_eq!(
            parse("| A | B |\n| --- | --- |\n| 1 | a\\|b |"),
            vec![Block::Table {
                headers: vec![text("A"), text("B")],
                rows: vec![vec![text("1"), text("a|b")]],
            }]
        );
    }

    #[test]
    fn test_paragraph_interrupted_by_list() {
        assert_eq!(
            parse("intro\n- item"),
            vec![
                Block::Paragraph(text("intro")),
                Block::List {
                    ordered: false,
                    items: vec![ListItem::from_inlines(text("item"))],
                },
            ]
        );
    }

    #[test]
    fn test_deep_blockquote_is_capped() {
        let input = format!("{}x", "> ".repeat(10_000));
        let blocks = parse(&input);

        let mut current = &blocks;
        let mut depth = 0;
        while let [Block::BlockQuote(inner)] = current.as_slice() {
            current = inner;
            depth += 1;
        }

        assert_eq!(depth, MAX_BLOCK_NESTING);
        assert!(matches!(current.as_slice(), [Block::Paragraph(_)]));
    }

    fn list_depth(block: &Block) -> usize {
        match block {
            Block::List { items, .. } => {
                1 + items
                    .iter()
                    .flat_map(|item| &item.children)
                    .map(list_depth)
                    .max()
                    .unwrap_or(0)
            }
            _ => 0,
        }
    }

    #[test]
    fn test_deep_list_is_capped() {
        let input: Vec<String> = (0..2_000)
            .map(|level| format!("{}- x", "  ".repeat(level)))
            .collect();
        let lines: Vec<&str> = input.iter().map(String::as_str).collect();
        let blocks = parse_blocks(&lines);

        assert_eq!(blocks.len(), 1);
        assert_eq!(list_depth(&blocks[0]), MAX_BLOCK_NESTING + 1);
    }

    #[test]
    fn test_list_resumes_after_long_blank_run() {
        let input = format!("- a{}- b", "\n".repeat(10_000));
        assert_eq!(
            parse(&input),
            vec![Block::List {
                ordered: false,
                items: vec![
                    ListItem::from_inlines(text("a")),
                    ListItem::from_inlines(text("b")),
                ],
            }]
        );
    }
}
