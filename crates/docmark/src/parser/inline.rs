//! # Inline-Level Grammar
//!
//! Inline elements are the formatting within blocks. Parsing is driven by the
//! delimiter tokens of the [lexer](super::lexer):
//!
//! | Token | Possible Element |
//! |-------|-----------------|
//! | `**` `__` | Strong |
//! | `*` `_` | Emphasis |
//! | `~~` | Strikethrough |
//! | `` ` `` | Code span |
//! | `!` `[` | Image |
//! | `[` | Link |
//! | `\` + punctuation | Literal character |
//!
//! Strong delimiters are lexed as their own tokens, so a `**` run is never
//! read as two emphasis markers. Images are tried before links because an
//! image is a link with a leading `!`.
//!
//! ## Error Tolerance
//!
//! Every opener is parsed speculatively. If the matching closer is not found
//! before the end of the block, or an enclosing construct closes first, the
//! parse is rolled back and the opener is kept as literal text. Failed
//! positions are remembered so rollback never repeats the same work.
//!
//! Two bounds keep hostile input linear-ish:
//!
//! - openers nested deeper than [`MAX_NESTING`] are literal text
//! - once a search for a closer of some kind has run off the end of the
//!   block, later openers of that kind are literal without searching again

use std::collections::{HashMap, HashSet};

use docmark_core::{push_text, Inline};
use log::debug;

use super::lexer::{lex, Token, TokenKind};

/// Deepest nesting of open delimiters and link brackets
pub const MAX_NESTING: usize = 32;

/// Parse the text of one block into inline nodes
pub fn parse_inlines(text: &str) -> Vec<Inline> {
    let tokens = lex(text);
    let mut parser = InlineParser {
        tokens,
        pos: 0,
        failed: HashSet::new(),
        closed: HashMap::new(),
        unclosed: HashMap::new(),
    };
    let mut stack = Vec::new();
    parser.parse_until(&mut stack).unwrap_or_default()
}

/// Why a nested parse gave up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stop {
    /// The block ended with the closer still missing
    EndOfInput,
    /// A closer of an enclosing construct came first
    OuterCloser,
}

struct InlineParser<'a> {
    tokens: Vec<Token<'a>>,
    pos: usize,
    /// Opener positions already rolled back to literal text
    failed: HashSet<usize>,
    /// Last position where a closer of each kind was consumed
    closed: HashMap<TokenKind, usize>,
    /// Per closer kind, the position from which no closer follows
    unclosed: HashMap<TokenKind, usize>,
}

impl<'a> InlineParser<'a> {
    /// Parse until the innermost closer on `stack` is consumed.
    ///
    /// Fails when the input ends first or when a closer belonging to an
    /// enclosing construct shows up. With an empty stack the whole input is
    /// consumed.
    fn parse_until(&mut self, stack: &mut Vec<TokenKind>) -> Result<Vec<Inline>, Stop> {
        let mut out = Vec::new();

        while let Some(token) = self.tokens.get(self.pos).copied() {
            let kind = token.kind;

            if stack.contains(&kind) && self.can_close(kind) {
                if stack.last() == Some(&kind) {
                    self.note_closed(kind, self.pos);
                    self.pos += 1;
                    return Ok(out);
                }
                return Err(Stop::OuterCloser);
            }

            match kind {
                TokenKind::StarStar
                | TokenKind::UnderUnder
                | TokenKind::Star
                | TokenKind::Under
                | TokenKind::TildeTilde => self.delimited(kind, stack, &mut out),
                TokenKind::Backtick => self.code_span(&mut out),
                TokenKind::Bang if self.nth_kind(1) == Some(TokenKind::LBracket) => {
                    self.image(&mut out)
                }
                TokenKind::LBracket => self.link(stack, &mut out),
                TokenKind::Escape => {
                    push_text(&mut out, &token.text[1..]);
                    self.pos += 1;
                }
                TokenKind::HardBreak => {
                    out.push(Inline::LineBreak);
                    self.pos += 1;
                }
                _ => {
                    push_text(&mut out, token.text);
                    self.pos += 1;
                }
            }
        }

        if stack.is_empty() {
            Ok(out)
        } else {
            Err(Stop::EndOfInput)
        }
    }

    /// Whether an opener at the current position is worth a nested parse
    fn may_open(&self, closer: TokenKind, stack: &[TokenKind]) -> bool {
        let start = self.pos;
        if self.failed.contains(&start) || stack.len() >= MAX_NESTING {
            return false;
        }
        !self.closer_missing(closer, start)
    }

    /// A closer search from an opener at or before `start` already found nothing
    fn closer_missing(&self, closer: TokenKind, start: usize) -> bool {
        self.unclosed.get(&closer).is_some_and(|&from| from <= start)
    }

    fn note_closed(&mut self, closer: TokenKind, at: usize) {
        let last = self.closed.entry(closer).or_insert(at);
        *last = (*last).max(at);
    }

    /// Remember that a closer search from `start` ran off the end.
    ///
    /// Closers consumed by nested spans were passed over, so the claim only
    /// holds past the last of them.
    fn mark_unclosed(&mut self, closer: TokenKind, start: usize) {
        let start = self
            .closed
            .get(&closer)
            .map_or(start, |&last| last.max(start));
        let from = self.unclosed.entry(closer).or_insert(start);
        *from = (*from).min(start);
    }

    /// Strong, emphasis or strikethrough
    fn delimited(&mut self, kind: TokenKind, stack: &mut Vec<TokenKind>, out: &mut Vec<Inline>) {
        let start = self.pos;
        let opener = self.tokens[start].text;

        if !self.may_open(kind, stack) || !self.can_open(kind) {
            push_text(out, opener);
            self.pos += 1;
            return;
        }

        self.pos += 1;
        stack.push(kind);
        let inner = self.parse_until(stack);
        stack.pop();

        match inner {
            Ok(content) if !content.is_empty() => out.push(match kind {
                TokenKind::StarStar | TokenKind::UnderUnder => Inline::Strong(content),
                TokenKind::TildeTilde => Inline::Strikethrough(content),
                _ => Inline::Emphasis(content),
            }),
            inner => {
                if matches!(inner, Err(Stop::EndOfInput)) {
                    self.mark_unclosed(kind, start);
                }
                debug!("unmatched inline delimiter {opener:?} kept as text");
                self.failed.insert(start);
                self.pos = start + 1;
                push_text(out, opener);
            }
        }
    }

    /// Backtick code span; content is taken verbatim
    fn code_span(&mut self, out: &mut Vec<Inline>) {
        let start = self.pos;
        let close = self.tokens[start + 1..]
            .iter()
            .position(|t| t.kind == TokenKind::Backtick)
            .map(|offset| start + 1 + offset);

        match close {
            Some(end) if end > start + 1 => {
                let code = self.concat(start + 1, end);
                out.push(Inline::Code(code));
                self.pos = end + 1;
            }
            _ => {
                push_text(out, "`");
                self.pos += 1;
            }
        }
    }

    /// `![alt](src)`; on failure the `!` is literal and `[` is reparsed
    fn image(&mut self, out: &mut Vec<Inline>) {
        let start = self.pos;
        let alt_start = start + 2;
        let close = if self.closer_missing(TokenKind::RBracket, start) {
            None
        } else {
            let close = self.tokens[alt_start..]
                .iter()
                .position(|t| t.kind == TokenKind::RBracket)
                .map(|offset| alt_start + offset);
            if close.is_none() {
                self.mark_unclosed(TokenKind::RBracket, start);
            }
            close
        };

        if let Some(end) = close {
            self.pos = end + 1;
            if let Some(url) = self.destination() {
                self.note_closed(TokenKind::RBracket, end);
                let alt = self.unescaped(alt_start, end);
                out.push(Inline::Image { alt, url });
                return;
            }
        }

        self.pos = start + 1;
        push_text(out, "!");
    }

    /// `[text](href)`; reference-style `[text][id]` stays literal
    fn link(&mut self, stack: &mut Vec<TokenKind>, out: &mut Vec<Inline>) {
        let start = self.pos;

        if self.may_open(TokenKind::RBracket, stack) {
            self.pos += 1;
            stack.push(TokenKind::RBracket);
            let content = self.parse_until(stack);
            stack.pop();

            match content {
                Ok(content) => {
                    if let Some(url) = self.destination() {
                        out.push(Inline::Link { content, url });
                        return;
                    }
                }
                Err(Stop::EndOfInput) => self.mark_unclosed(TokenKind::RBracket, start),
                Err(Stop::OuterCloser) => {}
            }

            self.failed.insert(start);
        }

        self.pos = start + 1;
        push_text(out, "[");
    }

    /// `(url)` directly at the current position
    fn destination(&mut self) -> Option<String> {
        if self.nth_kind(0) != Some(TokenKind::LParen) {
            return None;
        }

        let open = self.pos;
        let mut end = open + 1;
        loop {
            match self.tokens.get(end)?.kind {
                TokenKind::RParen => break,
                TokenKind::Newline | TokenKind::HardBreak | TokenKind::LParen => return None,
                _ => end += 1,
            }
        }

        let url = self.unescaped(open + 1, end).trim().to_string();
        self.pos = end + 1;
        Some(url)
    }

    fn can_open(&self, kind: TokenKind) -> bool {
        let Some(next) = self.tokens.get(self.pos + 1) else {
            return false;
        };
        if next.kind.is_whitespace() {
            return false;
        }
        !(is_underscore(kind) && self.intraword())
    }

    fn can_close(&self, kind: TokenKind) -> bool {
        if kind == TokenKind::RBracket {
            return true;
        }
        if !is_delimiter(kind) {
            return false;
        }
        let Some(prev) = self.pos.checked_sub(1).and_then(|i| self.tokens.get(i)) else {
            return false;
        };
        if prev.kind.is_whitespace() {
            return false;
        }
        !(is_underscore(kind) && self.intraword())
    }

    /// True when the current token sits between two alphanumerics
    fn intraword(&self) -> bool {
        let before = self
            .pos
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .and_then(|t| t.text.chars().last());
        let after = self
            .tokens
            .get(self.pos + 1)
            .and_then(|t| t.text.chars().next());

        matches!((before, after), (Some(b), Some(a)) if b.is_alphanumeric() && a.is_alphanumeric())
    }

    fn nth_kind(&self, n: usize) -> Option<TokenKind> {
        self.tokens.get(self.pos + n).map(|t| t.kind)
    }

    fn concat(&self, from: usize, to: usize) -> String {
        self.tokens[from..to].iter().map(|t| t.text).collect()
    }

    fn unescaped(&self, from: usize, to: usize) -> String {
        self.tokens[from..to]
            .iter()
            .map(|t| match t.kind {
                TokenKind::Escape => &t.text[1..],
                _ => t.text,
            })
            .collect()
    }
}

fn is_delimiter(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::StarStar
            | TokenKind::UnderUnder
            | TokenKind::Star
            | TokenKind::Under
            | TokenKind::TildeTilde
    )
}

fn is_underscore(kind: TokenKind) -> bool {
    matches!(kind, TokenKind::Under | TokenKind::UnderUnder)
}
