//! Inline tokenizer.
//!
//! Breaks the text of one block into a flat token stream using [Logos].
//! Tokens are context-free: the lexer does not know whether `*` opens
//! emphasis or is a literal star, that is decided by the inline grammar.
//! Every byte of the input ends up in exactly one token.
//!
//! [Logos]: https://docs.rs/logos

use logos::Logos;

/// Token kinds produced by the Logos lexer.
///
/// Double delimiters are separate tokens so that `**` always wins over two
/// `*` (longest match), which gives strong emphasis precedence over plain
/// emphasis.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Backslash followed by ASCII punctuation
    #[regex(r"\\[!-/:-@\[-`{-~]")]
    Escape,

    /// Two or more spaces before a line ending
    #[regex(r" {2,}\n")]
    HardBreak,

    #[token("\n")]
    Newline,

    /// Horizontal whitespace (spaces, tabs)
    #[regex(r"[ \t]+")]
    Whitespace,

    #[token("**")]
    StarStar,

    #[token("__")]
    UnderUnder,

    #[token("*")]
    Star,

    #[token("_")]
    Under,

    #[token("~~")]
    TildeTilde,

    #[token("`")]
    Backtick,

    #[token("!")]
    Bang,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    /// Plain text - anything not matched by other rules
    #[regex(r"[^\\*_~`!\[\]() \t\n]+")]
    Text,
}

impl TokenKind {
    pub fn is_whitespace(self) -> bool {
        matches!(
            self,
            TokenKind::Whitespace | TokenKind::Newline | TokenKind::HardBreak
        )
    }
}

/// A lexed token with its kind and text slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
}

/// Lex the input into a sequence of tokens.
///
/// Characters Logos cannot classify (a lone `~` or `\`) become `Text`.
pub fn lex(input: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut lexer = TokenKind::lexer(input);

    while let Some(result) = lexer.next() {
        let kind = result.unwrap_or(TokenKind::Text);
        tokens.push(Token {
            kind,
            text: lexer.slice(),
        });
    }

    tokens
}
