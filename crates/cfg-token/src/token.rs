use cfg_position::Span;
use std::sync::Arc;

/// Identifies which include frame a token's text came from, without
/// borrowing the frame itself — diagnostics resolve it by walking the
/// include stack from the top down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameId(pub u32);

/// A token's full location: byte-accurate span plus the frame it was read
/// from, matching `(first_line, first_column, last_line, last_column,
/// frame)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub span: Span,
    pub frame: FrameId,
}

/// Tagged token kind produced by the lexer and consumed by the grammar.
///
/// `Identifier`, `String`, and `Block` text is stored in an `Arc<str>` so
/// lookahead and checkpoint/restore can clone tokens cheaply.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// A recognized keyword, carrying the grammar's token id for that
    /// keyword (not its spelling — the spelling is still in the frame's
    /// keyword table, not duplicated onto every token).
    Keyword(u32),
    /// A bareword that didn't match any keyword in the active context.
    Identifier(Arc<str>),
    /// A double- or apostrophe-quoted string literal, already unescaped.
    String(Arc<str>),
    /// An integer literal.
    Number(i64),
    /// A floating-point literal.
    Float(f64),
    /// Balanced `{...}` or `(...)` content captured for later re-lexing,
    /// e.g. a user-defined block's body.
    Block(Arc<str>),
    /// A single-character punctuation token (`;`, `(`, `{`, ...).
    Punctuation(char),
    /// End of input on the active frame stack.
    Eof,
    /// A synthetic error token returned in place of `longjmp`-style
    /// unwinding: the grammar sees this, reports the message, and frees
    /// whatever partial tree it had built.
    Error(Arc<str>),
}

/// A lexed token: its kind plus where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub location: Location,
}

impl Token {
    pub fn new(kind: TokenKind, location: Location) -> Self {
        Token { kind, location }
    }

    pub fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }

    pub fn is_error(&self) -> bool {
        matches!(self.kind, TokenKind::Error(_))
    }
}
