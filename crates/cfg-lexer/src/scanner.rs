//! The raw byte-level scanner: turns the active include frame's bytes into
//! [`RawToken`]s, with no knowledge of context, keywords, or plug-ins.
//!
//! Two scanning modes exist. The default mode recognizes `@pragma` markers,
//! identifiers, numbers, quoted strings, and single-character punctuation.
//! [`ByteStream::scan_balanced`] is the other mode, entered only when the
//! active [`ContextType`](cfg_context::ContextType) is block content or a
//! block argument tuple: it captures everything up to the matching closing
//! delimiter verbatim, for the caller to re-interpret.
//!
//! Every text-accumulating scan below builds its result as raw bytes and
//! decodes to UTF-8 only once, at the point a token is finished — a plain
//! `u8 as char` cast on each byte would instead reinterpret any byte ≥ 0x80
//! as its own Unicode scalar value and re-encode it, corrupting non-ASCII
//! config content.

use cfg_context::ContextType;
use cfg_include::IncludeStack;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum RawToken {
    Pragma(String),
    Identifier(String),
    String(String),
    Apostrophe(String),
    Number(i64),
    Float(f64),
    Block(String),
    Punctuation(char),
    Eof,
    Error(String),
}

fn decode(bytes: Vec<u8>) -> String {
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Wraps [`IncludeStack`] with one byte of lookahead and records the exact
/// bytes consumed since the last reset, for the preprocess sink.
pub(crate) struct ByteStream {
    lookahead: Option<u8>,
}

impl ByteStream {
    pub(crate) fn new() -> Self {
        ByteStream { lookahead: None }
    }

    fn raw_next(&mut self, include: &mut IncludeStack) -> Option<u8> {
        if let Some(byte) = self.lookahead.take() {
            return Some(byte);
        }
        loop {
            match include.read_byte().unwrap_or(None) {
                Some(byte) => return Some(byte),
                None => {
                    if !include.advance() {
                        return None;
                    }
                }
            }
        }
    }

    fn peek(&mut self, include: &mut IncludeStack) -> Option<u8> {
        if self.lookahead.is_none() {
            self.lookahead = self.raw_next_uncached(include);
        }
        self.lookahead
    }

    fn raw_next_uncached(&mut self, include: &mut IncludeStack) -> Option<u8> {
        loop {
            match include.read_byte().unwrap_or(None) {
                Some(byte) => return Some(byte),
                None => {
                    if !include.advance() {
                        return None;
                    }
                }
            }
        }
    }

    fn bump(&mut self, include: &mut IncludeStack, pretext: &mut Vec<u8>) -> Option<u8> {
        let byte = self.raw_next(include);
        if let Some(b) = byte {
            pretext.push(b);
        }
        byte
    }

    /// Skip whitespace and `#`-to-end-of-line comments, recording them into
    /// `pretext` the same way a real token's leading text would be.
    fn skip_trivia(&mut self, include: &mut IncludeStack, pretext: &mut Vec<u8>) {
        loop {
            match self.peek(include) {
                Some(b) if b.is_ascii_whitespace() => {
                    self.bump(include, pretext);
                }
                Some(b'#') => {
                    while let Some(b) = self.bump(include, pretext) {
                        if b == b'\n' {
                            break;
                        }
                    }
                }
                _ => return,
            }
        }
    }

    /// Scan one token the way [`scan_token`](Self::scan_token) would,
    /// except in a block-content or block-argument context: there, the
    /// next non-trivia character is expected to open a `{}`/`()` capture
    /// rather than start an ordinary token.
    pub(crate) fn scan_contextual(
        &mut self,
        include: &mut IncludeStack,
        pretext: &mut Vec<u8>,
        context: ContextType,
    ) -> RawToken {
        match context {
            ContextType::BlockContent => self.scan_delimited(include, pretext, b'{', b'}'),
            ContextType::BlockArg => self.scan_delimited(include, pretext, b'(', b')'),
            _ => self.scan_token(include, pretext),
        }
    }

    fn scan_delimited(&mut self, include: &mut IncludeStack, pretext: &mut Vec<u8>, open: u8, close: u8) -> RawToken {
        self.skip_trivia(include, pretext);
        match self.bump(include, pretext) {
            Some(b) if b == open => self.scan_balanced(include, pretext, open, close),
            Some(b) => RawToken::Punctuation(b as char),
            None => RawToken::Eof,
        }
    }

    /// Scan one token, skipping leading trivia first. `pretext` accumulates
    /// every byte consumed (trivia plus the token itself).
    pub(crate) fn scan_token(&mut self, include: &mut IncludeStack, pretext: &mut Vec<u8>) -> RawToken {
        self.skip_trivia(include, pretext);
        let Some(first) = self.bump(include, pretext) else {
            return RawToken::Eof;
        };
        match first {
            b'@' => {
                let mut name = Vec::new();
                while let Some(b) = self.peek(include) {
                    if is_ident_continue(b) {
                        name.push(b);
                        self.bump(include, pretext);
                    } else {
                        break;
                    }
                }
                RawToken::Pragma(decode(name))
            }
            b'"' => self.scan_string(include, pretext),
            b'\'' => self.scan_apostrophe(include, pretext),
            b if is_ident_start(b) => self.scan_identifier(include, pretext, b),
            b if b.is_ascii_digit() => self.scan_number(include, pretext, b),
            b'-' if matches!(self.peek(include), Some(d) if d.is_ascii_digit()) => {
                self.scan_number_with_sign(include, pretext)
            }
            other => RawToken::Punctuation(other as char),
        }
    }

    fn scan_identifier(&mut self, include: &mut IncludeStack, pretext: &mut Vec<u8>, first: u8) -> RawToken {
        let mut text = vec![first];
        while let Some(b) = self.peek(include) {
            if is_ident_continue(b) {
                text.push(b);
                self.bump(include, pretext);
            } else {
                break;
            }
        }
        RawToken::Identifier(decode(text))
    }

    fn scan_number(&mut self, include: &mut IncludeStack, pretext: &mut Vec<u8>, first: u8) -> RawToken {
        let text = vec![first];
        self.consume_digits(include, pretext, text)
    }

    fn scan_number_with_sign(&mut self, include: &mut IncludeStack, pretext: &mut Vec<u8>) -> RawToken {
        let mut text = vec![b'-'];
        let Some(first) = self.bump(include, pretext) else { return RawToken::Error("unterminated number".into()) };
        text.push(first);
        self.consume_digits(include, pretext, text)
    }

    fn consume_digits(&mut self, include: &mut IncludeStack, pretext: &mut Vec<u8>, mut text: Vec<u8>) -> RawToken {
        let mut is_float = false;
        while let Some(b) = self.peek(include) {
            if b.is_ascii_digit() {
                text.push(b);
                self.bump(include, pretext);
            } else if (b == b'.' || b == b'e' || b == b'E') && !is_float {
                is_float = true;
                text.push(b);
                self.bump(include, pretext);
                if matches!(self.peek(include), Some(b'-') | Some(b'+')) {
                    let sign = self.bump(include, pretext).unwrap_or(b'+');
                    text.push(sign);
                }
            } else {
                break;
            }
        }
        let text = decode(text);
        if is_float {
            match text.parse::<f64>() {
                Ok(v) => RawToken::Float(v),
                Err(_) => RawToken::Error(format!("malformed numeric literal `{text}`")),
            }
        } else {
            match text.parse::<i64>() {
                Ok(v) => RawToken::Number(v),
                Err(_) => RawToken::Error(format!("malformed numeric literal `{text}`")),
            }
        }
    }

    fn scan_string(&mut self, include: &mut IncludeStack, pretext: &mut Vec<u8>) -> RawToken {
        let mut text = Vec::new();
        loop {
            match self.bump(include, pretext) {
                None => return RawToken::Error("unterminated string literal".into()),
                Some(b'"') => return RawToken::String(decode(text)),
                Some(b'\\') => match self.bump(include, pretext) {
                    Some(b'n') => text.push(b'\n'),
                    Some(b'r') => text.push(b'\r'),
                    Some(b't') => text.push(b'\t'),
                    Some(b'"') => text.push(b'"'),
                    Some(b'\\') => text.push(b'\\'),
                    Some(other) => text.push(other),
                    None => return RawToken::Error("unterminated string literal".into()),
                },
                Some(b) => text.push(b),
            }
        }
    }

    fn scan_apostrophe(&mut self, include: &mut IncludeStack, pretext: &mut Vec<u8>) -> RawToken {
        let mut text = Vec::new();
        loop {
            match self.bump(include, pretext) {
                None => return RawToken::Error("unterminated string literal".into()),
                Some(b'\'') => return RawToken::Apostrophe(decode(text)),
                Some(b) => text.push(b),
            }
        }
    }

    /// Capture everything from right after `open` (already consumed by the
    /// caller) to the matching `close`, honoring nesting, as one opaque
    /// block of text. Used for block-content (`{}`) and block-argument
    /// (`()`) contexts, where the grammar reinterprets the captured text
    /// itself rather than token-by-token.
    pub(crate) fn scan_balanced(
        &mut self,
        include: &mut IncludeStack,
        pretext: &mut Vec<u8>,
        open: u8,
        close: u8,
    ) -> RawToken {
        let mut depth = 1u32;
        let mut text = Vec::new();
        loop {
            match self.bump(include, pretext) {
                None => return RawToken::Error(format!("unterminated `{}` block", close as char)),
                Some(b) if b == open => {
                    depth += 1;
                    text.push(b);
                }
                Some(b) if b == close => {
                    depth -= 1;
                    if depth == 0 {
                        return RawToken::Block(decode(text));
                    }
                    text.push(b);
                }
                Some(b'"') => {
                    text.push(b'"');
                    loop {
                        match self.bump(include, pretext) {
                            None => return RawToken::Error("unterminated string literal".into()),
                            Some(b'\\') => {
                                text.push(b'\\');
                                if let Some(escaped) = self.bump(include, pretext) {
                                    text.push(escaped);
                                }
                            }
                            Some(b'"') => {
                                text.push(b'"');
                                break;
                            }
                            Some(b) => text.push(b),
                        }
                    }
                }
                Some(b) => text.push(b),
            }
        }
    }
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_ident_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'-'
}
