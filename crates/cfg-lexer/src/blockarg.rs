//! Parses a captured block-argument tuple's text (everything between a
//! generator reference's parentheses) into an [`ArgMap`].
//!
//! The grammar this stands in for is simple by construction: it's exactly
//! the shape [`ArgMap::format_varargs`](cfg_argmap::ArgMap::format_varargs)
//! produces, `name(value) name(value) ...`, so parsing is a direct inverse
//! of formatting rather than a general expression grammar.

use cfg_argmap::ArgMap;
use cfg_error::LexError;

pub(crate) fn parse_arg_tuple(text: &str) -> Result<ArgMap, LexError> {
    let mut map = ArgMap::new();
    let bytes = text.as_bytes();
    let mut i = 0usize;

    loop {
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= bytes.len() {
            break;
        }

        let name_start = i;
        while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_' || bytes[i] == b'-') {
            i += 1;
        }
        if i == name_start {
            return Err(LexError::Other(format!("expected an argument name near `{}`", &text[i..])));
        }
        let name = &text[name_start..i];

        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if bytes.get(i) != Some(&b'(') {
            return Err(LexError::Other(format!("expected `(` after argument name `{name}`")));
        }
        i += 1;

        let value_start = i;
        let mut depth = 1u32;
        while i < bytes.len() && depth > 0 {
            match bytes[i] {
                b'(' => depth += 1,
                b')' => depth -= 1,
                _ => {}
            }
            if depth > 0 {
                i += 1;
            }
        }
        if depth != 0 {
            return Err(LexError::Other(format!("unterminated argument value for `{name}`")));
        }
        map.set(name, text[value_start..i].trim());
        i += 1; // the closing ')'
    }

    Ok(map)
}
