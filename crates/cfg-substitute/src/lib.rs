//! Backtick variable substitution: the text-rewriting pass that runs over
//! a block generator's body (and `@define`d values) before the result is
//! fed back into the lexer.
//!
//! Grounded directly on the reference scanner's five-state string
//! tracker: a name between a pair of backticks is looked up with
//! `args` → `defs` → `globals` → process environment precedence and
//! spliced in, re-encoded according to whether the splice point sits
//! inside a double- or apostrophe-quoted string.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

mod literal;
mod state;

pub use literal::{encode_as_qstring, encode_as_string, extract_string_literal};
pub use state::StringState;

use cfg_argmap::ArgMap;
use cfg_error::LexError;

/// Look up `name` with `args` → `defs` → `globals` → environment
/// precedence. A name none of them carries substitutes to the empty
/// string at the call site, not here.
fn lookup_value(name: &str, globals: Option<&ArgMap>, defs: Option<&ArgMap>, args: Option<&ArgMap>) -> Option<String> {
    args.and_then(|m| m.get(name))
        .or_else(|| defs.and_then(|m| m.get(name)))
        .or_else(|| globals.and_then(|m| m.get(name)))
        .map(str::to_string)
        .or_else(|| std::env::var(name).ok())
}

fn append_value(out: &mut Vec<u8>, state: StringState, value: &str) -> Result<(), LexError> {
    if state == StringState::Outside {
        out.extend_from_slice(value.as_bytes());
        return Ok(());
    }
    match extract_string_literal(value) {
        Some(literal) => match state {
            StringState::InQuote => out.extend_from_slice(encode_as_string(&literal).as_bytes()),
            StringState::InApos => out.extend_from_slice(encode_as_qstring(&literal)?.as_bytes()),
            StringState::InQuoteEscape | StringState::InQuoteEscaped | StringState::Outside => {
                out.extend_from_slice(value.as_bytes())
            }
        },
        None => out.extend_from_slice(value.as_bytes()),
    }
    Ok(())
}

/// Scan `input` for backtick-delimited names and splice in their values.
///
/// `` `` `` (an empty reference) emits a literal backtick. A backtick
/// immediately after a backslash-escaped character inside a
/// double-quoted string is an error, as is an unterminated reference.
pub fn substitute(
    input: &str,
    globals: Option<&ArgMap>,
    defs: Option<&ArgMap>,
    args: Option<&ArgMap>,
) -> Result<String, LexError> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(input.len());
    let mut string_state = StringState::Outside;
    let mut backtick = false;
    let mut ref_start = 0usize;
    let mut i = 0usize;

    while i < bytes.len() {
        let byte = bytes[i];
        string_state = string_state.advance(byte);

        if !backtick && byte == b'`' {
            if string_state == StringState::InQuoteEscaped {
                return Err(LexError::BacktickAfterQuoteChar);
            }
            backtick = true;
            ref_start = i + 1;
        } else if backtick && byte == b'`' {
            backtick = false;
            if ref_start == i {
                out.push(b'`');
            } else {
                let name = &input[ref_start..i];
                let value = lookup_value(name, globals, defs, args);
                append_value(&mut out, string_state, value.as_deref().unwrap_or(""))?;
            }
        } else if !backtick {
            out.push(byte);
        }
        i += 1;
    }

    if backtick {
        return Err(LexError::MissingClosingBacktick);
    }

    Ok(String::from_utf8_lossy(&out).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn backtick_free_input_passes_through_unchanged(input in "[^`]{0,64}") {
            prop_assert_eq!(substitute(&input, None, None, None).unwrap(), input);
        }
    }

    #[test]
    fn substitutes_a_plain_reference_outside_any_string() {
        let mut args = ArgMap::new();
        args.set("name", "world");
        assert_eq!(substitute("hello `name`", None, None, Some(&args)).unwrap(), "hello world");
    }

    #[test]
    fn empty_reference_emits_a_literal_backtick() {
        assert_eq!(substitute("a ``b", None, None, None).unwrap(), "a `b");
    }

    #[test]
    fn missing_name_substitutes_to_empty_string() {
        assert_eq!(substitute("x`nope`y", None, None, None).unwrap(), "xy");
    }

    #[test]
    fn unterminated_reference_fails() {
        let err = substitute("a `b", None, None, None).unwrap_err();
        assert_eq!(err, LexError::MissingClosingBacktick);
    }

    #[test]
    fn lookup_precedence_is_args_then_defs_then_globals_then_env() {
        let mut globals = ArgMap::new();
        globals.set("x", "from-globals");
        let mut defs = ArgMap::new();
        defs.set("x", "from-defs");
        let mut args = ArgMap::new();
        args.set("x", "from-args");

        assert_eq!(
            substitute("`x`", Some(&globals), Some(&defs), Some(&args)).unwrap(),
            "from-args"
        );
        assert_eq!(substitute("`x`", Some(&globals), Some(&defs), None).unwrap(), "from-defs");
        assert_eq!(substitute("`x`", Some(&globals), None, None).unwrap(), "from-globals");
    }

    #[test]
    fn value_inside_double_quoted_string_is_re_escaped() {
        let mut args = ArgMap::new();
        args.set("msg", "\"line one\\nline two\"");
        assert_eq!(
            substitute("log_fifo(template(\"`msg`\"))", None, None, Some(&args)).unwrap(),
            "log_fifo(template(\"line one\\nline two\"))"
        );
    }

    #[test]
    fn value_inside_apostrophe_string_rejects_embedded_apostrophe() {
        let mut args = ArgMap::new();
        args.set("msg", "\"it's here\"");
        let err = substitute("x('`msg`')", None, None, Some(&args)).unwrap_err();
        assert_eq!(err, LexError::ApostropheInQstring);
    }

    #[test]
    fn non_literal_value_inside_a_string_is_emitted_verbatim() {
        let mut args = ArgMap::new();
        args.set("expr", "1 + 1");
        assert_eq!(substitute("\"`expr`\"", None, None, Some(&args)).unwrap(), "\"1 + 1\"");
    }

    #[test]
    fn backtick_right_after_backslash_escape_is_rejected() {
        let err = substitute("\"a\\`b`\"", None, None, None).unwrap_err();
        assert_eq!(err, LexError::BacktickAfterQuoteChar);
    }
}
