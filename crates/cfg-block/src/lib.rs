//! Block generators: named macros that expand to lexer input when
//! referenced from a configuration file.
//!
//! A generator owns a context (where it may be referenced) and a name;
//! invoking it with a caller-supplied argument map produces text the
//! lexer pushes back in as a buffer frame. [`Block`] is the built-in
//! generator backing user `block <context> <name> { ... }` definitions —
//! other generators (e.g. module-provided ones) implement
//! [`BlockGenerator`] directly.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

use cfg_argmap::{ArgDefs, ArgMap};
use cfg_context::ContextType;
use cfg_error::LexError;

/// Something that expands a name reference into lexer input.
pub trait BlockGenerator {
    /// The context this generator may be invoked from.
    fn context(&self) -> ContextType;
    fn name(&self) -> &str;
    /// Whether this generator is looked up even outside its own context
    /// (a handful of generators, e.g. template functions, are global).
    fn is_global(&self) -> bool {
        false
    }
    /// Expand this generator for one reference, with `args` the
    /// caller-supplied argument tuple and `globals` the lexer's global
    /// argument map (lowest lookup precedence in backtick substitution).
    fn generate(&self, globals: Option<&ArgMap>, args: ArgMap) -> Result<String, LexError>;
}

/// A user-defined `block <context> <name>(<arg-defs>) { <content> }`.
///
/// Expansion fills `__VARARGS__` with the caller's undeclared arguments
/// (`name(value) name(value) ...`, forwarded the way the body would
/// forward them to an inner block), then substitutes backtick
/// references against `args` → `arg_defs`' defaults → `globals` →
/// environment.
#[derive(Debug, Clone)]
pub struct Block {
    context: ContextType,
    name: String,
    content: String,
    arg_defs: ArgDefs,
}

impl Block {
    pub fn new(context: ContextType, name: impl Into<String>, content: impl Into<String>, arg_defs: ArgDefs) -> Self {
        Block { context, name: name.into(), content: content.into(), arg_defs }
    }

    pub fn arg_defs(&self) -> &ArgDefs {
        &self.arg_defs
    }
}

impl BlockGenerator for Block {
    fn context(&self) -> ContextType {
        self.context
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn generate(&self, globals: Option<&ArgMap>, mut args: ArgMap) -> Result<String, LexError> {
        let varargs = args.format_varargs(&self.arg_defs);
        args.set("__VARARGS__", varargs);
        let defaults = self.arg_defs.defaults_as_argmap();
        cfg_substitute::substitute(&self.content, globals, Some(&defaults), Some(&args))
    }
}
