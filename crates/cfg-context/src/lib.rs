//! Push/pop stack of parse contexts, scoping the keyword set and error
//! description the grammar is currently operating under.
//!
//! Every sub-parse the grammar enters (a `source { ... }` block, a block
//! argument list, a template function body) pushes a [`ContextFrame`] and
//! pops it on every exit path, success or error. Nothing here is specific
//! to one grammar rule — it's a generic stack the lexer consults to decide
//! whether a bareword is a keyword in the current position.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

mod frame;
mod keyword;

pub use frame::{ContextFrame, ContextType};
pub use keyword::{Keyword, KeywordStatus};

/// The description `get_context_description` falls back to when the
/// stack is empty or the top frame left its description blank.
pub const DEFAULT_DESCRIPTION: &str = "configuration";

/// A stack of [`ContextFrame`]s, consulted by the lexer for keyword
/// resolution and by diagnostics for the "in context of ..." message.
#[derive(Debug, Default)]
pub struct ContextStack {
    frames: Vec<ContextFrame>,
}

impl ContextStack {
    pub fn new() -> Self {
        ContextStack::default()
    }

    pub fn push(&mut self, frame: ContextFrame) {
        self.frames.push(frame);
    }

    pub fn pop(&mut self) -> Option<ContextFrame> {
        self.frames.pop()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn top(&self) -> Option<&ContextFrame> {
        self.frames.last()
    }

    /// The top frame's description, or [`DEFAULT_DESCRIPTION`] if the
    /// stack is empty or the description is blank.
    pub fn context_description(&self) -> &str {
        match self.top() {
            Some(frame) if !frame.description.is_empty() => &frame.description,
            _ => DEFAULT_DESCRIPTION,
        }
    }

    /// The top frame's type, or [`ContextType::None`] if the stack is
    /// empty.
    pub fn context_type(&self) -> ContextType {
        self.top().map(|frame| frame.context_type).unwrap_or(ContextType::None)
    }

    /// Resolve a bareword against the active frame's keyword set.
    ///
    /// Lookup is dash/underscore insensitive. Returns `None` both when the
    /// stack is empty and when the word matches nothing. Resolution stops
    /// (returns `None`, forcing the word to parse as an identifier) as
    /// soon as it hits a keyword array's `@!#?` sentinel, if one is
    /// present before a match.
    pub fn resolve_keyword(&self, word: &str) -> Option<&Keyword> {
        self.top()?.resolve_keyword(word)
    }

    /// Mark an obsolete keyword as seen, so future uses within this
    /// context no longer warn. No-op if the stack is empty or the
    /// keyword isn't found.
    pub fn acknowledge_obsolete(&mut self, word: &str) {
        if let Some(frame) = self.frames.last_mut() {
            frame.acknowledge_obsolete(word);
        }
    }
}
