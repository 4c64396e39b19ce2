use crate::keyword::Keyword;

/// The kind of sub-parse a [`ContextFrame`] scopes.
///
/// `None` is not pushed by the grammar; it's what an empty [`ContextStack`]
/// reports itself as, mirroring the reference lexer's `0` context type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextType {
    None,
    Root,
    Source,
    Destination,
    Filter,
    Parser,
    Rewrite,
    Log,
    BlockDef,
    BlockRef,
    BlockContent,
    BlockArg,
    Pragma,
    TemplateFunc,
    InnerDest,
    InnerSrc,
    ClientProto,
    ServerProto,
}

/// One scope on the [`ContextStack`](crate::ContextStack): a keyword set
/// plus the description shown in "in context of ..." diagnostics.
#[derive(Debug, Clone)]
pub struct ContextFrame {
    pub context_type: ContextType,
    pub description: String,
    pub keywords: Vec<Keyword>,
    /// Whether block-generator lookup runs before keyword resolution in
    /// this context.
    pub generator_lookup: bool,
}

impl ContextFrame {
    pub fn new(context_type: ContextType, description: impl Into<String>, keywords: Vec<Keyword>) -> Self {
        ContextFrame { context_type, description: description.into(), keywords, generator_lookup: false }
    }

    pub fn with_generator_lookup(mut self, enabled: bool) -> Self {
        self.generator_lookup = enabled;
        self
    }

    /// Dash/underscore-insensitive lookup, stopping at the sentinel entry
    /// the same way the reference keyword arrays do.
    pub fn resolve_keyword(&self, word: &str) -> Option<&Keyword> {
        let normalized = normalize(word);
        for keyword in &self.keywords {
            if keyword.is_sentinel() {
                return None;
            }
            if normalize(&keyword.name) == normalized {
                return Some(keyword);
            }
        }
        None
    }

    pub fn acknowledge_obsolete(&mut self, word: &str) {
        let normalized = normalize(word);
        for keyword in &mut self.keywords {
            if normalize(&keyword.name) == normalized {
                keyword.acknowledge();
                return;
            }
        }
    }
}

fn normalize(name: &str) -> String {
    name.replace('-', "_")
}
