//! The central dispatcher: consumes the active include frame, recognizes
//! lexemes against the active context's keyword set, handles `@pragma`/
//! `@include` directives, and detects block-generator identifiers,
//! re-entering itself after generation.
//!
//! [`Lexer::next_token`] never returns an `Err` — lexical and dispatch
//! failures become [`TokenKind::Error`], the same way the reference
//! implementation returns `LL_ERROR` in place of unwinding through
//! `longjmp`. The grammar this feeds (out of scope here) is expected to
//! report the message and abandon whatever partial tree it had.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

mod blockarg;
mod scanner;
mod version;

pub use version::Version;

use cfg_argmap::ArgMap;
use cfg_block::BlockGenerator;
use cfg_context::{ContextStack, ContextType};
use cfg_error::{IncludeError, LexError};
use cfg_include::IncludeStack;
use cfg_plugin::{ModuleLoader, PluginRegistry};
use cfg_position::{Position, Span};
use cfg_token::{FrameId, Location, Token, TokenBlock, TokenKind};
use scanner::{ByteStream, RawToken};
use std::collections::VecDeque;

const OBSOLETE_VERSION_MESSAGE: &str =
    "configuration files without a version number have become unsupported, please specify a version number using @version and update your configuration accordingly";

/// Owns every collaborator the dispatch loop needs: the input stack, the
/// context stack the grammar pushes/pops around sub-parses, the plug-in
/// registry, and the bookkeeping the reference `CfgLexer` keeps inline
/// (`ignore_pragma`, `non_pragma_seen`, the preprocess sink).
pub struct Lexer {
    include: IncludeStack,
    context: ContextStack,
    pending: VecDeque<TokenBlock>,
    globals: ArgMap,
    plugins: PluginRegistry,
    loader: Box<dyn ModuleLoader>,
    scanner: ByteStream,
    preprocess_output: Option<String>,
    ignore_pragma: bool,
    non_pragma_seen: bool,
    suppress_depth: u32,
    user_version: Option<Version>,
    parsed_version: Option<Version>,
    search_path: String,
}

impl Lexer {
    pub fn new(loader: Box<dyn ModuleLoader>) -> Self {
        let mut plugins = PluginRegistry::new();
        plugins.discover_candidate_modules(loader.as_ref());
        Lexer {
            include: IncludeStack::new(),
            context: ContextStack::new(),
            pending: VecDeque::new(),
            globals: ArgMap::new(),
            plugins,
            loader,
            scanner: ByteStream::new(),
            preprocess_output: None,
            ignore_pragma: false,
            non_pragma_seen: false,
            suppress_depth: 0,
            user_version: None,
            parsed_version: None,
            search_path: String::new(),
        }
    }

    pub fn with_user_version(mut self, version: Version) -> Self {
        self.user_version = Some(version);
        self
    }

    pub fn with_search_path(mut self, search_path: impl Into<String>) -> Self {
        self.search_path = search_path.into();
        self
    }

    pub fn enable_preprocess_sink(&mut self) {
        self.preprocess_output = Some(String::new());
    }

    pub fn take_preprocess_output(&mut self) -> Option<String> {
        self.preprocess_output.take()
    }

    pub fn push_top_level_file(&mut self, path: &str) -> Result<(), IncludeError> {
        self.include.push_file_or_directory(path, &self.search_path)
    }

    pub fn push_top_level_buffer(&mut self, name: impl Into<String>, content: impl Into<String>) -> Result<(), IncludeError> {
        self.include.push_buffer(name, content)
    }

    /// Treat `@` as ordinary identifier-leading punctuation instead of a
    /// pragma marker. Set this for a lexer built directly over a string
    /// rather than a top-level file — the reference lexer does the same
    /// for its buffer constructor, since such strings are usually already
    /// the result of one substitution pass and contain no pragmas of
    /// their own.
    pub fn ignoring_pragmas(mut self) -> Self {
        self.ignore_pragma = true;
        self
    }

    pub fn globals_mut(&mut self) -> &mut ArgMap {
        &mut self.globals
    }

    pub fn context_stack_mut(&mut self) -> &mut ContextStack {
        &mut self.context
    }

    pub fn plugins_mut(&mut self) -> &mut PluginRegistry {
        &mut self.plugins
    }

    pub fn register_generator(&mut self, generator: Box<dyn BlockGenerator>) {
        self.plugins.register(generator);
    }

    pub fn inject_token_block(&mut self, block: TokenBlock) {
        self.pending.push_back(block);
    }

    /// Re-inject a single already-produced token ahead of live input (the
    /// reference `cfg_lexer_unput_token`), e.g. when a lookahead token
    /// turned out not to belong to the construct that peeked it.
    pub fn unput_token(&mut self, token: Token) {
        let mut block = TokenBlock::new();
        block.write(token);
        self.pending.push_front(block);
    }

    pub fn parsed_version(&self) -> Option<Version> {
        self.parsed_version
    }

    fn current_position(&self) -> Position {
        let loc = self.include.top_location();
        Position::new(loc.line, loc.column)
    }

    fn location_at(&self, start: Position, end: Position) -> Location {
        Location { span: Span::new(start, end), frame: FrameId(self.include.depth() as u32) }
    }

    fn next_injected(&mut self) -> Option<Token> {
        while let Some(block) = self.pending.front_mut() {
            if let Some(token) = block.next_token() {
                return Some(token);
            }
            self.pending.pop_front();
        }
        None
    }

    fn append_preprocess(&mut self, pretext: &str, token_text: &str) {
        if let Some(sink) = &mut self.preprocess_output {
            sink.push_str(pretext);
            if self.suppress_depth == 0 {
                sink.push_str(token_text);
            }
        }
    }

    fn raw_token_text(raw: &RawToken) -> String {
        match raw {
            RawToken::Pragma(name) => format!("@{name}"),
            RawToken::Identifier(s) => s.clone(),
            RawToken::String(s) => format!("\"{s}\""),
            RawToken::Apostrophe(s) => format!("'{s}'"),
            RawToken::Number(n) => n.to_string(),
            RawToken::Float(f) => f.to_string(),
            RawToken::Block(s) => s.clone(),
            RawToken::Punctuation(c) => c.to_string(),
            RawToken::Eof | RawToken::Error(_) => String::new(),
        }
    }

    /// The dispatch loop described in §4.6: consume injected tokens first,
    /// then scan; `@pragma`/`@include`/generator identifiers restart the
    /// loop instead of returning.
    pub fn next_token(&mut self) -> Token {
        loop {
            if let Some(token) = self.next_injected() {
                return token;
            }

            let start = self.current_position();
            let mut pretext = Vec::new();
            let context_type = self.context.context_type();
            let raw = self.scanner.scan_contextual(&mut self.include, &mut pretext, context_type);
            let end = self.current_position();
            let location = self.location_at(start, end);
            let token_text = Self::raw_token_text(&raw);
            let pretext = String::from_utf8_lossy(&pretext).into_owned();

            let dispatched = match raw {
                RawToken::Eof => Dispatch::Return(Token::new(TokenKind::Eof, location)),
                RawToken::Error(msg) => Dispatch::Return(Token::new(TokenKind::Error(msg.into()), location)),
                RawToken::Number(n) => Dispatch::Return(Token::new(TokenKind::Number(n), location)),
                RawToken::Float(f) => Dispatch::Return(Token::new(TokenKind::Float(f), location)),
                RawToken::String(s) => Dispatch::Return(Token::new(TokenKind::String(s.into()), location)),
                RawToken::Apostrophe(s) => Dispatch::Return(Token::new(TokenKind::String(s.into()), location)),
                RawToken::Block(s) => Dispatch::Return(Token::new(TokenKind::Block(s.into()), location)),
                RawToken::Punctuation(c) => Dispatch::Return(Token::new(TokenKind::Punctuation(c), location)),
                RawToken::Pragma(name) => self.dispatch_pragma(&name, location),
                RawToken::Identifier(word) => self.dispatch_identifier(word, location),
            };

            match dispatched {
                Dispatch::Relex => continue,
                Dispatch::Return(token) => {
                    self.append_preprocess(&pretext, &token_text);
                    if let Some(failure) = self.check_version_gate(&token) {
                        return failure;
                    }
                    return token;
                }
            }
        }
    }

    /// §4.6 point 4: the first non-pragma token requires a version to be
    /// known by now, either supplied by the driver or just parsed from
    /// `@version`.
    fn check_version_gate(&mut self, token: &Token) -> Option<Token> {
        if self.non_pragma_seen || self.suppress_depth > 0 {
            return None;
        }
        if token.is_eof() {
            return None;
        }
        if self.user_version.is_none() {
            match self.parsed_version {
                Some(v) => self.user_version = Some(v),
                None => {
                    return Some(Token::new(TokenKind::Error(OBSOLETE_VERSION_MESSAGE.into()), token.location));
                }
            }
        }
        self.non_pragma_seen = true;
        None
    }

    fn dispatch_pragma(&mut self, name: &str, location: Location) -> Dispatch {
        if self.ignore_pragma {
            return Dispatch::Return(Token::new(TokenKind::Identifier(format!("@{name}").into()), location));
        }
        match name {
            "include" => self.dispatch_include(location),
            "version" => self.dispatch_version(location),
            other => {
                // Unrecognized pragmas are consumed up to `;` and ignored,
                // matching the reference's tolerant pragma sub-grammar for
                // anything this front end doesn't implement itself.
                self.suppress_depth += 1;
                self.skip_to_semicolon();
                self.suppress_depth -= 1;
                tracing::debug!(pragma = other, "ignoring unrecognized pragma");
                Dispatch::Relex
            }
        }
    }

    fn dispatch_include(&mut self, location: Location) -> Dispatch {
        self.suppress_depth += 1;
        let name_token = self.next_token();
        let path = match name_token.kind {
            TokenKind::String(s) => s.to_string(),
            TokenKind::Identifier(s) => s.to_string(),
            _ => {
                self.suppress_depth -= 1;
                return Dispatch::Return(Token::new(
                    TokenKind::Error("expected a filename after @include".into()),
                    location,
                ));
            }
        };
        let semi = self.next_token();
        if !matches!(semi.kind, TokenKind::Punctuation(';')) {
            self.suppress_depth -= 1;
            return Dispatch::Return(Token::new(TokenKind::Error("expected `;` after @include filename".into()), location));
        }
        self.suppress_depth -= 1;
        match self.include.push_file_or_directory(&path, &self.search_path) {
            Ok(()) => Dispatch::Relex,
            Err(err) => Dispatch::Return(Token::new(TokenKind::Error(err.to_string().into()), location)),
        }
    }

    fn dispatch_version(&mut self, location: Location) -> Dispatch {
        self.suppress_depth += 1;
        let colon = self.next_token();
        if !matches!(colon.kind, TokenKind::Punctuation(':')) {
            self.suppress_depth -= 1;
            return Dispatch::Return(Token::new(TokenKind::Error("expected `:` after @version".into()), location));
        }
        let value_token = self.next_token();
        let text = match &value_token.kind {
            TokenKind::Float(f) => f.to_string(),
            TokenKind::Number(n) => n.to_string(),
            TokenKind::Identifier(s) => s.to_string(),
            _ => {
                self.suppress_depth -= 1;
                return Dispatch::Return(Token::new(TokenKind::Error("expected a version number".into()), location));
            }
        };
        let semi = self.next_token();
        self.suppress_depth -= 1;
        if !matches!(semi.kind, TokenKind::Punctuation(';')) {
            return Dispatch::Return(Token::new(TokenKind::Error("expected `;` after @version value".into()), location));
        }
        match Version::parse(&text) {
            Some(v) => {
                self.parsed_version = Some(v);
                Dispatch::Relex
            }
            None => Dispatch::Return(Token::new(TokenKind::Error(format!("malformed version `{text}`").into()), location)),
        }
    }

    fn skip_to_semicolon(&mut self) {
        loop {
            let tok = self.next_token();
            if tok.is_eof() || matches!(tok.kind, TokenKind::Punctuation(';')) {
                return;
            }
        }
    }

    fn dispatch_identifier(&mut self, word: String, location: Location) -> Dispatch {
        let context_type = self.context.context_type();
        let generator_lookup_enabled = self.context.top().is_some_and(|frame| frame.generator_lookup);
        if generator_lookup_enabled {
            let is_generator = self.plugins.find_generator(context_type, &word, self.loader.as_ref()).is_ok()
                || self.plugins.find_global_generator(&word, self.loader.as_ref()).is_ok();
            if is_generator {
                return self.invoke_generator(context_type, word, location);
            }
        }

        if let Some(keyword) = self.context.resolve_keyword(&word) {
            let token_id = keyword.token_id;
            if matches!(keyword.status, cfg_context::KeywordStatus::Obsolete { .. }) {
                if let cfg_context::KeywordStatus::Obsolete { explanation } = &keyword.status {
                    tracing::warn!(keyword = %word, explanation = %explanation, "configuration uses an obsolete keyword");
                }
                self.context.acknowledge_obsolete(&word);
            }
            return Dispatch::Return(Token::new(TokenKind::Keyword(token_id), location));
        }

        Dispatch::Return(Token::new(TokenKind::Identifier(word.into()), location))
    }

    /// Parse the caller's argument tuple, run the generator, substitute
    /// backticks, and push the result as a suppressed-backtick buffer —
    /// the original's "substitute once, never again" rule (confirmed by
    /// `cfg_block_generate` + `cfg_lexer_include_buffer_without_backtick_substitution`).
    fn invoke_generator(&mut self, context_type: ContextType, word: String, location: Location) -> Dispatch {
        self.suppress_depth += 1;
        let open = self.next_token();
        let parsed_args = if matches!(open.kind, TokenKind::Punctuation('(')) {
            match self.scan_raw_arg_tuple() {
                Ok(text) => blockarg::parse_arg_tuple(&text),
                Err(err) => Err(err),
            }
        } else {
            self.unput_token(open);
            Ok(ArgMap::new())
        };

        let semi = self.next_token();
        self.suppress_depth -= 1;
        if !matches!(semi.kind, TokenKind::Punctuation(';')) {
            return Dispatch::Return(Token::new(TokenKind::Error("expected `;` after block reference".into()), location));
        }

        let args = match parsed_args {
            Ok(args) => args,
            Err(err) => return Dispatch::Return(Token::new(TokenKind::Error(err.to_string().into()), location)),
        };

        match self.expand_generator(context_type, &word, args) {
            Ok(expanded) => match self.include.push_generated_buffer("#block", expanded) {
                Ok(()) => Dispatch::Relex,
                Err(err) => Dispatch::Return(Token::new(TokenKind::Error(err.to_string().into()), location)),
            },
            Err(msg) => Dispatch::Return(Token::new(TokenKind::Error(msg.into()), location)),
        }
    }

    /// Look the generator up a second time (cheap: discovery already ran
    /// and any owning module is already loaded by [`dispatch_identifier`])
    /// and invoke it against a snapshot of the current globals, so the
    /// borrow of `self.plugins` never needs to outlive this one call.
    fn expand_generator(&mut self, context_type: ContextType, word: &str, args: ArgMap) -> Result<String, String> {
        let globals = self.globals.clone();
        let found = self.plugins.find_generator(context_type, word, self.loader.as_ref());
        let generator = match found {
            Ok(g) => g,
            Err(_) => self.plugins.find_global_generator(word, self.loader.as_ref()).map_err(|e| e.to_string())?,
        };
        generator.generate(Some(&globals), args).map_err(|e| e.to_string())
    }

    /// Captures everything between the already-consumed opening `(` and
    /// its matching `)` by forcing a block-argument scan regardless of the
    /// surrounding context's actual type.
    fn scan_raw_arg_tuple(&mut self) -> Result<String, LexError> {
        let mut pretext = Vec::new();
        match self.scanner.scan_balanced(&mut self.include, &mut pretext, b'(', b')') {
            RawToken::Block(text) => Ok(text),
            RawToken::Error(msg) => Err(LexError::Other(msg)),
            _ => Err(LexError::Other("expected a block-argument tuple".to_string())),
        }
    }
}

enum Dispatch {
    Relex,
    Return(Token),
}

#[cfg(test)]
mod tests {
    use super::*;
    use cfg_context::{ContextFrame, Keyword};
    use cfg_error::PluginError;

    struct NoModules;
    impl ModuleLoader for NoModules {
        fn load(&self, module_name: &str) -> Result<Vec<Box<dyn BlockGenerator>>, PluginError> {
            Err(PluginError::LoadFailed(module_name.to_string(), "no modules in this test".to_string()))
        }
        fn discover(&self) -> Vec<(String, ContextType, String)> {
            Vec::new()
        }
    }

    fn lexer_with(content: &str) -> Lexer {
        let mut lexer = Lexer::new(Box::new(NoModules)).with_user_version(Version::new(4, 7));
        lexer.push_top_level_buffer("t", content).unwrap();
        lexer
    }

    #[test]
    fn scans_a_keyword_from_the_active_context() {
        let mut lexer = lexer_with("source");
        lexer.context_stack_mut().push(ContextFrame::new(
            ContextType::Root,
            "root",
            vec![Keyword::new("source", 101)],
        ));
        assert_eq!(lexer.next_token().kind, TokenKind::Keyword(101));
    }

    #[test]
    fn unmatched_word_becomes_a_bare_identifier() {
        let mut lexer = lexer_with("mystery");
        lexer.context_stack_mut().push(ContextFrame::new(ContextType::Root, "root", vec![]));
        assert_eq!(lexer.next_token().kind, TokenKind::Identifier("mystery".into()));
    }

    #[test]
    fn obsolete_keyword_is_relabeled_normal_after_first_use() {
        let mut lexer = lexer_with("old old");
        lexer.context_stack_mut().push(ContextFrame::new(
            ContextType::Root,
            "root",
            vec![Keyword::obsolete("old", 5, "use new")],
        ));
        assert_eq!(lexer.next_token().kind, TokenKind::Keyword(5));
        assert_eq!(
            lexer.context_stack_mut().resolve_keyword("old").unwrap().status,
            cfg_context::KeywordStatus::Normal
        );
        assert_eq!(lexer.next_token().kind, TokenKind::Keyword(5));
    }

    #[test]
    fn missing_version_fails_on_first_non_pragma_token() {
        let mut lexer = Lexer::new(Box::new(NoModules));
        lexer.push_top_level_buffer("t", "source").unwrap();
        lexer.context_stack_mut().push(ContextFrame::new(ContextType::Root, "root", vec![]));
        let tok = lexer.next_token();
        assert!(tok.is_error());
    }

    #[test]
    fn version_pragma_is_accepted_and_consumed() {
        let mut lexer = Lexer::new(Box::new(NoModules));
        lexer.push_top_level_buffer("t", "@version: 4.7; source").unwrap();
        lexer.context_stack_mut().push(ContextFrame::new(ContextType::Root, "root", vec![]));
        let tok = lexer.next_token();
        assert_eq!(tok.kind, TokenKind::Identifier("source".into()));
        assert_eq!(lexer.parsed_version(), Some(Version::new(4, 7)));
    }

    #[test]
    fn include_pragma_switches_input_to_the_included_buffer() {
        // @include with an identifier path will fail to resolve against the
        // filesystem; this test only checks that the directive is parsed
        // (filename + semicolon) and produces a lookup failure, not a parse
        // error, when the target doesn't exist.
        let mut lexer = lexer_with("@include \"nope.conf\"; source");
        lexer.context_stack_mut().push(ContextFrame::new(ContextType::Root, "root", vec![]));
        let tok = lexer.next_token();
        assert!(tok.is_error());
    }

    #[test]
    fn block_generator_reference_expands_and_relexes() {
        struct Echo;
        impl BlockGenerator for Echo {
            fn context(&self) -> ContextType {
                ContextType::Root
            }
            fn name(&self) -> &str {
                "my-macro"
            }
            fn generate(&self, _globals: Option<&ArgMap>, args: ArgMap) -> Result<String, LexError> {
                Ok(format!("port={}", args.get("port").unwrap_or("")))
            }
        }

        let mut lexer = lexer_with("my-macro(port(514));");
        lexer
            .context_stack_mut()
            .push(ContextFrame::new(ContextType::Root, "root", vec![]).with_generator_lookup(true));
        lexer.register_generator(Box::new(Echo));

        let tok = lexer.next_token();
        assert_eq!(tok.kind, TokenKind::Identifier("port".into()));
        assert_eq!(lexer.next_token().kind, TokenKind::Punctuation('='));
        assert_eq!(lexer.next_token().kind, TokenKind::Number(514));
    }

    #[test]
    fn preprocess_sink_accumulates_token_text() {
        let mut lexer = lexer_with("abc");
        lexer.context_stack_mut().push(ContextFrame::new(ContextType::Root, "root", vec![]));
        lexer.enable_preprocess_sink();
        lexer.next_token();
        assert_eq!(lexer.take_preprocess_output().as_deref(), Some("abc"));
    }

    #[test]
    fn injected_tokens_are_consumed_before_live_input() {
        let mut lexer = lexer_with("abc");
        lexer.context_stack_mut().push(ContextFrame::new(ContextType::Root, "root", vec![]));
        let mut block = TokenBlock::new();
        block.write(Token::new(
            TokenKind::Number(1),
            Location { span: Span::point(Position::START), frame: FrameId(0) },
        ));
        lexer.inject_token_block(block);
        assert_eq!(lexer.next_token().kind, TokenKind::Number(1));
        assert_eq!(lexer.next_token().kind, TokenKind::Identifier("abc".into()));
    }

    #[test]
    fn ignoring_pragmas_turns_at_markers_into_plain_identifiers() {
        let mut lexer = Lexer::new(Box::new(NoModules))
            .with_user_version(Version::new(4, 7))
            .ignoring_pragmas();
        lexer.push_top_level_buffer("t", "@include").unwrap();
        lexer.context_stack_mut().push(ContextFrame::new(ContextType::Root, "root", vec![]));
        assert_eq!(lexer.next_token().kind, TokenKind::Identifier("@include".into()));
    }
}
