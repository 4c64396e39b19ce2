//! Error taxonomy shared across the configuration-language front end.
//!
//! Every variant here corresponds to one of the error kinds named in the
//! core's error-handling design: lexical, include, argument-map, grammar,
//! plug-in, config-tree, start, and persistence failures. None of these carry a
//! backtrace or source chain beyond what's needed to render
//! `filename:line:column: message` — that rendering is the caller's job
//! (typically a `tracing::error!` call tagging `file`, `line`, `column`).

use std::fmt;
use thiserror::Error;

/// A source location used to tag diagnostics as they climb the include stack.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl Location {
    pub fn new(file: impl Into<String>, line: u32, column: u32) -> Self {
        Location { file: file.into(), line, column }
    }

    /// The synthetic name used when a diagnostic originates from an
    /// in-memory buffer frame rather than a file.
    pub fn buffer(line: u32, column: u32) -> Self {
        Location { file: "#buffer".to_string(), line, column }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// Malformed literals, unterminated backtick references, disallowed
/// apostrophe content, unknown escapes.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LexError {
    #[error("missing closing backtick (`) character")]
    MissingClosingBacktick,

    #[error("cannot substitute backticked values right after a string quote character")]
    BacktickAfterQuoteChar,

    #[error("cannot represent apostrophes within apostroph-enclosed string")]
    ApostropheInQstring,

    #[error("unterminated string literal")]
    UnterminatedString,

    #[error("unknown escape sequence '\\{0}'")]
    UnknownEscape(char),

    #[error("{0}")]
    Other(String),
}

/// File not found, directory unreadable, include depth exceeded, glob
/// failure other than "no match".
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IncludeError {
    #[error("include file `{0}` not found")]
    NotFound(String),

    #[error("cannot read directory `{0}`")]
    DirectoryUnreadable(String),

    #[error("include depth exceeded ({max} frames)")]
    DepthExceeded { max: usize },

    #[error("glob pattern `{0}` failed: {1}")]
    GlobFailure(String, String),
}

/// An argument-validation failure: either an instance argument that no
/// definition recognizes, or a mandatory definition with no value supplied.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ArgMapError {
    #[error("unknown argument `{0}`")]
    Unknown(String),

    #[error("missing mandatory argument `{0}`")]
    MissingMandatory(String),
}

/// A bad token at a given location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarError {
    pub location: Location,
    pub found: String,
    pub expected: Option<String>,
}

impl fmt::Display for GrammarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: syntax error, unexpected {}", self.location, self.found)?;
        if let Some(expected) = &self.expected {
            write!(f, ", expected {expected}")?;
        }
        Ok(())
    }
}

impl std::error::Error for GrammarError {}

/// Unknown module, candidate exists but failed to load, incompatible version.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PluginError {
    #[error("no plug-in registered for `{0}` in this context")]
    Unknown(String),

    #[error("candidate module for `{0}` failed to load: {1}")]
    LoadFailed(String, String),

    #[error("plug-in `{0}` is incompatible with the requested version")]
    IncompatibleVersion(String),
}

/// Duplicate object name disallowed, dangling reference, missing `@version`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("object `{name}` of kind {kind:?} already exists")]
    DuplicateObject { name: String, kind: String },

    #[error("reference to undefined object `{0}`")]
    DanglingReference(String),

    #[error("configuration does not specify a @version")]
    MissingVersion,

    #[error("{0}")]
    Other(String),
}

/// A pipe's `init` returned false; rollback happened at the call site.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("initialization of node `{node}` failed")]
pub struct StartError {
    pub node: String,
}

/// Corrupt header, corrupt record, unsupported format, disk full during
/// grow, rename failed at commit.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PersistError {
    #[error("corrupt persist file header")]
    CorruptHeader,

    #[error("corrupt persist record at offset {0}")]
    CorruptRecord(u32),

    #[error("unsupported persist file format version {0}")]
    UnsupportedVersion(u8),

    #[error("persist file too large ({0} bytes, limit is 2 GiB)")]
    FileTooLarge(u64),

    #[error("persist key `{0}` is too large to store")]
    KeyTooLarge(String),

    #[error("persist chain offset {0} is out of bounds")]
    ChainOutOfBounds(u32),

    #[error("failed to grow persist file: {0}")]
    GrowFailed(String),

    #[error("failed to commit persist file: {0}")]
    CommitFailed(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for PersistError {
    fn from(err: std::io::Error) -> Self {
        PersistError::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_renders_filename_line_column() {
        let loc = Location::new("syslog-ng.conf", 12, 4);
        assert_eq!(loc.to_string(), "syslog-ng.conf:12:4");
    }

    #[test]
    fn buffer_location_uses_sentinel_name() {
        let loc = Location::buffer(1, 1);
        assert_eq!(loc.file, "#buffer");
    }

    #[test]
    fn grammar_error_display_includes_expected_when_present() {
        let err = GrammarError {
            location: Location::new("x.conf", 3, 1),
            found: "number".to_string(),
            expected: Some("identifier".to_string()),
        };
        assert_eq!(err.to_string(), "x.conf:3:1: syntax error, unexpected number, expected identifier");
    }

    #[test]
    fn grammar_error_display_omits_expected_when_absent() {
        let err = GrammarError { location: Location::new("x.conf", 3, 1), found: "eof".to_string(), expected: None };
        assert_eq!(err.to_string(), "x.conf:3:1: syntax error, unexpected eof");
    }
}
