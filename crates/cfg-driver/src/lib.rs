//! Wires the component crates into the control flow spec.md §2 describes:
//! build a `GlobalConfig`, drive the lexer to completion over a top-level
//! file, compile and start the resulting `ConfigTree`, and — on reload —
//! hand `PersistStore` ownership to the new configuration before starting
//! it, only stopping the old one once the new one is confirmed running.
//!
//! No grammar crate exists in this workspace (out of scope, same as the
//! reference design treats message templates and destination drivers): a
//! `GlobalConfig`'s tree here is built directly by its caller rather than
//! assembled by parsing. What this crate demonstrates end to end is
//! everything *around* that gap — include/pragma/generator dispatch
//! through a real file, version gating, start/stop rollback, and the
//! persist-store handoff.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

use cfg_block::BlockGenerator;
use cfg_context::ContextType;
use cfg_error::{ConfigError, IncludeError, PersistError, PluginError, StartError};
use cfg_lexer::{Lexer, Version};
use cfg_persist::PersistStore;
use cfg_plugin::ModuleLoader;
use cfg_token::TokenKind;
use cfg_tree::{ConfigTree, ConfigVersion};
use thiserror::Error;

/// Every way loading or starting a configuration can fail, composed from
/// the component crates' own error types the way `perl-error` composes
/// `perl_regex::RegexError` into its top-level `ParseError`.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("{0}")]
    Include(#[from] IncludeError),

    #[error("{location}: {message}")]
    Lex { location: String, message: String },

    #[error(transparent)]
    Plugin(#[from] PluginError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Start(#[from] StartError),

    #[error(transparent)]
    Persist(#[from] PersistError),
}

/// Exit codes per spec.md §6: zero on success, nonzero on every failure
/// kind this enum names.
impl DriverError {
    pub fn exit_code(&self) -> i32 {
        1
    }
}

/// No modules ship with this workspace (spec.md's Non-goals exclude
/// driver modules), so this loader has nothing to load and nothing to
/// discover — matching a syslog-ng binary built `--disable-all-modules`.
#[derive(Default)]
pub struct BuiltinModuleLoader;

impl BuiltinModuleLoader {
    pub fn new() -> Self {
        BuiltinModuleLoader
    }
}

impl ModuleLoader for BuiltinModuleLoader {
    fn load(&self, module_name: &str) -> Result<Vec<Box<dyn BlockGenerator>>, PluginError> {
        Err(PluginError::LoadFailed(module_name.to_string(), "no loadable modules in this build".to_string()))
    }

    fn discover(&self) -> Vec<(String, ContextType, String)> {
        Vec::new()
    }
}

/// One loaded, not-yet-started (or already-running) configuration: the
/// lexer's parsed `@version`, and the tree it assembled.
pub struct GlobalConfig {
    pub version: Version,
    pub tree: ConfigTree,
}

impl GlobalConfig {
    /// Drives the lexer across `path` to completion, the "grammar
    /// repeatedly pulls tokens" step of spec.md §2's control flow — minus
    /// the grammar, since none exists here. Fails on the first lex,
    /// include, or version error the token stream reports.
    pub fn load(path: &str, search_path: &str, target_version: Version) -> Result<GlobalConfig, DriverError> {
        let loader = BuiltinModuleLoader::new();
        let mut lexer = Lexer::new(Box::new(loader)).with_user_version(target_version).with_search_path(search_path);
        lexer.push_top_level_file(path)?;

        loop {
            let token = lexer.next_token();
            if token.is_eof() {
                break;
            }
            if let TokenKind::Error(message) = &token.kind {
                return Err(DriverError::Lex {
                    location: token.location.span.to_string(),
                    message: message.to_string(),
                });
            }
        }

        let version = lexer.parsed_version().unwrap_or(target_version);
        let tree = ConfigTree::new(ConfigVersion::new(version.major, version.minor));
        Ok(GlobalConfig { version, tree })
    }

    /// `cfg_tree_compile` + `cfg_tree_start`, step 4-5 of spec.md §2's
    /// control flow.
    pub fn start(&mut self) -> Result<(), DriverError> {
        self.tree.compile()?;
        self.tree.start()?;
        Ok(())
    }

    pub fn stop(&mut self) {
        self.tree.stop();
    }
}

/// spec.md §2's reload sequence, verbatim: load the new configuration to
/// completion, transfer `PersistStore` ownership, start the new
/// configuration, and only on success stop the old one. On failure the
/// persist store is handed back so the caller's `old` configuration keeps
/// working with it exactly as before the attempt.
pub fn reload(
    mut old: GlobalConfig,
    path: &str,
    search_path: &str,
    target_version: Version,
    persist: PersistStore,
) -> Result<(GlobalConfig, PersistStore), (GlobalConfig, PersistStore, DriverError)> {
    let mut new_config = match GlobalConfig::load(path, search_path, target_version) {
        Ok(config) => config,
        Err(err) => return Err((old, persist, err)),
    };

    match new_config.start() {
        Ok(()) => {
            old.stop();
            Ok((new_config, persist))
        }
        Err(err) => Err((old, persist, err)),
    }
}
