//! Plug-in registry: resolves a `(context, name)` reference to a
//! construction capability, loading the owning module the first time a
//! name is seen if only a candidate is known so far.
//!
//! There are two lists: plug-ins a module has already registered, and
//! candidates discovered in a module directory but not yet loaded. A
//! miss against the registered list that hits a candidate triggers a
//! load through the caller-supplied [`ModuleLoader`] and one retry;
//! a miss against both is an error. Generator plug-ins (block
//! generators reachable by bare identifier) are looked up under a
//! separate flag from ordinary keyword-contributing plug-ins, so the
//! same name can mean different things in the two roles.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

use cfg_block::BlockGenerator;
use cfg_context::ContextType;
use cfg_error::PluginError;
use rustc_hash::FxHashMap;

fn normalize(name: &str) -> String {
    name.replace('-', "_")
}

/// The two-part key a plug-in is registered and looked up under:
/// the context it applies to, plus whether it's a generator (block
/// expansion) or an ordinary keyword contribution.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PluginKey {
    context: ContextKey,
    generator: bool,
    name: String,
}

/// `ContextType` plus a `Global` variant for plug-ins reachable from any
/// context (mirrors [`BlockGenerator::is_global`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum ContextKey {
    Any(ContextType),
    Global,
}

impl PluginKey {
    fn new(context: ContextType, generator: bool, name: &str) -> Self {
        PluginKey { context: ContextKey::Any(context), generator, name: normalize(name) }
    }

    fn global(generator: bool, name: &str) -> Self {
        PluginKey { context: ContextKey::Global, generator, name: normalize(name) }
    }
}

/// Loads the plug-ins contributed by one named module.
///
/// The reference implementation resolves this to a shared object on
/// disk and calls its `plugin_module_init`; here the driver binary
/// registers built-in modules statically and supplies the table this
/// trait exposes, which sidesteps the ambient C ABI and ships the same
/// binary it would have dynamically loaded.
pub trait ModuleLoader {
    /// Returns the generators contributed by `module_name`, or an error
    /// if the module cannot be loaded.
    fn load(&self, module_name: &str) -> Result<Vec<Box<dyn BlockGenerator>>, PluginError>;

    /// Lists candidate `(module_name, context, generator_name)` triples
    /// available for discovery, without loading anything.
    fn discover(&self) -> Vec<(String, ContextType, String)>;
}

struct Candidate {
    context: ContextType,
    generator: bool,
    name: String,
    module_name: String,
}

/// The registry itself: registered generators plus undischarged
/// candidates, both bucketed by normalized name (mirrors the reference
/// `GList` linear scan, but avoids rescanning the whole registry for
/// every lookup once a module has registered many generators).
#[derive(Default)]
pub struct PluginRegistry {
    registered: FxHashMap<String, Vec<Box<dyn BlockGenerator>>>,
    candidates: FxHashMap<String, Vec<Candidate>>,
    discovered: bool,
}

impl PluginRegistry {
    pub fn new() -> Self {
        PluginRegistry::default()
    }

    /// Register a generator directly, bypassing module discovery
    /// entirely (how built-in generators like [`cfg_block::Block`]'s
    /// container context enter the registry).
    pub fn register(&mut self, generator: Box<dyn BlockGenerator>) {
        let key = normalize(generator.name());
        self.registered.entry(key).or_default().push(generator);
    }

    pub fn has_discovery_run(&self) -> bool {
        self.discovered
    }

    /// Populate the candidate list from `loader`. A no-op on every call
    /// after the first.
    pub fn discover_candidate_modules(&mut self, loader: &dyn ModuleLoader) {
        if self.discovered {
            return;
        }
        self.discovered = true;
        for (module_name, context, name) in loader.discover() {
            let key = normalize(&name);
            self.candidates.entry(key).or_default().push(Candidate {
                context,
                generator: true,
                name,
                module_name,
            });
        }
    }

    fn find_registered(&self, key: &PluginKey) -> Option<&dyn BlockGenerator> {
        self.registered.get(&key.name)?.iter().find(|g| match key.context {
            ContextKey::Any(context) => g.context() == context || g.is_global(),
            ContextKey::Global => g.is_global(),
        }).map(|b| b.as_ref())
    }

    fn find_candidate_module(&self, key: &PluginKey) -> Option<&str> {
        self.candidates.get(&key.name)?.iter().find(|c| {
            c.generator == key.generator
                && match key.context {
                    ContextKey::Any(context) => c.context == context,
                    ContextKey::Global => true,
                }
        }).map(|c| c.module_name.as_str())
    }

    /// Resolve `name` as a generator reachable from `context`, loading
    /// its module first if only a candidate is known.
    pub fn find_generator(
        &mut self,
        context: ContextType,
        name: &str,
        loader: &dyn ModuleLoader,
    ) -> Result<&dyn BlockGenerator, PluginError> {
        let key = PluginKey::new(context, true, name);
        if self.find_registered(&key).is_none() {
            if let Some(module_name) = self.find_candidate_module(&key).map(str::to_string) {
                let generators = loader.load(&module_name).map_err(|e| match e {
                    PluginError::LoadFailed(_, reason) => PluginError::LoadFailed(module_name.clone(), reason),
                    other => other,
                })?;
                self.absorb_loaded_module(&module_name, generators);
            }
        }
        // Re-borrow immutably now that any mutation above is done.
        let key = PluginKey::new(context, true, name);
        self.find_registered(&key).ok_or_else(|| PluginError::Unknown(name.to_string()))
    }

    /// Resolve `name` as a generator reachable from any context (the
    /// handful of global generators, e.g. template functions).
    pub fn find_global_generator(
        &mut self,
        name: &str,
        loader: &dyn ModuleLoader,
    ) -> Result<&dyn BlockGenerator, PluginError> {
        let key = PluginKey::global(true, name);
        if self.find_registered(&key).is_none() {
            if let Some(module_name) = self.find_candidate_module(&key).map(str::to_string) {
                let generators = loader.load(&module_name)?;
                self.absorb_loaded_module(&module_name, generators);
            }
        }
        let key = PluginKey::global(true, name);
        self.find_registered(&key).ok_or_else(|| PluginError::Unknown(name.to_string()))
    }

    /// Move a just-loaded module's generators into the registered
    /// buckets and drop its now-discharged candidate entries.
    fn absorb_loaded_module(&mut self, module_name: &str, generators: Vec<Box<dyn BlockGenerator>>) {
        for g in generators {
            self.register(g);
        }
        for bucket in self.candidates.values_mut() {
            bucket.retain(|c| c.module_name != module_name);
        }
        self.candidates.retain(|_, bucket| !bucket.is_empty());
    }

    pub fn is_module_available(&self, module_name: &str) -> bool {
        self.candidates.values().any(|bucket| bucket.iter().any(|c| c.module_name == module_name))
    }

    pub fn list_modules(&self) -> Vec<&str> {
        let mut names: Vec<&str> =
            self.candidates.values().flat_map(|bucket| bucket.iter().map(|c| c.module_name.as_str())).collect();
        names.sort_unstable();
        names.dedup();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cfg_argmap::ArgMap;
    use cfg_error::LexError;

    struct Echo {
        context: ContextType,
        name: String,
    }

    impl BlockGenerator for Echo {
        fn context(&self) -> ContextType {
            self.context
        }
        fn name(&self) -> &str {
            &self.name
        }
        fn generate(&self, _globals: Option<&ArgMap>, _args: ArgMap) -> Result<String, LexError> {
            Ok(format!("{}-expanded", self.name))
        }
    }

    struct FakeLoader {
        modules: FxHashMap<&'static str, Vec<(&'static str, ContextType, &'static str)>>,
    }

    impl ModuleLoader for FakeLoader {
        fn load(&self, module_name: &str) -> Result<Vec<Box<dyn BlockGenerator>>, PluginError> {
            let entries = self
                .modules
                .get(module_name)
                .ok_or_else(|| PluginError::LoadFailed(module_name.to_string(), "no such module".to_string()))?;
            Ok(entries
                .iter()
                .map(|(_, context, name)| {
                    Box::new(Echo { context: *context, name: name.to_string() }) as Box<dyn BlockGenerator>
                })
                .collect())
        }

        fn discover(&self) -> Vec<(String, ContextType, String)> {
            self.modules
                .iter()
                .flat_map(|(module, entries)| {
                    entries.iter().map(move |(_, context, name)| (module.to_string(), *context, name.to_string()))
                })
                .collect()
        }
    }

    #[test]
    fn finds_a_directly_registered_generator() {
        let mut registry = PluginRegistry::new();
        registry.register(Box::new(Echo { context: ContextType::Source, name: "my-src".to_string() }));
        let loader = FakeLoader { modules: FxHashMap::default() };
        let g = registry.find_generator(ContextType::Source, "my-src", &loader).unwrap();
        assert_eq!(g.name(), "my-src");
    }

    #[test]
    fn unknown_name_with_no_candidate_is_an_error() {
        let mut registry = PluginRegistry::new();
        let loader = FakeLoader { modules: FxHashMap::default() };
        let err = registry.find_generator(ContextType::Source, "nope", &loader).unwrap_err();
        assert_eq!(err, PluginError::Unknown("nope".to_string()));
    }

    #[test]
    fn candidate_triggers_module_load_then_succeeds_on_retry() {
        let mut modules = FxHashMap::default();
        modules.insert("mod-http", vec![("mod-http", ContextType::Destination, "http")]);
        let loader = FakeLoader { modules };

        let mut registry = PluginRegistry::new();
        registry.discover_candidate_modules(&loader);
        assert!(registry.is_module_available("mod-http"));

        let g = registry.find_generator(ContextType::Destination, "http", &loader).unwrap();
        assert_eq!(g.name(), "http");
        assert!(!registry.is_module_available("mod-http"));
    }

    #[test]
    fn discovery_is_idempotent() {
        let mut modules = FxHashMap::default();
        modules.insert("mod-http", vec![("mod-http", ContextType::Destination, "http")]);
        let loader = FakeLoader { modules };

        let mut registry = PluginRegistry::new();
        registry.discover_candidate_modules(&loader);
        registry.discover_candidate_modules(&loader);
        assert_eq!(registry.list_modules(), vec!["mod-http"]);
        assert!(registry.has_discovery_run());
    }

    #[test]
    fn dash_and_underscore_spellings_resolve_to_the_same_generator() {
        let mut registry = PluginRegistry::new();
        registry.register(Box::new(Echo { context: ContextType::Source, name: "my_src".to_string() }));
        let loader = FakeLoader { modules: FxHashMap::default() };
        assert!(registry.find_generator(ContextType::Source, "my-src", &loader).is_ok());
    }

    #[test]
    fn global_generator_resolves_regardless_of_caller_context() {
        struct Global;
        impl BlockGenerator for Global {
            fn context(&self) -> ContextType {
                ContextType::Root
            }
            fn name(&self) -> &str {
                "format-json"
            }
            fn is_global(&self) -> bool {
                true
            }
            fn generate(&self, _globals: Option<&ArgMap>, _args: ArgMap) -> Result<String, LexError> {
                Ok(String::new())
            }
        }
        let mut registry = PluginRegistry::new();
        registry.register(Box::new(Global));
        let loader = FakeLoader { modules: FxHashMap::default() };
        assert!(registry.find_global_generator("format-json", &loader).is_ok());
    }
}
