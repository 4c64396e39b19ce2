//! Ordered, reference-counted name→string map — the building block of
//! block arguments, block argument-definitions, and lexer globals.
//!
//! Reference counting of an `ArgMap` is modeled the idiomatic Rust way: wrap
//! a built map in `Arc<ArgMap>` once it is ready to be shared (the `ref`/
//! `unref` pair from the design is exactly `Arc::clone`/drop). Mutation
//! happens only while a map is still uniquely owned, before it is wrapped
//! and handed to a [`Substitutor`](../cfg_substitute/index.html) or block
//! instance.

pub use cfg_error::ArgMapError;

/// Byte-transparent name→value map preserving insertion order.
///
/// Lookup treats `-` and `_` as equivalent in names (`include-path` and
/// `include_path` resolve to the same slot); the stored value bytes are
/// never re-encoded.
#[derive(Debug, Clone, Default)]
pub struct ArgMap {
    entries: Vec<(String, String)>,
}

/// Declares which names an [`ArgMap`] instance is allowed to carry, and
/// their defaults.
///
/// `None` for a name's default means the name is mandatory: a validated
/// instance map must supply it.
#[derive(Debug, Clone, Default)]
pub struct ArgDefs {
    entries: Vec<(String, Option<String>)>,
    accepts_varargs: bool,
}

/// Normalizes `-`/`_` to the same character so lookups don't care which
/// spelling the caller used.
fn normalize(name: &str) -> String {
    name.replace('-', "_")
}

impl ArgMap {
    pub fn new() -> Self {
        ArgMap::default()
    }

    /// Insert or overwrite a value, keeping the entry's original position
    /// if the normalized name was already present.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let key = normalize(&name);
        if let Some(slot) = self.entries.iter_mut().find(|(n, _)| normalize(n) == key) {
            slot.1 = value.into();
        } else {
            self.entries.push((name, value.into()));
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        let key = normalize(name);
        self.entries.iter().find(|(n, _)| normalize(n) == key).map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Visit entries in insertion order.
    pub fn for_each(&self, mut f: impl FnMut(&str, &str)) {
        for (name, value) in &self.entries {
            f(name, value);
        }
    }

    /// Check that every entry here is declared in `defs` (unless `defs`
    /// accepts varargs) and that every mandatory `defs` entry is present.
    pub fn validate(&self, defs: &ArgDefs) -> Result<(), ArgMapError> {
        if !defs.accepts_varargs {
            for (name, _) in &self.entries {
                if !defs.contains(name) {
                    return Err(ArgMapError::Unknown(name.clone()));
                }
            }
        }
        for (name, default) in &defs.entries {
            if default.is_none() && !self.contains(name) {
                return Err(ArgMapError::MissingMandatory(name.clone()));
            }
        }
        Ok(())
    }

    /// Format the entries that `defs` does not declare as a
    /// space-separated `name(value) ` list, used to forward unknown
    /// parameters into generator output as `__VARARGS__`.
    pub fn format_varargs(&self, defs: &ArgDefs) -> String {
        let mut out = String::new();
        for (name, value) in &self.entries {
            if !defs.contains(name) {
                out.push_str(name);
                out.push('(');
                out.push_str(value);
                out.push_str(") ");
            }
        }
        out
    }
}

impl ArgDefs {
    pub fn new() -> Self {
        ArgDefs::default()
    }

    pub fn with_varargs() -> Self {
        ArgDefs { entries: Vec::new(), accepts_varargs: true }
    }

    pub fn accepts_varargs(&self) -> bool {
        self.accepts_varargs
    }

    /// Declare a mandatory argument (no default).
    pub fn mandatory(&mut self, name: impl Into<String>) -> &mut Self {
        self.entries.push((name.into(), None));
        self
    }

    /// Declare an optional argument with a default value.
    pub fn optional(&mut self, name: impl Into<String>, default: impl Into<String>) -> &mut Self {
        self.entries.push((name.into(), Some(default.into())));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        let key = normalize(name);
        self.entries.iter().any(|(n, _)| normalize(n) == key)
    }

    pub fn default_for(&self, name: &str) -> Option<&str> {
        let key = normalize(name);
        self.entries.iter().find(|(n, _)| normalize(n) == key).and_then(|(_, v)| v.as_deref())
    }

    /// The subset of entries that carry a default, as a flat map — the
    /// shape `cfg-substitute`'s lookup precedence needs for the `defs`
    /// tier (a mandatory entry with no default has nothing to offer a
    /// substitution and is simply absent here).
    pub fn defaults_as_argmap(&self) -> ArgMap {
        let mut map = ArgMap::new();
        for (name, default) in &self.entries {
            if let Some(value) = default {
                map.set(name.clone(), value.clone());
            }
        }
        map
    }
}
