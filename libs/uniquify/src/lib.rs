//! A library for generating unique entity names.
//!
//! Names are allocated from a base name and a per-base counter, so that
//! repeated requests for `"mixer"` yield `"mixer1"`, `"mixer2"`, and so on.
//!
//! Entities copied out of a template (for example, the components of a
//! sub-netlist) can be renamed within a *scope*. The generator remembers
//! every `(scope, old name)` pair so the new name can be looked up later.

use std::collections::{HashMap, HashSet};

use arcstr::ArcStr;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Allocates unique names and remembers scoped renames.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NameGenerator {
    used: HashSet<ArcStr>,
    counters: HashMap<ArcStr, usize>,
    scopes: IndexMap<ArcStr, HashMap<ArcStr, ArcStr>>,
}

impl NameGenerator {
    /// Creates a new, empty name generator.
    pub fn new() -> Self {
        Default::default()
    }

    /// Marks `name` as taken without associating it with a scope.
    ///
    /// Returns `false` if the name was already taken.
    pub fn reserve(&mut self, name: impl Into<ArcStr>) -> bool {
        self.used.insert(name.into())
    }

    /// Returns `true` if `name` has been generated or reserved.
    #[inline]
    pub fn is_used(&self, name: &str) -> bool {
        self.used.contains(name)
    }

    /// Allocates a new, unique name derived from `base`.
    ///
    /// Names that were reserved or generated earlier are skipped.
    pub fn generate_name(&mut self, base: &str) -> ArcStr {
        let counter = self.counters.entry(ArcStr::from(base)).or_insert(0);
        let name = loop {
            *counter += 1;
            let candidate = arcstr::format!("{}{}", base, counter);
            if !self.used.contains(&candidate) {
                break candidate;
            }
        };
        self.used.insert(name.clone());
        name
    }

    /// Allocates a unique name for the entity called `old` inside `scope`.
    ///
    /// The new name is derived from `base` and recorded so that
    /// [`get_name`](NameGenerator::get_name) can resolve it.
    /// Renaming the same `old` twice in a scope replaces the earlier record.
    pub fn rename(&mut self, scope: &str, old: &str, base: &str) -> ArcStr {
        let name = self.generate_name(base);
        tracing::trace!(scope, old, new = %name, "renamed scoped entity");
        self.scopes
            .entry(ArcStr::from(scope))
            .or_default()
            .insert(ArcStr::from(old), name.clone());
        name
    }

    /// Resolves the name that `old` was given inside `scope`.
    pub fn get_name(&self, scope: &str, old: &str) -> Option<ArcStr> {
        self.scopes.get(scope)?.get(old).cloned()
    }

    /// Iterates over the scopes that have recorded renames, in creation order.
    pub fn scopes(&self) -> impl Iterator<Item = &ArcStr> {
        self.scopes.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_are_per_base() {
        let mut names = NameGenerator::new();
        assert_eq!(names.generate_name("c"), "c1");
        assert_eq!(names.generate_name("c"), "c2");
        assert_eq!(names.generate_name("mixer"), "mixer1");
        assert_eq!(names.generate_name("c"), "c3");
    }

    #[test]
    fn reserved_names_are_skipped() {
        let mut names = NameGenerator::new();
        assert!(names.reserve("port1"));
        assert!(!names.reserve("port1"));
        assert_eq!(names.generate_name("port"), "port2");
        assert!(names.is_used("port2"));
    }

    #[test]
    fn scoped_renames_resolve_per_scope() {
        let mut names = NameGenerator::new();
        let a = names.rename("cn_a", "mix", "mix");
        let b = names.rename("cn_b", "mix", "mix");
        assert_ne!(a, b);
        assert_eq!(names.get_name("cn_a", "mix"), Some(a));
        assert_eq!(names.get_name("cn_b", "mix"), Some(b));
        assert_eq!(names.get_name("cn_c", "mix"), None);
        assert_eq!(names.get_name("cn_a", "other"), None);
        assert_eq!(names.scopes().count(), 2);
    }
}
