//! Shader Macro Definitions
//!
//! Pipeline items store an ordered, user-editable list of [`ShaderMacro`]s,
//! each of which can be toggled off without being deleted. Front-ends receive
//! a [`MacroSet`]: the active macros only, sorted by name so identical macro
//! sets always hash the same.
//!
//! ```rust,ignore
//! let mut defines = MacroSet::new();
//! defines.set("MAX_LIGHTS", "8");
//! defines.set("USE_SHADOWS", "1");
//!
//! let hash = defines.compute_hash();
//! ```

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// A user-defined preprocessor macro attached to a pipeline item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShaderMacro {
    pub name: String,
    pub value: String,
    pub active: bool,
}

impl ShaderMacro {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            active: true,
        }
    }
}

/// Sorted collection of active macro definitions.
///
/// - Insertion/lookup: O(log n) binary search
/// - Identical sets compare and hash equal regardless of insertion order
#[derive(Debug, Clone, Default)]
pub struct MacroSet {
    defines: Vec<(String, String)>,
}

impl MacroSet {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            defines: Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            defines: Vec::with_capacity(capacity),
        }
    }

    /// Collects the active entries of a macro list. Later duplicates win.
    #[must_use]
    pub fn from_macros(macros: &[ShaderMacro]) -> Self {
        let mut set = Self::with_capacity(macros.len());
        for m in macros.iter().filter(|m| m.active) {
            set.set(&m.name, &m.value);
        }
        set
    }

    /// Set a define (maintains sorted order).
    pub fn set(&mut self, key: &str, value: &str) {
        match self.defines.binary_search_by(|(k, _)| k.as_str().cmp(key)) {
            Ok(idx) => value.clone_into(&mut self.defines[idx].1),
            Err(idx) => self.defines.insert(idx, (key.to_owned(), value.to_owned())),
        }
    }

    pub fn remove(&mut self, key: &str) -> bool {
        if let Ok(idx) = self.defines.binary_search_by(|(k, _)| k.as_str().cmp(key)) {
            self.defines.remove(idx);
            true
        } else {
            false
        }
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.defines
            .binary_search_by(|(k, _)| k.as_str().cmp(key))
            .ok()
            .map(|idx| self.defines[idx].1.as_str())
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.defines.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.defines.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.defines.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Values from `other` override values in `self`.
    pub fn merge(&mut self, other: &MacroSet) {
        for (key, value) in other.iter() {
            self.set(key, value);
        }
    }

    /// Content hash, stable within a process.
    #[must_use]
    pub fn compute_hash(&self) -> u64 {
        use std::hash::BuildHasher;

        rustc_hash::FxBuildHasher.hash_one(self)
    }
}

impl Hash for MacroSet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.defines.hash(state);
    }
}

impl PartialEq for MacroSet {
    fn eq(&self, other: &Self) -> bool {
        self.defines == other.defines
    }
}

impl Eq for MacroSet {}

impl From<&[(&str, &str)]> for MacroSet {
    fn from(defines: &[(&str, &str)]) -> Self {
        let mut result = Self::with_capacity(defines.len());
        for (k, v) in defines {
            result.set(k, v);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inactive_macros_are_skipped() {
        let mut off = ShaderMacro::new("DEBUG", "1");
        off.active = false;
        let macros = [ShaderMacro::new("LIGHTS", "4"), off];

        let set = MacroSet::from_macros(&macros);
        assert_eq!(set.len(), 1);
        assert_eq!(set.get("LIGHTS"), Some("4"));
        assert!(!set.contains("DEBUG"));
    }

    #[test]
    fn test_sorted_and_overwrites() {
        let mut set = MacroSet::new();
        set.set("B", "1");
        set.set("A", "1");
        set.set("B", "2");

        let keys: Vec<_> = set.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["A", "B"]);
        assert_eq!(set.get("B"), Some("2"));
        assert!(set.remove("A"));
        assert!(!set.remove("A"));
    }

    #[test]
    fn test_hash_consistency() {
        let d1 = MacroSet::from(&[("A", "1"), ("B", "2")][..]);
        let d2 = MacroSet::from(&[("B", "2"), ("A", "1")][..]);
        assert_eq!(d1, d2);
        assert_eq!(d1.compute_hash(), d2.compute_hash());
    }
}
