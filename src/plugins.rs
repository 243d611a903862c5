//! Plugin Registry
//!
//! Plugins extend the lab with extra shader languages, extra built-in
//! functions for function-backed variables, and custom pipeline item types.
//! Each capability is registered under a stable string key and resolved at
//! runtime by that key.
//!
//! ```rust,ignore
//! let mut plugins = PluginRegistry::new();
//! plugins.register_language("slang-plugin", "slang", Box::new(SlangLanguage));
//!
//! let key = plugins.language_for_extension("slang"); // Some("slang")
//! ```

use rustc_hash::FxHashMap;

use crate::compiler::{MacroSet, ShaderStage};
use crate::messages::MessageSink;
use crate::variables::ValueType;

/// A plugin-provided shader language.
pub trait LanguagePlugin {
    /// Display name.
    fn name(&self) -> &str;

    /// File extensions (without the dot) routed to this language.
    fn extensions(&self) -> Vec<String>;

    fn supports_stage(&self, _stage: ShaderStage) -> bool {
        true
    }

    /// Compiles `source`; diagnostics go to `msgs`.
    fn compile_to_spirv(
        &self,
        source: &str,
        stage: ShaderStage,
        entry: &str,
        defines: &MacroSet,
        file: &str,
        msgs: &mut dyn MessageSink,
    ) -> Option<Vec<u32>>;
}

/// A plugin-provided built-in function for function-backed variables.
pub trait FunctionPlugin {
    fn name(&self) -> &str;

    /// Number of `f32` arguments.
    fn argument_count(&self) -> usize;

    fn has_valid_return_type(&self, value_type: ValueType) -> bool;

    /// Writes the result for `value_type` into `out` (sized for that type).
    fn evaluate(&self, arguments: &[f32], value_type: ValueType, out: &mut [u8]);
}

struct LanguageEntry {
    owner: String,
    plugin: Box<dyn LanguagePlugin>,
}

struct FunctionEntry {
    owner: String,
    plugin: Box<dyn FunctionPlugin>,
}

/// Runtime registry of plugin capabilities, owned by the session.
#[derive(Default)]
pub struct PluginRegistry {
    languages: FxHashMap<String, LanguageEntry>,
    /// Registration order, for deterministic extension lookup.
    language_order: Vec<String>,
    functions: FxHashMap<String, FunctionEntry>,
    item_types: FxHashMap<String, String>,
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("languages", &self.language_order)
            .field("functions", &self.functions.keys().collect::<Vec<_>>())
            .field("item_types", &self.item_types)
            .finish()
    }
}

impl PluginRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ---- Languages ---------------------------------------------------------

    /// Returns `false` (and drops `plugin`) when `key` is taken.
    pub fn register_language(
        &mut self,
        owner: &str,
        key: &str,
        plugin: Box<dyn LanguagePlugin>,
    ) -> bool {
        if self.languages.contains_key(key) {
            log::warn!("Plugin language '{key}' is already registered");
            return false;
        }
        log::info!("Registered plugin language '{key}' ({}) from '{owner}'", plugin.name());
        self.languages.insert(
            key.to_owned(),
            LanguageEntry {
                owner: owner.to_owned(),
                plugin,
            },
        );
        self.language_order.push(key.to_owned());
        true
    }

    #[must_use]
    pub fn language(&self, key: &str) -> Option<&dyn LanguagePlugin> {
        self.languages.get(key).map(|e| e.plugin.as_ref())
    }

    #[must_use]
    pub fn language_owner(&self, key: &str) -> Option<&str> {
        self.languages.get(key).map(|e| e.owner.as_str())
    }

    /// Key of the first registered language claiming `extension`.
    #[must_use]
    pub fn language_for_extension(&self, extension: &str) -> Option<&str> {
        self.language_order
            .iter()
            .find(|key| {
                self.languages[key.as_str()]
                    .plugin
                    .extensions()
                    .iter()
                    .any(|e| e.eq_ignore_ascii_case(extension))
            })
            .map(String::as_str)
    }

    // ---- Functions ---------------------------------------------------------

    pub fn register_function(
        &mut self,
        owner: &str,
        key: &str,
        plugin: Box<dyn FunctionPlugin>,
    ) -> bool {
        if self.functions.contains_key(key) {
            log::warn!("Plugin function '{key}' is already registered");
            return false;
        }
        self.functions.insert(
            key.to_owned(),
            FunctionEntry {
                owner: owner.to_owned(),
                plugin,
            },
        );
        true
    }

    #[must_use]
    pub fn function(&self, key: &str) -> Option<&dyn FunctionPlugin> {
        self.functions.get(key).map(|e| e.plugin.as_ref())
    }

    #[must_use]
    pub fn function_owner(&self, key: &str) -> Option<&str> {
        self.functions.get(key).map(|e| e.owner.as_str())
    }

    // ---- Item types --------------------------------------------------------

    /// Declares a custom pipeline item type name owned by `owner`.
    pub fn register_item_type(&mut self, owner: &str, type_name: &str) -> bool {
        if self.item_types.contains_key(type_name) {
            return false;
        }
        self.item_types
            .insert(type_name.to_owned(), owner.to_owned());
        true
    }

    #[must_use]
    pub fn item_type_owner(&self, type_name: &str) -> Option<&str> {
        self.item_types.get(type_name).map(String::as_str)
    }

    /// Drops every capability registered by `owner`.
    pub fn unregister_owner(&mut self, owner: &str) {
        self.languages.retain(|_, e| e.owner != owner);
        let languages = &self.languages;
        self.language_order.retain(|k| languages.contains_key(k));
        self.functions.retain(|_, e| e.owner != owner);
        self.item_types.retain(|_, o| o != owner);
    }
}
