//! Session Settings
//!
//! User-configurable behaviour of the compiler, the introspector and the
//! debugger. Settings are stored as JSON and every field has a default, so a
//! partial (or empty) settings file is always valid.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use shaderlab::settings::Settings;
//!
//! let mut settings = Settings::load("settings.json").unwrap_or_default();
//! settings.compiler.native_spirv = false; // cross-compile to GLSL
//! settings.save("settings.json")?;
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::Result;

/// Root settings object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub compiler: CompilerSettings,
    pub debug: DebugSettings,
}

impl Settings {
    /// Reads settings from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Writes settings as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// General
// ---------------------------------------------------------------------------

/// File-extension routing and display options.
///
/// Extensions are stored without the leading dot and compared
/// case-insensitively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    pub hlsl_extensions: Vec<String>,
    pub glsl_extensions: Vec<String>,
    pub vulkan_glsl_extensions: Vec<String>,
    pub wgsl_extensions: Vec<String>,
    /// Collapse compiler-generated function name decorations (`main(vf4;` → `main`).
    pub trim_function_names: bool,
    /// Seed new projects with the template shader pass.
    pub open_template_on_new: bool,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            hlsl_extensions: vec!["hlsl".into(), "fx".into()],
            glsl_extensions: vec![
                "glsl".into(),
                "vert".into(),
                "frag".into(),
                "geom".into(),
                "tesc".into(),
                "tese".into(),
                "comp".into(),
            ],
            vulkan_glsl_extensions: vec!["vk".into()],
            wgsl_extensions: vec!["wgsl".into()],
            trim_function_names: true,
            open_template_on_new: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Compiler
// ---------------------------------------------------------------------------

/// Front-end and cross-compiler configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerSettings {
    /// Explicit `glslc` executable; discovered on `PATH` / `VULKAN_SDK` when unset.
    pub glslc_path: Option<PathBuf>,
    /// The active renderer consumes SPIR-V directly. When `false`, every
    /// successful compile is cross-compiled to GLSL.
    pub native_spirv: bool,
    /// GLSL version emitted by the cross-compiler.
    pub glsl_version: u16,
    /// Emit GLSL ES instead of desktop GLSL.
    pub glsl_es: bool,
    /// Reuse SPIR-V for byte-identical inputs.
    pub cache_enabled: bool,
}

impl Default for CompilerSettings {
    fn default() -> Self {
        Self {
            glslc_path: None,
            native_spirv: true,
            glsl_version: 330,
            glsl_es: false,
            cache_enabled: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Debug
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugSettings {
    /// Number of frames averaged by per-pass timing.
    pub timing_window: usize,
    /// Offer function entry lines as breakpoint suggestions.
    pub suggest_breakpoints: bool,
}

impl Default for DebugSettings {
    fn default() -> Self {
        Self {
            timing_window: 60,
            suggest_breakpoints: true,
        }
    }
}
