//! Shader Compiler
//!
//! Turns shader source into SPIR-V and, for renderers without native SPIR-V
//! support, SPIR-V back into GLSL.
//!
//! ## Front-ends
//!
//! | Language | Vertex / Pixel / Compute / Audio | Geometry / Tessellation |
//! |----------|----------------------------------|-------------------------|
//! | GLSL, Vulkan GLSL | naga (in-process)       | `glslc`                 |
//! | HLSL     | `glslc`                          | `glslc`                 |
//! | WGSL     | naga (in-process)                | unsupported             |
//! | Plugin   | the registered [`LanguagePlugin`](crate::plugins::LanguagePlugin) |  |
//!
//! Compilation never panics and never returns an error type: diagnostics are
//! reported through a [`MessageSink`] and the result is `None` on failure, so
//! callers keep their last good artifact.
//!
//! Each `(file, stage)` slot caches its last successful module, keyed by the
//! xxh3-128 hash of the full input (language, stage, entry point, active
//! macros and source text). A recompile replaces the slot, so the cache holds
//! at most one module per shader stage. Warnings emitted by the front-end are
//! stored with the module and replayed on a hit.

pub mod cross;
pub mod defines;
pub mod glslc;
pub mod language;
pub mod naga_front;

use std::fmt::Write as _;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::xxh3_128;

pub use cross::GlslTarget;
pub use defines::{MacroSet, ShaderMacro};
pub use glslc::Glslc;
pub use language::{plugin_language_from_extension, shader_language_from_extension};

use crate::messages::MessageSink;
use crate::plugins::PluginRegistry;
use crate::project::ProjectFiles;
use crate::settings::CompilerSettings;

/// Pipeline role of a compiled unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShaderStage {
    Vertex,
    Pixel,
    Geometry,
    TessellationControl,
    TessellationEvaluation,
    Compute,
    /// Audio shaders are pixel shaders whose output is read back as samples.
    Audio,
}

impl ShaderStage {
    /// The naga stage used to compile this stage, if naga can express it.
    #[must_use]
    pub fn naga_stage(self) -> Option<naga::ShaderStage> {
        match self {
            Self::Vertex => Some(naga::ShaderStage::Vertex),
            Self::Pixel | Self::Audio => Some(naga::ShaderStage::Fragment),
            Self::Compute => Some(naga::ShaderStage::Compute),
            Self::Geometry | Self::TessellationControl | Self::TessellationEvaluation => None,
        }
    }

    /// Stage name understood by `glslc -fshader-stage=`.
    #[must_use]
    pub fn glslc_name(self) -> &'static str {
        match self {
            Self::Vertex => "vert",
            Self::Pixel | Self::Audio => "frag",
            Self::Geometry => "geom",
            Self::TessellationControl => "tesc",
            Self::TessellationEvaluation => "tese",
            Self::Compute => "comp",
        }
    }
}

/// Source language of a shader.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShaderLanguage {
    Hlsl,
    /// OpenGL-flavoured GLSL.
    Glsl,
    VulkanGlsl,
    Wgsl,
    /// A plugin language, by registry key.
    Plugin(String),
}

impl ShaderLanguage {
    #[must_use]
    pub fn is_glsl_family(&self) -> bool {
        matches!(self, Self::Glsl | Self::VulkanGlsl)
    }
}

/// Everything that identifies one compile besides the source text.
#[derive(Debug, Clone, Copy)]
pub struct CompileRequest<'a> {
    pub language: &'a ShaderLanguage,
    /// Project-relative path, used for reading and for diagnostics.
    pub filename: &'a str,
    pub stage: ShaderStage,
    pub entry: &'a str,
    pub macros: &'a [ShaderMacro],
}

/// Non-error diagnostic kept alongside a cached module.
#[derive(Debug, Clone)]
struct CachedNote {
    text: String,
    file: Option<String>,
    line: Option<u32>,
    warning: bool,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    hash: u128,
    language: ShaderLanguage,
    words: Vec<u32>,
    notes: Vec<CachedNote>,
}

/// Forwards every diagnostic and keeps the non-error ones.
struct NoteRecorder<'a> {
    inner: &'a mut dyn MessageSink,
    notes: Vec<CachedNote>,
}

impl MessageSink for NoteRecorder<'_> {
    fn log(&mut self, message: &str, is_error: bool, file: Option<&str>, line: Option<u32>) {
        if !is_error {
            self.notes.push(CachedNote {
                text: message.to_owned(),
                file: file.map(str::to_owned),
                line,
                warning: false,
            });
        }
        self.inner.log(message, is_error, file, line);
    }

    fn warn(&mut self, message: &str, file: Option<&str>, line: Option<u32>) {
        self.notes.push(CachedNote {
            text: message.to_owned(),
            file: file.map(str::to_owned),
            line,
            warning: true,
        });
        self.inner.warn(message, file, line);
    }
}

/// Front-end orchestration plus the SPIR-V cache.
#[derive(Debug, Default)]
pub struct ShaderCompiler {
    settings: CompilerSettings,
    glslc: Option<Glslc>,
    cache: FxHashMap<(String, ShaderStage), CacheEntry>,
}

impl ShaderCompiler {
    #[must_use]
    pub fn new(settings: CompilerSettings) -> Self {
        Self {
            settings,
            glslc: None,
            cache: FxHashMap::default(),
        }
    }

    #[must_use]
    pub fn settings(&self) -> &CompilerSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: CompilerSettings) {
        if settings.glslc_path != self.settings.glslc_path {
            self.glslc = None;
        }
        if !settings.cache_enabled {
            self.cache.clear();
        }
        self.settings = settings;
    }

    /// Number of cached SPIR-V modules.
    #[must_use]
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Drops every module produced by a plugin language.
    pub fn forget_plugin_languages(&mut self) {
        self.cache
            .retain(|_, entry| !matches!(entry.language, ShaderLanguage::Plugin(_)));
    }

    /// Resolves `request.filename` through the project, reads it, and
    /// compiles it.
    pub fn compile_to_spirv(
        &mut self,
        request: &CompileRequest<'_>,
        project: &dyn ProjectFiles,
        plugins: &PluginRegistry,
        msgs: &mut dyn MessageSink,
    ) -> Option<Vec<u32>> {
        if project.resolve_path(request.filename).is_none() {
            msgs.log("shader file not found", true, Some(request.filename), None);
            return None;
        }

        let source = match project.read_text(request.filename) {
            Ok(source) => source,
            Err(e) => {
                msgs.log(
                    &format!("failed to read shader: {e}"),
                    true,
                    Some(request.filename),
                    None,
                );
                return None;
            }
        };

        self.compile_source_to_spirv(request, &source, plugins, msgs)
    }

    /// Compiles `source` with the front-end selected by the request's
    /// language and stage.
    pub fn compile_source_to_spirv(
        &mut self,
        request: &CompileRequest<'_>,
        source: &str,
        plugins: &PluginRegistry,
        msgs: &mut dyn MessageSink,
    ) -> Option<Vec<u32>> {
        if !frontend_available(request, plugins, msgs) {
            return None;
        }

        let defines = MacroSet::from_macros(request.macros);
        let slot = (request.filename.to_owned(), request.stage);

        let hash = self.settings.cache_enabled.then(|| cache_key(request, &defines, source));
        if let Some(entry) = hash.and_then(|h| self.cache.get(&slot).filter(|e| e.hash == h)) {
            log::debug!("SPIR-V cache hit for '{}' ({:?})", request.filename, request.stage);
            for note in &entry.notes {
                let file = note.file.as_deref();
                if note.warning {
                    msgs.warn(&note.text, file, note.line);
                } else {
                    msgs.log(&note.text, false, file, note.line);
                }
            }
            return Some(entry.words.clone());
        }

        log::info!(
            "Compiling '{}' as {:?} {:?} (entry '{}')",
            request.filename,
            request.language,
            request.stage,
            request.entry
        );

        let mut recorder = NoteRecorder {
            inner: msgs,
            notes: Vec::new(),
        };
        let result = self.dispatch(request, &defines, source, plugins, &mut recorder);

        if let Some(words) = &result {
            log::debug!("'{}' compiled to {} words", request.filename, words.len());
            if let Some(hash) = hash {
                self.cache.insert(
                    slot,
                    CacheEntry {
                        hash,
                        language: request.language.clone(),
                        words: words.clone(),
                        notes: recorder.notes,
                    },
                );
            }
        }
        result
    }

    /// Converts SPIR-V to GLSL using the configured output dialect.
    pub fn convert_to_glsl(
        &self,
        spv: &[u32],
        language: &ShaderLanguage,
        stage: ShaderStage,
        gs_used: bool,
        msgs: &mut dyn MessageSink,
    ) -> Option<String> {
        let target = GlslTarget {
            version: self.settings.glsl_version,
            es: self.settings.glsl_es,
        };
        cross::convert_to_glsl(spv, language, stage, gs_used, target, msgs)
    }

    fn dispatch(
        &mut self,
        request: &CompileRequest<'_>,
        defines: &MacroSet,
        source: &str,
        plugins: &PluginRegistry,
        msgs: &mut dyn MessageSink,
    ) -> Option<Vec<u32>> {
        let file = request.filename;
        let stage = request.stage;

        match request.language {
            ShaderLanguage::Glsl | ShaderLanguage::VulkanGlsl => {
                if let Some(naga_stage) = stage.naga_stage() {
                    if request.entry != "main" {
                        msgs.warn(
                            &format!("GLSL entry points are always 'main', ignoring '{}'", request.entry),
                            Some(file),
                            None,
                        );
                    }
                    naga_front::compile_glsl(source, naga_stage, defines, file, msgs)
                } else {
                    let glslc = self.glslc(file, msgs)?;
                    glslc.compile(request.language, stage, source, "main", defines, file, msgs)
                }
            }
            ShaderLanguage::Hlsl => {
                let glslc = self.glslc(file, msgs)?;
                glslc.compile(request.language, stage, source, request.entry, defines, file, msgs)
            }
            ShaderLanguage::Wgsl => {
                let naga_stage = stage.naga_stage()?;
                if !defines.is_empty() {
                    msgs.warn("WGSL has no preprocessor, macros are ignored", Some(file), None);
                }
                naga_front::compile_wgsl(source, naga_stage, request.entry, file, msgs)
            }
            ShaderLanguage::Plugin(key) => {
                let plugin = plugins.language(key)?;
                plugin.compile_to_spirv(source, stage, request.entry, defines, file, msgs)
            }
        }
    }

    fn glslc(&mut self, file: &str, msgs: &mut dyn MessageSink) -> Option<&Glslc> {
        if self.glslc.is_none() {
            match Glslc::locate(self.settings.glslc_path.as_deref()) {
                Ok(tool) => {
                    log::info!("Using glslc: {}", tool.path().display());
                    self.glslc = Some(tool);
                }
                Err(e) => {
                    msgs.log(&e.to_string(), true, Some(file), None);
                    return None;
                }
            }
        }
        self.glslc.as_ref()
    }
}

/// Reports requests no front-end can take. Checked before the cache so a
/// stale module never stands in for a language that is gone.
fn frontend_available(
    request: &CompileRequest<'_>,
    plugins: &PluginRegistry,
    msgs: &mut dyn MessageSink,
) -> bool {
    let file = Some(request.filename);
    let stage = request.stage;
    match request.language {
        ShaderLanguage::Wgsl if stage.naga_stage().is_none() => {
            msgs.log(&format!("WGSL has no {stage:?} stage"), true, file, None);
            false
        }
        ShaderLanguage::Plugin(key) => match plugins.language(key) {
            None => {
                msgs.log(
                    &format!("plugin language '{key}' is not registered"),
                    true,
                    file,
                    None,
                );
                false
            }
            Some(plugin) if !plugin.supports_stage(stage) => {
                msgs.log(
                    &format!("{} does not support the {stage:?} stage", plugin.name()),
                    true,
                    file,
                    None,
                );
                false
            }
            Some(_) => true,
        },
        _ => true,
    }
}

fn cache_key(request: &CompileRequest<'_>, defines: &MacroSet, source: &str) -> u128 {
    let mut key = String::with_capacity(source.len() + 128);
    let _ = write!(
        key,
        "{:?}\u{0}{:?}\u{0}{}\u{0}",
        request.language, request.stage, request.entry
    );
    for (name, value) in defines.iter() {
        let _ = write!(key, "{name}={value}\u{0}");
    }
    key.push_str(source);
    xxh3_128(key.as_bytes())
}
