//! Shader Compiler Tests
//!
//! Tests for:
//! - In-process GLSL/WGSL compilation and diagnostics
//! - Language routing by file extension
//! - Plugin languages
//! - The SPIR-V cache
//! - Session recompilation keeping the last good module

use std::path::{Path, PathBuf};

use shaderlab::compiler::{
    CompileRequest, MacroSet, ShaderCompiler, ShaderLanguage, ShaderMacro, ShaderStage,
    shader_language_from_extension,
};
use shaderlab::messages::{MessageKind, MessageSink, MessageStack};
use shaderlab::pipeline::{CompileStatus, ShaderPass, StageSource};
use shaderlab::plugins::{LanguagePlugin, PluginRegistry};
use shaderlab::settings::{CompilerSettings, GeneralSettings};
use shaderlab::{FsProject, ProjectFiles, Session, Settings, SpirvParser};

const VERTEX: &str = "#version 450
layout(location = 0) in vec3 iPos;
void main() {
    gl_Position = vec4(iPos, 1.0);
}
";

const PIXEL: &str = "#version 450
layout(location = 0) out vec4 outColor;
void main() {
    outColor = vec4(1.0, 0.5, 0.25, 1.0);
}
";

const PIXEL_BROKEN: &str = "#version 450
layout(location = 0) out vec4 outColor;
void main() {
    outColor = vec4(1.0, 0.5, 0.25, 1.0)
}
";

const COMPUTE_WGSL: &str = "
@compute @workgroup_size(8, 4, 1)
fn cs_main(@builtin(global_invocation_id) id: vec3<u32>) {
    workgroupBarrier();
}
";

fn request<'a>(language: &'a ShaderLanguage, filename: &'a str, stage: ShaderStage) -> CompileRequest<'a> {
    CompileRequest {
        language,
        filename,
        stage,
        entry: "main",
        macros: &[],
    }
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("shaderlab-compiler-{name}-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

// ============================================================================
// In-process front-end
// ============================================================================

#[test]
fn glsl_pixel_shader_compiles() {
    let mut compiler = ShaderCompiler::new(CompilerSettings::default());
    let mut msgs = MessageStack::new();
    let glsl = ShaderLanguage::Glsl;

    let words = compiler
        .compile_source_to_spirv(
            &request(&glsl, "a.frag", ShaderStage::Pixel),
            PIXEL,
            &PluginRegistry::new(),
            &mut msgs,
        )
        .unwrap();

    assert_eq!(words[0], spirv::MAGIC_NUMBER);
    assert!(!msgs.has_errors());

    let mut summary = SpirvParser::new();
    summary.parse(&words, true);
    assert!(summary.complete);
    assert_eq!(summary.entry_points.len(), 1);
}

#[test]
fn glsl_syntax_error_reports_message() {
    let mut compiler = ShaderCompiler::new(CompilerSettings::default());
    let mut msgs = MessageStack::new();
    let glsl = ShaderLanguage::Glsl;

    let result = compiler.compile_source_to_spirv(
        &request(&glsl, "a.frag", ShaderStage::Pixel),
        PIXEL_BROKEN,
        &PluginRegistry::new(),
        &mut msgs,
    );

    assert!(result.is_none());
    assert!(msgs.error_count() >= 1);
    assert_eq!(msgs.messages()[0].file.as_deref(), Some("a.frag"));
}

#[test]
fn macros_reach_the_preprocessor() {
    let mut compiler = ShaderCompiler::new(CompilerSettings::default());
    let mut msgs = MessageStack::new();
    let glsl = ShaderLanguage::Glsl;
    let source = "#version 450
layout(location = 0) out vec4 outColor;
void main() {
    outColor = vec4(BRIGHTNESS);
}
";
    let macros = [ShaderMacro::new("BRIGHTNESS", "0.5")];
    let req = CompileRequest {
        macros: &macros,
        ..request(&glsl, "m.frag", ShaderStage::Pixel)
    };

    assert!(
        compiler
            .compile_source_to_spirv(&req, source, &PluginRegistry::new(), &mut msgs)
            .is_some()
    );
}

#[test]
fn wgsl_compute_reports_workgroup_size() {
    let mut compiler = ShaderCompiler::new(CompilerSettings::default());
    let mut msgs = MessageStack::new();
    let wgsl = ShaderLanguage::Wgsl;
    let req = CompileRequest {
        entry: "cs_main",
        ..request(&wgsl, "c.wgsl", ShaderStage::Compute)
    };

    let words = compiler
        .compile_source_to_spirv(&req, COMPUTE_WGSL, &PluginRegistry::new(), &mut msgs)
        .unwrap();

    let mut summary = SpirvParser::new();
    summary.parse(&words, true);
    assert_eq!(
        (summary.local_size_x, summary.local_size_y, summary.local_size_z),
        (8, 4, 1)
    );
    assert!(summary.barrier_used);
}

#[test]
fn naga_output_carries_function_lines() {
    let mut compiler = ShaderCompiler::new(CompilerSettings::default());
    let mut msgs = MessageStack::new();
    let glsl = ShaderLanguage::Glsl;
    let source = "#version 450
layout(location = 0) out vec4 outColor;

vec4 shade(vec4 c) {
    return c * 0.5;
}

void main() {
    vec4 base = vec4(1.0, 0.5, 0.25, 1.0);
    outColor = shade(base);
}
";

    let words = compiler
        .compile_source_to_spirv(
            &request(&glsl, "lines.frag", ShaderStage::Pixel),
            source,
            &PluginRegistry::new(),
            &mut msgs,
        )
        .unwrap();

    let mut summary = SpirvParser::new();
    summary.parse(&words, true);

    let shade = summary.function("shade").unwrap();
    let (start, end) = (shade.line_start.unwrap(), shade.line_end.unwrap());
    assert!((4..=6).contains(&start) && (start..=6).contains(&end));
    assert_eq!(shade.file.as_deref(), Some("lines.frag"));

    let main = summary.function("main").unwrap();
    let (start, end) = (main.line_start.unwrap(), main.line_end.unwrap());
    assert!((8..=11).contains(&start) && (start..=11).contains(&end));

    assert_eq!(summary.function_at_line(10).map(|(name, _)| name), Some("main"));
}

#[test]
fn wgsl_has_no_geometry_stage() {
    let mut compiler = ShaderCompiler::new(CompilerSettings::default());
    let mut msgs = MessageStack::new();
    let wgsl = ShaderLanguage::Wgsl;

    let result = compiler.compile_source_to_spirv(
        &request(&wgsl, "g.wgsl", ShaderStage::Geometry),
        COMPUTE_WGSL,
        &PluginRegistry::new(),
        &mut msgs,
    );

    assert!(result.is_none());
    assert!(msgs.has_errors());
}

#[test]
fn missing_file_is_reported() {
    let dir = scratch_dir("missing");
    let project = FsProject::new(&dir);
    let mut compiler = ShaderCompiler::new(CompilerSettings::default());
    let mut msgs = MessageStack::new();
    let glsl = ShaderLanguage::Glsl;

    let result = compiler.compile_to_spirv(
        &request(&glsl, "nope.frag", ShaderStage::Pixel),
        &project,
        &PluginRegistry::new(),
        &mut msgs,
    );

    assert!(result.is_none());
    assert_eq!(msgs.error_count(), 1);
    let _ = std::fs::remove_dir_all(&dir);
}

// ============================================================================
// Cross-compilation
// ============================================================================

#[test]
fn spirv_converts_back_to_glsl() {
    let settings = CompilerSettings {
        native_spirv: false,
        glsl_version: 450,
        ..CompilerSettings::default()
    };
    let mut compiler = ShaderCompiler::new(settings);
    let mut msgs = MessageStack::new();
    let glsl = ShaderLanguage::Glsl;

    let words = compiler
        .compile_source_to_spirv(
            &request(&glsl, "a.frag", ShaderStage::Pixel),
            PIXEL,
            &PluginRegistry::new(),
            &mut msgs,
        )
        .unwrap();
    let output = compiler
        .convert_to_glsl(&words, &glsl, ShaderStage::Pixel, false, &mut msgs)
        .unwrap();

    assert!(output.starts_with("#version 450"));
    assert!(output.contains("void main()"));
}

// ============================================================================
// Language routing
// ============================================================================

struct Flat;

impl LanguagePlugin for Flat {
    fn name(&self) -> &str {
        "Flat"
    }

    fn extensions(&self) -> Vec<String> {
        vec!["flat".into()]
    }

    fn supports_stage(&self, stage: ShaderStage) -> bool {
        stage != ShaderStage::Compute
    }

    fn compile_to_spirv(
        &self,
        _source: &str,
        _stage: ShaderStage,
        _entry: &str,
        defines: &MacroSet,
        file: &str,
        msgs: &mut dyn MessageSink,
    ) -> Option<Vec<u32>> {
        if defines.contains("FAIL") {
            msgs.log("forced failure", true, Some(file), Some(1));
            return None;
        }
        Some(vec![spirv::MAGIC_NUMBER, 0x0001_0000, 0, 1, 0])
    }
}

#[test]
fn extension_lookup() {
    let general = GeneralSettings::default();
    let mut plugins = PluginRegistry::new();
    plugins.register_language("flat-plugin", "flat", Box::new(Flat));

    assert_eq!(
        shader_language_from_extension("shader.hlsl", &general, &plugins),
        Some(ShaderLanguage::Hlsl)
    );
    assert_eq!(
        shader_language_from_extension("dir/shader.FRAG", &general, &plugins),
        Some(ShaderLanguage::Glsl)
    );
    assert_eq!(
        shader_language_from_extension("shader.flat", &general, &plugins),
        Some(ShaderLanguage::Plugin("flat".into()))
    );
    assert_eq!(shader_language_from_extension("shader.xyz", &general, &plugins), None);
    assert_eq!(shader_language_from_extension("Makefile", &general, &plugins), None);
}

#[test]
fn plugin_language_dispatch() {
    let mut plugins = PluginRegistry::new();
    plugins.register_language("flat-plugin", "flat", Box::new(Flat));
    let mut compiler = ShaderCompiler::new(CompilerSettings::default());
    let mut msgs = MessageStack::new();
    let flat = ShaderLanguage::Plugin("flat".into());

    let ok = compiler.compile_source_to_spirv(
        &request(&flat, "a.flat", ShaderStage::Pixel),
        "",
        &plugins,
        &mut msgs,
    );
    assert_eq!(ok.map(|w| w.len()), Some(5));

    let unsupported = compiler.compile_source_to_spirv(
        &request(&flat, "a.flat", ShaderStage::Compute),
        "",
        &plugins,
        &mut msgs,
    );
    assert!(unsupported.is_none());

    let macros = [ShaderMacro::new("FAIL", "1")];
    let failing = CompileRequest {
        macros: &macros,
        ..request(&flat, "b.flat", ShaderStage::Pixel)
    };
    assert!(compiler.compile_source_to_spirv(&failing, "", &plugins, &mut msgs).is_none());
    assert_eq!(msgs.messages().last().unwrap().line, Some(1));

    // Same file and source as the cached module above.
    plugins.unregister_owner("flat-plugin");
    let unregistered = compiler.compile_source_to_spirv(
        &request(&flat, "a.flat", ShaderStage::Pixel),
        "",
        &plugins,
        &mut msgs,
    );
    assert!(unregistered.is_none());
    assert!(msgs.messages().last().unwrap().text.contains("not registered"));
}

#[test]
fn forgetting_plugin_languages_keeps_builtin_modules() {
    let mut plugins = PluginRegistry::new();
    plugins.register_language("flat-plugin", "flat", Box::new(Flat));
    let mut compiler = ShaderCompiler::new(CompilerSettings::default());
    let mut msgs = MessageStack::new();
    let flat = ShaderLanguage::Plugin("flat".into());
    let glsl = ShaderLanguage::Glsl;

    compiler.compile_source_to_spirv(&request(&flat, "a.flat", ShaderStage::Pixel), "", &plugins, &mut msgs);
    compiler.compile_source_to_spirv(&request(&glsl, "a.frag", ShaderStage::Pixel), PIXEL, &plugins, &mut msgs);
    assert_eq!(compiler.cache_len(), 2);

    compiler.forget_plugin_languages();
    assert_eq!(compiler.cache_len(), 1);
}

// ============================================================================
// Cache
// ============================================================================

#[test]
fn identical_inputs_hit_the_cache() {
    let mut compiler = ShaderCompiler::new(CompilerSettings::default());
    let mut msgs = MessageStack::new();
    let plugins = PluginRegistry::new();
    let glsl = ShaderLanguage::Glsl;
    let req = request(&glsl, "a.frag", ShaderStage::Pixel);

    let first = compiler.compile_source_to_spirv(&req, PIXEL, &plugins, &mut msgs);
    let second = compiler.compile_source_to_spirv(&req, PIXEL, &plugins, &mut msgs);
    assert_eq!(first, second);
    assert_eq!(compiler.cache_len(), 1);

    // Failures are not cached.
    compiler.compile_source_to_spirv(&req, PIXEL_BROKEN, &plugins, &mut msgs);
    assert_eq!(compiler.cache_len(), 1);

    compiler.set_settings(CompilerSettings {
        cache_enabled: false,
        ..CompilerSettings::default()
    });
    assert_eq!(compiler.cache_len(), 0);
    compiler.compile_source_to_spirv(&req, PIXEL, &plugins, &mut msgs);
    assert_eq!(compiler.cache_len(), 0);
}

#[test]
fn edits_replace_the_cached_module() {
    let mut compiler = ShaderCompiler::new(CompilerSettings::default());
    let mut msgs = MessageStack::new();
    let plugins = PluginRegistry::new();
    let glsl = ShaderLanguage::Glsl;
    let pixel = request(&glsl, "a.frag", ShaderStage::Pixel);

    for brightness in ["0.1", "0.2", "0.3", "0.4"] {
        let edited = PIXEL.replace("0.5", brightness);
        assert!(compiler.compile_source_to_spirv(&pixel, &edited, &plugins, &mut msgs).is_some());
    }
    assert_eq!(compiler.cache_len(), 1);

    let vertex = request(&glsl, "a.vert", ShaderStage::Vertex);
    compiler.compile_source_to_spirv(&vertex, VERTEX, &plugins, &mut msgs);
    assert_eq!(compiler.cache_len(), 2);

    // Back to an earlier revision: recompiled, still one slot.
    let first = compiler.compile_source_to_spirv(&pixel, PIXEL, &plugins, &mut msgs);
    assert!(first.is_some());
    assert_eq!(compiler.cache_len(), 2);
}

#[test]
fn cache_hit_repeats_warnings() {
    let mut compiler = ShaderCompiler::new(CompilerSettings::default());
    let plugins = PluginRegistry::new();
    let wgsl = ShaderLanguage::Wgsl;
    let macros = [ShaderMacro::new("X", "1")];
    let req = CompileRequest {
        entry: "cs_main",
        macros: &macros,
        ..request(&wgsl, "c.wgsl", ShaderStage::Compute)
    };
    let warnings = |msgs: &MessageStack| {
        msgs.messages()
            .iter()
            .filter(|m| m.kind == MessageKind::Warning)
            .count()
    };

    let mut first = MessageStack::new();
    let a = compiler.compile_source_to_spirv(&req, COMPUTE_WGSL, &plugins, &mut first);
    let mut second = MessageStack::new();
    let b = compiler.compile_source_to_spirv(&req, COMPUTE_WGSL, &plugins, &mut second);

    assert!(a.is_some());
    assert_eq!(a, b);
    assert_eq!(warnings(&first), 1);
    assert_eq!(warnings(&second), 1);
    assert_eq!(second.messages()[0].file.as_deref(), Some("c.wgsl"));
}

// ============================================================================
// Session recompilation
// ============================================================================

fn session_with_pass(dir: &Path) -> Session {
    let _ = env_logger::builder().is_test(true).try_init();
    let project = FsProject::new(dir);
    project.write_text("a.vert", VERTEX).unwrap();
    project.write_text("a.frag", PIXEL).unwrap();

    let mut session = Session::new(Settings::default(), Box::new(project));
    let pass = ShaderPass::new(
        StageSource::new("a.vert", "main", ShaderLanguage::Glsl),
        StageSource::new("a.frag", "main", ShaderLanguage::Glsl),
    );
    session.pipeline_mut().add_shader_pass("pass", pass);
    session
}

#[test]
fn failed_recompile_keeps_previous_module() {
    let dir = scratch_dir("keep");
    let mut session = session_with_pass(&dir);

    assert!(session.recompile("pass"));
    let good = {
        let pass = session.pipeline().get("pass").unwrap().as_shader_pass().unwrap();
        assert_eq!(pass.pixel.status, CompileStatus::Compiled);
        assert!(pass.pixel.is_renderable(true));
        pass.pixel.spirv.clone()
    };
    assert!(!good.is_empty());

    FsProject::new(&dir).write_text("a.frag", PIXEL_BROKEN).unwrap();
    assert!(!session.recompile("pass"));

    let pass = session.pipeline().get("pass").unwrap().as_shader_pass().unwrap();
    assert_eq!(pass.pixel.status, CompileStatus::Failed);
    assert_eq!(pass.pixel.spirv, good);
    assert_eq!(pass.vertex.status, CompileStatus::Compiled);

    let messages = session.context().messages.messages();
    assert!(!messages.is_empty());
    assert!(messages.iter().all(|m| m.group.as_deref() == Some("pass")));
    assert!(messages.iter().any(|m| m.kind == MessageKind::Error));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn recompile_clears_stale_messages() {
    let dir = scratch_dir("stale");
    let mut session = session_with_pass(&dir);
    FsProject::new(&dir).write_text("a.frag", PIXEL_BROKEN).unwrap();

    assert!(!session.recompile("pass"));
    assert!(session.context().messages.has_errors());

    FsProject::new(&dir).write_text("a.frag", PIXEL).unwrap();
    assert!(session.recompile("pass"));
    assert!(!session.context().messages.has_errors());
    assert!(!session.recompile("unknown"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn template_project_compiles() {
    let dir = scratch_dir("template");
    let mut session = Session::new(Settings::default(), Box::new(FsProject::new(&dir)));
    session.new_project(true).unwrap();

    assert_eq!(session.recompile_all(), 1);
    let _ = std::fs::remove_dir_all(&dir);
}
