//! In-process front-end built on naga.
//!
//! Handles GLSL (vertex/pixel/compute) and WGSL. Every module is validated
//! before SPIR-V is written, so validation failures surface as diagnostics
//! with a source line rather than as a broken module downstream.

use naga::back::spv;
use naga::valid::{Capabilities, ValidationFlags, Validator};

use super::defines::MacroSet;
use crate::messages::MessageSink;

/// Parses GLSL for `stage` and emits SPIR-V for its `main` entry point.
pub fn compile_glsl(
    source: &str,
    stage: naga::ShaderStage,
    defines: &MacroSet,
    file: &str,
    msgs: &mut dyn MessageSink,
) -> Option<Vec<u32>> {
    let mut options = naga::front::glsl::Options::from(stage);
    for (key, value) in defines.iter() {
        options.defines.insert(key.to_owned(), value.to_owned());
    }

    let mut frontend = naga::front::glsl::Frontend::default();
    let module = match frontend.parse(&options, source) {
        Ok(module) => module,
        Err(parse_errors) => {
            for error in &parse_errors.errors {
                let location = error.meta.location(source);
                msgs.log(
                    &error.kind.to_string(),
                    true,
                    Some(file),
                    Some(location.line_number),
                );
            }
            if parse_errors.errors.is_empty() {
                msgs.log("GLSL parsing failed", true, Some(file), None);
            }
            return None;
        }
    };

    let debug = spv::DebugInfo {
        source_code: source,
        file_name: file,
        language: spv::SourceLanguage::GLSL,
    };
    write_spirv(&module, debug, stage, "main", msgs)
}

/// Parses WGSL and emits SPIR-V for the entry point `entry` of `stage`.
pub fn compile_wgsl(
    source: &str,
    stage: naga::ShaderStage,
    entry: &str,
    file: &str,
    msgs: &mut dyn MessageSink,
) -> Option<Vec<u32>> {
    let module = match naga::front::wgsl::parse_str(source) {
        Ok(module) => module,
        Err(error) => {
            let line = error.location(source).map(|l| l.line_number);
            msgs.log(error.message(), true, Some(file), line);
            return None;
        }
    };

    let debug = spv::DebugInfo {
        source_code: source,
        file_name: file,
        language: spv::SourceLanguage::WGSL,
    };
    write_spirv(&module, debug, stage, entry, msgs)
}

/// Validates a naga module, reporting the first span of a failure.
pub(crate) fn validate(
    module: &naga::Module,
    source: Option<&str>,
    file: Option<&str>,
    msgs: &mut dyn MessageSink,
) -> Option<naga::valid::ModuleInfo> {
    let mut validator = Validator::new(ValidationFlags::all(), Capabilities::all());
    match validator.validate(module) {
        Ok(info) => Some(info),
        Err(error) => {
            let line = source.and_then(|src| {
                error
                    .spans()
                    .next()
                    .map(|(span, _)| span.location(src).line_number)
            });
            msgs.log(&error.as_inner().to_string(), true, file, line);
            None
        }
    }
}

/// Writes SPIR-V with names, `OpString` and per-statement `OpLine`s so the
/// debugger can map functions back to source lines.
fn write_spirv(
    module: &naga::Module,
    debug: spv::DebugInfo<'_>,
    stage: naga::ShaderStage,
    entry: &str,
    msgs: &mut dyn MessageSink,
) -> Option<Vec<u32>> {
    let (source, file) = (debug.source_code, debug.file_name);
    let info = validate(module, Some(source), Some(file), msgs)?;

    if !module
        .entry_points
        .iter()
        .any(|ep| ep.name == entry && ep.stage == stage)
    {
        msgs.log(
            &format!("entry point '{entry}' for the {stage:?} stage was not found"),
            true,
            Some(file),
            None,
        );
        return None;
    }

    let mut options = spv::Options::default();
    options.flags |= spv::WriterFlags::DEBUG;
    options.debug_info = Some(debug);

    let pipeline_options = spv::PipelineOptions {
        shader_stage: stage,
        entry_point: entry.to_owned(),
    };

    match spv::write_vec(module, &info, &options, Some(&pipeline_options)) {
        Ok(words) => Some(words),
        Err(error) => {
            msgs.log(
                &format!("SPIR-V generation failed: {error}"),
                true,
                Some(file),
                None,
            );
            None
        }
    }
}
