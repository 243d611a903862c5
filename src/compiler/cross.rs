//! SPIR-V → GLSL cross-compilation.
//!
//! Renderers without native SPIR-V consumption receive GLSL produced from the
//! compiled module. naga's SPIR-V front-end pulls words straight from a
//! [`WordReader`].

use naga::back::glsl;

use super::naga_front::validate;
use super::{ShaderLanguage, ShaderStage};
use crate::messages::MessageSink;
use crate::spirv::WordReader;

/// Output dialect of the cross-compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlslTarget {
    pub version: u16,
    pub es: bool,
}

impl Default for GlslTarget {
    fn default() -> Self {
        Self {
            version: 330,
            es: false,
        }
    }
}

impl GlslTarget {
    fn naga_version(self) -> glsl::Version {
        if self.es {
            glsl::Version::new_gles(self.version)
        } else {
            glsl::Version::Desktop(self.version)
        }
    }
}

/// Converts `spv` back into GLSL for `stage`.
///
/// `language` is the source language the module was compiled from; modules
/// produced from Vulkan-convention languages have their clip space adjusted.
/// With `gs_used`, vertex-stage outputs are renamed so that a geometry stage
/// sitting between the vertex and pixel stages can consume them.
pub fn convert_to_glsl(
    spv: &[u32],
    language: &ShaderLanguage,
    stage: ShaderStage,
    gs_used: bool,
    target: GlslTarget,
    msgs: &mut dyn MessageSink,
) -> Option<String> {
    let Some(naga_stage) = stage.naga_stage() else {
        msgs.log(
            &format!("cross-compilation of {stage:?} shaders is not supported"),
            true,
            None,
            None,
        );
        return None;
    };

    let options = naga::front::spv::Options {
        adjust_coordinate_space: !matches!(language, ShaderLanguage::Glsl),
        ..Default::default()
    };
    let module = match naga::front::spv::Frontend::new(WordReader::new(spv), &options).parse() {
        Ok(module) => module,
        Err(error) => {
            msgs.log(&format!("failed to read SPIR-V: {error}"), true, None, None);
            return None;
        }
    };

    let info = validate(&module, None, None, msgs)?;

    let Some(entry) = module
        .entry_points
        .iter()
        .find(|ep| ep.stage == naga_stage)
        .map(|ep| ep.name.clone())
    else {
        msgs.log(
            &format!("module has no {naga_stage:?} entry point"),
            true,
            None,
            None,
        );
        return None;
    };

    let glsl_options = glsl::Options {
        version: target.naga_version(),
        ..Default::default()
    };
    let pipeline_options = glsl::PipelineOptions {
        shader_stage: naga_stage,
        entry_point: entry,
        multiview: None,
    };

    let mut output = String::new();
    let result = glsl::Writer::new(
        &mut output,
        &module,
        &info,
        &glsl_options,
        &pipeline_options,
        naga::proc::BoundsCheckPolicies::default(),
    )
    .and_then(|mut writer| writer.write().map(|_| ()));

    if let Err(error) = result {
        msgs.log(&format!("GLSL generation failed: {error}"), true, None, None);
        return None;
    }

    if gs_used && stage == ShaderStage::Vertex {
        output = output.replace("_vs2fs_", "_vs2gs_");
    }

    Some(output)
}
