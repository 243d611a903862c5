//! Default project template.
//!
//! The template's shader sources are embedded in the binary; debug builds
//! prefer the on-disk copy so edits show up without a rebuild.

use rust_embed::RustEmbed;

use super::item::{PipelineItem, ShaderPass, StageSource};
use crate::compiler::ShaderLanguage;
use crate::variables::{ShaderVariable, SystemVariable, ValueType};

#[derive(RustEmbed)]
#[folder = "src/templates"]
struct TemplateAssets;

/// Name of the seeded shader pass.
pub const TEMPLATE_PASS_NAME: &str = "Simple";

/// Project-relative paths of the template sources.
pub const TEMPLATE_VERTEX_PATH: &str = "shaders/simple.vert";
pub const TEMPLATE_PIXEL_PATH: &str = "shaders/simple.frag";

/// Returns the embedded template file `name` (e.g. `"simple.vert"`).
#[must_use]
pub fn template_source(name: &str) -> Option<String> {
    #[cfg(all(debug_assertions, not(target_arch = "wasm32")))]
    {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("src/templates")
            .join(name);
        if let Ok(source) = std::fs::read_to_string(&path) {
            return Some(source);
        }
    }

    TemplateAssets::get(name)
        .and_then(|file| std::str::from_utf8(file.data.as_ref()).ok().map(str::to_owned))
}

/// `(project path, source)` pairs the template pass reads.
#[must_use]
pub fn template_files() -> Vec<(&'static str, String)> {
    [
        (TEMPLATE_VERTEX_PATH, "simple.vert"),
        (TEMPLATE_PIXEL_PATH, "simple.frag"),
    ]
    .into_iter()
    .filter_map(|(path, asset)| template_source(asset).map(|source| (path, source)))
    .collect()
}

/// The `"Simple"` shader pass: GLSL vertex + pixel stages with the camera
/// view-projection and a geometry transform bound as variables.
#[must_use]
pub fn template_item() -> PipelineItem {
    let mut pass = ShaderPass::new(
        StageSource::new(TEMPLATE_VERTEX_PATH, "main", ShaderLanguage::Glsl),
        StageSource::new(TEMPLATE_PIXEL_PATH, "main", ShaderLanguage::Glsl),
    );

    if let Some(vp) =
        ShaderVariable::with_system("matVP", ValueType::Float4x4, SystemVariable::ViewProjection)
    {
        pass.variables.add(vp);
    }
    if let Some(geo) = ShaderVariable::with_system(
        "matGeo",
        ValueType::Float4x4,
        SystemVariable::GeometryTransform,
    ) {
        pass.variables.add(geo);
    }

    PipelineItem::shader_pass(TEMPLATE_PASS_NAME, pass)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_assets_are_embedded() {
        let files = template_files();
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|(_, src)| src.contains("void main")));
        assert!(template_source("missing.glsl").is_none());
    }

    #[test]
    fn test_template_item() {
        let item = template_item();
        assert_eq!(item.name(), TEMPLATE_PASS_NAME);
        let vars = item.variables().unwrap();
        assert_eq!(vars.get("matVP").unwrap().system(), SystemVariable::ViewProjection);
        assert!(vars.contains("matGeo"));
    }
}
