//! File-extension → language routing.

use std::path::Path;

use super::ShaderLanguage;
use crate::plugins::PluginRegistry;
use crate::settings::GeneralSettings;

fn extension_of(filename: &str) -> Option<&str> {
    Path::new(filename).extension().and_then(|e| e.to_str())
}

fn listed(list: &[String], ext: &str) -> bool {
    list.iter().any(|e| e.eq_ignore_ascii_case(ext))
}

/// Key of the plugin language claiming `filename`'s extension.
#[must_use]
pub fn plugin_language_from_extension<'a>(
    filename: &str,
    plugins: &'a PluginRegistry,
) -> Option<&'a str> {
    extension_of(filename).and_then(|ext| plugins.language_for_extension(ext))
}

/// Resolves the language of `filename`.
///
/// Built-in extension lists take precedence over plugins. Unknown (or
/// missing) extensions yield `None`.
#[must_use]
pub fn shader_language_from_extension(
    filename: &str,
    general: &GeneralSettings,
    plugins: &PluginRegistry,
) -> Option<ShaderLanguage> {
    let ext = extension_of(filename)?;

    if listed(&general.hlsl_extensions, ext) {
        Some(ShaderLanguage::Hlsl)
    } else if listed(&general.vulkan_glsl_extensions, ext) {
        Some(ShaderLanguage::VulkanGlsl)
    } else if listed(&general.wgsl_extensions, ext) {
        Some(ShaderLanguage::Wgsl)
    } else if listed(&general.glsl_extensions, ext) {
        Some(ShaderLanguage::Glsl)
    } else {
        plugins
            .language_for_extension(ext)
            .map(|key| ShaderLanguage::Plugin(key.to_owned()))
    }
}
