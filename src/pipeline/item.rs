use std::any::Any;
use std::fmt;

use crate::compiler::{ShaderLanguage, ShaderMacro, ShaderStage};
use crate::spirv::SpirvParser;
use crate::variables::VariableContainer;

/// Discriminant of [`ItemData`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemType {
    ShaderPass,
    ComputePass,
    AudioPass,
    PluginItem,
}

/// Result of the most recent compile of a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompileStatus {
    #[default]
    NotCompiled,
    Compiled,
    /// The last compile failed; artifacts are from an earlier success, if any.
    Failed,
}

// ============================================================================
// Stage source
// ============================================================================

/// One shader stage: where its source lives and what it compiled to.
#[derive(Debug, Clone, PartialEq)]
pub struct StageSource {
    /// Project-relative source path.
    pub path: String,
    pub entry: String,
    pub language: ShaderLanguage,

    /// Last successfully compiled module.
    pub spirv: Vec<u32>,
    /// Last successfully cross-compiled GLSL.
    pub glsl: Option<String>,
    pub status: CompileStatus,
    /// Introspection of `spirv`.
    pub summary: SpirvParser,
}

impl StageSource {
    #[must_use]
    pub fn new(path: impl Into<String>, entry: impl Into<String>, language: ShaderLanguage) -> Self {
        Self {
            path: path.into(),
            entry: entry.into(),
            language,
            spirv: Vec::new(),
            glsl: None,
            status: CompileStatus::NotCompiled,
            summary: SpirvParser::new(),
        }
    }

    /// Whether a renderer consuming SPIR-V (or GLSL when `native_spirv` is
    /// off) has something to draw with.
    #[must_use]
    pub fn is_renderable(&self, native_spirv: bool) -> bool {
        if native_spirv {
            !self.spirv.is_empty()
        } else {
            self.glsl.is_some()
        }
    }

    /// Drops compiled artifacts, e.g. after the source path changes.
    pub fn invalidate(&mut self) {
        self.spirv.clear();
        self.glsl = None;
        self.status = CompileStatus::NotCompiled;
        self.summary = SpirvParser::new();
    }
}

// ============================================================================
// Payloads
// ============================================================================

/// A rasterization pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderPass {
    pub vertex: StageSource,
    pub pixel: StageSource,
    pub geometry: Option<StageSource>,
    pub tess_control: Option<StageSource>,
    pub tess_evaluation: Option<StageSource>,

    /// The geometry stage is enabled.
    pub gs_used: bool,
    /// The tessellation stages are enabled.
    pub ts_used: bool,
    pub active: bool,

    /// Names of the render textures written, `"Window"` for the backbuffer.
    pub render_targets: Vec<String>,
    pub macros: Vec<ShaderMacro>,
    pub variables: VariableContainer,
}

impl ShaderPass {
    pub const WINDOW_TARGET: &'static str = "Window";

    #[must_use]
    pub fn new(vertex: StageSource, pixel: StageSource) -> Self {
        Self {
            vertex,
            pixel,
            geometry: None,
            tess_control: None,
            tess_evaluation: None,
            gs_used: false,
            ts_used: false,
            active: true,
            render_targets: vec![Self::WINDOW_TARGET.to_owned()],
            macros: Vec::new(),
            variables: VariableContainer::new(),
        }
    }

    /// Stages that take part in rendering, in pipeline order.
    pub fn stages(&self) -> impl Iterator<Item = (ShaderStage, &StageSource)> {
        let gs = self.geometry.as_ref().filter(|_| self.gs_used);
        let tcs = self.tess_control.as_ref().filter(|_| self.ts_used);
        let tes = self.tess_evaluation.as_ref().filter(|_| self.ts_used);

        [
            Some((ShaderStage::Vertex, &self.vertex)),
            tcs.map(|s| (ShaderStage::TessellationControl, s)),
            tes.map(|s| (ShaderStage::TessellationEvaluation, s)),
            gs.map(|s| (ShaderStage::Geometry, s)),
            Some((ShaderStage::Pixel, &self.pixel)),
        ]
        .into_iter()
        .flatten()
    }

    /// Mutable access to the source of `stage`, if the pass has it.
    pub fn stage_mut(&mut self, stage: ShaderStage) -> Option<&mut StageSource> {
        match stage {
            ShaderStage::Vertex => Some(&mut self.vertex),
            ShaderStage::Pixel => Some(&mut self.pixel),
            ShaderStage::Geometry => self.geometry.as_mut(),
            ShaderStage::TessellationControl => self.tess_control.as_mut(),
            ShaderStage::TessellationEvaluation => self.tess_evaluation.as_mut(),
            ShaderStage::Compute | ShaderStage::Audio => None,
        }
    }
}

/// A compute dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputePass {
    pub source: StageSource,
    /// Workgroups dispatched along x, y, z.
    pub group_count: [u32; 3],
    pub macros: Vec<ShaderMacro>,
    pub variables: VariableContainer,
}

impl ComputePass {
    #[must_use]
    pub fn new(source: StageSource) -> Self {
        Self {
            source,
            group_count: [1, 1, 1],
            macros: Vec::new(),
            variables: VariableContainer::new(),
        }
    }
}

/// A pixel shader rendered into an audio buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioPass {
    pub source: StageSource,
    pub macros: Vec<ShaderMacro>,
    pub variables: VariableContainer,
}

impl AudioPass {
    #[must_use]
    pub fn new(source: StageSource) -> Self {
        Self {
            source,
            macros: Vec::new(),
            variables: VariableContainer::new(),
        }
    }
}

/// An item whose contents only its plugin understands.
pub struct PluginItem {
    /// Registered item type name.
    pub type_name: String,
    pub data: Box<dyn Any>,
}

impl PluginItem {
    #[must_use]
    pub fn new(type_name: impl Into<String>, data: Box<dyn Any>) -> Self {
        Self {
            type_name: type_name.into(),
            data,
        }
    }
}

impl fmt::Debug for PluginItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginItem")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// Payload of a [`PipelineItem`]; the variant is the item type.
#[derive(Debug)]
pub enum ItemData {
    ShaderPass(Box<ShaderPass>),
    ComputePass(ComputePass),
    AudioPass(AudioPass),
    Plugin(PluginItem),
}

impl ItemData {
    #[must_use]
    pub fn item_type(&self) -> ItemType {
        match self {
            Self::ShaderPass(_) => ItemType::ShaderPass,
            Self::ComputePass(_) => ItemType::ComputePass,
            Self::AudioPass(_) => ItemType::AudioPass,
            Self::Plugin(_) => ItemType::PluginItem,
        }
    }
}

// ============================================================================
// Item
// ============================================================================

/// One named unit of work in the pipeline.
#[derive(Debug)]
pub struct PipelineItem {
    name: String,
    /// Owning plugin, empty for built-in items.
    owner: String,
    pub data: ItemData,
}

impl PipelineItem {
    #[must_use]
    pub fn new(name: impl Into<String>, owner: impl Into<String>, data: ItemData) -> Self {
        Self {
            name: name.into(),
            owner: owner.into(),
            data,
        }
    }

    #[must_use]
    pub fn shader_pass(name: impl Into<String>, pass: ShaderPass) -> Self {
        Self::new(name, "", ItemData::ShaderPass(Box::new(pass)))
    }

    #[must_use]
    pub fn compute_pass(name: impl Into<String>, pass: ComputePass) -> Self {
        Self::new(name, "", ItemData::ComputePass(pass))
    }

    #[must_use]
    pub fn audio_pass(name: impl Into<String>, pass: AudioPass) -> Self {
        Self::new(name, "", ItemData::AudioPass(pass))
    }

    #[must_use]
    pub fn plugin_item(name: impl Into<String>, owner: impl Into<String>, item: PluginItem) -> Self {
        Self::new(name, owner, ItemData::Plugin(item))
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: &str) {
        name.clone_into(&mut self.name);
    }

    #[inline]
    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    #[inline]
    #[must_use]
    pub fn item_type(&self) -> ItemType {
        self.data.item_type()
    }

    #[must_use]
    pub fn variables(&self) -> Option<&VariableContainer> {
        match &self.data {
            ItemData::ShaderPass(p) => Some(&p.variables),
            ItemData::ComputePass(p) => Some(&p.variables),
            ItemData::AudioPass(p) => Some(&p.variables),
            ItemData::Plugin(_) => None,
        }
    }

    pub fn variables_mut(&mut self) -> Option<&mut VariableContainer> {
        match &mut self.data {
            ItemData::ShaderPass(p) => Some(&mut p.variables),
            ItemData::ComputePass(p) => Some(&mut p.variables),
            ItemData::AudioPass(p) => Some(&mut p.variables),
            ItemData::Plugin(_) => None,
        }
    }

    #[must_use]
    pub fn as_shader_pass(&self) -> Option<&ShaderPass> {
        match &self.data {
            ItemData::ShaderPass(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_shader_pass_mut(&mut self) -> Option<&mut ShaderPass> {
        match &mut self.data {
            ItemData::ShaderPass(p) => Some(p),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_compute_pass(&self) -> Option<&ComputePass> {
        match &self.data {
            ItemData::ComputePass(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_compute_pass_mut(&mut self) -> Option<&mut ComputePass> {
        match &mut self.data {
            ItemData::ComputePass(p) => Some(p),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_audio_pass(&self) -> Option<&AudioPass> {
        match &self.data {
            ItemData::AudioPass(p) => Some(p),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_plugin_item(&self) -> Option<&PluginItem> {
        match &self.data {
            ItemData::Plugin(p) => Some(p),
            _ => None,
        }
    }

    /// Every stage of the item with its compile target, in pipeline order.
    #[must_use]
    pub fn stages(&self) -> Vec<(ShaderStage, &StageSource)> {
        match &self.data {
            ItemData::ShaderPass(p) => p.stages().collect(),
            ItemData::ComputePass(p) => vec![(ShaderStage::Compute, &p.source)],
            ItemData::AudioPass(p) => vec![(ShaderStage::Audio, &p.source)],
            ItemData::Plugin(_) => Vec::new(),
        }
    }

    /// Mutable access to one stage's source.
    pub fn stage_mut(&mut self, stage: ShaderStage) -> Option<&mut StageSource> {
        match (&mut self.data, stage) {
            (ItemData::ShaderPass(p), stage) => p.stage_mut(stage),
            (ItemData::ComputePass(p), ShaderStage::Compute) => Some(&mut p.source),
            (ItemData::AudioPass(p), ShaderStage::Audio) => Some(&mut p.source),
            _ => None,
        }
    }

    /// Macros applied to every stage of the item.
    #[must_use]
    pub fn macros(&self) -> &[ShaderMacro] {
        match &self.data {
            ItemData::ShaderPass(p) => &p.macros,
            ItemData::ComputePass(p) => &p.macros,
            ItemData::AudioPass(p) => &p.macros,
            ItemData::Plugin(_) => &[],
        }
    }
}
