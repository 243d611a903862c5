//! Pipeline Data Model
//!
//! A project is an ordered list of named [`PipelineItem`]s. Each item owns a
//! typed payload ([`ItemData`]): a rasterization pass, a compute dispatch, an
//! audio pass, or opaque plugin data. Payloads are dropped with their item.
//!
//! The renderer walks [`PipelineManager::list`] each frame; the compiler and
//! debugger mutate items between frames only.

mod item;
mod manager;
pub mod template;

pub use item::{
    AudioPass, CompileStatus, ComputePass, ItemData, ItemType, PipelineItem, PluginItem,
    ShaderPass, StageSource,
};
pub use manager::PipelineManager;

/// Maximum length of an item name, in bytes.
pub const PIPELINE_ITEM_NAME_LENGTH: usize = 64;
