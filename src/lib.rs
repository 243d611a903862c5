#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

//! Shader lab core: compile shaders to SPIR-V, introspect the result, and
//! keep the pipeline/variable state a renderer and a shader debugger work on.

pub mod camera;
pub mod compiler;
pub mod context;
pub mod debug;
pub mod errors;
pub mod messages;
pub mod pipeline;
pub mod plugins;
pub mod project;
pub mod session;
pub mod settings;
pub mod spirv;
pub mod variables;

pub use camera::{ArcBallCamera, Camera, FirstPersonCamera};
pub use compiler::{
    CompileRequest, ShaderCompiler, ShaderLanguage, ShaderMacro, ShaderStage,
    plugin_language_from_extension, shader_language_from_extension,
};
pub use context::SessionContext;
pub use debug::{CallStack, ComputeBreakpointSuggestion, DebugSession, PassTimings};
pub use errors::{Result, StudioError, VariableError};
pub use messages::{Message, MessageKind, MessageSink, MessageStack};
pub use pipeline::{ItemData, ItemType, PipelineItem, PipelineManager};
pub use plugins::{FunctionPlugin, LanguagePlugin, PluginRegistry};
pub use project::{FsProject, ProjectFiles};
pub use session::Session;
pub use settings::Settings;
pub use spirv::{SpirvParser, WordReader};
pub use variables::{
    FunctionVariable, ShaderVariable, SystemVariable, ValueType, VariableContainer,
};
