//! Session orchestration.
//!
//! A [`Session`] is one open project: the pipeline, the compiler and the
//! [`SessionContext`]. The host drives it from its main loop:
//!
//! ```rust,ignore
//! let mut session = Session::new(Settings::default(), Box::new(FsProject::new(dir)));
//! session.new_project(true)?;
//! session.recompile_all();
//!
//! loop {
//!     session.update(dt);
//!     renderer.draw(session.pipeline());
//! }
//! ```
//!
//! Compilation and debugging run between frames, never while the renderer
//! walks the pipeline.

use crate::compiler::{CompileRequest, ShaderCompiler, ShaderMacro, ShaderStage};
use crate::context::SessionContext;
use crate::debug::DebugSession;
use crate::errors::Result;
use crate::messages::MessageSink;
use crate::pipeline::{CompileStatus, PipelineItem, PipelineManager, StageSource, template};
use crate::project::ProjectFiles;
use crate::settings::Settings;

pub struct Session {
    context: SessionContext,
    pipeline: PipelineManager,
    compiler: ShaderCompiler,
    project: Box<dyn ProjectFiles>,
    debug: Option<DebugSession>,
}

impl Session {
    #[must_use]
    pub fn new(settings: Settings, project: Box<dyn ProjectFiles>) -> Self {
        let compiler = ShaderCompiler::new(settings.compiler.clone());
        Self {
            context: SessionContext::new(settings),
            pipeline: PipelineManager::new(),
            compiler,
            project,
            debug: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    #[inline]
    pub fn context_mut(&mut self) -> &mut SessionContext {
        &mut self.context
    }

    #[inline]
    #[must_use]
    pub fn pipeline(&self) -> &PipelineManager {
        &self.pipeline
    }

    #[inline]
    pub fn pipeline_mut(&mut self) -> &mut PipelineManager {
        &mut self.pipeline
    }

    #[inline]
    #[must_use]
    pub fn compiler(&self) -> &ShaderCompiler {
        &self.compiler
    }

    pub fn apply_settings(&mut self, settings: Settings) {
        self.compiler.set_settings(settings.compiler.clone());
        if settings.debug.timing_window != self.context.timings.window() {
            self.context.timings.set_window(settings.debug.timing_window);
        }
        self.context.settings = settings;
    }

    // ========================================================================
    // Project
    // ========================================================================

    /// Starts an empty project, optionally seeded with the template pass.
    ///
    /// Template sources are written into the project unless files already
    /// exist at their paths.
    pub fn new_project(&mut self, open_template: bool) -> Result<()> {
        self.debug = None;
        self.context.pinned.clear();
        self.context.timings.reset();
        self.context.messages.clear();
        self.pipeline.new_project(open_template);

        if open_template {
            for (path, source) in template::template_files() {
                if self.project.resolve_path(path).is_none() {
                    self.project.write_text(path, &source)?;
                }
            }
        }
        Ok(())
    }

    /// Adds an item, rejecting unavailable names.
    pub fn add_item(&mut self, item: PipelineItem) -> bool {
        self.pipeline.add_item(item)
    }

    /// Removes an item and everything that refers to it by name.
    pub fn remove_item(&mut self, name: &str) {
        self.pipeline.remove(name);
        self.context.pinned.remove_item(name);
        self.context.timings.remove(name);
        self.context.messages.clear_group(name);
        if self.debug.as_ref().is_some_and(|d| d.item == name) {
            self.debug = None;
        }
    }

    pub fn rename_item(&mut self, from: &str, to: &str) -> bool {
        if !self.pipeline.rename(from, to) {
            return false;
        }
        self.context.pinned.rename_item(from, to);
        self.context.timings.rename(from, to);
        if let Some(debug) = self.debug.as_mut().filter(|d| d.item == from) {
            to.clone_into(&mut debug.item);
        }
        true
    }

    /// Unloads a plugin: its registrations and the items it owns.
    pub fn unload_plugin(&mut self, owner: &str) {
        let owned: Vec<String> = self
            .pipeline
            .items_of_owner(owner)
            .map(|item| item.name().to_owned())
            .collect();
        for name in owned {
            self.remove_item(&name);
        }
        self.context.plugins.unregister_owner(owner);
        self.compiler.forget_plugin_languages();
    }

    // ========================================================================
    // Compilation
    // ========================================================================

    /// Compiles every stage of `name`.
    ///
    /// Failed stages keep their previous artifacts and are marked
    /// [`CompileStatus::Failed`]; diagnostics are grouped under the item name.
    /// Returns `true` when every stage succeeded.
    pub fn recompile(&mut self, name: &str) -> bool {
        let Some(item) = self.pipeline.get_mut(name) else {
            log::warn!("Cannot recompile unknown item '{name}'");
            return false;
        };

        let macros = item.macros().to_vec();
        let gs_used = item.as_shader_pass().is_some_and(|p| p.gs_used);
        let stages: Vec<ShaderStage> = item.stages().iter().map(|(stage, _)| *stage).collect();

        self.context.messages.clear_group(name);
        self.context.messages.set_group(Some(name));

        let mut all_ok = true;
        for stage in stages {
            if let Some(source) = item.stage_mut(stage) {
                all_ok &= compile_stage(
                    &mut self.compiler,
                    &mut self.context,
                    self.project.as_ref(),
                    source,
                    stage,
                    gs_used,
                    &macros,
                );
            }
        }

        self.context.messages.set_group(None);

        if self.debug.as_ref().is_some_and(|d| d.item == name) {
            log::info!("'{name}' recompiled, ending debug session");
            self.debug = None;
        }
        all_ok
    }

    /// Recompiles every item; returns how many compiled cleanly.
    pub fn recompile_all(&mut self) -> usize {
        let names: Vec<String> = self
            .pipeline
            .list()
            .iter()
            .map(|item| item.name().to_owned())
            .collect();
        names.iter().filter(|name| self.recompile(name)).count()
    }

    // ========================================================================
    // Frame update
    // ========================================================================

    /// Advances one frame: clock, system values, then function-backed
    /// variables.
    pub fn update(&mut self, delta: f32) {
        let ctx = &mut self.context;
        ctx.system.advance(delta);
        ctx.functions.begin_frame();

        for item in self.pipeline.iter_mut() {
            let name = item.name().to_owned();
            if let Some(vars) = item.variables_mut() {
                vars.update_system(&ctx.system);
                ctx.functions.update(&name, vars, &ctx.plugins);
            }
        }
    }

    // ========================================================================
    // Debugging
    // ========================================================================

    /// Starts debugging `stage` of `item`, replacing any active session.
    pub fn start_debugging(&mut self, item: &str, stage: ShaderStage) -> bool {
        let Some(item) = self.pipeline.get(item) else {
            return false;
        };
        self.debug = DebugSession::start(item, stage);
        if let Some(debug) = &mut self.debug
            && self.context.settings.debug.suggest_breakpoints
        {
            let file = item
                .stages()
                .into_iter()
                .find(|(s, _)| *s == stage)
                .map(|(_, source)| source.path.clone())
                .unwrap_or_default();
            debug.break_on_functions(&file);
        }
        self.debug.is_some()
    }

    pub fn stop_debugging(&mut self) {
        self.debug = None;
    }

    #[must_use]
    pub fn debug(&self) -> Option<&DebugSession> {
        self.debug.as_ref()
    }

    pub fn debug_mut(&mut self) -> Option<&mut DebugSession> {
        self.debug.as_mut()
    }
}

fn compile_stage(
    compiler: &mut ShaderCompiler,
    ctx: &mut SessionContext,
    project: &dyn ProjectFiles,
    source: &mut StageSource,
    stage: ShaderStage,
    gs_used: bool,
    macros: &[ShaderMacro],
) -> bool {
    let request = CompileRequest {
        language: &source.language,
        filename: &source.path,
        stage,
        entry: &source.entry,
        macros,
    };

    let Some(spirv) = compiler.compile_to_spirv(&request, project, &ctx.plugins, &mut ctx.messages)
    else {
        log::warn!("{stage:?} stage of '{}' failed to compile, keeping previous module", source.path);
        source.status = CompileStatus::Failed;
        return false;
    };

    source
        .summary
        .parse(&spirv, ctx.settings.general.trim_function_names);

    let mut ok = true;
    if !compiler.settings().native_spirv {
        match compiler.convert_to_glsl(&spirv, &source.language, stage, gs_used, &mut ctx.messages) {
            Some(glsl) => source.glsl = Some(glsl),
            None if source.glsl.is_some() => {
                log::warn!("Cross-compiling '{}' failed, rendering last good GLSL", source.path);
                ok = false;
            }
            None => {
                ctx.messages.log(
                    "cross-compilation failed and no previous GLSL exists; pass is not renderable",
                    true,
                    Some(&source.path),
                    None,
                );
                ok = false;
            }
        }
    }

    source.spirv = spirv;
    source.status = if ok { CompileStatus::Compiled } else { CompileStatus::Failed };
    ok
}
