//! Debug Support
//!
//! Lightweight state consumed by the interactive debugger UI:
//!
//! - [`CallStack`]: frames of the invocation being stepped
//! - [`BreakpointList`] and [`suggest_function_breakpoints`]
//! - [`ComputeBreakpointSuggestion`]: maps a compute thread to its workgroup
//!   and tells how many invocations must run together
//! - [`VectorWatchList`]: vector expressions drawn over the preview
//! - [`PassTimings`]: per-pass rolling timings
//!
//! A [`DebugSession`] bundles the per-item pieces and is dropped when
//! debugging stops; nothing here is persisted.

mod breakpoints;
mod call_stack;
mod timing;
mod watches;

pub use breakpoints::{
    Breakpoint, BreakpointList, ComputeBreakpointSuggestion, FunctionBreakpoint, ThreadLocation,
    suggest_function_breakpoints,
};
pub use call_stack::{CallStack, StackFrame};
pub use timing::PassTimings;
pub use watches::{VectorWatch, VectorWatchList, WATCH_PALETTE};

use crate::compiler::ShaderStage;
use crate::pipeline::PipelineItem;
use crate::spirv::{Function, SpirvParser};

/// Debugger state for one item and stage.
#[derive(Debug, Clone)]
pub struct DebugSession {
    pub item: String,
    pub stage: ShaderStage,
    /// Introspection of the debugged module.
    pub summary: SpirvParser,
    pub call_stack: CallStack,
    pub breakpoints: BreakpointList,
    pub watches: VectorWatchList,
    /// Present for compute items.
    pub compute: Option<ComputeBreakpointSuggestion>,
    /// Selected compute thread.
    pub thread: Option<ThreadLocation>,
}

impl DebugSession {
    /// Starts debugging `stage` of `item`. Returns `None` when the item has
    /// no compiled module for that stage.
    #[must_use]
    pub fn start(item: &PipelineItem, stage: ShaderStage) -> Option<Self> {
        let (_, source) = item.stages().into_iter().find(|(s, _)| *s == stage)?;
        if source.spirv.is_empty() {
            log::warn!("'{}' has no compiled {stage:?} module to debug", item.name());
            return None;
        }

        let compute = item
            .as_compute_pass()
            .map(|pass| ComputeBreakpointSuggestion::new(&source.summary, pass.group_count));

        log::info!("Debugging {stage:?} stage of '{}'", item.name());
        Some(Self {
            item: item.name().to_owned(),
            stage,
            summary: source.summary.clone(),
            call_stack: CallStack::new(),
            breakpoints: BreakpointList::new(),
            watches: VectorWatchList::new(),
            compute,
            thread: None,
        })
    }

    /// Selects the compute thread to debug. Returns `false` when the id is
    /// outside the dispatch or the item is not a compute pass.
    pub fn select_thread(&mut self, global_id: [u32; 3]) -> bool {
        let Some(location) = self.compute.as_ref().and_then(|c| c.locate(global_id)) else {
            return false;
        };
        self.thread = Some(location);
        self.call_stack.clear();
        self.watches.invalidate();
        true
    }

    /// Invocations to simulate for the selected thread.
    #[must_use]
    pub fn simulated_threads(&self) -> Vec<[u32; 3]> {
        match (&self.compute, &self.thread) {
            (Some(compute), Some(thread)) => compute.companions(thread.global_id),
            _ => Vec::new(),
        }
    }

    #[must_use]
    pub fn suggested_breakpoints(&self) -> Vec<FunctionBreakpoint> {
        suggest_function_breakpoints(&self.summary)
    }

    /// The function whose line range covers `line`.
    #[must_use]
    pub fn function_at_line(&self, line: u32) -> Option<(&str, &Function)> {
        self.summary.function_at_line(line)
    }

    /// Adds a breakpoint at the entry of every function that has line info.
    pub fn break_on_functions(&mut self, default_file: &str) -> usize {
        let mut added = 0;
        for suggestion in self.suggested_breakpoints() {
            let file = suggestion.file.as_deref().unwrap_or(default_file);
            if self.breakpoints.add(file, suggestion.line, None) {
                added += 1;
            }
        }
        added
    }
}
