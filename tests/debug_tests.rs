//! Debug Support Tests
//!
//! Tests for:
//! - Starting a debug session from a compiled compute item
//! - Function breakpoint suggestions from line information
//! - Thread selection and barrier-aware simulation sets
//! - Session lifetime of the debugger state

mod common;

use std::time::Duration;

use common::compute_module;
use shaderlab::compiler::{ShaderLanguage, ShaderStage};
use shaderlab::debug::{CallStack, DebugSession, PassTimings};
use shaderlab::pipeline::{ComputePass, PipelineItem, StageSource};
use shaderlab::{FsProject, Session, Settings};

fn compute_item(name: &str, with_lines: bool, group_count: [u32; 3]) -> PipelineItem {
    let (words, _) = compute_module(with_lines);
    let mut source = StageSource::new("shader.comp", "main", ShaderLanguage::Glsl);
    source.summary.parse(&words, true);
    source.spirv = words;

    let mut pass = ComputePass::new(source);
    pass.group_count = group_count;
    PipelineItem::compute_pass(name, pass)
}

// ============================================================================
// Debug session
// ============================================================================

#[test]
fn start_requires_compiled_stage() {
    let empty = PipelineItem::compute_pass(
        "empty",
        ComputePass::new(StageSource::new("a.comp", "main", ShaderLanguage::Glsl)),
    );
    assert!(DebugSession::start(&empty, ShaderStage::Compute).is_none());

    let item = compute_item("cs", true, [2, 2, 1]);
    assert!(DebugSession::start(&item, ShaderStage::Vertex).is_none());
    assert!(DebugSession::start(&item, ShaderStage::Compute).is_some());
}

#[test]
fn function_breakpoints_follow_line_info() {
    let item = compute_item("cs", true, [1, 1, 1]);
    let mut debug = DebugSession::start(&item, ShaderStage::Compute).unwrap();

    let suggestions = debug.suggested_breakpoints();
    let lines: Vec<(&str, u32)> = suggestions
        .iter()
        .map(|s| (s.function.as_str(), s.line))
        .collect();
    assert_eq!(lines, [("helper", 5), ("main", 12)]);

    assert_eq!(debug.break_on_functions("fallback.comp"), 2);
    assert!(debug.breakpoints.is_active("shader.comp", 5));
    // Adding again creates nothing new.
    assert_eq!(debug.break_on_functions("fallback.comp"), 0);

    assert_eq!(debug.function_at_line(13).map(|(name, _)| name), Some("main"));
}

#[test]
fn no_line_info_means_no_suggestions() {
    let item = compute_item("cs", false, [1, 1, 1]);
    let debug = DebugSession::start(&item, ShaderStage::Compute).unwrap();
    assert!(debug.suggested_breakpoints().is_empty());
    assert!(debug.function_at_line(5).is_none());
}

// ============================================================================
// Compute threads
// ============================================================================

#[test]
fn barrier_forces_whole_workgroup() {
    let item = compute_item("cs", true, [2, 2, 1]);
    let mut debug = DebugSession::start(&item, ShaderStage::Compute).unwrap();

    let compute = debug.compute.unwrap();
    assert_eq!(compute.local_size(), [8, 4, 1]);
    assert!(compute.barrier_used());
    assert_eq!(compute.group_size(), 32);
    assert_eq!(compute.total_invocations(), 128);
    assert_eq!(compute.invocations_to_simulate(), 32);

    assert!(debug.select_thread([9, 5, 0]));
    let thread = debug.thread.unwrap();
    assert_eq!(thread.workgroup_id, [1, 1, 0]);
    assert_eq!(thread.local_index, 9);

    let threads = debug.simulated_threads();
    assert_eq!(threads.len(), 32);
    assert!(threads.contains(&[9, 5, 0]));
    assert!(threads.iter().all(|id| id[0] >= 8 && id[1] >= 4));
}

#[test]
fn thread_outside_dispatch_is_rejected() {
    let item = compute_item("cs", true, [1, 1, 1]);
    let mut debug = DebugSession::start(&item, ShaderStage::Compute).unwrap();

    assert!(!debug.select_thread([8, 0, 0]));
    assert!(debug.thread.is_none());
    assert!(debug.simulated_threads().is_empty());
}

#[test]
fn selecting_thread_resets_stack() {
    let item = compute_item("cs", true, [1, 1, 1]);
    let mut debug = DebugSession::start(&item, ShaderStage::Compute).unwrap();
    debug.call_stack.push("main", Some(12));
    debug.call_stack.push("helper", Some(5));

    assert!(debug.select_thread([0, 0, 0]));
    assert_eq!(debug.call_stack.depth(), 0);
}

// ============================================================================
// Call stack
// ============================================================================

#[test]
fn call_stack_tracks_lines() {
    let mut stack = CallStack::new();
    stack.push("main", Some(12));
    stack.push("helper", None);
    stack.set_line(6);

    assert_eq!(stack.top_line(), Some(6));
    assert_eq!(stack.snapshot(), ["helper (line 6)", "main (line 12)"]);

    assert_eq!(stack.pop().map(|f| f.function), Some("helper".to_owned()));
    assert_eq!(stack.top_line(), Some(12));
}

// ============================================================================
// Session integration
// ============================================================================

#[test]
fn session_debugging_lifetime() {
    let mut session = Session::new(Settings::default(), Box::new(FsProject::new(".")));
    session.add_item(compute_item("cs", true, [2, 1, 1]));

    assert!(!session.start_debugging("missing", ShaderStage::Compute));
    assert!(session.start_debugging("cs", ShaderStage::Compute));
    // Breakpoint suggestions are on by default.
    assert_eq!(session.debug().unwrap().breakpoints.len(), 2);

    assert!(session.rename_item("cs", "compute"));
    assert_eq!(session.debug().unwrap().item, "compute");

    session.remove_item("compute");
    assert!(session.debug().is_none());
}

#[test]
fn timings_follow_items() {
    let mut timings = PassTimings::new(4);
    for ms in [1, 2, 3, 4, 10] {
        timings.record("cs", Duration::from_millis(ms));
    }

    // Only the last four samples count.
    assert_eq!(timings.average("cs"), Some(Duration::from_millis(19) / 4));
    assert_eq!(timings.frames("cs"), 5);

    timings.rename("cs", "compute");
    assert!(timings.average("cs").is_none());
    timings.remove("compute");
    assert!(timings.average("compute").is_none());
}
