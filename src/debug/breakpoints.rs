use crate::spirv::SpirvParser;

/// A source breakpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breakpoint {
    pub file: String,
    pub line: u32,
    /// Expression that must evaluate to true for the breakpoint to hit.
    pub condition: Option<String>,
    pub enabled: bool,
}

/// User breakpoints, at most one per `(file, line)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BreakpointList {
    breakpoints: Vec<Breakpoint>,
}

impl BreakpointList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an enabled breakpoint, or replaces the condition of an existing
    /// one. Returns `true` when a new breakpoint was created.
    pub fn add(&mut self, file: &str, line: u32, condition: Option<String>) -> bool {
        if let Some(bp) = self.get_mut(file, line) {
            bp.condition = condition;
            return false;
        }
        self.breakpoints.push(Breakpoint {
            file: file.to_owned(),
            line,
            condition,
            enabled: true,
        });
        true
    }

    pub fn remove(&mut self, file: &str, line: u32) -> bool {
        let before = self.breakpoints.len();
        self.breakpoints.retain(|bp| !(bp.file == file && bp.line == line));
        self.breakpoints.len() != before
    }

    /// Flips the enabled state; returns the new state.
    pub fn toggle(&mut self, file: &str, line: u32) -> Option<bool> {
        let bp = self.get_mut(file, line)?;
        bp.enabled = !bp.enabled;
        Some(bp.enabled)
    }

    #[must_use]
    pub fn get(&self, file: &str, line: u32) -> Option<&Breakpoint> {
        self.breakpoints
            .iter()
            .find(|bp| bp.file == file && bp.line == line)
    }

    fn get_mut(&mut self, file: &str, line: u32) -> Option<&mut Breakpoint> {
        self.breakpoints
            .iter_mut()
            .find(|bp| bp.file == file && bp.line == line)
    }

    /// Whether execution should stop at `(file, line)`.
    #[must_use]
    pub fn is_active(&self, file: &str, line: u32) -> bool {
        self.get(file, line).is_some_and(|bp| bp.enabled)
    }

    pub fn for_file<'a>(&'a self, file: &'a str) -> impl Iterator<Item = &'a Breakpoint> + 'a {
        self.breakpoints.iter().filter(move |bp| bp.file == file)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.breakpoints.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.breakpoints.is_empty()
    }

    pub fn clear(&mut self) {
        self.breakpoints.clear();
    }
}

/// A function entry offered as a breakpoint location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionBreakpoint {
    pub function: String,
    pub file: Option<String>,
    pub line: u32,
}

/// First line of every function with line information, in source order.
#[must_use]
pub fn suggest_function_breakpoints(summary: &SpirvParser) -> Vec<FunctionBreakpoint> {
    let mut suggestions: Vec<_> = summary
        .functions
        .iter()
        .filter_map(|(name, f)| {
            f.line_start.map(|line| FunctionBreakpoint {
                function: name.clone(),
                file: f.file.clone(),
                line,
            })
        })
        .collect();
    suggestions.sort_by_key(|s| s.line);
    suggestions
}

/// Location of one compute invocation within the dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreadLocation {
    pub global_id: [u32; 3],
    pub workgroup_id: [u32; 3],
    pub local_id: [u32; 3],
    /// Flattened `local_id` (`gl_LocalInvocationIndex`).
    pub local_index: u32,
}

/// Which invocations have to be simulated to debug one compute thread.
///
/// Without barriers a single invocation can be stepped in isolation; with
/// barriers its whole workgroup has to advance in lock-step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComputeBreakpointSuggestion {
    /// Every axis is at least 1.
    local_size: [u32; 3],
    group_count: [u32; 3],
    barrier_used: bool,
}

impl ComputeBreakpointSuggestion {
    /// Reads the workgroup size and barrier flag from `summary`.
    #[must_use]
    pub fn new(summary: &SpirvParser, group_count: [u32; 3]) -> Self {
        Self::from_parts(
            [summary.local_size_x, summary.local_size_y, summary.local_size_z],
            group_count,
            summary.barrier_used,
        )
    }

    /// Zero-sized workgroup axes are clamped to 1.
    #[must_use]
    pub fn from_parts(local_size: [u32; 3], group_count: [u32; 3], barrier_used: bool) -> Self {
        Self {
            local_size: local_size.map(|n| n.max(1)),
            group_count,
            barrier_used,
        }
    }

    #[must_use]
    pub fn local_size(&self) -> [u32; 3] {
        self.local_size
    }

    #[must_use]
    pub fn group_count(&self) -> [u32; 3] {
        self.group_count
    }

    #[must_use]
    pub fn barrier_used(&self) -> bool {
        self.barrier_used
    }

    /// Invocations per workgroup.
    #[must_use]
    pub fn group_size(&self) -> u64 {
        self.local_size.iter().map(|&n| u64::from(n)).product()
    }

    /// Invocations in the whole dispatch.
    #[must_use]
    pub fn total_invocations(&self) -> u64 {
        self.group_size() * self.group_count.iter().map(|&n| u64::from(n)).product::<u64>()
    }

    /// Number of invocations the debugger must run to reach a breakpoint in
    /// one thread.
    #[must_use]
    pub fn invocations_to_simulate(&self) -> u64 {
        if self.barrier_used { self.group_size() } else { 1 }
    }

    /// Splits a global invocation id; `None` when it lies outside the
    /// dispatch.
    #[must_use]
    pub fn locate(&self, global_id: [u32; 3]) -> Option<ThreadLocation> {
        let mut workgroup_id = [0; 3];
        let mut local_id = [0; 3];
        for axis in 0..3 {
            let size = self.local_size[axis];
            workgroup_id[axis] = global_id[axis] / size;
            local_id[axis] = global_id[axis] % size;
            if workgroup_id[axis] >= self.group_count[axis] {
                return None;
            }
        }

        let [sx, sy, _] = self.local_size;
        let local_index = local_id[2] * sx * sy + local_id[1] * sx + local_id[0];
        Some(ThreadLocation {
            global_id,
            workgroup_id,
            local_id,
            local_index,
        })
    }

    /// Global ids that have to be simulated together with `global_id`.
    #[must_use]
    pub fn companions(&self, global_id: [u32; 3]) -> Vec<[u32; 3]> {
        let Some(location) = self.locate(global_id) else {
            return Vec::new();
        };
        if !self.barrier_used {
            return vec![global_id];
        }

        let [sx, sy, sz] = self.local_size;
        let base = [
            location.workgroup_id[0] * sx,
            location.workgroup_id[1] * sy,
            location.workgroup_id[2] * sz,
        ];
        let mut ids = Vec::with_capacity(self.group_size() as usize);
        for z in 0..sz {
            for y in 0..sy {
                for x in 0..sx {
                    ids.push([base[0] + x, base[1] + y, base[2] + z]);
                }
            }
        }
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_breakpoint_list() {
        let mut list = BreakpointList::new();
        assert!(list.add("a.comp", 12, None));
        assert!(!list.add("a.comp", 12, Some("i == 3".into())));
        assert_eq!(list.len(), 1);
        assert_eq!(list.get("a.comp", 12).unwrap().condition.as_deref(), Some("i == 3"));

        assert_eq!(list.toggle("a.comp", 12), Some(false));
        assert!(!list.is_active("a.comp", 12));
        assert_eq!(list.toggle("a.comp", 99), None);

        assert!(list.remove("a.comp", 12));
        assert!(!list.remove("a.comp", 12));
    }

    fn suggestion(barrier_used: bool) -> ComputeBreakpointSuggestion {
        ComputeBreakpointSuggestion::from_parts([8, 4, 1], [2, 2, 1], barrier_used)
    }

    #[test]
    fn test_locate() {
        let s = suggestion(false);
        let loc = s.locate([9, 5, 0]).unwrap();
        assert_eq!(loc.workgroup_id, [1, 1, 0]);
        assert_eq!(loc.local_id, [1, 1, 0]);
        assert_eq!(loc.local_index, 9);
        assert!(s.locate([16, 0, 0]).is_none());
        assert_eq!(s.total_invocations(), 128);
    }

    #[test]
    fn test_barrier_requires_whole_group() {
        assert_eq!(suggestion(false).invocations_to_simulate(), 1);
        assert_eq!(suggestion(false).companions([3, 3, 0]), [[3, 3, 0]]);

        let s = suggestion(true);
        assert_eq!(s.invocations_to_simulate(), 32);
        let ids = s.companions([9, 5, 0]);
        assert_eq!(ids.len(), 32);
        assert_eq!(ids[0], [8, 4, 0]);
        assert!(ids.contains(&[9, 5, 0]));
    }

    #[test]
    fn test_zero_local_size_is_clamped() {
        let s = ComputeBreakpointSuggestion::from_parts([0, 4, 0], [2, 1, 1], false);
        assert_eq!(s.local_size(), [1, 4, 1]);
        assert_eq!(s.group_size(), 4);

        let loc = s.locate([1, 3, 0]).unwrap();
        assert_eq!(loc.workgroup_id, [1, 0, 0]);
        assert_eq!(loc.local_index, 3);
    }
}
