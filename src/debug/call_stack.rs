use std::fmt;

/// One active function of a stepped invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackFrame {
    pub function: String,
    /// Line currently executing in this frame.
    pub line: Option<u32>,
}

impl fmt::Display for StackFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{} (line {line})", self.function),
            None => f.write_str(&self.function),
        }
    }
}

/// Call stack of the invocation being debugged; the last frame is the top.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallStack {
    frames: Vec<StackFrame>,
}

impl CallStack {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, function: impl Into<String>, line: Option<u32>) {
        self.frames.push(StackFrame {
            function: function.into(),
            line,
        });
    }

    pub fn pop(&mut self) -> Option<StackFrame> {
        self.frames.pop()
    }

    /// Updates the executing line of the top frame.
    pub fn set_line(&mut self, line: u32) {
        if let Some(top) = self.frames.last_mut() {
            top.line = Some(line);
        }
    }

    #[must_use]
    pub fn top(&self) -> Option<&StackFrame> {
        self.frames.last()
    }

    #[must_use]
    pub fn top_line(&self) -> Option<u32> {
        self.top().and_then(|f| f.line)
    }

    /// Frames from bottom (entry point) to top.
    #[must_use]
    pub fn frames(&self) -> &[StackFrame] {
        &self.frames
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Display lines, top of stack first.
    #[must_use]
    pub fn snapshot(&self) -> Vec<String> {
        self.frames.iter().rev().map(ToString::to_string).collect()
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_pop_snapshot() {
        let mut stack = CallStack::new();
        stack.push("main", Some(10));
        stack.push("shade", None);
        stack.set_line(4);

        assert_eq!(stack.depth(), 2);
        assert_eq!(stack.top_line(), Some(4));
        assert_eq!(stack.snapshot(), ["shade (line 4)", "main (line 10)"]);

        assert_eq!(stack.pop().unwrap().function, "shade");
        assert_eq!(stack.top_line(), Some(10));
    }
}
