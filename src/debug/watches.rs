use glam::Vec4;

/// Colors handed out to new watches, in order.
pub const WATCH_PALETTE: [Vec4; 6] = [
    Vec4::new(1.0, 0.0, 0.0, 1.0),
    Vec4::new(0.0, 1.0, 0.0, 1.0),
    Vec4::new(0.0, 0.4, 1.0, 1.0),
    Vec4::new(1.0, 1.0, 0.0, 1.0),
    Vec4::new(1.0, 0.0, 1.0, 1.0),
    Vec4::new(0.0, 1.0, 1.0, 1.0),
];

/// A vector expression drawn as an arrow over the preview.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorWatch {
    pub expression: String,
    pub color: Vec4,
    /// Last evaluated value, `None` until the debugger evaluates it.
    pub value: Option<Vec4>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VectorWatchList {
    watches: Vec<VectorWatch>,
}

impl VectorWatchList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a watch colored from [`WATCH_PALETTE`]. Empty and duplicate
    /// expressions are rejected.
    pub fn add(&mut self, expression: &str) -> bool {
        let color = WATCH_PALETTE[self.watches.len() % WATCH_PALETTE.len()];
        self.add_with_color(expression, color)
    }

    pub fn add_with_color(&mut self, expression: &str, color: Vec4) -> bool {
        let expression = expression.trim();
        if expression.is_empty() || self.get(expression).is_some() {
            return false;
        }
        self.watches.push(VectorWatch {
            expression: expression.to_owned(),
            color,
            value: None,
        });
        true
    }

    pub fn remove(&mut self, expression: &str) -> bool {
        let before = self.watches.len();
        self.watches.retain(|w| w.expression != expression);
        self.watches.len() != before
    }

    /// Stores a freshly evaluated value.
    pub fn update(&mut self, expression: &str, value: Vec4) -> bool {
        match self.watches.iter_mut().find(|w| w.expression == expression) {
            Some(watch) => {
                watch.value = Some(value);
                true
            }
            None => false,
        }
    }

    /// Forgets every evaluated value, e.g. when the debugged thread changes.
    pub fn invalidate(&mut self) {
        for watch in &mut self.watches {
            watch.value = None;
        }
    }

    #[must_use]
    pub fn get(&self, expression: &str) -> Option<&VectorWatch> {
        self.watches.iter().find(|w| w.expression == expression)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, VectorWatch> {
        self.watches.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.watches.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.watches.is_empty()
    }

    pub fn clear(&mut self) {
        self.watches.clear();
    }
}
