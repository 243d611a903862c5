use super::{ShaderVariable, SystemValues, SystemVariable};

/// Ordered, name-unique list of variables owned by a pipeline item.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableContainer {
    variables: Vec<ShaderVariable>,
}

impl VariableContainer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `variable`. Returns `false` when the name is already taken or
    /// empty.
    pub fn add(&mut self, variable: ShaderVariable) -> bool {
        if variable.name.is_empty() || self.contains(&variable.name) {
            return false;
        }
        self.variables.push(variable);
        true
    }

    /// Removes and returns the variable named `name`.
    pub fn remove(&mut self, name: &str) -> Option<ShaderVariable> {
        let index = self.variables.iter().position(|v| v.name == name)?;
        Some(self.variables.remove(index))
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ShaderVariable> {
        self.variables.iter().find(|v| v.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut ShaderVariable> {
        self.variables.iter_mut().find(|v| v.name == name)
    }

    #[inline]
    #[must_use]
    pub fn get_index(&self, index: usize) -> Option<&ShaderVariable> {
        self.variables.get(index)
    }

    #[inline]
    pub fn get_index_mut(&mut self, index: usize) -> Option<&mut ShaderVariable> {
        self.variables.get_mut(index)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.variables.iter().any(|v| v.name == name)
    }

    /// Renames a variable; fails on a missing source or a taken target.
    pub fn rename(&mut self, from: &str, to: &str) -> bool {
        if to.is_empty() || self.contains(to) {
            return false;
        }
        match self.get_mut(from) {
            Some(var) => {
                var.name = to.to_owned();
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.variables.clear();
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ShaderVariable> {
        self.variables.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, ShaderVariable> {
        self.variables.iter_mut()
    }

    /// Refreshes every system-bound variable. Returns how many were written.
    pub fn update_system(&mut self, values: &SystemValues) -> usize {
        let mut written = 0;
        for var in &mut self.variables {
            if var.system() == SystemVariable::None {
                continue;
            }
            if let Some(words) = values.words(var.system()) {
                var.commit(&words);
                written += 1;
            }
        }
        written
    }
}

impl<'a> IntoIterator for &'a VariableContainer {
    type Item = &'a ShaderVariable;
    type IntoIter = std::slice::Iter<'a, ShaderVariable>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Variables pinned to the watch panel, as `(item, variable)` name pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PinnedVariables {
    pins: Vec<(String, String)>,
}

impl PinnedVariables {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pin(&mut self, item: &str, variable: &str) -> bool {
        if self.is_pinned(item, variable) {
            return false;
        }
        self.pins.push((item.to_owned(), variable.to_owned()));
        true
    }

    pub fn unpin(&mut self, item: &str, variable: &str) -> bool {
        let before = self.pins.len();
        self.pins.retain(|(i, v)| !(i == item && v == variable));
        self.pins.len() != before
    }

    #[must_use]
    pub fn is_pinned(&self, item: &str, variable: &str) -> bool {
        self.pins.iter().any(|(i, v)| i == item && v == variable)
    }

    /// Drops every pin of a removed item.
    pub fn remove_item(&mut self, item: &str) {
        self.pins.retain(|(i, _)| i != item);
    }

    pub fn rename_item(&mut self, from: &str, to: &str) {
        for (i, _) in &mut self.pins {
            if i == from {
                *i = to.to_owned();
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pins.iter().map(|(i, v)| (i.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pins.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }

    pub fn clear(&mut self) {
        self.pins.clear();
    }
}
