use super::item::{AudioPass, ComputePass, PipelineItem, PluginItem, ShaderPass};
use super::template;
use super::PIPELINE_ITEM_NAME_LENGTH;

/// Ordered, name-unique list of pipeline items.
///
/// Items are rendered in list order. Names are compared exactly
/// (case-sensitive).
#[derive(Debug, Default)]
pub struct PipelineManager {
    items: Vec<PipelineItem>,
}

impl PipelineManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `name` could be used for a new item: non-empty, within
    /// [`PIPELINE_ITEM_NAME_LENGTH`] bytes, and not taken.
    #[must_use]
    pub fn is_name_available(&self, name: &str) -> bool {
        !name.is_empty() && name.len() <= PIPELINE_ITEM_NAME_LENGTH && !self.has(name)
    }

    // ---- Adding ------------------------------------------------------------

    /// Appends `item`. Returns `false`, leaving the list untouched, when the
    /// name is unavailable.
    pub fn add_item(&mut self, item: PipelineItem) -> bool {
        if !self.is_name_available(item.name()) {
            log::warn!("Pipeline item name '{}' is invalid or already in use", item.name());
            return false;
        }
        log::debug!("Added {:?} '{}'", item.item_type(), item.name());
        self.items.push(item);
        true
    }

    pub fn add_shader_pass(&mut self, name: &str, pass: ShaderPass) -> bool {
        self.add_item(PipelineItem::shader_pass(name, pass))
    }

    pub fn add_compute_pass(&mut self, name: &str, pass: ComputePass) -> bool {
        self.add_item(PipelineItem::compute_pass(name, pass))
    }

    pub fn add_audio_pass(&mut self, name: &str, pass: AudioPass) -> bool {
        self.add_item(PipelineItem::audio_pass(name, pass))
    }

    pub fn add_plugin_item(&mut self, owner: &str, name: &str, item: PluginItem) -> bool {
        self.add_item(PipelineItem::plugin_item(name, owner, item))
    }

    // ---- Removing ----------------------------------------------------------

    /// Removes and drops the item named `name`. Missing names are ignored.
    pub fn remove(&mut self, name: &str) {
        if let Some(index) = self.position(name) {
            let item = self.items.remove(index);
            log::debug!("Removed {:?} '{}'", item.item_type(), item.name());
        }
    }

    /// Removes every item owned by the plugin `owner`.
    pub fn remove_owner(&mut self, owner: &str) {
        self.items.retain(|item| item.owner() != owner);
    }

    /// Drops every item.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Clears the pipeline and, with `open_template`, seeds it with the
    /// template shader pass.
    pub fn new_project(&mut self, open_template: bool) {
        self.clear();
        if open_template {
            self.add_item(template::template_item());
        }
    }

    // ---- Lookup ------------------------------------------------------------

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PipelineItem> {
        self.items.iter().find(|item| item.name() == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut PipelineItem> {
        self.items.iter_mut().find(|item| item.name() == name)
    }

    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.items.iter().position(|item| item.name() == name)
    }

    /// Items in render order.
    #[inline]
    #[must_use]
    pub fn list(&self) -> &[PipelineItem] {
        &self.items
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, PipelineItem> {
        self.items.iter_mut()
    }

    pub fn items_of_owner<'a>(&'a self, owner: &'a str) -> impl Iterator<Item = &'a PipelineItem> + 'a {
        self.items.iter().filter(move |item| item.owner() == owner)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    // ---- Editing -----------------------------------------------------------

    /// Renames an item. Fails on a missing source or an unavailable target.
    pub fn rename(&mut self, from: &str, to: &str) -> bool {
        if from == to {
            return self.has(from);
        }
        if !self.is_name_available(to) {
            return false;
        }
        match self.get_mut(from) {
            Some(item) => {
                item.set_name(to);
                true
            }
            None => false,
        }
    }

    /// Moves an item to `index` (clamped to the end of the list).
    pub fn move_item(&mut self, name: &str, index: usize) -> bool {
        let Some(from) = self.position(name) else {
            return false;
        };
        let item = self.items.remove(from);
        let to = index.min(self.items.len());
        self.items.insert(to, item);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::ShaderLanguage;
    use crate::pipeline::StageSource;

    fn pass() -> ShaderPass {
        ShaderPass::new(
            StageSource::new("a.vert", "main", ShaderLanguage::Glsl),
            StageSource::new("a.frag", "main", ShaderLanguage::Glsl),
        )
    }

    #[test]
    fn test_name_validation() {
        let mut pm = PipelineManager::new();
        assert!(!pm.add_shader_pass("", pass()));
        assert!(!pm.add_shader_pass(&"x".repeat(PIPELINE_ITEM_NAME_LENGTH + 1), pass()));
        assert!(pm.add_shader_pass(&"x".repeat(PIPELINE_ITEM_NAME_LENGTH), pass()));
        assert!(pm.add_shader_pass("Pass", pass()));
        assert!(pm.add_shader_pass("pass", pass()));
        assert_eq!(pm.len(), 3);
    }

    #[test]
    fn test_rename_and_move() {
        let mut pm = PipelineManager::new();
        pm.add_shader_pass("a", pass());
        pm.add_shader_pass("b", pass());
        pm.add_shader_pass("c", pass());

        assert!(!pm.rename("a", "b"));
        assert!(!pm.rename("zzz", "d"));
        assert!(pm.rename("a", "d"));

        assert!(pm.move_item("c", 0));
        assert!(pm.move_item("d", 99));
        let names: Vec<_> = pm.list().iter().map(PipelineItem::name).collect();
        assert_eq!(names, ["c", "b", "d"]);
    }

    #[test]
    fn test_new_project() {
        let mut pm = PipelineManager::new();
        pm.add_shader_pass("old", pass());

        pm.new_project(false);
        assert!(pm.is_empty());

        pm.new_project(true);
        assert_eq!(pm.len(), 1);
        assert!(pm.has(template::TEMPLATE_PASS_NAME));
    }
}
