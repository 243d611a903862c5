//! Session-scoped shared state.
//!
//! Everything that would otherwise be a process-wide singleton (settings,
//! plugin registry, function-variable tracking, message log, system values)
//! lives in one [`SessionContext`], created with the session and passed by
//! reference to the components that need it.

use crate::camera::Camera;
use crate::debug::PassTimings;
use crate::messages::MessageStack;
use crate::plugins::PluginRegistry;
use crate::settings::Settings;
use crate::variables::{FunctionVariableManager, PinnedVariables, SystemValues};

#[derive(Debug)]
pub struct SessionContext {
    pub settings: Settings,
    pub plugins: PluginRegistry,
    pub functions: FunctionVariableManager,
    pub messages: MessageStack,
    pub system: SystemValues,
    pub pinned: PinnedVariables,
    pub timings: PassTimings,
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl SessionContext {
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        let timings = PassTimings::new(settings.debug.timing_window);
        Self {
            settings,
            plugins: PluginRegistry::new(),
            functions: FunctionVariableManager::new(),
            messages: MessageStack::new(),
            system: SystemValues::new(),
            pinned: PinnedVariables::new(),
            timings,
        }
    }

    /// Feeds the view-dependent system values from `camera`.
    pub fn set_camera(&mut self, camera: &dyn Camera) {
        self.system.set_camera(camera);
    }

    /// Captures the current view matrix as a named camera snapshot.
    pub fn store_camera_snapshot(&mut self, name: &str) {
        let view = self.system.view;
        self.functions.snapshots_mut().store(name, view);
    }
}
