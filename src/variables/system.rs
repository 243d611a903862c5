use glam::{Mat4, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::ValueType;
use crate::camera::Camera;

/// Engine-provided value a variable can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SystemVariable {
    #[default]
    None,
    /// Seconds since the session started.
    Time,
    TimeDelta,
    FrameIndex,
    ViewportSize,
    MousePosition,
    View,
    Projection,
    ViewProjection,
    Orthographic,
    ViewOrthographic,
    /// World transform of the geometry being drawn.
    GeometryTransform,
    CameraPosition,
    CameraPosition3,
    CameraDirection3,
    IsPicked,
    KeysWasd,
}

impl SystemVariable {
    pub const ALL: [Self; 17] = [
        Self::None,
        Self::Time,
        Self::TimeDelta,
        Self::FrameIndex,
        Self::ViewportSize,
        Self::MousePosition,
        Self::View,
        Self::Projection,
        Self::ViewProjection,
        Self::Orthographic,
        Self::ViewOrthographic,
        Self::GeometryTransform,
        Self::CameraPosition,
        Self::CameraPosition3,
        Self::CameraDirection3,
        Self::IsPicked,
        Self::KeysWasd,
    ];

    /// The only value type this system value can be bound to.
    /// `None` accepts any type.
    #[must_use]
    pub const fn required_type(self) -> Option<ValueType> {
        match self {
            Self::None => None,
            Self::Time | Self::TimeDelta => Some(ValueType::Float1),
            Self::FrameIndex => Some(ValueType::Integer1),
            Self::ViewportSize | Self::MousePosition => Some(ValueType::Float2),
            Self::View
            | Self::Projection
            | Self::ViewProjection
            | Self::Orthographic
            | Self::ViewOrthographic
            | Self::GeometryTransform => Some(ValueType::Float4x4),
            Self::CameraPosition => Some(ValueType::Float4),
            Self::CameraPosition3 | Self::CameraDirection3 => Some(ValueType::Float3),
            Self::IsPicked => Some(ValueType::Boolean1),
            Self::KeysWasd => Some(ValueType::Integer4),
        }
    }
}

/// Per-frame snapshot of every [`SystemVariable`] source.
#[derive(Debug, Clone, PartialEq)]
pub struct SystemValues {
    pub time: f32,
    pub time_delta: f32,
    pub frame_index: u32,
    pub viewport_size: Vec2,
    pub mouse_position: Vec2,
    pub view: Mat4,
    pub projection: Mat4,
    pub orthographic: Mat4,
    pub geometry_transform: Mat4,
    pub camera_position: Vec3,
    pub camera_direction: Vec3,
    pub is_picked: bool,
    pub keys_wasd: [bool; 4],
}

impl Default for SystemValues {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemValues {
    /// Field of view used for the default projection.
    pub const FOV_Y: f32 = std::f32::consts::FRAC_PI_4;
    pub const Z_NEAR: f32 = 0.1;
    pub const Z_FAR: f32 = 1000.0;

    #[must_use]
    pub fn new() -> Self {
        let mut values = Self {
            time: 0.0,
            time_delta: 0.0,
            frame_index: 0,
            viewport_size: Vec2::ONE,
            mouse_position: Vec2::ZERO,
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            orthographic: Mat4::IDENTITY,
            geometry_transform: Mat4::IDENTITY,
            camera_position: Vec3::ZERO,
            camera_direction: Vec3::Z,
            is_picked: false,
            keys_wasd: [false; 4],
        };
        values.set_viewport(1.0, 1.0);
        values
    }

    /// Advances the clock by one frame.
    pub fn advance(&mut self, delta: f32) {
        self.time_delta = delta;
        self.time += delta;
        self.frame_index = self.frame_index.wrapping_add(1);
    }

    /// Updates viewport size and the projections derived from it.
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        let width = width.max(1.0);
        let height = height.max(1.0);
        self.viewport_size = Vec2::new(width, height);
        self.projection = Mat4::perspective_lh(Self::FOV_Y, width / height, Self::Z_NEAR, Self::Z_FAR);
        self.orthographic = Mat4::orthographic_lh(0.0, width, height, 0.0, Self::Z_NEAR, Self::Z_FAR);
    }

    /// Copies view matrix, position and direction from `camera`.
    pub fn set_camera(&mut self, camera: &dyn Camera) {
        self.view = camera.matrix();
        self.camera_position = camera.position();
        self.camera_direction = camera.view_direction();
    }

    #[inline]
    #[must_use]
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }

    /// The value of `system` as raw words, or `None` for `SystemVariable::None`.
    #[must_use]
    pub fn words(&self, system: SystemVariable) -> Option<Vec<u32>> {
        let floats = |v: &[f32]| v.iter().map(|f| f.to_bits()).collect::<Vec<_>>();
        let matrix = |m: Mat4| floats(&m.to_cols_array());

        Some(match system {
            SystemVariable::None => return None,
            SystemVariable::Time => floats(&[self.time]),
            SystemVariable::TimeDelta => floats(&[self.time_delta]),
            SystemVariable::FrameIndex => vec![self.frame_index],
            SystemVariable::ViewportSize => floats(&self.viewport_size.to_array()),
            SystemVariable::MousePosition => floats(&self.mouse_position.to_array()),
            SystemVariable::View => matrix(self.view),
            SystemVariable::Projection => matrix(self.projection),
            SystemVariable::ViewProjection => matrix(self.view_projection()),
            SystemVariable::Orthographic => matrix(self.orthographic),
            SystemVariable::ViewOrthographic => matrix(self.orthographic * self.view),
            SystemVariable::GeometryTransform => matrix(self.geometry_transform),
            SystemVariable::CameraPosition => floats(&self.camera_position.extend(1.0).to_array()),
            SystemVariable::CameraPosition3 => floats(&self.camera_position.to_array()),
            SystemVariable::CameraDirection3 => floats(&self.camera_direction.to_array()),
            SystemVariable::IsPicked => vec![u32::from(self.is_picked)],
            SystemVariable::KeysWasd => self.keys_wasd.iter().map(|k| u32::from(*k)).collect(),
        })
    }
}
