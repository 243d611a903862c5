use glam::{EulerRot, Mat2, Mat3, Mat4, Vec2, Vec3, Vec4};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use super::{ValueType, VariableContainer};
use crate::plugins::PluginRegistry;

/// Built-in function selector of a function-backed variable.
///
/// Matrix functions follow left-handed conventions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FunctionVariable {
    #[default]
    None,
    /// Copies another variable of the same container (named by the target).
    Pointer,
    /// View matrix of a stored camera snapshot (named by the target).
    CameraSnapshot,
    MatrixIdentity,
    MatrixLookAtLH,
    MatrixLookToLH,
    MatrixOrthographicLH,
    MatrixPerspectiveFovLH,
    MatrixPerspectiveLH,
    MatrixRotationAxis,
    MatrixRotationRollPitchYaw,
    MatrixRotationX,
    MatrixRotationY,
    MatrixRotationZ,
    MatrixScaling,
    MatrixTranslation,
    ScalarCos,
    ScalarSin,
    VectorNormalize,
    VectorCross,
    /// A plugin function, by registry key.
    Plugin(String),
}

impl FunctionVariable {
    /// Every built-in selector.
    pub const BUILTINS: [Self; 20] = [
        Self::None,
        Self::Pointer,
        Self::CameraSnapshot,
        Self::MatrixIdentity,
        Self::MatrixLookAtLH,
        Self::MatrixLookToLH,
        Self::MatrixOrthographicLH,
        Self::MatrixPerspectiveFovLH,
        Self::MatrixPerspectiveLH,
        Self::MatrixRotationAxis,
        Self::MatrixRotationRollPitchYaw,
        Self::MatrixRotationX,
        Self::MatrixRotationY,
        Self::MatrixRotationZ,
        Self::MatrixScaling,
        Self::MatrixTranslation,
        Self::ScalarCos,
        Self::ScalarSin,
        Self::VectorNormalize,
        Self::VectorCross,
    ];

    /// Number of `f32` arguments. Plugin arity lives in the registry and
    /// reports `0` here.
    #[must_use]
    pub fn argument_count(&self) -> usize {
        self.argument_names().len()
    }

    /// Display labels of the arguments, in storage order.
    #[must_use]
    pub fn argument_names(&self) -> &'static [&'static str] {
        match self {
            Self::None
            | Self::Pointer
            | Self::CameraSnapshot
            | Self::MatrixIdentity
            | Self::Plugin(_) => &[],
            Self::MatrixLookAtLH => &[
                "eye.x", "eye.y", "eye.z", "focus.x", "focus.y", "focus.z", "up.x", "up.y", "up.z",
            ],
            Self::MatrixLookToLH => &[
                "eye.x", "eye.y", "eye.z", "dir.x", "dir.y", "dir.z", "up.x", "up.y", "up.z",
            ],
            Self::MatrixOrthographicLH | Self::MatrixPerspectiveLH => {
                &["width", "height", "near", "far"]
            }
            Self::MatrixPerspectiveFovLH => &["fov", "aspect", "near", "far"],
            Self::MatrixRotationAxis => &["axis.x", "axis.y", "axis.z", "angle"],
            Self::MatrixRotationRollPitchYaw => &["pitch", "yaw", "roll"],
            Self::MatrixRotationX | Self::MatrixRotationY | Self::MatrixRotationZ => &["angle"],
            Self::MatrixScaling => &["x", "y", "z"],
            Self::MatrixTranslation => &["x", "y", "z"],
            Self::ScalarCos | Self::ScalarSin => &["x"],
            Self::VectorNormalize => &["x", "y", "z", "w"],
            Self::VectorCross => &["a.x", "a.y", "a.z", "b.x", "b.y", "b.z"],
        }
    }

    /// Whether this built-in can produce a value of `value_type`.
    /// Plugin functions answer through the registry and report `false` here.
    #[must_use]
    pub fn has_valid_return_type(&self, value_type: ValueType) -> bool {
        match self {
            Self::None | Self::Pointer => true,
            Self::MatrixIdentity => value_type.is_matrix(),
            Self::CameraSnapshot
            | Self::MatrixLookAtLH
            | Self::MatrixLookToLH
            | Self::MatrixOrthographicLH
            | Self::MatrixPerspectiveFovLH
            | Self::MatrixPerspectiveLH
            | Self::MatrixRotationAxis
            | Self::MatrixRotationRollPitchYaw
            | Self::MatrixRotationX
            | Self::MatrixRotationY
            | Self::MatrixRotationZ
            | Self::MatrixScaling
            | Self::MatrixTranslation => value_type == ValueType::Float4x4,
            Self::ScalarCos | Self::ScalarSin => value_type == ValueType::Float1,
            Self::VectorNormalize => matches!(
                value_type,
                ValueType::Float2 | ValueType::Float3 | ValueType::Float4
            ),
            Self::VectorCross => value_type == ValueType::Float3,
            Self::Plugin(_) => false,
        }
    }

    /// Writes sensible initial arguments (unit scale, +Y up, ...).
    pub(crate) fn default_arguments(&self, args: &mut [f32]) {
        let defaults: &[f32] = match self {
            Self::MatrixLookAtLH => &[0.0, 0.0, -5.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            Self::MatrixLookToLH => &[0.0, 0.0, -5.0, 0.0, 0.0, 1.0, 0.0, 1.0, 0.0],
            Self::MatrixOrthographicLH => &[2.0, 2.0, 0.1, 100.0],
            Self::MatrixPerspectiveFovLH => &[std::f32::consts::FRAC_PI_4, 1.0, 0.1, 1000.0],
            Self::MatrixPerspectiveLH => &[0.1, 0.1, 0.1, 1000.0],
            Self::MatrixRotationAxis => &[0.0, 1.0, 0.0, 0.0],
            Self::MatrixScaling => &[1.0, 1.0, 1.0],
            Self::VectorNormalize => &[1.0, 0.0, 0.0, 0.0],
            _ => &[],
        };
        let n = defaults.len().min(args.len());
        args[..n].copy_from_slice(&defaults[..n]);
    }

    /// Evaluates a built-in function.
    ///
    /// Returns `None` for selectors that need outside state (`None`,
    /// `Pointer`, `Plugin`) or when `args` does not match the arity.
    #[must_use]
    pub fn evaluate(
        &self,
        args: &[f32],
        value_type: ValueType,
        snapshots: &CameraSnapshots,
        target: &str,
    ) -> Option<Vec<u32>> {
        if args.len() != self.argument_count() || !self.has_valid_return_type(value_type) {
            return None;
        }

        let v3 = |i: usize| Vec3::new(args[i], args[i + 1], args[i + 2]);

        let m = match self {
            Self::None | Self::Pointer | Self::Plugin(_) => return None,
            Self::CameraSnapshot => snapshots.get(target).unwrap_or(Mat4::IDENTITY),
            Self::MatrixIdentity => {
                return Some(match value_type {
                    ValueType::Float2x2 => to_words(&Mat2::IDENTITY.to_cols_array()),
                    ValueType::Float3x3 => to_words(&Mat3::IDENTITY.to_cols_array()),
                    _ => to_words(&Mat4::IDENTITY.to_cols_array()),
                });
            }
            Self::MatrixLookAtLH => Mat4::look_at_lh(v3(0), v3(3), v3(6)),
            Self::MatrixLookToLH => Mat4::look_to_lh(v3(0), v3(3).normalize_or_zero(), v3(6)),
            Self::MatrixOrthographicLH => {
                let (w, h) = (args[0] * 0.5, args[1] * 0.5);
                Mat4::orthographic_lh(-w, w, -h, h, args[2], args[3])
            }
            Self::MatrixPerspectiveFovLH => Mat4::perspective_lh(args[0], args[1], args[2], args[3]),
            Self::MatrixPerspectiveLH => {
                let (w, h, near, far) = (args[0], args[1], args[2], args[3]);
                let fov = 2.0 * (h / (2.0 * near)).atan();
                Mat4::perspective_lh(fov, w / h, near, far)
            }
            Self::MatrixRotationAxis => {
                let axis = v3(0).normalize_or_zero();
                if axis == Vec3::ZERO {
                    Mat4::IDENTITY
                } else {
                    Mat4::from_axis_angle(axis, args[3])
                }
            }
            Self::MatrixRotationRollPitchYaw => {
                Mat4::from_euler(EulerRot::YXZ, args[1], args[0], args[2])
            }
            Self::MatrixRotationX => Mat4::from_rotation_x(args[0]),
            Self::MatrixRotationY => Mat4::from_rotation_y(args[0]),
            Self::MatrixRotationZ => Mat4::from_rotation_z(args[0]),
            Self::MatrixScaling => Mat4::from_scale(v3(0)),
            Self::MatrixTranslation => Mat4::from_translation(v3(0)),
            Self::ScalarCos => return Some(to_words(&[args[0].cos()])),
            Self::ScalarSin => return Some(to_words(&[args[0].sin()])),
            Self::VectorNormalize => {
                return Some(match value_type {
                    ValueType::Float2 => {
                        to_words(&Vec2::new(args[0], args[1]).normalize_or_zero().to_array())
                    }
                    ValueType::Float3 => to_words(&v3(0).normalize_or_zero().to_array()),
                    _ => to_words(&Vec4::from_slice(args).normalize_or_zero().to_array()),
                });
            }
            Self::VectorCross => return Some(to_words(&v3(0).cross(v3(3)).to_array())),
        };

        Some(to_words(&m.to_cols_array()))
    }
}

fn to_words(values: &[f32]) -> Vec<u32> {
    values.iter().map(|f| f.to_bits()).collect()
}

/// Named camera view matrices captured by the user.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CameraSnapshots {
    entries: Vec<(String, Mat4)>,
}

impl CameraSnapshots {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `view` under `name`, replacing an existing snapshot.
    pub fn store(&mut self, name: &str, view: Mat4) {
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = view,
            None => self.entries.push((name.to_owned(), view)),
        }
    }

    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(n, _)| n != name);
        self.entries.len() != before
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<Mat4> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, m)| *m)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Re-evaluates function-backed variables once per frame.
///
/// Owned by the session context. Every evaluated `(item, variable)` pair is
/// tracked until [`begin_frame`](Self::begin_frame), so a variable shared by
/// several draws in one frame is computed only once.
#[derive(Debug, Default)]
pub struct FunctionVariableManager {
    evaluated: FxHashSet<(String, String)>,
    snapshots: CameraSnapshots,
}

impl FunctionVariableManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Forgets which variables were evaluated during the previous frame.
    pub fn begin_frame(&mut self) {
        self.evaluated.clear();
    }

    #[must_use]
    pub fn is_evaluated(&self, owner: &str, variable: &str) -> bool {
        self.evaluated
            .contains(&(owner.to_owned(), variable.to_owned()))
    }

    #[must_use]
    pub fn snapshots(&self) -> &CameraSnapshots {
        &self.snapshots
    }

    pub fn snapshots_mut(&mut self) -> &mut CameraSnapshots {
        &mut self.snapshots
    }

    /// Evaluates every function-backed variable of `container` that was not
    /// yet evaluated this frame. Returns how many values changed.
    pub fn update(
        &mut self,
        owner: &str,
        container: &mut VariableContainer,
        plugins: &PluginRegistry,
    ) -> usize {
        let mut updated = 0;

        for index in 0..container.len() {
            let Some(var) = container.get_index(index) else {
                break;
            };
            if !var.is_function_backed() {
                continue;
            }
            if !self.evaluated.insert((owner.to_owned(), var.name.clone())) {
                continue;
            }

            let value_type = var.value_type();
            let words = match var.function() {
                FunctionVariable::Pointer => container
                    .get(var.target())
                    .filter(|src| src.name != var.name && src.value_type() == value_type)
                    .map(|src| src.words().to_vec()),
                FunctionVariable::Plugin(key) => plugins.function(key).map(|plugin| {
                    let mut out = vec![0u8; value_type.size()];
                    plugin.evaluate(var.arguments(), value_type, &mut out);
                    out.chunks_exact(4)
                        .map(|c| u32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
                        .collect()
                }),
                builtin => builtin.evaluate(var.arguments(), value_type, &self.snapshots, var.target()),
            };

            match words {
                Some(words) => {
                    if let Some(var) = container.get_index_mut(index) {
                        var.commit(&words);
                        updated += 1;
                    }
                }
                None => log::trace!("Function variable '{owner}/{}' produced no value", var.name),
            }
        }

        updated
    }
}
