//! Variable / Value Model
//!
//! Typed values bound to shader uniforms. A [`ShaderVariable`] holds either:
//!
//! - a **literal** value written by the user,
//! - a **system** value refreshed every frame from [`SystemValues`]
//!   (time, camera matrices, viewport size, ...), or
//! - a **function-backed** value computed by a built-in (or plugin)
//!   function from packed `f32` arguments, re-evaluated once per frame by the
//!   [`FunctionVariableManager`].
//!
//! Values live in a fixed 16-word buffer (large enough for a `float4x4`);
//! matrices are stored column-major without padding.

mod container;
mod function;
mod shader_variable;
mod system;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

pub use container::{PinnedVariables, VariableContainer};
pub use function::{CameraSnapshots, FunctionVariable, FunctionVariableManager};
pub use shader_variable::ShaderVariable;
pub use system::{SystemValues, SystemVariable};

/// Capacity of a variable's value buffer, in 32-bit words.
pub const VALUE_WORDS: usize = 16;

/// Declared type of a [`ShaderVariable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ValueType {
    Boolean1,
    Boolean2,
    Boolean3,
    Boolean4,
    Integer1,
    Integer2,
    Integer3,
    Integer4,
    #[default]
    Float1,
    Float2,
    Float3,
    Float4,
    Float2x2,
    Float3x3,
    Float4x4,
}

/// Scalar component kind of a [`ValueType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Bool,
    Int,
    Float,
}

impl ValueType {
    /// Number of 32-bit components.
    #[must_use]
    pub const fn component_count(self) -> usize {
        match self {
            Self::Boolean1 | Self::Integer1 | Self::Float1 => 1,
            Self::Boolean2 | Self::Integer2 | Self::Float2 => 2,
            Self::Boolean3 | Self::Integer3 | Self::Float3 => 3,
            Self::Boolean4 | Self::Integer4 | Self::Float4 | Self::Float2x2 => 4,
            Self::Float3x3 => 9,
            Self::Float4x4 => 16,
        }
    }

    /// Size of the value in bytes.
    #[inline]
    #[must_use]
    pub const fn size(self) -> usize {
        self.component_count() * 4
    }

    #[must_use]
    pub const fn scalar_kind(self) -> ScalarKind {
        match self {
            Self::Boolean1 | Self::Boolean2 | Self::Boolean3 | Self::Boolean4 => ScalarKind::Bool,
            Self::Integer1 | Self::Integer2 | Self::Integer3 | Self::Integer4 => ScalarKind::Int,
            _ => ScalarKind::Float,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_matrix(self) -> bool {
        matches!(self, Self::Float2x2 | Self::Float3x3 | Self::Float4x4)
    }

    /// Column count of a square matrix type.
    #[must_use]
    pub const fn matrix_dimension(self) -> Option<usize> {
        match self {
            Self::Float2x2 => Some(2),
            Self::Float3x3 => Some(3),
            Self::Float4x4 => Some(4),
            _ => None,
        }
    }

    /// GLSL spelling of the type.
    #[must_use]
    pub const fn glsl_name(self) -> &'static str {
        match self {
            Self::Boolean1 => "bool",
            Self::Boolean2 => "bvec2",
            Self::Boolean3 => "bvec3",
            Self::Boolean4 => "bvec4",
            Self::Integer1 => "int",
            Self::Integer2 => "ivec2",
            Self::Integer3 => "ivec3",
            Self::Integer4 => "ivec4",
            Self::Float1 => "float",
            Self::Float2 => "vec2",
            Self::Float3 => "vec3",
            Self::Float4 => "vec4",
            Self::Float2x2 => "mat2",
            Self::Float3x3 => "mat3",
            Self::Float4x4 => "mat4",
        }
    }
}

bitflags! {
    /// Post-processing applied to computed matrix values.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct VariableFlags: u8 {
        const INVERSE    = 1 << 0;
        const TRANSPOSE  = 1 << 1;
        /// Upload the value computed on the previous frame.
        const LAST_FRAME = 1 << 2;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_type_sizes() {
        assert_eq!(ValueType::Float1.size(), 4);
        assert_eq!(ValueType::Float3.component_count(), 3);
        assert_eq!(ValueType::Float4x4.size(), VALUE_WORDS * 4);
        assert_eq!(ValueType::Float3x3.matrix_dimension(), Some(3));
        assert_eq!(ValueType::Integer2.scalar_kind(), ScalarKind::Int);
        assert!(!ValueType::Float4.is_matrix());
    }
}
