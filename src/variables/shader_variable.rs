use glam::{Mat2, Mat3, Mat4};

use super::function::FunctionVariable;
use super::system::SystemVariable;
use super::{ScalarKind, VALUE_WORDS, ValueType, VariableFlags};
use crate::errors::VariableError;
use crate::plugins::PluginRegistry;

/// A named, typed uniform value.
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderVariable {
    pub name: String,
    value_type: ValueType,
    data: [u32; VALUE_WORDS],
    /// Value computed on the previous frame, uploaded with `LAST_FRAME`.
    previous: [u32; VALUE_WORDS],

    system: SystemVariable,
    function: FunctionVariable,
    /// Packed function arguments, sized exactly to the function's arity.
    arguments: Vec<f32>,
    /// Variable or snapshot name for `Pointer` / `CameraSnapshot`.
    target: String,

    pub flags: VariableFlags,
}

impl ShaderVariable {
    /// A zero-initialized literal variable.
    #[must_use]
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
            data: [0; VALUE_WORDS],
            previous: [0; VALUE_WORDS],
            system: SystemVariable::None,
            function: FunctionVariable::None,
            arguments: Vec::new(),
            target: String::new(),
            flags: VariableFlags::empty(),
        }
    }

    /// A variable refreshed from `system` every frame.
    ///
    /// Returns `None` when `system` requires a different type.
    #[must_use]
    pub fn with_system(name: impl Into<String>, value_type: ValueType, system: SystemVariable) -> Option<Self> {
        let mut var = Self::new(name, value_type);
        var.set_system(system).then_some(var)
    }

    #[inline]
    #[must_use]
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// Changes the declared type, dropping any binding the new type cannot
    /// satisfy.
    pub fn set_value_type(&mut self, value_type: ValueType) {
        if value_type == self.value_type {
            return;
        }
        self.value_type = value_type;
        self.data = [0; VALUE_WORDS];
        self.previous = [0; VALUE_WORDS];

        if self.system.required_type().is_some_and(|t| t != value_type) {
            self.system = SystemVariable::None;
        }
        if !self.function.has_valid_return_type(value_type) {
            self.function = FunctionVariable::None;
            self.arguments.clear();
        }
    }

    // ---- Bindings ----------------------------------------------------------

    #[inline]
    #[must_use]
    pub fn system(&self) -> SystemVariable {
        self.system
    }

    /// Binds a system value. Returns `false` on type mismatch.
    ///
    /// A system binding replaces any function binding.
    pub fn set_system(&mut self, system: SystemVariable) -> bool {
        if system.required_type().is_some_and(|t| t != self.value_type) {
            return false;
        }
        self.system = system;
        if system != SystemVariable::None {
            self.function = FunctionVariable::None;
            self.arguments.clear();
        }
        true
    }

    #[inline]
    #[must_use]
    pub fn function(&self) -> &FunctionVariable {
        &self.function
    }

    #[inline]
    #[must_use]
    pub fn is_function_backed(&self) -> bool {
        self.function != FunctionVariable::None
    }

    /// Checks that `function` produces this variable's type.
    ///
    /// Plugin functions are looked up in `plugins`.
    pub fn has_valid_return_type(
        &self,
        function: &FunctionVariable,
        plugins: &PluginRegistry,
    ) -> Result<bool, VariableError> {
        match function {
            FunctionVariable::Plugin(key) => plugins
                .function(key)
                .map(|f| f.has_valid_return_type(self.value_type))
                .ok_or_else(|| VariableError::UnknownPluginFunction(key.clone())),
            builtin => Ok(builtin.has_valid_return_type(self.value_type)),
        }
    }

    /// Binds `function`, sizing the argument storage to its arity.
    ///
    /// The return type is validated before any storage is touched; on
    /// rejection the variable is left unchanged.
    pub fn bind_function(
        &mut self,
        function: FunctionVariable,
        plugins: &PluginRegistry,
    ) -> Result<(), VariableError> {
        if !self.has_valid_return_type(&function, plugins)? {
            return Err(VariableError::ReturnTypeMismatch {
                function,
                value_type: self.value_type,
            });
        }

        let count = match &function {
            FunctionVariable::Plugin(key) => plugins
                .function(key)
                .map(|f| f.argument_count())
                .ok_or_else(|| VariableError::UnknownPluginFunction(key.clone()))?,
            builtin => builtin.argument_count(),
        };

        self.function = function;
        self.system = SystemVariable::None;
        self.allocate_argument_space(count);
        self.function.default_arguments(&mut self.arguments);
        Ok(())
    }

    /// Removes the function binding and its arguments.
    pub fn unbind_function(&mut self) {
        self.function = FunctionVariable::None;
        self.arguments.clear();
        self.target.clear();
    }

    /// Resizes the argument storage to exactly `count` values.
    pub fn allocate_argument_space(&mut self, count: usize) {
        self.arguments.clear();
        self.arguments.resize(count, 0.0);
    }

    #[inline]
    #[must_use]
    pub fn arguments(&self) -> &[f32] {
        &self.arguments
    }

    pub fn set_argument(&mut self, index: usize, value: f32) -> Result<(), VariableError> {
        let count = self.arguments.len();
        let slot = self
            .arguments
            .get_mut(index)
            .ok_or(VariableError::ArgumentOutOfRange { index, count })?;
        *slot = value;
        Ok(())
    }

    /// Name referenced by `Pointer` / `CameraSnapshot` bindings.
    #[inline]
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn set_target(&mut self, target: impl Into<String>) {
        self.target = target.into();
    }

    // ---- Raw value ---------------------------------------------------------

    /// Live components of the value.
    #[inline]
    #[must_use]
    pub fn words(&self) -> &[u32] {
        &self.data[..self.value_type.component_count()]
    }

    /// Value bytes as uploaded to the GPU, honoring `LAST_FRAME`.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        let n = self.value_type.component_count();
        if self.flags.contains(VariableFlags::LAST_FRAME) {
            bytemuck::cast_slice(&self.previous[..n])
        } else {
            bytemuck::cast_slice(&self.data[..n])
        }
    }

    /// Copies `words` into the value (truncated to the type's size).
    pub fn set_words(&mut self, words: &[u32]) {
        let n = self.value_type.component_count().min(words.len());
        self.data[..n].copy_from_slice(&words[..n]);
    }

    /// Stores a freshly computed value, applying matrix flags and keeping the
    /// old value for `LAST_FRAME`.
    pub(crate) fn commit(&mut self, words: &[u32]) {
        self.previous = self.data;
        self.set_words(words);
        self.apply_matrix_flags();
    }

    fn apply_matrix_flags(&mut self) {
        let inverse = self.flags.contains(VariableFlags::INVERSE);
        let transpose = self.flags.contains(VariableFlags::TRANSPOSE);
        if !inverse && !transpose {
            return;
        }

        let n = self.value_type.component_count();
        let mut cols = [0.0f32; VALUE_WORDS];
        cols[..n].copy_from_slice(bytemuck::cast_slice(&self.data[..n]));

        match self.value_type {
            ValueType::Float2x2 => {
                let mut m = Mat2::from_cols_slice(&cols[..4]);
                if inverse {
                    m = m.inverse();
                }
                if transpose {
                    m = m.transpose();
                }
                cols[..4].copy_from_slice(&m.to_cols_array());
            }
            ValueType::Float3x3 => {
                let mut m = Mat3::from_cols_slice(&cols[..9]);
                if inverse {
                    m = m.inverse();
                }
                if transpose {
                    m = m.transpose();
                }
                cols[..9].copy_from_slice(&m.to_cols_array());
            }
            ValueType::Float4x4 => {
                let mut m = Mat4::from_cols_slice(&cols[..16]);
                if inverse {
                    m = m.inverse();
                }
                if transpose {
                    m = m.transpose();
                }
                cols.copy_from_slice(&m.to_cols_array());
            }
            _ => return,
        }

        self.data[..n].copy_from_slice(bytemuck::cast_slice(&cols[..n]));
    }

    // ---- Typed access ------------------------------------------------------

    #[must_use]
    pub fn get_f32(&self, index: usize) -> Option<f32> {
        (self.value_type.scalar_kind() == ScalarKind::Float)
            .then(|| self.words().get(index).map(|w| f32::from_bits(*w)))
            .flatten()
    }

    pub fn set_f32(&mut self, index: usize, value: f32) -> bool {
        if self.value_type.scalar_kind() != ScalarKind::Float
            || index >= self.value_type.component_count()
        {
            return false;
        }
        self.data[index] = value.to_bits();
        true
    }

    #[must_use]
    pub fn get_i32(&self, index: usize) -> Option<i32> {
        (self.value_type.scalar_kind() == ScalarKind::Int)
            .then(|| self.words().get(index).map(|w| *w as i32))
            .flatten()
    }

    pub fn set_i32(&mut self, index: usize, value: i32) -> bool {
        if self.value_type.scalar_kind() != ScalarKind::Int
            || index >= self.value_type.component_count()
        {
            return false;
        }
        self.data[index] = value as u32;
        true
    }

    #[must_use]
    pub fn get_bool(&self, index: usize) -> Option<bool> {
        (self.value_type.scalar_kind() == ScalarKind::Bool)
            .then(|| self.words().get(index).map(|w| *w != 0))
            .flatten()
    }

    pub fn set_bool(&mut self, index: usize, value: bool) -> bool {
        if self.value_type.scalar_kind() != ScalarKind::Bool
            || index >= self.value_type.component_count()
        {
            return false;
        }
        self.data[index] = u32::from(value);
        true
    }

    /// The value as a 4x4 matrix, for `Float4x4` variables.
    #[must_use]
    pub fn get_mat4(&self) -> Option<Mat4> {
        (self.value_type == ValueType::Float4x4)
            .then(|| Mat4::from_cols_slice(bytemuck::cast_slice(&self.data)))
    }

    pub fn set_mat4(&mut self, m: Mat4) -> bool {
        if self.value_type != ValueType::Float4x4 {
            return false;
        }
        self.data.copy_from_slice(bytemuck::cast_slice(&m.to_cols_array()));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_access() {
        let mut v = ShaderVariable::new("color", ValueType::Float3);
        assert!(v.set_f32(2, 0.5));
        assert!(!v.set_f32(3, 1.0));
        assert!(!v.set_i32(0, 1));
        assert_eq!(v.get_f32(2), Some(0.5));
        assert_eq!(v.bytes().len(), 12);
    }

    #[test]
    fn test_system_binding_requires_type() {
        let mut v = ShaderVariable::new("t", ValueType::Float3);
        assert!(!v.set_system(SystemVariable::Time));
        assert!(v.set_system(SystemVariable::CameraPosition3));
        v.set_value_type(ValueType::Float1);
        assert_eq!(v.system(), SystemVariable::None);
    }

    #[test]
    fn test_commit_applies_flags_and_keeps_previous() {
        let mut v = ShaderVariable::new("m", ValueType::Float4x4);
        v.flags = VariableFlags::INVERSE;

        let scale = Mat4::from_scale(glam::Vec3::splat(2.0));
        let words: Vec<u32> = scale.to_cols_array().iter().map(|f| f.to_bits()).collect();
        v.commit(&words);
        let inverted = v.get_mat4().unwrap();
        assert!(inverted.abs_diff_eq(Mat4::from_scale(glam::Vec3::splat(0.5)), 1e-6));

        v.flags |= VariableFlags::LAST_FRAME;
        v.commit(&words);
        assert_eq!(v.bytes(), bytemuck::cast_slice::<f32, u8>(&inverted.to_cols_array()));
    }
}
