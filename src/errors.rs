//! Error Types
//!
//! This module defines the error types used throughout the shader lab.
//!
//! # Overview
//!
//! The main error type [`StudioError`] covers the failure modes of the
//! collaborators this crate talks to:
//! - File and project I/O
//! - Settings (de)serialization
//! - External compiler tooling
//! - Function-variable binding
//!
//! Shader diagnostics are **not** errors: a failed compile is an expected,
//! recoverable outcome and is reported through a
//! [`MessageSink`](crate::messages::MessageSink) instead.
//!
//! # Usage
//!
//! ```rust,ignore
//! use shaderlab::errors::{StudioError, Result};
//!
//! fn load_project() -> Result<()> {
//!     Ok(())
//! }
//! ```

use thiserror::Error;

use crate::variables::{FunctionVariable, ValueType};

/// The main error type for the shader lab.
#[derive(Error, Debug)]
pub enum StudioError {
    // ========================================================================
    // I/O Errors
    // ========================================================================
    /// File I/O error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// A project-relative path could not be resolved.
    #[error("Path could not be resolved: {0}")]
    PathNotResolved(String),

    // ========================================================================
    // Settings Errors
    // ========================================================================
    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    // ========================================================================
    // Tooling Errors
    // ========================================================================
    /// An external compiler executable could not be located.
    #[error("Compiler tool not found: {0}")]
    ToolNotFound(String),

    /// An external compiler executable exited abnormally.
    #[error("Compiler tool '{tool}' failed: {message}")]
    ToolFailed {
        /// Tool name
        tool: String,
        /// Captured diagnostic output
        message: String,
    },

    // ========================================================================
    // Variable Errors
    // ========================================================================
    /// Function-variable binding failure.
    #[error(transparent)]
    Variable(#[from] VariableError),
}

/// Rejections raised while binding a built-in function to a variable.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VariableError {
    /// The function does not produce a value of the variable's type.
    #[error("function {function:?} cannot produce a value of type {value_type:?}")]
    ReturnTypeMismatch {
        function: FunctionVariable,
        value_type: ValueType,
    },

    /// A plugin function key is not registered.
    #[error("plugin function '{0}' is not registered")]
    UnknownPluginFunction(String),

    /// Argument index out of range for the bound function.
    #[error("argument {index} out of range (function takes {count})")]
    ArgumentOutOfRange { index: usize, count: usize },
}

/// Alias for `Result<T, StudioError>`.
pub type Result<T> = std::result::Result<T, StudioError>;
