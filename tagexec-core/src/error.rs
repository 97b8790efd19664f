//! Error types for tagexec.
//!
//! This module provides a structured error hierarchy using `thiserror`:
//!
//! - [`ConfigError`] - Errors while loading or validating an execution plan
//! - [`PhaseParseError`] - An unknown phase name
//!
//! Extension handler failures travel as [`BoxError`] and are never wrapped by
//! the dispatcher.

use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while loading an execution plan.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration is not valid JSON or does not match the plan shape.
    #[error("invalid plan json: {0}")]
    Json(#[from] serde_json::Error),

    /// A step has an empty name.
    #[error("step #{index} has an empty name")]
    EmptyStepName {
        /// Position of the step in `tag_execute_steps`.
        index: usize,
    },

    /// A step references an extension with an empty name.
    #[error("step `{step}` references an extension with an empty name")]
    EmptyPluginName {
        /// Name of the offending step.
        step: String,
    },
}

/// An unknown phase name was parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown phase: {0}")]
pub struct PhaseParseError(pub String);
