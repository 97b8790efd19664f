//! Testing utilities for tagexec.
//!
//! This module provides stand-ins for the collaborators the orchestrator only
//! consumes through interfaces.
//!
//! # Features
//!
//! - [`CallLog`]: A shared, ordered record of extension invocations
//! - [`RecordingExtension`]: An extension that appends every call to a [`CallLog`]
//! - [`FailingExtension`]: An extension whose handlers always fail
//! - [`StaticResolver`]: A resolver that always answers the same route

use std::sync::{Arc, Mutex};
use tagexec_core::{
    BoxError, Extension, ExtensionMeta, Phase, PhaseSet, Route, RouteResolver, Value,
};
use thiserror::Error;

// ============================================================================
// Call Log
// ============================================================================

/// One recorded extension invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    /// Name of the invoked extension.
    pub extension: String,
    /// Phase it was invoked for.
    pub phase: Phase,
    /// Config it received.
    pub config: Value,
}

/// A shared, ordered record of extension invocations.
///
/// Cloning yields a handle to the same log.
///
/// # Example
///
/// ```rust,ignore
/// let log = CallLog::new();
/// let ext = RecordingExtension::new("cors", PhaseSet::ACCESS, log.clone());
///
/// // Dispatch...
///
/// assert_eq!(log.extensions(), ["cors"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<Call>>>,
}

impl CallLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a call.
    pub fn record(&self, extension: &str, phase: Phase, config: &Value) {
        self.calls.lock().unwrap().push(Call {
            extension: extension.to_string(),
            phase,
            config: config.clone(),
        });
    }

    /// Get a clone of the recorded calls.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Names of the invoked extensions, in call order.
    pub fn extensions(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|call| call.extension.clone())
            .collect()
    }

    /// Get the number of recorded calls.
    pub fn len(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clear all recorded calls.
    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }
}

// ============================================================================
// Recording Extension
// ============================================================================

/// An extension that records every invocation and leaves the context alone.
///
/// Works with any request context type.
#[derive(Debug, Clone)]
pub struct RecordingExtension {
    name: String,
    phases: PhaseSet,
    priority: i32,
    log: CallLog,
}

impl RecordingExtension {
    /// Create a recording extension implementing `phases`.
    pub fn new(name: impl Into<String>, phases: PhaseSet, log: CallLog) -> Self {
        Self {
            name: name.into(),
            phases,
            priority: 0,
            log,
        }
    }

    /// Set the registry priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

impl ExtensionMeta for RecordingExtension {
    fn name(&self) -> &str {
        &self.name
    }

    fn phases(&self) -> PhaseSet {
        self.phases
    }

    fn priority(&self) -> i32 {
        self.priority
    }
}

impl<C: Send> Extension<C> for RecordingExtension {
    async fn run(&self, phase: Phase, _ctx: &mut C, config: &Value) -> Result<(), BoxError> {
        self.log.record(&self.name, phase, config);
        Ok(())
    }
}

// ============================================================================
// Failing Extension
// ============================================================================

/// The error raised by [`FailingExtension`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ExtensionFailure {
    /// Name of the failing extension.
    pub extension: String,
    /// Failure message.
    pub message: String,
}

/// An extension whose handlers always fail with [`ExtensionFailure`].
#[derive(Debug, Clone)]
pub struct FailingExtension {
    name: String,
    phases: PhaseSet,
    message: String,
}

impl FailingExtension {
    /// Create a failing extension implementing `phases`.
    pub fn new(name: impl Into<String>, phases: PhaseSet, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phases,
            message: message.into(),
        }
    }
}

impl ExtensionMeta for FailingExtension {
    fn name(&self) -> &str {
        &self.name
    }

    fn phases(&self) -> PhaseSet {
        self.phases
    }
}

impl<C: Send> Extension<C> for FailingExtension {
    async fn run(&self, _phase: Phase, _ctx: &mut C, _config: &Value) -> Result<(), BoxError> {
        Err(Box::new(ExtensionFailure {
            extension: self.name.clone(),
            message: self.message.clone(),
        }))
    }
}

// ============================================================================
// Static Resolver
// ============================================================================

/// A resolver that answers the same route for every request.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    route: Option<Arc<Route>>,
}

impl StaticResolver {
    /// Always resolve `route`.
    pub fn new(route: Route) -> Self {
        Self {
            route: Some(Arc::new(route)),
        }
    }

    /// Never resolve a route.
    pub fn unmatched() -> Self {
        Self { route: None }
    }
}

impl<C> RouteResolver<C> for StaticResolver {
    fn current_route(&self, _ctx: &C) -> Option<Arc<Route>> {
        self.route.clone()
    }
}
