//! Static registry of installed extensions.
//!
//! This module provides a builder for registering extensions and a frozen
//! registry whose discovery order is fixed at build time.

use std::{cmp::Reverse, sync::Arc};
use tagexec_core::{DynExtension, Extension, ExtensionRegistry};

/// Builder for constructing a [`StaticRegistry`].
///
/// # Example
/// ```ignore
/// let registry = RegistryBuilder::new()
///     .register(RateLimit::default())
///     .register(Transform::default())
///     .build();
/// ```
pub struct RegistryBuilder<C> {
    entries: Vec<Arc<dyn DynExtension<C>>>,
}

impl<C: Send + 'static> RegistryBuilder<C> {
    /// Create a new empty builder.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Register an extension.
    pub fn register<E: Extension<C>>(mut self, extension: E) -> Self {
        self.register_mut(extension);
        self
    }

    /// Register an extension (mutable version).
    pub fn register_mut<E: Extension<C>>(&mut self, extension: E) {
        self.entries.push(Arc::new(extension));
    }

    /// Register an already shared extension.
    pub fn register_shared(mut self, extension: Arc<dyn DynExtension<C>>) -> Self {
        self.entries.push(extension);
        self
    }

    /// Build the immutable registry.
    ///
    /// Entries are ordered by descending [`priority`](tagexec_core::ExtensionMeta::priority);
    /// equal priorities keep registration order.
    pub fn build(mut self) -> StaticRegistry<C> {
        self.entries.sort_by_key(|ext| Reverse(ext.priority()));
        StaticRegistry {
            entries: self.entries,
        }
    }

    /// Get the number of registered extensions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the builder has no extensions.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<C: Send + 'static> Default for RegistryBuilder<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// An immutable, priority-ordered list of extensions.
pub struct StaticRegistry<C> {
    entries: Vec<Arc<dyn DynExtension<C>>>,
}

impl<C: 'static> StaticRegistry<C> {
    /// Iterate extensions in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn DynExtension<C>>> {
        self.entries.iter()
    }

    /// Get the number of registered extensions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<C: 'static> ExtensionRegistry<C> for StaticRegistry<C> {
    fn extensions(&self) -> Vec<Arc<dyn DynExtension<C>>> {
        self.entries.clone()
    }
}
