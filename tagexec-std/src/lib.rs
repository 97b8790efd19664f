//! # tagexec-std
//!
//! Standard implementations for tag-scoped extension execution.
//!
//! This crate provides:
//! - **Discovery**: [`CapabilityIndex`], built once from the installed extensions
//! - **Dispatch**: [`PhaseDispatcher`], the per-request, per-phase step interpreter
//! - **Registries**: [`StaticRegistry`] and its [`RegistryBuilder`]
//! - **Testing**: recording extensions and fixed resolvers in [`testing`]

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core traits
pub use tagexec_core;

#[macro_use]
mod log;

// Modules
pub mod dispatch;
pub mod index;
pub mod registry;
pub mod testing;

pub use dispatch::PhaseDispatcher;
pub use index::CapabilityIndex;
pub use registry::{RegistryBuilder, StaticRegistry};
