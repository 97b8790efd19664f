//! # tagexec-core
//!
//! Core traits and data types for tag-scoped extension execution.
//!
//! This crate has minimal dependencies and is designed to be imported by
//! extensions that only need to declare their phase handlers, without pulling
//! in the capability index or dispatcher from `tagexec-std`.
//!
//! # Building Blocks
//!
//! ## Phases ([`Phase`], [`PhaseSet`])
//!
//! The closed set of request-processing stages the orchestrator can re-enter:
//! `preread`, `access`, `header_filter`, `body_filter` and `log`.
//!
//! ## Extensions ([`Extension`], [`DynExtension`])
//!
//! An installed unit of pipeline logic. Each extension declares its capability
//! table explicitly through [`ExtensionMeta::phases`] and is invoked with a
//! step-specific configuration blob.
//!
//! ## Routes ([`Route`], [`RouteResolver`])
//!
//! The matched routing target and its tag set, resolved by the host pipeline.
//!
//! ## Configuration ([`TagExecutorConfig`], [`Step`], [`PluginOptions`])
//!
//! The per-route execution plan, deserialized with `serde`.
//!
//! # Error Types
//!
//! - [`ConfigError`] - Configuration parsing and validation errors
//! - [`PhaseParseError`] - Unknown phase names

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod config;
mod error;
mod extension;
mod phase;
mod registry;
mod route;

// Re-exports
pub use config::{PluginOptions, Step, TagExecutorConfig};
pub use error::{BoxError, ConfigError, PhaseParseError};
pub use extension::{DynExtension, Extension, ExtensionMeta};
pub use phase::{Phase, PhaseSet};
pub use registry::ExtensionRegistry;
pub use route::{FnResolver, Route, RouteResolver, resolver_fn};

/// Opaque configuration blob handed to an extension.
pub use serde_json::Value;
