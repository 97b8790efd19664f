//! # tagexec - Tag-Scoped Extension Execution
//!
//! `tagexec` lets an operator attach a sequence of tag-scoped execution steps
//! to a route. Each step re-invokes other installed extensions at specific
//! request-processing phases, only for routes carrying the step's tag, and
//! only with the step's own configuration.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tagexec::{RegistryBuilder, TagExecutor, TagExecutorConfig, resolver_fn};
//!
//! struct RateLimit;
//!
//! #[tagexec::extension(name = "rate-limit", priority = 1001)]
//! impl RateLimit {
//!     async fn access(&self, ctx: &mut RequestCtx, config: &Value) -> Result<(), BoxError> {
//!         ctx.limit = config["limit"].as_u64();
//!         Ok(())
//!     }
//! }
//!
//! // Once, at process start.
//! let registry = RegistryBuilder::new().register(RateLimit).build();
//! let executor = TagExecutor::new(&registry, resolver_fn(|ctx: &RequestCtx| ctx.route.clone()));
//!
//! // Per request, per phase.
//! let conf = TagExecutorConfig::from_json(route_plugin_conf)?;
//! executor.access(&conf, &mut ctx).await?;
//! ```

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod executor;

pub use executor::{DEFAULT_NAME, TagExecutor, TagExecutorBuilder};

pub use tagexec_core::{
    // Errors
    BoxError,
    ConfigError,
    // Extensions
    DynExtension,
    Extension,
    ExtensionMeta,
    ExtensionRegistry,
    // Routes
    FnResolver,
    // Phases
    Phase,
    PhaseParseError,
    PhaseSet,
    // Configuration
    PluginOptions,
    Route,
    RouteResolver,
    Step,
    TagExecutorConfig,
    Value,
    resolver_fn,
};

pub use tagexec_std::{CapabilityIndex, PhaseDispatcher, RegistryBuilder, StaticRegistry};

/// Testing utilities.
pub mod testing {
    #![allow(clippy::wildcard_imports)]
    pub use tagexec_std::testing::*;
}

/// Prelude module - common imports for tagexec.
///
/// # Usage
///
/// ```rust,ignore
/// use tagexec::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        BoxError, Extension, ExtensionMeta, Phase, PhaseSet, RegistryBuilder, Route,
        RouteResolver, TagExecutor, TagExecutorConfig, Value, resolver_fn,
    };
}

#[cfg(feature = "macros")]
pub use tagexec_macros::extension;
