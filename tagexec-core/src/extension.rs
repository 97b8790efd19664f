//! # Extension Layer
//!
//! An extension is an installed unit of pipeline logic, identified by a unique
//! name. It exposes zero or more phase handlers and declares which ones through
//! an explicit capability table ([`ExtensionMeta::phases`]). The capability
//! index reads this declaration once; nothing is probed at request time.
//!
//! # Static vs Dynamic Dispatch
//!
//! [`Extension`] uses native `async fn` in traits for zero-cost static
//! dispatch. The capability index stores extensions as trait objects, so every
//! `Extension` is also a [`DynExtension`] through a blanket implementation.
//!
//! # Configuration
//!
//! The `config` blob passed to [`Extension::run`] is the one attached to the
//! step being executed, never the extension's globally configured settings.

use crate::{
    error::BoxError,
    phase::{Phase, PhaseSet},
};
use serde_json::Value;
use std::{future::Future, pin::Pin, sync::Arc};

/// Identity and capability table of an extension.
///
/// Object-safe and independent of the request context type, so it is shared by
/// [`Extension`] and [`DynExtension`].
pub trait ExtensionMeta: Send + Sync + 'static {
    /// The unique name the extension is registered under.
    fn name(&self) -> &str;

    /// The phases this extension implements a handler for.
    fn phases(&self) -> PhaseSet;

    /// Registry ordering hint. Higher values are discovered first.
    fn priority(&self) -> i32 {
        0
    }
}

/// An extension whose phase handlers operate on the request context `C`.
///
/// `run` is only ever called with a phase contained in
/// [`phases`](ExtensionMeta::phases).
///
/// # Example
///
/// ```rust,ignore
/// struct RateLimit;
///
/// impl ExtensionMeta for RateLimit {
///     fn name(&self) -> &str { "rate-limit" }
///     fn phases(&self) -> PhaseSet { PhaseSet::ACCESS }
/// }
///
/// impl Extension<RequestCtx> for RateLimit {
///     async fn run(&self, _phase: Phase, ctx: &mut RequestCtx, config: &Value) -> Result<(), BoxError> {
///         ctx.limit = config["limit"].as_u64();
///         Ok(())
///     }
/// }
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not an extension over context `{C}`",
    label = "missing `Extension<{C}>` implementation",
    note = "Implement `ExtensionMeta` and `Extension<{C}>`, or annotate the impl block with `#[tagexec::extension]`."
)]
pub trait Extension<C: Send>: ExtensionMeta {
    /// Run the handler for `phase` with the step-scoped `config`.
    fn run(
        &self,
        phase: Phase,
        ctx: &mut C,
        config: &Value,
    ) -> impl Future<Output = Result<(), BoxError>> + Send;
}

/// Dynamic object-safe version of [`Extension`].
///
/// Use this trait when you need runtime polymorphism (e.g., in a registry or
/// the capability index).
pub trait DynExtension<C>: ExtensionMeta {
    /// Run the handler for `phase` (dynamic dispatch version).
    fn run_dyn<'a>(
        &'a self,
        phase: Phase,
        ctx: &'a mut C,
        config: &'a Value,
    ) -> Pin<Box<dyn Future<Output = Result<(), BoxError>> + Send + 'a>>;
}

// Blanket implementation: any Extension is a DynExtension.
impl<C: Send, T: Extension<C>> DynExtension<C> for T {
    fn run_dyn<'a>(
        &'a self,
        phase: Phase,
        ctx: &'a mut C,
        config: &'a Value,
    ) -> Pin<Box<dyn Future<Output = Result<(), BoxError>> + Send + 'a>> {
        Box::pin(self.run(phase, ctx, config))
    }
}

impl<C: 'static> ExtensionMeta for Arc<dyn DynExtension<C>> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn phases(&self) -> PhaseSet {
        (**self).phases()
    }

    fn priority(&self) -> i32 {
        (**self).priority()
    }
}

// Allow a shared trait object to be used where Extension is expected.
impl<C: Send + 'static> Extension<C> for Arc<dyn DynExtension<C>> {
    async fn run(&self, phase: Phase, ctx: &mut C, config: &Value) -> Result<(), BoxError> {
        (**self).run_dyn(phase, ctx, config).await
    }
}
