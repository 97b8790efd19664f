//! The orchestrator as the host pipeline sees it.

use std::fmt;
use tagexec_core::{
    BoxError, Extension, ExtensionMeta, ExtensionRegistry, Phase, PhaseSet, RouteResolver,
    TagExecutorConfig, Value,
};
use tagexec_std::{CapabilityIndex, PhaseDispatcher};

/// The name the orchestrator registers under unless told otherwise.
pub const DEFAULT_NAME: &str = "tag-executor";

/// Re-invokes installed extensions for tagged routes with step-scoped configs.
///
/// Constructed once at process start: construction queries the registry a
/// single time and freezes the capability index. Afterwards the executor is
/// read-only and can be shared across request flows.
///
/// # Example
///
/// ```rust,ignore
/// let executor = TagExecutorBuilder::new(resolver_fn(|ctx: &RequestCtx| ctx.route.clone()))
///     .build(&registry);
///
/// // In the host's access phase:
/// executor.access(&route_conf, &mut ctx).await?;
/// ```
pub struct TagExecutor<C, R> {
    name: String,
    priority: i32,
    index: CapabilityIndex<C>,
    resolver: R,
    dispatcher: PhaseDispatcher,
}

impl<C, R> TagExecutor<C, R>
where
    C: Send + 'static,
    R: RouteResolver<C>,
{
    /// Build an executor named [`DEFAULT_NAME`] from `registry`.
    pub fn new<G>(registry: &G, resolver: R) -> Self
    where
        G: ExtensionRegistry<C> + ?Sized,
    {
        TagExecutorBuilder::new(resolver).build(registry)
    }

    /// The name excluded from the capability index.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The capability index built at construction.
    pub fn index(&self) -> &CapabilityIndex<C> {
        &self.index
    }

    /// Entry point for the `preread` phase.
    pub async fn preread(&self, conf: &TagExecutorConfig, ctx: &mut C) -> Result<(), BoxError> {
        self.run_phase(Phase::Preread, conf, ctx).await
    }

    /// Entry point for the `access` phase.
    pub async fn access(&self, conf: &TagExecutorConfig, ctx: &mut C) -> Result<(), BoxError> {
        self.run_phase(Phase::Access, conf, ctx).await
    }

    /// Entry point for the `header_filter` phase.
    pub async fn header_filter(
        &self,
        conf: &TagExecutorConfig,
        ctx: &mut C,
    ) -> Result<(), BoxError> {
        self.run_phase(Phase::HeaderFilter, conf, ctx).await
    }

    /// Entry point for the `body_filter` phase.
    pub async fn body_filter(
        &self,
        conf: &TagExecutorConfig,
        ctx: &mut C,
    ) -> Result<(), BoxError> {
        self.run_phase(Phase::BodyFilter, conf, ctx).await
    }

    /// Entry point for the `log` phase.
    pub async fn log(&self, conf: &TagExecutorConfig, ctx: &mut C) -> Result<(), BoxError> {
        self.run_phase(Phase::Log, conf, ctx).await
    }

    /// Resolve the current route and dispatch `phase` through `conf`.
    ///
    /// A request without a matched route dispatches nothing.
    pub async fn run_phase(
        &self,
        phase: Phase,
        conf: &TagExecutorConfig,
        ctx: &mut C,
    ) -> Result<(), BoxError> {
        let Some(route) = self.resolver.current_route(ctx) else {
            #[cfg(feature = "tracing")]
            tracing::debug!(phase = %phase, "no matched route, nothing to execute");
            return Ok(());
        };

        self.dispatcher
            .dispatch(phase, &self.index, conf.steps(), &route, ctx)
            .await
    }
}

impl<C: 'static, R> fmt::Debug for TagExecutor<C, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TagExecutor")
            .field("name", &self.name)
            .field("priority", &self.priority)
            .field("index", &self.index)
            .finish_non_exhaustive()
    }
}

// The executor is itself an extension, so a host that drives every installed
// extension through `Extension::run` can install it like any other. The config
// it receives is the route's plan.
impl<C, R> ExtensionMeta for TagExecutor<C, R>
where
    C: Send + 'static,
    R: RouteResolver<C> + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn phases(&self) -> PhaseSet {
        PhaseSet::all()
    }

    fn priority(&self) -> i32 {
        self.priority
    }
}

impl<C, R> Extension<C> for TagExecutor<C, R>
where
    C: Send + 'static,
    R: RouteResolver<C> + 'static,
{
    async fn run(&self, phase: Phase, ctx: &mut C, config: &Value) -> Result<(), BoxError> {
        let conf = TagExecutorConfig::from_value(config.clone())?;
        self.run_phase(phase, &conf, ctx).await
    }
}

/// Builder for [`TagExecutor`].
pub struct TagExecutorBuilder<R> {
    name: String,
    priority: i32,
    resolver: R,
}

impl<R> TagExecutorBuilder<R> {
    /// Start configuring an executor that resolves routes with `resolver`.
    pub fn new(resolver: R) -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            priority: 0,
            resolver,
        }
    }

    /// Register under `name` instead of [`DEFAULT_NAME`].
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Registry priority reported when the executor is installed as an extension.
    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Query `registry` once and freeze the capability index.
    pub fn build<C, G>(self, registry: &G) -> TagExecutor<C, R>
    where
        C: Send + 'static,
        R: RouteResolver<C>,
        G: ExtensionRegistry<C> + ?Sized,
    {
        let index = CapabilityIndex::from_registry(registry, &self.name);
        TagExecutor {
            name: self.name,
            priority: self.priority,
            index,
            resolver: self.resolver,
            dispatcher: PhaseDispatcher::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tagexec_core::{DynExtension, Route, Step};
    use tagexec_std::testing::{CallLog, RecordingExtension, StaticResolver};

    fn registry(log: &CallLog) -> Vec<Arc<dyn DynExtension<()>>> {
        vec![
            Arc::new(RecordingExtension::new(DEFAULT_NAME, PhaseSet::all(), log.clone())),
            Arc::new(RecordingExtension::new("cors", PhaseSet::ACCESS, log.clone())),
        ]
    }

    #[test]
    fn test_construction_excludes_self() {
        let log = CallLog::new();
        let executor = TagExecutor::new(&registry(&log), StaticResolver::unmatched());

        assert_eq!(executor.name(), DEFAULT_NAME);
        assert_eq!(executor.index().names(Phase::Access), ["cors"]);
        assert!(executor.index().names(Phase::Log).is_empty());
    }

    #[test]
    fn test_custom_name_is_excluded() {
        let log = CallLog::new();
        let executor = TagExecutorBuilder::new(StaticResolver::unmatched())
            .name("cors")
            .build(&registry(&log));

        assert_eq!(executor.index().names(Phase::Access), [DEFAULT_NAME]);
    }

    #[tokio::test]
    async fn test_unmatched_route_is_noop() {
        let log = CallLog::new();
        let executor = TagExecutor::new(&registry(&log), StaticResolver::unmatched());
        let conf = TagExecutorConfig::new([Step::new("s1").with_plugin("cors", Value::Null)]);

        executor.access(&conf, &mut ()).await.unwrap();
        assert!(log.is_empty());
    }

    #[tokio::test]
    async fn test_entry_points_map_to_phases() {
        let log = CallLog::new();
        let list: Vec<Arc<dyn DynExtension<()>>> = vec![Arc::new(RecordingExtension::new(
            "all",
            PhaseSet::all(),
            log.clone(),
        ))];
        let executor = TagExecutor::new(&list, StaticResolver::new(Route::new("r")));
        let conf = TagExecutorConfig::new([Step::new("s1").with_plugin("all", Value::Null)]);
        let ctx = &mut ();

        executor.preread(&conf, ctx).await.unwrap();
        executor.access(&conf, ctx).await.unwrap();
        executor.header_filter(&conf, ctx).await.unwrap();
        executor.body_filter(&conf, ctx).await.unwrap();
        executor.log(&conf, ctx).await.unwrap();

        let phases: Vec<_> = log.calls().into_iter().map(|call| call.phase).collect();
        assert_eq!(phases, Phase::ALL);
    }
}
