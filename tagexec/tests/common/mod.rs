#![allow(dead_code)]

use std::{
    collections::BTreeMap,
    fmt,
    sync::{Arc, Mutex},
};
use tagexec::{
    DynExtension, FnResolver, PhaseSet, Route, TagExecutor, resolver_fn,
    testing::{CallLog, RecordingExtension},
};
use tracing::{
    Event, Level, Subscriber,
    field::{Field, Visit},
};
use tracing_subscriber::layer::{Context, Layer};

// ============================================================================
// Request Context
// ============================================================================

#[derive(Debug, Default)]
pub struct RequestCtx {
    pub route: Option<Arc<Route>>,
    pub headers: Vec<(String, String)>,
    pub trail: Vec<String>,
}

impl RequestCtx {
    pub fn for_route(route: Route) -> Self {
        Self {
            route: Some(Arc::new(route)),
            ..Self::default()
        }
    }
}

pub type CtxResolver = FnResolver<fn(&RequestCtx) -> Option<Arc<Route>>>;

fn matched_route(ctx: &RequestCtx) -> Option<Arc<Route>> {
    ctx.route.clone()
}

pub fn ctx_resolver() -> CtxResolver {
    resolver_fn::<RequestCtx, _>(matched_route as fn(&RequestCtx) -> Option<Arc<Route>>)
}

// ============================================================================
// Registries
// ============================================================================

/// `rate-limit{access}`, `transform{access, log}`.
pub fn scenario_registry(log: &CallLog) -> Vec<Arc<dyn DynExtension<RequestCtx>>> {
    vec![
        Arc::new(RecordingExtension::new("rate-limit", PhaseSet::ACCESS, log.clone())),
        Arc::new(RecordingExtension::new(
            "transform",
            PhaseSet::ACCESS | PhaseSet::LOG,
            log.clone(),
        )),
    ]
}

pub fn scenario_executor(log: &CallLog) -> TagExecutor<RequestCtx, CtxResolver> {
    TagExecutor::new(&scenario_registry(log), ctx_resolver())
}

// ============================================================================
// Trace Capture
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct CapturedEvent {
    pub level: Option<Level>,
    pub message: String,
    pub fields: BTreeMap<String, String>,
}

#[derive(Clone, Default)]
pub struct CaptureLayer {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl CaptureLayer {
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.events().into_iter().map(|e| e.message).collect()
    }
}

struct FieldVisitor<'a>(&'a mut CapturedEvent);

impl Visit for FieldVisitor<'_> {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        let rendered = format!("{value:?}");
        if field.name() == "message" {
            self.0.message = rendered;
        } else {
            self.0.fields.insert(field.name().to_string(), rendered);
        }
    }
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut captured = CapturedEvent {
            level: Some(*event.metadata().level()),
            ..CapturedEvent::default()
        };
        event.record(&mut FieldVisitor(&mut captured));
        self.events.lock().unwrap().push(captured);
    }
}
