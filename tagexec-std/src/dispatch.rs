//! Phase dispatcher: the per-request, per-phase step interpreter.

use crate::index::CapabilityIndex;
use tagexec_core::{BoxError, ExtensionMeta, Phase, PluginOptions, Route, Step};

/// Walks an execution plan for one phase and invokes the matching extensions.
///
/// The dispatcher holds no state; every call is a function of its phase,
/// index, steps and route alone.
///
/// # Ordering
///
/// - Steps run in declaration order.
/// - Within a step, extensions run in capability-index order, not in the
///   order the step lists them.
/// - A (step, extension, phase) triple is invoked at most once; when a step
///   names the same extension twice the first entry wins.
///
/// # Errors
///
/// The first handler error is returned as-is and ends the dispatch: no later
/// extension of the same step and no later step runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhaseDispatcher;

impl PhaseDispatcher {
    /// Create a dispatcher.
    pub const fn new() -> Self {
        Self
    }

    /// Dispatch `phase` for `route` through `steps`.
    pub async fn dispatch<C: Send + 'static>(
        &self,
        phase: Phase,
        index: &CapabilityIndex<C>,
        steps: &[Step],
        route: &Route,
        ctx: &mut C,
    ) -> Result<(), BoxError> {
        for step in steps {
            if !step.is_active(route) {
                debug!(
                    phase = %phase,
                    step = %step.name,
                    route = %route.name,
                    "tag not matched, skipping step"
                );
                continue;
            }

            debug!(
                phase = %phase,
                step = %step.name,
                route = %route.name,
                "entering step"
            );

            for (position, options) in matched(index, phase, step) {
                let Some(ext) = index.get(phase, position) else {
                    continue;
                };
                debug!(
                    phase = %phase,
                    step = %step.name,
                    extension = %ext.name(),
                    route = %route.name,
                    "running extension"
                );
                (**ext).run_dyn(phase, ctx, &options.config).await?;
            }
        }
        Ok(())
    }
}

/// The step's entries that implement `phase`, keyed by index position and
/// sorted by it. Later duplicates of a name are dropped.
fn matched<'s, C: 'static>(
    index: &CapabilityIndex<C>,
    phase: Phase,
    step: &'s Step,
) -> Vec<(usize, &'s PluginOptions)> {
    let mut matched: Vec<_> = step
        .plugins
        .iter()
        .filter_map(|options| {
            index
                .position(phase, &options.name)
                .map(|position| (position, options))
        })
        .collect();
    // Stable sort keeps declaration order among equal positions, so dedup
    // retains the first entry.
    matched.sort_by_key(|(position, _)| *position);
    matched.dedup_by_key(|(position, _)| *position);
    matched
}
