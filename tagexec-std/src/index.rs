//! Capability index: which installed extensions implement which phase.
//!
//! Built once per process lifetime, strictly before any request is handled,
//! and read-only afterwards. The index can be shared across request flows via
//! `Arc` without locking.

use std::{
    collections::{HashMap, HashSet},
    fmt,
    sync::Arc,
};
use tagexec_core::{DynExtension, ExtensionMeta, ExtensionRegistry, Phase};

/// The extensions implementing one phase, in discovery order.
struct PhaseEntry<C> {
    extensions: Vec<Arc<dyn DynExtension<C>>>,
    positions: HashMap<String, usize>,
}

impl<C: 'static> PhaseEntry<C> {
    fn collect(phase: Phase, kept: &[Arc<dyn DynExtension<C>>]) -> Self {
        let extensions: Vec<_> = kept
            .iter()
            .filter(|ext| ext.phases().contains_phase(phase))
            .cloned()
            .collect();
        let positions = extensions
            .iter()
            .enumerate()
            .map(|(pos, ext)| (ext.name().to_string(), pos))
            .collect();
        Self {
            extensions,
            positions,
        }
    }
}

/// Immutable mapping from [`Phase`] to the ordered extensions implementing it.
///
/// Every phase has an entry, possibly empty. The orchestrator's own extension
/// never appears in any entry.
///
/// # Example
///
/// ```rust,ignore
/// let index = CapabilityIndex::build(registry.extensions(), "tag-executor");
/// assert_eq!(index.names(Phase::Log), ["transform"]);
/// ```
pub struct CapabilityIndex<C> {
    self_name: String,
    phases: [PhaseEntry<C>; Phase::COUNT],
}

impl<C: 'static> CapabilityIndex<C> {
    /// Partition `extensions` by phase, excluding the one named `self_name`.
    ///
    /// Input order is preserved within every phase. Entries with a blank name,
    /// and any entry whose name was already seen, are dropped with a warning
    /// instead of failing the build.
    pub fn build<I>(extensions: I, self_name: &str) -> Self
    where
        I: IntoIterator<Item = Arc<dyn DynExtension<C>>>,
    {
        let mut seen = HashSet::new();
        let mut kept = Vec::new();

        for ext in extensions {
            let name = ext.name();
            if name.trim().is_empty() {
                warn!("skipping extension without a name");
                continue;
            }
            if name == self_name {
                debug!(extension = %name, "excluding orchestrator from its own index");
                continue;
            }
            if !seen.insert(name.to_string()) {
                warn!(extension = %name, "skipping duplicate extension registration");
                continue;
            }
            kept.push(ext);
        }

        let phases = Phase::ALL.map(|phase| PhaseEntry::collect(phase, &kept));
        let index = Self {
            self_name: self_name.to_string(),
            phases,
        };

        debug!(
            extensions = kept.len(),
            preread = index.len(Phase::Preread),
            access = index.len(Phase::Access),
            header_filter = index.len(Phase::HeaderFilter),
            body_filter = index.len(Phase::BodyFilter),
            log = index.len(Phase::Log),
            "capability index built"
        );
        index
    }

    /// Query `registry` once and build the index from its answer.
    pub fn from_registry<R>(registry: &R, self_name: &str) -> Self
    where
        R: ExtensionRegistry<C> + ?Sized,
    {
        Self::build(registry.extensions(), self_name)
    }

    /// The name excluded at build time.
    pub fn self_name(&self) -> &str {
        &self.self_name
    }

    /// The extensions implementing `phase`, in discovery order.
    pub fn extensions(&self, phase: Phase) -> &[Arc<dyn DynExtension<C>>] {
        &self.phases[phase.index()].extensions
    }

    /// The extension at `position` in the list for `phase`.
    pub fn get(&self, phase: Phase, position: usize) -> Option<&Arc<dyn DynExtension<C>>> {
        self.extensions(phase).get(position)
    }

    /// Names of the extensions implementing `phase`, in discovery order.
    pub fn names(&self, phase: Phase) -> Vec<&str> {
        self.extensions(phase).iter().map(|ext| ext.name()).collect()
    }

    /// Position of `name` in the list for `phase`.
    pub fn position(&self, phase: Phase, name: &str) -> Option<usize> {
        self.phases[phase.index()].positions.get(name).copied()
    }

    /// Whether `name` implements `phase`.
    pub fn contains(&self, phase: Phase, name: &str) -> bool {
        self.position(phase, name).is_some()
    }

    /// Number of extensions implementing `phase`.
    pub fn len(&self, phase: Phase) -> usize {
        self.extensions(phase).len()
    }

    /// Whether no phase has any extension.
    pub fn is_empty(&self) -> bool {
        self.phases.iter().all(|entry| entry.extensions.is_empty())
    }
}

impl<C: 'static> PartialEq for CapabilityIndex<C> {
    fn eq(&self, other: &Self) -> bool {
        self.self_name == other.self_name
            && Phase::ALL
                .into_iter()
                .all(|phase| self.names(phase) == other.names(phase))
    }
}

impl<C: 'static> fmt::Debug for CapabilityIndex<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for phase in Phase::ALL {
            map.entry(&phase.as_str(), &self.names(phase));
        }
        map.finish()
    }
}
