//! Extension registry query.

use crate::extension::DynExtension;
use std::sync::Arc;

/// The source of installed extensions.
///
/// Queried exactly once, when the orchestrator is constructed. The returned
/// order is the registry-defined discovery order and becomes the dispatch
/// order of the capability index.
pub trait ExtensionRegistry<C>: Send + Sync {
    /// All installed extensions, in discovery order.
    fn extensions(&self) -> Vec<Arc<dyn DynExtension<C>>>;
}

impl<C: 'static> ExtensionRegistry<C> for Vec<Arc<dyn DynExtension<C>>> {
    fn extensions(&self) -> Vec<Arc<dyn DynExtension<C>>> {
        self.clone()
    }
}

impl<C: 'static> ExtensionRegistry<C> for [Arc<dyn DynExtension<C>>] {
    fn extensions(&self) -> Vec<Arc<dyn DynExtension<C>>> {
        self.to_vec()
    }
}
