//! Component registry and the provider seam used by inference.
//!
//! Lookups take a read lock; registration and the plugin refresh take the
//! write lock, so a completed refresh is visible to every later lookup on any
//! thread.

use crate::docs::component::ComponentSpec;
use crate::docs::kind::{ComponentKind, Status};

use once_cell::sync::Lazy;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Resolves component names to their specs.
pub trait Provider: Send + Sync {
    fn get_docs(&self, name: &str, kind: ComponentKind) -> Option<Arc<ComponentSpec>>;

    /// Make late-registered extension names visible to `get_docs`.
    fn refresh_plugins(&self) {}
}

#[derive(Default)]
pub struct Registry {
    specs: RwLock<HashMap<(ComponentKind, String), Arc<ComponentSpec>>>,
    pending: Mutex<Vec<(String, ComponentKind)>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a component spec.
    pub fn register(&self, spec: ComponentSpec) {
        let key = (spec.kind, spec.name.clone());
        self.specs.write().insert(key, Arc::new(spec));
    }

    /// Queue a name announced by an extension. It becomes visible to lookups
    /// after the next [`Registry::refresh`].
    pub fn register_plugin_name(&self, name: impl Into<String>, kind: ComponentKind) {
        self.pending.lock().push((name.into(), kind));
    }

    /// Drain queued extension names into the registry as experimental plugin
    /// specs. Returns the number of names drained.
    ///
    /// The write lock is held across the drain, so a concurrent caller that
    /// finds the queue empty waits until drained names are visible.
    pub fn refresh(&self) -> usize {
        let mut specs = self.specs.write();
        let drained: Vec<_> = std::mem::take(&mut *self.pending.lock());
        for (name, kind) in &drained {
            debug!(%name, %kind, "registering plugin component");
            let spec = ComponentSpec::new(name.clone(), *kind)
                .status(Status::Experimental)
                .plugin();
            specs.insert((*kind, name.clone()), Arc::new(spec));
        }
        drained.len()
    }

    /// Registered specs of a kind, sorted by name.
    pub fn components(&self, kind: ComponentKind) -> Vec<Arc<ComponentSpec>> {
        let mut out: Vec<_> = self
            .specs
            .read()
            .iter()
            .filter(|((k, _), _)| *k == kind)
            .map(|(_, spec)| spec.clone())
            .collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        out
    }
}

impl Provider for Registry {
    fn get_docs(&self, name: &str, kind: ComponentKind) -> Option<Arc<ComponentSpec>> {
        self.specs.read().get(&(kind, name.to_string())).cloned()
    }

    fn refresh_plugins(&self) {
        self.refresh();
    }
}

static GLOBAL: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    crate::catalog::register_builtins(&registry);
    registry
});

/// The process-wide registry, pre-populated with the built-in catalog.
pub fn global() -> &'static Registry {
    &GLOBAL
}

pub fn register_docs(spec: ComponentSpec) {
    global().register(spec);
}

pub fn get_docs(name: &str, kind: ComponentKind) -> Option<Arc<ComponentSpec>> {
    global().get_docs(name, kind)
}
