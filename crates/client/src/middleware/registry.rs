//! Ordered middleware lists.
//!
//! There is one process-wide global [`Registry`], reached through [`global`],
//! and one per connection. Both only ever grow. Every dispatch folds the global
//! entries first and the connection entries second, each in registration order.

use arc_swap::ArcSwap;
use once_cell::sync::Lazy;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::middleware::{Middleware, MiddlewareConfig, MiddlewareDefinition, RequestTransform, ResponseTransform};
use crate::protocol::ConfigurationError;

static GLOBAL: Lazy<ArcSwap<Registry>> = Lazy::new(|| ArcSwap::from_pointee(Registry::new()));

/// Returns a snapshot of the global registry.
///
/// Registrations made after the snapshot is taken are not visible through it.
pub fn global() -> Arc<Registry> {
    GLOBAL.load_full()
}

/// Builds a middleware from its definition and appends it to the global registry
pub fn use_global<D: MiddlewareDefinition>(config: MiddlewareConfig) -> Result<(), ConfigurationError> {
    let entry = MiddlewareEntry::build::<D>(config)?;
    push_global(entry);
    Ok(())
}

/// Appends an already constructed middleware to the global registry
pub fn use_global_instance<M: Middleware>(middleware: M) {
    push_global(MiddlewareEntry::new(Arc::new(middleware)));
}

/// Empties the global registry
pub fn reset_global() {
    GLOBAL.store(Arc::new(Registry::new()));
}

fn push_global(entry: MiddlewareEntry) {
    debug!(middleware = entry.name(), "register global middleware");
    GLOBAL.rcu(|current| {
        let mut next = Registry::clone(current);
        next.push(entry.clone());
        next
    });
}

/// Which phases a middleware takes part in, captured once at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    request: bool,
    response: bool,
}

impl Capabilities {
    pub fn request(&self) -> bool {
        self.request
    }

    pub fn response(&self) -> bool {
        self.response
    }

    pub fn is_empty(&self) -> bool {
        !self.request && !self.response
    }
}

/// A constructed middleware together with its capability flags.
#[derive(Clone)]
pub struct MiddlewareEntry {
    capabilities: Capabilities,
    instance: Arc<dyn Middleware>,
}

impl MiddlewareEntry {
    pub fn new(instance: Arc<dyn Middleware>) -> Self {
        let capabilities = Capabilities {
            request: instance.request_transform().is_some(),
            response: instance.response_transform().is_some(),
        };
        Self { capabilities, instance }
    }

    pub fn build<D: MiddlewareDefinition>(config: MiddlewareConfig) -> Result<Self, ConfigurationError> {
        let instance = D::build(config)?;
        Ok(Self::new(Arc::new(instance)))
    }

    pub fn name(&self) -> &'static str {
        self.instance.name()
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn request_transform(&self) -> Option<&dyn RequestTransform> {
        if self.capabilities.request { self.instance.request_transform() } else { None }
    }

    pub fn response_transform(&self) -> Option<&dyn ResponseTransform> {
        if self.capabilities.response { self.instance.response_transform() } else { None }
    }
}

impl fmt::Debug for MiddlewareEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewareEntry").field("name", &self.name()).field("capabilities", &self.capabilities).finish()
    }
}

/// An append-only, ordered list of [`MiddlewareEntry`].
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: Vec<MiddlewareEntry>,
}

impl Registry {
    pub fn new() -> Self {
        Self { entries: vec![] }
    }

    pub fn push(&mut self, entry: MiddlewareEntry) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MiddlewareEntry> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a Registry {
    type Item = &'a MiddlewareEntry;
    type IntoIter = std::slice::Iter<'a, MiddlewareEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
