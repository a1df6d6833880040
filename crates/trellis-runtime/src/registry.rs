//! Page class registry.
//!
//! Maps registered page class names to constructor functions. A page class
//! plus parameters fully determines a fresh page, which is the foundation of
//! bookmarkable URLs: the mapper only ever needs the name, and the store
//! reaches for the constructor when a URL has to materialize the page.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, warn};

use trellis_core::{Page, PageClass, PageParameters};
use trellis_framework::{ResolveError, ResolveResult};

/// Constructor function building a fresh page from its parameters.
pub type PageConstructor = Arc<dyn Fn(&PageParameters) -> Page + Send + Sync>;

/// Registry of page classes known to the application.
pub struct PageClassRegistry {
    inner: RwLock<HashMap<String, PageConstructor>>,
}

impl PageClassRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }

    /// Registers a page constructor under `name`, returning the class token.
    ///
    /// Re-registering a name replaces the previous constructor with a
    /// warning.
    pub fn register(
        &self,
        name: impl Into<String>,
        constructor: impl Fn(&PageParameters) -> Page + Send + Sync + 'static,
    ) -> PageClass {
        let name = name.into();
        let mut inner = self.inner.write();
        if inner
            .insert(name.clone(), Arc::new(constructor))
            .is_some()
        {
            warn!(class = %name, "Replaced existing page class registration");
        } else {
            debug!(class = %name, "Registered page class");
        }
        PageClass::new(name)
    }

    /// Whether a constructor is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.inner.read().contains_key(name)
    }

    /// Constructs a fresh page of `class` from `parameters`.
    pub fn construct(&self, class: &PageClass, parameters: &PageParameters) -> ResolveResult<Page> {
        let constructor = self
            .inner
            .read()
            .get(class.name())
            .cloned()
            .ok_or_else(|| ResolveError::UnknownPageClass {
                class: class.name().to_string(),
            })?;
        Ok(constructor(parameters))
    }

    /// Number of registered classes.
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Returns `true` when no classes are registered.
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

impl Default for PageClassRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PageClassRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageClassRegistry")
            .field("len", &self.len())
            .finish()
    }
}
