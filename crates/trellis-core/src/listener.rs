//! Listener interfaces: named server-side callback contracts.
//!
//! A [`RequestListenerInterface`] is a typed key, not a live object: it names
//! which callback a URL invokes (click, submit) and carries the metadata the
//! dispatch layer needs, such as whether a live page instance is required.
//! Two instances with the same name are interchangeable.
//!
//! # Registration
//!
//! Built-in interfaces register through a `linkme` distributed slice; the
//! [`ListenerRegistry`] collects them at startup and also accepts dynamic
//! additions:
//!
//! ```rust,ignore
//! use trellis_core::listener::{LISTENER_INTERFACES, RequestListenerInterface};
//!
//! #[linkme::distributed_slice(LISTENER_INTERFACES)]
//! static DOUBLE_CLICK: RequestListenerInterface =
//!     RequestListenerInterface::of_static("double-click", true, true);
//! ```

use std::borrow::Cow;
use std::collections::HashMap;

use linkme::distributed_slice;
use parking_lot::RwLock;
use tracing::warn;

use crate::error::{ListenerError, ListenerResult};

// =============================================================================
// Listener Interface
// =============================================================================

/// An immutable named callback contract.
///
/// Equality and hashing are by name only; the metadata flags describe how the
/// dispatch layer must treat an invocation, not the interface's identity.
#[derive(Clone)]
pub struct RequestListenerInterface {
    name: Cow<'static, str>,
    /// Whether dispatch requires a live (stored) page instance, as opposed to
    /// being able to construct the page freshly from class and parameters.
    requires_page_instance: bool,
    /// Whether a successful invocation responds with a full page render.
    renders_page: bool,
}

impl RequestListenerInterface {
    /// Const constructor for statically registered interfaces.
    pub const fn of_static(
        name: &'static str,
        requires_page_instance: bool,
        renders_page: bool,
    ) -> Self {
        Self {
            name: Cow::Borrowed(name),
            requires_page_instance,
            renders_page,
        }
    }

    /// Creates a dynamically named interface.
    pub fn new(
        name: impl Into<String>,
        requires_page_instance: bool,
        renders_page: bool,
    ) -> Self {
        Self {
            name: Cow::Owned(name.into()),
            requires_page_instance,
            renders_page,
        }
    }

    /// The interface name (e.g. `"click"`).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether dispatch requires a live page instance.
    pub fn requires_page_instance(&self) -> bool {
        self.requires_page_instance
    }

    /// Whether a successful invocation responds with a full page render.
    pub fn renders_page(&self) -> bool {
        self.renders_page
    }
}

impl PartialEq for RequestListenerInterface {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for RequestListenerInterface {}

impl std::hash::Hash for RequestListenerInterface {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl std::fmt::Debug for RequestListenerInterface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestListenerInterface")
            .field("name", &self.name)
            .field("requires_page_instance", &self.requires_page_instance)
            .field("renders_page", &self.renders_page)
            .finish()
    }
}

impl std::fmt::Display for RequestListenerInterface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

// =============================================================================
// Built-in Interface Registry (linkme distributed slice)
// =============================================================================

/// Registry of statically contributed listener interfaces.
///
/// Each crate that defines a listener interface contributes one entry.
#[distributed_slice]
pub static LISTENER_INTERFACES: [RequestListenerInterface];

/// The click listener: invoked on a component (typically a link) and
/// responded to with a full page render.
#[distributed_slice(LISTENER_INTERFACES)]
pub static CLICK: RequestListenerInterface =
    RequestListenerInterface::of_static("click", true, true);

/// The submit listener: invoked on a form-bound component or behavior; AJAX
/// submissions respond with a partial update rather than a page render.
#[distributed_slice(LISTENER_INTERFACES)]
pub static SUBMIT: RequestListenerInterface =
    RequestListenerInterface::of_static("submit", false, false);

// =============================================================================
// Listener Registry
// =============================================================================

/// Lookup table of known listener interfaces.
///
/// URL decoding validates listener names against this registry, so a forged
/// or stale URL naming an unknown interface is rejected before any page is
/// touched.
pub struct ListenerRegistry {
    inner: RwLock<HashMap<String, RequestListenerInterface>>,
}

impl ListenerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }

    /// Builds a registry from all statically contributed interfaces.
    ///
    /// Duplicate names are reported with a warning; the first entry wins.
    pub fn collect_all() -> Self {
        let registry = Self::new();
        {
            let mut inner = registry.inner.write();
            for interface in LISTENER_INTERFACES.iter() {
                if inner.contains_key(interface.name()) {
                    warn!(
                        listener = interface.name(),
                        "Duplicate listener interface registered, keeping first"
                    );
                    continue;
                }
                inner.insert(interface.name().to_string(), interface.clone());
            }
        }
        registry
    }

    /// Registers a dynamic interface.
    pub fn register(&self, interface: RequestListenerInterface) -> ListenerResult<()> {
        let mut inner = self.inner.write();
        if inner.contains_key(interface.name()) {
            return Err(ListenerError::Duplicate {
                name: interface.name().to_string(),
            });
        }
        inner.insert(interface.name().to_string(), interface);
        Ok(())
    }

    /// Looks up an interface by name.
    pub fn lookup(&self, name: &str) -> ListenerResult<RequestListenerInterface> {
        self.inner
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| ListenerError::Unknown {
                name: name.to_string(),
            })
    }

    /// Number of registered interfaces.
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Returns `true` when no interfaces are registered.
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

impl Default for ListenerRegistry {
    fn default() -> Self {
        Self::collect_all()
    }
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("len", &self.len())
            .finish()
    }
}
