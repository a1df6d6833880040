//! Page model: stateful, versioned component-tree roots.

use serde::{Deserialize, Serialize};

use crate::foundation::component::{Component, ComponentPath};
use crate::foundation::parameters::PageParameters;

// ============================================================================
// Identity Types
// ============================================================================

/// Identifies a page type by its registered name.
///
/// A page class plus construction parameters is enough to rebuild the page
/// from scratch, which is what makes a URL bookmarkable: no live instance is
/// needed to address it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageClass(String);

impl PageClass {
    /// Creates a page class from its registered name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The registered name.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PageClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Runtime instance id of a stored page, assigned by the session store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageId(u64);

impl PageId {
    /// Wraps a raw id value.
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// The raw id value.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for PageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque session identifier keying the per-session page store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Wraps a session token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw session token.
    pub fn token(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Page
// ============================================================================

/// A stateful page: a component tree plus the identity needed to address it
/// across requests.
///
/// A freshly constructed page has no [`PageId`]; the session store assigns
/// one when the page is first stored. The render version increases whenever
/// a listener invocation mutates the tree, so stale URLs from back-button
/// navigation can be told apart from current ones.
#[derive(Debug)]
pub struct Page {
    class: PageClass,
    id: Option<PageId>,
    parameters: PageParameters,
    root: Component,
    version: u64,
}

impl Page {
    /// Creates a page from its class, construction parameters, and root
    /// component.
    pub fn new(class: PageClass, parameters: PageParameters, root: Component) -> Self {
        Self {
            class,
            id: None,
            parameters,
            root,
            version: 0,
        }
    }

    /// The page class.
    pub fn class(&self) -> &PageClass {
        &self.class
    }

    /// The store-assigned instance id, or `None` before first storage.
    pub fn id(&self) -> Option<PageId> {
        self.id
    }

    /// Assigns the instance id. Called by the session store exactly once.
    pub fn assign_id(&mut self, id: PageId) {
        self.id = Some(id);
    }

    /// The construction parameters.
    pub fn parameters(&self) -> &PageParameters {
        &self.parameters
    }

    /// The root component.
    pub fn root(&self) -> &Component {
        &self.root
    }

    /// Mutable access to the root component.
    pub fn root_mut(&mut self) -> &mut Component {
        &mut self.root
    }

    /// The current render version.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Bumps the render version after a state-mutating round trip.
    pub fn bump_version(&mut self) {
        self.version += 1;
    }

    /// Resolves the component at `path`, relative to the root.
    pub fn find(&self, path: &ComponentPath) -> Option<&Component> {
        self.root.find(path)
    }

    /// Mutable variant of [`find`](Self::find).
    pub fn find_mut(&mut self, path: &ComponentPath) -> Option<&mut Component> {
        self.root.find_mut(path)
    }

    /// Finds the nearest ancestor form of the component at `path`.
    ///
    /// The component itself is not considered; the search walks strictly
    /// upward toward the root.
    pub fn nearest_form(&self, path: &ComponentPath) -> Option<ComponentPath> {
        let mut current = path.parent()?;
        loop {
            if self.find(&current).is_some_and(Component::is_form) {
                return Some(current);
            }
            current = current.parent()?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::component::{ButtonState, ComponentKind};

    fn page() -> Page {
        let root = Component::new("root", ComponentKind::container()).with(
            Component::new("form", ComponentKind::form()).with(
                Component::new("row", ComponentKind::container()).with(Component::new(
                    "go",
                    ComponentKind::submit_button(ButtonState::new()),
                )),
            ),
        );
        Page::new(PageClass::new("orders"), PageParameters::new(), root)
    }

    #[test]
    fn test_nearest_form_skips_intermediate_containers() {
        let page = page();
        let button: ComponentPath = "form/row/go".parse().unwrap();

        let form = page.nearest_form(&button).unwrap();
        assert_eq!(form.to_string(), "form");
    }

    #[test]
    fn test_nearest_form_is_none_outside_a_form() {
        let page = page();
        let path: ComponentPath = "form".parse().unwrap();
        assert!(page.nearest_form(&path).is_none());
    }

    #[test]
    fn test_fresh_page_has_no_id_and_version_zero() {
        let mut page = page();
        assert_eq!(page.id(), None);
        assert_eq!(page.version(), 0);

        page.assign_id(PageId::new(7));
        page.bump_version();
        assert_eq!(page.id(), Some(PageId::new(7)));
        assert_eq!(page.version(), 1);
    }
}
