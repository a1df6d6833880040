//! Page and component providers.
//!
//! A provider turns identifying keys (page class, parameters, instance id,
//! component path) into live objects on demand. Providers never own pages:
//! they hold the identity and a per-request cached handle that `detach`
//! releases, so store eviction stays correct and no page instance is pinned
//! beyond the request that resolved it.

use std::sync::Arc;

use parking_lot::Mutex;

use trellis_core::{Component, ComponentPath, Page, PageClass, PageId, PageParameters, SessionId};

use crate::context::RequestContext;
use crate::error::{ResolveError, ResolveResult};

/// Shared handle to a stored page.
///
/// The mutex serializes component-tree access per page; the session store
/// guarantees at most one request mutates a session's pages at a time.
pub type PageHandle = Arc<Mutex<Page>>;

// =============================================================================
// Page Source
// =============================================================================

/// Resolves page identities to live instances.
///
/// The session page store in `trellis-runtime` is the production
/// implementation; tests substitute in-memory stubs.
pub trait PageSource: Send + Sync {
    /// Looks up a stored page by id.
    ///
    /// Fails with [`ResolveError::PageExpired`] when the id is unknown or
    /// the page has been evicted.
    fn get_page(&self, session: &SessionId, id: PageId) -> ResolveResult<PageHandle>;

    /// Constructs a fresh page from class and parameters.
    ///
    /// Fails with [`ResolveError::UnknownPageClass`] when no constructor is
    /// registered for the class.
    fn new_page(&self, class: &PageClass, parameters: &PageParameters) -> ResolveResult<PageHandle>;

    /// Stores a page in the session, assigning and returning its id.
    fn store_page(&self, session: &SessionId, page: &PageHandle) -> PageId;
}

// =============================================================================
// Page Provider
// =============================================================================

/// Resolves a page instance from either (class + parameters) or a stored
/// instance id.
///
/// Exactly one source is authoritative: when an id is present the store
/// lookup wins; otherwise the page is constructed freshly. The class is
/// always known so URL generation never has to materialize the page.
pub struct PageProvider {
    class: PageClass,
    parameters: PageParameters,
    page_id: Option<PageId>,
    resolved: Mutex<Option<PageHandle>>,
}

impl PageProvider {
    /// Provider for a bookmarkable target: the page will be constructed from
    /// class and parameters when first resolved.
    pub fn bookmarkable(class: PageClass, parameters: PageParameters) -> Self {
        Self {
            class,
            parameters,
            page_id: None,
            resolved: Mutex::new(None),
        }
    }

    /// Provider for a stored page instance.
    pub fn stored(id: PageId, class: PageClass, parameters: PageParameters) -> Self {
        Self {
            class,
            parameters,
            page_id: Some(id),
            resolved: Mutex::new(None),
        }
    }

    /// Provider wrapping an already-materialized page (programmatic
    /// dispatch). The handle is cached as if it had been resolved.
    pub fn of_page(handle: PageHandle) -> Self {
        let (class, parameters, page_id) = {
            let page = handle.lock();
            (page.class().clone(), page.parameters().clone(), page.id())
        };
        Self {
            class,
            parameters,
            page_id,
            resolved: Mutex::new(Some(handle)),
        }
    }

    /// The target page class. Never materializes the page.
    pub fn page_class(&self) -> &PageClass {
        &self.class
    }

    /// The construction parameters; empty if none were given.
    pub fn page_parameters(&self) -> &PageParameters {
        &self.parameters
    }

    /// The stored instance id, if this provider targets one.
    pub fn page_id(&self) -> Option<PageId> {
        self.page_id
    }

    /// Materializes or retrieves the page, caching the handle for the rest
    /// of the request.
    ///
    /// Construction from class + parameters happens at most once per
    /// provider, so re-resolution has no side effects.
    pub fn page(&self, ctx: &RequestContext) -> ResolveResult<PageHandle> {
        let mut resolved = self.resolved.lock();
        if let Some(handle) = resolved.as_ref() {
            return Ok(Arc::clone(handle));
        }

        let handle = match self.page_id {
            Some(id) => ctx.source().get_page(ctx.session(), id)?,
            None => ctx.source().new_page(&self.class, &self.parameters)?,
        };
        *resolved = Some(Arc::clone(&handle));
        Ok(handle)
    }

    /// Releases the cached page handle.
    ///
    /// Idempotent; safe to call multiple times. After detaching, the
    /// provider no longer pins the page instance in memory.
    pub fn detach(&self) {
        *self.resolved.lock() = None;
    }
}

impl std::fmt::Debug for PageProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageProvider")
            .field("class", &self.class)
            .field("page_id", &self.page_id)
            .field("is_resolved", &self.resolved.lock().is_some())
            .finish()
    }
}

// =============================================================================
// Page and Component Provider
// =============================================================================

/// A [`PageProvider`] plus a component path within the resolved page.
#[derive(Debug)]
pub struct PageAndComponentProvider {
    page: PageProvider,
    component_path: ComponentPath,
}

impl PageAndComponentProvider {
    /// Creates a provider addressing `component_path` within the page
    /// resolved by `page`.
    pub fn new(page: PageProvider, component_path: ComponentPath) -> Self {
        Self {
            page,
            component_path,
        }
    }

    /// The underlying page provider.
    pub fn page_provider(&self) -> &PageProvider {
        &self.page
    }

    /// The target page class.
    pub fn page_class(&self) -> &PageClass {
        self.page.page_class()
    }

    /// The construction parameters.
    pub fn page_parameters(&self) -> &PageParameters {
        self.page.page_parameters()
    }

    /// The component path within the page.
    pub fn component_path(&self) -> &ComponentPath {
        &self.component_path
    }

    /// Materializes or retrieves the page.
    pub fn page(&self, ctx: &RequestContext) -> ResolveResult<PageHandle> {
        self.page.page(ctx)
    }

    /// Resolves the component and applies `f` to it under the page lock.
    ///
    /// Fails with [`ResolveError::ComponentNotFound`] when the stored path
    /// no longer matches the tree (stale URL after a tree change).
    pub fn with_component<R>(
        &self,
        ctx: &RequestContext,
        f: impl FnOnce(&Component) -> R,
    ) -> ResolveResult<R> {
        let handle = self.page.page(ctx)?;
        let page = handle.lock();
        let component = page
            .find(&self.component_path)
            .ok_or_else(|| ResolveError::ComponentNotFound {
                path: self.component_path.to_string(),
            })?;
        Ok(f(component))
    }

    /// Releases the cached page handle. Idempotent.
    pub fn detach(&self) {
        self.page.detach();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

    use trellis_core::ComponentKind;

    /// In-memory page source backing provider tests.
    struct TestSource {
        pages: Mutex<HashMap<u64, PageHandle>>,
        next_id: AtomicU64,
        constructed: AtomicUsize,
    }

    impl TestSource {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                pages: Mutex::new(HashMap::new()),
                next_id: AtomicU64::new(1),
                constructed: AtomicUsize::new(0),
            })
        }
    }

    impl PageSource for TestSource {
        fn get_page(&self, _session: &SessionId, id: PageId) -> ResolveResult<PageHandle> {
            self.pages
                .lock()
                .get(&id.value())
                .cloned()
                .ok_or(ResolveError::PageExpired { page: id })
        }

        fn new_page(
            &self,
            class: &PageClass,
            parameters: &PageParameters,
        ) -> ResolveResult<PageHandle> {
            self.constructed.fetch_add(1, Ordering::SeqCst);
            let root = Component::new("root", ComponentKind::container())
                .with(Component::new("form", ComponentKind::form()));
            let page = Page::new(class.clone(), parameters.clone(), root);
            Ok(Arc::new(Mutex::new(page)))
        }

        fn store_page(&self, _session: &SessionId, page: &PageHandle) -> PageId {
            let id = PageId::new(self.next_id.fetch_add(1, Ordering::SeqCst));
            page.lock().assign_id(id);
            self.pages.lock().insert(id.value(), Arc::clone(page));
            id
        }
    }

    fn ctx(source: Arc<TestSource>) -> RequestContext {
        RequestContext::new(SessionId::new("s1"), source, PageParameters::new())
    }

    #[test]
    fn test_bookmarkable_resolution_constructs_once() {
        let source = TestSource::new();
        let ctx = ctx(Arc::clone(&source));
        let provider =
            PageProvider::bookmarkable(PageClass::new("orders"), PageParameters::new());

        let first = provider.page(&ctx).unwrap();
        let second = provider.page(&ctx).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(source.constructed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_stored_lookup_miss_is_page_expired() {
        let source = TestSource::new();
        let ctx = ctx(source);
        let provider = PageProvider::stored(
            PageId::new(42),
            PageClass::new("orders"),
            PageParameters::new(),
        );

        assert!(matches!(
            provider.page(&ctx),
            Err(ResolveError::PageExpired { .. })
        ));
    }

    #[test]
    fn test_detach_is_idempotent() {
        let source = TestSource::new();
        let ctx = ctx(source);
        let provider =
            PageProvider::bookmarkable(PageClass::new("orders"), PageParameters::new());
        provider.page(&ctx).unwrap();

        provider.detach();
        provider.detach();

        // Still resolvable afterwards; a fresh page is constructed.
        assert!(provider.page(&ctx).is_ok());
    }

    #[test]
    fn test_page_class_available_without_materializing() {
        let provider =
            PageProvider::bookmarkable(PageClass::new("orders"), PageParameters::new());
        assert_eq!(provider.page_class().name(), "orders");
    }

    #[test]
    fn test_with_component_resolves_path() {
        let source = TestSource::new();
        let ctx = ctx(source);
        let provider = PageAndComponentProvider::new(
            PageProvider::bookmarkable(PageClass::new("orders"), PageParameters::new()),
            "form".parse().unwrap(),
        );

        let id = provider.with_component(&ctx, |c| c.id().to_string()).unwrap();
        assert_eq!(id, "form");
    }

    #[test]
    fn test_with_component_stale_path_fails() {
        let source = TestSource::new();
        let ctx = ctx(source);
        let provider = PageAndComponentProvider::new(
            PageProvider::bookmarkable(PageClass::new("orders"), PageParameters::new()),
            "gone".parse().unwrap(),
        );

        assert!(matches!(
            provider.with_component(&ctx, |_| ()),
            Err(ResolveError::ComponentNotFound { .. })
        ));
    }

    #[test]
    fn test_of_page_uses_existing_identity() {
        let source = TestSource::new();
        let ctx = ctx(Arc::clone(&source));
        let fresh = source
            .new_page(&PageClass::new("orders"), &PageParameters::new())
            .unwrap();
        source.store_page(&SessionId::new("s1"), &fresh);

        let provider = PageProvider::of_page(Arc::clone(&fresh));
        assert_eq!(provider.page_class().name(), "orders");
        assert!(provider.page_id().is_some());
        assert!(Arc::ptr_eq(&provider.page(&ctx).unwrap(), &fresh));
    }
}
