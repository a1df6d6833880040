//! Session page store.
//!
//! Stores stateful page instances per session with count-bounded LRU
//! eviction. This is the production [`PageSource`]: providers look pages up
//! here by id and construct fresh ones through the page class registry.
//!
//! # Concurrency
//!
//! Each session's page list sits behind its own lock, so concurrent requests
//! from different sessions resolve in parallel while requests within one
//! session serialize. That discipline keeps a page's component tree from
//! being mutated concurrently during AJAX partial updates.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Mutex, RwLock};
use tracing::{debug, trace};

use trellis_core::{PageClass, PageId, PageParameters, SessionId};
use trellis_framework::{PageHandle, PageSource, ResolveError, ResolveResult};

use crate::registry::PageClassRegistry;

/// One session's stored pages in least-recently-used order (front oldest).
#[derive(Default)]
struct SessionPages {
    pages: Mutex<Vec<(PageId, PageHandle)>>,
}

/// Count-bounded, per-session LRU page store.
pub struct SessionPageStore {
    registry: Arc<PageClassRegistry>,
    sessions: RwLock<HashMap<String, Arc<SessionPages>>>,
    capacity: usize,
    next_id: AtomicU64,
}

impl SessionPageStore {
    /// Creates a store constructing pages through `registry`, keeping at
    /// most `capacity` pages per session.
    pub fn new(registry: Arc<PageClassRegistry>, capacity: usize) -> Self {
        Self {
            registry,
            sessions: RwLock::new(HashMap::new()),
            capacity: capacity.max(1),
            next_id: AtomicU64::new(1),
        }
    }

    /// The maximum number of pages kept per session.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of pages currently stored for `session`.
    pub fn page_count(&self, session: &SessionId) -> usize {
        self.sessions
            .read()
            .get(session.token())
            .map_or(0, |pages| pages.pages.lock().len())
    }

    /// Drops all pages of `session`.
    pub fn clear_session(&self, session: &SessionId) {
        self.sessions.write().remove(session.token());
    }

    fn session(&self, session: &SessionId) -> Arc<SessionPages> {
        if let Some(pages) = self.sessions.read().get(session.token()) {
            return Arc::clone(pages);
        }
        let mut sessions = self.sessions.write();
        Arc::clone(sessions.entry(session.token().to_string()).or_default())
    }
}

impl PageSource for SessionPageStore {
    fn get_page(&self, session: &SessionId, id: PageId) -> ResolveResult<PageHandle> {
        let pages = self.session(session);
        let mut pages = pages.pages.lock();

        match pages.iter().position(|(stored, _)| *stored == id) {
            Some(index) => {
                // LRU touch: move to the back.
                let entry = pages.remove(index);
                let handle = Arc::clone(&entry.1);
                pages.push(entry);
                trace!(session = %session, page = %id, "Page store hit");
                Ok(handle)
            }
            None => {
                debug!(session = %session, page = %id, "Page store miss");
                Err(ResolveError::PageExpired { page: id })
            }
        }
    }

    fn new_page(&self, class: &PageClass, parameters: &PageParameters) -> ResolveResult<PageHandle> {
        let page = self.registry.construct(class, parameters)?;
        Ok(Arc::new(Mutex::new(page)))
    }

    fn store_page(&self, session: &SessionId, page: &PageHandle) -> PageId {
        let id = PageId::new(self.next_id.fetch_add(1, Ordering::SeqCst));
        page.lock().assign_id(id);

        let pages = self.session(session);
        let mut pages = pages.pages.lock();
        pages.push((id, Arc::clone(page)));

        while pages.len() > self.capacity {
            let (evicted, _) = pages.remove(0);
            debug!(session = %session, page = %evicted, "Evicted least recently used page");
        }
        id
    }
}

impl std::fmt::Debug for SessionPageStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionPageStore")
            .field("capacity", &self.capacity)
            .field("sessions", &self.sessions.read().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_core::{Component, ComponentKind, Page};

    fn store(capacity: usize) -> SessionPageStore {
        let registry = Arc::new(PageClassRegistry::new());
        registry.register("home", |params: &PageParameters| {
            Page::new(
                PageClass::new("home"),
                params.clone(),
                Component::new("root", ComponentKind::container()),
            )
        });
        SessionPageStore::new(registry, capacity)
    }

    fn fresh(store: &SessionPageStore) -> PageHandle {
        store
            .new_page(&PageClass::new("home"), &PageParameters::new())
            .unwrap()
    }

    #[test]
    fn test_store_assigns_monotonic_ids() {
        let store = store(8);
        let session = SessionId::new("s1");

        let a = store.store_page(&session, &fresh(&store));
        let b = store.store_page(&session, &fresh(&store));

        assert!(b.value() > a.value());
    }

    #[test]
    fn test_lookup_returns_stored_handle() {
        let store = store(8);
        let session = SessionId::new("s1");
        let handle = fresh(&store);
        let id = store.store_page(&session, &handle);

        let looked_up = store.get_page(&session, id).unwrap();
        assert!(Arc::ptr_eq(&handle, &looked_up));
    }

    #[test]
    fn test_eviction_produces_page_expired() {
        let store = store(2);
        let session = SessionId::new("s1");

        let first = store.store_page(&session, &fresh(&store));
        store.store_page(&session, &fresh(&store));
        store.store_page(&session, &fresh(&store));

        assert_eq!(store.page_count(&session), 2);
        assert!(matches!(
            store.get_page(&session, first),
            Err(ResolveError::PageExpired { .. })
        ));
    }

    #[test]
    fn test_lookup_refreshes_lru_position() {
        let store = store(2);
        let session = SessionId::new("s1");

        let first = store.store_page(&session, &fresh(&store));
        let second = store.store_page(&session, &fresh(&store));

        // Touch the older page, then overflow: the untouched one goes.
        store.get_page(&session, first).unwrap();
        store.store_page(&session, &fresh(&store));

        assert!(store.get_page(&session, first).is_ok());
        assert!(matches!(
            store.get_page(&session, second),
            Err(ResolveError::PageExpired { .. })
        ));
    }

    #[test]
    fn test_sessions_are_isolated() {
        let store = store(2);
        let id = store.store_page(&SessionId::new("s1"), &fresh(&store));

        assert!(matches!(
            store.get_page(&SessionId::new("s2"), id),
            Err(ResolveError::PageExpired { .. })
        ));
        assert_eq!(store.page_count(&SessionId::new("s2")), 0);
    }

    #[test]
    fn test_unknown_class_propagates() {
        let store = store(2);
        assert!(matches!(
            store.new_page(&PageClass::new("missing"), &PageParameters::new()),
            Err(ResolveError::UnknownPageClass { .. })
        ));
    }
}
