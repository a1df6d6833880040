//! URL-generation-only handler for bookmarkable listener targets.

use async_trait::async_trait;

use trellis_core::{Component, ComponentPath, PageClass, PageParameters, RequestListenerInterface};

use crate::context::RequestContext;
use crate::error::{HandlerError, HandlerResult, ResolveResult};
use crate::handler::{ComponentRequestHandler, PageRequestHandler, RequestHandler, Response};
use crate::provider::{PageAndComponentProvider, PageHandle};

/// Request handler for "invoke listener X on component Y of bookmarkable
/// page P with parameters Q".
///
/// This handler is only used to generate URLs: its accessors expose the
/// identifying tuple for the URL encoder, and `respond` is an intentional
/// no-op because rendering is always performed by
/// [`ListenerHandler`](crate::handler::ListenerHandler). The split lets
/// bookmarkable URLs be generated speculatively (e.g. while rendering
/// markup) without ever constructing or rendering the target page.
pub struct BookmarkableListenerHandler {
    provider: PageAndComponentProvider,
    listener: RequestListenerInterface,
    behavior_index: Option<usize>,
}

impl BookmarkableListenerHandler {
    /// Creates a handler for the given target.
    ///
    /// `behavior_index` of `None` means the listener targets the component
    /// itself; `Some(i)` targets the behavior at index `i`. Fails with
    /// [`HandlerError::InvalidArgument`] when the listener name is empty or
    /// the component path addresses the page root.
    pub fn new(
        provider: PageAndComponentProvider,
        listener: RequestListenerInterface,
        behavior_index: Option<usize>,
    ) -> HandlerResult<Self> {
        if listener.name().is_empty() {
            return Err(HandlerError::InvalidArgument(
                "listener interface name must not be empty".to_string(),
            ));
        }
        if provider.component_path().is_root() {
            return Err(HandlerError::InvalidArgument(
                "listener target requires a component path".to_string(),
            ));
        }
        Ok(Self {
            provider,
            listener,
            behavior_index,
        })
    }

    /// The listener interface being invoked.
    pub fn listener_interface(&self) -> &RequestListenerInterface {
        &self.listener
    }

    /// Index of the targeted behavior, or `None` when the component itself
    /// is the listener target.
    ///
    /// `None` and `Some(0)` never collide: the URL encoder omits the
    /// behavior parameter entirely for `None`.
    pub fn behavior_index(&self) -> Option<usize> {
        self.behavior_index
    }
}

#[async_trait]
impl RequestHandler for BookmarkableListenerHandler {
    /// Intentional no-op: this handler variant never renders. It neither
    /// mutates page state nor fails for any validly constructed instance.
    async fn respond(&self, _ctx: &RequestContext) -> HandlerResult<Response> {
        Ok(Response::None)
    }

    fn detach(&self, _ctx: &RequestContext) {
        self.provider.detach();
    }
}

impl PageRequestHandler for BookmarkableListenerHandler {
    fn page_class(&self) -> &PageClass {
        self.provider.page_class()
    }

    fn page_parameters(&self) -> &PageParameters {
        self.provider.page_parameters()
    }

    fn page(&self, ctx: &RequestContext) -> ResolveResult<PageHandle> {
        self.provider.page(ctx)
    }
}

impl ComponentRequestHandler for BookmarkableListenerHandler {
    fn component_path(&self) -> &ComponentPath {
        self.provider.component_path()
    }

    fn component(&self, ctx: &RequestContext) -> ResolveResult<Component> {
        self.provider.with_component(ctx, Component::clone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU64, Ordering};

    use parking_lot::Mutex;

    use trellis_core::listener::SUBMIT;
    use trellis_core::{
        Component, ComponentKind, Page, PageId, SessionId,
    };

    use crate::error::ResolveError;
    use crate::provider::{PageProvider, PageSource};

    struct TestSource {
        next_id: AtomicU64,
    }

    impl PageSource for TestSource {
        fn get_page(&self, _session: &SessionId, id: PageId) -> ResolveResult<PageHandle> {
            Err(ResolveError::PageExpired { page: id })
        }

        fn new_page(
            &self,
            class: &PageClass,
            parameters: &PageParameters,
        ) -> ResolveResult<PageHandle> {
            let root = Component::new("root", ComponentKind::container()).with(Component::new(
                "go",
                ComponentKind::submit_button(Default::default()),
            ));
            Ok(Arc::new(Mutex::new(Page::new(
                class.clone(),
                parameters.clone(),
                root,
            ))))
        }

        fn store_page(&self, _session: &SessionId, page: &PageHandle) -> PageId {
            let id = PageId::new(self.next_id.fetch_add(1, Ordering::SeqCst));
            page.lock().assign_id(id);
            id
        }
    }

    fn ctx() -> RequestContext {
        RequestContext::new(
            SessionId::new("s1"),
            Arc::new(TestSource {
                next_id: AtomicU64::new(1),
            }),
            PageParameters::new(),
        )
    }

    fn provider() -> PageAndComponentProvider {
        let mut parameters = PageParameters::new();
        parameters.set("category", "books");
        PageAndComponentProvider::new(
            PageProvider::bookmarkable(PageClass::new("orders"), parameters),
            "go".parse().unwrap(),
        )
    }

    #[test]
    fn test_accessors_delegate_to_provider() {
        let handler = BookmarkableListenerHandler::new(provider(), SUBMIT.clone(), Some(3)).unwrap();

        assert_eq!(handler.page_class().name(), "orders");
        assert_eq!(handler.page_parameters().get("category"), Some("books"));
        assert_eq!(handler.component_path().to_string(), "go");
        assert_eq!(handler.listener_interface().name(), "submit");
        assert_eq!(handler.behavior_index(), Some(3));
    }

    #[test]
    fn test_none_behavior_index_is_preserved() {
        let handler = BookmarkableListenerHandler::new(provider(), SUBMIT.clone(), None).unwrap();
        assert_eq!(handler.behavior_index(), None);
    }

    #[test]
    fn test_empty_listener_name_is_invalid() {
        let listener = RequestListenerInterface::new("", false, false);
        let result = BookmarkableListenerHandler::new(provider(), listener, None);

        assert!(matches!(result, Err(HandlerError::InvalidArgument(_))));
    }

    #[test]
    fn test_root_component_path_is_invalid() {
        let provider = PageAndComponentProvider::new(
            PageProvider::bookmarkable(PageClass::new("orders"), PageParameters::new()),
            ComponentPath::root(),
        );
        let result = BookmarkableListenerHandler::new(provider, SUBMIT.clone(), None);

        assert!(matches!(result, Err(HandlerError::InvalidArgument(_))));
    }

    #[test]
    fn test_respond_is_a_no_op() {
        let handler = BookmarkableListenerHandler::new(provider(), SUBMIT.clone(), Some(0)).unwrap();
        let ctx = ctx();

        let response = tokio_test::block_on(handler.respond(&ctx)).unwrap();
        assert!(matches!(response, Response::None));
    }

    #[test]
    fn test_detach_is_idempotent() {
        let handler = BookmarkableListenerHandler::new(provider(), SUBMIT.clone(), None).unwrap();
        let ctx = ctx();
        handler.page(&ctx).unwrap();

        handler.detach(&ctx);
        handler.detach(&ctx);
    }
}
