//! Bookmarkable page render handler.

use async_trait::async_trait;
use tracing::debug;

use trellis_core::{PageClass, PageParameters};

use crate::context::RequestContext;
use crate::error::{HandlerResult, ResolveResult};
use crate::handler::{PageRequestHandler, RequestHandler, Response};
use crate::provider::{PageHandle, PageProvider};

/// Request handler for a plain page URL: resolves or constructs the page
/// and renders it in full.
///
/// This is the default handler for bookmarkable URLs without a listener,
/// and the redirect target the request cycle falls back to when a stateful
/// target has expired.
pub struct RenderPageHandler {
    provider: PageProvider,
}

impl RenderPageHandler {
    /// Creates a handler rendering the page resolved by `provider`.
    pub fn new(provider: PageProvider) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl RequestHandler for RenderPageHandler {
    async fn respond(&self, ctx: &RequestContext) -> HandlerResult<Response> {
        let handle = self.provider.page(ctx)?;
        let markup = handle.lock().root().render()?;

        // Keep the rendered page addressable by follow-up listener URLs.
        let is_fresh = handle.lock().id().is_none();
        if is_fresh {
            let id = ctx.source().store_page(ctx.session(), &handle);
            debug!(page = %id, class = %self.provider.page_class(), "Stored rendered page");
        }

        Ok(Response::Page(markup))
    }

    fn detach(&self, _ctx: &RequestContext) {
        self.provider.detach();
    }
}

impl PageRequestHandler for RenderPageHandler {
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU64, Ordering};

    use parking_lot::Mutex;

    use trellis_core::{Component, ComponentKind, Page, PageId, SessionId};

    use crate::error::ResolveError;
    use crate::provider::PageSource;

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
            let root = Component::new("root", ComponentKind::container())
                .with(Component::new("title", ComponentKind::label("Orders")));
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

    #[test]
    fn test_render_produces_markup_and_stores_page() {
        let ctx = RequestContext::new(
            SessionId::new("s1"),
            Arc::new(TestSource {
                next_id: AtomicU64::new(1),
            }),
            PageParameters::new(),
        );
        let handler = RenderPageHandler::new(PageProvider::bookmarkable(
            PageClass::new("orders"),
            PageParameters::new(),
        ));

        let response = tokio_test::block_on(handler.respond(&ctx)).unwrap();

        match response {
            Response::Page(markup) => assert!(markup.contains("Orders")),
            other => panic!("expected page render, got {other:?}"),
        }
        // The cached handle is the stored instance.
        assert_eq!(handler.page(&ctx).unwrap().lock().id(), Some(PageId::new(1)));
        handler.detach(&ctx);
    }
}
