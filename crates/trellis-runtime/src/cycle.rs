//! Request cycle orchestration.
//!
//! The cycle owns the scoped-resource-release contract of the handler
//! lifecycle: `respond` is invoked exactly once per dispatched handler, then
//! `detach` exactly once on every exit path, including failures. Skipping a
//! detach pins page instances in the session store and grows sessions
//! without bound under load, so this is enforced here rather than trusted
//! to each call site.

use tracing::{Level, debug, info, span};

use trellis_framework::{HandlerError, RequestContext, RequestHandler, ResolveError, Response};

/// What one processed request produced, after recoverable resolution
/// failures have been mapped to user-visible outcomes.
#[derive(Debug)]
pub enum CycleOutcome {
    /// The handler completed with a response.
    Completed(Response),
    /// The referenced page instance expired; the caller should redirect to
    /// a fresh bookmarkable render of the page.
    Expired,
    /// The target could not be resolved (stale component path, unknown
    /// class); a 404-equivalent response.
    NotFound(String),
}

/// Drives one request through a handler.
pub struct RequestCycle {
    context: RequestContext,
}

impl RequestCycle {
    /// Creates a cycle around one request's context.
    pub fn new(context: RequestContext) -> Self {
        Self { context }
    }

    /// The request context.
    pub fn context(&self) -> &RequestContext {
        &self.context
    }

    /// Processes `handler`: respond once, detach once, classify the result.
    ///
    /// Resolution failures (expired page, stale path) are recovered into
    /// [`CycleOutcome`] variants; construction-time and markup errors
    /// propagate as unrecovered failures since they indicate
    /// misconfiguration rather than a bad request.
    pub async fn process(&self, handler: &dyn RequestHandler) -> Result<CycleOutcome, HandlerError> {
        let cycle_span = span!(Level::DEBUG, "request_cycle", session = %self.context.session());
        let _enter = cycle_span.enter();

        let result = handler.respond(&self.context).await;
        handler.detach(&self.context);

        match result {
            Ok(response) => Ok(CycleOutcome::Completed(response)),
            Err(HandlerError::Resolve(ResolveError::PageExpired { page })) => {
                info!(%page, "Page expired, recovering with redirect");
                Ok(CycleOutcome::Expired)
            }
            Err(HandlerError::Resolve(error)) => {
                debug!(%error, "Resolution failed, recovering with not-found");
                Ok(CycleOutcome::NotFound(error.to_string()))
            }
            Err(fatal) => Err(fatal),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use trellis_core::{
        MarkupError, PageClass, PageId, PageParameters, SessionId,
    };
    use trellis_framework::{HandlerResult, PageHandle, PageSource, ResolveResult};

    struct NoSource;

    impl PageSource for NoSource {
        fn get_page(&self, _session: &SessionId, id: PageId) -> ResolveResult<PageHandle> {
            Err(ResolveError::PageExpired { page: id })
        }

        fn new_page(
            &self,
            class: &PageClass,
            _parameters: &PageParameters,
        ) -> ResolveResult<PageHandle> {
            Err(ResolveError::UnknownPageClass {
                class: class.name().to_string(),
            })
        }

        fn store_page(&self, _session: &SessionId, _page: &PageHandle) -> PageId {
            PageId::new(0)
        }
    }

    /// Handler that counts lifecycle calls and fails on demand.
    struct CountingHandler {
        responds: AtomicUsize,
        detaches: AtomicUsize,
        fail_with: Option<HandlerError>,
    }

    impl CountingHandler {
        fn ok() -> Self {
            Self {
                responds: AtomicUsize::new(0),
                detaches: AtomicUsize::new(0),
                fail_with: None,
            }
        }

        fn failing(error: HandlerError) -> Self {
            Self {
                fail_with: Some(error),
                ..Self::ok()
            }
        }
    }

    #[async_trait]
    impl RequestHandler for CountingHandler {
        async fn respond(&self, _ctx: &RequestContext) -> HandlerResult<Response> {
            self.responds.fetch_add(1, Ordering::SeqCst);
            match &self.fail_with {
                Some(error) => Err(error.clone()),
                None => Ok(Response::None),
            }
        }

        fn detach(&self, _ctx: &RequestContext) {
            self.detaches.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn cycle() -> RequestCycle {
        RequestCycle::new(RequestContext::new(
            SessionId::new("s1"),
            Arc::new(NoSource),
            PageParameters::new(),
        ))
    }

    #[tokio::test]
    async fn test_respond_and_detach_called_exactly_once() {
        let handler = CountingHandler::ok();
        let outcome = cycle().process(&handler).await.unwrap();

        assert!(matches!(outcome, CycleOutcome::Completed(Response::None)));
        assert_eq!(handler.responds.load(Ordering::SeqCst), 1);
        assert_eq!(handler.detaches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_detach_still_runs_when_respond_fails() {
        let handler = CountingHandler::failing(
            ResolveError::PageExpired {
                page: PageId::new(9),
            }
            .into(),
        );
        let outcome = cycle().process(&handler).await.unwrap();

        assert!(matches!(outcome, CycleOutcome::Expired));
        assert_eq!(handler.detaches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_stale_path_maps_to_not_found() {
        let handler = CountingHandler::failing(
            ResolveError::ComponentNotFound {
                path: "form/gone".to_string(),
            }
            .into(),
        );

        let outcome = cycle().process(&handler).await.unwrap();
        match outcome {
            CycleOutcome::NotFound(message) => assert!(message.contains("form/gone")),
            other => panic!("expected not-found, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_markup_errors_propagate_unrecovered() {
        let handler = CountingHandler::failing(
            MarkupError::TypeMismatch {
                component: "go".to_string(),
                type_attr: "text".to_string(),
            }
            .into(),
        );

        let result = cycle().process(&handler).await;
        assert!(matches!(result, Err(HandlerError::Markup(_))));
        assert_eq!(handler.detaches.load(Ordering::SeqCst), 1);
    }
}
