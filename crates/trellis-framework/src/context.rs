//! Per-request context handed to request handlers.

use std::sync::Arc;

use trellis_core::{PageParameters, SessionId};

use crate::provider::PageSource;

/// The context object passed to handlers while a request is processed.
///
/// It bundles the requesting session, the page source used to materialize
/// page instances, and the raw request parameters (query/post values) that
/// form processing consumes. Handlers never outlive it: a handler is
/// constructed, responded, and detached within one context.
#[derive(Clone)]
pub struct RequestContext {
    session: SessionId,
    source: Arc<dyn PageSource>,
    parameters: PageParameters,
}

impl RequestContext {
    /// Creates a context for one request.
    pub fn new(
        session: SessionId,
        source: Arc<dyn PageSource>,
        parameters: PageParameters,
    ) -> Self {
        Self {
            session,
            source,
            parameters,
        }
    }

    /// The requesting session.
    pub fn session(&self) -> &SessionId {
        &self.session
    }

    /// The page source resolving ids and classes to page instances.
    pub fn source(&self) -> &dyn PageSource {
        self.source.as_ref()
    }

    /// The raw request parameters submitted with this request.
    pub fn parameters(&self) -> &PageParameters {
        &self.parameters
    }
}

impl std::fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestContext")
            .field("session", &self.session)
            .field("parameters", &self.parameters)
            .finish()
    }
}
