//! Request handlers.
//!
//! A request handler is a transient, per-request object: constructed during
//! URL decoding or programmatic dispatch, consumed once by `respond`, then
//! `detach`ed. The capability traits split what a handler can describe
//! ("produces a page": [`PageRequestHandler`]; "produces a component":
//! [`ComponentRequestHandler`]) from what it does when dispatched
//! ([`RequestHandler::respond`]).

pub mod bookmarkable;
pub mod listener;
pub mod render;

use async_trait::async_trait;

use trellis_core::{Component, ComponentPath, PageClass, PageParameters};

use crate::context::RequestContext;
use crate::error::{HandlerResult, ResolveResult};
use crate::provider::PageHandle;

pub use bookmarkable::BookmarkableListenerHandler;
pub use listener::ListenerHandler;
pub use render::RenderPageHandler;

// =============================================================================
// Response
// =============================================================================

/// One re-rendered component in a partial update.
#[derive(Debug, Clone)]
pub struct AjaxFragment {
    /// Path of the re-rendered component.
    pub path: ComponentPath,
    /// Its fresh markup.
    pub markup: String,
}

/// The payload of an AJAX partial update.
#[derive(Debug, Clone, Default)]
pub struct AjaxUpdate {
    /// Re-rendered components in scheduling order.
    pub fragments: Vec<AjaxFragment>,
    /// Scripts to evaluate on the client after the update applies.
    pub scripts: Vec<String>,
}

/// What a dispatched handler produced.
#[derive(Debug, Clone)]
pub enum Response {
    /// Nothing: the handler exists for URL generation only.
    None,
    /// A full page render.
    Page(String),
    /// An AJAX partial update.
    Ajax(AjaxUpdate),
}

// =============================================================================
// Handler Traits
// =============================================================================

/// Base contract of every request handler.
///
/// The request cycle invokes `respond` exactly once per dispatched handler,
/// then `detach` exactly once regardless of outcome. Handlers are never
/// reused across requests.
#[async_trait]
pub trait RequestHandler: Send + Sync {
    /// Produces this handler's response.
    async fn respond(&self, ctx: &RequestContext) -> HandlerResult<Response>;

    /// Releases per-request resources (cached page handles). Idempotent.
    fn detach(&self, ctx: &RequestContext);
}

/// Capability: the handler targets a page.
pub trait PageRequestHandler: RequestHandler {
    /// The target page class, available without materializing the page.
    fn page_class(&self) -> &PageClass;

    /// The page construction parameters; empty if none.
    fn page_parameters(&self) -> &PageParameters;

    /// Materializes or retrieves the target page.
    fn page(&self, ctx: &RequestContext) -> ResolveResult<PageHandle>;
}

/// Capability: the handler targets a component within its page.
pub trait ComponentRequestHandler: RequestHandler {
    /// The target component path.
    fn component_path(&self) -> &ComponentPath;

    /// Resolves a snapshot of the target component.
    fn component(&self, ctx: &RequestContext) -> ResolveResult<Component>;
}
