//! # Trellis Framework
//!
//! The request-handling layer of the Trellis web framework.
//!
//! This crate turns identifying keys into live objects and invocations:
//!
//! - **Providers**: [`PageProvider`] and [`PageAndComponentProvider`] resolve
//!   pages (by class + parameters or by stored id) and components (by path)
//!   on demand, without ever owning them.
//! - **Request Handlers**: [`BookmarkableListenerHandler`] describes a
//!   listener target for URL generation only; [`ListenerHandler`] dispatches
//!   the listener and renders the outcome; [`RenderPageHandler`] renders a
//!   bookmarkable page.
//! - **Forms & AJAX**: form filling/validation ([`form`]), the AJAX
//!   form-submit behavior ([`ajax_form_submit`]) and the submit button
//!   ([`AjaxSubmitButton`]).
//!
//! ## Request Flow
//!
//! ```text
//! ┌─────────────┐     ┌──────────────────┐     ┌───────────────────────┐
//! │ URL decoder │────▶│ Request handler  │────▶│ Provider              │
//! │  (runtime)  │     │ (this crate)     │     │  page + component     │
//! └─────────────┘     └──────────────────┘     └───────────────────────┘
//!                              │                         │
//!                       listener dispatch          session store
//!                       form processing            (runtime)
//! ```
//!
//! Handlers are transient: the request cycle calls `respond` exactly once,
//! then `detach` exactly once on every exit path, so no page instance stays
//! pinned beyond its request.

pub mod ajax;
pub mod button;
pub mod context;
pub mod error;
pub mod form;
pub mod handler;
pub mod provider;

pub use ajax::{AJAX_FORM_SUBMIT, AjaxFormCallbacks, ajax_form_submit};
pub use button::{AjaxSubmitButton, resolve_form};
pub use context::RequestContext;
pub use error::{HandlerError, HandlerResult, ResolveError, ResolveResult};
pub use form::FormErrors;
pub use handler::{
    AjaxFragment, AjaxUpdate, BookmarkableListenerHandler, ComponentRequestHandler,
    ListenerHandler, PageRequestHandler, RenderPageHandler, RequestHandler, Response,
};
pub use provider::{PageAndComponentProvider, PageHandle, PageProvider, PageSource};
