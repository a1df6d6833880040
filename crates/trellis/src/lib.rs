//! # Trellis
//!
//! A server-side, component-oriented page framework core: stateful pages
//! assembled from component trees, addressed by stable URLs, with listener
//! callbacks (click, submit, AJAX form submission) invocable across
//! requests.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐   ┌────────────────┐   ┌──────────────────────────────┐
//! │ container │──▶│  Application   │──▶│ RequestCycle                 │
//! │ (extern)  │   │ mapper/decode  │   │  handler.respond / detach    │──▶ page store
//! └───────────┘   └────────────────┘   └──────────────────────────────┘
//! ```
//!
//! - **trellis-core**: component tree, page identity, listener interfaces
//! - **trellis-framework**: providers, request handlers, forms, AJAX
//! - **trellis-runtime**: request cycle, session store, URL mapper, config
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use trellis::prelude::*;
//!
//! let app = Application::builder().build()?;
//! let checkout = app.mount_page("checkout", |params| {
//!     let callbacks = AjaxFormCallbacks::new(|target, _page, form| {
//!         target.add_component(form.clone());
//!     });
//!     let root = Component::new("root", ComponentKind::container()).with(
//!         Component::new("checkout", ComponentKind::form())
//!             .with(Component::new(
//!                 "name",
//!                 ComponentKind::text_field(FieldState::new().required()),
//!             ))
//!             .with(AjaxSubmitButton::new("go", callbacks)),
//!     );
//!     Page::new(PageClass::new("checkout"), params.clone(), root)
//! });
//!
//! let url = app.listener_url(&checkout, &PageParameters::new(), "checkout/go", "submit", Some(0))?;
//! let response = app.respond(&session, &url, form_values).await?;
//! ```

pub use trellis_core as core;
pub use trellis_framework as framework;
pub use trellis_runtime as runtime;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use trellis::prelude::*;
/// ```
pub mod prelude {
    // Application - main entry point
    pub use trellis_runtime::{
        AppRequest, AppResponse, Application, ApplicationService, TrellisConfig,
    };

    // Component model - for building pages
    pub use trellis_core::{
        AjaxRequestTarget, Component, ComponentKind, ComponentPath, FieldState, LinkState, Page,
        PageClass, PageParameters, SessionId,
    };

    // Forms and AJAX - for wiring submission round trips
    pub use trellis_framework::{AjaxFormCallbacks, AjaxSubmitButton, ajax_form_submit};

    // Listener interfaces - for custom targets and URL generation
    pub use trellis_core::{CLICK, RequestListenerInterface, SUBMIT};

    // Handler layer - for custom dispatch
    pub use trellis_framework::{
        BookmarkableListenerHandler, ListenerHandler, PageAndComponentProvider, PageProvider,
        RequestContext, RequestHandler,
    };
}
