//! The rendering/invoking listener handler.
//!
//! This is the stateful counterpart of
//! [`BookmarkableListenerHandler`](crate::handler::BookmarkableListenerHandler):
//! it carries the same identifying tuple, but `respond` actually resolves
//! the page and component, dispatches the listener, and produces a response
//! (a full re-render for page-rendering listeners, an AJAX partial update
//! for form submissions).

use async_trait::async_trait;
use tracing::{Level, debug, span, trace};

use trellis_core::listener::{CLICK, SUBMIT};
use trellis_core::{
    AjaxRequestTarget, Behavior, Component, ComponentKind, ComponentPath, Page, PageClass,
    PageParameters, RequestListenerInterface,
};

use crate::button::resolve_form;
use crate::context::RequestContext;
use crate::error::{HandlerError, HandlerResult, ResolveError, ResolveResult};
use crate::form;
use crate::handler::{
    AjaxFragment, AjaxUpdate, ComponentRequestHandler, PageRequestHandler, RequestHandler,
    Response,
};
use crate::provider::{PageAndComponentProvider, PageHandle};

/// Request handler that invokes a listener on a component or behavior and
/// renders the outcome.
pub struct ListenerHandler {
    provider: PageAndComponentProvider,
    listener: RequestListenerInterface,
    behavior_index: Option<usize>,
}

impl ListenerHandler {
    /// Creates a handler for the given target.
    ///
    /// The same construction contract as the bookmarkable variant: an empty
    /// listener name or a root component path is an
    /// [`HandlerError::InvalidArgument`].
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
    pub fn behavior_index(&self) -> Option<usize> {
        self.behavior_index
    }

    /// Dispatches the listener within the locked page.
    fn dispatch(&self, page: &mut Page, ctx: &RequestContext) -> HandlerResult<Response> {
        let path = self.provider.component_path();
        let component = page
            .find(path)
            .ok_or_else(|| ResolveError::ComponentNotFound {
                path: path.to_string(),
            })?;

        match self.behavior_index {
            Some(index) => {
                let behavior = component
                    .behavior(index)
                    .filter(|b| b.listener() == &self.listener)
                    .cloned()
                    .ok_or_else(|| ResolveError::BehaviorNotFound {
                        path: path.to_string(),
                        index,
                        listener: self.listener.name().to_string(),
                    })?;
                self.submit_via_behavior(page, &behavior, ctx)
            }
            None => match component.kind() {
                ComponentKind::Link(link) if self.listener == CLICK => {
                    let callback = link.click_callback().cloned();
                    let mut target = AjaxRequestTarget::new();
                    if let Some(callback) = callback {
                        callback(&mut target, page);
                    }
                    if !target.is_empty() {
                        page.bump_version();
                    }
                    Ok(Response::Page(page.root().render()?))
                }
                ComponentKind::SubmitButton(_) if self.listener == SUBMIT => {
                    // Plain (non-AJAX) form submit: process and re-render
                    // the whole page. Validation errors live on the form
                    // state and show up in the render, so the outcome is
                    // not an error channel here.
                    let form_path = self.resolve_form_path(page)?;
                    let _ = self.process_form(page, &form_path, ctx);
                    page.bump_version();
                    Ok(Response::Page(page.root().render()?))
                }
                _ => Err(ResolveError::ListenerNotSupported {
                    path: path.to_string(),
                    listener: self.listener.name().to_string(),
                }
                .into()),
            },
        }
    }

    /// Runs the AJAX form-submit round trip through `behavior`.
    fn submit_via_behavior(
        &self,
        page: &mut Page,
        behavior: &Behavior,
        ctx: &RequestContext,
    ) -> HandlerResult<Response> {
        let form_path = match behavior.form() {
            Some(bound) => bound.clone(),
            None => self.resolve_form_path(page)?,
        };
        if !page.find(&form_path).is_some_and(Component::is_form) {
            return Err(ResolveError::ComponentNotFound {
                path: form_path.to_string(),
            }
            .into());
        }

        // The form must emit its markup id so the client can locate it when
        // the partial update applies.
        if let Some(form) = page.find_mut(&form_path) {
            form.set_output_markup_id(true);
        }

        let outcome = self.process_form(page, &form_path, ctx);
        let mut target = AjaxRequestTarget::new();
        let callbacks = behavior.callbacks();
        match outcome {
            Ok(()) => {
                trace!(form = %form_path, "Form submission valid, invoking on_submit");
                if let Some(on_submit) = callbacks.on_submit.clone() {
                    on_submit(&mut target, page, &form_path);
                }
            }
            Err(errors) => {
                debug!(form = %form_path, errors = errors.messages().len(), "Invoking on_error");
                if let Some(on_error) = callbacks.on_error.clone() {
                    on_error(&mut target, page, &form_path);
                }
            }
        }

        if !target.is_empty() {
            page.bump_version();
        }

        let mut update = AjaxUpdate {
            fragments: Vec::new(),
            scripts: target.scripts().to_vec(),
        };
        for path in target.components() {
            let component =
                page.find(path)
                    .ok_or_else(|| ResolveError::ComponentNotFound {
                        path: path.to_string(),
                    })?;
            update.fragments.push(AjaxFragment {
                path: path.clone(),
                markup: component.render()?,
            });
        }
        Ok(Response::Ajax(update))
    }

    /// Resolves the form the target component submits.
    fn resolve_form_path(&self, page: &Page) -> ResolveResult<ComponentPath> {
        let path = self.provider.component_path();
        resolve_form(page, path).ok_or_else(|| ResolveError::ComponentNotFound {
            path: format!("{path} (no enclosing form)"),
        })
    }

    /// Fills and validates the form, tolerating a missing form component
    /// only in the impossible case the path was validated away underneath.
    fn process_form(
        &self,
        page: &mut Page,
        form_path: &ComponentPath,
        ctx: &RequestContext,
    ) -> Result<(), form::FormErrors> {
        match page.find_mut(form_path) {
            Some(form_component) => form::process(form_component, ctx.parameters()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RequestHandler for ListenerHandler {
    async fn respond(&self, ctx: &RequestContext) -> HandlerResult<Response> {
        let span = span!(Level::DEBUG, "listener", listener = %self.listener, path = %self.provider.component_path());
        let _enter = span.enter();

        let handle = self.provider.page(ctx)?;
        let response = {
            let mut page = handle.lock();
            self.dispatch(&mut page, ctx)?
        };

        // A bookmarkable target visited for the first time becomes stateful,
        // so follow-up listener URLs can address the same instance.
        let is_fresh = handle.lock().id().is_none();
        if is_fresh {
            let id = ctx.source().store_page(ctx.session(), &handle);
            debug!(page = %id, "Stored freshly constructed page");
        }

        Ok(response)
    }

    fn detach(&self, _ctx: &RequestContext) {
        self.provider.detach();
    }
}

impl PageRequestHandler for ListenerHandler {
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

impl ComponentRequestHandler for ListenerHandler {
    fn component_path(&self) -> &ComponentPath {
        self.provider.component_path()
    }

    fn component(&self, ctx: &RequestContext) -> ResolveResult<Component> {
        self.provider.with_component(ctx, Component::clone)
    }
}
