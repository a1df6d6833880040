//! Behaviors: reusable cross-cutting functionality attached to components.
//!
//! A behavior bundles the server-side callbacks for one named listener
//! interface together with the client-side event it is wired to. Instead of
//! subclassing, callers pass a [`BehaviorCallbacks`] struct of closures to
//! the attachment call; the behavior is addressed across requests by its
//! stable index within the owning component's behavior list.

use std::sync::Arc;

use crate::foundation::component::ComponentPath;
use crate::foundation::page::Page;
use crate::foundation::target::AjaxRequestTarget;
use crate::listener::RequestListenerInterface;

/// Callback invoked on a successful or failed form submission round trip.
///
/// Receives the partial-update target, the owning page (for state mutation),
/// and the path of the resolved form.
pub type SubmitFn = Arc<dyn Fn(&mut AjaxRequestTarget, &mut Page, &ComponentPath) + Send + Sync>;

/// Callback invoked when the component itself is the click-listener target.
pub type ClickFn = Arc<dyn Fn(&mut AjaxRequestTarget, &mut Page) + Send + Sync>;

/// Rewrites the generated client-side event-handler expression before
/// emission.
pub type DecorateFn = Arc<dyn Fn(String) -> String + Send + Sync>;

/// The callback bundle carried by a behavior.
///
/// All slots are optional; an unset slot makes the corresponding round-trip
/// outcome a no-op.
#[derive(Clone, Default)]
pub struct BehaviorCallbacks {
    /// Invoked when the round trip completes without validation errors.
    pub on_submit: Option<SubmitFn>,
    /// Invoked when validation or processing fails.
    pub on_error: Option<SubmitFn>,
    /// Rewrites the generated event-handler expression.
    pub decorate: Option<DecorateFn>,
}

impl std::fmt::Debug for BehaviorCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BehaviorCallbacks")
            .field("has_on_submit", &self.on_submit.is_some())
            .field("has_on_error", &self.on_error.is_some())
            .field("has_decorate", &self.decorate.is_some())
            .finish()
    }
}

/// A unit of cross-cutting functionality attached to a component.
#[derive(Clone)]
pub struct Behavior {
    name: String,
    listener: RequestListenerInterface,
    event: String,
    form: Option<ComponentPath>,
    callbacks: BehaviorCallbacks,
}

impl Behavior {
    /// Creates a behavior answering `listener`, wired to the client-side
    /// `event` (e.g. `"click"`).
    pub fn new(
        name: impl Into<String>,
        listener: RequestListenerInterface,
        event: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            listener,
            event: event.into(),
            form: None,
            callbacks: BehaviorCallbacks::default(),
        }
    }

    /// Binds the behavior to an explicit form path instead of the nearest
    /// ancestor form of the owning component.
    pub fn with_form(mut self, form: ComponentPath) -> Self {
        self.form = Some(form);
        self
    }

    /// Sets the callback bundle.
    pub fn with_callbacks(mut self, callbacks: BehaviorCallbacks) -> Self {
        self.callbacks = callbacks;
        self
    }

    /// The diagnostic name of this behavior.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The listener interface this behavior answers.
    pub fn listener(&self) -> &RequestListenerInterface {
        &self.listener
    }

    /// The client-side event this behavior is wired to.
    pub fn event(&self) -> &str {
        &self.event
    }

    /// The explicitly bound form path, if any.
    pub fn form(&self) -> Option<&ComponentPath> {
        self.form.as_ref()
    }

    /// The callback bundle.
    pub fn callbacks(&self) -> &BehaviorCallbacks {
        &self.callbacks
    }

    /// Generates the client-side event-handler expression posting to `url`.
    ///
    /// The undecorated form is the AJAX call followed by a suffix that
    /// prevents the browser's default navigation; the decorate callback may
    /// rewrite the whole expression before emission.
    pub fn event_handler(&self, url: &str) -> String {
        let handler = format!("Trellis.Ajax.submit('{url}', this); return false;");
        match &self.callbacks.decorate {
            Some(decorate) => decorate(handler),
            None => handler,
        }
    }
}

impl std::fmt::Debug for Behavior {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Behavior")
            .field("name", &self.name)
            .field("listener", &self.listener.name())
            .field("event", &self.event)
            .field("form", &self.form)
            .field("callbacks", &self.callbacks)
            .finish()
    }
}
