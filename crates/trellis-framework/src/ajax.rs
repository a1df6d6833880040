//! AJAX form-submit behavior construction.
//!
//! Instead of subclassing a behavior and overriding callback methods, the
//! caller passes an [`AjaxFormCallbacks`] bundle of closures to
//! [`ajax_form_submit`], which wires them into a [`Behavior`] answering the
//! `submit` listener on the given client-side event.

use std::sync::Arc;

use trellis_core::listener::SUBMIT;
use trellis_core::{
    AjaxRequestTarget, Behavior, BehaviorCallbacks, ComponentPath, DecorateFn, Page, SubmitFn,
};

/// Diagnostic name of the AJAX form-submit behavior.
pub const AJAX_FORM_SUBMIT: &str = "ajax-form-submit";

/// Callback bundle for an AJAX form submission.
///
/// `on_submit` is mandatory (there is no point submitting a form nobody
/// reacts to); `on_error` defaults to a no-op and `decorate` to the
/// undecorated event handler.
#[derive(Clone)]
pub struct AjaxFormCallbacks {
    on_submit: SubmitFn,
    on_error: Option<SubmitFn>,
    decorate: Option<DecorateFn>,
}

impl AjaxFormCallbacks {
    /// Creates a bundle with the mandatory submit callback.
    pub fn new(
        on_submit: impl Fn(&mut AjaxRequestTarget, &mut Page, &ComponentPath) + Send + Sync + 'static,
    ) -> Self {
        Self {
            on_submit: Arc::new(on_submit),
            on_error: None,
            decorate: None,
        }
    }

    /// Sets the callback invoked when validation or processing fails.
    pub fn on_error(
        mut self,
        f: impl Fn(&mut AjaxRequestTarget, &mut Page, &ComponentPath) + Send + Sync + 'static,
    ) -> Self {
        self.on_error = Some(Arc::new(f));
        self
    }

    /// Sets the closure rewriting the generated event-handler expression.
    pub fn decorate(mut self, f: impl Fn(String) -> String + Send + Sync + 'static) -> Self {
        self.decorate = Some(Arc::new(f));
        self
    }
}

impl std::fmt::Debug for AjaxFormCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AjaxFormCallbacks")
            .field("has_on_error", &self.on_error.is_some())
            .field("has_decorate", &self.decorate.is_some())
            .finish()
    }
}

/// Builds an AJAX form-submit behavior wired to the client-side `event`.
///
/// `form` binds the behavior to an explicit form path; `None` falls back to
/// the nearest ancestor form of the owning component at dispatch time.
pub fn ajax_form_submit(
    event: impl Into<String>,
    form: Option<ComponentPath>,
    callbacks: AjaxFormCallbacks,
) -> Behavior {
    let behavior = Behavior::new(AJAX_FORM_SUBMIT, SUBMIT.clone(), event).with_callbacks(
        BehaviorCallbacks {
            on_submit: Some(callbacks.on_submit),
            on_error: callbacks.on_error,
            decorate: callbacks.decorate,
        },
    );
    match form {
        Some(path) => behavior.with_form(path),
        None => behavior,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_behavior_answers_submit_listener() {
        let behavior = ajax_form_submit("click", None, AjaxFormCallbacks::new(|_, _, _| {}));

        assert_eq!(behavior.listener().name(), "submit");
        assert_eq!(behavior.event(), "click");
        assert!(behavior.form().is_none());
        assert!(behavior.callbacks().on_submit.is_some());
        assert!(behavior.callbacks().on_error.is_none());
    }

    #[test]
    fn test_explicit_form_binding_is_kept() {
        let form: ComponentPath = "checkout/address".parse().unwrap();
        let behavior = ajax_form_submit(
            "click",
            Some(form.clone()),
            AjaxFormCallbacks::new(|_, _, _| {}),
        );

        assert_eq!(behavior.form(), Some(&form));
    }
}
