//! The AJAX submit button.
//!
//! A submit button that posts its form via AJAX instead of a full page
//! submit. Binding an explicit form at construction means the button does
//! not need to sit inside that form in the tree; without a binding, the
//! nearest ancestor form is resolved at dispatch time.

use trellis_core::{ButtonState, Component, ComponentKind, ComponentPath, Page};

use crate::ajax::{AjaxFormCallbacks, ajax_form_submit};

/// Constructors for AJAX submit buttons.
///
/// # Example
///
/// ```rust,ignore
/// use trellis_framework::{AjaxFormCallbacks, AjaxSubmitButton};
///
/// let button = AjaxSubmitButton::new(
///     "save",
///     AjaxFormCallbacks::new(|target, page, form| {
///         target.add_component(form.clone());
///     })
///     .on_error(|target, _page, form| {
///         target.add_component(form.clone());
///     }),
/// );
/// ```
pub struct AjaxSubmitButton;

impl AjaxSubmitButton {
    /// Creates a button that submits its nearest ancestor form.
    pub fn new(id: impl Into<String>, callbacks: AjaxFormCallbacks) -> Component {
        Component::new(id, ComponentKind::submit_button(ButtonState::new()))
            .with_behavior(ajax_form_submit("click", None, callbacks))
    }

    /// Creates a button explicitly bound to the form at `form`.
    ///
    /// The button may be placed anywhere in the tree; the binding wins over
    /// ancestor lookup.
    pub fn bound(
        id: impl Into<String>,
        form: ComponentPath,
        callbacks: AjaxFormCallbacks,
    ) -> Component {
        Component::new(
            id,
            ComponentKind::submit_button(ButtonState::bound_to(form.clone())),
        )
        .with_behavior(ajax_form_submit("click", Some(form), callbacks))
    }
}

/// Resolves the form a submit component targets.
///
/// The explicit binding (on the button state or any attached behavior) wins
/// regardless of tree position; otherwise the nearest ancestor form is used.
pub fn resolve_form(page: &Page, component: &ComponentPath) -> Option<ComponentPath> {
    let node = page.find(component)?;

    if let ComponentKind::SubmitButton(state) = node.kind()
        && let Some(bound) = state.bound_form()
    {
        return Some(bound.clone());
    }
    for behavior in node.behaviors() {
        if let Some(bound) = behavior.form() {
            return Some(bound.clone());
        }
    }
    page.nearest_form(component)
}
