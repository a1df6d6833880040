//! Form processing: filling and validating form-bindable components.
//!
//! On submit, the raw request parameters are pushed into the form's text
//! fields, then validation runs (required checks followed by attached
//! validators). Validation failure is a routed outcome, not a handler
//! failure: the errors are recorded on the form state and the round trip is
//! steered to the behavior's error callback.

use thiserror::Error;
use tracing::debug;

use trellis_core::{Component, ComponentKind, ComponentPath, PageParameters};

/// The validation errors of one failed submission.
#[derive(Debug, Clone, Error)]
#[error("form validation failed: {}", messages.join("; "))]
pub struct FormErrors {
    messages: Vec<String>,
}

impl FormErrors {
    /// The individual error messages, in discovery order.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }
}

/// Processes a submission against `form`.
///
/// Walks the form's subtree, pushes request values into each text field,
/// and validates. All fields are processed even when earlier ones fail, so
/// every error is reported in one round trip. Errors are recorded on the
/// form's state; previous errors are cleared first.
pub fn process(form: &mut Component, request: &PageParameters) -> Result<(), FormErrors> {
    if let ComponentKind::Form(state) = form.kind_mut() {
        state.clear_errors();
    }

    let mut fields = Vec::new();
    collect_fields(form, ComponentPath::root(), &mut fields);

    let mut messages = Vec::new();
    for path in &fields {
        let Some(component) = form.find_mut(path) else {
            continue;
        };
        let id = component.id().to_string();
        if let ComponentKind::TextField(field) = component.kind_mut() {
            let value = request.get(&id).map(str::to_string);
            if let Err(message) = field.validate(&id, value.as_deref()) {
                messages.push(message);
            }
            field.set_value(value);
        }
    }

    if let ComponentKind::Form(state) = form.kind_mut() {
        for message in &messages {
            state.record_error(message.clone());
        }
    }

    if messages.is_empty() {
        Ok(())
    } else {
        debug!(
            form = form.id(),
            errors = messages.len(),
            "Form submission failed validation"
        );
        Err(FormErrors { messages })
    }
}

/// Collects the relative paths of all text fields under `component`.
fn collect_fields(component: &Component, prefix: ComponentPath, out: &mut Vec<ComponentPath>) {
    for child in component.children() {
        let path = prefix.child(child.id());
        if matches!(child.kind(), ComponentKind::TextField(_)) {
            out.push(path.clone());
        }
        collect_fields(child, path, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_core::FieldState;

    fn form() -> Component {
        Component::new("form", ComponentKind::form())
            .with(Component::new(
                "name",
                ComponentKind::text_field(FieldState::new().required()),
            ))
            .with(Component::new("row", ComponentKind::container()).with(Component::new(
                "age",
                ComponentKind::text_field(FieldState::new().validator(|v| {
                    v.parse::<u32>()
                        .map(|_| ())
                        .map_err(|_| "field 'age' must be a number".to_string())
                })),
            )))
    }

    fn field_value(form: &Component, path: &str) -> Option<String> {
        let path: ComponentPath = path.parse().unwrap();
        match form.find(&path).unwrap().kind() {
            ComponentKind::TextField(field) => field.value().map(str::to_string),
            _ => None,
        }
    }

    #[test]
    fn test_valid_submission_fills_fields() {
        let mut form = form();
        let mut request = PageParameters::new();
        request.set("name", "Ada");
        request.set("age", "36");

        process(&mut form, &request).unwrap();

        assert_eq!(field_value(&form, "name").as_deref(), Some("Ada"));
        assert_eq!(field_value(&form, "age").as_deref(), Some("36"));
    }

    #[test]
    fn test_missing_required_field_fails() {
        let mut form = form();
        let request = PageParameters::new();

        let err = process(&mut form, &request).unwrap_err();
        assert_eq!(err.messages(), ["field 'name' is required"]);

        // Errors are also recorded on the form state.
        match form.kind() {
            ComponentKind::Form(state) => assert!(!state.is_valid()),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_all_errors_reported_in_one_pass() {
        let mut form = form();
        let mut request = PageParameters::new();
        request.set("age", "not-a-number");

        let err = process(&mut form, &request).unwrap_err();
        assert_eq!(err.messages().len(), 2);
    }

    #[test]
    fn test_reprocessing_clears_previous_errors() {
        let mut form = form();
        process(&mut form, &PageParameters::new()).unwrap_err();

        let mut request = PageParameters::new();
        request.set("name", "Ada");
        process(&mut form, &request).unwrap();

        match form.kind() {
            ComponentKind::Form(state) => assert!(state.is_valid()),
            _ => unreachable!(),
        }
    }
}
