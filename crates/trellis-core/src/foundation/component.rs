//! Component tree model.
//!
//! This module provides the building blocks of a page's user interface:
//!
//! - [`Component`] - a node in the tree rooted at a page
//! - [`ComponentKind`] - the tagged variant carrying each node's capability set
//! - [`ComponentPath`] - slash-separated addressing relative to the page root
//!
//! # Capability Sets, Not Class Hierarchies
//!
//! Instead of an inheritance chain (button extends form-component extends
//! component), every node is a plain [`Component`] whose [`ComponentKind`]
//! determines what it can do: whether it binds to a form, whether it accepts
//! a submit, which markup element it renders onto. Cross-cutting behavior is
//! attached through [`Behavior`] values rather than subclassing.

use std::convert::Infallible;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::MarkupError;
use crate::foundation::behavior::{Behavior, ClickFn};
use crate::foundation::markup::ComponentTag;

// ============================================================================
// Component Path
// ============================================================================

/// A slash-separated path addressing a component relative to its page root.
///
/// The empty path addresses the root component itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ComponentPath {
    segments: Vec<String>,
}

impl ComponentPath {
    /// The empty path, addressing the page's root component.
    pub fn root() -> Self {
        Self::default()
    }

    /// Builds a path from id segments.
    pub fn from_segments(segments: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns a new path with `id` appended.
    pub fn child(&self, id: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(id.into());
        Self { segments }
    }

    /// Returns the parent path, or `None` for the root path.
    pub fn parent(&self) -> Option<Self> {
        if self.segments.is_empty() {
            None
        } else {
            Some(Self {
                segments: self.segments[..self.segments.len() - 1].to_vec(),
            })
        }
    }

    /// The id segments of this path.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Returns `true` for the root path.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// The final segment, or `None` for the root path.
    pub fn leaf(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }
}

impl From<&str> for ComponentPath {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            return Self::root();
        }
        Self {
            segments: s.split('/').map(str::to_string).collect(),
        }
    }
}

impl FromStr for ComponentPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl std::fmt::Display for ComponentPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}

// ============================================================================
// Kind-specific State
// ============================================================================

/// Validator closure for a text field: returns the rejection message on
/// failure.
pub type ValidatorFn = Arc<dyn Fn(&str) -> Result<(), String> + Send + Sync>;

/// State of a form-bindable text input.
#[derive(Clone, Default)]
pub struct FieldState {
    /// The current model value, filled from request parameters on submit.
    value: Option<String>,
    /// Whether an empty submission is a validation error.
    required: bool,
    /// Optional custom validator, run after the required check.
    validator: Option<ValidatorFn>,
}

impl FieldState {
    /// Creates an empty, optional field.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the field as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Attaches a validator closure.
    pub fn validator(
        mut self,
        f: impl Fn(&str) -> Result<(), String> + Send + Sync + 'static,
    ) -> Self {
        self.validator = Some(Arc::new(f));
        self
    }

    /// The current model value.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Overwrites the model value.
    pub fn set_value(&mut self, value: Option<String>) {
        self.value = value;
    }

    /// Whether an empty submission is rejected.
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Runs the required check and the custom validator against `input`.
    pub fn validate(&self, id: &str, input: Option<&str>) -> Result<(), String> {
        let value = input.unwrap_or("");
        if self.required && value.is_empty() {
            return Err(format!("field '{id}' is required"));
        }
        if let Some(validator) = &self.validator
            && !value.is_empty()
        {
            validator(value)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for FieldState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldState")
            .field("value", &self.value)
            .field("required", &self.required)
            .field("has_validator", &self.validator.is_some())
            .finish()
    }
}

/// State of a form component: the errors recorded by the last submission.
#[derive(Debug, Clone, Default)]
pub struct FormState {
    errors: Vec<String>,
}

impl FormState {
    /// Creates a pristine form state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a validation error.
    pub fn record_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    /// Clears errors from a previous submission.
    pub fn clear_errors(&mut self) {
        self.errors.clear();
    }

    /// Errors recorded by the last submission, in discovery order.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Whether the last submission validated cleanly.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// State of a submit button: the optional explicit form binding.
#[derive(Debug, Clone, Default)]
pub struct ButtonState {
    bound_form: Option<ComponentPath>,
}

impl ButtonState {
    /// Creates a button with no explicit form binding.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds the button to the form at `path` instead of the nearest
    /// ancestor form.
    pub fn bound_to(path: ComponentPath) -> Self {
        Self {
            bound_form: Some(path),
        }
    }

    /// The explicitly bound form path, if any.
    pub fn bound_form(&self) -> Option<&ComponentPath> {
        self.bound_form.as_ref()
    }
}

/// State of a link: the click callback invoked when the component itself is
/// the listener target.
#[derive(Clone, Default)]
pub struct LinkState {
    on_click: Option<ClickFn>,
}

impl LinkState {
    /// Creates a link with no click callback.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the click callback.
    pub fn on_click(mut self, f: ClickFn) -> Self {
        self.on_click = Some(f);
        self
    }

    /// The click callback, if set.
    pub fn click_callback(&self) -> Option<&ClickFn> {
        self.on_click.as_ref()
    }
}

impl std::fmt::Debug for LinkState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkState")
            .field("has_on_click", &self.on_click.is_some())
            .finish()
    }
}

// ============================================================================
// Component Kind
// ============================================================================

/// The capability set of a component node.
#[derive(Debug, Clone)]
pub enum ComponentKind {
    /// A plain grouping node rendering onto a `div`.
    Container,
    /// A text node rendering onto a `span`.
    Label {
        /// The displayed text.
        text: String,
    },
    /// A form: collects form-bindable descendants on submit.
    Form(FormState),
    /// A form-bindable text input.
    TextField(FieldState),
    /// A form-bindable submit button.
    SubmitButton(ButtonState),
    /// A component that is itself a click-listener target.
    Link(LinkState),
}

impl ComponentKind {
    /// Convenience constructor for [`ComponentKind::Container`].
    pub fn container() -> Self {
        Self::Container
    }

    /// Convenience constructor for [`ComponentKind::Label`].
    pub fn label(text: impl Into<String>) -> Self {
        Self::Label { text: text.into() }
    }

    /// Convenience constructor for [`ComponentKind::Form`].
    pub fn form() -> Self {
        Self::Form(FormState::new())
    }

    /// Convenience constructor for [`ComponentKind::TextField`].
    pub fn text_field(state: FieldState) -> Self {
        Self::TextField(state)
    }

    /// Convenience constructor for [`ComponentKind::SubmitButton`].
    pub fn submit_button(state: ButtonState) -> Self {
        Self::SubmitButton(state)
    }

    /// Convenience constructor for [`ComponentKind::Link`].
    pub fn link(state: LinkState) -> Self {
        Self::Link(state)
    }

    /// The markup element this kind renders onto.
    fn element(&self) -> &'static str {
        match self {
            Self::Container => "div",
            Self::Label { .. } => "span",
            Self::Form(_) => "form",
            Self::TextField(_) | Self::SubmitButton(_) => "input",
            Self::Link(_) => "a",
        }
    }

    /// Whether this kind renders a void element.
    fn is_void_element(&self) -> bool {
        matches!(self, Self::TextField(_) | Self::SubmitButton(_))
    }
}

// ============================================================================
// Component
// ============================================================================

/// A node in the component tree rooted at a page.
///
/// Components carry a string id (unique among siblings), a capability set,
/// child components, attached behaviors, and extra markup attributes.
#[derive(Debug, Clone)]
pub struct Component {
    id: String,
    kind: ComponentKind,
    children: Vec<Component>,
    behaviors: Vec<Behavior>,
    attributes: Vec<(String, String)>,
    output_markup_id: bool,
}

impl Component {
    /// Creates a component with the given id and kind.
    pub fn new(id: impl Into<String>, kind: ComponentKind) -> Self {
        Self {
            id: id.into(),
            kind,
            children: Vec::new(),
            behaviors: Vec::new(),
            attributes: Vec::new(),
            output_markup_id: false,
        }
    }

    /// Adds a child (builder pattern).
    pub fn with(mut self, child: Component) -> Self {
        self.children.push(child);
        self
    }

    /// Sets a markup attribute (builder pattern).
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Attaches a behavior (builder pattern).
    pub fn with_behavior(mut self, behavior: Behavior) -> Self {
        self.behaviors.push(behavior);
        self
    }

    /// The component id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The capability set.
    pub fn kind(&self) -> &ComponentKind {
        &self.kind
    }

    /// Mutable access to the capability set.
    pub fn kind_mut(&mut self) -> &mut ComponentKind {
        &mut self.kind
    }

    /// The child components.
    pub fn children(&self) -> &[Component] {
        &self.children
    }

    /// Appends a child component.
    pub fn add(&mut self, child: Component) {
        self.children.push(child);
    }

    /// Attaches a behavior and returns its stable index.
    ///
    /// Behaviors are never removed by this core, so the index remains valid
    /// for the lifetime of the component and is safe to embed in URLs.
    pub fn attach(&mut self, behavior: Behavior) -> usize {
        self.behaviors.push(behavior);
        self.behaviors.len() - 1
    }

    /// The behavior at `index`, if attached.
    pub fn behavior(&self, index: usize) -> Option<&Behavior> {
        self.behaviors.get(index)
    }

    /// All attached behaviors in attachment order.
    pub fn behaviors(&self) -> &[Behavior] {
        &self.behaviors
    }

    /// Whether this component is a form.
    pub fn is_form(&self) -> bool {
        matches!(self.kind, ComponentKind::Form(_))
    }

    /// Whether this component participates in form submission.
    pub fn is_form_bindable(&self) -> bool {
        matches!(
            self.kind,
            ComponentKind::TextField(_) | ComponentKind::SubmitButton(_)
        )
    }

    /// Whether the markup id is emitted so the client can address this
    /// component in partial updates.
    pub fn outputs_markup_id(&self) -> bool {
        self.output_markup_id
    }

    /// Controls markup id emission.
    pub fn set_output_markup_id(&mut self, enabled: bool) {
        self.output_markup_id = enabled;
    }

    /// Resolves a descendant by path. The empty path resolves to `self`.
    pub fn find(&self, path: &ComponentPath) -> Option<&Component> {
        let mut current = self;
        for segment in path.segments() {
            current = current.children.iter().find(|c| c.id == *segment)?;
        }
        Some(current)
    }

    /// Mutable variant of [`find`](Self::find).
    pub fn find_mut(&mut self, path: &ComponentPath) -> Option<&mut Component> {
        let mut current = self;
        for segment in path.segments() {
            current = current.children.iter_mut().find(|c| c.id == *segment)?;
        }
        Some(current)
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    /// Builds the open tag for this component from its kind and attributes.
    pub fn open_tag(&self) -> ComponentTag {
        let mut tag = ComponentTag::new(self.kind.element());
        if self.output_markup_id {
            tag.set_attribute("id", &self.id);
        }
        match &self.kind {
            ComponentKind::TextField(field) => {
                tag.set_attribute("type", "text");
                tag.set_attribute("name", &self.id);
                if let Some(value) = field.value() {
                    tag.set_attribute("value", value);
                }
            }
            ComponentKind::SubmitButton(_) => {
                tag.set_attribute("type", "submit");
            }
            _ => {}
        }
        for (name, value) in &self.attributes {
            tag.set_attribute(name, value);
        }
        tag
    }

    /// Validates the tag this component is about to render onto.
    ///
    /// Submit buttons reject any tag whose `type` is not one of `submit`,
    /// `button` or `image`; form-bindable components reject non-`input`
    /// elements; forms reject non-`form` elements.
    pub fn accept_tag(&self, tag: &ComponentTag) -> Result<(), MarkupError> {
        match &self.kind {
            ComponentKind::Form(_) if tag.name() != "form" => Err(MarkupError::ElementMismatch {
                component: self.id.clone(),
                expected: "form",
                found: tag.name().to_string(),
            }),
            ComponentKind::TextField(_) if tag.name() != "input" => {
                Err(MarkupError::ElementMismatch {
                    component: self.id.clone(),
                    expected: "input",
                    found: tag.name().to_string(),
                })
            }
            ComponentKind::SubmitButton(_) => {
                if tag.name() != "input" {
                    return Err(MarkupError::ElementMismatch {
                        component: self.id.clone(),
                        expected: "input",
                        found: tag.name().to_string(),
                    });
                }
                let type_attr = tag.get_attribute("type").unwrap_or("");
                match type_attr {
                    "submit" | "button" | "image" => Ok(()),
                    other => Err(MarkupError::TypeMismatch {
                        component: self.id.clone(),
                        type_attr: other.to_string(),
                    }),
                }
            }
            _ => Ok(()),
        }
    }

    /// Renders this component and its subtree as markup.
    ///
    /// The open tag is validated through [`accept_tag`](Self::accept_tag)
    /// before emission, so a submit button carrying a `type="text"` attribute
    /// fails here rather than producing broken markup.
    pub fn render(&self) -> Result<String, MarkupError> {
        let tag = self.open_tag();
        self.accept_tag(&tag)?;

        let mut out = tag.render_open(self.kind.is_void_element());
        if self.kind.is_void_element() {
            return Ok(out);
        }
        if let ComponentKind::Label { text } = &self.kind {
            out.push_str(&crate::foundation::markup::escape_attribute(text));
        }
        for child in &self.children {
            out.push_str(&child.render()?);
        }
        out.push_str("</");
        out.push_str(self.kind.element());
        out.push('>');
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> Component {
        Component::new("root", ComponentKind::container()).with(
            Component::new("form", ComponentKind::form())
                .with(Component::new(
                    "name",
                    ComponentKind::text_field(FieldState::new().required()),
                ))
                .with(Component::new(
                    "go",
                    ComponentKind::submit_button(ButtonState::new()),
                )),
        )
    }

    #[test]
    fn test_find_by_path() {
        let root = tree();
        let path: ComponentPath = "form/name".parse().unwrap();

        let field = root.find(&path).unwrap();
        assert_eq!(field.id(), "name");
        assert!(field.is_form_bindable());
    }

    #[test]
    fn test_find_root_with_empty_path() {
        let root = tree();
        assert_eq!(root.find(&ComponentPath::root()).unwrap().id(), "root");
    }

    #[test]
    fn test_find_stale_path_returns_none() {
        let root = tree();
        let path: ComponentPath = "form/removed".parse().unwrap();
        assert!(root.find(&path).is_none());
    }

    #[test]
    fn test_behavior_indices_are_stable() {
        use crate::foundation::behavior::Behavior;
        use crate::listener::SUBMIT;

        let mut button = Component::new("go", ComponentKind::submit_button(ButtonState::new()));
        let first = button.attach(Behavior::new("a", SUBMIT.clone(), "click"));
        let second = button.attach(Behavior::new("b", SUBMIT.clone(), "click"));

        assert_eq!((first, second), (0, 1));
        assert_eq!(button.behavior(0).unwrap().name(), "a");
        assert_eq!(button.behavior(1).unwrap().name(), "b");
        assert!(button.behavior(2).is_none());
    }

    #[test]
    fn test_submit_button_accepts_submit_button_image_types() {
        for ty in ["submit", "button", "image"] {
            let button = Component::new("go", ComponentKind::submit_button(ButtonState::new()))
                .with_attribute("type", ty);
            assert!(button.render().is_ok(), "type '{ty}' should be accepted");
        }
    }

    #[test]
    fn test_submit_button_rejects_text_type() {
        let button = Component::new("go", ComponentKind::submit_button(ButtonState::new()))
            .with_attribute("type", "text");

        let err = button.render().unwrap_err();
        match err {
            MarkupError::TypeMismatch {
                component,
                type_attr,
            } => {
                assert_eq!(component, "go");
                assert_eq!(type_attr, "text");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_render_nests_children() {
        let root = Component::new("root", ComponentKind::container())
            .with(Component::new("hello", ComponentKind::label("Hi")));

        assert_eq!(root.render().unwrap(), "<div><span>Hi</span></div>");
    }

    #[test]
    fn test_markup_id_emitted_when_enabled() {
        let mut form = Component::new("form", ComponentKind::form());
        form.set_output_markup_id(true);

        assert!(form.render().unwrap().starts_with("<form id=\"form\">"));
    }
}
