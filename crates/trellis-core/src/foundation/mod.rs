//! Foundation layer - the page and component data model.
//!
//! This module contains the framework's core value types:
//! - Component tree with capability-set kinds and behavior attachment
//! - Page identity (class, instance id, session id) and versioning
//! - Ordered page parameters for bookmarkable construction
//! - Markup tag model and the partial-update target

pub mod behavior;
pub mod component;
pub mod markup;
pub mod page;
pub mod parameters;
pub mod target;

pub use behavior::{Behavior, BehaviorCallbacks, ClickFn, DecorateFn, SubmitFn};
pub use component::{
    ButtonState, Component, ComponentKind, ComponentPath, FieldState, FormState, LinkState,
    ValidatorFn,
};
pub use markup::ComponentTag;
pub use page::{Page, PageClass, PageId, SessionId};
pub use parameters::PageParameters;
pub use target::AjaxRequestTarget;
