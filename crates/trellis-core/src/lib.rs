//! # Trellis Core
//!
//! The core page and component model of the Trellis web framework.
//!
//! This crate provides the fundamental building blocks shared by the request
//! handling and runtime layers: the component tree, page identity, listener
//! interfaces, and the error taxonomy of the data model.
//!
//! ## Architecture Layers
//!
//! Trellis is organized into three crates, of which this is the lowest:
//!
//! ### Foundation Layer (this crate)
//!
//! Core value types:
//! - **Component Tree**: Capability-set nodes with behavior attachment
//!   ([`Component`], [`ComponentKind`], [`Behavior`])
//! - **Page Identity**: Class, instance id, parameters, versioning
//!   ([`Page`], [`PageClass`], [`PageParameters`])
//! - **Listener Interfaces**: Named callback contracts with a static
//!   registry ([`RequestListenerInterface`], [`ListenerRegistry`])
//!
//! ### Framework Layer (`trellis-framework`)
//!
//! Providers, request-handler variants, form processing, AJAX behaviors.
//!
//! ### Runtime Layer (`trellis-runtime`)
//!
//! Request cycle, session page store, URL mapper, configuration, logging.
//!
//! ## Addressing Model
//!
//! Every listener target is identified by the tuple
//! `(page class, page parameters, component path, listener name,
//! behavior index or none)`. The tuple is complete and stable: encoding it
//! into a URL and decoding it back yields an equivalent, re-resolvable
//! target. That round trip is the correctness contract of the whole layer.

pub mod error;
pub mod foundation;
pub mod listener;

pub use error::{ListenerError, ListenerResult, MarkupError, MarkupResult};
pub use foundation::{
    AjaxRequestTarget, Behavior, BehaviorCallbacks, ButtonState, ClickFn, Component, ComponentKind,
    ComponentPath, ComponentTag, DecorateFn, FieldState, FormState, LinkState, Page,
    PageClass, PageId, PageParameters, SessionId, SubmitFn, ValidatorFn,
};
pub use listener::{CLICK, LISTENER_INTERFACES, ListenerRegistry, RequestListenerInterface, SUBMIT};

// Re-exported for downstream crates that contribute listener interfaces via
// the distributed slice.
pub use linkme;
