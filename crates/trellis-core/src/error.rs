//! Unified error types for the Trellis core model.
//!
//! Request-resolution errors (expired pages, stale component paths) are
//! defined in trellis-framework; this module covers the errors the data
//! model itself can produce.

use thiserror::Error;

// =============================================================================
// Markup Errors
// =============================================================================

/// Errors raised while rendering a component onto its markup tag.
///
/// These indicate a template bug and are fatal to the request: they are never
/// recovered into a user-visible response.
#[derive(Debug, Clone, Error)]
pub enum MarkupError {
    /// The tag's element name does not match what the component requires.
    #[error("component '{component}' must be attached to a '{expected}' tag, not '{found}'")]
    ElementMismatch {
        /// Id of the offending component.
        component: String,
        /// Required element name.
        expected: &'static str,
        /// Element name found in the markup.
        found: String,
    },

    /// The tag's `type` attribute is not one the component accepts.
    #[error(
        "component '{component}' must be attached to a tag with 'type' of 'submit', 'button' or 'image', not '{type_attr}'"
    )]
    TypeMismatch {
        /// Id of the offending component.
        component: String,
        /// The rejected `type` attribute value.
        type_attr: String,
    },
}

// =============================================================================
// Listener Errors
// =============================================================================

/// Errors from the listener-interface registry.
#[derive(Debug, Clone, Error)]
pub enum ListenerError {
    /// A listener interface with this name is already registered.
    #[error("listener interface '{name}' is already registered")]
    Duplicate {
        /// The conflicting interface name.
        name: String,
    },

    /// No listener interface with this name is registered.
    #[error("unknown listener interface '{name}'")]
    Unknown {
        /// The missing interface name.
        name: String,
    },
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for markup operations.
pub type MarkupResult<T> = Result<T, MarkupError>;

/// Result type for listener registry operations.
pub type ListenerResult<T> = Result<T, ListenerError>;
