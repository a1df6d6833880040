//! Error types for the Trellis request-handling layer.

use thiserror::Error;

use trellis_core::{MarkupError, PageId};

/// Errors raised while resolving a request target to live objects.
///
/// These are request-scoped: the request cycle recovers them into a
/// user-visible response (expired-page redirect, 404-equivalent) instead of
/// failing the server.
#[derive(Debug, Clone, Error)]
pub enum ResolveError {
    /// The referenced page instance is no longer in the session store.
    #[error("page '{page}' has expired from the session store")]
    PageExpired {
        /// The id that missed.
        page: PageId,
    },

    /// The component path no longer matches the page's tree.
    #[error("no component at path '{path}'")]
    ComponentNotFound {
        /// The stale path.
        path: String,
    },

    /// No behavior answers the requested listener at this index.
    #[error("no behavior for listener '{listener}' at index {index} on component '{path}'")]
    BehaviorNotFound {
        /// Path of the component the behavior was looked up on.
        path: String,
        /// The requested behavior index.
        index: usize,
        /// The requested listener name.
        listener: String,
    },

    /// The component does not answer the requested listener.
    #[error("component '{path}' does not answer listener '{listener}'")]
    ListenerNotSupported {
        /// Path of the component.
        path: String,
        /// The requested listener name.
        listener: String,
    },

    /// No page constructor is registered under this class name.
    #[error("unknown page class '{class}'")]
    UnknownPageClass {
        /// The unregistered class name.
        class: String,
    },
}

/// Errors raised by request handlers.
///
/// Unlike [`ResolveError`], the `InvalidArgument` and `Markup` variants
/// indicate programmer error or a template bug and propagate unrecovered.
#[derive(Debug, Clone, Error)]
pub enum HandlerError {
    /// Construction-time contract violation. Fail fast.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Resolution failed; recoverable at the request-cycle boundary.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Rendering hit a markup/component mismatch.
    #[error(transparent)]
    Markup(#[from] MarkupError),
}

/// Result type for resolution operations.
pub type ResolveResult<T> = Result<T, ResolveError>;

/// Result type for handler operations.
pub type HandlerResult<T> = Result<T, HandlerError>;
