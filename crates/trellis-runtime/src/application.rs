//! The application: registries, store, mapper, and request processing.
//!
//! [`Application`] wires the page class registry, listener registry, session
//! page store, and URL mapper together, and drives each incoming request
//! through decoding, handler construction, and the request cycle.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use trellis_runtime::Application;
//!
//! let app = Application::builder().build()?;
//! let checkout = app.mount_page("checkout", |params| build_checkout_page(params));
//!
//! let response = app
//!     .respond(&session, "/app/checkout", PageParameters::new())
//!     .await?;
//! ```

use std::convert::Infallible;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::future::BoxFuture;
use serde_json::json;
use tower::Service;
use tracing::info;

use trellis_core::{
    ComponentPath, ListenerRegistry, Page, PageClass, PageParameters, RequestListenerInterface,
    SessionId,
};
use trellis_framework::{
    AjaxUpdate, BookmarkableListenerHandler, ComponentRequestHandler, ListenerHandler,
    PageAndComponentProvider, PageProvider, PageRequestHandler, PageSource, RenderPageHandler,
    RequestContext, Response,
};

use crate::config::{ConfigLoader, ConfigResult, TrellisConfig};
use crate::cycle::{CycleOutcome, RequestCycle};
use crate::error::RuntimeResult;
use crate::logging;
use crate::mapper::{DecodedRequest, ListenerTuple, Url, UrlMapper};
use crate::registry::PageClassRegistry;
use crate::store::SessionPageStore;

// =============================================================================
// Requests and Responses
// =============================================================================

/// One incoming request, as handed over by the HTTP container.
#[derive(Debug, Clone)]
pub struct AppRequest {
    /// The requesting session.
    pub session: SessionId,
    /// The raw request URL (path + query).
    pub url: String,
    /// Submitted query/post parameters.
    pub parameters: PageParameters,
}

/// The user-visible outcome of one processed request.
#[derive(Debug, Clone)]
pub enum AppResponse {
    /// A full page render.
    Markup(String),
    /// An AJAX partial update.
    Ajax(AjaxUpdate),
    /// Redirect to `location` (e.g. after a page expired).
    Redirect(String),
    /// 404-equivalent: the target could not be resolved.
    NotFound(String),
    /// Nothing to send.
    Empty,
}

impl AppResponse {
    /// Renders the response body the client runtime consumes.
    ///
    /// Partial updates are serialized as a JSON envelope of markup fragments
    /// and follow-up scripts.
    pub fn body(&self) -> String {
        match self {
            Self::Markup(markup) => markup.clone(),
            Self::Ajax(update) => {
                let fragments: Vec<_> = update
                    .fragments
                    .iter()
                    .map(|f| json!({ "path": f.path.to_string(), "markup": f.markup }))
                    .collect();
                json!({ "fragments": fragments, "scripts": update.scripts }).to_string()
            }
            Self::Redirect(location) => location.clone(),
            Self::NotFound(reason) => reason.clone(),
            Self::Empty => String::new(),
        }
    }
}

// =============================================================================
// Application
// =============================================================================

struct AppInner {
    config: TrellisConfig,
    pages: Arc<PageClassRegistry>,
    listeners: Arc<ListenerRegistry>,
    store: Arc<SessionPageStore>,
    mapper: UrlMapper,
}

/// The assembled Trellis application.
///
/// Cheap to clone; all state is shared.
#[derive(Clone)]
pub struct Application {
    inner: Arc<AppInner>,
}

impl Application {
    /// Creates a builder for custom configuration.
    pub fn builder() -> ApplicationBuilder {
        ApplicationBuilder::new()
    }

    /// Creates an application from configuration.
    ///
    /// Initializes logging from the configuration (idempotent) and builds
    /// the registries, store, and mapper.
    pub fn from_config(config: &TrellisConfig) -> Self {
        logging::init_from_config(&config.logging);

        let pages = Arc::new(PageClassRegistry::new());
        let listeners = Arc::new(ListenerRegistry::collect_all());
        let store = Arc::new(SessionPageStore::new(
            Arc::clone(&pages),
            config.store.max_pages_per_session,
        ));
        let mapper = UrlMapper::new(config.application.mount_path.clone());

        info!(
            mount = %config.application.mount_path,
            listeners = listeners.len(),
            store_capacity = store.capacity(),
            "Application initialized"
        );

        Self {
            inner: Arc::new(AppInner {
                config: config.clone(),
                pages,
                listeners,
                store,
                mapper,
            }),
        }
    }

    /// The application configuration.
    pub fn config(&self) -> &TrellisConfig {
        &self.inner.config
    }

    /// The listener interface registry.
    pub fn listeners(&self) -> &ListenerRegistry {
        &self.inner.listeners
    }

    /// The session page store.
    pub fn store(&self) -> &SessionPageStore {
        &self.inner.store
    }

    /// Registers a page class, returning its class token.
    pub fn mount_page(
        &self,
        name: impl Into<String>,
        constructor: impl Fn(&PageParameters) -> Page + Send + Sync + 'static,
    ) -> PageClass {
        self.inner.pages.register(name, constructor)
    }

    /// Generates a bookmarkable page URL.
    pub fn page_url(&self, class: &PageClass, parameters: &PageParameters) -> String {
        self.inner.mapper.encode_page(class, parameters).render()
    }

    /// Generates a bookmarkable listener URL.
    ///
    /// Builds the URL-generation-only handler for the target and feeds its
    /// identifying tuple to the encoder; the page is never materialized, and
    /// the handler is detached once the URL is rendered.
    pub fn listener_url(
        &self,
        class: &PageClass,
        parameters: &PageParameters,
        component: impl Into<String>,
        listener: &str,
        behavior_index: Option<usize>,
    ) -> RuntimeResult<String> {
        let listener: RequestListenerInterface = self.inner.listeners.lookup(listener)?;
        let component: String = component.into();
        let provider = PageAndComponentProvider::new(
            PageProvider::bookmarkable(class.clone(), parameters.clone()),
            ComponentPath::from(component.as_str()),
        );
        let handler = BookmarkableListenerHandler::new(provider, listener, behavior_index)?;

        let tuple = ListenerTuple {
            class: handler.page_class().clone(),
            parameters: handler.page_parameters().clone(),
            component: handler.component_path().clone(),
            listener: handler.listener_interface().name().to_string(),
            behavior_index: handler.behavior_index(),
            page_id: None,
        };
        let url = self.inner.mapper.encode_listener(&tuple)?;

        let ctx = self.request_context(SessionId::new("url-generation"), PageParameters::new());
        trellis_framework::RequestHandler::detach(&handler, &ctx);
        Ok(url.render())
    }

    /// Processes one request end to end.
    ///
    /// Decodes the URL, builds the matching handler, runs the request cycle,
    /// and maps recoverable resolution failures to redirect/not-found
    /// responses. Non-recoverable failures (construction contract
    /// violations, markup bugs) propagate as errors.
    pub async fn respond(
        &self,
        session: &SessionId,
        raw_url: &str,
        parameters: PageParameters,
    ) -> RuntimeResult<AppResponse> {
        let url = Url::parse(raw_url)?;
        let decoded = self.inner.mapper.decode(&url, &self.inner.listeners)?;
        let cycle = RequestCycle::new(self.request_context(session.clone(), parameters));

        match decoded {
            DecodedRequest::Render { class, parameters } => {
                let handler =
                    RenderPageHandler::new(PageProvider::bookmarkable(class, parameters));
                let outcome = cycle.process(&handler).await?;
                Ok(self.finish(outcome, || "/".to_string()))
            }
            DecodedRequest::Listener(tuple) => {
                let page_provider = match tuple.page_id {
                    Some(id) => {
                        PageProvider::stored(id, tuple.class.clone(), tuple.parameters.clone())
                    }
                    None => {
                        PageProvider::bookmarkable(tuple.class.clone(), tuple.parameters.clone())
                    }
                };
                let provider =
                    PageAndComponentProvider::new(page_provider, tuple.component.clone());
                let listener = self.inner.listeners.lookup(&tuple.listener)?;
                let handler = ListenerHandler::new(provider, listener, tuple.behavior_index)?;

                let outcome = cycle.process(&handler).await?;
                Ok(self.finish(outcome, || {
                    // An expired stateful target falls back to a fresh
                    // bookmarkable render of the same page.
                    self.page_url(&tuple.class, &tuple.parameters)
                }))
            }
        }
    }

    fn request_context(&self, session: SessionId, parameters: PageParameters) -> RequestContext {
        let source: Arc<dyn PageSource> = Arc::clone(&self.inner.store) as Arc<dyn PageSource>;
        RequestContext::new(session, source, parameters)
    }

    fn finish(&self, outcome: CycleOutcome, expired_location: impl FnOnce() -> String) -> AppResponse {
        match outcome {
            CycleOutcome::Completed(Response::Page(markup)) => AppResponse::Markup(markup),
            CycleOutcome::Completed(Response::Ajax(update)) => AppResponse::Ajax(update),
            CycleOutcome::Completed(Response::None) => AppResponse::Empty,
            CycleOutcome::Expired => AppResponse::Redirect(expired_location()),
            CycleOutcome::NotFound(reason) => AppResponse::NotFound(reason),
        }
    }
}

impl std::fmt::Debug for Application {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Application")
            .field("mount", &self.inner.mapper.mount())
            .field("store", &self.inner.store)
            .finish()
    }
}

// =============================================================================
// Tower Service Integration
// =============================================================================

/// Tower `Service` over an [`Application`], so middleware (timeouts, load
/// limits) can wrap request processing.
///
/// Recoverable failures surface inside [`AppResponse`]; the service error
/// channel stays [`Infallible`] and non-recoverable handler failures are
/// rendered as a not-found body with the failure reason, matching what the
/// surrounding container would do at its error boundary.
///
/// ```rust,ignore
/// use tower::ServiceBuilder;
/// use tower::timeout::TimeoutLayer;
///
/// let service = ServiceBuilder::new()
///     .layer(TimeoutLayer::new(Duration::from_secs(5)))
///     .service(ApplicationService::new(app));
/// ```
#[derive(Clone)]
pub struct ApplicationService {
    app: Application,
}

impl ApplicationService {
    /// Wraps an application.
    pub fn new(app: Application) -> Self {
        Self { app }
    }
}

impl Service<AppRequest> for ApplicationService {
    type Response = AppResponse;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: AppRequest) -> Self::Future {
        let app = self.app.clone();
        Box::pin(async move {
            match app
                .respond(&request.session, &request.url, request.parameters)
                .await
            {
                Ok(response) => Ok(response),
                Err(error) => Ok(AppResponse::NotFound(error.to_string())),
            }
        })
    }
}

// =============================================================================
// ApplicationBuilder
// =============================================================================

/// Builder assembling an [`Application`] from configuration sources and
/// page registrations.
///
/// ```rust,ignore
/// let app = Application::builder()
///     .config_file("config/trellis.toml")
///     .profile("production")
///     .build()?;
/// ```
pub struct ApplicationBuilder {
    loader: ConfigLoader,
}

impl ApplicationBuilder {
    /// Creates a builder searching the current directory for configuration.
    pub fn new() -> Self {
        Self {
            loader: ConfigLoader::new().with_current_dir(),
        }
    }

    /// Loads a specific configuration file.
    pub fn config_file<P: AsRef<std::path::Path>>(mut self, path: P) -> Self {
        self.loader = self.loader.file(path);
        self
    }

    /// Sets the configuration profile.
    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.loader = self.loader.profile(profile);
        self
    }

    /// Merges programmatic configuration overrides.
    pub fn merge(mut self, config: TrellisConfig) -> Self {
        self.loader = self.loader.merge(config);
        self
    }

    /// Disables environment variable configuration.
    pub fn without_env(mut self) -> Self {
        self.loader = self.loader.without_env();
        self
    }

    /// Loads configuration and builds the application.
    pub fn build(self) -> ConfigResult<Application> {
        let config = self.loader.load()?;
        Ok(Application::from_config(&config))
    }
}

impl Default for ApplicationBuilder {
    fn default() -> Self {
        Self::new()
    }
}
