//! # Trellis Runtime
//!
//! The orchestration layer of the Trellis web framework.
//!
//! This crate turns the request-handling primitives of `trellis-framework`
//! into a running application:
//!
//! - **Request Cycle**: [`RequestCycle`] drives respond-once/detach-once
//!   through every handler and recovers resolution failures into
//!   user-visible outcomes.
//! - **Session Page Store**: [`SessionPageStore`] keeps stateful pages per
//!   session with count-bounded LRU eviction.
//! - **URL Mapper**: [`UrlMapper`] encodes and decodes the identifying
//!   tuple of every listener target.
//! - **Application**: [`Application`] wires registries, store, and mapper
//!   together; [`ApplicationService`] exposes it as a Tower `Service`.
//! - **Configuration & Logging**: figment-based layered configuration and
//!   config-driven `tracing` setup.
//!
//! ## Request Flow
//!
//! ```text
//! ┌───────────┐    ┌───────────┐    ┌───────────────┐    ┌──────────────┐
//! │ container │───▶│ UrlMapper │───▶│ RequestCycle  │───▶│ page store   │
//! │ (extern)  │    │  decode   │    │ respond/detach│    │ (per session)│
//! └───────────┘    └───────────┘    └───────────────┘    └──────────────┘
//! ```

pub mod application;
pub mod config;
pub mod cycle;
pub mod error;
pub mod logging;
pub mod mapper;
pub mod registry;
pub mod store;

pub use application::{AppRequest, AppResponse, Application, ApplicationBuilder, ApplicationService};
pub use config::{ConfigError, ConfigLoader, ConfigResult, TrellisConfig};
pub use cycle::{CycleOutcome, RequestCycle};
pub use error::{MapperError, MapperResult, RuntimeError, RuntimeResult};
pub use mapper::{DecodedRequest, ListenerTuple, Url, UrlMapper};
pub use registry::{PageClassRegistry, PageConstructor};
pub use store::SessionPageStore;
