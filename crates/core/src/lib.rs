//! clip-core: Core library for the clip notes API client
//!
//! This crate provides the core functionality for the clip CLI, including:
//! - Configuration loading and resolution
//! - Command routing and typed options
//! - Query string and request planning
//! - NotesApi and Browser traits, and plan dispatch
//!
//! This crate is independent of any HTTP client, so planning and dispatch can
//! be tested without a server.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod options;
pub mod query;
pub mod request;
pub mod router;
pub mod traits;

pub use config::{BrowserConfig, ClientConfig, ConfigManager, Credential, Overrides, Settings};
pub use dispatch::dispatch;
pub use error::{Error, Result};
pub use options::Options;
pub use query::QueryParams;
pub use request::{BrowserAction, DownloadRequest, Method, Plan, Request, UploadRequest, plan};
pub use router::{Collection, Command, Invocation, Operation, route};
pub use traits::{Browser, DownloadOutcome, NotesApi, PingReport, PingStatus, Tab};
