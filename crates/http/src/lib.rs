//! clip-http: HTTP and DevTools adapter for clip
//!
//! This crate implements the `NotesApi` and `Browser` traits from `clip-core`
//! using reqwest for HTTP and tokio-tungstenite for the DevTools WebSocket.

pub mod cdp;
pub mod client;
pub mod devtools;
pub mod multipart;

pub use client::ApiClient;
pub use devtools::DevToolsClient;
pub use multipart::MultipartBody;
