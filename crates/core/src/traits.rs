//! Service traits
//!
//! [`NotesApi`] is the seam between planning and the HTTP stack; [`Browser`]
//! is the seam to the DevTools endpoint. The adapter crate implements both and
//! tests mock them.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::request::{DownloadRequest, Request, UploadRequest};

/// Outcome of the liveness check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PingStatus {
    Ok,
    Error,
}

/// Structured liveness result; the check never fails
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PingReport {
    pub status: PingStatus,
    pub message: String,
    pub port: u16,
}

impl PingReport {
    pub fn ok(message: impl Into<String>, port: u16) -> Self {
        Self {
            status: PingStatus::Ok,
            message: message.into(),
            port,
        }
    }

    pub fn error(message: impl Into<String>, port: u16) -> Self {
        Self {
            status: PingStatus::Error,
            message: message.into(),
            port,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == PingStatus::Ok
    }
}

/// A finished download
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadOutcome {
    pub success: bool,
    /// Absolute path of the written file
    pub path: PathBuf,
    pub size_bytes: u64,
    pub size_human: String,
}

impl DownloadOutcome {
    pub fn new(path: PathBuf, size_bytes: u64) -> Self {
        Self {
            success: true,
            path,
            size_bytes,
            size_human: humansize::format_size(size_bytes, humansize::BINARY),
        }
    }
}

/// A DevTools target as listed by `/json/list`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tab {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(rename = "type", default = "default_tab_type")]
    pub kind: String,
    #[serde(
        rename = "webSocketDebuggerUrl",
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub web_socket_url: String,
}

fn default_tab_type() -> String {
    "page".to_string()
}

/// Notes API operations
///
/// Implemented by the HTTP adapter and mocked in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotesApi: Send + Sync {
    /// Perform one JSON request
    async fn call(&self, request: &Request) -> Result<Value>;

    /// Upload a local file as a multipart request
    async fn upload(&self, upload: &UploadRequest) -> Result<Value>;

    /// Stream a binary response into a local file
    async fn download(&self, download: &DownloadRequest) -> Result<DownloadOutcome>;

    /// Credential-free liveness check
    async fn ping(&self) -> PingReport;
}

/// Chrome DevTools operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Browser: Send + Sync {
    /// Debugging port, reported in status output
    fn port(&self) -> u16;

    /// `/json/version`
    async fn version(&self) -> Result<Value>;

    /// `/json/list`
    async fn tabs(&self) -> Result<Vec<Tab>>;

    /// Open a new tab
    async fn open(&self, url: &str) -> Result<Tab>;

    async fn activate(&self, id: &str) -> Result<()>;

    async fn close(&self, id: &str) -> Result<()>;

    /// Evaluate an expression in a tab and return its value
    async fn evaluate(&self, tab: &Tab, expression: &str) -> Result<Value>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ping_report_serialization() {
        let report = PingReport::error("Service not running", 41184);
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"status": "error", "message": "Service not running", "port": 41184})
        );
    }

    #[test]
    fn test_download_outcome_size_human() {
        let outcome = DownloadOutcome::new(PathBuf::from("/tmp/f.bin"), 2048);
        assert!(outcome.success);
        assert_eq!(outcome.size_human, "2 KiB");
    }

    #[test]
    fn test_tab_from_devtools_listing() {
        let tab: Tab = serde_json::from_value(serde_json::json!({
            "id": "ABC",
            "title": "Example",
            "url": "https://example.com/",
            "type": "page",
            "webSocketDebuggerUrl": "ws://localhost:9222/devtools/page/ABC"
        }))
        .unwrap();
        assert_eq!(tab.kind, "page");
        assert!(tab.web_socket_url.ends_with("/ABC"));

        let tab: Tab = serde_json::from_value(serde_json::json!({"id": "X"})).unwrap();
        assert_eq!(tab.kind, "page");
        assert!(tab.web_socket_url.is_empty());
    }
}
