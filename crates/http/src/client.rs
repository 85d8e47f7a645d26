//! Notes API client implementation
//!
//! [`ApiClient`] implements [`NotesApi`] over plain HTTP with reqwest. Every
//! request except the liveness check carries the `token` query parameter.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use clip_core::{
    ClientConfig, Credential, DownloadOutcome, DownloadRequest, Error, Method, NotesApi,
    PingReport, QueryParams, Request, Result, UploadRequest,
};
use futures::StreamExt;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Client, Response};
use serde_json::{Value, json};
use tokio::io::AsyncWriteExt;
use url::Url;

use crate::multipart::{MultipartBody, guess_mime};

/// HTTP client for the notes API
pub struct ApiClient {
    http_client: Client,
    base_url: Url,
    token: Option<Credential>,
    identity: String,
    ping_timeout: Duration,
    port: u16,
}

impl ApiClient {
    /// Create a client from the resolved configuration
    ///
    /// The token is only checked when a request needs it, so `ping` works
    /// without one.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let http_client = Client::builder()
            .no_proxy()
            .build()
            .map_err(|e| Error::Transport(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            base_url: config.base_url()?,
            token: config.token.clone(),
            identity: config.identity.clone(),
            ping_timeout: config.ping_timeout,
            port: config.port,
        })
    }

    fn credential(&self) -> Result<&Credential> {
        self.token.as_ref().ok_or(Error::MissingCredential)
    }

    /// Full URL for a request; the token, when given, is appended last
    fn url_for(
        &self,
        segments: &[String],
        query: &QueryParams,
        token: Option<&Credential>,
    ) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::Config(format!("Base URL cannot carry a path: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);

        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        serializer.extend_pairs(query.pairs());
        if let Some(token) = token {
            serializer.append_pair("token", token.expose());
        }
        let query_string = serializer.finish();
        url.set_query((!query_string.is_empty()).then_some(query_string.as_str()));

        Ok(url)
    }

    async fn send(&self, request: &Request) -> Result<Response> {
        let token = self.credential()?;
        let url = self.url_for(&request.segments, &request.query, Some(token))?;
        tracing::debug!(method = request.method.as_str(), path = %request.path(), "Sending request");

        let mut builder = self.http_client.request(http_method(request.method), url);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        builder.send().await.map_err(transport)
    }
}

#[async_trait]
impl NotesApi for ApiClient {
    async fn call(&self, request: &Request) -> Result<Value> {
        let response = self.send(request).await?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(transport)?;
        tracing::debug!(status, bytes = text.len(), "Received response");
        interpret(status, &text)
    }

    async fn upload(&self, upload: &UploadRequest) -> Result<Value> {
        let token = self.credential()?;

        let data = tokio::fs::read(&upload.file).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::FileNotFound(upload.file.clone())
            } else {
                Error::Io(e)
            }
        })?;
        let file_name = upload
            .file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "file".to_string());

        let body = MultipartBody::build(
            &upload.props,
            &file_name,
            &guess_mime(&upload.file),
            &data,
        )?;
        let url = self.url_for(&upload.segments, &QueryParams::default(), Some(token))?;
        tracing::debug!(file = %file_name, bytes = body.len(), "Sending multipart upload");

        let response = self
            .http_client
            .post(url)
            .header(CONTENT_TYPE, body.content_type())
            .header(CONTENT_LENGTH, body.len())
            .body(body.into_bytes())
            .send()
            .await
            .map_err(transport)?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(transport)?;
        interpret(status, &text)
    }

    async fn download(&self, download: &DownloadRequest) -> Result<DownloadOutcome> {
        let response = self.send(&download.request).await?;

        let status = response.status().as_u16();
        if status >= 400 {
            return Err(Error::from_response(status, &error_body(response).await));
        }

        let path = std::path::absolute(&download.output)?;
        match write_stream(response, &path).await {
            Ok(size) => Ok(DownloadOutcome::new(path, size)),
            Err(e) => {
                if let Err(remove_err) = tokio::fs::remove_file(&path).await {
                    tracing::warn!(path = %path.display(), error = %remove_err, "Failed to remove partial download");
                }
                Err(e)
            }
        }
    }

    async fn ping(&self) -> PingReport {
        let port = self.port;
        let attempt = async {
            let url = self.url_for(&["ping".to_string()], &QueryParams::default(), None)?;
            let response = self.http_client.get(url).send().await.map_err(transport)?;
            response.text().await.map_err(transport)
        };

        let outcome = tokio::select! {
            result = attempt => result,
            () = tokio::time::sleep(self.ping_timeout) => Err(Error::Transport(format!(
                "no answer within {}ms",
                self.ping_timeout.as_millis()
            ))),
        };

        match outcome {
            Ok(body) if body == self.identity => PingReport::ok(body, port),
            Ok(body) => PingReport::error(
                format!("Unexpected response from port {port}: {body}"),
                port,
            ),
            Err(e) => PingReport::error(
                format!("Service not running or unreachable on port {port}: {e}"),
                port,
            ),
        }
    }
}

/// Turn a status and body into the printable value
///
/// Empty 2xx bodies become `{}` and non-JSON bodies become a JSON string.
pub fn interpret(status: u16, body: &str) -> Result<Value> {
    if status >= 400 {
        return Err(Error::from_response(status, body));
    }
    if body.trim().is_empty() {
        return Ok(json!({}));
    }
    Ok(serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string())))
}

/// Body of an error response, or the status reason when the body cannot be read
async fn error_body(response: Response) -> String {
    let reason = response
        .status()
        .canonical_reason()
        .unwrap_or("unreadable error body")
        .to_string();
    match response.text().await.map_err(transport) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read error response body");
            reason
        }
    }
}

async fn write_stream(response: Response, path: &Path) -> Result<u64> {
    let mut file = tokio::fs::File::create(path).await?;
    let mut stream = response.bytes_stream();
    let mut size = 0u64;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(transport)?;
        file.write_all(&chunk).await?;
        size += chunk.len() as u64;
    }
    file.flush().await?;

    Ok(size)
}

fn http_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
    }
}

/// The URL is stripped because it carries the token
fn transport(e: reqwest::Error) -> Error {
    Error::Transport(e.without_url().to_string())
}
