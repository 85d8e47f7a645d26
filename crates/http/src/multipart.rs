//! multipart/form-data body assembly
//!
//! The upload body is built fully in memory so its exact length is known and
//! sent as `Content-Length`. Layout is fixed: a `props` part carrying JSON
//! metadata, then a `data` part carrying the file.

use std::path::Path;

use clip_core::Result;
use serde_json::{Map, Value};

const CRLF: &str = "\r\n";

/// An assembled multipart body
#[derive(Debug, Clone)]
pub struct MultipartBody {
    boundary: String,
    bytes: Vec<u8>,
}

impl MultipartBody {
    /// Assemble a body with a fresh boundary
    pub fn build(
        props: &Map<String, Value>,
        file_name: &str,
        mime: &str,
        data: &[u8],
    ) -> Result<Self> {
        Self::with_boundary(new_boundary(), props, file_name, mime, data)
    }

    /// Assemble a body with a caller-chosen boundary
    pub fn with_boundary(
        boundary: String,
        props: &Map<String, Value>,
        file_name: &str,
        mime: &str,
        data: &[u8],
    ) -> Result<Self> {
        let props_json = serde_json::to_string(props)?;
        let mut bytes = Vec::with_capacity(data.len() + props_json.len() + 512);

        push(&mut bytes, &format!("--{boundary}{CRLF}"));
        push(
            &mut bytes,
            &format!("Content-Disposition: form-data; name=\"props\"{CRLF}{CRLF}"),
        );
        push(&mut bytes, &props_json);
        push(&mut bytes, CRLF);

        push(&mut bytes, &format!("--{boundary}{CRLF}"));
        push(
            &mut bytes,
            &format!(
                "Content-Disposition: form-data; name=\"data\"; filename=\"{}\"{CRLF}",
                escape_filename(file_name)
            ),
        );
        push(&mut bytes, &format!("Content-Type: {mime}{CRLF}{CRLF}"));
        bytes.extend_from_slice(data);
        push(&mut bytes, CRLF);

        push(&mut bytes, &format!("--{boundary}--{CRLF}"));

        Ok(Self { boundary, bytes })
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Value for the `Content-Type` header
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

fn push(bytes: &mut Vec<u8>, text: &str) {
    bytes.extend_from_slice(text.as_bytes());
}

fn escape_filename(name: &str) -> String {
    name.replace('"', "%22")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Boundary unique per request: current time in nanoseconds plus a random
/// suffix
pub fn new_boundary() -> String {
    format!(
        "----clip{}{:016x}",
        jiff::Timestamp::now().as_nanosecond(),
        rand::random::<u64>()
    )
}

/// Content type for a file based on its extension
pub fn guess_mime(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_layout() {
        let mut props = Map::new();
        props.insert("title".into(), Value::String("x".into()));

        let body =
            MultipartBody::with_boundary("B".into(), &props, "a.txt", "text/plain", b"hello")
                .unwrap();

        let expected = "--B\r\n\
            Content-Disposition: form-data; name=\"props\"\r\n\r\n\
            {\"title\":\"x\"}\r\n\
            --B\r\n\
            Content-Disposition: form-data; name=\"data\"; filename=\"a.txt\"\r\n\
            Content-Type: text/plain\r\n\r\n\
            hello\r\n\
            --B--\r\n";
        assert_eq!(String::from_utf8(body.as_bytes().to_vec()).unwrap(), expected);
        assert_eq!(body.len(), expected.len());
        assert_eq!(body.content_type(), "multipart/form-data; boundary=B");
    }

    #[test]
    fn test_empty_props_still_sent() {
        let body = MultipartBody::build(&Map::new(), "f.bin", "application/octet-stream", &[0, 1])
            .unwrap();
        let text = String::from_utf8_lossy(body.as_bytes());
        assert!(text.contains("name=\"props\"\r\n\r\n{}\r\n"));
    }

    #[test]
    fn test_binary_data_is_preserved() {
        let data: Vec<u8> = (0..=255).collect();
        let body = MultipartBody::build(&Map::new(), "raw", "application/octet-stream", &data)
            .unwrap();
        assert!(body
            .as_bytes()
            .windows(data.len())
            .any(|window| window == data.as_slice()));
    }

    #[test]
    fn test_boundaries_are_unique() {
        assert_ne!(new_boundary(), new_boundary());
    }

    #[test]
    fn test_filename_quotes_are_escaped() {
        assert_eq!(escape_filename("a\"b.txt"), "a%22b.txt");
    }

    #[test]
    fn test_guess_mime() {
        assert_eq!(guess_mime(Path::new("photo.png")), "image/png");
        assert_eq!(guess_mime(Path::new("doc.pdf")), "application/pdf");
        assert_eq!(
            guess_mime(Path::new("mystery.zzqx")),
            "application/octet-stream"
        );
        assert_eq!(guess_mime(Path::new("noext")), "application/octet-stream");
    }
}
