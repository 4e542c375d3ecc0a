#![allow(dead_code, reason = "not every test binary uses every helper")]

use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, Method, Response, StatusCode, Uri};
use indoc::indoc;
use micro_client::protocol::{PreparedRequest, TransportError, TransportResponse};
use micro_client::transport::Transport;
use std::sync::{Arc, Mutex};

pub const URI: &str = "http://127.0.0.1:8090/";
pub const JSON_URI: &str = "http://127.0.0.1:8090/json";

pub const JSON_DOCUMENT: &str = indoc! {r#"
    {"ruby": "hash", "nested": {"list": [1, 2, 3]}}
"#};

/// What the echo server observed for one request
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// An in-memory stand-in for the test server.
///
/// `/json` answers a fixed JSON document; any other path answers `200`
/// echoing the request body (or `Hello, World!` for an empty body). Every
/// request is recorded.
#[derive(Debug, Clone, Default)]
pub struct EchoServer {
    recorded: Arc<Mutex<Vec<Recorded>>>,
}

impl EchoServer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recorded(&self) -> Vec<Recorded> {
        self.recorded.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for EchoServer {
    async fn send(&self, request: PreparedRequest) -> Result<TransportResponse, TransportError> {
        let (parts, body) = request.into_parts();
        let is_json = parts.uri.path() == "/json";
        self.recorded.lock().unwrap().push(Recorded {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            body: body.clone(),
        });

        if is_json {
            return Ok(Response::builder()
                .status(StatusCode::OK)
                .header(http::header::CONTENT_TYPE, "application/json")
                .body(Bytes::from_static(JSON_DOCUMENT.as_bytes()))
                .unwrap());
        }

        let body = if body.is_empty() { Bytes::from_static(b"Hello, World!") } else { body };
        Ok(Response::builder()
            .status(StatusCode::OK)
            .header(http::header::CONTENT_LENGTH, body.len())
            .body(body)
            .unwrap())
    }
}

/// A transport that always fails
#[derive(Debug, Clone, Copy)]
pub struct Unreachable;

#[async_trait]
impl Transport for Unreachable {
    async fn send(&self, _request: PreparedRequest) -> Result<TransportResponse, TransportError> {
        Err(TransportError::io(std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused")))
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().with_max_level(tracing::Level::TRACE).try_init();
}
