//! Incoming response types.
//!
//! The transport hands back a fully parsed [`TransportResponse`]; the
//! connection wraps it into an [`IncomingResponse`] which the response
//! pipeline mutates in place before the caller sees it.

use bytes::Bytes;
use http::header::AsHeaderName;
use http::{HeaderMap, Response, StatusCode, Uri, Version};
use serde_json::Value;

use crate::protocol::Body;

/// Type alias for a fully parsed response as delivered by the transport.
pub type TransportResponse = Response<Bytes>;

/// A parsed response owned by the response pipeline, then by the caller.
///
/// `response_header` keeps every occurrence of a repeated header (e.g.
/// several `set-cookie` lines); `response` is the body middleware may replace.
#[derive(Debug)]
pub struct IncomingResponse {
    status: StatusCode,
    version: Version,
    uri: Uri,
    response_header: HeaderMap,
    response: Body,
}

impl IncomingResponse {
    /// Wraps a transport response, remembering the uri it originated from.
    pub fn from_transport(uri: Uri, response: TransportResponse) -> Self {
        let (parts, body) = response.into_parts();
        let response = if body.is_empty() { Body::Empty } else { Body::Bytes(body) };
        Self { status: parts.status, version: parts.version, uri, response_header: parts.headers, response }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn version(&self) -> Version {
        self.version
    }

    /// Returns the uri of the request this response answers
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn response_header(&self) -> &HeaderMap {
        &self.response_header
    }

    pub fn response_header_mut(&mut self) -> &mut HeaderMap {
        &mut self.response_header
    }

    /// Returns the first value of a header as text, if present and visible ascii
    pub fn header_str<K: AsHeaderName>(&self, name: K) -> Option<&str> {
        self.response_header.get(name).and_then(|value| value.to_str().ok())
    }

    pub fn response(&self) -> &Body {
        &self.response
    }

    pub fn response_mut(&mut self) -> &mut Body {
        &mut self.response
    }

    /// Replaces the body, returning the previous one
    pub fn set_response(&mut self, body: impl Into<Body>) -> Body {
        std::mem::replace(&mut self.response, body.into())
    }

    pub fn into_response(self) -> Body {
        self.response
    }

    /// Decodes the body as a JSON value.
    ///
    /// A body already decoded by a middleware is returned as is, an empty body
    /// decodes as `null`.
    pub fn json(&self) -> Result<Value, serde_json::Error> {
        match &self.response {
            Body::Empty => Ok(Value::Null),
            Body::Bytes(bytes) => serde_json::from_slice(bytes),
            Body::Json(value) => Ok(value.clone()),
        }
    }
}
