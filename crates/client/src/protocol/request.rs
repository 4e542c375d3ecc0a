//! Outgoing request types.
//!
//! Middleware never sees the request being built directly: the request phase
//! receives a [`RequestContext`] describing where the request goes plus the
//! head and body it may transform. Once every middleware ran, the connection
//! assembles a [`PreparedRequest`] and moves it into the transport.

use bytes::Bytes;
use http::{Method, Request, Uri};

/// Type alias for a fully prepared request.
///
/// This is what the transport receives: method, effective uri, the final
/// headers and the final body bytes after the request pipeline ran.
pub type PreparedRequest = Request<Bytes>;

/// Describes the request a middleware is transforming.
#[derive(Debug, Clone)]
pub struct RequestContext {
    method: Method,
    uri: Uri,
}

impl RequestContext {
    pub fn new(method: Method, uri: Uri) -> Self {
        Self { method, uri }
    }

    /// Returns the HTTP method of the request
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the effective uri of the request
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Returns the uri scheme, `http` when the uri carries none
    pub fn scheme(&self) -> &str {
        self.uri.scheme_str().unwrap_or("http")
    }

    pub fn host(&self) -> Option<&str> {
        self.uri.host()
    }

    /// Returns the request path, `/` when the uri path is empty
    pub fn path(&self) -> &str {
        match self.uri.path() {
            "" => "/",
            path => path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_exposes_effective_url() {
        let ctx = RequestContext::new(Method::GET, Uri::from_static("https://example.com/a/b?c=1"));

        assert_eq!(ctx.method(), &Method::GET);
        assert_eq!(ctx.scheme(), "https");
        assert_eq!(ctx.host(), Some("example.com"));
        assert_eq!(ctx.path(), "/a/b");
    }

    #[test]
    fn missing_path_is_root() {
        let ctx = RequestContext::new(Method::POST, Uri::from_static("http://127.0.0.1:8090"));

        assert_eq!(ctx.scheme(), "http");
        assert_eq!(ctx.path(), "/");
    }
}
