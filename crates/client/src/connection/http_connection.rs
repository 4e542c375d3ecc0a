use http::{HeaderMap, Method, Request, Uri};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tracing::{debug, error};

use crate::connection::RequestBuilder;
use crate::middleware::{Middleware, MiddlewareConfig, MiddlewareDefinition, MiddlewareEntry, Registry, registry};
use crate::pipeline::Pipeline;
use crate::protocol::{Body, ClientError, ConfigurationError, IncomingResponse, RequestContext};
use crate::transport::Transport;
use crate::utils::ensure;

/// A client connection to one base uri.
///
/// Holds the connection-local middleware registry and the transport used to
/// perform I/O. Middleware must be registered before the first request is
/// dispatched; afterwards registration fails with
/// [`ConfigurationError::RegistrationAfterDispatch`].
///
/// Each request runs the request pipeline synchronously, awaits the transport,
/// then runs the response pipeline before the awaited result is returned.
pub struct HttpConnection {
    uri: Uri,
    transport: Arc<dyn Transport>,
    registry: Registry,
    dispatched: AtomicBool,
}

pub struct ConnectionBuilder {
    uri: Option<Result<Uri, ConnectionBuildError>>,
    transport: Option<Arc<dyn Transport>>,
}

#[derive(Error, Debug)]
pub enum ConnectionBuildError {
    #[error("uri must be set")]
    MissingUri,
    #[error("transport must be set")]
    MissingTransport,
    #[error("invalid uri: {reason}")]
    InvalidUri { reason: String },
}

impl ConnectionBuilder {
    fn new() -> Self {
        Self { uri: None, transport: None }
    }

    pub fn uri<U>(mut self, uri: U) -> Self
    where
        Uri: TryFrom<U>,
        <Uri as TryFrom<U>>::Error: Into<http::Error>,
    {
        let uri = Uri::try_from(uri).map_err(|e| ConnectionBuildError::InvalidUri { reason: e.into().to_string() });
        self.uri = Some(uri);
        self
    }

    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    pub fn build(self) -> Result<HttpConnection, ConnectionBuildError> {
        let uri = self.uri.ok_or(ConnectionBuildError::MissingUri)??;
        if uri.host().is_none() {
            return Err(ConnectionBuildError::InvalidUri { reason: format!("`{uri}` has no host") });
        }
        let transport = self.transport.ok_or(ConnectionBuildError::MissingTransport)?;
        Ok(HttpConnection { uri, transport, registry: Registry::new(), dispatched: AtomicBool::new(false) })
    }
}

impl fmt::Debug for HttpConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpConnection")
            .field("uri", &self.uri)
            .field("registry", &self.registry)
            .field("dispatched", &self.is_dispatched())
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for ConnectionBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionBuilder")
            .field("uri", &self.uri)
            .field("transport", &self.transport.is_some())
            .finish()
    }
}

macro_rules! request_method {
    ($method:ident, $upper_case_method:ident) => {
        #[inline]
        pub fn $method(&self) -> RequestBuilder<'_> {
            RequestBuilder::new(self, Method::$upper_case_method)
        }
    };
}

impl HttpConnection {
    pub fn builder() -> ConnectionBuilder {
        ConnectionBuilder::new()
    }

    pub fn new(uri: &str, transport: impl Transport + 'static) -> Result<Self, ConnectionBuildError> {
        Self::builder().uri(uri).transport(transport).build()
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Returns the connection-local middleware, in registration order
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn is_dispatched(&self) -> bool {
        self.dispatched.load(Ordering::Acquire)
    }

    /// Builds a middleware from its definition and appends it to this connection
    pub fn use_middleware<D: MiddlewareDefinition>(&mut self, config: MiddlewareConfig) -> Result<(), ConfigurationError> {
        ensure!(!self.is_dispatched(), ConfigurationError::RegistrationAfterDispatch);
        self.push(MiddlewareEntry::build::<D>(config)?);
        Ok(())
    }

    /// Appends an already constructed middleware to this connection.
    ///
    /// Use this to share one stateful middleware (a cookie jar, say) between
    /// connections.
    pub fn use_instance<M: Middleware>(&mut self, middleware: M) -> Result<(), ConfigurationError> {
        ensure!(!self.is_dispatched(), ConfigurationError::RegistrationAfterDispatch);
        self.push(MiddlewareEntry::new(Arc::new(middleware)));
        Ok(())
    }

    fn push(&mut self, entry: MiddlewareEntry) {
        debug!(middleware = entry.name(), uri = %self.uri, "register connection middleware");
        self.registry.push(entry);
    }

    request_method!(get, GET);
    request_method!(post, POST);
    request_method!(put, PUT);
    request_method!(delete, DELETE);
    request_method!(head, HEAD);
    request_method!(options, OPTIONS);
    request_method!(patch, PATCH);

    /// Starts a request with an arbitrary method
    pub fn request(&self, method: Method) -> RequestBuilder<'_> {
        RequestBuilder::new(self, method)
    }

    pub(crate) async fn dispatch(&self, method: Method, head: HeaderMap, body: Body) -> Result<IncomingResponse, ClientError> {
        match self.process(method, head, body).await {
            Ok(response) => Ok(response),
            Err(e) => {
                error!(cause = %e, uri = %self.uri, "request aborted");
                Err(e)
            }
        }
    }

    async fn process(&self, method: Method, head: HeaderMap, body: Body) -> Result<IncomingResponse, ClientError> {
        self.dispatched.store(true, Ordering::Release);

        let ctx = RequestContext::new(method, self.uri.clone());
        let global = registry::global();
        let pipeline = Pipeline::new(&global, &self.registry);

        let (head, body) = pipeline.apply_request(&ctx, head, body)?;
        let body = body.into_bytes()?;

        let mut request = Request::new(body);
        *request.method_mut() = ctx.method().clone();
        *request.uri_mut() = ctx.uri().clone();
        *request.headers_mut() = head;

        debug!(method = %ctx.method(), uri = %ctx.uri(), middleware = pipeline.len(), "dispatch request");
        let response = self.transport.send(request).await?;

        let mut response = IncomingResponse::from_transport(ctx.uri().clone(), response);
        pipeline.apply_response(&mut response)?;
        debug!(status = %response.status(), uri = %ctx.uri(), "response complete");

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::{RequestTransform, ResponseTransform};
    use crate::protocol::{MiddlewareError, TransportError};
    use crate::transport::MockTransport;
    use bytes::Bytes;
    use http::{HeaderValue, Response, StatusCode};

    struct Tagging;

    impl Middleware for Tagging {
        fn request_transform(&self) -> Option<&dyn RequestTransform> {
            Some(self)
        }

        fn response_transform(&self) -> Option<&dyn ResponseTransform> {
            Some(self)
        }
    }

    impl RequestTransform for Tagging {
        fn request(&self, _ctx: &RequestContext, mut head: HeaderMap, body: Body) -> Result<(HeaderMap, Body), MiddlewareError> {
            head.insert("x-tag", HeaderValue::from_static("request"));
            let mut data = body.into_bytes().map_err(|e| MiddlewareError::execution(self.name(), e))?.to_vec();
            data.extend_from_slice(b"!");
            Ok((head, Body::from(data)))
        }
    }

    impl ResponseTransform for Tagging {
        fn response(&self, resp: &mut IncomingResponse) -> Result<(), MiddlewareError> {
            resp.response_header_mut().insert("x-tag", HeaderValue::from_static("response"));
            Ok(())
        }
    }

    impl MiddlewareDefinition for Tagging {
        type Instance = Tagging;

        fn build(_config: MiddlewareConfig) -> Result<Self::Instance, ConfigurationError> {
            Ok(Tagging)
        }
    }

    fn ok_response() -> Result<Response<Bytes>, TransportError> {
        Ok(Response::builder().status(StatusCode::OK).body(Bytes::from_static(b"done")).unwrap())
    }

    #[test]
    fn builder_requires_uri_and_transport() {
        let result = HttpConnection::builder().transport(MockTransport::new()).build();
        assert!(matches!(result, Err(ConnectionBuildError::MissingUri)));

        let result = HttpConnection::builder().uri("http://127.0.0.1:8090/").build();
        assert!(matches!(result, Err(ConnectionBuildError::MissingTransport)));

        let result = HttpConnection::builder().uri("/relative").transport(MockTransport::new()).build();
        assert!(matches!(result, Err(ConnectionBuildError::InvalidUri { .. })));

        let result = HttpConnection::builder().uri("http://[::1").transport(MockTransport::new()).build();
        assert!(matches!(result, Err(ConnectionBuildError::InvalidUri { .. })));
    }

    #[test]
    fn debug_output_names_uri_and_middleware() {
        let mut conn = HttpConnection::new("http://127.0.0.1:8090/", MockTransport::new()).unwrap();
        conn.use_instance(Tagging).unwrap();

        let debug = format!("{conn:?}");
        assert!(debug.contains("127.0.0.1:8090"));
        assert!(debug.contains("Tagging"));
        assert!(debug.contains("dispatched: false"));

        let debug = format!("{:?}", HttpConnection::builder().uri("http://127.0.0.1:8090/"));
        assert!(debug.contains("transport: false"));
    }

    #[tokio::test]
    async fn transport_receives_transformed_request() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|request| {
                request.method() == Method::POST
                    && request.uri() == "http://127.0.0.1:8090/"
                    && request.headers().get("x-tag").is_some_and(|v| v == "request")
                    && request.body() == &Bytes::from_static(b"data!")
            })
            .times(1)
            .returning(|_| ok_response());

        let mut conn = HttpConnection::new("http://127.0.0.1:8090/", transport).unwrap();
        conn.use_middleware::<Tagging>(MiddlewareConfig::new()).unwrap();

        let response = conn.post().body("data").send().await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.header_str("x-tag"), Some("response"));
        assert_eq!(response.response().as_str(), Some("done"));
    }

    #[tokio::test]
    async fn registration_after_dispatch_is_rejected() {
        let mut transport = MockTransport::new();
        transport.expect_send().times(1).returning(|_| ok_response());

        let mut conn = HttpConnection::new("http://127.0.0.1:8090/", transport).unwrap();
        assert!(!conn.is_dispatched());
        conn.get().send().await.unwrap();
        assert!(conn.is_dispatched());

        let result = conn.use_instance(Tagging);
        assert!(matches!(result, Err(ConfigurationError::RegistrationAfterDispatch)));
        let result = conn.use_middleware::<Tagging>(MiddlewareConfig::new());
        assert!(matches!(result, Err(ConfigurationError::RegistrationAfterDispatch)));
        assert_eq!(conn.registry().len(), 0);
    }

    #[tokio::test]
    async fn transport_error_skips_response_phase() {
        let mut transport = MockTransport::new();
        transport.expect_send().times(1).returning(|_| Err(TransportError::Closed));

        let mut conn = HttpConnection::new("http://127.0.0.1:8090/", transport).unwrap();
        conn.use_instance(Tagging).unwrap();

        let result = conn.get().send().await;
        assert!(matches!(result, Err(ClientError::Transport { source: TransportError::Closed })));
    }

    #[tokio::test]
    async fn invalid_header_fails_before_transport() {
        let mut transport = MockTransport::new();
        transport.expect_send().never();

        let conn = HttpConnection::new("http://127.0.0.1:8090/", transport).unwrap();
        let result = conn.get().header("x-bad", "line\nbreak").send().await;
        assert!(matches!(result, Err(ClientError::Configuration { source: ConfigurationError::InvalidHeader { .. } })));
    }
}
