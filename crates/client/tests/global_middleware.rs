//! Tests touching the process-wide registry live in their own binary and run
//! one at a time.

mod common;

use common::{EchoServer, URI, init_tracing};
use http::{HeaderMap, HeaderValue};
use micro_client::connection::HttpConnection;
use micro_client::middleware::{
    Middleware, MiddlewareConfig, MiddlewareDefinition, RequestTransform, ResponseTransform, registry,
};
use micro_client::protocol::{Body, ConfigurationError, IncomingResponse, MiddlewareError, RequestContext};
use std::sync::{Arc, Mutex};
use tokio::sync::Mutex as AsyncMutex;

static SERIAL: AsyncMutex<()> = AsyncMutex::const_new(());

struct GlobalMiddleware;

impl Middleware for GlobalMiddleware {
    fn response_transform(&self) -> Option<&dyn ResponseTransform> {
        Some(self)
    }
}

impl ResponseTransform for GlobalMiddleware {
    fn response(&self, resp: &mut IncomingResponse) -> Result<(), MiddlewareError> {
        resp.response_header_mut().insert("x-global", HeaderValue::from_static("middleware"));
        Ok(())
    }
}

impl MiddlewareDefinition for GlobalMiddleware {
    type Instance = GlobalMiddleware;

    fn build(_config: MiddlewareConfig) -> Result<Self::Instance, ConfigurationError> {
        Ok(GlobalMiddleware)
    }
}

type Trace = Arc<Mutex<Vec<String>>>;

/// Records each phase it takes part in and tags the request head
struct Recorder {
    label: &'static str,
    trace: Trace,
}

impl Recorder {
    fn new(label: &'static str, trace: &Trace) -> Self {
        Self { label, trace: Arc::clone(trace) }
    }
}

impl Middleware for Recorder {
    fn request_transform(&self) -> Option<&dyn RequestTransform> {
        Some(self)
    }

    fn response_transform(&self) -> Option<&dyn ResponseTransform> {
        Some(self)
    }
}

impl RequestTransform for Recorder {
    fn request(&self, _ctx: &RequestContext, mut head: HeaderMap, body: Body) -> Result<(HeaderMap, Body), MiddlewareError> {
        self.trace.lock().unwrap().push(format!("request:{}", self.label));
        head.append("x-order", HeaderValue::from_static(self.label));
        Ok((head, body))
    }
}

impl ResponseTransform for Recorder {
    fn response(&self, _resp: &mut IncomingResponse) -> Result<(), MiddlewareError> {
        self.trace.lock().unwrap().push(format!("response:{}", self.label));
        Ok(())
    }
}

#[tokio::test]
async fn global_middleware_applies_to_every_connection() {
    let _guard = SERIAL.lock().await;
    init_tracing();
    registry::reset_global();

    registry::use_global::<GlobalMiddleware>(MiddlewareConfig::new()).unwrap();

    for _ in 0..2 {
        let conn = HttpConnection::new(URI, EchoServer::new()).unwrap();
        let response = conn.get().send().await.unwrap();
        assert_eq!(response.header_str("x-global"), Some("middleware"));
    }

    registry::reset_global();
}

#[tokio::test]
async fn global_runs_before_local_in_both_phases() {
    let _guard = SERIAL.lock().await;
    init_tracing();
    registry::reset_global();

    let trace = Trace::default();
    let server = EchoServer::new();
    let mut conn = HttpConnection::new(URI, server.clone()).unwrap();

    // registered on the connection first, still folded after the global ones
    conn.use_instance(Recorder::new("local-1", &trace)).unwrap();
    registry::use_global_instance(Recorder::new("global-1", &trace));
    conn.use_instance(Recorder::new("local-2", &trace)).unwrap();
    registry::use_global_instance(Recorder::new("global-2", &trace));

    conn.get().send().await.unwrap();

    let recorded = server.recorded();
    let order: Vec<_> = recorded[0].headers.get_all("x-order").iter().map(|v| v.to_str().unwrap()).collect();
    assert_eq!(order, ["global-1", "global-2", "local-1", "local-2"]);

    assert_eq!(
        *trace.lock().unwrap(),
        [
            "request:global-1",
            "request:global-2",
            "request:local-1",
            "request:local-2",
            "response:global-1",
            "response:global-2",
            "response:local-1",
            "response:local-2",
        ]
    );

    registry::reset_global();
}

#[tokio::test]
async fn reset_clears_the_global_registry() {
    let _guard = SERIAL.lock().await;
    registry::reset_global();

    registry::use_global::<GlobalMiddleware>(MiddlewareConfig::new()).unwrap();
    assert_eq!(registry::global().len(), 1);

    registry::reset_global();
    assert!(registry::global().is_empty());

    let conn = HttpConnection::new(URI, EchoServer::new()).unwrap();
    let response = conn.get().send().await.unwrap();
    assert_eq!(response.header_str("x-global"), None);
}
