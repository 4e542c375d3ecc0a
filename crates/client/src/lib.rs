//! An asynchronous micro HTTP client core with a request/response middleware pipeline
//!
//! This crate provides the interception layer of an HTTP client: callers
//! register ordered middleware that transform outgoing requests before they
//! are sent and incoming responses before the caller observes them. Socket
//! I/O, wire encoding and parsing live behind the [`transport::Transport`]
//! trait and are not part of this crate.
//!
//! # Features
//!
//! - Global and per-connection middleware registries
//! - Capability based middleware: request phase, response phase, or both
//! - Middleware construction from explicit configuration values
//! - Deterministic fold order: global first, then connection, in registration
//!   order, identical for both phases
//! - One error channel for configuration, middleware and transport failures
//!
//! # Example
//!
//! ```no_run
//! use async_trait::async_trait;
//! use bytes::Bytes;
//! use http::{HeaderMap, HeaderValue, Response};
//! use micro_client::connection::HttpConnection;
//! use micro_client::middleware::{Middleware, MiddlewareConfig, MiddlewareDefinition, RequestTransform};
//! use micro_client::protocol::*;
//! use micro_client::transport::Transport;
//!
//! struct Loopback;
//!
//! #[async_trait]
//! impl Transport for Loopback {
//!     async fn send(&self, request: PreparedRequest) -> Result<TransportResponse, TransportError> {
//!         Ok(Response::new(request.into_body()))
//!     }
//! }
//!
//! struct Greeting;
//!
//! impl Middleware for Greeting {
//!     fn request_transform(&self) -> Option<&dyn RequestTransform> {
//!         Some(self)
//!     }
//! }
//!
//! impl RequestTransform for Greeting {
//!     fn request(&self, _ctx: &RequestContext, mut head: HeaderMap, body: Body) -> Result<(HeaderMap, Body), MiddlewareError> {
//!         head.insert("x-greeting", HeaderValue::from_static("hello"));
//!         Ok((head, body))
//!     }
//! }
//!
//! impl MiddlewareDefinition for Greeting {
//!     type Instance = Greeting;
//!
//!     fn build(_config: MiddlewareConfig) -> Result<Greeting, ConfigurationError> {
//!         Ok(Greeting)
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut conn = HttpConnection::new("http://127.0.0.1:8090/", Loopback)?;
//!     conn.use_middleware::<Greeting>(MiddlewareConfig::new())?;
//!
//!     let response = conn.post().body("data").send().await?;
//!     assert_eq!(response.response().as_str(), Some("data"));
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - [`middleware`]: capability traits, configuration and registries
//! - [`pipeline`]: the request and response folds
//! - [`connection`]: connections, request building and dispatch
//! - [`protocol`]: bodies, request/response types and errors
//! - [`transport`]: the I/O boundary

pub mod connection;
pub mod middleware;
pub mod pipeline;
pub mod protocol;
pub mod transport;

mod utils;
