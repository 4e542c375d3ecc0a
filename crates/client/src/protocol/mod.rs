//! Core request/response types shared by middleware, connection and transport.
//!
//! - **Bodies** ([`body`]): [`Body`] holds either bytes or a structured JSON value
//! - **Requests** ([`request`]): [`RequestContext`] describes the request a
//!   middleware transforms, [`PreparedRequest`] is what the transport sends
//! - **Responses** ([`response`]): [`TransportResponse`] is what the transport
//!   delivers, [`IncomingResponse`] is what middleware and callers observe
//! - **Errors** ([`error`]): [`ClientError`] and the errors it wraps

mod body;
pub use body::Body;

mod request;
pub use request::PreparedRequest;
pub use request::RequestContext;

mod response;
pub use response::IncomingResponse;
pub use response::TransportResponse;

mod error;
pub use error::BoxError;
pub use error::ClientError;
pub use error::ConfigurationError;
pub use error::MiddlewareError;
pub use error::TransportError;
