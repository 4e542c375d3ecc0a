//! Client connections and request building.
//!
//! - [`HttpConnection`]: a connection to one base uri, owning the
//!   connection-local middleware and the transport
//! - [`RequestBuilder`]: collects head and body, then dispatches through the
//!   middleware pipeline

mod http_connection;
mod request_builder;

pub use http_connection::ConnectionBuildError;
pub use http_connection::ConnectionBuilder;
pub use http_connection::HttpConnection;
pub use request_builder::RequestBuilder;
