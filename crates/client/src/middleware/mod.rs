//! Middleware capabilities and their construction.
//!
//! A middleware is any type implementing [`Middleware`]. It opts into the
//! request phase, the response phase, or both, by returning a capability from
//! [`Middleware::request_transform`] / [`Middleware::response_transform`]. A
//! middleware exposing neither is valid and simply skipped.
//!
//! Middleware are built once, at registration, by a [`MiddlewareDefinition`]
//! from a [`MiddlewareConfig`].
//!
//! ```
//! use http::HeaderValue;
//! use micro_client::middleware::{Middleware, MiddlewareConfig, MiddlewareDefinition, ResponseTransform};
//! use micro_client::protocol::{ConfigurationError, IncomingResponse, MiddlewareError};
//!
//! struct Stamp(HeaderValue);
//!
//! impl Middleware for Stamp {
//!     fn response_transform(&self) -> Option<&dyn ResponseTransform> {
//!         Some(self)
//!     }
//! }
//!
//! impl ResponseTransform for Stamp {
//!     fn response(&self, resp: &mut IncomingResponse) -> Result<(), MiddlewareError> {
//!         resp.response_header_mut().insert("x-stamp", self.0.clone());
//!         Ok(())
//!     }
//! }
//!
//! impl MiddlewareDefinition for Stamp {
//!     type Instance = Stamp;
//!
//!     fn build(config: MiddlewareConfig) -> Result<Self::Instance, ConfigurationError> {
//!         let value = config.get_str(0).unwrap_or("stamped");
//!         HeaderValue::from_str(value)
//!             .map(Stamp)
//!             .map_err(|e| ConfigurationError::invalid_middleware("Stamp", e))
//!     }
//! }
//! ```

mod config;
pub mod registry;

pub use config::ConfigBlock;
pub use config::MiddlewareConfig;
pub use registry::MiddlewareEntry;
pub use registry::Registry;

use http::HeaderMap;

use crate::protocol::{Body, ConfigurationError, IncomingResponse, MiddlewareError, RequestContext};

/// The request phase capability.
pub trait RequestTransform: Send + Sync {
    /// Transforms the outgoing head and body, returning the pair the next
    /// middleware (or the transport) receives.
    fn request(&self, ctx: &RequestContext, head: HeaderMap, body: Body) -> Result<(HeaderMap, Body), MiddlewareError>;
}

/// The response phase capability.
pub trait ResponseTransform: Send + Sync {
    /// Transforms the response in place before the caller observes it.
    fn response(&self, resp: &mut IncomingResponse) -> Result<(), MiddlewareError>;
}

pub trait Middleware: Send + Sync + 'static {
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn request_transform(&self) -> Option<&dyn RequestTransform> {
        None
    }

    fn response_transform(&self) -> Option<&dyn ResponseTransform> {
        None
    }
}

/// Builds a middleware instance from caller supplied configuration.
pub trait MiddlewareDefinition {
    type Instance: Middleware;

    fn build(config: MiddlewareConfig) -> Result<Self::Instance, ConfigurationError>;
}
