//! Folding requests and responses through the registered middleware.
//!
//! Both phases walk the same sequence: every global entry in registration
//! order, then every connection entry in registration order. The response
//! phase is not reversed. Folds are plain synchronous calls; nothing here
//! suspends, so a fold always runs to completion once started.

use http::HeaderMap;
use tracing::trace;

use crate::middleware::{MiddlewareEntry, Registry};
use crate::protocol::{Body, IncomingResponse, MiddlewareError, RequestContext};

/// The effective middleware sequence of one dispatch.
#[derive(Debug, Clone, Copy)]
pub struct Pipeline<'a> {
    global: &'a Registry,
    local: &'a Registry,
}

impl<'a> Pipeline<'a> {
    pub fn new(global: &'a Registry, local: &'a Registry) -> Self {
        Self { global, local }
    }

    /// Number of entries the pipeline folds over, with or without capabilities
    pub fn len(&self) -> usize {
        self.global.len() + self.local.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates entries in effective order
    pub fn entries(&self) -> impl Iterator<Item = &'a MiddlewareEntry> + use<'a> {
        self.global.iter().chain(self.local.iter())
    }

    /// Runs the request phase.
    ///
    /// Stops at the first failing middleware; the partially transformed head
    /// and body are dropped with the error.
    pub fn apply_request(
        &self,
        ctx: &RequestContext,
        mut head: HeaderMap,
        mut body: Body,
    ) -> Result<(HeaderMap, Body), MiddlewareError> {
        for entry in self.entries() {
            let Some(transform) = entry.request_transform() else {
                continue;
            };
            trace!(middleware = entry.name(), "apply request middleware");
            (head, body) = transform.request(ctx, head, body)?;
        }
        Ok((head, body))
    }

    /// Runs the response phase, mutating `resp` in place.
    ///
    /// Stops at the first failing middleware. Mutations made by earlier
    /// middleware are kept.
    pub fn apply_response(&self, resp: &mut IncomingResponse) -> Result<(), MiddlewareError> {
        for entry in self.entries() {
            let Some(transform) = entry.response_transform() else {
                continue;
            };
            trace!(middleware = entry.name(), "apply response middleware");
            transform.response(resp)?;
        }
        Ok(())
    }
}
