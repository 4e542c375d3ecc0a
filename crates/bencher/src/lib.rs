use http::{HeaderMap, HeaderValue};
use micro_client::middleware::{Middleware, MiddlewareEntry, Registry, RequestTransform, ResponseTransform};
use micro_client::protocol::{Body, IncomingResponse, MiddlewareError, RequestContext};
use std::sync::Arc;

#[derive(Debug, Copy, Clone)]
pub struct TestCase {
    name: &'static str,
    group: TestGroup,
    global: usize,
    local: usize,
}

impl TestCase {
    pub fn new(name: &'static str, group: TestGroup, global: usize, local: usize) -> Self {
        Self { name, group, global, local }
    }

    pub fn small(name: &'static str, global: usize, local: usize) -> Self {
        Self::new(name, TestGroup::Small, global, local)
    }

    pub fn normal(name: &'static str, global: usize, local: usize) -> Self {
        Self::new(name, TestGroup::Normal, global, local)
    }

    pub fn large(name: &'static str, global: usize, local: usize) -> Self {
        Self::new(name, TestGroup::Large, global, local)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn group(&self) -> TestGroup {
        self.group
    }

    pub fn middleware_count(&self) -> usize {
        self.global + self.local
    }

    /// Builds the global and local registries, each filled with [`Stamp`]s
    pub fn registries(&self) -> (Registry, Registry) {
        (stamps(self.global), stamps(self.local))
    }
}

#[derive(Clone, Copy, Debug)]
pub enum TestGroup {
    Small,
    Normal,
    Large,
}

/// Touches both phases with the cheapest useful work: one header each way
#[derive(Debug)]
pub struct Stamp;

impl Middleware for Stamp {
    fn request_transform(&self) -> Option<&dyn RequestTransform> {
        Some(self)
    }

    fn response_transform(&self) -> Option<&dyn ResponseTransform> {
        Some(self)
    }
}

impl RequestTransform for Stamp {
    fn request(&self, _ctx: &RequestContext, mut head: HeaderMap, body: Body) -> Result<(HeaderMap, Body), MiddlewareError> {
        head.append("x-stamp", HeaderValue::from_static("1"));
        Ok((head, body))
    }
}

impl ResponseTransform for Stamp {
    fn response(&self, resp: &mut IncomingResponse) -> Result<(), MiddlewareError> {
        resp.response_header_mut().append("x-stamp", HeaderValue::from_static("1"));
        Ok(())
    }
}

fn stamps(count: usize) -> Registry {
    let mut registry = Registry::new();
    for _ in 0..count {
        registry.push(MiddlewareEntry::new(Arc::new(Stamp)));
    }
    registry
}
