//! The boundary to the component that performs I/O.
//!
//! A [`Transport`] owns sockets, wire encoding and parsing. The client core
//! only hands it a [`PreparedRequest`] and expects a fully parsed
//! [`TransportResponse`] back.

use async_trait::async_trait;
use std::sync::Arc;

use crate::protocol::{PreparedRequest, TransportError, TransportResponse};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: PreparedRequest) -> Result<TransportResponse, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: PreparedRequest) -> Result<TransportResponse, TransportError> {
        (**self).send(request).await
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Box<T> {
    async fn send(&self, request: PreparedRequest) -> Result<TransportResponse, TransportError> {
        (**self).send(request).await
    }
}
