use http::{HeaderMap, HeaderName, HeaderValue, Method};
use serde::Serialize;

use crate::connection::HttpConnection;
use crate::protocol::{Body, ClientError, ConfigurationError, IncomingResponse};

/// Collects the head and body of one request on a [`HttpConnection`].
///
/// Invalid input is remembered and reported by [`RequestBuilder::send`] before
/// any middleware runs.
#[derive(Debug)]
pub struct RequestBuilder<'conn> {
    conn: &'conn HttpConnection,
    method: Method,
    head: HeaderMap,
    body: Body,
    error: Option<ClientError>,
}

impl<'conn> RequestBuilder<'conn> {
    pub(crate) fn new(conn: &'conn HttpConnection, method: Method) -> Self {
        Self { conn, method, head: HeaderMap::new(), body: Body::Empty, error: None }
    }

    /// Sets a header, replacing any previous value for the same (case-insensitive) name
    #[must_use]
    pub fn header<K, V>(mut self, name: K, value: V) -> Self
    where
        HeaderName: TryFrom<K>,
        <HeaderName as TryFrom<K>>::Error: Into<http::Error>,
        HeaderValue: TryFrom<V>,
        <HeaderValue as TryFrom<V>>::Error: Into<http::Error>,
    {
        if self.error.is_some() {
            return self;
        }

        let name: Result<HeaderName, http::Error> = <HeaderName as TryFrom<K>>::try_from(name).map_err(Into::into);
        let value: Result<HeaderValue, http::Error> = <HeaderValue as TryFrom<V>>::try_from(value).map_err(Into::into);
        match (name, value) {
            (Ok(name), Ok(value)) => {
                self.head.insert(name, value);
            }
            (Err(e), _) | (_, Err(e)) => {
                self.error = Some(ConfigurationError::invalid_header(e).into());
            }
        }
        self
    }

    /// Merges a whole header map, later values win
    #[must_use]
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.head.extend(headers);
        self
    }

    #[must_use]
    pub fn body(mut self, body: impl Into<Body>) -> Self {
        self.body = body.into();
        self
    }

    /// Sets a structured body.
    ///
    /// The value stays structured while middleware run and is serialised as
    /// JSON at dispatch if no middleware encoded it first.
    #[must_use]
    pub fn json<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(value) => self.body = Body::Json(value),
            Err(e) => self.error = Some(e.into()),
        }
        self
    }

    /// Dispatches the request and waits for the transformed response.
    ///
    /// Configuration errors, middleware failures and transport failures are
    /// all returned through the same [`ClientError`].
    pub async fn send(self) -> Result<IncomingResponse, ClientError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        self.conn.dispatch(self.method, self.head, self.body).await
    }
}
