//! Request and response payloads as seen by middleware.
//!
//! A [`Body`] is either raw bytes or a structured JSON value. Middleware may
//! freely switch between the two (e.g. encode a structured request body before
//! dispatch, decode a byte response body before the caller sees it); the
//! connection serialises any structured body that is still present when the
//! request is handed to the transport.

use bytes::Bytes;
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Body {
    #[default]
    Empty,
    Bytes(Bytes),
    Json(Value),
}

impl Body {
    pub fn empty() -> Self {
        Self::Empty
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Bytes(bytes) => bytes.is_empty(),
            Self::Json(_) => false,
        }
    }

    /// Returns the raw bytes, `None` for an empty or structured body
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Self::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Returns the body as utf-8 text when it holds valid utf-8 bytes
    pub fn as_str(&self) -> Option<&str> {
        self.as_bytes().and_then(|bytes| std::str::from_utf8(bytes).ok())
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Converts the body into the bytes sent on the wire.
    ///
    /// Structured values are serialised as JSON.
    pub fn into_bytes(self) -> Result<Bytes, serde_json::Error> {
        match self {
            Self::Empty => Ok(Bytes::new()),
            Self::Bytes(bytes) => Ok(bytes),
            Self::Json(value) => serde_json::to_vec(&value).map(Bytes::from),
        }
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(Bytes::from(bytes))
    }
}

impl From<String> for Body {
    fn from(value: String) -> Self {
        Self::Bytes(Bytes::from(value))
    }
}

impl From<&'static str> for Body {
    fn from(value: &'static str) -> Self {
        Self::Bytes(Bytes::from_static(value.as_bytes()))
    }
}

impl From<Value> for Body {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}
