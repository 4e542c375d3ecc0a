use std::error::Error;
use std::io;
use thiserror::Error;

pub type BoxError = Box<dyn Error + Send + Sync>;

/// Top level error returned by a request.
///
/// Configuration, middleware and transport failures all flow through this one
/// channel, so callers handle them the same way.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("configuration error: {source}")]
    Configuration {
        #[from]
        source: ConfigurationError,
    },

    #[error("middleware error: {source}")]
    Middleware { source: MiddlewareError },

    #[error("transport error: {source}")]
    Transport {
        #[from]
        source: TransportError,
    },

    #[error("invalid body: {source}")]
    Body {
        #[from]
        source: serde_json::Error,
    },
}

impl ClientError {
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }

    pub fn is_middleware(&self) -> bool {
        matches!(self, Self::Middleware { .. })
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}

/// Configuration errors raised from a middleware keep their configuration
/// kind so they surface the same way as registration errors.
impl From<MiddlewareError> for ClientError {
    fn from(error: MiddlewareError) -> Self {
        match error {
            MiddlewareError::Configuration(source) => Self::Configuration { source },
            source @ MiddlewareError::Execution { .. } => Self::Middleware { source },
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("middleware `{name}` rejected its configuration: {reason}")]
    InvalidMiddleware { name: &'static str, reason: String },

    #[error("middleware can not be registered after the first request was dispatched")]
    RegistrationAfterDispatch,

    #[error("an explicit cookie header can not be combined with an active cookie jar")]
    ConflictingCookieHeader,

    #[error("invalid header: {reason}")]
    InvalidHeader { reason: String },
}

impl ConfigurationError {
    pub fn invalid_middleware<S: ToString>(name: &'static str, reason: S) -> Self {
        Self::InvalidMiddleware { name, reason: reason.to_string() }
    }

    pub fn invalid_header<S: ToString>(str: S) -> Self {
        Self::InvalidHeader { reason: str.to_string() }
    }
}

#[derive(Error, Debug)]
pub enum MiddlewareError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("middleware `{name}` failed: {source}")]
    Execution { name: &'static str, source: BoxError },
}

impl MiddlewareError {
    pub fn execution<E: Into<BoxError>>(name: &'static str, e: E) -> Self {
        Self::Execution { name, source: e.into() }
    }
}

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("connection closed before the response completed")]
    Closed,

    #[error("transport failure: {reason}")]
    Other { reason: String },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl TransportError {
    pub fn other<S: ToString>(str: S) -> Self {
        Self::Other { reason: str.to_string() }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}
