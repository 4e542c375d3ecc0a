use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CookieError {
    #[error("invalid url: {reason}")]
    InvalidUrl { reason: String },

    #[error("url `{url}` has no host")]
    MissingHost { url: String },

    #[error("malformed cookie: {reason}")]
    Malformed { reason: String },
}

impl CookieError {
    pub fn invalid_url<S: ToString>(str: S) -> Self {
        Self::InvalidUrl { reason: str.to_string() }
    }

    pub fn malformed<S: ToString>(str: S) -> Self {
        Self::Malformed { reason: str.to_string() }
    }
}
