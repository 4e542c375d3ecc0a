use chrono::Utc;
use http::header::{COOKIE, SET_COOKIE};
use http::{HeaderMap, HeaderValue, Uri};
use micro_client::middleware::{Middleware, MiddlewareConfig, MiddlewareDefinition, RequestTransform, ResponseTransform};
use micro_client::protocol::{Body, ConfigurationError, IncomingResponse, MiddlewareError, RequestContext};
use once_cell::sync::Lazy;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, trace, warn};

use crate::{Cookie, CookieError, CookieStore};

static SHARED: Lazy<CookieJar> = Lazy::new(CookieJar::new);

/// A cookie jar middleware.
///
/// On the request phase it sets the `cookie` header from the stored cookies
/// matching the request url; on the response phase it stores every
/// `set-cookie` the response carries. A request that already has an explicit
/// `cookie` header fails with [`ConfigurationError::ConflictingCookieHeader`].
///
/// `CookieJar` is a handle: clones share one store, so registering clones of
/// one jar on several connections shares cookies between them. Registering
/// the definition itself (`use_middleware::<CookieJar>`) uses the process-wide
/// [`CookieJar::shared`] jar.
#[derive(Debug, Clone, Default)]
pub struct CookieJar {
    store: Arc<Mutex<CookieStore>>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a handle to the process-wide jar
    pub fn shared() -> Self {
        SHARED.clone()
    }

    /// Stores a cookie as if `url` had answered with `Set-Cookie: cookie`.
    pub fn set_cookie(&self, url: &str, cookie: &str) -> Result<(), CookieError> {
        let uri = parse_url(url)?;
        let cookie = Cookie::parse(cookie, &uri)?;
        self.lock().upsert(cookie, Utc::now());
        Ok(())
    }

    /// Returns the cookies a request to `url` would carry.
    pub fn get_cookies(&self, url: &str) -> Result<Vec<Cookie>, CookieError> {
        let uri = parse_url(url)?;
        Ok(self.cookies_for(&uri))
    }

    pub fn cookies_for(&self, uri: &Uri) -> Vec<Cookie> {
        self.lock().matching(uri, Utc::now()).into_iter().cloned().collect()
    }

    /// Renders the `cookie` header value for `uri`, `None` when no cookie matches
    pub fn cookie_header(&self, uri: &Uri) -> Option<String> {
        let store = self.lock();
        let cookies = store.matching(uri, Utc::now());
        if cookies.is_empty() {
            return None;
        }
        Some(cookies.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))
    }

    /// Stores every parseable `set-cookie` value, skipping malformed ones.
    ///
    /// Returns how many live cookies were stored; an already expired cookie
    /// deletes its stored counterpart and is not counted.
    pub fn ingest<'a, I>(&self, origin: &Uri, values: I) -> usize
    where
        I: IntoIterator<Item = &'a HeaderValue>,
    {
        let now = Utc::now();
        let mut store = self.lock();
        let mut stored = 0;
        for value in values {
            let parsed = value.to_str().map_err(CookieError::malformed).and_then(|value| Cookie::parse_at(value, origin, now));
            match parsed {
                Ok(cookie) if cookie.is_expired(now) => {
                    trace!(name = cookie.name(), domain = cookie.domain(), path = cookie.path(), "expire cookie");
                    store.upsert(cookie, now);
                }
                Ok(cookie) => {
                    trace!(cookie = %cookie, domain = cookie.domain(), path = cookie.path(), "store cookie");
                    store.upsert(cookie, now);
                    stored += 1;
                }
                Err(e) => warn!(cause = %e, uri = %origin, "skip malformed set-cookie"),
            }
        }
        stored
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, CookieStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn parse_url(url: &str) -> Result<Uri, CookieError> {
    let uri = url.parse::<Uri>().map_err(CookieError::invalid_url)?;
    if uri.host().is_none() {
        return Err(CookieError::MissingHost { url: url.to_string() });
    }
    Ok(uri)
}

impl Middleware for CookieJar {
    fn request_transform(&self) -> Option<&dyn RequestTransform> {
        Some(self)
    }

    fn response_transform(&self) -> Option<&dyn ResponseTransform> {
        Some(self)
    }
}

impl RequestTransform for CookieJar {
    fn request(&self, ctx: &RequestContext, mut head: HeaderMap, body: Body) -> Result<(HeaderMap, Body), MiddlewareError> {
        if head.contains_key(COOKIE) {
            return Err(ConfigurationError::ConflictingCookieHeader.into());
        }

        if let Some(cookies) = self.cookie_header(ctx.uri()) {
            debug!(uri = %ctx.uri(), "attach cookies");
            let value = HeaderValue::from_str(&cookies).map_err(|e| MiddlewareError::execution(self.name(), e))?;
            head.insert(COOKIE, value);
        }
        Ok((head, body))
    }
}

impl ResponseTransform for CookieJar {
    fn response(&self, resp: &mut IncomingResponse) -> Result<(), MiddlewareError> {
        let stored = self.ingest(resp.uri(), resp.response_header().get_all(SET_COOKIE));
        if stored > 0 {
            debug!(uri = %resp.uri(), stored, "cookies stored");
        }
        Ok(())
    }
}

impl MiddlewareDefinition for CookieJar {
    type Instance = CookieJar;

    fn build(_config: MiddlewareConfig) -> Result<Self::Instance, ConfigurationError> {
        Ok(CookieJar::shared())
    }
}
