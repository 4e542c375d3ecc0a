//! Cookie records and `Set-Cookie` parsing.
//!
//! Parsing is best effort: the `name=value` pair is mandatory, every attribute
//! that can not be understood is dropped on its own and the value derived from
//! the originating url is used instead.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use http::{HeaderValue, Uri};
use std::fmt;
use std::net::IpAddr;
use tracing::warn;

use crate::CookieError;

/// `Expires` formats seen in the wild that are not RFC 2822
const EXPIRES_FORMATS: [&str; 3] = ["%a, %d-%b-%Y %H:%M:%S GMT", "%A, %d-%b-%y %H:%M:%S GMT", "%a %b %e %H:%M:%S %Y"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    name: String,
    value: String,
    domain: String,
    path: String,
    expires: Option<DateTime<Utc>>,
    secure: bool,
    http_only: bool,
}

impl Cookie {
    /// Parses one `Set-Cookie` value received from `origin`.
    pub fn parse(set_cookie: &str, origin: &Uri) -> Result<Self, CookieError> {
        Self::parse_at(set_cookie, origin, Utc::now())
    }

    /// Parses one `Set-Cookie` value, resolving `Max-Age` against `now`.
    pub fn parse_at(set_cookie: &str, origin: &Uri, now: DateTime<Utc>) -> Result<Self, CookieError> {
        let host = origin
            .host()
            .map(normalize_domain)
            .ok_or_else(|| CookieError::MissingHost { url: origin.to_string() })?;

        let mut parts = set_cookie.split(';');
        let pair = parts.next().unwrap_or_default();
        let (name, value) = pair.split_once('=').ok_or_else(|| CookieError::malformed(format!("`{pair}` is not a name=value pair")))?;
        let name = name.trim();
        let value = value.trim();
        if name.is_empty() {
            return Err(CookieError::malformed("empty cookie name"));
        }
        if !name.chars().all(is_name_char) {
            return Err(CookieError::malformed(format!("cookie name `{}` has invalid characters", name.escape_debug())));
        }
        if !value.chars().all(is_value_char) {
            return Err(CookieError::malformed(format!("cookie `{name}` value has invalid characters")));
        }
        if HeaderValue::from_str(&format!("{name}={value}")).is_err() {
            return Err(CookieError::malformed(format!("cookie `{name}` can not be sent in a header")));
        }

        let mut cookie = Self {
            name: name.to_string(),
            value: value.to_string(),
            path: default_path(origin.path()),
            domain: host,
            expires: None,
            secure: false,
            http_only: false,
        };

        let mut max_age = None;
        for attribute in parts {
            let (key, value) = attribute.split_once('=').unwrap_or((attribute, ""));
            let value = value.trim();
            match key.trim().to_ascii_lowercase().as_str() {
                "domain" => cookie.apply_domain(value),
                "path" if value.starts_with('/') => cookie.path = value.to_string(),
                "expires" => match parse_expires(value) {
                    Some(expires) => cookie.expires = Some(expires),
                    None => warn!(name = %cookie.name, expires = value, "ignore unparseable cookie expires"),
                },
                "max-age" => match value.parse::<i64>() {
                    Ok(seconds) => max_age = Some(seconds),
                    Err(_) => warn!(name = %cookie.name, max_age = value, "ignore unparseable cookie max-age"),
                },
                "secure" => cookie.secure = true,
                "httponly" => cookie.http_only = true,
                _ => {}
            }
        }

        // max-age wins over expires
        if let Some(seconds) = max_age {
            cookie.expires = Some(if seconds <= 0 {
                DateTime::<Utc>::MIN_UTC
            } else {
                Duration::try_seconds(seconds)
                    .and_then(|delta| now.checked_add_signed(delta))
                    .unwrap_or(DateTime::<Utc>::MAX_UTC)
            });
        }

        Ok(cookie)
    }

    fn apply_domain(&mut self, domain: &str) {
        let domain = normalize_domain(domain);
        if domain.is_empty() {
            return;
        }
        if domain_match(&self.domain, &domain) {
            self.domain = domain;
        } else {
            warn!(name = %self.name, domain = %domain, origin = %self.domain, "ignore cookie domain not matching origin");
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn expires(&self) -> Option<DateTime<Utc>> {
        self.expires
    }

    pub fn secure(&self) -> bool {
        self.secure
    }

    pub fn http_only(&self) -> bool {
        self.http_only
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires.is_some_and(|expires| expires <= now)
    }

    /// Checks whether this cookie is sent on a request for the given scheme, host and path
    pub fn matches(&self, scheme: &str, host: &str, path: &str, now: DateTime<Utc>) -> bool {
        if self.secure && !scheme.eq_ignore_ascii_case("https") {
            return false;
        }
        !self.is_expired(now) && domain_match(&normalize_domain(host), &self.domain) && path_match(path, &self.path)
    }
}

/// Renders the `name=value` pair sent in a `Cookie` header
impl fmt::Display for Cookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

/// Token characters: visible ASCII without separators
fn is_name_char(c: char) -> bool {
    c.is_ascii_graphic() && !matches!(c, '(' | ')' | '<' | '>' | '@' | ',' | ';' | ':' | '\\' | '"' | '/' | '[' | ']' | '?' | '=' | '{' | '}')
}

/// Anything but control characters; `;` never reaches here
fn is_value_char(c: char) -> bool {
    !c.is_control()
}

pub(crate) fn normalize_domain(domain: &str) -> String {
    domain.trim().trim_start_matches('.').trim_end_matches('.').to_ascii_lowercase()
}

/// `host` equals `domain`, or ends with `.domain`. IP hosts only match exactly.
pub(crate) fn domain_match(host: &str, domain: &str) -> bool {
    if host == domain {
        return true;
    }
    if host.parse::<IpAddr>().is_ok() {
        return false;
    }
    host.strip_suffix(domain).is_some_and(|rest| rest.ends_with('.'))
}

/// `/` matches everything; otherwise the request path must equal the cookie
/// path or continue it at a `/` boundary.
pub(crate) fn path_match(request_path: &str, cookie_path: &str) -> bool {
    if cookie_path == "/" || request_path == cookie_path {
        return true;
    }
    match request_path.strip_prefix(cookie_path) {
        Some(rest) => cookie_path.ends_with('/') || rest.starts_with('/'),
        None => false,
    }
}

/// The directory of the request path: everything up to, not including, the
/// right-most `/`, or `/` when there is none.
pub(crate) fn default_path(request_path: &str) -> String {
    if !request_path.starts_with('/') {
        return "/".to_string();
    }
    match request_path.rfind('/') {
        Some(0) | None => "/".to_string(),
        Some(index) => request_path[..index].to_string(),
    }
}

fn parse_expires(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(expires) = DateTime::parse_from_rfc2822(value) {
        return Some(expires.with_timezone(&Utc));
    }
    EXPIRES_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc())
}
