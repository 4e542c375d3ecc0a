use chrono::{DateTime, Utc};
use http::Uri;
use std::collections::BTreeMap;

use crate::Cookie;

type Names = BTreeMap<String, Cookie>;
type Paths = BTreeMap<String, Names>;

/// Cookies keyed by domain, then path, then name.
///
/// Holds at most one cookie per (domain, path, name); storing a cookie for an
/// existing triple replaces it. Iteration order is deterministic.
#[derive(Debug, Clone, Default)]
pub struct CookieStore {
    domains: BTreeMap<String, Paths>,
}

impl CookieStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the cookie for its triple.
    ///
    /// A cookie that is already expired removes the stored triple instead.
    /// Returns the replaced or removed cookie, if any.
    pub fn upsert(&mut self, cookie: Cookie, now: DateTime<Utc>) -> Option<Cookie> {
        if cookie.is_expired(now) {
            return self.remove(cookie.domain(), cookie.path(), cookie.name());
        }

        self.domains
            .entry(cookie.domain().to_string())
            .or_default()
            .entry(cookie.path().to_string())
            .or_default()
            .insert(cookie.name().to_string(), cookie)
    }

    pub fn get(&self, domain: &str, path: &str, name: &str) -> Option<&Cookie> {
        self.domains.get(domain)?.get(path)?.get(name)
    }

    pub fn remove(&mut self, domain: &str, path: &str, name: &str) -> Option<Cookie> {
        let paths = self.domains.get_mut(domain)?;
        let names = paths.get_mut(path)?;
        let removed = names.remove(name);

        if names.is_empty() {
            paths.remove(path);
        }
        if paths.is_empty() {
            self.domains.remove(domain);
        }
        removed
    }

    /// Returns the cookies sent on a request to `uri`: longer paths first,
    /// ties in domain and name order.
    pub fn matching(&self, uri: &Uri, now: DateTime<Utc>) -> Vec<&Cookie> {
        let Some(host) = uri.host() else {
            return vec![];
        };
        let scheme = uri.scheme_str().unwrap_or("http");
        let path = match uri.path() {
            "" => "/",
            path => path,
        };

        let mut cookies: Vec<_> = self.iter().filter(|cookie| cookie.matches(scheme, host, path, now)).collect();
        cookies.sort_by(|a, b| b.path().len().cmp(&a.path().len()));
        cookies
    }

    /// Drops every expired cookie, returning how many were removed
    pub fn purge_expired(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.len();
        for paths in self.domains.values_mut() {
            for names in paths.values_mut() {
                names.retain(|_, cookie| !cookie.is_expired(now));
            }
            paths.retain(|_, names| !names.is_empty());
        }
        self.domains.retain(|_, paths| !paths.is_empty());
        before - self.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cookie> {
        self.domains.values().flat_map(BTreeMap::values).flat_map(BTreeMap::values)
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    pub fn clear(&mut self) {
        self.domains.clear();
    }
}
