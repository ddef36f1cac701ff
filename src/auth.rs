use regex::Regex;
use reqwest::{
    Method,
    header::{self, HeaderMap, HeaderName, HeaderValue},
};
use std::{fmt, sync::Arc};

use crate::{
    models::Area,
    storage::{StorageState, read_token},
};

// --- Public Rules ---

/// A caller-supplied URL test, for public endpoints that need real logic.
pub type UrlPredicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// PublicRule
///
/// One matcher of the public rule set. A request whose URL matches any rule is
/// sent without credentials.
#[derive(Clone)]
pub enum PublicRule {
    /// Equality, then `rule + "/"` prefix, then raw prefix. The raw prefix is
    /// not anchored to a segment boundary: "/auth" also covers "/authors".
    Prefix(String),
    /// Regex search over the URL: an unanchored pattern matches anywhere in it.
    /// Callers wanting a whole-URL test must anchor with `^...$`.
    Pattern(Regex),
    Predicate(UrlPredicate),
}

impl PublicRule {
    pub fn prefix(rule: impl Into<String>) -> Self {
        PublicRule::Prefix(rule.into())
    }

    pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
        Ok(PublicRule::Pattern(Regex::new(pattern)?))
    }

    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        PublicRule::Predicate(Arc::new(f))
    }

    pub fn matches(&self, url: &str) -> bool {
        match self {
            PublicRule::Prefix(rule) => {
                url == rule.as_str()
                    || url
                        .strip_prefix(rule.as_str())
                        .is_some_and(|rest| rest.starts_with('/'))
                    || url.starts_with(rule.as_str())
            }
            PublicRule::Pattern(re) => re.is_match(url),
            PublicRule::Predicate(f) => f(url),
        }
    }
}

impl fmt::Debug for PublicRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublicRule::Prefix(rule) => f.debug_tuple("Prefix").field(rule).finish(),
            PublicRule::Pattern(re) => f.debug_tuple("Pattern").field(&re.as_str()).finish(),
            PublicRule::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// Endpoints reachable without any session.
pub const DEFAULT_PUBLIC_PREFIXES: [&str; 5] = [
    "/login",
    "/register",
    "/forgot-password",
    "/reset-password",
    "/auth",
];

/// PublicRules
///
/// The ordered public rule set. Matching is an OR over all rules, so order only
/// decides which rule short-circuits first, never the outcome.
#[derive(Debug, Clone)]
pub struct PublicRules {
    rules: Vec<PublicRule>,
}

impl Default for PublicRules {
    fn default() -> Self {
        Self {
            rules: DEFAULT_PUBLIC_PREFIXES
                .iter()
                .map(|rule| PublicRule::prefix(*rule))
                .collect(),
        }
    }
}

impl PublicRules {
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn with(mut self, rule: PublicRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn push(&mut self, rule: PublicRule) {
        self.rules.push(rule);
    }

    pub fn is_public(&self, url: &str) -> bool {
        self.rules.iter().any(|rule| rule.matches(url))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

// --- Area Classification ---

/// Request prefixes that select a non-default credential. Evaluated in order,
/// first match wins; anything unmatched uses the user credential.
const REQUEST_AREAS: [(&str, Area); 2] = [("/admin/", Area::Admin), ("/seller/", Area::Seller)];

/// request_area
///
/// Which area's credential an API URL should carry.
pub fn request_area(url: &str) -> Area {
    REQUEST_AREAS
        .iter()
        .find(|(prefix, _)| url.starts_with(prefix))
        .map(|(_, area)| *area)
        .unwrap_or(Area::User)
}

// --- Outgoing Requests ---

/// OutgoingRequest
///
/// Descriptor of an API call before transmission. The URL is the API path
/// relative to the configured base URL (e.g. "/admin/cars/7").
#[derive(Debug, Clone)]
pub struct OutgoingRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    /// Per-request override: never attach a credential.
    pub skip_auth: bool,
}

impl OutgoingRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            skip_auth: false,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn skip_auth(mut self) -> Self {
        self.skip_auth = true;
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// The Authorization header, if one is set and is valid text.
    pub fn authorization(&self) -> Option<&str> {
        self.headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
    }
}

// --- Request Authenticator ---

/// RequestAuthenticator
///
/// Runs on every outgoing API call and leaves at most one
/// `Authorization: Bearer <token>` header on it.
///
/// The process involves:
/// 1. Override: `skip_auth` or a public URL strips any Authorization header.
/// 2. Classification: the URL prefix picks the admin, seller or (default) user credential.
/// 3. Attachment: the stored token replaces any existing header, or the header is removed.
///
/// It never fails. An absent or unreadable credential sends the request
/// unauthenticated and lets the server answer.
#[derive(Clone)]
pub struct RequestAuthenticator {
    storage: StorageState,
    rules: PublicRules,
}

impl RequestAuthenticator {
    pub fn new(storage: StorageState) -> Self {
        Self::with_rules(storage, PublicRules::default())
    }

    pub fn with_rules(storage: StorageState, rules: PublicRules) -> Self {
        Self { storage, rules }
    }

    pub fn rules(&self) -> &PublicRules {
        &self.rules
    }

    pub fn authenticate(&self, mut request: OutgoingRequest) -> OutgoingRequest {
        // 1. Explicit override or public endpoint
        if request.skip_auth || self.rules.is_public(&request.url) {
            request.headers.remove(header::AUTHORIZATION);
            tracing::debug!(url = %request.url, skip_auth = request.skip_auth, "Sending request without credentials");
            return request;
        }

        // 2. Credential selection
        let area = request_area(&request.url);
        let token = read_token(self.storage.as_ref(), area);

        // 3. Attach or clear. At most one header value survives.
        let value = token.and_then(|token| {
            HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| {
                    tracing::warn!(%area, error = %e, "Stored token is not a valid header value, ignoring it");
                })
                .ok()
        });

        match value {
            Some(mut value) => {
                value.set_sensitive(true);
                request.headers.insert(header::AUTHORIZATION, value);
                tracing::debug!(url = %request.url, %area, "Attached bearer token");
            }
            None => {
                request.headers.remove(header::AUTHORIZATION);
                tracing::debug!(url = %request.url, %area, "No credential stored, sending unauthenticated");
            }
        }

        request
    }
}
