use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

// --- Areas ---

/// Area
///
/// One of the three role-scoped sections of the portal. Every credential, login
/// page and dashboard belongs to exactly one area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Area {
    Admin,
    Seller,
    User,
}

impl Area {
    pub const ALL: [Area; 3] = [Area::Admin, Area::Seller, Area::User];

    /// Storage prefix, and the key the login response nests the record under.
    pub fn as_str(self) -> &'static str {
        match self {
            Area::Admin => "admin",
            Area::Seller => "seller",
            Area::User => "user",
        }
    }

    /// Storage key holding the raw bearer token.
    pub fn token_key(self) -> String {
        format!("{}_token", self.as_str())
    }

    /// Storage key holding the JSON-serialized user record.
    pub fn data_key(self) -> String {
        format!("{}_data", self.as_str())
    }

    /// Where the guard sends visitors without a session.
    pub fn login_path(self) -> &'static str {
        match self {
            Area::Admin => "/admin/login",
            Area::Seller => "/seller/login",
            // The end-user login page lives at the site root, not under /user.
            Area::User => "/login",
        }
    }

    /// Where the guard sends signed-in visitors away from login pages.
    pub fn home_path(self) -> &'static str {
        match self {
            Area::Admin => "/admin/dashboard",
            Area::Seller => "/seller/dashboard",
            Area::User => "/",
        }
    }
}

impl fmt::Display for Area {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// --- Route Metadata ---

/// RouteMeta
///
/// Per-route flags read by the guard. Both default to `false` when a route
/// declaration leaves them out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RouteMeta {
    /// Skip the guard entirely.
    pub public: bool,
    /// Only reachable without a session for the route's area (login, register).
    pub unauthenticated_only: bool,
}

impl RouteMeta {
    pub const fn public() -> Self {
        Self {
            public: true,
            unauthenticated_only: false,
        }
    }

    pub const fn unauthenticated_only() -> Self {
        Self {
            public: false,
            unauthenticated_only: true,
        }
    }
}

// --- Session Payloads ---

/// Credentials
///
/// Body of `POST /{area}/auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// SessionRecord
///
/// What a successful login yields: the bearer token and the area's user record.
/// The record shape differs per area and is kept as raw JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub token: String,
    pub user: Value,
}

/// ApiEnvelope
///
/// Every backend response wraps its payload in a `data` field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub data: T,
}

/// SessionEvent
///
/// Broadcast by a session store whenever its area signs in or out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn(Area),
    SignedOut(Area),
}
