//! Route Declarations
//!
//! The portal's page routes, split by area the same way the portals are. Each
//! module only declares routes and their meta flags; access decisions belong to
//! the guard.
use std::collections::BTreeMap;

use crate::models::RouteMeta;

/// End-user storefront pages (`/`, `/login`, `/user/*`).
pub mod user;

/// Admin dashboard pages (`/admin/*`).
pub mod admin;

/// Seller dashboard pages (`/seller/*`).
pub mod seller;

/// RouteDef
///
/// A named route. `path` may contain `:param` segments, which match any single
/// non-empty segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDef {
    pub name: String,
    pub path: String,
    pub meta: RouteMeta,
}

impl RouteDef {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            meta: RouteMeta::default(),
        }
    }

    pub fn with_meta(mut self, meta: RouteMeta) -> Self {
        self.meta = meta;
        self
    }

    /// Returns the captured params when `path` matches this route.
    pub fn match_path(&self, path: &str) -> Option<BTreeMap<String, String>> {
        let pattern: Vec<&str> = segments(&self.path).collect();
        let actual: Vec<&str> = segments(path).collect();
        if pattern.len() != actual.len() {
            return None;
        }

        let mut params = BTreeMap::new();
        for (expected, got) in pattern.iter().zip(&actual) {
            match expected.strip_prefix(':') {
                Some(name) => {
                    params.insert(name.to_string(), got.to_string());
                }
                None if expected == got => {}
                None => return None,
            }
        }
        Some(params)
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    // Query strings and fragments never take part in route matching.
    let path = path.split(['?', '#']).next().unwrap_or_default();
    path.split('/').filter(|segment| !segment.is_empty())
}

/// RouteMatch
///
/// A resolved route together with the params its pattern captured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    pub route: RouteDef,
    pub params: BTreeMap<String, String>,
}

/// RouteTable
///
/// Ordered route declarations; the first matching declaration wins.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<RouteDef>,
}

impl Default for RouteTable {
    fn default() -> Self {
        let mut routes = user::user_routes();
        routes.extend(admin::admin_routes());
        routes.extend(seller::seller_routes());
        Self { routes }
    }
}

impl RouteTable {
    pub fn new(routes: Vec<RouteDef>) -> Self {
        Self { routes }
    }

    pub fn routes(&self) -> &[RouteDef] {
        &self.routes
    }

    pub fn push(&mut self, route: RouteDef) {
        self.routes.push(route);
    }

    pub fn resolve(&self, path: &str) -> Option<RouteMatch> {
        self.routes.iter().find_map(|route| {
            route.match_path(path).map(|params| RouteMatch {
                route: route.clone(),
                params,
            })
        })
    }

    /// Meta flags for `path`. Undeclared paths get the defaults.
    pub fn meta_for(&self, path: &str) -> RouteMeta {
        self.resolve(path)
            .map(|found| found.route.meta)
            .unwrap_or_default()
    }
}
