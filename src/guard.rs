use crate::{
    auth::{PublicRule, PublicRules},
    models::{Area, RouteMeta},
    storage::{StorageState, read_token},
};

// --- Area Classification ---

#[derive(Debug, Clone, Copy)]
enum AreaMatcher {
    Prefix(&'static str),
    Exact(&'static str),
}

impl AreaMatcher {
    fn matches(self, path: &str) -> bool {
        match self {
            AreaMatcher::Prefix(prefix) => path.starts_with(prefix),
            AreaMatcher::Exact(exact) => path == exact,
        }
    }
}

/// Navigation areas, evaluated in order, first match wins. A path matching none
/// of them (e.g. the landing page) is outside every area.
const NAVIGATION_AREAS: [(AreaMatcher, Area); 4] = [
    (AreaMatcher::Prefix("/admin"), Area::Admin),
    (AreaMatcher::Prefix("/seller"), Area::Seller),
    (AreaMatcher::Prefix("/user"), Area::User),
    (AreaMatcher::Exact("/login"), Area::User),
];

/// navigation_area
///
/// The area a page path belongs to, if any.
pub fn navigation_area(path: &str) -> Option<Area> {
    NAVIGATION_AREAS
        .iter()
        .find(|(matcher, _)| matcher.matches(path))
        .map(|(_, area)| *area)
}

fn is_car_listing(path: &str) -> bool {
    path == "/user/cars" || path == "/user/cars/"
}

fn is_car_detail(path: &str) -> bool {
    path.strip_prefix("/user/cars/")
        .map(|id| id.strip_suffix('/').unwrap_or(id))
        .is_some_and(|id| !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()))
}

/// User-area pages anyone may browse: the car listing and numeric car details.
pub fn default_user_allow_list() -> PublicRules {
    PublicRules::empty()
        .with(PublicRule::predicate(is_car_listing))
        .with(PublicRule::predicate(is_car_detail))
}

// --- Route Guard ---

/// NavigationDecision
///
/// The single outcome of guarding one navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationDecision {
    Allow,
    Redirect(String),
}

/// RouteGuard
///
/// Runs before every navigation is committed. Stateless between navigations:
/// each decision reads the area's credential fresh from storage.
///
/// Decision order:
/// 1. `meta.public` allows unconditionally.
/// 2. Paths outside every area are allowed.
/// 3. Allow-listed user pages are allowed without a user session.
/// 4. Login-only pages bounce signed-in visitors to the area's home path.
/// 5. Everything else in an area needs that area's credential, or goes to its login path.
///
/// Redirects never cross areas. Unreadable storage counts as signed out.
#[derive(Clone)]
pub struct RouteGuard {
    storage: StorageState,
    user_allow_list: PublicRules,
}

impl RouteGuard {
    pub fn new(storage: StorageState) -> Self {
        Self::with_allow_list(storage, default_user_allow_list())
    }

    pub fn with_allow_list(storage: StorageState, user_allow_list: PublicRules) -> Self {
        Self {
            storage,
            user_allow_list,
        }
    }

    pub fn decide(&self, path: &str, meta: RouteMeta) -> NavigationDecision {
        let path = path.split(['?', '#']).next().unwrap_or_default();

        if meta.public {
            return NavigationDecision::Allow;
        }

        let Some(area) = navigation_area(path) else {
            return NavigationDecision::Allow;
        };

        if area == Area::User && self.user_allow_list.is_public(path) {
            tracing::debug!(path, "Allow-listed user page");
            return NavigationDecision::Allow;
        }

        let signed_in = read_token(self.storage.as_ref(), area).is_some();
        let login_only = meta.unauthenticated_only || path == area.login_path();

        let decision = match (login_only, signed_in) {
            (true, true) => NavigationDecision::Redirect(area.home_path().to_string()),
            (false, false) => NavigationDecision::Redirect(area.login_path().to_string()),
            _ => NavigationDecision::Allow,
        };

        tracing::debug!(path, %area, signed_in, login_only, ?decision, "Guarded navigation");
        decision
    }
}
