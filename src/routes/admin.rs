use crate::models::RouteMeta;

use super::RouteDef;

/// Admin Routes
///
/// Everything under `/admin` requires an admin session except the login page,
/// which requires its absence.
pub fn admin_routes() -> Vec<RouteDef> {
    vec![
        RouteDef::new("admin-login", "/admin/login").with_meta(RouteMeta::unauthenticated_only()),
        RouteDef::new("admin-dashboard", "/admin/dashboard"),
    ]
}
