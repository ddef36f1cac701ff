use crate::models::RouteMeta;

use super::RouteDef;

/// User Routes
///
/// The storefront. The home page sits outside every area and is always
/// reachable; the login page sits at the site root but belongs to the user
/// area. Car listings are browsable without an account (see the guard's
/// allow-list).
pub fn user_routes() -> Vec<RouteDef> {
    vec![
        // GET /
        RouteDef::new("user-home", "/"),
        // GET /login
        // Signed-in users are bounced back to the home page.
        RouteDef::new("user-login", "/login").with_meta(RouteMeta::unauthenticated_only()),
        // GET /user/cars
        RouteDef::new("user-cars", "/user/cars"),
        // GET /user/cars/{id}
        RouteDef::new("user-car-details", "/user/cars/:id"),
        // GET /user/profile
        RouteDef::new("user-profile", "/user/profile"),
    ]
}
