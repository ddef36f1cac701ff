use crate::models::RouteMeta;

use super::RouteDef;

/// Seller Routes
pub fn seller_routes() -> Vec<RouteDef> {
    vec![
        RouteDef::new("seller-login", "/seller/login")
            .with_meta(RouteMeta::unauthenticated_only()),
        RouteDef::new("seller-dashboard", "/seller/dashboard"),
    ]
}
