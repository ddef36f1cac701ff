use portal_client::{
    Area, KeyValueStore, MemoryStore, NavigationDecision, NavigationError, Navigator,
    PublicRule, PublicRules, RouteDef, RouteGuard, RouteMeta, RouteTable, StorageState,
    guard::navigation_area,
};
use std::sync::Arc;

fn storage(tokens: &[Area]) -> StorageState {
    let store = MemoryStore::new();
    for area in tokens {
        store
            .set(&area.token_key(), &format!("{area}-token"))
            .unwrap();
    }
    Arc::new(store) as StorageState
}

fn redirect(path: &str) -> NavigationDecision {
    NavigationDecision::Redirect(path.to_string())
}

fn plain() -> RouteMeta {
    RouteMeta::default()
}

// --- Classification ---

#[test]
fn test_area_classification_order() {
    assert_eq!(navigation_area("/admin/dashboard"), Some(Area::Admin));
    assert_eq!(navigation_area("/administration"), Some(Area::Admin));
    assert_eq!(navigation_area("/seller/cars"), Some(Area::Seller));
    assert_eq!(navigation_area("/user/profile"), Some(Area::User));
    assert_eq!(navigation_area("/login"), Some(Area::User));
    assert_eq!(navigation_area("/login/help"), None);
    assert_eq!(navigation_area("/"), None);
    assert_eq!(navigation_area("/about"), None);
}

// --- Guard decisions ---

#[test]
fn test_admin_dashboard_without_token_redirects_to_login() {
    let guard = RouteGuard::new(storage(&[]));
    assert_eq!(guard.decide("/admin/dashboard", plain()), redirect("/admin/login"));
}

#[test]
fn test_admin_login_with_token_redirects_to_dashboard() {
    let guard = RouteGuard::new(storage(&[Area::Admin]));
    assert_eq!(
        guard.decide("/admin/login", RouteMeta::unauthenticated_only()),
        redirect("/admin/dashboard")
    );
    // The literal login path is login-only even without the meta flag.
    assert_eq!(guard.decide("/admin/login", plain()), redirect("/admin/dashboard"));
}

#[test]
fn test_login_pages_allowed_when_signed_out() {
    let guard = RouteGuard::new(storage(&[]));
    for path in ["/admin/login", "/seller/login", "/login"] {
        assert_eq!(guard.decide(path, plain()), NavigationDecision::Allow, "{path}");
    }
}

#[test]
fn test_seller_pages_allowed_with_seller_token() {
    let guard = RouteGuard::new(storage(&[Area::Seller]));
    assert_eq!(guard.decide("/seller/anything", plain()), NavigationDecision::Allow);
    assert_eq!(
        guard.decide("/seller/login", plain()),
        redirect("/seller/dashboard")
    );
}

#[test]
fn test_redirects_never_cross_areas() {
    // Signed in everywhere except admin.
    let guard = RouteGuard::new(storage(&[Area::Seller, Area::User]));
    assert_eq!(guard.decide("/admin/cars", plain()), redirect("/admin/login"));

    let guard = RouteGuard::new(storage(&[Area::Admin]));
    assert_eq!(guard.decide("/seller/dashboard", plain()), redirect("/seller/login"));
    assert_eq!(guard.decide("/user/profile", plain()), redirect("/login"));
}

#[test]
fn test_user_area_login_only_redirects_home() {
    let guard = RouteGuard::new(storage(&[Area::User]));
    assert_eq!(guard.decide("/login", plain()), redirect("/"));
    assert_eq!(
        guard.decide("/user/register", RouteMeta::unauthenticated_only()),
        redirect("/")
    );
}

#[test]
fn test_allow_listed_user_pages_skip_credentials() {
    let guard = RouteGuard::new(storage(&[]));
    for path in ["/user/cars", "/user/cars/", "/user/cars/42", "/user/cars/42?ref=home"] {
        assert_eq!(guard.decide(path, plain()), NavigationDecision::Allow, "{path}");
    }
    for path in ["/user/cars/abc", "/user/cars/42/edit", "/user/carsales"] {
        assert_eq!(guard.decide(path, plain()), redirect("/login"), "{path}");
    }
}

#[test]
fn test_custom_allow_list() {
    let allow = PublicRules::empty().with(PublicRule::pattern(r"^/user/brands(/\d+)?$").unwrap());
    let guard = RouteGuard::with_allow_list(storage(&[]), allow);

    assert_eq!(guard.decide("/user/brands/3", plain()), NavigationDecision::Allow);
    assert_eq!(guard.decide("/user/cars/42", plain()), redirect("/login"));
}

#[test]
fn test_public_meta_bypasses_everything() {
    let guard = RouteGuard::new(storage(&[Area::Admin]));
    assert_eq!(guard.decide("/admin/dashboard", RouteMeta::public()), NavigationDecision::Allow);
    assert_eq!(guard.decide("/admin/login", RouteMeta::public()), NavigationDecision::Allow);
}

#[test]
fn test_pages_outside_areas_always_allowed() {
    let guard = RouteGuard::new(storage(&[]));
    assert_eq!(guard.decide("/", plain()), NavigationDecision::Allow);
    assert_eq!(guard.decide("/about", RouteMeta::unauthenticated_only()), NavigationDecision::Allow);
}

#[test]
fn test_unreadable_storage_counts_as_signed_out() {
    let guard = RouteGuard::new(Arc::new(MemoryStore::new_failing()) as StorageState);
    assert_eq!(guard.decide("/admin/dashboard", plain()), redirect("/admin/login"));
    assert_eq!(guard.decide("/admin/login", plain()), NavigationDecision::Allow);
}

#[test]
fn test_route_meta_deserializes_with_defaults() {
    let meta: RouteMeta = serde_json::from_str(r#"{"unauthenticatedOnly": true}"#).unwrap();
    assert!(meta.unauthenticated_only);
    assert!(!meta.public);

    let meta: RouteMeta = serde_json::from_str("{}").unwrap();
    assert_eq!(meta, RouteMeta::default());
}

// --- Navigator ---

fn navigator(tokens: &[Area]) -> Navigator {
    let storage = storage(tokens);
    Navigator::new(RouteTable::default(), RouteGuard::new(storage))
}

#[test]
fn test_navigate_follows_redirect_to_login_route() {
    let resolved = navigator(&[]).navigate("/admin/dashboard").unwrap();
    assert_eq!(resolved.path, "/admin/login");
    assert_eq!(resolved.redirects, vec!["/admin/login".to_string()]);
    assert_eq!(
        resolved.route.map(|found| found.route.name),
        Some("admin-login".to_string())
    );
}

#[test]
fn test_navigate_signed_in_user_away_from_login() {
    let resolved = navigator(&[Area::User]).navigate("/login").unwrap();
    assert_eq!(resolved.path, "/");
    assert!(resolved.was_redirected());
}

#[test]
fn test_navigate_direct_allow_captures_params() {
    let resolved = navigator(&[]).navigate("/user/cars/42").unwrap();
    assert!(!resolved.was_redirected());
    let found = resolved.route.expect("route should resolve");
    assert_eq!(found.route.name, "user-car-details");
    assert_eq!(found.params.get("id").map(String::as_str), Some("42"));
}

#[test]
fn test_navigate_unknown_path_uses_default_meta() {
    let resolved = navigator(&[]).navigate("/seller/reports").unwrap();
    assert_eq!(resolved.path, "/seller/login");

    let resolved = navigator(&[Area::Seller]).navigate("/seller/reports").unwrap();
    assert_eq!(resolved.path, "/seller/reports");
    assert!(resolved.route.is_none());
}

#[test]
fn test_navigate_detects_redirect_loop() {
    // A misdeclared table: the dashboard is marked login-only, so a signed-in
    // admin is bounced from the dashboard to itself.
    let table = RouteTable::new(vec![
        RouteDef::new("admin-login", "/admin/login").with_meta(RouteMeta::unauthenticated_only()),
        RouteDef::new("admin-dashboard", "/admin/dashboard")
            .with_meta(RouteMeta::unauthenticated_only()),
    ]);
    let nav = Navigator::new(table, RouteGuard::new(storage(&[Area::Admin])));

    let err = nav.navigate("/admin/login").unwrap_err();
    let NavigationError::RedirectLoop { target, chain } = err;
    assert_eq!(target, "/admin/login");
    assert_eq!(
        chain,
        vec![
            "/admin/login".to_string(),
            "/admin/dashboard".to_string(),
            "/admin/dashboard".to_string(),
        ]
    );
}
