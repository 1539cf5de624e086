use super::*;
use access::Role;
use axum::Router;
use axum::body::Body;
use axum::http::{StatusCode, header};
use axum::middleware::from_fn_with_state;
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use tower::ServiceExt;

use crate::config::EdgeConfig;

fn app_with(config: EdgeConfig) -> Router {
    let state = AppState::new(config);
    Router::new()
        .fallback(|| async { "page" })
        .layer(from_fn_with_state(state, edge_guard))
}

fn app() -> Router {
    app_with(EdgeConfig::default())
}

fn token_with(payload: &serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let body = URL_SAFE_NO_PAD.encode(payload.to_string());
    format!("{header}.{body}.c2lnbmF0dXJl")
}

async fn get(app: Router, path: &str, cookie: Option<&str>, bearer: Option<&str>) -> (StatusCode, Option<String>) {
    let mut req = axum::http::Request::builder().uri(path);
    if let Some(cookie) = cookie {
        req = req.header(header::COOKIE, cookie);
    }
    if let Some(token) = bearer {
        req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let resp = app.oneshot(req.body(Body::empty()).unwrap()).await.unwrap();
    let location = resp
        .headers()
        .get(header::LOCATION)
        .map(|v| v.to_str().unwrap().to_owned());
    (resp.status(), location)
}

const PRESENCE: &str = "fda_session=1";

// =============================================================================
// MIDDLEWARE
// =============================================================================

#[tokio::test]
async fn anonymous_request_redirects_to_login_with_next() {
    let (status, location) = get(app(), "/admin/x", None, None).await;
    assert_eq!(status, StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location.as_deref(), Some("/auth/login?next=%2Fadmin%2Fx"));
}

#[tokio::test]
async fn file_like_path_under_protected_prefix_is_guarded() {
    let (status, location) = get(app(), "/admin/report.csv", None, None).await;
    assert_eq!(status, StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location.as_deref(), Some("/auth/login?next=%2Fadmin%2Freport.csv"));

    let (status, _) = get(app(), "/authority/zones/v1.2", None, None).await;
    assert_eq!(status, StatusCode::TEMPORARY_REDIRECT);
}

#[tokio::test]
async fn login_redirect_keeps_query_string() {
    let (status, location) = get(app(), "/admin/zones?tab=2", None, None).await;
    assert_eq!(status, StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location.as_deref(), Some("/auth/login?next=%2Fadmin%2Fzones%3Ftab%3D2"));
}

#[tokio::test]
async fn authority_roles_cookie_is_forbidden_from_admin() {
    let cookie = format!("{PRESENCE}; fda_user_roles=%5B%22AUTHORITY%22%5D");
    let (status, location) = get(app(), "/admin/x", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location.as_deref(), Some("/forbidden?required=ADMIN,SUPER_ADMIN"));
}

#[tokio::test]
async fn presence_without_roles_passes_through() {
    let (status, location) = get(app(), "/admin/x", Some(PRESENCE), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(location.is_none());
}

#[tokio::test]
async fn matching_roles_cookie_passes() {
    let cookie = format!("{PRESENCE}; fda_user_roles=%5B%22SUPER_ADMIN%22%5D");
    let (status, _) = get(app(), "/admin/zones", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn bearer_roles_are_used_when_no_cookie_hint() {
    let token = token_with(&serde_json::json!({ "sub": "u1", "roles": "AUTHORITY" }));
    let (status, location) = get(app(), "/superadmin", Some(PRESENCE), Some(&token)).await;
    assert_eq!(status, StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location.as_deref(), Some("/forbidden?required=SUPER_ADMIN"));

    let (status, _) = get(app(), "/authority/alerts", Some(PRESENCE), Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn bearer_roles_ignored_when_disabled() {
    let token = token_with(&serde_json::json!({ "roles": ["AUTHORITY"] }));
    let config = EdgeConfig { bearer_roles: false, ..EdgeConfig::default() };
    let (status, _) = get(app_with(config), "/superadmin", Some(PRESENCE), Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn undecodable_bearer_defers() {
    let (status, _) = get(app(), "/admin", Some(PRESENCE), Some("not-a-token")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn exempt_paths_skip_the_guard() {
    for path in ["/", "/auth/login", "/auth/callback", "/api/devices", "/pkg/client.wasm", "/healthz", "/logo.svg"] {
        let (status, _) = get(app(), path, None, None).await;
        assert_eq!(status, StatusCode::OK, "{path}");
    }
}

#[tokio::test]
async fn unprotected_page_still_needs_presence() {
    let (status, location) = get(app(), "/forbidden", None, None).await;
    assert_eq!(status, StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location.as_deref(), Some("/auth/login?next=%2Fforbidden"));
}

#[tokio::test]
async fn disabled_guard_passes_everything() {
    let config = EdgeConfig { guard_enabled: false, ..EdgeConfig::default() };
    let (status, _) = get(app_with(config), "/admin/x", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

// =============================================================================
// CHECK
// =============================================================================

fn subject(roles: Option<&[Role]>) -> EdgeSubject {
    EdgeSubject { has_presence: true, roles: roles.map(|r| r.iter().copied().collect()) }
}

#[test]
fn edge_guard_is_coarse() {
    assert_eq!(EdgeGuard::new(true).trust(), Trust::Coarse);
}

#[test]
fn empty_recovered_role_list_is_denied() {
    let decision = EdgeGuard::new(true).check("/authority", &subject(Some(&[])));
    assert_eq!(decision, Decision::Forbidden { required: vec![Role::Authority] });
}

#[test]
fn prefix_match_is_literal() {
    let decision = EdgeGuard::new(true).check("/administrator", &subject(Some(&[Role::Authority])));
    assert!(matches!(decision, Decision::Forbidden { .. }));
}

#[test]
fn recovered_roles_on_unprotected_path_allow() {
    let decision = EdgeGuard::new(true).check("/about", &subject(Some(&[])));
    assert_eq!(decision, Decision::Allow);
}

#[test]
fn subject_prefers_role_cookie_over_bearer() {
    let token = token_with(&serde_json::json!({ "roles": ["ADMIN"] }));
    let mut headers = HeaderMap::new();
    headers.insert(header::COOKIE, "fda_session=1; fda_user_roles=%5B%22AUTHORITY%22%5D".parse().unwrap());
    headers.insert(header::AUTHORIZATION, format!("Bearer {token}").parse().unwrap());

    let subject = EdgeGuard::new(true).subject_from_headers(&headers);
    assert!(subject.has_presence);
    assert_eq!(subject.roles, Some([Role::Authority].into_iter().collect()));
}

#[test]
fn empty_presence_cookie_counts_as_absent() {
    let mut headers = HeaderMap::new();
    headers.insert(header::COOKIE, "fda_session=".parse().unwrap());
    assert!(!EdgeGuard::new(true).subject_from_headers(&headers).has_presence);
}

#[test]
fn exemptions() {
    assert!(is_exempt("/"));
    assert!(is_exempt("/auth/login"));
    assert!(is_exempt("/pkg/flood-dashboard.js"));
    assert!(is_exempt("/favicon.ico"));
    assert!(is_exempt("/robots.txt"));
    assert!(!is_exempt("/admin/report.csv"));
    assert!(!is_exempt("/admin"));
    assert!(!is_exempt("/authority/alerts"));
    assert!(!is_exempt("/apiary"));
}
