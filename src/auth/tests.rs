use super::*;
use axum::http::{Request, StatusCode, header::AUTHORIZATION};
use chrono::TimeZone;

const SECRET: &str = "supersecretjwtsecretforunittesting123";

fn auth_config() -> Auth {
    Auth {
        jwt_secret: SECRET.to_string(),
        jwt_ttl_seconds: 3600,
        admin_username: "admin".to_string(),
    }
}

fn parts_with(token: Option<&str>, config: Option<Auth>) -> Parts {
    let mut builder = Request::builder().uri("/api/subscriptions/user-1");
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let (mut parts, _) = builder.body(()).unwrap().into_parts();
    if let Some(config) = config {
        parts.extensions.insert(Arc::new(config));
    }
    parts
}

fn fresh_token(username: &str) -> (Uuid, String) {
    let user_id = Uuid::new_v4();
    let token = issue_token(&auth_config(), user_id, username, Utc::now()).unwrap();
    (user_id, token)
}

#[test]
fn test_issue_and_validate_token() {
    let user_id = Uuid::new_v4();
    let token = issue_token(&auth_config(), user_id, "alice", Utc::now()).unwrap();

    let claims = validate_token(&token, SECRET).expect("Valid token should pass");
    assert_eq!(claims.sub, user_id.to_string());
    assert_eq!(claims.username, "alice");
    assert_eq!(claims.exp - claims.iat, 3600);
}

#[test]
fn test_validate_token_expired() {
    let issued = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
    let token = issue_token(&auth_config(), Uuid::new_v4(), "alice", issued).unwrap();

    assert!(validate_token(&token, SECRET).is_err());
}

#[test]
fn test_validate_token_invalid_signature() {
    let (_, token) = fresh_token("alice");

    assert!(validate_token(&token, "wrongsecret").is_err());
}

#[test]
fn test_password_hash_round_trip() {
    let hash = hash_password("hunter22").unwrap();

    assert_ne!(hash, "hunter22");
    assert!(verify_password("hunter22", &hash).unwrap());
    assert!(!verify_password("hunter23", &hash).unwrap());
}

#[test]
fn test_verify_password_malformed_hash() {
    assert!(verify_password("hunter22", "not-a-phc-string").is_err());
}

#[tokio::test]
async fn test_extractor_accepts_valid_bearer() {
    let (user_id, token) = fresh_token("alice");
    let mut parts = parts_with(Some(&token), Some(auth_config()));

    let user = AuthUser::from_request_parts(&mut parts, &()).await.unwrap();

    assert_eq!(user.user_id, user_id);
    assert_eq!(user.username, "alice");
}

#[tokio::test]
async fn test_extractor_rejects_missing_header() {
    let mut parts = parts_with(None, Some(auth_config()));

    let err = AuthUser::from_request_parts(&mut parts, &())
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_extractor_rejects_garbage_token() {
    let mut parts = parts_with(Some("not.a.jwt"), Some(auth_config()));

    let err = AuthUser::from_request_parts(&mut parts, &())
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_extractor_without_config_is_internal() {
    let (_, token) = fresh_token("alice");
    let mut parts = parts_with(Some(&token), None);

    let err = AuthUser::from_request_parts(&mut parts, &())
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_admin_extractor_allows_admin() {
    let (_, token) = fresh_token("admin");
    let mut parts = parts_with(Some(&token), Some(auth_config()));

    let AdminUser(user) = AdminUser::from_request_parts(&mut parts, &()).await.unwrap();

    assert_eq!(user.username, "admin");
}

#[tokio::test]
async fn test_admin_extractor_forbids_regular_user() {
    let (_, token) = fresh_token("alice");
    let mut parts = parts_with(Some(&token), Some(auth_config()));

    let err = AdminUser::from_request_parts(&mut parts, &())
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
}
