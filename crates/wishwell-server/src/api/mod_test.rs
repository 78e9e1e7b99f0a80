use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use tower::ServiceExt;

use wishwell_core::AppConfig;
use wishwell_extract::{ExtractConfig, Extractor};

use super::*;
use crate::middleware::{AuthState, SessionStore, SESSION_COOKIE};

const TEST_PASSWORD: &str = "password123";

fn test_app_config() -> AppConfig {
    AppConfig {
        database_url: "postgres://localhost/wishwell".to_string(),
        env: wishwell_core::Environment::Test,
        bind_addr: "127.0.0.1:3000".parse().expect("bind addr"),
        log_level: "info".to_string(),
        admin_username: "admin".to_string(),
        admin_password_hash: wishwell_core::hash_password("test-salt", TEST_PASSWORD),
        password_salt: "test-salt".to_string(),
        session_ttl_secs: 3600,
        scraper_api_key: None,
        serper_api_key: None,
        microlink_api_key: None,
        headless_enabled: false,
        extract_timeout_secs: 8,
        extract_max_body_bytes: 1_500_000,
        extract_user_agent: "wishwell/0.1 (+wishlist-preview)".to_string(),
        db_max_connections: 5,
        db_min_connections: 1,
        db_acquire_timeout_secs: 5,
    }
}

fn test_state(pool: sqlx::PgPool, extract_config: ExtractConfig) -> AppState {
    let config = test_app_config();
    AppState {
        pool,
        extractor: Extractor::new(extract_config).expect("client builds"),
        auth: AuthState::from_app_config(&config),
        sessions: SessionStore::new(Duration::from_secs(config.session_ttl_secs)),
    }
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    serde_json::from_slice(&bytes).expect("json parse")
}

#[test]
fn api_error_codes_map_to_statuses() {
    let cases = [
        ("not_found", StatusCode::NOT_FOUND),
        ("unauthorized", StatusCode::UNAUTHORIZED),
        ("validation_error", StatusCode::BAD_REQUEST),
        ("bad_request", StatusCode::BAD_REQUEST),
        ("rate_limited", StatusCode::TOO_MANY_REQUESTS),
        ("internal_error", StatusCode::INTERNAL_SERVER_ERROR),
    ];
    for (code, status) in cases {
        let response = ApiError::new("req-1", code, "message").into_response();
        assert_eq!(response.status(), status, "code {code}");
    }
}

#[sqlx::test(migrations = "../../migrations")]
async fn health_reports_ok_with_database(pool: sqlx::PgPool) {
    let app = build_app(
        test_state(pool, ExtractConfig::default()),
        default_rate_limit_state(),
    );
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/health")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"].as_str(), Some("ok"));
    assert!(json["meta"]["request_id"].is_string());
}

#[sqlx::test(migrations = "../../migrations")]
async fn gifts_list_is_public_and_empty_initially(pool: sqlx::PgPool) {
    let app = build_app(
        test_state(pool, ExtractConfig::default()),
        default_rate_limit_state(),
    );
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/gifts")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().map(Vec::len), Some(0));
}

#[sqlx::test(migrations = "../../migrations")]
async fn gift_mutations_require_a_session(pool: sqlx::PgPool) {
    let app = build_app(
        test_state(pool, ExtractConfig::default()),
        default_rate_limit_state(),
    );
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/v1/gifts",
            serde_json::json!({ "title": "No auth" }),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../migrations")]
async fn login_rejects_bad_credentials(pool: sqlx::PgPool) {
    let app = build_app(
        test_state(pool, ExtractConfig::default()),
        default_rate_limit_state(),
    );
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/v1/admin/login",
            serde_json::json!({ "username": "admin", "password": "wrong" }),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../migrations")]
async fn login_sets_httponly_session_cookie(pool: sqlx::PgPool) {
    let app = build_app(
        test_state(pool, ExtractConfig::default()),
        default_rate_limit_state(),
    );
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/v1/admin/login",
            serde_json::json!({ "username": "admin", "password": TEST_PASSWORD }),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .expect("set-cookie header");
    assert!(cookie.starts_with(SESSION_COOKIE));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Lax"));
}

#[sqlx::test(migrations = "../../migrations")]
async fn admin_can_create_update_and_delete_a_gift(pool: sqlx::PgPool) {
    let state = test_state(pool, ExtractConfig::default());
    let sessions = state.sessions.clone();
    let app = build_app(state, default_rate_limit_state());
    let cookie = format!("{SESSION_COOKIE}={}", sessions.create().await);

    // Create.
    let mut request = json_request(
        "POST",
        "/api/v1/gifts",
        serde_json::json!({
            "title": "  Lego Set  ",
            "price": "49,99",
            "currency": "eur",
            "images": ["https://cdn.example.com/a.jpg"]
        }),
    );
    request
        .headers_mut()
        .insert(header::COOKIE, cookie.parse().expect("cookie header"));
    let response = app.clone().oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["data"]["title"].as_str(), Some("Lego Set"));
    assert_eq!(created["data"]["price"].as_f64(), Some(49.99));
    assert_eq!(created["data"]["currency"].as_str(), Some("EUR"));
    assert_eq!(
        created["data"]["mainImage"].as_str(),
        Some("https://cdn.example.com/a.jpg")
    );
    let id = created["data"]["id"].as_str().expect("gift id").to_string();

    // Public read sees it.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/v1/gifts/{id}"))
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    // Update.
    let mut request = json_request(
        "PUT",
        &format!("/api/v1/gifts/{id}"),
        serde_json::json!({ "title": "Bigger Lego Set", "price": 59.99 }),
    );
    request
        .headers_mut()
        .insert(header::COOKIE, cookie.parse().expect("cookie header"));
    let response = app.clone().oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["data"]["title"].as_str(), Some("Bigger Lego Set"));

    // Delete, then the public read 404s.
    let mut request = Request::builder()
        .method("DELETE")
        .uri(format!("/api/v1/gifts/{id}"))
        .body(Body::empty())
        .expect("request");
    request
        .headers_mut()
        .insert(header::COOKIE, cookie.parse().expect("cookie header"));
    let response = app.clone().oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/api/v1/gifts/{id}"))
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../migrations")]
async fn create_gift_rejects_invalid_payload(pool: sqlx::PgPool) {
    let state = test_state(pool, ExtractConfig::default());
    let sessions = state.sessions.clone();
    let app = build_app(state, default_rate_limit_state());
    let cookie = format!("{SESSION_COOKIE}={}", sessions.create().await);

    let mut request = json_request(
        "POST",
        "/api/v1/gifts",
        serde_json::json!({ "title": "   " }),
    );
    request
        .headers_mut()
        .insert(header::COOKIE, cookie.parse().expect("cookie header"));
    let response = app.oneshot(request).await.expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"].as_str(), Some("validation_error"));
}

#[sqlx::test(migrations = "../../migrations")]
async fn logout_revokes_the_session(pool: sqlx::PgPool) {
    let state = test_state(pool, ExtractConfig::default());
    let sessions = state.sessions.clone();
    let app = build_app(state, default_rate_limit_state());
    let token = sessions.create().await;
    let cookie = format!("{SESSION_COOKIE}={token}");

    let mut request = Request::builder()
        .method("POST")
        .uri("/api/v1/admin/logout")
        .body(Body::empty())
        .expect("request");
    request
        .headers_mut()
        .insert(header::COOKIE, cookie.parse().expect("cookie header"));
    let response = app.clone().oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert!(!sessions.validate(&token).await);

    // The revoked cookie no longer opens the admin surface.
    let mut request = json_request(
        "POST",
        "/api/v1/gifts",
        serde_json::json!({ "title": "After logout" }),
    );
    request
        .headers_mut()
        .insert(header::COOKIE, cookie.parse().expect("cookie header"));
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../migrations")]
async fn preview_rejects_unusable_urls(pool: sqlx::PgPool) {
    let state = test_state(pool, ExtractConfig::default());
    let sessions = state.sessions.clone();
    let app = build_app(state, default_rate_limit_state());
    let cookie = format!("{SESSION_COOKIE}={}", sessions.create().await);

    for url in ["not a url", "http://192.168.1.20/secret"] {
        let mut request = json_request(
            "POST",
            "/api/v1/preview",
            serde_json::json!({ "url": url }),
        );
        request
            .headers_mut()
            .insert(header::COOKIE, cookie.parse().expect("cookie header"));
        let response = app.clone().oneshot(request).await.expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "url {url}");
    }
}

#[sqlx::test(migrations = "../../migrations")]
async fn preview_returns_extracted_metadata(pool: sqlx::PgPool) {
    let server = wiremock::MockServer::start().await;
    wiremock::Mock::given(wiremock::matchers::method("GET"))
        .and(wiremock::matchers::path("/item"))
        .respond_with(
            wiremock::ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .set_body_string(
                    "<html><head><meta property=\"og:title\" content=\"Lego Set\" /></head></html>",
                ),
        )
        .mount(&server)
        .await;

    let extract_config = ExtractConfig {
        allow_private_hosts: true,
        microlink_endpoint: format!("{}/unfurl", server.uri()),
        ..ExtractConfig::default()
    };
    let state = test_state(pool, extract_config);
    let sessions = state.sessions.clone();
    let app = build_app(state, default_rate_limit_state());
    let cookie = format!("{SESSION_COOKIE}={}", sessions.create().await);

    let mut request = json_request(
        "POST",
        "/api/v1/preview",
        serde_json::json!({ "url": format!("{}/item", server.uri()) }),
    );
    request
        .headers_mut()
        .insert(header::COOKIE, cookie.parse().expect("cookie header"));
    let response = app.oneshot(request).await.expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["source"].as_str(), Some("html"));
    assert_eq!(json["data"]["result"]["title"].as_str(), Some("Lego Set"));
}
