#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use vtrack_api::auth::session::SessionConfig;
use vtrack_api::config::{ServerConfig, StorageBackend};
use vtrack_api::router::build_app_router;
use vtrack_api::state::AppState;
use vtrack_core::roles::Role;
use vtrack_db::models::service::{CreateService, Service};
use vtrack_db::models::user::CreateUser;
use vtrack_db::{MemStorage, Storage};

/// Username of the non-admin account every test app starts with.
pub const PLAIN_USER: &str = "alice";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        storage: StorageBackend::Memory,
        seed_sample_data: false,
        session: SessionConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            ttl_mins: 60,
            cookie_secure: false,
        },
    }
}

/// The router under test plus a handle on its storage for direct seeding and
/// inspection.
pub struct TestApp {
    pub router: Router,
    pub storage: Arc<dyn Storage>,
}

/// Build the full application router (same middleware stack as production)
/// over a fresh in-memory store holding the `admin` and `alice` users.
pub async fn build_test_app() -> TestApp {
    let storage: Arc<dyn Storage> = Arc::new(MemStorage::new());
    vtrack_db::seed::ensure_admin_user(storage.as_ref())
        .await
        .expect("admin seeding should succeed");
    storage
        .create_user(&CreateUser {
            username: PLAIN_USER.to_string(),
            role: Role::User,
        })
        .await
        .expect("user seeding should succeed");

    let state = AppState::new(Arc::clone(&storage), test_config());
    let router = build_app_router(state).expect("router should build");
    TestApp { router, storage }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    /// Log in and return the `name=value` pair to send back as a `Cookie`.
    pub async fn login(&self, username: &str) -> String {
        let response = self
            .send(json_request(
                Method::POST,
                "/api/auth/login",
                serde_json::json!({ "username": username }),
                None,
            ))
            .await;
        assert_eq!(response.status(), StatusCode::OK, "login as {username} failed");
        session_cookie(&response).expect("login must set the session cookie")
    }

    pub async fn seed_auth_service(&self) -> Service {
        self.storage
            .create_service(&CreateService {
                name: "auth-service".into(),
                description: "Authentication & Authorization".into(),
                icon: Some("shield".into()),
                icon_color: Some("blue".into()),
                available_versions: Some(vec!["1.1.0".into(), "1.2.0".into(), "1.3.0".into()]),
                bau_version: Some("1.2.0".into()),
                uat_version: Some("1.3.0".into()),
                prod_version: Some("1.1.0".into()),
            })
            .await
            .expect("seeding auth-service should succeed")
    }

    pub async fn get(&self, uri: &str) -> Response {
        self.send(empty_request(Method::GET, uri, None)).await
    }

    pub async fn get_auth(&self, uri: &str, cookie: &str) -> Response {
        self.send(empty_request(Method::GET, uri, Some(cookie))).await
    }

    pub async fn post_json(&self, uri: &str, body: serde_json::Value) -> Response {
        self.send(json_request(Method::POST, uri, body, None)).await
    }

    pub async fn post_json_auth(&self, uri: &str, body: serde_json::Value, cookie: &str) -> Response {
        self.send(json_request(Method::POST, uri, body, Some(cookie))).await
    }

    pub async fn put_json_auth(&self, uri: &str, body: serde_json::Value, cookie: &str) -> Response {
        self.send(json_request(Method::PUT, uri, body, Some(cookie))).await
    }

    pub async fn patch_json_auth(&self, uri: &str, body: serde_json::Value, cookie: &str) -> Response {
        self.send(json_request(Method::PATCH, uri, body, Some(cookie))).await
    }

    pub async fn delete_auth(&self, uri: &str, cookie: &str) -> Response {
        self.send(empty_request(Method::DELETE, uri, Some(cookie))).await
    }
}

pub fn empty_request(method: Method, uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn json_request(
    method: Method,
    uri: &str,
    body: serde_json::Value,
    cookie: Option<&str>,
) -> Request<Body> {
    raw_json_request(method, uri, body.to_string(), cookie)
}

pub fn raw_json_request(
    method: Method,
    uri: &str,
    body: String,
    cookie: Option<&str>,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }
    builder.body(Body::from(body)).unwrap()
}

/// GET with an `Authorization: Bearer` header instead of a cookie.
pub fn bearer_request(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

/// The `vtrack_session=...` pair from a response's `Set-Cookie`, if any.
pub fn session_cookie(response: &Response) -> Option<String> {
    response
        .headers()
        .get(SET_COOKIE)?
        .to_str()
        .ok()?
        .split(';')
        .next()
        .map(str::to_string)
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}
