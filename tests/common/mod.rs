// Shared harness: builds the full router in-process and drives it with oneshot
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request},
    response::Response,
    Router,
};
use tower::ServiceExt;
use uuid::Uuid;

use projects_api::auth::{generate_jwt, Claims};
use projects_api::cache::{MemoryResponseCache, NoCache, ResponseCache};
use projects_api::controller::ProjectsController;
use projects_api::database::models::{Access, User};
use projects_api::database::{MemoryProjectStore, ProjectStore};
use projects_api::middleware::AuthSettings;
use projects_api::policy::AccessPolicy;
use projects_api::routes::{app, AppState, RouterOptions};

pub const SECRET: &str = "integration-test-secret";

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryProjectStore>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::build(Arc::new(NoCache), default_options())
    }

    pub fn with_cache() -> Self {
        Self::build(
            Arc::new(MemoryResponseCache::new(Duration::from_secs(60))),
            default_options(),
        )
    }

    pub fn with_options(options: RouterOptions) -> Self {
        Self::build(Arc::new(NoCache), options)
    }

    fn build(cache: Arc<dyn ResponseCache>, options: RouterOptions) -> Self {
        let store = Arc::new(MemoryProjectStore::new());
        let shared: Arc<dyn ProjectStore> = store.clone();
        let controller = ProjectsController::new(shared, Arc::new(AccessPolicy), cache);
        let router = app(AppState::new(controller), AuthSettings::new(SECRET), options);
        Self { router, store }
    }

    pub async fn send(&self, request: Request<Body>) -> Result<Response> {
        Ok(self.router.clone().oneshot(request).await?)
    }
}

fn default_options() -> RouterOptions {
    RouterOptions {
        enable_cors: false,
        enable_request_logging: true,
    }
}

pub fn user(access: Access) -> User {
    User::new(Uuid::new_v4(), "tester", access)
}

pub fn token_for(user: &User) -> String {
    generate_jwt(&Claims::for_user(user, 1), SECRET).expect("token should encode")
}

pub fn get(uri: &str, user: Option<&User>) -> Request<Body> {
    request(Method::GET, uri, user, None, Body::empty())
}

pub fn delete(uri: &str, user: Option<&User>) -> Request<Body> {
    request(Method::DELETE, uri, user, None, Body::empty())
}

pub fn json_body(method: Method, uri: &str, user: Option<&User>, body: serde_json::Value) -> Request<Body> {
    request(method, uri, user, Some("application/json"), Body::from(body.to_string()))
}

pub fn form(method: Method, uri: &str, user: Option<&User>, body: &str) -> Request<Body> {
    request(
        method,
        uri,
        user,
        Some("application/x-www-form-urlencoded"),
        Body::from(body.to_string()),
    )
}

/// Marks the request as an in-page (fragment) call
pub fn xhr(mut request: Request<Body>) -> Request<Body> {
    request
        .headers_mut()
        .insert("x-requested-with", "XMLHttpRequest".parse().expect("static header"));
    request
}

fn request(
    method: Method,
    uri: &str,
    user: Option<&User>,
    content_type: Option<&str>,
    body: Body,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token_for(user)));
    }
    if let Some(content_type) = content_type {
        builder = builder.header(header::CONTENT_TYPE, content_type);
    }
    builder.body(body).expect("request should build")
}

pub async fn body_text(response: Response) -> Result<String> {
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    Ok(String::from_utf8(bytes.to_vec())?)
}

pub async fn body_json(response: Response) -> Result<serde_json::Value> {
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

pub fn header_value(response: &Response, name: &str) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}
