use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::auth::decode_jwt;
use crate::database::models::User;

/// Authenticated user attached to the request by `authenticate_middleware`
#[derive(Clone, Debug)]
pub struct CurrentUser(pub User);

/// Secret used to verify bearer tokens
#[derive(Clone)]
pub struct AuthSettings {
    pub jwt_secret: Arc<str>,
}

impl AuthSettings {
    pub fn new(jwt_secret: impl Into<Arc<str>>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
        }
    }
}

/// JWT authentication middleware.
///
/// Attaches `CurrentUser` when the bearer token verifies. It never rejects:
/// whether a user is required is decided by the `require_login` guard.
pub async fn authenticate_middleware(
    State(settings): State<AuthSettings>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Response {
    match extract_jwt_from_headers(&headers) {
        Ok(Some(token)) => match decode_jwt(&token, &settings.jwt_secret) {
            Ok(claims) => {
                let user = User::from(claims);
                tracing::debug!("Authenticated user {} ({})", user.name, user.id);
                request.extensions_mut().insert(CurrentUser(user));
            }
            Err(e) => tracing::debug!("Ignoring bearer token: {}", e),
        },
        Ok(None) => {}
        Err(msg) => tracing::debug!("Ignoring Authorization header: {}", msg),
    }

    next.run(request).await
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<Option<String>, String> {
    let Some(auth_header) = headers.get(axum::http::header::AUTHORIZATION) else {
        return Ok(None);
    };

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err("Empty JWT token".to_string());
        }
        Ok(Some(token.trim().to_string()))
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}
