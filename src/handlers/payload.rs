use async_trait::async_trait;
use axum::{
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
    Form, Json,
};
use serde_json::Value;

use crate::database::models::ProjectParams;
use crate::error::ApiError;

/// Submitted project attributes, from JSON or an HTML form.
///
/// Accepts `{"project": {...}}` or a flat object for JSON, and `project[name]`
/// or `name` keys for forms. A bodiless request yields empty params.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectPayload(pub ProjectParams);

#[async_trait]
impl<S> FromRequest<S> for ProjectPayload
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_ascii_lowercase();

        if content_type.starts_with("application/json") {
            let Json(value) = Json::<Value>::from_request(req, state)
                .await
                .map_err(|e| ApiError::bad_request(e.body_text()))?;
            return params_from_json(value).map(ProjectPayload);
        }

        if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(fields) = Form::<Vec<(String, String)>>::from_request(req, state)
                .await
                .map_err(|e| ApiError::bad_request(e.body_text()))?;
            return Ok(ProjectPayload(params_from_form(fields)));
        }

        if content_type.is_empty() {
            return Ok(ProjectPayload::default());
        }

        Err(ApiError::unsupported_media_type(format!(
            "Unsupported content type: {}",
            content_type
        )))
    }
}

pub fn params_from_json(value: Value) -> Result<ProjectParams, ApiError> {
    let inner = match value {
        Value::Object(mut map) => match map.remove("project") {
            Some(project) => project,
            None => Value::Object(map),
        },
        Value::Null => return Ok(ProjectParams::default()),
        _ => return Err(ApiError::bad_request("Project attributes must be a JSON object")),
    };

    serde_json::from_value(inner)
        .map_err(|e| ApiError::bad_request(format!("Invalid project attributes: {}", e)))
}

pub fn params_from_form(fields: Vec<(String, String)>) -> ProjectParams {
    let mut params = ProjectParams::default();
    for (key, value) in fields {
        let key = key
            .strip_prefix("project[")
            .and_then(|k| k.strip_suffix(']'))
            .unwrap_or(&key);
        match key {
            "name" => params.name = Some(value),
            "description" => params.description = Some(value),
            _ => {}
        }
    }
    params
}
