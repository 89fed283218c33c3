// handlers/projects.rs - HTTP entry points for the /projects resource
//
// Each handler only assembles a RequestContext and hands it to the controller.

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Extension,
};
use uuid::Uuid;

use super::payload::ProjectPayload;
use crate::controller::{Action, ClientHints, Outcome, RequestContext};
use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::routes::AppState;

type HandlerResult = Result<Outcome, ApiError>;

fn context(user: Option<Extension<CurrentUser>>, headers: &HeaderMap, extension: Option<&str>) -> RequestContext {
    let current_user = user.map(|Extension(CurrentUser(user))| user);
    RequestContext::new(current_user, ClientHints::from_headers(headers, extension))
}

/// Split `"<id>.js"` into the id and its format extension
fn split_extension(raw: &str) -> (&str, Option<&str>) {
    match raw.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => (stem, Some(ext)),
        _ => (raw, None),
    }
}

fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::not_found(format!("Project {} not found", raw)))
}

/// GET /projects
pub async fn index(
    State(state): State<AppState>,
    user: Option<Extension<CurrentUser>>,
    headers: HeaderMap,
) -> HandlerResult {
    state.controller.dispatch(Action::Index, context(user, &headers, None)).await
}

/// GET /projects.js
pub async fn index_fragment(
    State(state): State<AppState>,
    user: Option<Extension<CurrentUser>>,
    headers: HeaderMap,
) -> HandlerResult {
    state.controller.dispatch(Action::Index, context(user, &headers, Some("js"))).await
}

/// GET /projects/new
pub async fn new_form(
    State(state): State<AppState>,
    user: Option<Extension<CurrentUser>>,
    headers: HeaderMap,
) -> HandlerResult {
    state.controller.dispatch(Action::New, context(user, &headers, None)).await
}

/// GET /projects/new.js
pub async fn new_form_fragment(
    State(state): State<AppState>,
    user: Option<Extension<CurrentUser>>,
    headers: HeaderMap,
) -> HandlerResult {
    state.controller.dispatch(Action::New, context(user, &headers, Some("js"))).await
}

/// POST /projects
pub async fn create(
    State(state): State<AppState>,
    user: Option<Extension<CurrentUser>>,
    headers: HeaderMap,
    ProjectPayload(params): ProjectPayload,
) -> HandlerResult {
    let ctx = context(user, &headers, None).with_project(params);
    state.controller.dispatch(Action::Create, ctx).await
}

/// GET /projects/:id
///
/// The id is parsed for routing only; `show` renders the caller's collection.
pub async fn show(
    State(state): State<AppState>,
    user: Option<Extension<CurrentUser>>,
    headers: HeaderMap,
    Path(raw): Path<String>,
) -> HandlerResult {
    let (id, extension) = split_extension(&raw);
    let ctx = context(user, &headers, extension).with_id(parse_id(id)?);
    state.controller.dispatch(Action::Show, ctx).await
}

/// GET /projects/:id/edit
pub async fn edit(
    State(state): State<AppState>,
    user: Option<Extension<CurrentUser>>,
    headers: HeaderMap,
    Path(raw): Path<String>,
) -> HandlerResult {
    let ctx = context(user, &headers, None).with_id(parse_id(&raw)?);
    state.controller.dispatch(Action::Edit, ctx).await
}

/// PUT|PATCH|POST /projects/:id
pub async fn update(
    State(state): State<AppState>,
    user: Option<Extension<CurrentUser>>,
    headers: HeaderMap,
    Path(raw): Path<String>,
    ProjectPayload(params): ProjectPayload,
) -> HandlerResult {
    let (id, extension) = split_extension(&raw);
    let ctx = context(user, &headers, extension)
        .with_id(parse_id(id)?)
        .with_project(params);
    state.controller.dispatch(Action::Update, ctx).await
}

/// DELETE /projects/:id
pub async fn destroy(
    State(state): State<AppState>,
    user: Option<Extension<CurrentUser>>,
    headers: HeaderMap,
    Path(raw): Path<String>,
) -> HandlerResult {
    let (id, extension) = split_extension(&raw);
    let ctx = context(user, &headers, extension).with_id(parse_id(id)?);
    state.controller.dispatch(Action::Destroy, ctx).await
}
