use axum::{
    extract::State,
    middleware,
    routing::get,
    Router,
};
use serde_json::{json, Value};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::controller::ProjectsController;
use crate::database::DatabaseManager;
use crate::error::ApiError;
use crate::handlers::projects;
use crate::middleware::{authenticate_middleware, ApiResponse, ApiResult, AuthSettings};

#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<ProjectsController>,
    /// Present when running on the Postgres store
    pub pool: Option<PgPool>,
}

impl AppState {
    pub fn new(controller: ProjectsController) -> Self {
        Self {
            controller: Arc::new(controller),
            pool: None,
        }
    }

    pub fn with_pool(mut self, pool: PgPool) -> Self {
        self.pool = Some(pool);
        self
    }
}

/// Optional outer layers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouterOptions {
    pub enable_cors: bool,
    pub enable_request_logging: bool,
}

impl RouterOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            enable_cors: config.security.enable_cors,
            enable_request_logging: config.server.enable_request_logging,
        }
    }
}

pub fn app(state: AppState, auth: AuthSettings, options: RouterOptions) -> Router {
    let mut router = Router::new()
        .route("/health", get(health))
        .merge(project_routes())
        .layer(middleware::from_fn_with_state(auth, authenticate_middleware))
        .with_state(state);

    if options.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }
    if options.enable_cors {
        router = router.layer(CorsLayer::permissive());
    }
    router
}

fn project_routes() -> Router<AppState> {
    Router::new()
        .route("/projects", get(projects::index).post(projects::create))
        .route("/projects.js", get(projects::index_fragment))
        .route("/projects/new", get(projects::new_form))
        .route("/projects/new.js", get(projects::new_form_fragment))
        .route(
            "/projects/:id",
            get(projects::show)
                .put(projects::update)
                .patch(projects::update)
                // HTML forms cannot send PUT/PATCH
                .post(projects::update)
                .delete(projects::destroy),
        )
        .route("/projects/:id/edit", get(projects::edit))
}

async fn health(State(state): State<AppState>) -> ApiResult<Value> {
    let now = chrono::Utc::now();

    let store = match &state.pool {
        Some(pool) => {
            DatabaseManager::health_check(pool)
                .await
                .map_err(|e| {
                    tracing::error!("Health check failed: {}", e);
                    ApiError::service_unavailable("database unavailable")
                })?;
            "postgres"
        }
        None => "memory",
    };

    Ok(ApiResponse::success(json!({
        "status": "ok",
        "timestamp": now,
        "store": store,
    })))
}
