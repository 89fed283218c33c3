//! Project resource handler.
//!
//! Every action runs the same way: guards, then load or construct, then
//! authorize, then mutate, then respond. Authorization always happens after
//! the instance exists and before anything is written. `index` is the one
//! exception: it authorizes against the resource type before loading.

pub mod context;
pub mod filters;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::api::format::{project_path, projects_path};
use crate::cache::ResponseCache;
use crate::database::models::{FieldErrors, Project};
use crate::database::{ProjectStore, SaveOutcome};
use crate::error::ApiError;
use crate::policy::{Enforce, Permissions, ResourceType};
use crate::views::{Format, Redirect, Rendered, Template, View, ViewData};

pub use context::{ClientHints, Flash, Params, RequestContext};
pub use filters::{Action, FilterChain, Guard, LoadClient, RequireLogin};

pub const CREATED_NOTICE: &str = "Project was successfully created.";
pub const UPDATED_NOTICE: &str = "Project was successfully updated.";

const INDEX_CACHE_PREFIX: &str = "projects#index";

/// What an action produced
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Render(View),
    Redirect(Redirect),
    /// Already rendered, possibly served from the response cache
    Rendered(Rendered),
}

impl Outcome {
    pub fn into_rendered(self) -> Rendered {
        match self {
            Outcome::Render(view) => view.render(),
            Outcome::Redirect(redirect) => redirect.render(),
            Outcome::Rendered(rendered) => rendered,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Outcome::Render(view) => view.status,
            Outcome::Redirect(_) => StatusCode::SEE_OTHER,
            Outcome::Rendered(rendered) => rendered.status,
        }
    }
}

impl IntoResponse for Outcome {
    fn into_response(self) -> Response {
        self.into_rendered().into_response()
    }
}

pub struct ProjectsController {
    store: Arc<dyn ProjectStore>,
    policy: Arc<dyn Permissions>,
    cache: Arc<dyn ResponseCache>,
    filters: FilterChain,
}

impl ProjectsController {
    pub fn new(
        store: Arc<dyn ProjectStore>,
        policy: Arc<dyn Permissions>,
        cache: Arc<dyn ResponseCache>,
    ) -> Self {
        Self {
            store,
            policy,
            cache,
            filters: FilterChain::standard(),
        }
    }

    pub fn with_filters(mut self, filters: FilterChain) -> Self {
        self.filters = filters;
        self
    }

    pub fn filters(&self) -> &FilterChain {
        &self.filters
    }

    /// Run the guard chain, then the action.
    pub async fn dispatch(&self, action: Action, mut ctx: RequestContext) -> Result<Outcome, ApiError> {
        self.filters.run(action, &mut ctx)?;

        tracing::info!(
            "Processing ProjectsController#{} as {} for user {:?}",
            action,
            ctx.format().as_str(),
            ctx.current_user.as_ref().map(|u| u.id)
        );

        match action {
            Action::Index => self.index(&mut ctx).await,
            Action::Show => self.show(&mut ctx).await,
            Action::New => self.new_form(&mut ctx).await,
            Action::Edit => self.edit(&mut ctx).await,
            Action::Create => self.create(&mut ctx).await,
            Action::Update => self.update(&mut ctx).await,
            Action::Destroy => self.destroy(&mut ctx).await,
        }
    }

    async fn index(&self, ctx: &mut RequestContext) -> Result<Outcome, ApiError> {
        let user = ctx.current_user()?;
        self.policy.enforce_list_permission(user, ResourceType::Project)?;

        let format = ctx.format();
        let key = index_cache_key(format);
        if let Some(hit) = self.cache.fetch(&key).await {
            return Ok(Outcome::Rendered(hit));
        }

        let projects = self.store.all().await?;
        let rendered = View::new(Template::Index, format, ViewData::Collection(projects)).render();
        self.cache.store(&key, rendered.clone()).await;

        Ok(Outcome::Rendered(rendered))
    }

    /// Loads the current user's whole collection, not the record named by id.
    async fn show(&self, ctx: &mut RequestContext) -> Result<Outcome, ApiError> {
        let user = ctx.current_user()?;
        let projects = self.store.scoped(user.id).await?;
        self.policy.enforce_view_permission(user, &projects)?;

        Ok(Outcome::Render(View::new(
            Template::Show,
            ctx.format(),
            ViewData::Collection(projects),
        )))
    }

    async fn new_form(&self, ctx: &mut RequestContext) -> Result<Outcome, ApiError> {
        let user = ctx.current_user()?;
        let project = self.store.build_scoped(user.id, ctx.project_params());
        self.policy.enforce_create_permission(user, &project)?;

        Ok(Outcome::Render(View::new(
            Template::New,
            ctx.format(),
            ViewData::Form {
                project,
                errors: FieldErrors::new(),
            },
        )))
    }

    async fn edit(&self, ctx: &mut RequestContext) -> Result<Outcome, ApiError> {
        let user = ctx.current_user()?;
        let project = self.store.find_scoped(user.id, ctx.id()?).await?;
        self.policy.enforce_update_permission(user, &project)?;

        Ok(Outcome::Render(View::new(
            Template::Edit,
            ctx.format(),
            ViewData::Form {
                project,
                errors: FieldErrors::new(),
            },
        )))
    }

    async fn create(&self, ctx: &mut RequestContext) -> Result<Outcome, ApiError> {
        let user = ctx.current_user()?;
        let project = self.store.build_scoped(user.id, ctx.project_params());
        self.policy.enforce_create_permission(user, &project)?;

        match self.store.save(project).await? {
            SaveOutcome::Saved(project) => {
                self.cache.expire(INDEX_CACHE_PREFIX).await;
                ctx.flash.set_notice(CREATED_NOTICE);
                tracing::info!("Created project {:?}", project.id);
                self.respond_saved(ctx, project, Template::Create, StatusCode::CREATED)
            }
            SaveOutcome::Rejected { project, errors } => {
                tracing::debug!("Create rejected: {} field error(s)", errors.len());
                Ok(rerender_form(Template::New, ctx.format(), project, errors))
            }
        }
    }

    async fn update(&self, ctx: &mut RequestContext) -> Result<Outcome, ApiError> {
        let user = ctx.current_user()?;
        let mut project = self.store.find_scoped(user.id, ctx.id()?).await?;
        self.policy.enforce_update_permission(user, &project)?;

        project.assign(ctx.project_params());
        match self.store.save(project).await? {
            SaveOutcome::Saved(project) => {
                self.cache.expire(INDEX_CACHE_PREFIX).await;
                ctx.flash.set_notice(UPDATED_NOTICE);
                tracing::info!("Updated project {:?}", project.id);
                self.respond_saved(ctx, project, Template::Update, StatusCode::OK)
            }
            SaveOutcome::Rejected { project, errors } => {
                tracing::debug!("Update rejected: {} field error(s)", errors.len());
                Ok(rerender_form(Template::Edit, ctx.format(), project, errors))
            }
        }
    }

    async fn destroy(&self, ctx: &mut RequestContext) -> Result<Outcome, ApiError> {
        let user = ctx.current_user()?;
        let project = self.store.find_scoped(user.id, ctx.id()?).await?;
        self.policy.enforce_destroy_permission(user, &project)?;

        self.store.destroy(&project).await?;
        self.cache.expire(INDEX_CACHE_PREFIX).await;
        tracing::info!("Destroyed project {:?}", project.id);

        Ok(match ctx.format() {
            Format::Page => Outcome::Redirect(Redirect::to(projects_path())),
            Format::Fragment => Outcome::Render(View::new(
                Template::Destroy,
                Format::Fragment,
                ViewData::Record(project),
            )),
        })
    }

    /// Post/redirect/get for pages; fragments render in place.
    fn respond_saved(
        &self,
        ctx: &RequestContext,
        project: Project,
        template: Template,
        status: StatusCode,
    ) -> Result<Outcome, ApiError> {
        let notice = ctx.flash.notice().map(str::to_string);

        match ctx.format() {
            Format::Page => {
                let location = project_path(&project)
                    .ok_or_else(|| ApiError::internal_server_error("Saved project has no id"))?;
                Ok(Outcome::Redirect(Redirect::to(location).with_notice(notice)))
            }
            Format::Fragment => Ok(Outcome::Render(
                View::new(template, Format::Fragment, ViewData::Record(project))
                    .with_status(status)
                    .with_notice(notice),
            )),
        }
    }
}

fn rerender_form(template: Template, format: Format, project: Project, errors: FieldErrors) -> Outcome {
    Outcome::Render(
        View::new(template, format, ViewData::Form { project, errors })
            .with_status(StatusCode::UNPROCESSABLE_ENTITY),
    )
}

fn index_cache_key(format: Format) -> String {
    format!("{}:{}", INDEX_CACHE_PREFIX, format.as_str())
}

#[cfg(test)]
mod tests;
