// Response rendering: full HTML pages, JSON fragments and redirects

pub mod html;

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::{json, Map, Value};

use crate::api::format::{field_errors_to_value, project_to_api_value, projects_to_api_values};
use crate::database::models::{FieldErrors, Project};

pub const FLASH_NOTICE_HEADER: &str = "x-flash-notice";

/// Requested representation, resolved once per request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Format {
    /// Full document; may redirect
    #[default]
    Page,
    /// Partial content for in-place updates; never redirects
    Fragment,
}

impl Format {
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Page => "html",
            Format::Fragment => "js",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    Index,
    Show,
    New,
    Edit,
    Create,
    Update,
    Destroy,
}

impl Template {
    pub fn as_str(&self) -> &'static str {
        match self {
            Template::Index => "index",
            Template::Show => "show",
            Template::New => "new",
            Template::Edit => "edit",
            Template::Create => "create",
            Template::Update => "update",
            Template::Destroy => "destroy",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewData {
    Collection(Vec<Project>),
    Record(Project),
    /// Form state; `errors` is empty for a fresh form
    Form { project: Project, errors: FieldErrors },
}

/// A named template plus the data it renders
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    pub template: Template,
    pub format: Format,
    pub status: StatusCode,
    pub data: ViewData,
    pub notice: Option<String>,
}

impl View {
    pub fn new(template: Template, format: Format, data: ViewData) -> Self {
        Self {
            template,
            format,
            status: StatusCode::OK,
            data,
            notice: None,
        }
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn with_notice(mut self, notice: Option<String>) -> Self {
        self.notice = notice;
        self
    }

    pub fn render(&self) -> Rendered {
        match self.format {
            Format::Page => Rendered {
                status: self.status,
                content_type: "text/html; charset=utf-8",
                body: html::page(self),
                location: None,
                notice: self.notice.clone(),
            },
            Format::Fragment => Rendered {
                status: self.status,
                content_type: "application/json",
                body: fragment(self).to_string(),
                location: None,
                notice: self.notice.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub location: String,
    pub notice: Option<String>,
}

impl Redirect {
    pub fn to(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            notice: None,
        }
    }

    pub fn with_notice(mut self, notice: Option<String>) -> Self {
        self.notice = notice;
        self
    }

    /// 303 so the browser follows up with a GET
    pub fn render(&self) -> Rendered {
        Rendered {
            status: StatusCode::SEE_OTHER,
            content_type: "text/html; charset=utf-8",
            body: html::redirect_body(&self.location),
            location: Some(self.location.clone()),
            notice: self.notice.clone(),
        }
    }
}

/// A finished response body; cheap to clone into the response cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub status: StatusCode,
    pub content_type: &'static str,
    pub body: String,
    pub location: Option<String>,
    pub notice: Option<String>,
}

impl IntoResponse for Rendered {
    fn into_response(self) -> Response {
        let mut response = (self.status, self.body).into_response();
        let headers = response.headers_mut();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(self.content_type));

        if let Some(location) = self.location.and_then(|l| HeaderValue::from_str(&l).ok()) {
            headers.insert(header::LOCATION, location);
        }
        if let Some(notice) = self.notice.and_then(|n| HeaderValue::from_str(&n).ok()) {
            headers.insert(FLASH_NOTICE_HEADER, notice);
        }

        response
    }
}

fn fragment(view: &View) -> Value {
    let mut obj = Map::new();
    let errors = match &view.data {
        ViewData::Form { errors, .. } => Some(errors),
        _ => None,
    };

    obj.insert(
        "success".into(),
        Value::Bool(errors.map(|e| e.is_empty()).unwrap_or(true)),
    );
    obj.insert("template".into(), Value::String(view.template.as_str().to_string()));

    let data = match &view.data {
        ViewData::Collection(projects) => Value::Array(projects_to_api_values(projects)),
        ViewData::Record(project) => project_to_api_value(project),
        ViewData::Form { project, .. } => project_to_api_value(project),
    };
    obj.insert("data".into(), data);

    if let Some(errors) = errors.filter(|e| !e.is_empty()) {
        obj.insert("errors".into(), field_errors_to_value(errors));
    }
    if let Some(notice) = &view.notice {
        obj.insert("notice".into(), json!(notice));
    }

    Value::Object(obj)
}
