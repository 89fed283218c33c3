use axum::http::HeaderMap;
use uuid::Uuid;

use crate::database::models::{ProjectParams, User};
use crate::error::ApiError;
use crate::views::Format;

/// Raw hints about what the client wants back. Resolved by the `load_client` guard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientHints {
    pub accept: Option<String>,
    pub requested_with: Option<String>,
    /// Path extension such as `js` in `/projects.js`
    pub extension: Option<String>,
}

impl ClientHints {
    pub fn from_headers(headers: &HeaderMap, extension: Option<&str>) -> Self {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(|v| v.to_string())
        };

        Self {
            accept: header("accept"),
            requested_with: header("x-requested-with"),
            extension: extension.map(|e| e.to_ascii_lowercase()),
        }
    }

    pub fn page() -> Self {
        Self::default()
    }

    pub fn fragment() -> Self {
        Self {
            extension: Some("js".to_string()),
            ..Self::default()
        }
    }

    /// Extension wins, then `X-Requested-With`, then the first recognised Accept entry.
    pub fn resolve_format(&self) -> Format {
        match self.extension.as_deref() {
            Some("js") | Some("json") => return Format::Fragment,
            Some("html") => return Format::Page,
            _ => {}
        }

        if self
            .requested_with
            .as_deref()
            .is_some_and(|v| v.eq_ignore_ascii_case("XMLHttpRequest"))
        {
            return Format::Fragment;
        }

        if let Some(accept) = &self.accept {
            for media in accept.split(',') {
                let media = media.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
                match media.as_str() {
                    "text/html" | "application/xhtml+xml" | "*/*" => return Format::Page,
                    "text/javascript" | "application/javascript" | "application/json" => {
                        return Format::Fragment
                    }
                    _ => continue,
                }
            }
        }

        Format::Page
    }
}

/// Request parameters: the resource id and the submitted attribute set
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    pub id: Option<Uuid>,
    pub project: Option<ProjectParams>,
}

/// Transient message carried to the next rendered page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Flash {
    notice: Option<String>,
}

impl Flash {
    pub fn set_notice(&mut self, notice: impl Into<String>) {
        self.notice = Some(notice.into());
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }
}

/// Everything one request carries through the guards and into an action
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub current_user: Option<User>,
    pub params: Params,
    pub client: ClientHints,
    /// Set by `load_client`
    pub format: Option<Format>,
    pub flash: Flash,
}

impl RequestContext {
    pub fn new(current_user: Option<User>, client: ClientHints) -> Self {
        Self {
            current_user,
            client,
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.params.id = Some(id);
        self
    }

    pub fn with_project(mut self, project: ProjectParams) -> Self {
        self.params.project = Some(project);
        self
    }

    pub fn format(&self) -> Format {
        self.format.unwrap_or_default()
    }

    pub fn current_user(&self) -> Result<&User, ApiError> {
        self.current_user
            .as_ref()
            .ok_or_else(|| ApiError::unauthorized("You need to sign in before continuing"))
    }

    pub fn id(&self) -> Result<Uuid, ApiError> {
        self.params
            .id
            .ok_or_else(|| ApiError::bad_request("Missing project id"))
    }

    /// Missing attributes build an empty project, which validation then rejects.
    pub fn project_params(&self) -> ProjectParams {
        self.params.project.clone().unwrap_or_default()
    }
}
