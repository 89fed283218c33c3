use serde_json::{json, Map, Value};

use crate::database::models::{FieldErrors, Project};

pub const PROJECT_TYPE: &str = "projects";

/// Canonical view path for a saved project
pub fn project_path(project: &Project) -> Option<String> {
    project.id.map(|id| format!("/{}/{}", PROJECT_TYPE, id))
}

/// Canonical listing path
pub fn projects_path() -> String {
    format!("/{}", PROJECT_TYPE)
}

/// Convert a project into the public wire format
/// { id, type, attributes, links }
///
/// Unsaved projects carry neither `id` nor `links`.
pub fn project_to_api_value(project: &Project) -> Value {
    let mut attributes = Map::new();
    attributes.insert("name".into(), Value::String(project.name.clone()));
    attributes.insert(
        "description".into(),
        project
            .description
            .clone()
            .map(Value::String)
            .unwrap_or(Value::Null),
    );
    attributes.insert("user_id".into(), Value::String(project.user_id.to_string()));
    attributes.insert(
        "created_at".into(),
        json!(project.created_at.map(|dt| dt.to_rfc3339())),
    );
    attributes.insert(
        "updated_at".into(),
        json!(project.updated_at.map(|dt| dt.to_rfc3339())),
    );

    let mut obj = Map::new();
    if let Some(id) = project.id {
        obj.insert("id".into(), Value::String(id.to_string()));
    }
    obj.insert("type".into(), Value::String(PROJECT_TYPE.to_string()));
    obj.insert("attributes".into(), Value::Object(attributes));
    if let Some(path) = project_path(project) {
        obj.insert("links".into(), json!({ "self": path }));
    }

    Value::Object(obj)
}

/// Convert a list of projects to API values
pub fn projects_to_api_values(projects: &[Project]) -> Vec<Value> {
    projects.iter().map(project_to_api_value).collect()
}

pub fn field_errors_to_value(errors: &FieldErrors) -> Value {
    serde_json::to_value(errors).unwrap_or(Value::Null)
}
