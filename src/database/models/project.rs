use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::BTreeMap;
use uuid::Uuid;

pub const NAME_MAX_LEN: usize = 100;
pub const DESCRIPTION_MAX_LEN: usize = 2000;

/// A project owned by a single user. `id` is `None` until the record is saved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Project {
    pub id: Option<Uuid>,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Submitted attribute set. Absent fields leave the current value untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectParams {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl ProjectParams {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            description: None,
        }
    }
}

/// Field-level validation messages, keyed by attribute name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.insert(field.into(), message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }
}

impl Project {
    /// Construct an unsaved project owned by `user_id`.
    pub fn build(user_id: Uuid, params: ProjectParams) -> Self {
        let mut project = Self {
            id: None,
            user_id,
            name: String::new(),
            description: None,
            created_at: None,
            updated_at: None,
        };
        project.assign(params);
        project
    }

    pub fn assign(&mut self, params: ProjectParams) {
        if let Some(name) = params.name {
            self.name = name.trim().to_string();
        }
        if let Some(description) = params.description {
            let description = description.trim();
            self.description = if description.is_empty() {
                None
            } else {
                Some(description.to_string())
            };
        }
    }

    pub fn is_new_record(&self) -> bool {
        self.id.is_none()
    }

    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }

    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();

        if self.name.is_empty() {
            errors.add("name", "can't be blank");
        } else if self.name.chars().count() > NAME_MAX_LEN {
            errors.add("name", format!("is too long (maximum is {} characters)", NAME_MAX_LEN));
        }

        if let Some(description) = &self.description {
            if description.chars().count() > DESCRIPTION_MAX_LEN {
                errors.add(
                    "description",
                    format!("is too long (maximum is {} characters)", DESCRIPTION_MAX_LEN),
                );
            }
        }

        errors
    }
}
