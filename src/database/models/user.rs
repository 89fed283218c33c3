use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Access levels carried in the token's `access` claim, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Access {
    Deny,
    Read,
    Edit,
    Full,
    Root,
}

impl Access {
    /// Unknown values are treated as `Deny`.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "read" => Access::Read,
            "edit" => Access::Edit,
            "full" => Access::Full,
            "root" => Access::Root,
            _ => Access::Deny,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Access::Deny => "deny",
            Access::Read => "read",
            Access::Edit => "edit",
            Access::Full => "full",
            Access::Root => "root",
        }
    }

    pub fn at_least(&self, required: Access) -> bool {
        *self >= required
    }
}

/// The authenticated user a request runs on behalf of.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub access: Access,
}

impl User {
    pub fn new(id: Uuid, name: impl Into<String>, access: Access) -> Self {
        Self {
            id,
            name: name.into(),
            access,
        }
    }

    pub fn is_root(&self) -> bool {
        self.access == Access::Root
    }
}
