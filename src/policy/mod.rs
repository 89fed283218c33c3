//! Authorization collaborator.
//!
//! `Permissions` exposes one check per action kind. Instance checks receive the
//! loaded or constructed project so the policy can inspect ownership; the list
//! check only ever sees the resource type. `Enforce` turns a denial into a
//! `PermissionDenied` error so handlers can stop with `?`.

use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use crate::database::models::{Access, Project, User};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceType {
    Project,
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceType::Project => write!(f, "Project"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PermissionKind {
    List,
    View,
    Create,
    Update,
    Destroy,
}

impl PermissionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionKind::List => "list",
            PermissionKind::View => "view",
            PermissionKind::Create => "create",
            PermissionKind::Update => "update",
            PermissionKind::Destroy => "destroy",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("User {user_id} may not {} {resource}", .kind.as_str())]
pub struct PermissionDenied {
    pub kind: PermissionKind,
    pub resource: ResourceType,
    pub user_id: Uuid,
}

pub trait Permissions: Send + Sync {
    fn can_list(&self, user: &User, resource: ResourceType) -> bool;

    /// `projects` is the collection the show action loaded.
    fn can_view(&self, user: &User, projects: &[Project]) -> bool;

    fn can_create(&self, user: &User, project: &Project) -> bool;

    fn can_update(&self, user: &User, project: &Project) -> bool;

    fn can_destroy(&self, user: &User, project: &Project) -> bool;
}

/// Denial-as-error wrappers over any `Permissions`.
pub trait Enforce {
    fn enforce_list_permission(&self, user: &User, resource: ResourceType) -> Result<(), PermissionDenied>;
    fn enforce_view_permission(&self, user: &User, projects: &[Project]) -> Result<(), PermissionDenied>;
    fn enforce_create_permission(&self, user: &User, project: &Project) -> Result<(), PermissionDenied>;
    fn enforce_update_permission(&self, user: &User, project: &Project) -> Result<(), PermissionDenied>;
    fn enforce_destroy_permission(&self, user: &User, project: &Project) -> Result<(), PermissionDenied>;
}

fn check(allowed: bool, kind: PermissionKind, resource: ResourceType, user: &User) -> Result<(), PermissionDenied> {
    if allowed {
        return Ok(());
    }
    tracing::warn!("Permission denied: user={} action={} resource={}", user.id, kind.as_str(), resource);
    Err(PermissionDenied {
        kind,
        resource,
        user_id: user.id,
    })
}

impl<P: Permissions + ?Sized> Enforce for P {
    fn enforce_list_permission(&self, user: &User, resource: ResourceType) -> Result<(), PermissionDenied> {
        check(self.can_list(user, resource), PermissionKind::List, resource, user)
    }

    fn enforce_view_permission(&self, user: &User, projects: &[Project]) -> Result<(), PermissionDenied> {
        check(self.can_view(user, projects), PermissionKind::View, ResourceType::Project, user)
    }

    fn enforce_create_permission(&self, user: &User, project: &Project) -> Result<(), PermissionDenied> {
        check(self.can_create(user, project), PermissionKind::Create, ResourceType::Project, user)
    }

    fn enforce_update_permission(&self, user: &User, project: &Project) -> Result<(), PermissionDenied> {
        check(self.can_update(user, project), PermissionKind::Update, ResourceType::Project, user)
    }

    fn enforce_destroy_permission(&self, user: &User, project: &Project) -> Result<(), PermissionDenied> {
        check(self.can_destroy(user, project), PermissionKind::Destroy, ResourceType::Project, user)
    }
}

/// Access-level policy.
///
/// | check   | level  | ownership            |
/// |---------|--------|----------------------|
/// | list    | read   | -                    |
/// | view    | read   | every project        |
/// | create  | edit   | required             |
/// | update  | edit   | required unless root |
/// | destroy | full   | required unless root |
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessPolicy;

impl AccessPolicy {
    fn owns_or_root(user: &User, project: &Project) -> bool {
        user.is_root() || project.is_owned_by(user.id)
    }
}

impl Permissions for AccessPolicy {
    fn can_list(&self, user: &User, _resource: ResourceType) -> bool {
        user.access.at_least(Access::Read)
    }

    fn can_view(&self, user: &User, projects: &[Project]) -> bool {
        user.access.at_least(Access::Read)
            && projects.iter().all(|p| Self::owns_or_root(user, p))
    }

    fn can_create(&self, user: &User, project: &Project) -> bool {
        user.access.at_least(Access::Edit) && project.is_owned_by(user.id)
    }

    fn can_update(&self, user: &User, project: &Project) -> bool {
        user.access.at_least(Access::Edit) && Self::owns_or_root(user, project)
    }

    fn can_destroy(&self, user: &User, project: &Project) -> bool {
        user.access.at_least(Access::Full) && Self::owns_or_root(user, project)
    }
}
