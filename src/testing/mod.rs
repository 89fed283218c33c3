// Test doubles that record the order of collaborator calls

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::database::models::{Access, Project, ProjectParams, User};
use crate::database::{DatabaseError, MemoryProjectStore, ProjectStore, SaveOutcome};
use crate::policy::{PermissionKind, Permissions, ResourceType};

/// Shared, ordered log of collaborator calls
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn position(&self, entry: &str) -> Option<usize> {
        self.entries().iter().position(|e| e == entry)
    }

    pub fn contains(&self, entry: &str) -> bool {
        self.position(entry).is_some()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap().clear();
    }
}

/// Memory store that logs every call as `store.<method>`
pub struct RecordingStore {
    inner: MemoryProjectStore,
    log: CallLog,
}

impl RecordingStore {
    pub fn new(log: CallLog) -> Self {
        Self {
            inner: MemoryProjectStore::new(),
            log,
        }
    }

    /// Insert directly, bypassing the log
    pub async fn seed(&self, owner: Uuid, name: &str) -> Project {
        let project = Project::build(owner, ProjectParams::named(name));
        match self.inner.save(project).await.unwrap() {
            SaveOutcome::Saved(p) => p,
            other => panic!("seed failed: {:?}", other),
        }
    }

    pub async fn count(&self) -> usize {
        self.inner.len().await
    }

    pub fn is_mutation(entry: &str) -> bool {
        matches!(entry, "store.save" | "store.destroy")
    }
}

#[async_trait]
impl ProjectStore for RecordingStore {
    async fn all(&self) -> Result<Vec<Project>, DatabaseError> {
        self.log.push("store.all");
        self.inner.all().await
    }

    async fn scoped(&self, user_id: Uuid) -> Result<Vec<Project>, DatabaseError> {
        self.log.push("store.scoped");
        self.inner.scoped(user_id).await
    }

    async fn find_scoped(&self, user_id: Uuid, id: Uuid) -> Result<Project, DatabaseError> {
        self.log.push("store.find_scoped");
        self.inner.find_scoped(user_id, id).await
    }

    fn build_scoped(&self, user_id: Uuid, params: ProjectParams) -> Project {
        self.log.push("store.build_scoped");
        self.inner.build_scoped(user_id, params)
    }

    async fn save(&self, project: Project) -> Result<SaveOutcome, DatabaseError> {
        self.log.push("store.save");
        self.inner.save(project).await
    }

    async fn destroy(&self, project: &Project) -> Result<(), DatabaseError> {
        self.log.push("store.destroy");
        self.inner.destroy(project).await
    }
}

/// Policy that denies exactly the configured kinds and logs `policy.<kind>`
pub struct ScriptedPolicy {
    denied: HashSet<PermissionKind>,
    log: CallLog,
}

impl ScriptedPolicy {
    pub fn allow_all(log: CallLog) -> Self {
        Self {
            denied: HashSet::new(),
            log,
        }
    }

    pub fn denying(log: CallLog, kinds: &[PermissionKind]) -> Self {
        Self {
            denied: kinds.iter().copied().collect(),
            log,
        }
    }

    fn decide(&self, kind: PermissionKind) -> bool {
        self.log.push(format!("policy.{}", kind.as_str()));
        !self.denied.contains(&kind)
    }
}

impl Permissions for ScriptedPolicy {
    fn can_list(&self, _user: &User, _resource: ResourceType) -> bool {
        self.decide(PermissionKind::List)
    }

    fn can_view(&self, _user: &User, _projects: &[Project]) -> bool {
        self.decide(PermissionKind::View)
    }

    fn can_create(&self, _user: &User, _project: &Project) -> bool {
        self.decide(PermissionKind::Create)
    }

    fn can_update(&self, _user: &User, _project: &Project) -> bool {
        self.decide(PermissionKind::Update)
    }

    fn can_destroy(&self, _user: &User, _project: &Project) -> bool {
        self.decide(PermissionKind::Destroy)
    }
}

pub fn test_user(access: Access) -> User {
    User::new(Uuid::new_v4(), "tester", access)
}
