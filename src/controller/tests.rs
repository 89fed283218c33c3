use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use uuid::Uuid;

use super::*;
use crate::cache::{MemoryResponseCache, NoCache};
use crate::database::models::{Access, ProjectParams, User};
use crate::policy::PermissionKind;
use crate::testing::{test_user, CallLog, RecordingStore, ScriptedPolicy};

struct Harness {
    controller: ProjectsController,
    store: Arc<RecordingStore>,
    log: CallLog,
    user: User,
}

impl Harness {
    fn new(denied: &[PermissionKind]) -> Self {
        Self::with_cache(denied, Arc::new(NoCache))
    }

    fn with_cache(denied: &[PermissionKind], cache: Arc<dyn ResponseCache>) -> Self {
        let log = CallLog::default();
        let store = Arc::new(RecordingStore::new(log.clone()));
        let policy = Arc::new(ScriptedPolicy::denying(log.clone(), denied));
        let controller = ProjectsController::new(store.clone(), policy, cache);

        Self {
            controller,
            store,
            log,
            user: test_user(Access::Full),
        }
    }

    fn ctx(&self, client: ClientHints) -> RequestContext {
        RequestContext::new(Some(self.user.clone()), client)
    }

    fn page(&self) -> RequestContext {
        self.ctx(ClientHints::page())
    }

    fn fragment(&self) -> RequestContext {
        self.ctx(ClientHints::fragment())
    }

    fn store_calls(&self) -> Vec<String> {
        self.log
            .entries()
            .into_iter()
            .filter(|e| e.starts_with("store."))
            .collect()
    }

    fn mutations(&self) -> Vec<String> {
        self.log
            .entries()
            .into_iter()
            .filter(|e| RecordingStore::is_mutation(e))
            .collect()
    }
}

fn expect_view(outcome: Outcome) -> View {
    match outcome {
        Outcome::Render(view) => view,
        other => panic!("expected a rendered view, got {:?}", other),
    }
}

fn expect_redirect(outcome: Outcome) -> Redirect {
    match outcome {
        Outcome::Redirect(redirect) => redirect,
        other => panic!("expected a redirect, got {:?}", other),
    }
}

fn before(log: &CallLog, first: &str, second: &str) -> bool {
    match (log.position(first), log.position(second)) {
        (Some(a), Some(b)) => a < b,
        _ => false,
    }
}

#[tokio::test]
async fn unauthenticated_requests_touch_nothing() {
    let h = Harness::new(&[]);
    for action in Action::ALL {
        let ctx = RequestContext::new(None, ClientHints::page()).with_id(Uuid::new_v4());
        let err = h.controller.dispatch(action, ctx).await.unwrap_err();
        assert_eq!(err.status_code(), 401, "action {}", action);
    }
    assert!(h.log.entries().is_empty());
}

#[tokio::test]
async fn index_authorizes_type_before_loading() {
    let h = Harness::new(&[]);
    h.store.seed(Uuid::new_v4(), "someone else's").await;

    let outcome = h.controller.dispatch(Action::Index, h.page()).await.unwrap();
    assert_eq!(outcome.status(), StatusCode::OK);
    assert!(before(&h.log, "policy.list", "store.all"));

    // Lists every project, not only the current user's
    let rendered = outcome.into_rendered();
    assert!(rendered.body.contains("someone else&#39;s"));
}

#[tokio::test]
async fn index_denied_loads_nothing() {
    let h = Harness::new(&[PermissionKind::List]);
    let err = h.controller.dispatch(Action::Index, h.page()).await.unwrap_err();
    assert_eq!(err.status_code(), 403);
    assert_eq!(h.log.entries(), vec!["policy.list"]);
}

#[tokio::test]
async fn index_is_served_from_cache_until_a_mutation() {
    let cache = Arc::new(MemoryResponseCache::new(Duration::from_secs(60)));
    let h = Harness::with_cache(&[], cache);

    let first = h.controller.dispatch(Action::Index, h.page()).await.unwrap();
    let second = h.controller.dispatch(Action::Index, h.page()).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(h.store_calls(), vec!["store.all"]);

    // Cached responses still pass the list check
    assert_eq!(h.log.entries().iter().filter(|e| *e == "policy.list").count(), 2);

    // Fragment requests are cached separately
    h.controller.dispatch(Action::Index, h.fragment()).await.unwrap();
    assert_eq!(h.store_calls().len(), 2);

    h.controller
        .dispatch(Action::Create, h.page().with_project(ProjectParams::named("Ranger")))
        .await
        .unwrap();
    h.log.clear();

    let fresh = h.controller.dispatch(Action::Index, h.page()).await.unwrap();
    assert_eq!(h.store_calls(), vec!["store.all"]);
    assert!(fresh.into_rendered().body.contains("Ranger"));
}

#[tokio::test]
async fn show_renders_the_scoped_collection() {
    let h = Harness::new(&[]);
    let mine = h.store.seed(h.user.id, "Mine").await;
    let theirs = h.store.seed(Uuid::new_v4(), "Theirs").await;

    // The id is ignored; the whole scoped collection is loaded
    let ctx = h.page().with_id(theirs.id.unwrap());
    let view = expect_view(h.controller.dispatch(Action::Show, ctx).await.unwrap());

    assert_eq!(view.template, Template::Show);
    assert_eq!(view.data, ViewData::Collection(vec![mine]));
    assert!(before(&h.log, "store.scoped", "policy.view"));
}

#[tokio::test]
async fn show_denied_is_forbidden() {
    let h = Harness::new(&[PermissionKind::View]);
    let err = h.controller.dispatch(Action::Show, h.page()).await.unwrap_err();
    assert_eq!(err.status_code(), 403);
}

#[tokio::test]
async fn new_form_builds_then_authorizes() {
    let h = Harness::new(&[]);
    let view = expect_view(h.controller.dispatch(Action::New, h.fragment()).await.unwrap());

    assert_eq!(view.template, Template::New);
    assert_eq!(view.format, Format::Fragment);
    match view.data {
        ViewData::Form { project, errors } => {
            assert!(project.is_new_record());
            assert!(project.is_owned_by(h.user.id));
            assert!(errors.is_empty());
        }
        other => panic!("expected form, got {:?}", other),
    }
    assert!(before(&h.log, "store.build_scoped", "policy.create"));
    assert!(h.mutations().is_empty());
}

#[tokio::test]
async fn create_page_redirects_to_new_project() {
    let h = Harness::new(&[]);
    let ctx = h.page().with_project(ProjectParams::named("Skylab"));
    let redirect = expect_redirect(h.controller.dispatch(Action::Create, ctx).await.unwrap());

    let saved = h.store.scoped(h.user.id).await.unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(redirect.location, format!("/projects/{}", saved[0].id.unwrap()));
    assert_eq!(redirect.notice.as_deref(), Some(CREATED_NOTICE));
    assert!(before(&h.log, "store.build_scoped", "policy.create"));
    assert!(before(&h.log, "policy.create", "store.save"));
}

#[tokio::test]
async fn create_fragment_renders_without_redirect() {
    let h = Harness::new(&[]);
    let ctx = h.fragment().with_project(ProjectParams::named("Salyut"));
    let view = expect_view(h.controller.dispatch(Action::Create, ctx).await.unwrap());

    assert_eq!(view.template, Template::Create);
    assert_eq!(view.status, StatusCode::CREATED);
    assert_eq!(view.notice.as_deref(), Some(CREATED_NOTICE));
    assert!(matches!(view.data, ViewData::Record(ref p) if p.name == "Salyut" && p.id.is_some()));
}

#[tokio::test]
async fn create_invalid_rerenders_new_form_in_both_formats() {
    let h = Harness::new(&[]);
    for ctx in [h.page(), h.fragment()] {
        let format = ctx.client.resolve_format();
        let ctx = ctx.with_project(ProjectParams::named("   "));
        let view = expect_view(h.controller.dispatch(Action::Create, ctx).await.unwrap());

        assert_eq!(view.template, Template::New);
        assert_eq!(view.format, format);
        assert_eq!(view.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(view.notice, None);
        match view.data {
            ViewData::Form { project, errors } => {
                assert!(project.is_new_record());
                assert_eq!(errors.get("name"), Some("can't be blank"));
            }
            other => panic!("expected form, got {:?}", other),
        }
    }
    assert_eq!(h.store.count().await, 0);
}

#[tokio::test]
async fn create_denied_persists_nothing() {
    let h = Harness::new(&[PermissionKind::Create]);
    let ctx = h.page().with_project(ProjectParams::named("Mir"));
    let err = h.controller.dispatch(Action::Create, ctx).await.unwrap_err();

    assert_eq!(err.status_code(), 403);
    assert!(h.mutations().is_empty());
    assert_eq!(h.store.count().await, 0);
}

#[tokio::test]
async fn edit_loads_within_scope_and_checks_update() {
    let h = Harness::new(&[]);
    let project = h.store.seed(h.user.id, "Tiangong").await;
    let ctx = h.page().with_id(project.id.unwrap());
    let view = expect_view(h.controller.dispatch(Action::Edit, ctx).await.unwrap());

    assert_eq!(view.template, Template::Edit);
    assert!(before(&h.log, "store.find_scoped", "policy.update"));
    assert!(h.mutations().is_empty());
}

#[tokio::test]
async fn update_outside_scope_is_not_found() {
    let h = Harness::new(&[]);
    let theirs = h.store.seed(Uuid::new_v4(), "Theirs").await;
    let ctx = h
        .page()
        .with_id(theirs.id.unwrap())
        .with_project(ProjectParams::named("Hijacked"));

    let err = h.controller.dispatch(Action::Update, ctx).await.unwrap_err();
    assert_eq!(err.status_code(), 404);
    assert!(!h.log.contains("policy.update"));
    assert!(h.mutations().is_empty());
}

#[tokio::test]
async fn update_page_redirects_and_persists() {
    let h = Harness::new(&[]);
    let project = h.store.seed(h.user.id, "Zarya").await;
    let id = project.id.unwrap();

    let ctx = h.page().with_id(id).with_project(ProjectParams::named("Zvezda"));
    let redirect = expect_redirect(h.controller.dispatch(Action::Update, ctx).await.unwrap());

    assert_eq!(redirect.location, format!("/projects/{}", id));
    assert_eq!(redirect.notice.as_deref(), Some(UPDATED_NOTICE));
    assert_eq!(h.store.find_scoped(h.user.id, id).await.unwrap().name, "Zvezda");
    assert!(before(&h.log, "policy.update", "store.save"));
}

#[tokio::test]
async fn update_fragment_renders_in_place() {
    let h = Harness::new(&[]);
    let project = h.store.seed(h.user.id, "Unity").await;
    let ctx = h
        .fragment()
        .with_id(project.id.unwrap())
        .with_project(ProjectParams::named("Harmony"));

    let view = expect_view(h.controller.dispatch(Action::Update, ctx).await.unwrap());
    assert_eq!(view.template, Template::Update);
    assert_eq!(view.status, StatusCode::OK);
    assert_eq!(view.notice.as_deref(), Some(UPDATED_NOTICE));
}

#[tokio::test]
async fn update_invalid_rerenders_edit_form() {
    let h = Harness::new(&[]);
    let project = h.store.seed(h.user.id, "Destiny").await;
    let id = project.id.unwrap();

    for ctx in [h.page(), h.fragment()] {
        let ctx = ctx.with_id(id).with_project(ProjectParams::named(""));
        let view = expect_view(h.controller.dispatch(Action::Update, ctx).await.unwrap());
        assert_eq!(view.template, Template::Edit);
        assert_eq!(view.status, StatusCode::UNPROCESSABLE_ENTITY);
        // The rejected in-memory state is what gets shown
        assert!(matches!(view.data, ViewData::Form { ref project, .. } if project.name.is_empty()));
    }
    assert_eq!(h.store.find_scoped(h.user.id, id).await.unwrap().name, "Destiny");
}

#[tokio::test]
async fn update_denied_leaves_record_untouched() {
    let h = Harness::new(&[PermissionKind::Update]);
    let project = h.store.seed(h.user.id, "Columbus").await;
    let ctx = h
        .page()
        .with_id(project.id.unwrap())
        .with_project(ProjectParams::named("Kibo"));

    let err = h.controller.dispatch(Action::Update, ctx).await.unwrap_err();
    assert_eq!(err.status_code(), 403);
    assert!(h.mutations().is_empty());
}

#[tokio::test]
async fn destroy_page_redirects_to_listing() {
    let h = Harness::new(&[]);
    let project = h.store.seed(h.user.id, "Quest").await;
    let ctx = h.page().with_id(project.id.unwrap());

    let redirect = expect_redirect(h.controller.dispatch(Action::Destroy, ctx).await.unwrap());
    assert_eq!(redirect, Redirect::to("/projects"));
    assert_eq!(h.store.count().await, 0);
    assert!(before(&h.log, "policy.destroy", "store.destroy"));
}

#[tokio::test]
async fn destroy_fragment_renders_destroyed_record() {
    let h = Harness::new(&[]);
    let project = h.store.seed(h.user.id, "Pirs").await;
    let ctx = h.fragment().with_id(project.id.unwrap());

    let view = expect_view(h.controller.dispatch(Action::Destroy, ctx).await.unwrap());
    assert_eq!(view.template, Template::Destroy);
    assert_eq!(view.data, ViewData::Record(project));
}

#[tokio::test]
async fn repeated_denial_is_idempotent() {
    let h = Harness::new(&[PermissionKind::Destroy]);
    let project = h.store.seed(h.user.id, "Poisk").await;

    let mut errors = Vec::new();
    for _ in 0..3 {
        let ctx = h.page().with_id(project.id.unwrap());
        errors.push(h.controller.dispatch(Action::Destroy, ctx).await.unwrap_err());
    }

    assert!(errors.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(errors[0].status_code(), 403);
    assert!(h.mutations().is_empty());
    assert_eq!(h.store.count().await, 1);
}
