//! Admin orchestrator: owns the in-memory collections for one admin session and
//! sequences load → edit → save/delete → reload.

use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, error, info};

use crate::application::content::{ContentError, ContentRepository};
use crate::application::session::{AuthError, SessionGuard};
use crate::domain::entities::{BlogPost, ContentEntity, Project};
use crate::domain::types::ContentKind;

use super::confirm::{DeleteConfirmation, DeletePress};
use super::forms::{BlogPostForm, FieldErrors, FormOutcome, ProjectForm};
use super::notifications::Notifications;

#[derive(Debug, Clone, PartialEq)]
pub enum EditorDraft {
    Project(ProjectForm),
    BlogPost(BlogPostForm),
}

impl EditorDraft {
    pub fn blank(kind: ContentKind) -> Self {
        match kind {
            ContentKind::Projects => EditorDraft::Project(ProjectForm::blank()),
            ContentKind::Blogs => EditorDraft::BlogPost(BlogPostForm::blank()),
        }
    }

    pub fn kind(&self) -> ContentKind {
        match self {
            EditorDraft::Project(_) => ContentKind::Projects,
            EditorDraft::BlogPost(_) => ContentKind::Blogs,
        }
    }

    /// True until the entity has been persisted once.
    pub fn is_new(&self) -> bool {
        match self {
            EditorDraft::Project(form) => form.id == 0,
            EditorDraft::BlogPost(form) => form.id == 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AdminView {
    Loading,
    Viewing(ContentKind),
    /// The draft itself is reached through [`AdminOrchestrator::draft_mut`].
    Editing {
        kind: ContentKind,
    },
    Syncing(ContentKind),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Saved { kind: ContentKind, id: u64 },
    /// Validation failed; nothing was sent to the store.
    Invalid(FieldErrors),
    Failed { message: String, conflict: bool },
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeleteOutcome {
    Armed { id: u64, expires_at: Instant },
    Deleted { id: u64 },
    Failed { message: String, conflict: bool },
}

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("no {kind} entry with id {id}")]
    NotFound { kind: ContentKind, id: u64 },
    #[error("nothing is being edited")]
    NotEditing,
    #[error("a save or delete is already in progress")]
    Busy,
}

enum Validated {
    Project(Project),
    BlogPost(BlogPost),
}

pub struct AdminOrchestrator {
    projects: ContentRepository<Project>,
    blogs: ContentRepository<BlogPost>,
    view: AdminView,
    /// Present only while `view` is `Editing` (or `Syncing` out of it).
    draft: Option<EditorDraft>,
    active: ContentKind,
    project_items: Vec<Project>,
    blog_items: Vec<BlogPost>,
    notifications: Notifications,
    project_deletes: DeleteConfirmation,
    blog_deletes: DeleteConfirmation,
}

impl AdminOrchestrator {
    /// Open the admin workflow; refuses without an authenticated session.
    pub fn open(
        guard: &SessionGuard,
        projects: ContentRepository<Project>,
        blogs: ContentRepository<BlogPost>,
    ) -> Result<Self, AuthError> {
        guard.require()?;
        Ok(Self {
            projects,
            blogs,
            view: AdminView::Loading,
            draft: None,
            active: ContentKind::Projects,
            project_items: Vec::new(),
            blog_items: Vec::new(),
            notifications: Notifications::default(),
            project_deletes: DeleteConfirmation::default(),
            blog_deletes: DeleteConfirmation::default(),
        })
    }

    pub fn view(&self) -> &AdminView {
        &self.view
    }

    pub fn active_kind(&self) -> ContentKind {
        self.active
    }

    pub fn projects(&self) -> &[Project] {
        &self.project_items
    }

    pub fn blog_posts(&self) -> &[BlogPost] {
        &self.blog_items
    }

    pub fn notifications(&mut self) -> &mut Notifications {
        &mut self.notifications
    }

    pub fn is_syncing(&self) -> bool {
        matches!(self.view, AdminView::Syncing(_))
    }

    /// Fetch both collections concurrently and show the active list.
    pub async fn load(&mut self) {
        self.view = AdminView::Loading;
        self.draft = None;
        self.reload().await;
        self.view = AdminView::Viewing(self.active);
    }

    /// Switch the visible list. An in-progress edit is discarded without asking.
    pub fn select_kind(&mut self, kind: ContentKind) {
        if let AdminView::Editing { kind: editing, .. } = &self.view {
            debug!(editing = %editing, selected = %kind, "discarding in-progress edit");
        }
        self.active = kind;
        self.draft = None;
        self.view = AdminView::Viewing(kind);
    }

    pub fn begin_add(&mut self, kind: ContentKind) -> &mut EditorDraft {
        self.start_editing(kind, EditorDraft::blank(kind))
    }

    pub fn begin_edit(
        &mut self,
        kind: ContentKind,
        id: u64,
    ) -> Result<&mut EditorDraft, OrchestratorError> {
        let draft = match kind {
            ContentKind::Projects => find(&self.project_items, id)
                .map(|project| EditorDraft::Project(ProjectForm::from_entity(project))),
            ContentKind::Blogs => find(&self.blog_items, id)
                .map(|post| EditorDraft::BlogPost(BlogPostForm::from_entity(post))),
        }
        .ok_or(OrchestratorError::NotFound { kind, id })?;

        Ok(self.start_editing(kind, draft))
    }

    pub fn draft_mut(&mut self) -> Option<&mut EditorDraft> {
        match self.view {
            AdminView::Editing { .. } => self.draft.as_mut(),
            _ => None,
        }
    }

    pub fn cancel_edit(&mut self) {
        if matches!(self.view, AdminView::Editing { .. }) {
            self.draft = None;
            self.view = AdminView::Viewing(self.active);
        }
    }

    /// Validate the draft and persist it. Invalid drafts never reach the repository.
    ///
    /// On success both collections are reloaded and the view returns to the
    /// list. On failure the draft is kept so the user can retry.
    pub async fn submit(&mut self) -> Result<SubmitOutcome, OrchestratorError> {
        let (kind, validated) = match (&self.view, &self.draft) {
            (AdminView::Editing { kind }, Some(draft)) => {
                let validated = match draft {
                    EditorDraft::Project(form) => match form.validate() {
                        FormOutcome::Valid(project) => Validated::Project(project),
                        FormOutcome::Invalid(errors) => return Ok(self.rejected(errors)),
                    },
                    EditorDraft::BlogPost(form) => match form.validate() {
                        FormOutcome::Valid(post) => Validated::BlogPost(post),
                        FormOutcome::Invalid(errors) => return Ok(self.rejected(errors)),
                    },
                };
                (*kind, validated)
            }
            (AdminView::Syncing(_), _) => return Err(OrchestratorError::Busy),
            _ => return Err(OrchestratorError::NotEditing),
        };

        let previous = std::mem::replace(&mut self.view, AdminView::Syncing(kind));
        let result = match validated {
            Validated::Project(project) => self.projects.save(project).await.map(|p| p.id),
            Validated::BlogPost(post) => self.blogs.save(post).await.map(|p| p.id),
        };

        match result {
            Ok(id) => {
                self.reload().await;
                self.active = kind;
                self.draft = None;
                self.view = AdminView::Viewing(kind);
                self.notifications
                    .success(format!("{} saved successfully", capitalized(kind)));
                Ok(SubmitOutcome::Saved { kind, id })
            }
            Err(err) => {
                self.view = previous;
                Ok(SubmitOutcome::Failed {
                    message: self.write_failed("save", kind, &err),
                    conflict: err.is_conflict(),
                })
            }
        }
    }

    /// Two-step delete: the first press arms, a second press on the same id
    /// within the confirmation window removes the entry.
    pub async fn press_delete(
        &mut self,
        kind: ContentKind,
        id: u64,
    ) -> Result<DeleteOutcome, OrchestratorError> {
        if self.is_syncing() {
            return Err(OrchestratorError::Busy);
        }

        let confirmation = match kind {
            ContentKind::Projects => &mut self.project_deletes,
            ContentKind::Blogs => &mut self.blog_deletes,
        };
        let id = match confirmation.press(id, Instant::now()) {
            DeletePress::Armed { id, expires_at } => {
                debug!(kind = %kind, id, "delete armed");
                return Ok(DeleteOutcome::Armed { id, expires_at });
            }
            DeletePress::Confirmed { id } => id,
        };

        self.delete(kind, id).await
    }

    /// Remove an entry without the confirmation step.
    pub async fn delete(
        &mut self,
        kind: ContentKind,
        id: u64,
    ) -> Result<DeleteOutcome, OrchestratorError> {
        if self.is_syncing() {
            return Err(OrchestratorError::Busy);
        }

        let previous = std::mem::replace(&mut self.view, AdminView::Syncing(kind));
        let result = match kind {
            ContentKind::Projects => self.projects.remove(id).await,
            ContentKind::Blogs => self.blogs.remove(id).await,
        };

        match result {
            Ok(()) => {
                self.reload().await;
                self.active = kind;
                self.draft = None;
                self.view = AdminView::Viewing(kind);
                self.notifications
                    .success(format!("{} deleted successfully", capitalized(kind)));
                Ok(DeleteOutcome::Deleted { id })
            }
            Err(err) => {
                self.view = previous;
                Ok(DeleteOutcome::Failed {
                    message: self.write_failed("delete", kind, &err),
                    conflict: err.is_conflict(),
                })
            }
        }
    }

    async fn reload(&mut self) {
        let (projects, blogs) = tokio::join!(self.projects.fetch(), self.blogs.fetch());

        self.project_items = self.loaded(projects);
        self.blog_items = self.loaded(blogs);
        info!(
            projects = self.project_items.len(),
            blogs = self.blog_items.len(),
            "collections loaded"
        );
    }

    fn loaded<E: ContentEntity>(&mut self, result: Result<Vec<E>, ContentError>) -> Vec<E> {
        result.unwrap_or_else(|err| {
            error!(kind = %E::KIND, error = %err, "failed to load collection");
            self.notifications
                .error(format!("Failed to load {}: {err}", E::KIND));
            Vec::new()
        })
    }

    fn start_editing(&mut self, kind: ContentKind, draft: EditorDraft) -> &mut EditorDraft {
        self.active = kind;
        self.view = AdminView::Editing { kind };
        self.draft.insert(draft)
    }

    fn rejected(&mut self, errors: FieldErrors) -> SubmitOutcome {
        self.notifications
            .error(format!("Please fill in all required fields: {errors}"));
        SubmitOutcome::Invalid(errors)
    }

    fn write_failed(&mut self, action: &str, kind: ContentKind, err: &ContentError) -> String {
        error!(kind = %kind, action, error = %err, "content write failed");
        let message = format!("Failed to {action} {}: {err}", kind.entity_label());
        self.notifications.error(message.clone());
        message
    }
}

fn find<E: ContentEntity>(items: &[E], id: u64) -> Option<&E> {
    items.iter().find(|item| item.id() == id)
}

fn capitalized(kind: ContentKind) -> &'static str {
    match kind {
        ContentKind::Projects => "Project",
        ContentKind::Blogs => "Blog post",
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::application::admin::notifications::NotificationKind;
    use crate::application::content::WriteMode;
    use crate::application::mirror::MemoryMirror;
    use crate::application::session::{MemorySessionStorage, SharedSecretVerifier};
    use crate::application::store::BlobStore;
    use crate::infra::memory::InMemoryBlobStore;
    use crate::infra::memory::faults::FaultyStore;

    const PROJECTS: &str = "data/projects.json";
    const BLOGS: &str = "data/blogs.json";

    fn signed_in() -> SessionGuard {
        let mut guard = SessionGuard::new(
            Arc::new(SharedSecretVerifier::new("s3cret")),
            Arc::new(MemorySessionStorage::new()),
        );
        guard.login("s3cret").expect("login");
        guard
    }

    fn orchestrator<S: BlobStore + 'static>(store: &Arc<S>) -> AdminOrchestrator {
        let mirror = Arc::new(MemoryMirror::new());
        AdminOrchestrator::open(
            &signed_in(),
            ContentRepository::new(store.clone(), mirror.clone(), PROJECTS, WriteMode::Overwrite),
            ContentRepository::new(store.clone(), mirror, BLOGS, WriteMode::Overwrite),
        )
        .expect("open")
    }

    fn fill_project(draft: &mut EditorDraft, title: &str) {
        let EditorDraft::Project(form) = draft else {
            panic!("expected project draft");
        };
        form.title = title.into();
        form.description = "x".into();
        form.category = "web".into();
        form.url = "http://x".into();
    }

    #[test]
    fn open_requires_session() {
        let store = Arc::new(InMemoryBlobStore::new());
        let mirror = Arc::new(MemoryMirror::new());
        let guard = SessionGuard::new(
            Arc::new(SharedSecretVerifier::new("s3cret")),
            Arc::new(MemorySessionStorage::new()),
        );
        let result = AdminOrchestrator::open(
            &guard,
            ContentRepository::new(store.clone(), mirror.clone(), PROJECTS, WriteMode::Overwrite),
            ContentRepository::new(store, mirror, BLOGS, WriteMode::Overwrite),
        );
        assert!(matches!(result, Err(AuthError::NotAuthenticated)));
    }

    #[tokio::test]
    async fn load_failure_empties_kind_and_notifies() {
        let store = Arc::new(InMemoryBlobStore::new());
        store.insert(PROJECTS, b"not json".to_vec());
        store.insert(BLOGS, b"[{\"id\":1,\"title\":\"t\",\"excerpt\":\"e\",\"mediumUrl\":\"m\"}]".to_vec());
        let mut admin = orchestrator(&store);

        admin.load().await;

        assert_eq!(admin.view(), &AdminView::Viewing(ContentKind::Projects));
        assert!(admin.projects().is_empty());
        assert_eq!(admin.blog_posts().len(), 1);
        let latest = admin.notifications().latest().cloned().expect("notification");
        assert_eq!(latest.kind, NotificationKind::Error);
        assert!(latest.text.contains("projects"));
    }

    #[tokio::test]
    async fn submit_saves_reloads_and_returns_to_list() {
        let store = Arc::new(InMemoryBlobStore::new());
        let mut admin = orchestrator(&store);
        admin.load().await;

        fill_project(admin.begin_add(ContentKind::Projects), "Demo");
        let outcome = admin.submit().await.expect("submit");

        assert_eq!(
            outcome,
            SubmitOutcome::Saved {
                kind: ContentKind::Projects,
                id: 1
            }
        );
        assert_eq!(admin.view(), &AdminView::Viewing(ContentKind::Projects));
        assert_eq!(admin.projects().len(), 1);
        assert_eq!(
            admin.notifications().latest().map(|n| n.kind),
            Some(NotificationKind::Success)
        );
    }

    #[tokio::test]
    async fn invalid_draft_never_reaches_the_store() {
        let store = Arc::new(InMemoryBlobStore::new());
        let mut admin = orchestrator(&store);
        admin.load().await;

        let draft = admin.begin_add(ContentKind::Projects);
        fill_project(draft, "Demo");
        if let EditorDraft::Project(form) = draft {
            form.description.clear();
        }

        let outcome = admin.submit().await.expect("submit");
        assert!(matches!(outcome, SubmitOutcome::Invalid(ref errors) if errors.contains("description")));
        assert_eq!(store.put_count(PROJECTS), 0);
        assert!(matches!(admin.view(), AdminView::Editing { .. }));
    }

    #[tokio::test]
    async fn failed_save_keeps_the_draft() {
        let store = Arc::new(FaultyStore::new());
        let mut admin = orchestrator(&store);
        admin.load().await;
        fill_project(admin.begin_add(ContentKind::Projects), "Demo");

        store.fail_puts(true);
        let outcome = admin.submit().await.expect("submit");

        assert!(matches!(outcome, SubmitOutcome::Failed { conflict: false, .. }));
        assert!(matches!(
            admin.draft_mut(),
            Some(EditorDraft::Project(form)) if form.title == "Demo"
        ));
    }

    #[tokio::test]
    async fn switching_kind_discards_edit() {
        let store = Arc::new(InMemoryBlobStore::new());
        let mut admin = orchestrator(&store);
        admin.load().await;
        fill_project(admin.begin_add(ContentKind::Projects), "Unsaved");

        admin.select_kind(ContentKind::Blogs);

        assert_eq!(admin.view(), &AdminView::Viewing(ContentKind::Blogs));
        assert!(admin.draft_mut().is_none());
        assert!(matches!(admin.submit().await, Err(OrchestratorError::NotEditing)));
    }

    #[tokio::test]
    async fn cancelled_edit_does_not_leak_into_the_next_one() {
        let store = Arc::new(InMemoryBlobStore::new());
        let mut admin = orchestrator(&store);
        admin.load().await;
        fill_project(admin.begin_add(ContentKind::Projects), "Abandoned");

        admin.cancel_edit();
        assert!(admin.draft_mut().is_none());

        let fresh = admin.begin_add(ContentKind::Projects);
        assert!(matches!(fresh, EditorDraft::Project(form) if form.title.is_empty()));
        fill_project(fresh, "Kept");
        assert!(matches!(
            admin.draft_mut(),
            Some(EditorDraft::Project(form)) if form.title == "Kept"
        ));
        assert_eq!(
            admin.view(),
            &AdminView::Editing { kind: ContentKind::Projects }
        );
    }

    #[tokio::test]
    async fn edit_unknown_id_is_not_found() {
        let store = Arc::new(InMemoryBlobStore::new());
        let mut admin = orchestrator(&store);
        admin.load().await;

        assert!(matches!(
            admin.begin_edit(ContentKind::Blogs, 7),
            Err(OrchestratorError::NotFound { id: 7, .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn delete_requires_second_press_inside_window() {
        let store = Arc::new(InMemoryBlobStore::new());
        let mut admin = orchestrator(&store);
        admin.load().await;
        fill_project(admin.begin_add(ContentKind::Projects), "Demo");
        admin.submit().await.expect("submit");
        let writes = store.put_count(PROJECTS);

        let first = admin.press_delete(ContentKind::Projects, 1).await.expect("press");
        assert!(matches!(first, DeleteOutcome::Armed { id: 1, .. }));

        tokio::time::advance(Duration::from_millis(3_100)).await;
        let late = admin.press_delete(ContentKind::Projects, 1).await.expect("press");
        assert!(matches!(late, DeleteOutcome::Armed { .. }));
        assert_eq!(store.put_count(PROJECTS), writes);

        tokio::time::advance(Duration::from_secs(1)).await;
        let confirmed = admin.press_delete(ContentKind::Projects, 1).await.expect("press");
        assert_eq!(confirmed, DeleteOutcome::Deleted { id: 1 });
        assert_eq!(store.put_count(PROJECTS), writes + 1);
        assert!(admin.projects().is_empty());
    }
}
