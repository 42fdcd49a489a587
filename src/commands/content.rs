use folio::{
    application::{
        admin::{
            AdminOrchestrator, DeleteOutcome, EditorDraft, SubmitOutcome,
            forms::{BlogPostForm, ProjectForm},
        },
        content::ContentRepository,
        error::AppError,
    },
    config::{
        BlogAction, BlogPostFields, GetArgs, ListArgs, ProjectAction, ProjectFields, RemoveArgs,
        Settings,
    },
    domain::{entities::ContentEntity, error::DomainError, types::ContentKind},
    infra::error::InfraError,
};
use serde_json::json;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{Instant, timeout_at};

use super::print::{flush_notifications, print_json};
use super::{open_admin, repositories};

pub async fn projects(settings: &Settings, action: ProjectAction) -> Result<(), AppError> {
    match action {
        ProjectAction::List(args) => list(&repositories(settings)?.projects, args).await,
        ProjectAction::Get(args) => get(&repositories(settings)?.projects, args).await,
        ProjectAction::Save(fields) => save(settings, Fields::Project(fields)).await,
        ProjectAction::Remove(args) => remove(settings, ContentKind::Projects, args).await,
    }
}

pub async fn blogs(settings: &Settings, action: BlogAction) -> Result<(), AppError> {
    match action {
        BlogAction::List(args) => list(&repositories(settings)?.blogs, args).await,
        BlogAction::Get(args) => get(&repositories(settings)?.blogs, args).await,
        BlogAction::Save(fields) => save(settings, Fields::BlogPost(fields)).await,
        BlogAction::Remove(args) => remove(settings, ContentKind::Blogs, args).await,
    }
}

async fn list<E: ContentEntity>(
    repository: &ContentRepository<E>,
    args: ListArgs,
) -> Result<(), AppError> {
    let items = if args.cached {
        repository.mirrored().unwrap_or_default()
    } else {
        repository.list().await
    };
    print_json(&items)
}

async fn get<E: ContentEntity>(
    repository: &ContentRepository<E>,
    args: GetArgs,
) -> Result<(), AppError> {
    let item = repository
        .get_by_id(args.id)
        .await
        .ok_or_else(|| DomainError::not_found(E::KIND, args.id))?;
    print_json(&item)
}

enum Fields {
    Project(ProjectFields),
    BlogPost(BlogPostFields),
}

impl Fields {
    fn kind(&self) -> ContentKind {
        match self {
            Fields::Project(_) => ContentKind::Projects,
            Fields::BlogPost(_) => ContentKind::Blogs,
        }
    }

    fn id(&self) -> Option<u64> {
        match self {
            Fields::Project(fields) => fields.id,
            Fields::BlogPost(fields) => fields.id,
        }
    }
}

async fn save(settings: &Settings, fields: Fields) -> Result<(), AppError> {
    let mut admin = open_admin(settings).await?;
    let kind = fields.kind();

    let draft = match fields.id() {
        Some(id) => admin.begin_edit(kind, id)?,
        None => admin.begin_add(kind),
    };
    match (draft, fields) {
        (EditorDraft::Project(form), Fields::Project(fields)) => apply_project(form, fields),
        (EditorDraft::BlogPost(form), Fields::BlogPost(fields)) => apply_blog_post(form, fields),
        _ => return Err(AppError::unexpected("editor opened a form of the wrong kind")),
    }

    let outcome = admin.submit().await?;
    flush_notifications(&mut admin);
    match outcome {
        SubmitOutcome::Saved { kind, id } => print_saved(&admin, kind, id),
        SubmitOutcome::Invalid(errors) => Err(AppError::validation(errors.to_string())),
        SubmitOutcome::Failed { message, conflict } => Err(write_failure(message, conflict)),
    }
}

fn print_saved(admin: &AdminOrchestrator, kind: ContentKind, id: u64) -> Result<(), AppError> {
    match kind {
        ContentKind::Projects => match admin.projects().iter().find(|item| item.id == id) {
            Some(project) => print_json(project),
            None => print_json(&json!({ "kind": kind, "id": id })),
        },
        ContentKind::Blogs => match admin.blog_posts().iter().find(|item| item.id == id) {
            Some(post) => print_json(post),
            None => print_json(&json!({ "kind": kind, "id": id })),
        },
    }
}

fn apply_project(form: &mut ProjectForm, fields: ProjectFields) {
    if let Some(title) = fields.title {
        form.title = title;
    }
    if let Some(description) = fields.description {
        form.description = description;
    }
    if let Some(category) = fields.category {
        form.category = category;
    }
    if let Some(url) = fields.url {
        form.url = url;
    }
    if let Some(image) = fields.image {
        form.image = image;
    }
    if let Some(date) = fields.date {
        form.date = date;
    }
    if let Some(featured) = fields.featured {
        form.featured = featured;
    }
    if fields.clear_tags {
        form.clear_tags();
    }
    for tag in &fields.tags {
        form.add_tag(tag);
    }
}

fn apply_blog_post(form: &mut BlogPostForm, fields: BlogPostFields) {
    if let Some(title) = fields.title {
        form.title = title;
    }
    if let Some(excerpt) = fields.excerpt {
        form.excerpt = excerpt;
    }
    if let Some(medium_url) = fields.medium_url {
        form.medium_url = medium_url;
    }
    if let Some(date) = fields.date {
        form.date = date;
    }
    if let Some(read_time) = fields.read_time {
        form.read_time = read_time;
    }
    if let Some(image_url) = fields.image_url {
        form.image_url = image_url;
    }
    if fields.clear_categories {
        form.clear_categories();
    }
    for category in &fields.categories {
        form.add_category(category);
    }
}

async fn remove(settings: &Settings, kind: ContentKind, args: RemoveArgs) -> Result<(), AppError> {
    let mut admin = open_admin(settings).await?;

    let outcome = if args.yes {
        admin.delete(kind, args.id).await?
    } else {
        match admin.press_delete(kind, args.id).await? {
            DeleteOutcome::Armed { id, expires_at } => {
                let window = expires_at.saturating_duration_since(Instant::now());
                eprintln!(
                    "Delete {} #{id}? Press Enter within {}s to confirm.",
                    kind.entity_label(),
                    window.as_secs_f32().ceil()
                );
                if confirmed_before(expires_at).await? {
                    admin.press_delete(kind, id).await?
                } else {
                    DeleteOutcome::Armed { id, expires_at }
                }
            }
            other => other,
        }
    };

    flush_notifications(&mut admin);
    match outcome {
        DeleteOutcome::Deleted { id } => print_json(&json!({ "kind": kind, "deleted": id })),
        DeleteOutcome::Armed { id, .. } => Err(AppError::validation(format!(
            "delete of {} #{id} was not confirmed in time",
            kind.entity_label()
        ))),
        DeleteOutcome::Failed { message, conflict } => Err(write_failure(message, conflict)),
    }
}

/// Wait for a line on stdin until `deadline`. A closed stdin never confirms.
async fn confirmed_before(deadline: Instant) -> Result<bool, AppError> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    match timeout_at(deadline, lines.next_line()).await {
        Ok(Ok(Some(_))) => Ok(true),
        Ok(Ok(None)) | Err(_) => Ok(false),
        Ok(Err(err)) => Err(InfraError::from(err).into()),
    }
}

fn write_failure(message: String, conflict: bool) -> AppError {
    if conflict {
        AppError::conflict(message)
    } else {
        AppError::unexpected(message)
    }
}
