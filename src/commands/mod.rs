//! Command handlers for the folio binary and the wiring they share.

mod chat;
mod content;
mod print;
mod session;

use std::sync::Arc;

use folio::{
    application::{
        admin::AdminOrchestrator,
        content::ContentRepository,
        error::AppError,
        mirror::{MemoryMirror, MirrorStore},
        session::{SessionGuard, SharedSecretVerifier},
        store::BlobStore,
    },
    config::{Command, Settings, StoreBackend},
    domain::{
        entities::{BlogPost, Project},
        types::ContentKind,
    },
    infra::{
        error::InfraError,
        fs_mirror::FileMirror,
        fs_session::FileSessionStorage,
        fs_store::FsBlobStore,
        github::{GitHubConfig, GitHubContentStore},
        memory::InMemoryBlobStore,
    },
};
use tracing::debug;

pub async fn dispatch(command: Command, settings: &Settings) -> Result<(), AppError> {
    match command {
        Command::Login(args) => session::login(settings, args),
        Command::Logout => session::logout(settings),
        Command::Projects(args) => content::projects(settings, args.action).await,
        Command::Blogs(args) => content::blogs(settings, args.action).await,
        Command::Chat(args) => chat::run(settings, args).await,
    }
}

fn session_guard(settings: &Settings) -> SessionGuard {
    SessionGuard::new(
        Arc::new(SharedSecretVerifier::new(settings.admin.secret.clone())),
        Arc::new(FileSessionStorage::new(settings.admin.session_file.clone())),
    )
}

fn open_store(settings: &Settings) -> Result<Arc<dyn BlobStore>, AppError> {
    match &settings.store.backend {
        StoreBackend::GitHub(github) => {
            let token = github.token.clone().ok_or_else(|| {
                InfraError::configuration("store.token is required for the github backend")
            })?;
            let store = GitHubContentStore::new(GitHubConfig {
                api_base: github.api_base.clone(),
                owner: github.owner.clone(),
                repo: github.repo.clone(),
                branch: github.branch.clone(),
                token,
                timeout: settings.store.request_timeout,
            })
            .map_err(|err| InfraError::http(err.to_string()))?;
            debug!(owner = %github.owner, repo = %github.repo, "using github blob store");
            Ok(Arc::new(store))
        }
        StoreBackend::Local { root } => {
            let store = FsBlobStore::new(root.clone()).map_err(InfraError::from)?;
            debug!(root = %root.display(), "using local blob store");
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => Ok(Arc::new(InMemoryBlobStore::new())),
    }
}

fn open_mirror(settings: &Settings) -> Arc<dyn MirrorStore> {
    match &settings.mirror.directory {
        Some(dir) => Arc::new(FileMirror::new(dir.clone())),
        None => Arc::new(MemoryMirror::new()),
    }
}

struct Repositories {
    projects: ContentRepository<Project>,
    blogs: ContentRepository<BlogPost>,
}

fn repositories(settings: &Settings) -> Result<Repositories, AppError> {
    let store = open_store(settings)?;
    let mirror = open_mirror(settings);
    let mode = settings.store.write_mode;

    Ok(Repositories {
        projects: ContentRepository::new(
            store.clone(),
            mirror.clone(),
            settings.content.path_for(ContentKind::Projects),
            mode,
        ),
        blogs: ContentRepository::new(
            store,
            mirror,
            settings.content.path_for(ContentKind::Blogs),
            mode,
        ),
    })
}

/// Open the admin workflow with both collections loaded.
async fn open_admin(settings: &Settings) -> Result<AdminOrchestrator, AppError> {
    let guard = session_guard(settings);
    let Repositories { projects, blogs } = repositories(settings)?;
    let mut admin = AdminOrchestrator::open(&guard, projects, blogs)?;
    admin.load().await;
    Ok(admin)
}
