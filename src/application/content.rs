//! Content repository: one per entity kind, persisting the whole collection as
//! a single JSON blob.

use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;
use std::sync::Arc;

use metrics::counter;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::application::mirror::{self, MirrorStore};
use crate::application::store::{BlobStore, Revision, StoreError, WriteCondition};
use crate::domain::collection::{self, Placement};
use crate::domain::entities::ContentEntity;
use crate::domain::error::DomainError;
use crate::util::timestamp::now_rfc3339;

/// Whether a write checks that the collection is still at the revision it was read at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    /// Last write wins. Concurrent writers silently clobber each other.
    #[default]
    Overwrite,
    /// Compare-and-swap on the revision read; a moved remote fails with
    /// [`ContentError::Conflict`].
    CheckRevision,
}

impl FromStr for WriteMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "overwrite" => Ok(WriteMode::Overwrite),
            "check_revision" | "checked" => Ok(WriteMode::CheckRevision),
            other => Err(format!("unknown write mode `{other}`")),
        }
    }
}

impl fmt::Display for WriteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteMode::Overwrite => f.write_str("overwrite"),
            WriteMode::CheckRevision => f.write_str("check_revision"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("collection `{path}` changed since it was read; reload and retry")]
    Conflict { path: String },
    #[error("collection `{path}` is not a valid JSON array: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode collection `{path}`: {source}")]
    Encode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Store(StoreError),
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl ContentError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, ContentError::Conflict { .. })
    }
}

impl From<StoreError> for ContentError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict { path } => ContentError::Conflict { path },
            other => ContentError::Store(other),
        }
    }
}

struct Snapshot<E> {
    items: Vec<E>,
    revision: Option<Revision>,
}

/// Reads and rewrites one collection in the remote blob store.
pub struct ContentRepository<E> {
    store: Arc<dyn BlobStore>,
    mirror: Arc<dyn MirrorStore>,
    path: String,
    mode: WriteMode,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for ContentRepository<E> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            mirror: self.mirror.clone(),
            path: self.path.clone(),
            mode: self.mode,
            _entity: PhantomData,
        }
    }
}

impl<E: ContentEntity> ContentRepository<E> {
    pub fn new(
        store: Arc<dyn BlobStore>,
        mirror: Arc<dyn MirrorStore>,
        path: impl Into<String>,
        mode: WriteMode,
    ) -> Self {
        Self {
            store,
            mirror,
            path: path.into(),
            mode,
            _entity: PhantomData,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn mode(&self) -> WriteMode {
        self.mode
    }

    /// Collection as last written by this process, if the mirror holds one.
    pub fn mirrored(&self) -> Option<Vec<E>> {
        mirror::cached(self.mirror.as_ref())
    }

    /// Read the collection, treating any failure as "no content yet".
    pub async fn list(&self) -> Vec<E> {
        match self.fetch().await {
            Ok(items) => items,
            Err(err) => {
                warn!(
                    kind = %E::KIND,
                    path = %self.path,
                    error = %err,
                    "failed to fetch collection; serving empty list"
                );
                Vec::new()
            }
        }
    }

    /// Read the collection, surfacing failures. A missing blob is an empty collection.
    pub async fn fetch(&self) -> Result<Vec<E>, ContentError> {
        Ok(self.read().await?.items)
    }

    pub async fn get_by_id(&self, id: u64) -> Option<E> {
        self.list().await.into_iter().find(|item| item.id() == id)
    }

    /// Insert or replace `entity` and persist the whole collection.
    ///
    /// An entity whose id is already present is replaced in place; anything
    /// else is appended with the next free id. Returns the stored entity.
    pub async fn save(&self, entity: E) -> Result<E, ContentError> {
        let Snapshot {
            mut items,
            revision,
        } = self.read().await?;

        let (stored, placement) = collection::upsert(&mut items, entity)?;
        let verb = match placement {
            Placement::Inserted => "Add",
            Placement::Replaced { .. } => "Update",
        };
        let message = self.commit_message(verb, stored.id());

        self.write(&items, revision, &message).await?;
        info!(
            kind = %E::KIND,
            id = stored.id(),
            placement = ?placement,
            "saved {}",
            E::KIND.entity_label()
        );
        Ok(stored)
    }

    /// Drop the entry with `id` and persist the collection. An unknown id still
    /// rewrites the (unchanged) collection.
    pub async fn remove(&self, id: u64) -> Result<(), ContentError> {
        let Snapshot {
            mut items,
            revision,
        } = self.read().await?;

        let removed = collection::remove_by_id(&mut items, id);
        if !removed {
            debug!(kind = %E::KIND, id, "remove target not present; rewriting collection as-is");
        }

        let message = self.commit_message("Remove", id);
        self.write(&items, revision, &message).await?;
        info!(kind = %E::KIND, id, removed, "removed {}", E::KIND.entity_label());
        Ok(())
    }

    async fn read(&self) -> Result<Snapshot<E>, ContentError> {
        let Some(blob) = self.store.get(&self.path).await? else {
            debug!(kind = %E::KIND, path = %self.path, "collection not found; starting empty");
            return Ok(Snapshot {
                items: Vec::new(),
                revision: None,
            });
        };

        let items = serde_json::from_slice(&blob.content).map_err(|source| ContentError::Decode {
            path: self.path.clone(),
            source,
        })?;

        Ok(Snapshot {
            items,
            revision: Some(blob.revision),
        })
    }

    async fn write(
        &self,
        items: &[E],
        read_at: Option<Revision>,
        message: &str,
    ) -> Result<Revision, ContentError> {
        let mut content =
            serde_json::to_vec_pretty(items).map_err(|source| ContentError::Encode {
                path: self.path.clone(),
                source,
            })?;
        content.push(b'\n');

        let condition = match (self.mode, read_at) {
            (WriteMode::Overwrite, _) => WriteCondition::Unconditional,
            (WriteMode::CheckRevision, Some(revision)) => WriteCondition::Matches(revision),
            (WriteMode::CheckRevision, None) => WriteCondition::Absent,
        };

        let revision = match self.store.put(&self.path, content, message, condition).await {
            Ok(revision) => revision,
            Err(err) => {
                if matches!(err, StoreError::Conflict { .. }) {
                    counter!("folio_content_conflict_total", "kind" => E::KIND.as_str())
                        .increment(1);
                }
                return Err(err.into());
            }
        };

        counter!("folio_content_write_total", "kind" => E::KIND.as_str()).increment(1);
        mirror::refresh(self.mirror.as_ref(), items);
        Ok(revision)
    }

    fn commit_message(&self, verb: &str, id: u64) -> String {
        format!(
            "{verb} {} #{id} in {} ({})",
            E::KIND.entity_label(),
            self.path,
            now_rfc3339()
        )
    }
}
