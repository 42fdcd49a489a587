//! Remote blob store contract consumed by the content repositories.

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

/// Opaque token identifying one version of a blob.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Revision(String);

impl Revision {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A blob and the revision it was read at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub content: Vec<u8>,
    pub revision: Revision,
}

/// Precondition attached to a write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteCondition {
    /// Overwrite whatever is stored.
    Unconditional,
    /// Only create; fail if the path already holds a blob.
    Absent,
    /// Only replace the given revision.
    Matches(Revision),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("`{path}` was modified by another writer")]
    Conflict { path: String },
    #[error("remote store rejected credentials: {message}")]
    Unauthorized { message: String },
    #[error("remote store rejected `{path}` with status {status}: {message}")]
    Rejected {
        path: String,
        status: u16,
        message: String,
    },
    #[error("invalid blob path `{path}`")]
    InvalidPath { path: String },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("failed to decode remote response: {0}")]
    Decode(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub fn conflict(path: impl Into<String>) -> Self {
        Self::Conflict { path: path.into() }
    }

    pub fn transport(err: impl fmt::Display) -> Self {
        Self::Transport(err.to_string())
    }

    pub fn decode(err: impl fmt::Display) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Path-addressed, versioned blob storage.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Read the blob at `path`, or `None` when nothing is stored there.
    async fn get(&self, path: &str) -> Result<Option<Blob>, StoreError>;

    /// Write `content` to `path`, recording `message`, and return the new revision.
    async fn put(
        &self,
        path: &str,
        content: Vec<u8>,
        message: &str,
        condition: WriteCondition,
    ) -> Result<Revision, StoreError>;
}
