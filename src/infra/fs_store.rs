//! Blob store rooted at a local directory, for offline authoring.
//!
//! The revision token is the SHA-256 of the stored bytes. Every successful
//! write appends one line to `.folio/journal.jsonl` under the root, carrying
//! the write message. The journal is an audit trail: once a blob is replaced
//! the write has happened, and a journal failure is only logged.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::application::store::{Blob, BlobStore, Revision, StoreError, WriteCondition};
use crate::util::fs::write_atomic;
use crate::util::timestamp::now_rfc3339;

const JOURNAL_DIR: &str = ".folio";
const JOURNAL_FILE: &str = "journal.jsonl";

#[derive(Debug, Serialize)]
struct JournalEntry<'a> {
    at: String,
    path: &'a str,
    revision: &'a str,
    message: &'a str,
}

#[derive(Debug)]
pub struct FsBlobStore {
    root: PathBuf,
    // Serializes check-then-write within this process.
    write_lock: Mutex<()>,
}

impl FsBlobStore {
    /// Initialise storage rooted at the provided directory, creating it if necessary.
    pub fn new(root: PathBuf) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            write_lock: Mutex::new(()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, StoreError> {
        let relative = Path::new(path);
        let escapes = relative.components().any(|component| {
            matches!(
                component,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        });
        if path.is_empty() || escapes || path.starts_with(JOURNAL_DIR) {
            return Err(StoreError::InvalidPath {
                path: path.to_string(),
            });
        }
        Ok(self.root.join(relative))
    }

    async fn read(&self, absolute: &Path) -> Result<Option<Vec<u8>>, StoreError> {
        match fs::read(absolute).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StoreError::Io(err)),
        }
    }

    async fn append_journal(
        &self,
        path: &str,
        revision: &Revision,
        message: &str,
    ) -> Result<(), StoreError> {
        let dir = self.root.join(JOURNAL_DIR);
        fs::create_dir_all(&dir).await?;

        let entry = JournalEntry {
            at: now_rfc3339(),
            path,
            revision: revision.as_str(),
            message,
        };
        let mut line = serde_json::to_vec(&entry).map_err(StoreError::decode)?;
        line.push(b'\n');

        let mut journal = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join(JOURNAL_FILE))
            .await?;
        journal.write_all(&line).await?;
        journal.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn get(&self, path: &str) -> Result<Option<Blob>, StoreError> {
        let absolute = self.resolve(path)?;
        Ok(self.read(&absolute).await?.map(|content| Blob {
            revision: revision_of(&content),
            content,
        }))
    }

    async fn put(
        &self,
        path: &str,
        content: Vec<u8>,
        message: &str,
        condition: WriteCondition,
    ) -> Result<Revision, StoreError> {
        let absolute = self.resolve(path)?;
        let _guard = self.write_lock.lock().await;

        let current = self.read(&absolute).await?.map(|bytes| revision_of(&bytes));
        let satisfied = match (&condition, &current) {
            (WriteCondition::Unconditional, _) => true,
            (WriteCondition::Absent, current) => current.is_none(),
            (WriteCondition::Matches(expected), Some(current)) => expected == current,
            (WriteCondition::Matches(_), None) => false,
        };
        if !satisfied {
            return Err(StoreError::conflict(path));
        }

        let revision = revision_of(&content);
        let target = absolute.clone();
        tokio::task::spawn_blocking(move || write_atomic(&target, &content))
            .await
            .map_err(|err| StoreError::Io(std::io::Error::other(err)))??;

        if let Err(err) = self.append_journal(path, &revision, message).await {
            warn!(path, revision = %revision, error = %err, "blob stored but journal append failed");
        }
        debug!(path, revision = %revision, "stored blob on disk");
        Ok(revision)
    }
}

fn revision_of(content: &[u8]) -> Revision {
    Revision::new(hex::encode(Sha256::digest(content)))
}
