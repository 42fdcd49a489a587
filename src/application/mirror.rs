//! Local mirror cache: a best-effort copy of the last collection this process
//! wrote, one entry per content kind.
//!
//! Nothing on a correctness path reads the mirror. It is overwritten after
//! every successful remote write and may be stale relative to other writers.

use std::collections::HashMap;
use std::sync::RwLock;

use metrics::counter;
use thiserror::Error;
use tracing::warn;

use crate::domain::entities::ContentEntity;
use crate::domain::types::ContentKind;
use crate::util::lock::{rw_read, rw_write};

const SOURCE: &str = "application::mirror";

#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("mirror io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode mirror entry: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Key/value storage backing the mirror; values are serialized collections.
pub trait MirrorStore: Send + Sync {
    fn load(&self, kind: ContentKind) -> Result<Option<String>, MirrorError>;

    fn store(&self, kind: ContentKind, value: &str) -> Result<(), MirrorError>;
}

/// Process-local mirror.
#[derive(Debug, Default)]
pub struct MemoryMirror {
    entries: RwLock<HashMap<ContentKind, String>>,
}

impl MemoryMirror {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MirrorStore for MemoryMirror {
    fn load(&self, kind: ContentKind) -> Result<Option<String>, MirrorError> {
        Ok(rw_read(&self.entries, SOURCE, "load").get(&kind).cloned())
    }

    fn store(&self, kind: ContentKind, value: &str) -> Result<(), MirrorError> {
        rw_write(&self.entries, SOURCE, "store").insert(kind, value.to_string());
        Ok(())
    }
}

/// Overwrite the mirror entry for `E` with `items`. Failures are logged, never returned.
pub fn refresh<E: ContentEntity>(mirror: &dyn MirrorStore, items: &[E]) {
    let result = serde_json::to_string(items)
        .map_err(MirrorError::from)
        .and_then(|encoded| mirror.store(E::KIND, &encoded));

    if let Err(err) = result {
        counter!("folio_mirror_write_failed_total", "kind" => E::KIND.as_str()).increment(1);
        warn!(kind = %E::KIND, error = %err, "failed to refresh local mirror");
    }
}

/// Last mirrored collection for `E`, if one exists and still decodes.
pub fn cached<E: ContentEntity>(mirror: &dyn MirrorStore) -> Option<Vec<E>> {
    let raw = match mirror.load(E::KIND) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(err) => {
            warn!(kind = %E::KIND, error = %err, "failed to read local mirror");
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(items) => Some(items),
        Err(err) => {
            warn!(kind = %E::KIND, error = %err, "discarding undecodable mirror entry");
            None
        }
    }
}
