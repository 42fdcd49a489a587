//! Process-local blob store with monotonically increasing revisions.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use tracing::debug;

use crate::application::store::{Blob, BlobStore, Revision, StoreError, WriteCondition};
use crate::util::lock::{rw_read, rw_write};

const SOURCE: &str = "infra::memory";

#[derive(Debug, Clone)]
struct Entry {
    content: Vec<u8>,
    generation: u64,
    puts: usize,
}

#[derive(Debug, Default)]
struct State {
    entries: HashMap<String, Entry>,
    next_generation: u64,
}

impl State {
    fn bump(&mut self) -> u64 {
        self.next_generation += 1;
        self.next_generation
    }
}

#[derive(Debug, Default)]
pub struct InMemoryBlobStore {
    state: RwLock<State>,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `content` at `path` under a new revision without counting a write.
    pub fn insert(&self, path: &str, content: Vec<u8>) {
        let mut state = rw_write(&self.state, SOURCE, "insert");
        let generation = state.bump();
        let entry = state.entries.entry(path.to_string()).or_insert(Entry {
            content: Vec::new(),
            generation: 0,
            puts: 0,
        });
        entry.content = content;
        entry.generation = generation;
    }

    pub fn content(&self, path: &str) -> Option<Vec<u8>> {
        rw_read(&self.state, SOURCE, "content")
            .entries
            .get(path)
            .map(|entry| entry.content.clone())
    }

    /// Number of `put` calls that reached `path`, successful or not.
    pub fn put_count(&self, path: &str) -> usize {
        rw_read(&self.state, SOURCE, "put_count")
            .entries
            .get(path)
            .map_or(0, |entry| entry.puts)
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn get(&self, path: &str) -> Result<Option<Blob>, StoreError> {
        let state = rw_read(&self.state, SOURCE, "get");
        Ok(state
            .entries
            .get(path)
            .filter(|entry| entry.generation != 0)
            .map(|entry| Blob {
                content: entry.content.clone(),
                revision: revision_for(entry.generation),
            }))
    }

    async fn put(
        &self,
        path: &str,
        content: Vec<u8>,
        message: &str,
        condition: WriteCondition,
    ) -> Result<Revision, StoreError> {
        let mut state = rw_write(&self.state, SOURCE, "put");
        let generation = state.bump();
        let current = state.entries.entry(path.to_string()).or_insert(Entry {
            content: Vec::new(),
            generation: 0,
            puts: 0,
        });
        current.puts += 1;

        let exists = current.generation != 0;
        let satisfied = match &condition {
            WriteCondition::Unconditional => true,
            WriteCondition::Absent => !exists,
            WriteCondition::Matches(expected) => {
                exists && *expected == revision_for(current.generation)
            }
        };
        if !satisfied {
            return Err(StoreError::conflict(path));
        }

        current.content = content;
        current.generation = generation;
        debug!(path, message, generation, "stored blob");
        Ok(revision_for(generation))
    }
}

fn revision_for(generation: u64) -> Revision {
    Revision::new(format!("mem-{generation}"))
}
