use std::sync::Arc;

use async_trait::async_trait;
use folio::application::content::{ContentError, ContentRepository, WriteMode};
use folio::application::mirror::{MemoryMirror, cached};
use folio::application::store::{Blob, BlobStore, Revision, StoreError, WriteCondition};
use folio::domain::entities::Project;
use folio::infra::memory::InMemoryBlobStore;
use tokio::sync::Barrier;

const PATH: &str = "data/projects.json";

/// Holds every reader at a barrier so two writers are guaranteed to read the
/// same revision before either writes.
struct LockstepStore {
    inner: InMemoryBlobStore,
    readers: Barrier,
}

impl LockstepStore {
    fn new(readers: usize) -> Self {
        Self {
            inner: InMemoryBlobStore::new(),
            readers: Barrier::new(readers),
        }
    }
}

#[async_trait]
impl BlobStore for LockstepStore {
    async fn get(&self, path: &str) -> Result<Option<Blob>, StoreError> {
        let blob = self.inner.get(path).await;
        self.readers.wait().await;
        blob
    }

    async fn put(
        &self,
        path: &str,
        content: Vec<u8>,
        message: &str,
        condition: WriteCondition,
    ) -> Result<Revision, StoreError> {
        self.inner.put(path, content, message, condition).await
    }
}

fn project(title: &str) -> Project {
    Project {
        title: title.into(),
        description: "x".into(),
        category: "web".into(),
        url: "http://x".into(),
        ..Project::default()
    }
}

fn stored(store: &LockstepStore) -> Vec<Project> {
    let bytes = store.inner.content(PATH).expect("collection written");
    serde_json::from_slice(&bytes).expect("valid collection")
}

#[tokio::test]
async fn concurrent_saves_last_write_wins_under_overwrite() {
    let store = Arc::new(LockstepStore::new(2));
    let mirror = Arc::new(MemoryMirror::new());
    let repo =
        ContentRepository::<Project>::new(store.clone(), mirror.clone(), PATH, WriteMode::Overwrite);

    let (first, second) = tokio::join!(repo.save(project("A")), repo.save(project("B")));
    let first = first.expect("first save");
    let second = second.expect("second save");

    // Both read an empty collection, so both were assigned the same id.
    assert_eq!(first.id, 1);
    assert_eq!(second.id, 1);

    let collection = stored(&store);
    assert_eq!(collection.len(), 1, "one write clobbered the other");
    assert!(["A", "B"].contains(&collection[0].title.as_str()));
    assert_eq!(store.inner.put_count(PATH), 2);
    assert_eq!(cached::<Project>(mirror.as_ref()), Some(collection));
}

#[tokio::test]
async fn concurrent_saves_conflict_under_check_revision() {
    let store = Arc::new(LockstepStore::new(2));
    store.inner.insert(PATH, b"[]".to_vec());
    let repo = ContentRepository::<Project>::new(
        store.clone(),
        Arc::new(MemoryMirror::new()),
        PATH,
        WriteMode::CheckRevision,
    );

    let (first, second) = tokio::join!(repo.save(project("A")), repo.save(project("B")));

    let (winner, loser) = match (first, second) {
        (Ok(winner), Err(loser)) | (Err(loser), Ok(winner)) => (winner, loser),
        other => panic!("expected exactly one conflict, got {other:?}"),
    };
    assert!(matches!(loser, ContentError::Conflict { .. }));
    assert_eq!(stored(&store), vec![winner]);
}

#[tokio::test]
async fn example_scenario_add_update_remove() {
    let store = Arc::new(InMemoryBlobStore::new());
    store.insert(
        PATH,
        br#"[{"id":1,"title":"A","description":"d","category":"web","url":"http://a","tags":[],"featured":false}]"#
            .to_vec(),
    );
    let repo = ContentRepository::<Project>::new(
        store.clone(),
        Arc::new(MemoryMirror::new()),
        PATH,
        WriteMode::Overwrite,
    );

    let added = repo.save(project("Demo")).await.expect("save");
    assert_eq!(added.id, 2);

    let mut renamed = added.clone();
    renamed.title = "Demo 2".into();
    repo.save(renamed).await.expect("update");

    let titles: Vec<_> = repo.list().await.into_iter().map(|p| p.title).collect();
    assert_eq!(titles, ["A", "Demo 2"]);

    repo.remove(1).await.expect("remove");
    let ids: Vec<_> = repo.list().await.into_iter().map(|p| p.id).collect();
    assert_eq!(ids, [2]);
    assert_eq!(store.put_count(PATH), 3);
}
