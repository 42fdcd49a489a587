//! Local mirror persisted as one JSON file per content kind.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use tracing::debug;

use crate::application::mirror::{MirrorError, MirrorStore};
use crate::domain::types::ContentKind;
use crate::util::fs::write_atomic;

#[derive(Debug, Clone)]
pub struct FileMirror {
    dir: PathBuf,
}

impl FileMirror {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn entry_path(&self, kind: ContentKind) -> PathBuf {
        self.dir.join(format!("{}.json", kind.as_str()))
    }
}

impl MirrorStore for FileMirror {
    fn load(&self, kind: ContentKind) -> Result<Option<String>, MirrorError> {
        match fs::read_to_string(self.entry_path(kind)) {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(MirrorError::Io(err)),
        }
    }

    fn store(&self, kind: ContentKind, value: &str) -> Result<(), MirrorError> {
        let path = self.entry_path(kind);
        write_atomic(&path, value.as_bytes())?;
        debug!(kind = %kind, path = %path.display(), "mirror entry written");
        Ok(())
    }
}
