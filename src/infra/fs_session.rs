//! Session marker kept as a file, so a login outlives one process until logout.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use crate::application::session::{SessionStorage, SessionStorageError};

#[derive(Debug, Clone)]
pub struct FileSessionStorage {
    marker: PathBuf,
}

impl FileSessionStorage {
    pub fn new(marker: PathBuf) -> Self {
        Self { marker }
    }
}

impl SessionStorage for FileSessionStorage {
    fn has_marker(&self) -> bool {
        self.marker.is_file()
    }

    fn set_marker(&self) -> Result<(), SessionStorageError> {
        if let Some(parent) = self.marker.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.marker, b"authenticated\n")?;
        Ok(())
    }

    fn clear_marker(&self) -> Result<(), SessionStorageError> {
        match fs::remove_file(&self.marker) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(SessionStorageError::Io(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tempfile::TempDir;

    use super::*;
    use crate::application::session::{SessionGuard, SharedSecretVerifier};

    #[test]
    fn login_is_visible_to_the_next_process() {
        let dir = TempDir::new().expect("tempdir");
        let marker = dir.path().join("state/session");
        let verifier = Arc::new(SharedSecretVerifier::new("pw"));

        let mut first = SessionGuard::new(
            verifier.clone(),
            Arc::new(FileSessionStorage::new(marker.clone())),
        );
        first.login("pw").expect("login");

        let mut second =
            SessionGuard::new(verifier, Arc::new(FileSessionStorage::new(marker.clone())));
        assert!(second.is_authenticated());

        second.logout().expect("logout");
        assert!(!marker.exists());
        second.logout().expect("logout is idempotent");
    }
}
