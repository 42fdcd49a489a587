//! Admin session guard: a two-state gate in front of the authoring workflow.
//!
//! The guard only gates the admin surface. The blob store is protected by its
//! own write credential.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use subtle::ConstantTimeEq;
use thiserror::Error;
use tracing::{info, warn};

/// Decides whether a presented secret grants an admin session.
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, secret: &str) -> bool;
}

/// Compares against one pre-configured secret. An empty configured secret
/// never verifies.
pub struct SharedSecretVerifier {
    secret: String,
}

impl SharedSecretVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }
}

impl CredentialVerifier for SharedSecretVerifier {
    fn verify(&self, secret: &str) -> bool {
        if self.secret.is_empty() {
            return false;
        }
        self.secret.as_bytes().ct_eq(secret.as_bytes()).unwrap_u8() == 1
    }
}

#[derive(Debug, Error)]
pub enum SessionStorageError {
    #[error("session storage io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Where the "signed in" marker lives between calls.
pub trait SessionStorage: Send + Sync {
    fn has_marker(&self) -> bool;

    fn set_marker(&self) -> Result<(), SessionStorageError>;

    fn clear_marker(&self) -> Result<(), SessionStorageError>;
}

/// Marker held for the lifetime of the process.
#[derive(Debug, Default)]
pub struct MemorySessionStorage {
    marker: AtomicBool,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemorySessionStorage {
    fn has_marker(&self) -> bool {
        self.marker.load(Ordering::SeqCst)
    }

    fn set_marker(&self) -> Result<(), SessionStorageError> {
        self.marker.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn clear_marker(&self) -> Result<(), SessionStorageError> {
        self.marker.store(false, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticated,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid admin secret")]
    InvalidSecret,
    #[error("admin session required; run `folio login` first")]
    NotAuthenticated,
    #[error(transparent)]
    Storage(#[from] SessionStorageError),
}

pub struct SessionGuard {
    verifier: Arc<dyn CredentialVerifier>,
    storage: Arc<dyn SessionStorage>,
    state: SessionState,
}

impl SessionGuard {
    /// Start authenticated if the storage already carries a session marker.
    pub fn new(verifier: Arc<dyn CredentialVerifier>, storage: Arc<dyn SessionStorage>) -> Self {
        let state = if storage.has_marker() {
            SessionState::Authenticated
        } else {
            SessionState::Unauthenticated
        };
        Self {
            verifier,
            storage,
            state,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_authenticated(&self) -> bool {
        self.state == SessionState::Authenticated
    }

    pub fn require(&self) -> Result<(), AuthError> {
        if self.is_authenticated() {
            Ok(())
        } else {
            Err(AuthError::NotAuthenticated)
        }
    }

    pub fn login(&mut self, secret: &str) -> Result<(), AuthError> {
        if !self.verifier.verify(secret) {
            warn!("admin login rejected");
            return Err(AuthError::InvalidSecret);
        }

        self.storage.set_marker()?;
        self.state = SessionState::Authenticated;
        info!("admin session started");
        Ok(())
    }

    pub fn logout(&mut self) -> Result<(), AuthError> {
        self.storage.clear_marker()?;
        self.state = SessionState::Unauthenticated;
        info!("admin session ended");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guard(storage: Arc<MemorySessionStorage>) -> SessionGuard {
        SessionGuard::new(Arc::new(SharedSecretVerifier::new("hunter2")), storage)
    }

    #[test]
    fn starts_unauthenticated_without_marker() {
        let guard = guard(Arc::new(MemorySessionStorage::new()));
        assert_eq!(guard.state(), SessionState::Unauthenticated);
        assert!(matches!(guard.require(), Err(AuthError::NotAuthenticated)));
    }

    #[test]
    fn wrong_secret_is_rejected_and_leaves_no_marker() {
        let storage = Arc::new(MemorySessionStorage::new());
        let mut guard = guard(storage.clone());

        assert!(matches!(guard.login("hunter3"), Err(AuthError::InvalidSecret)));
        assert!(!storage.has_marker());
        assert!(!guard.is_authenticated());
    }

    #[test]
    fn login_persists_marker_for_the_next_guard() {
        let storage = Arc::new(MemorySessionStorage::new());
        guard(storage.clone()).login("hunter2").expect("login");

        let resumed = guard(storage.clone());
        assert!(resumed.is_authenticated());
    }

    #[test]
    fn logout_clears_marker() {
        let storage = Arc::new(MemorySessionStorage::new());
        let mut guard = guard(storage.clone());
        guard.login("hunter2").expect("login");
        guard.logout().expect("logout");

        assert_eq!(guard.state(), SessionState::Unauthenticated);
        assert!(!storage.has_marker());
    }

    #[test]
    fn empty_configured_secret_never_verifies() {
        let verifier = SharedSecretVerifier::new("");
        assert!(!verifier.verify(""));
        assert!(!verifier.verify("anything"));
    }
}
