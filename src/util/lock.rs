//! Lock accessors that recover from poisoning instead of propagating a panic.
//!
//! Every guarded value in this crate is rebuilt from the remote store on the
//! next read, so a poisoned lock only costs staleness.

use std::sync::{LockResult, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::warn;

pub(crate) fn rw_read<'a, T>(
    lock: &'a RwLock<T>,
    owner: &'static str,
    op: &'static str,
) -> RwLockReadGuard<'a, T> {
    recover(lock.read(), owner, op, "read")
}

pub(crate) fn rw_write<'a, T>(
    lock: &'a RwLock<T>,
    owner: &'static str,
    op: &'static str,
) -> RwLockWriteGuard<'a, T> {
    recover(lock.write(), owner, op, "write")
}

fn recover<G>(result: LockResult<G>, owner: &'static str, op: &'static str, mode: &str) -> G {
    result.unwrap_or_else(|poisoned| {
        warn!(owner, op, mode, "lock poisoned by an earlier panic; continuing with its state");
        poisoned.into_inner()
    })
}
