// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Advisory exclusive locks on object graph resources.
//!
//! A lock signals that a principal intends to change a resource. Nothing
//! stops a resource from being modified without one; UIs and protocol
//! front-ends (such as DAV) are expected to check before writing.
//!
//! # Rules
//!
//! - At most one valid lock of a given [`LockKind`] exists per resource.
//! - Re-locking by the holder refreshes the existing lock (same id).
//! - Locking by anyone else fails with [`LockError::Conflict`].
//! - Expired locks, and locks whose resource was removed, are invalid. They
//!   are reaped by the next `lock` or `unlock` touching the same resource and
//!   kind; there is no background sweeper.
//! - Unlocking succeeds only for the holder or when the lock is already
//!   invalid. Unlocking a resource with no lock is an
//!   [`LockError::UnlockConflict`], not a no-op.
//!
//! Callers must check that the principal is allowed to lock the resource
//! before calling in; this module does no authorization.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//! use latchkey::clock::ManualClock;
//! use latchkey::graph::ObjectMap;
//! use latchkey::locking::{lock_resource, unlock_resource, LockError, LockKind, Root};
//!
//! let graph = Arc::new(ObjectMap::new());
//! let clock = Arc::new(ManualClock::epoch());
//! let doc = graph.add("/doc").unwrap();
//! let root = Root::new(graph, clock.clone());
//!
//! let timeout = Some(Duration::from_secs(60));
//! let lock = lock_resource(&root, doc, &1u64, timeout, &LockKind::WRITE).unwrap();
//!
//! // Someone else is turned away while the lock is valid.
//! let err = lock_resource(&root, doc, &2u64, None, &LockKind::WRITE).unwrap_err();
//! assert_eq!(err.lock().map(|l| l.id()), Some(lock.id()));
//!
//! // Once it expires, the next attempt reaps it.
//! clock.advance(Duration::from_secs(61));
//! lock_resource(&root, doc, &2u64, None, &LockKind::WRITE).unwrap();
//! unlock_resource(&root, doc, &2u64, &LockKind::WRITE).unwrap();
//! ```

mod config;
mod error;
mod index;
mod kind;
mod lock;
mod owner;
mod root;
mod service;

pub use config::{LockServiceConfig, DEFAULT_SERVICE_NAME};
pub use error::LockError;
pub use kind::LockKind;
pub use lock::{Lock, LockId, LockSummary};
pub use owner::{OwnerRef, Principal};
pub use root::Root;
pub use service::LockService;

use std::time::Duration;

use crate::clock::Clock;
use crate::graph::{ObjectGraph, ObjectId};

/// Locks `resource` for `owner` through the root's lock service.
///
/// Refreshes the lock if `owner` already holds it. Provisions a lock service
/// at the root on first use.
pub fn lock_resource<G, C, O>(
    root: &Root<G, C>,
    resource: ObjectId,
    owner: &O,
    timeout: Option<Duration>,
    kind: &LockKind,
) -> Result<Lock, LockError>
where
    G: ObjectGraph,
    C: Clock,
    O: OwnerRef + ?Sized,
{
    root.lock_service(resource)
        .lock(resource, owner, timeout, kind)
}

/// Unlocks `resource` for `owner` through the root's lock service.
///
/// Provisions a lock service at the root on first use.
pub fn unlock_resource<G, C, O>(
    root: &Root<G, C>,
    resource: ObjectId,
    owner: &O,
    kind: &LockKind,
) -> Result<(), LockError>
where
    G: ObjectGraph,
    C: Clock,
    O: OwnerRef + ?Sized,
{
    root.lock_service(resource).unlock(resource, owner, kind)
}

/// Locks the resource at `path` for `owner`.
///
/// Same as [`lock_resource`] once the path is resolved. Fails with
/// [`LockError::PathNotFound`] when nothing lives at `path`.
pub fn lock_path<G, C, O>(
    root: &Root<G, C>,
    path: &str,
    owner: &O,
    timeout: Option<Duration>,
    kind: &LockKind,
) -> Result<Lock, LockError>
where
    G: ObjectGraph,
    C: Clock,
    O: OwnerRef + ?Sized,
{
    let resource = root.resolve(path)?;
    lock_resource(root, resource, owner, timeout, kind)
}

/// Unlocks the resource at `path` for `owner`.
pub fn unlock_path<G, C, O>(
    root: &Root<G, C>,
    path: &str,
    owner: &O,
    kind: &LockKind,
) -> Result<(), LockError>
where
    G: ObjectGraph,
    C: Clock,
    O: OwnerRef + ?Sized,
{
    let resource = root.resolve(path)?;
    unlock_resource(root, resource, owner, kind)
}
