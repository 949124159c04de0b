// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Lock service error types.

use crate::graph::ObjectId;

use super::lock::Lock;

/// Errors returned by lock and unlock operations.
///
/// Conflicts are expected outcomes, not faults: callers should surface them
/// to the user (for example "resource locked by N") rather than retry.
#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("cannot resolve lock owner from {value:?}")]
    InvalidOwner { value: String },

    #[error("resource {} is locked by owner {}", .lock.resource_id(), .lock.owner_id())]
    Conflict { lock: Box<Lock> },

    #[error("no expired lock or lock held by the requester to remove")]
    UnlockConflict { lock: Option<Box<Lock>> },

    #[error("resource {resource} does not exist")]
    ResourceNotFound { resource: ObjectId },

    #[error("no resource found at {path:?}")]
    PathNotFound { path: String },

    #[error("a service named {name:?} is already registered there")]
    ServiceExists { name: String },
}

impl LockError {
    /// Returns the lock that blocked the operation, if any.
    pub fn lock(&self) -> Option<&Lock> {
        match self {
            LockError::Conflict { lock } => Some(lock),
            LockError::UnlockConflict { lock } => lock.as_deref(),
            _ => None,
        }
    }
}
