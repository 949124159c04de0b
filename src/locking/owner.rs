// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Lock owner resolution.
//!
//! Lock operations accept either a principal or a raw owner id. Both are
//! coerced to an [`ObjectId`] before the lock table is touched; values that
//! cannot be coerced are rejected with [`LockError::InvalidOwner`].

use crate::graph::ObjectId;

use super::error::LockError;

/// A value that names the principal a lock is held for.
pub trait OwnerRef {
    /// Resolves this value to the owner's oid.
    fn resolve_owner(&self) -> Result<ObjectId, LockError>;
}

impl OwnerRef for ObjectId {
    #[inline]
    fn resolve_owner(&self) -> Result<ObjectId, LockError> {
        Ok(*self)
    }
}

impl OwnerRef for u64 {
    #[inline]
    fn resolve_owner(&self) -> Result<ObjectId, LockError> {
        Ok(ObjectId(*self))
    }
}

impl OwnerRef for i64 {
    fn resolve_owner(&self) -> Result<ObjectId, LockError> {
        u64::try_from(*self)
            .map(ObjectId)
            .map_err(|_| LockError::InvalidOwner {
                value: self.to_string(),
            })
    }
}

impl OwnerRef for str {
    fn resolve_owner(&self) -> Result<ObjectId, LockError> {
        self.trim()
            .parse::<u64>()
            .map(ObjectId)
            .map_err(|_| LockError::InvalidOwner {
                value: self.to_string(),
            })
    }
}

impl OwnerRef for String {
    fn resolve_owner(&self) -> Result<ObjectId, LockError> {
        self.as_str().resolve_owner()
    }
}

impl<T: OwnerRef + ?Sized> OwnerRef for &T {
    fn resolve_owner(&self) -> Result<ObjectId, LockError> {
        (**self).resolve_owner()
    }
}

/// A named principal, seated in the object graph or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    name: String,
    oid: Option<ObjectId>,
}

impl Principal {
    /// Creates a principal that has no oid yet.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            oid: None,
        }
    }

    /// Creates a principal seated at `oid`.
    pub fn seated(name: impl Into<String>, oid: ObjectId) -> Self {
        Self {
            name: name.into(),
            oid: Some(oid),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn oid(&self) -> Option<ObjectId> {
        self.oid
    }
}

impl OwnerRef for Principal {
    fn resolve_owner(&self) -> Result<ObjectId, LockError> {
        self.oid.ok_or_else(|| LockError::InvalidOwner {
            value: format!("unseated principal {:?}", self.name),
        })
    }
}
