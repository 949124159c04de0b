// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Object graph trait and identifiers.

use std::fmt;
use std::sync::Arc;

/// Object identifier (oid) of a node in the graph.
///
/// Resources and principals share the oid space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(pub u64);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ObjectId {
    fn from(oid: u64) -> Self {
        Self(oid)
    }
}

/// Read-only view of the host object graph used by the lock service.
pub trait ObjectGraph: Send + Sync {
    /// Returns the oid of the graph root.
    fn root(&self) -> ObjectId;

    /// Returns true if a node with this oid currently exists.
    fn contains(&self, oid: ObjectId) -> bool;

    /// Resolves a path to the oid of the node living there.
    fn object_for(&self, path: &str) -> Option<ObjectId>;

    /// Returns the canonical path of a node, if it exists.
    fn path_of(&self, oid: ObjectId) -> Option<String>;

    /// Returns the parent of a node. The root and unknown oids have none.
    fn parent_of(&self, oid: ObjectId) -> Option<ObjectId>;
}

impl<G: ObjectGraph + ?Sized> ObjectGraph for Arc<G> {
    fn root(&self) -> ObjectId {
        (**self).root()
    }

    fn contains(&self, oid: ObjectId) -> bool {
        (**self).contains(oid)
    }

    fn object_for(&self, path: &str) -> Option<ObjectId> {
        (**self).object_for(path)
    }

    fn path_of(&self, oid: ObjectId) -> Option<String> {
        (**self).path_of(oid)
    }

    fn parent_of(&self, oid: ObjectId) -> Option<ObjectId> {
        (**self).parent_of(oid)
    }
}
