// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Reference indexes between resources, owners and locks.
//!
//! Two plain maps stand in for the object graph's reference edges:
//! resource+kind to locks, and owner to locks. The lock service updates
//! them in the same critical section that creates or destroys a lock.

use std::collections::{BTreeSet, HashMap};

use crate::graph::ObjectId;

use super::kind::LockKind;
use super::lock::{Lock, LockId};

/// Locks targeting each (resource, kind), in creation order.
#[derive(Debug, Default)]
pub(crate) struct ResourceIndex {
    targets: HashMap<ObjectId, HashMap<LockKind, Vec<LockId>>>,
}

impl ResourceIndex {
    /// Returns the locks of `kind` targeting `resource`.
    pub(crate) fn targets(&self, resource: ObjectId, kind: &LockKind) -> &[LockId] {
        self.targets
            .get(&resource)
            .and_then(|kinds| kinds.get(kind))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub(crate) fn connect(&mut self, resource: ObjectId, kind: &LockKind, id: LockId) {
        self.targets
            .entry(resource)
            .or_default()
            .entry(kind.clone())
            .or_default()
            .push(id);
    }

    /// Removes an edge, dropping empty buckets. Returns false if it was absent.
    pub(crate) fn disconnect(&mut self, resource: ObjectId, kind: &LockKind, id: LockId) -> bool {
        let Some(kinds) = self.targets.get_mut(&resource) else {
            return false;
        };
        let Some(ids) = kinds.get_mut(kind) else {
            return false;
        };
        let Some(pos) = ids.iter().position(|existing| *existing == id) else {
            return false;
        };

        ids.remove(pos);
        if ids.is_empty() {
            kinds.remove(kind);
        }
        if kinds.is_empty() {
            self.targets.remove(&resource);
        }
        true
    }
}

/// Where a lock lives, enough to find its shard again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LockLocation {
    pub(crate) owner_id: ObjectId,
    pub(crate) resource_id: ObjectId,
    pub(crate) kind: LockKind,
}

/// Locks held by each owner, plus the location of every lock.
#[derive(Debug, Default)]
pub(crate) struct OwnerIndex {
    owned: HashMap<ObjectId, BTreeSet<LockId>>,
    locations: HashMap<LockId, LockLocation>,
}

impl OwnerIndex {
    pub(crate) fn insert(&mut self, lock: &Lock) {
        self.owned
            .entry(lock.owner_id())
            .or_default()
            .insert(lock.id());
        self.locations.insert(
            lock.id(),
            LockLocation {
                owner_id: lock.owner_id(),
                resource_id: lock.resource_id(),
                kind: lock.kind().clone(),
            },
        );
    }

    pub(crate) fn remove(&mut self, id: LockId) -> Option<LockLocation> {
        let location = self.locations.remove(&id)?;
        if let Some(owned) = self.owned.get_mut(&location.owner_id) {
            owned.remove(&id);
            if owned.is_empty() {
                self.owned.remove(&location.owner_id);
            }
        }
        Some(location)
    }

    pub(crate) fn locate(&self, id: LockId) -> Option<&LockLocation> {
        self.locations.get(&id)
    }

    /// Returns the ids and locations of the locks `owner` holds, ordered by id.
    pub(crate) fn owned_by(&self, owner: ObjectId) -> Vec<(LockId, LockLocation)> {
        let Some(owned) = self.owned.get(&owner) else {
            return Vec::new();
        };
        owned
            .iter()
            .filter_map(|id| self.locations.get(id).map(|loc| (*id, loc.clone())))
            .collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.locations.len()
    }
}
