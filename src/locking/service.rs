// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Sharded lock service.
//!
//! The lock table is split into shards by hash of (resource, kind). A
//! `lock` or `unlock` call holds its shard for the whole
//! query-decide-mutate sequence, so two callers can never both observe "no
//! valid lock" on the same resource and kind.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, instrument};

use crate::clock::Clock;
use crate::graph::{ObjectGraph, ObjectId};

use super::config::LockServiceConfig;
use super::error::LockError;
use super::index::{OwnerIndex, ResourceIndex};
use super::kind::LockKind;
use super::lock::{Lock, LockId, LockSummary};
use super::owner::OwnerRef;

const NUM_SHARDS: usize = 64;

/// A shard of the lock table.
#[derive(Default)]
struct LockShard {
    locks: HashMap<LockId, Lock>,
    index: ResourceIndex,
}

/// Advisory exclusive lock service.
///
/// Owns every lock it creates. Locks are reaped lazily: an expired or
/// orphaned lock is only removed when a later `lock` or `unlock` call touches
/// the same resource and kind.
///
/// Callers are responsible for checking that the acquiring principal may
/// lock the resource; no authorization happens here.
pub struct LockService<G: ObjectGraph, C: Clock> {
    graph: Arc<G>,
    clock: Arc<C>,
    config: LockServiceConfig,
    shards: [Mutex<LockShard>; NUM_SHARDS],
    owners: RwLock<OwnerIndex>,
}

impl<G: ObjectGraph, C: Clock> LockService<G, C> {
    /// Creates a lock service with the default configuration.
    pub fn new(graph: Arc<G>, clock: Arc<C>) -> Self {
        Self::with_config(graph, clock, LockServiceConfig::default())
    }

    /// Creates a lock service with the given configuration.
    pub fn with_config(graph: Arc<G>, clock: Arc<C>, config: LockServiceConfig) -> Self {
        Self {
            graph,
            clock,
            config,
            shards: std::array::from_fn(|_| Mutex::new(LockShard::default())),
            owners: RwLock::new(OwnerIndex::default()),
        }
    }

    #[inline]
    pub fn config(&self) -> &LockServiceConfig {
        &self.config
    }

    #[inline]
    pub fn graph(&self) -> &Arc<G> {
        &self.graph
    }

    #[inline]
    pub fn clock(&self) -> &Arc<C> {
        &self.clock
    }

    /// Computes the shard index for a resource and kind.
    #[inline]
    fn shard_index(resource: ObjectId, kind: &LockKind) -> usize {
        let mut hasher = DefaultHasher::new();
        resource.hash(&mut hasher);
        kind.hash(&mut hasher);
        hasher.finish() as usize % NUM_SHARDS
    }

    #[inline]
    fn shard(&self, resource: ObjectId, kind: &LockKind) -> &Mutex<LockShard> {
        &self.shards[Self::shard_index(resource, kind)]
    }

    /// Resolves an owner about to acquire a lock. Release and queries only
    /// coerce, so locks of removed principals can still be let go.
    fn resolve_acquirer<O: OwnerRef + ?Sized>(&self, owner: &O) -> Result<ObjectId, LockError> {
        let owner_id = owner.resolve_owner()?;
        if self.config.require_known_owner && !self.graph.contains(owner_id) {
            return Err(LockError::InvalidOwner {
                value: owner_id.to_string(),
            });
        }
        Ok(owner_id)
    }

    /// Removes a lock and its index edges. The shard must be the lock's own.
    fn destroy(&self, shard: &mut LockShard, id: LockId) -> Option<Lock> {
        let lock = shard.locks.remove(&id)?;
        shard.index.disconnect(lock.resource_id(), lock.kind(), id);
        self.owners.write().remove(id);
        Some(lock)
    }

    /// Acquires or refreshes a lock of `kind` on `resource` for `owner`.
    ///
    /// - A valid lock held by the same owner is refreshed in place (its
    ///   timeout replaced when `timeout` is `Some`) and returned.
    /// - A valid lock held by anyone else fails with
    ///   [`LockError::Conflict`], carrying that lock.
    /// - Otherwise a new lock is created. `timeout = None` never expires.
    ///
    /// The first stale lock found on the way is reaped; scanning stops there.
    #[instrument(level = "debug", skip_all, fields(resource = %resource, kind = %kind))]
    pub fn lock<O: OwnerRef + ?Sized>(
        &self,
        resource: ObjectId,
        owner: &O,
        timeout: Option<Duration>,
        kind: &LockKind,
    ) -> Result<Lock, LockError> {
        let owner_id = self.resolve_acquirer(owner)?;

        let mut shard = self.shard(resource, kind).lock();
        if !self.graph.contains(resource) {
            return Err(LockError::ResourceNotFound { resource });
        }
        let now = self.clock.now();
        let candidates = shard.index.targets(resource, kind).to_vec();

        for id in candidates {
            let Some(existing) = shard.locks.get_mut(&id) else {
                continue;
            };

            if existing.is_valid(self.graph.as_ref(), now) {
                if existing.owner_id() == owner_id {
                    existing.refresh(timeout, now);
                    debug!(lock = %id, owner = %owner_id, "refreshed lock");
                    return Ok(existing.clone());
                }
                debug!(
                    lock = %id,
                    holder = %existing.owner_id(),
                    owner = %owner_id,
                    "lock held by another owner"
                );
                return Err(LockError::Conflict {
                    lock: Box::new(existing.clone()),
                });
            }

            if let Some(stale) = self.destroy(&mut shard, id) {
                info!(lock = %id, holder = %stale.owner_id(), "reaped stale lock");
            }
            break;
        }

        let lock = Lock::new(owner_id, resource, kind.clone(), timeout, now);
        shard.index.connect(resource, kind, lock.id());
        shard.locks.insert(lock.id(), lock.clone());
        self.owners.write().insert(&lock);

        info!(lock = %lock.id(), owner = %owner_id, ?timeout, "created lock");
        Ok(lock)
    }

    /// Releases the lock of `kind` on `resource`.
    ///
    /// `require_known_owner` does not apply here: a holder that has left the
    /// graph can still release its lock.
    ///
    /// Removes the first lock that is either stale or held by `owner`. Fails
    /// with [`LockError::UnlockConflict`] when there is none, including when
    /// the resource carries no lock at all; the error carries the last lock
    /// examined.
    #[instrument(level = "debug", skip_all, fields(resource = %resource, kind = %kind))]
    pub fn unlock<O: OwnerRef + ?Sized>(
        &self,
        resource: ObjectId,
        owner: &O,
        kind: &LockKind,
    ) -> Result<(), LockError> {
        let owner_id = owner.resolve_owner()?;

        let mut shard = self.shard(resource, kind).lock();
        let now = self.clock.now();
        let candidates = shard.index.targets(resource, kind).to_vec();
        let mut examined = None;

        for id in candidates {
            let Some(existing) = shard.locks.get(&id) else {
                continue;
            };

            let stale = !existing.is_valid(self.graph.as_ref(), now);
            if stale || existing.owner_id() == owner_id {
                self.destroy(&mut shard, id);
                if stale {
                    info!(lock = %id, "reaped stale lock");
                } else {
                    info!(lock = %id, owner = %owner_id, "released lock");
                }
                return Ok(());
            }
            examined = Some(existing.clone());
        }

        debug!(owner = %owner_id, found = examined.is_some(), "nothing to unlock");
        Err(LockError::UnlockConflict {
            lock: examined.map(Box::new),
        })
    }

    /// Deletes a lock by id regardless of owner or validity.
    pub fn remove(&self, id: LockId) -> Option<Lock> {
        let location = self.owners.read().locate(id).cloned()?;
        let mut shard = self.shard(location.resource_id, &location.kind).lock();
        let removed = self.destroy(&mut shard, id);
        if removed.is_some() {
            info!(lock = %id, resource = %location.resource_id, "removed lock");
        }
        removed
    }

    /// Returns a snapshot of the lock with this id.
    pub fn get(&self, id: LockId) -> Option<Lock> {
        let location = self.owners.read().locate(id).cloned()?;
        let shard = self.shard(location.resource_id, &location.kind).lock();
        shard.locks.get(&id).cloned()
    }

    /// Returns every lock of `kind` targeting `resource`, stale ones included.
    pub fn locks_on(&self, resource: ObjectId, kind: &LockKind) -> Vec<Lock> {
        let shard = self.shard(resource, kind).lock();
        shard
            .index
            .targets(resource, kind)
            .iter()
            .filter_map(|id| shard.locks.get(id).cloned())
            .collect()
    }

    /// Returns the valid lock of `kind` on `resource`, if any. Does not reap.
    pub fn active_lock(&self, resource: ObjectId, kind: &LockKind) -> Option<Lock> {
        let now = self.clock.now();
        self.locks_on(resource, kind)
            .into_iter()
            .find(|lock| lock.is_valid(self.graph.as_ref(), now))
    }

    /// Returns the locks held by `owner`, stale ones included, ordered by id.
    ///
    /// The owner is only coerced to an oid, never checked against the graph,
    /// so the locks of a removed principal stay listable.
    pub fn locks_owned_by<O: OwnerRef + ?Sized>(&self, owner: &O) -> Result<Vec<Lock>, LockError> {
        let owner_id = owner.resolve_owner()?;
        let owned = self.owners.read().owned_by(owner_id);

        Ok(owned
            .into_iter()
            .filter_map(|(id, location)| {
                let shard = self.shard(location.resource_id, &location.kind).lock();
                shard.locks.get(&id).cloned()
            })
            .collect())
    }

    /// Returns true if `lock` is valid now.
    pub fn is_valid(&self, lock: &Lock) -> bool {
        lock.is_valid(self.graph.as_ref(), self.clock.now())
    }

    /// Builds a display-ready summary of `lock`.
    pub fn describe(&self, lock: &Lock) -> LockSummary {
        LockSummary {
            id: lock.id(),
            owner_id: lock.owner_id(),
            kind: lock.kind().clone(),
            resource_path: self.graph.path_of(lock.resource_id()),
            timeout: lock.timeout(),
            last_refresh: lock.last_refresh(),
            expires: lock.expires(),
        }
    }

    /// Returns the number of locks held, stale ones included.
    pub fn len(&self) -> usize {
        self.owners.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
