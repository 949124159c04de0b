// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Lock records and their validity rules.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::graph::{ObjectGraph, ObjectId};

use super::kind::LockKind;

/// Unique lock identifier, generated when the lock is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LockId(Uuid);

impl LockId {
    /// Generates a fresh random id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for LockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for LockId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// An advisory exclusive hold on a resource.
///
/// Values handed out by the lock service are snapshots: mutating one does not
/// change the service's copy, and a snapshot goes stale once its expiry time
/// passes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lock {
    id: LockId,
    owner_id: ObjectId,
    resource_id: ObjectId,
    kind: LockKind,
    timeout: Option<Duration>,
    last_refresh: DateTime<Utc>,
}

impl Lock {
    pub(crate) fn new(
        owner_id: ObjectId,
        resource_id: ObjectId,
        kind: LockKind,
        timeout: Option<Duration>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: LockId::generate(),
            owner_id,
            resource_id,
            kind,
            timeout,
            last_refresh: now,
        }
    }

    #[inline]
    pub fn id(&self) -> LockId {
        self.id
    }

    /// Returns the oid of the principal holding the lock.
    #[inline]
    pub fn owner_id(&self) -> ObjectId {
        self.owner_id
    }

    /// Returns the oid of the locked resource.
    #[inline]
    pub fn resource_id(&self) -> ObjectId {
        self.resource_id
    }

    #[inline]
    pub fn kind(&self) -> &LockKind {
        &self.kind
    }

    /// Returns the expiry duration, `None` meaning the lock never expires.
    #[inline]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    #[inline]
    pub fn last_refresh(&self) -> DateTime<Utc> {
        self.last_refresh
    }

    /// Restarts the expiry window at `when`.
    ///
    /// A `Some` timeout replaces the stored one; `None` keeps it.
    pub fn refresh(&mut self, timeout: Option<Duration>, when: DateTime<Utc>) {
        if timeout.is_some() {
            self.timeout = timeout;
        }
        self.last_refresh = when;
    }

    /// Returns the instant the lock expires (or expired).
    ///
    /// `None` when the lock has no timeout. Saturates at the latest
    /// representable time for timeouts too large to add.
    pub fn expires(&self) -> Option<DateTime<Utc>> {
        let timeout = self.timeout?;
        let expires = chrono::Duration::from_std(timeout)
            .ok()
            .and_then(|delta| self.last_refresh.checked_add_signed(delta))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Some(expires)
    }

    /// Returns true if the expiry time lies strictly before `when`.
    pub fn is_expired(&self, when: DateTime<Utc>) -> bool {
        self.expires().is_some_and(|expires| expires < when)
    }

    /// Returns true if the resource still exists and the lock has not expired
    /// at `when`.
    pub fn is_valid<G: ObjectGraph + ?Sized>(&self, graph: &G, when: DateTime<Utc>) -> bool {
        graph.contains(self.resource_id) && !self.is_expired(when)
    }
}

/// Display-ready description of a lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockSummary {
    pub id: LockId,
    pub owner_id: ObjectId,
    pub kind: LockKind,
    /// Path of the locked resource, `None` once it has been removed.
    pub resource_path: Option<String>,
    pub timeout: Option<Duration>,
    pub last_refresh: DateTime<Utc>,
    pub expires: Option<DateTime<Utc>>,
}

impl fmt::Display for LockSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.resource_path {
            Some(path) => write!(f, "{path}")?,
            None => write!(f, "<removed resource>")?,
        }
        write!(f, " ({}) locked by {}", self.kind, self.owner_id)?;
        match self.expires {
            Some(expires) => write!(f, " until {}", expires.to_rfc3339()),
            None => write!(f, " indefinitely"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::ObjectMap;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    fn lock_with(timeout: Option<Duration>) -> Lock {
        Lock::new(ObjectId(10), ObjectId(2), LockKind::WRITE, timeout, at(1000))
    }

    #[test]
    fn test_new_lock() {
        let lock = lock_with(Some(Duration::from_secs(60)));
        assert_eq!(lock.owner_id(), ObjectId(10));
        assert_eq!(lock.resource_id(), ObjectId(2));
        assert_eq!(lock.kind(), &LockKind::WRITE);
        assert_eq!(lock.timeout(), Some(Duration::from_secs(60)));
        assert_eq!(lock.last_refresh(), at(1000));
    }

    #[test]
    fn test_ids_unique() {
        assert_ne!(lock_with(None).id(), lock_with(None).id());
    }

    #[test]
    fn test_lock_id_round_trips_through_string() {
        let id = LockId::generate();
        let parsed: LockId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert!("not-a-uuid".parse::<LockId>().is_err());
    }

    #[test]
    fn test_expires() {
        assert_eq!(lock_with(None).expires(), None);
        assert_eq!(
            lock_with(Some(Duration::from_secs(60))).expires(),
            Some(at(1060))
        );
    }

    #[test]
    fn test_expires_saturates() {
        let lock = lock_with(Some(Duration::MAX));
        assert_eq!(lock.expires(), Some(DateTime::<Utc>::MAX_UTC));
    }

    #[test]
    fn test_expiry_boundary_is_inclusive() {
        let lock = lock_with(Some(Duration::from_secs(60)));
        assert!(!lock.is_expired(at(1060)));
        assert!(lock.is_expired(at(1061)));
    }

    #[test]
    fn test_refresh_keeps_timeout_when_none() {
        let mut lock = lock_with(Some(Duration::from_secs(60)));
        lock.refresh(None, at(2000));
        assert_eq!(lock.timeout(), Some(Duration::from_secs(60)));
        assert_eq!(lock.last_refresh(), at(2000));
        assert_eq!(lock.expires(), Some(at(2060)));
    }

    #[test]
    fn test_refresh_overwrites_timeout() {
        let mut lock = lock_with(Some(Duration::from_secs(60)));
        lock.refresh(Some(Duration::from_secs(5)), at(2000));
        assert_eq!(lock.expires(), Some(at(2005)));
    }

    #[test]
    fn test_unbounded_lock_always_valid() {
        let map = ObjectMap::new();
        let resource = map.add("/doc").unwrap();
        let lock = Lock::new(ObjectId(10), resource, LockKind::WRITE, None, at(0));

        assert!(lock.is_valid(&map, at(0)));
        assert!(lock.is_valid(&map, DateTime::<Utc>::MAX_UTC));
    }

    #[test]
    fn test_invalid_when_resource_removed() {
        let map = ObjectMap::new();
        let resource = map.add("/doc").unwrap();
        let lock = Lock::new(ObjectId(10), resource, LockKind::WRITE, None, at(0));

        map.remove("/doc").unwrap();
        assert!(!lock.is_valid(&map, at(0)));
    }

    #[test]
    fn test_invalid_when_expired() {
        let map = ObjectMap::new();
        let resource = map.add("/doc").unwrap();
        let lock = Lock::new(
            ObjectId(10),
            resource,
            LockKind::WRITE,
            Some(Duration::from_secs(1)),
            at(0),
        );

        assert!(lock.is_valid(&map, at(1)));
        assert!(!lock.is_valid(&map, at(2)));
    }

    #[test]
    fn test_summary_display() {
        let lock = lock_with(Some(Duration::from_secs(60)));
        let summary = LockSummary {
            id: lock.id(),
            owner_id: lock.owner_id(),
            kind: lock.kind().clone(),
            resource_path: Some("/docs/page".into()),
            timeout: lock.timeout(),
            last_refresh: lock.last_refresh(),
            expires: lock.expires(),
        };
        let text = summary.to_string();
        assert!(text.starts_with("/docs/page (write) locked by 10 until"));

        let orphaned = LockSummary {
            resource_path: None,
            expires: None,
            ..summary
        };
        assert_eq!(
            orphaned.to_string(),
            "<removed resource> (write) locked by 10 indefinitely"
        );
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn expires_is_last_refresh_plus_timeout(
            start in 0i64..4_000_000_000,
            timeout in 0u64..10_000_000
        ) {
            let when = DateTime::from_timestamp(start, 0).unwrap();
            let lock = Lock::new(
                ObjectId(1),
                ObjectId(2),
                LockKind::WRITE,
                Some(Duration::from_secs(timeout)),
                when,
            );
            let expires = lock.expires().unwrap();
            prop_assert_eq!((expires - when).num_seconds(), timeout as i64);
        }

        #[test]
        fn expired_iff_strictly_after_expiry(
            timeout in 0u64..1_000,
            offset in 0u64..2_000
        ) {
            let start = DateTime::<Utc>::UNIX_EPOCH;
            let lock = Lock::new(
                ObjectId(1),
                ObjectId(2),
                LockKind::WRITE,
                Some(Duration::from_secs(timeout)),
                start,
            );
            let when = start + chrono::Duration::seconds(offset as i64);
            prop_assert_eq!(lock.is_expired(when), offset > timeout);
        }

        #[test]
        fn refresh_never_changes_identity(
            first in 0u64..1_000,
            second in proptest::option::of(0u64..1_000)
        ) {
            let mut lock = Lock::new(
                ObjectId(1),
                ObjectId(2),
                LockKind::WRITE,
                Some(Duration::from_secs(first)),
                DateTime::<Utc>::UNIX_EPOCH,
            );
            let before = lock.clone();
            lock.refresh(second.map(Duration::from_secs), DateTime::<Utc>::UNIX_EPOCH);

            prop_assert_eq!(lock.id(), before.id());
            prop_assert_eq!(lock.owner_id(), before.owner_id());
            prop_assert_eq!(lock.resource_id(), before.resource_id());
            prop_assert_eq!(
                lock.timeout(),
                second.map(Duration::from_secs).or(before.timeout())
            );
        }
    }
}
