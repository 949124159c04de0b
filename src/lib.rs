// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Latchkey: advisory exclusive locks for resources in a path-addressable
//! object graph.
//!
//! This crate provides the lock lifecycle (acquire, refresh, expire, reap,
//! release) for hosts that keep content in an object graph and want
//! DAV-style write locks without a separate lock server.

pub mod clock;
pub mod graph;
pub mod locking;

pub use clock::{Clock, ManualClock, SystemClock};
pub use graph::{GraphError, ObjectGraph, ObjectId, ObjectMap};
pub use locking::{
    lock_path, lock_resource, unlock_path, unlock_resource, Lock, LockError, LockId, LockKind,
    LockService, LockServiceConfig, LockSummary, OwnerRef, Principal, Root,
};
