// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Path-addressable object graph.
//!
//! Locks target nodes of a host object graph. The lock service only needs a
//! narrow view of that graph: does an oid still exist, which oid lives at a
//! path, and what is a node's parent. [`ObjectGraph`] captures that view and
//! [`ObjectMap`] is an in-memory implementation for embedding and tests.
//!
//! # Example
//!
//! ```
//! use latchkey::graph::{ObjectGraph, ObjectMap};
//!
//! let map = ObjectMap::new();
//! let docs = map.add("/docs").unwrap();
//! let page = map.add("/docs/page").unwrap();
//!
//! assert_eq!(map.object_for("docs/page"), Some(page));
//! assert_eq!(map.parent_of(page), Some(docs));
//!
//! map.remove("/docs").unwrap();
//! assert!(!map.contains(page));
//! ```

mod error;
mod objectmap;
mod traits;

pub use error::GraphError;
pub use objectmap::{normalize_path, ObjectMap};
pub use traits::{ObjectGraph, ObjectId};
