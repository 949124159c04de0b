// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! In-memory object map.

use std::collections::{BTreeMap, HashMap};

use parking_lot::RwLock;

use super::error::GraphError;
use super::traits::{ObjectGraph, ObjectId};

const ROOT_PATH: &str = "/";

/// Normalises a `/`-separated path.
///
/// Empty segments are dropped, so `"a//b/"` and `"/a/b"` are the same path.
/// Returns `None` for `.` or `..` segments.
pub fn normalize_path(path: &str) -> Option<String> {
    let mut normalized = String::with_capacity(path.len() + 1);
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        if segment == "." || segment == ".." {
            return None;
        }
        normalized.push('/');
        normalized.push_str(segment);
    }
    if normalized.is_empty() {
        normalized.push_str(ROOT_PATH);
    }
    Some(normalized)
}

fn parent_path(path: &str) -> Option<&str> {
    if path == ROOT_PATH {
        return None;
    }
    match path.rfind('/') {
        Some(0) => Some(ROOT_PATH),
        Some(idx) => Some(&path[..idx]),
        None => None,
    }
}

struct MapInner {
    by_path: BTreeMap<String, ObjectId>,
    by_oid: HashMap<ObjectId, String>,
    next_oid: u64,
}

/// Thread-safe in-memory object graph.
///
/// Maintains a bidirectional path/oid mapping. Oids are never reused.
pub struct ObjectMap {
    inner: RwLock<MapInner>,
    root: ObjectId,
}

impl ObjectMap {
    /// Creates a map containing only the root.
    pub fn new() -> Self {
        let root = ObjectId(1);
        let mut by_path = BTreeMap::new();
        let mut by_oid = HashMap::new();
        by_path.insert(ROOT_PATH.to_string(), root);
        by_oid.insert(root, ROOT_PATH.to_string());

        Self {
            inner: RwLock::new(MapInner {
                by_path,
                by_oid,
                next_oid: 2,
            }),
            root,
        }
    }

    /// Adds a node at `path` and returns its new oid.
    ///
    /// The parent must already exist.
    pub fn add(&self, path: &str) -> Result<ObjectId, GraphError> {
        let path = normalize_path(path).ok_or_else(|| GraphError::InvalidPath(path.to_string()))?;
        let parent = parent_path(&path).ok_or_else(|| GraphError::AlreadyExists(path.clone()))?;

        let mut inner = self.inner.write();
        if !inner.by_path.contains_key(parent) {
            return Err(GraphError::ParentNotFound(path));
        }
        if inner.by_path.contains_key(&path) {
            return Err(GraphError::AlreadyExists(path));
        }

        let oid = ObjectId(inner.next_oid);
        inner.next_oid += 1;
        inner.by_path.insert(path.clone(), oid);
        inner.by_oid.insert(oid, path);
        Ok(oid)
    }

    /// Removes the node at `path` together with its whole subtree.
    ///
    /// Returns the oids that were removed, the named node first.
    pub fn remove(&self, path: &str) -> Result<Vec<ObjectId>, GraphError> {
        let path = normalize_path(path).ok_or_else(|| GraphError::InvalidPath(path.to_string()))?;
        if path == ROOT_PATH {
            return Err(GraphError::RootRemoval);
        }

        let mut inner = self.inner.write();
        if !inner.by_path.contains_key(&path) {
            return Err(GraphError::NotFound(path));
        }

        let prefix = format!("{path}/");
        let doomed: Vec<String> = inner
            .by_path
            .range(path.clone()..)
            .take_while(|(p, _)| p.starts_with(path.as_str()))
            .filter(|(p, _)| **p == path || p.starts_with(&prefix))
            .map(|(p, _)| p.clone())
            .collect();

        let mut removed = Vec::with_capacity(doomed.len());
        for p in doomed {
            if let Some(oid) = inner.by_path.remove(&p) {
                inner.by_oid.remove(&oid);
                removed.push(oid);
            }
        }
        Ok(removed)
    }

    /// Returns the number of nodes, root included.
    pub fn len(&self) -> usize {
        self.inner.read().by_path.len()
    }

    /// Always false: the root cannot be removed.
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl Default for ObjectMap {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectGraph for ObjectMap {
    #[inline]
    fn root(&self) -> ObjectId {
        self.root
    }

    fn contains(&self, oid: ObjectId) -> bool {
        self.inner.read().by_oid.contains_key(&oid)
    }

    fn object_for(&self, path: &str) -> Option<ObjectId> {
        let path = normalize_path(path)?;
        self.inner.read().by_path.get(&path).copied()
    }

    fn path_of(&self, oid: ObjectId) -> Option<String> {
        self.inner.read().by_oid.get(&oid).cloned()
    }

    fn parent_of(&self, oid: ObjectId) -> Option<ObjectId> {
        let inner = self.inner.read();
        let path = inner.by_oid.get(&oid)?;
        let parent = parent_path(path)?;
        inner.by_path.get(parent).copied()
    }
}
