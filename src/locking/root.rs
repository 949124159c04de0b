// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Lock service discovery and lazy provisioning.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::info;

use crate::clock::Clock;
use crate::graph::{ObjectGraph, ObjectId};

use super::config::LockServiceConfig;
use super::error::LockError;
use super::service::LockService;

type Services<G, C> = HashMap<ObjectId, HashMap<String, Arc<LockService<G, C>>>>;

/// Root context of an object graph.
///
/// Keeps the registry of lock services, keyed by the folder they are
/// registered on and their name. Lookups walk from an anchor node up to the
/// root, so the nearest registered service wins.
pub struct Root<G: ObjectGraph, C: Clock> {
    graph: Arc<G>,
    clock: Arc<C>,
    config: LockServiceConfig,
    services: Mutex<Services<G, C>>,
}

impl<G: ObjectGraph, C: Clock> Root<G, C> {
    /// Creates a root context with the default configuration.
    pub fn new(graph: Arc<G>, clock: Arc<C>) -> Self {
        Self::with_config(graph, clock, LockServiceConfig::default())
    }

    /// Creates a root context whose provisioned services use `config`.
    pub fn with_config(graph: Arc<G>, clock: Arc<C>, config: LockServiceConfig) -> Self {
        Self {
            graph,
            clock,
            config,
            services: Mutex::new(HashMap::new()),
        }
    }

    #[inline]
    pub fn graph(&self) -> &Arc<G> {
        &self.graph
    }

    #[inline]
    pub fn clock(&self) -> &Arc<C> {
        &self.clock
    }

    #[inline]
    pub fn config(&self) -> &LockServiceConfig {
        &self.config
    }

    /// Resolves a `/`-separated resource path to its oid.
    ///
    /// Fails with [`LockError::PathNotFound`] for unknown paths and for paths
    /// the graph refuses to resolve, such as ones containing `..`.
    pub fn resolve(&self, path: &str) -> Result<ObjectId, LockError> {
        self.graph
            .object_for(path)
            .ok_or_else(|| LockError::PathNotFound {
                path: path.to_string(),
            })
    }

    fn find_in(
        &self,
        services: &Services<G, C>,
        anchor: ObjectId,
        name: &str,
    ) -> Option<Arc<LockService<G, C>>> {
        let lookup = |folder: ObjectId| services.get(&folder).and_then(|named| named.get(name));

        let mut current = Some(anchor);
        while let Some(folder) = current {
            if let Some(found) = lookup(folder) {
                return Some(Arc::clone(found));
            }
            current = self.graph.parent_of(folder);
        }

        // Anchors that left the graph have no lineage; the root still applies.
        lookup(self.graph.root()).cloned()
    }

    /// Finds the service called `name` nearest to `anchor`.
    pub fn find_service(&self, anchor: ObjectId, name: &str) -> Option<Arc<LockService<G, C>>> {
        let services = self.services.lock();
        self.find_in(&services, anchor, name)
    }

    /// Registers `service` on `folder` under `name`.
    pub fn add_service(
        &self,
        folder: ObjectId,
        name: &str,
        service: Arc<LockService<G, C>>,
    ) -> Result<(), LockError> {
        if !self.graph.contains(folder) {
            return Err(LockError::ResourceNotFound { resource: folder });
        }

        let mut services = self.services.lock();
        let named = services.entry(folder).or_default();
        if named.contains_key(name) {
            return Err(LockError::ServiceExists {
                name: name.to_string(),
            });
        }
        named.insert(name.to_string(), service);
        info!(folder = %folder, service = name, "registered lock service");
        Ok(())
    }

    /// Returns the lock service responsible for `anchor`, creating one at the
    /// root if none is registered.
    ///
    /// Lookup and creation happen under one lock, so concurrent callers
    /// provision exactly one service.
    pub fn lock_service(&self, anchor: ObjectId) -> Arc<LockService<G, C>> {
        let name = self.config.service_name.as_str();
        let mut services = self.services.lock();
        if let Some(found) = self.find_in(&services, anchor, name) {
            return found;
        }

        let service = Arc::new(LockService::with_config(
            Arc::clone(&self.graph),
            Arc::clone(&self.clock),
            self.config.clone(),
        ));
        let root = self.graph.root();
        services
            .entry(root)
            .or_default()
            .insert(name.to_string(), Arc::clone(&service));

        info!(folder = %root, service = name, "provisioned lock service");
        service
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::graph::ObjectMap;

    fn create_test_root() -> (Root<ObjectMap, ManualClock>, Arc<ObjectMap>) {
        let graph = Arc::new(ObjectMap::new());
        let root = Root::new(graph.clone(), Arc::new(ManualClock::epoch()));
        (root, graph)
    }

    #[test]
    fn test_resolve_path() {
        let (root, graph) = create_test_root();
        graph.add("/docs").unwrap();
        let page = graph.add("/docs/page").unwrap();

        assert_eq!(root.resolve("/docs/page").unwrap(), page);
        assert_eq!(root.resolve("docs//page/").unwrap(), page);
        assert_eq!(root.resolve("/").unwrap(), graph.root());

        for bad in ["/docs/missing", "/docs/page/../page", ".."] {
            let err = root.resolve(bad).unwrap_err();
            assert!(matches!(err, LockError::PathNotFound { ref path } if path == bad));
        }
    }

    #[test]
    fn test_find_service_absent() {
        let (root, graph) = create_test_root();
        assert!(root.find_service(graph.root(), "locks").is_none());
    }

    #[test]
    fn test_lock_service_provisions_once() {
        let (root, graph) = create_test_root();
        let doc = graph.add("/doc").unwrap();

        let first = root.lock_service(doc);
        let second = root.lock_service(graph.root());

        assert!(Arc::ptr_eq(&first, &second));
        let found = root.find_service(doc, "locks").unwrap();
        assert!(Arc::ptr_eq(&first, &found));
    }

    #[test]
    fn test_custom_service_name() {
        let graph = Arc::new(ObjectMap::new());
        let config = LockServiceConfig::new().with_service_name("dav-locks");
        let root = Root::with_config(graph.clone(), Arc::new(ManualClock::epoch()), config);

        let service = root.lock_service(graph.root());
        assert_eq!(service.config().service_name, "dav-locks");
        assert!(root.find_service(graph.root(), "dav-locks").is_some());
        assert!(root.find_service(graph.root(), "locks").is_none());
    }

    #[test]
    fn test_nearest_service_wins() {
        let (root, graph) = create_test_root();
        let site = graph.add("/site").unwrap();
        let page = graph.add("/site/page").unwrap();
        let other = graph.add("/other").unwrap();

        let at_root = root.lock_service(graph.root());
        let local = Arc::new(LockService::new(
            graph.clone(),
            Arc::new(ManualClock::epoch()),
        ));
        root.add_service(site, "locks", local.clone()).unwrap();

        assert!(Arc::ptr_eq(&root.lock_service(page), &local));
        assert!(Arc::ptr_eq(&root.lock_service(other), &at_root));
    }

    #[test]
    fn test_add_service_conflict() {
        let (root, graph) = create_test_root();
        root.lock_service(graph.root());

        let again = Arc::new(LockService::new(
            graph.clone(),
            Arc::new(ManualClock::epoch()),
        ));
        let err = root.add_service(graph.root(), "locks", again).unwrap_err();
        assert!(matches!(err, LockError::ServiceExists { ref name } if name == "locks"));
    }

    #[test]
    fn test_add_service_missing_folder() {
        let (root, graph) = create_test_root();
        let service = Arc::new(LockService::new(
            graph.clone(),
            Arc::new(ManualClock::epoch()),
        ));
        assert!(matches!(
            root.add_service(ObjectId(999), "locks", service),
            Err(LockError::ResourceNotFound { .. })
        ));
    }

    #[test]
    fn test_removed_anchor_falls_back_to_root() {
        let (root, graph) = create_test_root();
        let doc = graph.add("/doc").unwrap();
        let provisioned = root.lock_service(doc);

        graph.remove("/doc").unwrap();
        let found = root.find_service(doc, "locks").unwrap();
        assert!(Arc::ptr_eq(&provisioned, &found));
    }

    #[test]
    fn test_concurrent_provisioning() {
        use std::thread;

        let (root, graph) = create_test_root();
        let root = Arc::new(root);
        let anchor = graph.root();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let root = Arc::clone(&root);
                thread::spawn(move || root.lock_service(anchor))
            })
            .collect();
        let services: Vec<_> = handles
            .into_iter()
            .map(|h| h.join().expect("thread panicked"))
            .collect();

        assert!(services.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }
}
