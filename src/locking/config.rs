// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Configuration for the lock service.

/// Name the lock service is registered under at the graph root.
pub const DEFAULT_SERVICE_NAME: &str = "locks";

/// Configuration for [`LockService`](super::LockService) and its
/// provisioning.
#[derive(Debug, Clone)]
pub struct LockServiceConfig {
    /// Service name used for lookup and lazy registration.
    pub service_name: String,
    /// Reject owner ids that do not name a node in the object graph.
    pub require_known_owner: bool,
}

impl Default for LockServiceConfig {
    fn default() -> Self {
        Self {
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            require_known_owner: false,
        }
    }
}

impl LockServiceConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the service name.
    pub fn with_service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = name.into();
        self
    }

    /// Requires owners to exist in the object graph.
    pub fn with_require_known_owner(mut self, require: bool) -> Self {
        self.require_known_owner = require;
        self
    }
}
