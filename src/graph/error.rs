// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Object graph error types.

/// Errors that can occur when mutating an [`ObjectMap`](super::ObjectMap).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    #[error("invalid path {0:?}")]
    InvalidPath(String),

    #[error("parent of {0} does not exist")]
    ParentNotFound(String),

    #[error("object already exists at {0}")]
    AlreadyExists(String),

    #[error("no object at {0}")]
    NotFound(String),

    #[error("the root object cannot be removed")]
    RootRemoval,
}
