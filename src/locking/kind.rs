// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Lock kind discriminator.

use std::borrow::Cow;
use std::fmt;

/// Tag separating independent classes of locks on the same resource.
///
/// A resource can carry one valid lock per kind at a time. Write locks are
/// the default kind.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LockKind(Cow<'static, str>);

impl LockKind {
    /// Exclusive write lock.
    pub const WRITE: LockKind = LockKind(Cow::Borrowed("write"));

    /// Creates a kind from a static tag.
    pub const fn new(tag: &'static str) -> Self {
        Self(Cow::Borrowed(tag))
    }

    /// Creates a kind from a runtime tag.
    pub fn owned(tag: impl Into<String>) -> Self {
        Self(Cow::Owned(tag.into()))
    }

    /// Returns the tag.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for LockKind {
    fn default() -> Self {
        Self::WRITE
    }
}

impl fmt::Display for LockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
