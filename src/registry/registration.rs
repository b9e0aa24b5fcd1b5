//! Immutable identity and metadata of one candidate handler.

use crate::error::RegistrationError;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// Globally unique identity assigned by the external registrar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RegistrationId(pub u64);

impl fmt::Display for RegistrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque identifier of the serving context a binding belongs to.
///
/// Bindings in different contexts never compete, even for identical patterns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ContextId(pub u64);

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity, priority and claimed path patterns of a handler.
///
/// Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Registration {
    id: RegistrationId,
    ranking: i32,
    paths: Vec<String>,
}

impl Registration {
    /// Build a registration, rejecting an empty path list, empty patterns and
    /// duplicated patterns. Path order is preserved.
    pub fn new<I, S>(id: u64, ranking: i32, paths: I) -> Result<Self, RegistrationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let paths: Vec<String> = paths.into_iter().map(Into::into).collect();
        if paths.is_empty() {
            return Err(RegistrationError::NoPaths);
        }

        let mut seen = HashSet::with_capacity(paths.len());
        for path in &paths {
            if path.is_empty() {
                return Err(RegistrationError::EmptyPath);
            }
            if !seen.insert(path.as_str()) {
                return Err(RegistrationError::DuplicatePath(path.clone()));
            }
        }

        Ok(Self {
            id: RegistrationId(id),
            ranking,
            paths,
        })
    }

    #[inline]
    pub fn id(&self) -> RegistrationId {
        self.id
    }

    #[inline]
    pub fn ranking(&self) -> i32 {
        self.ranking
    }

    /// Claimed path patterns, in registration order.
    #[inline]
    pub fn paths(&self) -> &[String] {
        &self.paths
    }
}
