//! Winner ordering between bindings claiming the same path.
//!
//! Higher ranking wins; equal rankings fall back to the numerically smaller
//! registration id. Ids are unique, so no two distinct registrations compare
//! equal and the order is total.

use super::registration::{Registration, RegistrationId};
use std::cmp::Ordering;

/// Sort key of a binding inside a path entry.
///
/// `Ord` is defined so that the *winner* is the smallest element: iterating a
/// `BTreeSet<Priority>` yields candidates from head to tail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Priority {
    pub ranking: i32,
    pub id: RegistrationId,
}

impl Priority {
    pub fn of(registration: &Registration) -> Self {
        Self {
            ranking: registration.ranking(),
            id: registration.id(),
        }
    }

    /// Returns `true` if `self` takes precedence over `other`.
    #[inline]
    pub fn outranks(&self, other: &Priority) -> bool {
        self < other
    }
}

impl Ord for Priority {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .ranking
            .cmp(&self.ranking)
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl PartialOrd for Priority {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
