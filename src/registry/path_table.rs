//! Path table: candidates per `(context, path)`, kept in priority order.

use super::priority::Priority;
use super::registration::ContextId;
use std::collections::{BTreeSet, HashMap};

/// Key of a path entry. Identical patterns in different contexts never compete.
pub(crate) type PathKey = (ContextId, String);

/// Result of inserting a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Insertion {
    /// Head before the insert, if any.
    pub previous_head: Option<Priority>,
    /// Whether the inserted candidate is now the head.
    pub is_head: bool,
}

impl Insertion {
    /// The head that lost its position to the inserted candidate.
    pub fn displaced(&self) -> Option<Priority> {
        if self.is_head { self.previous_head } else { None }
    }
}

/// Result of removing a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Removal {
    pub was_head: bool,
    /// Head after the removal. `None` means the entry was discarded.
    pub new_head: Option<Priority>,
}

#[derive(Debug, Default)]
pub(crate) struct PathTable {
    entries: HashMap<PathKey, BTreeSet<Priority>>,
}

impl PathTable {
    pub fn insert(&mut self, context: ContextId, path: &str, candidate: Priority) -> Insertion {
        let set = self.entries.entry((context, path.to_owned())).or_default();
        let previous_head = set.first().copied();
        let inserted = set.insert(candidate);
        debug_assert!(inserted, "candidate {:?} inserted twice on {path}", candidate.id);
        Insertion {
            previous_head,
            is_head: set.first() == Some(&candidate),
        }
    }

    /// Remove `candidate` from the entry. Returns `None` if it was not there.
    pub fn remove(&mut self, context: ContextId, path: &str, candidate: Priority) -> Option<Removal> {
        let key = (context, path.to_owned());
        let set = self.entries.get_mut(&key)?;
        let was_head = set.first() == Some(&candidate);
        if !set.remove(&candidate) {
            return None;
        }
        let new_head = set.first().copied();
        if new_head.is_none() {
            self.entries.remove(&key);
        }
        Some(Removal { was_head, new_head })
    }

    pub fn head(&self, context: ContextId, path: &str) -> Option<Priority> {
        self.entries
            .get(&(context, path.to_owned()))
            .and_then(|set| set.first().copied())
    }

    /// Candidates on one path, head first.
    #[cfg(test)]
    pub fn candidates(&self, context: ContextId, path: &str) -> impl Iterator<Item = &Priority> {
        self.entries
            .get(&(context, path.to_owned()))
            .into_iter()
            .flat_map(|set| set.iter())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PathKey, &BTreeSet<Priority>)> {
        self.entries.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::RegistrationId;

    fn p(id: u64, ranking: i32) -> Priority {
        Priority {
            ranking,
            id: RegistrationId(id),
        }
    }

    const CTX: ContextId = ContextId(0);

    #[test]
    fn first_insert_becomes_head() {
        let mut t = PathTable::default();
        let ins = t.insert(CTX, "/foo", p(1, 0));
        assert!(ins.is_head);
        assert_eq!(ins.previous_head, None);
        assert_eq!(ins.displaced(), None);
        assert_eq!(t.head(CTX, "/foo"), Some(p(1, 0)));
    }

    #[test]
    fn lower_priority_does_not_displace() {
        let mut t = PathTable::default();
        t.insert(CTX, "/foo", p(1, 10));
        let ins = t.insert(CTX, "/foo", p(2, 0));
        assert!(!ins.is_head);
        assert_eq!(ins.displaced(), None);
        assert_eq!(t.head(CTX, "/foo"), Some(p(1, 10)));
    }

    #[test]
    fn tie_with_lower_id_displaces() {
        let mut t = PathTable::default();
        t.insert(CTX, "/foo", p(2, 0));
        let ins = t.insert(CTX, "/foo", p(1, 0));
        assert!(ins.is_head);
        assert_eq!(ins.displaced(), Some(p(2, 0)));
    }

    #[test]
    fn removing_head_promotes_next() {
        let mut t = PathTable::default();
        t.insert(CTX, "/foo", p(1, 10));
        t.insert(CTX, "/foo", p(2, 0));
        t.insert(CTX, "/foo", p(3, 5));
        let rem = t.remove(CTX, "/foo", p(1, 10)).unwrap();
        assert!(rem.was_head);
        assert_eq!(rem.new_head, Some(p(3, 5)));
        let order: Vec<u64> = t.candidates(CTX, "/foo").map(|c| c.id.0).collect();
        assert_eq!(order, vec![3, 2]);
    }

    #[test]
    fn removing_last_discards_entry() {
        let mut t = PathTable::default();
        t.insert(CTX, "/foo", p(1, 0));
        let rem = t.remove(CTX, "/foo", p(1, 0)).unwrap();
        assert!(rem.was_head);
        assert_eq!(rem.new_head, None);
        assert_eq!(t.len(), 0);
        assert_eq!(t.head(CTX, "/foo"), None);
    }

    #[test]
    fn removing_unknown_is_none() {
        let mut t = PathTable::default();
        assert_eq!(t.remove(CTX, "/foo", p(1, 0)), None);
        t.insert(CTX, "/foo", p(1, 0));
        assert_eq!(t.remove(CTX, "/foo", p(2, 0)), None);
        assert_eq!(t.head(CTX, "/foo"), Some(p(1, 0)));
    }

    #[test]
    fn contexts_are_isolated() {
        let mut t = PathTable::default();
        t.insert(ContextId(1), "/foo", p(1, 0));
        let ins = t.insert(ContextId(2), "/foo", p(2, 0));
        assert!(ins.is_head);
        assert_eq!(t.len(), 2);
    }
}
