//! Status model: per registration, the outcome on each claimed path.
//!
//! Status codes follow the diagnostics taxonomy shared with the reporting
//! subsystem. Only [`StatusCode::Active`], [`FailureReason::ShadowedByOtherService`]
//! and [`FailureReason::ExceptionOnInit`] are produced by the registry; the
//! remaining reasons pass through unchanged.

use super::registration::{ContextId, Registration, RegistrationId};
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Raw value of the "active" sentinel.
pub const ACTIVE_CODE: i32 = -1;

/// Why a registration is not serving a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureReason {
    Unknown,
    NoContextMatching,
    ContextFailure,
    /// A higher-priority binding holds the path.
    ShadowedByOtherService,
    /// The handler's setup failed when it won the path.
    ExceptionOnInit,
    ServiceNotGettable,
    ValidationFailed,
    ServiceInUse,
    /// Any other value of the shared taxonomy.
    Other(i32),
}

impl FailureReason {
    pub fn code(self) -> i32 {
        match self {
            Self::Unknown => 0,
            Self::NoContextMatching => 1,
            Self::ContextFailure => 2,
            Self::ShadowedByOtherService => 3,
            Self::ExceptionOnInit => 4,
            Self::ServiceNotGettable => 5,
            Self::ValidationFailed => 6,
            Self::ServiceInUse => 7,
            Self::Other(code) => code,
        }
    }

    pub fn from_code(code: i32) -> Self {
        match code {
            0 => Self::Unknown,
            1 => Self::NoContextMatching,
            2 => Self::ContextFailure,
            3 => Self::ShadowedByOtherService,
            4 => Self::ExceptionOnInit,
            5 => Self::ServiceNotGettable,
            6 => Self::ValidationFailed,
            7 => Self::ServiceInUse,
            other => Self::Other(other),
        }
    }
}

/// Status of one registration on one path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    Active,
    Failed(FailureReason),
}

impl StatusCode {
    pub const SHADOWED: StatusCode = StatusCode::Failed(FailureReason::ShadowedByOtherService);
    pub const ACTIVATION_FAILED: StatusCode = StatusCode::Failed(FailureReason::ExceptionOnInit);

    /// Raw integer as reported to diagnostics consumers.
    pub fn code(self) -> i32 {
        match self {
            Self::Active => ACTIVE_CODE,
            Self::Failed(reason) => reason.code(),
        }
    }

    pub fn from_code(code: i32) -> Self {
        if code == ACTIVE_CODE {
            Self::Active
        } else {
            Self::Failed(FailureReason::from_code(code))
        }
    }

    #[inline]
    pub fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }
}

impl Serialize for StatusCode {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        serializer.serialize_i32(self.code())
    }
}

/// Path-to-status map of one registration, as exposed in snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistrationStatus {
    pub registration: Arc<Registration>,
    pub context: ContextId,
    pub path_to_status: BTreeMap<String, StatusCode>,
}

impl RegistrationStatus {
    pub fn status(&self, path: &str) -> Option<StatusCode> {
        self.path_to_status.get(path).copied()
    }
}

/// Immutable copy of the status model taken under the registry lock.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StatusSnapshot {
    entries: BTreeMap<RegistrationId, RegistrationStatus>,
}

impl StatusSnapshot {
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: RegistrationId) -> Option<&RegistrationStatus> {
        self.entries.get(&id)
    }

    /// Status of `id` on `path`, if both are known.
    pub fn status(&self, id: RegistrationId, path: &str) -> Option<StatusCode> {
        self.entries.get(&id).and_then(|s| s.status(path))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RegistrationId, &RegistrationStatus)> {
        self.entries.iter()
    }
}

/// One candidate in a per-path report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Candidate {
    pub id: RegistrationId,
    pub ranking: i32,
    pub status: StatusCode,
}

/// Candidates for one `(context, path)`, head first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathReport {
    pub context: ContextId,
    pub path: String,
    pub candidates: Vec<Candidate>,
}

impl PathReport {
    /// The candidate currently serving the path.
    pub fn active(&self) -> Option<RegistrationId> {
        self.candidates
            .iter()
            .find(|c| c.status.is_active())
            .map(|c| c.id)
    }
}

/// Live status bookkeeping owned by the registry.
#[derive(Debug, Default)]
pub(crate) struct StatusModel {
    entries: HashMap<RegistrationId, RegistrationStatus>,
}

impl StatusModel {
    /// Record `code` for `registration` on `path`, creating the entry if needed.
    pub(crate) fn set(
        &mut self,
        registration: &Arc<Registration>,
        context: ContextId,
        path: &str,
        code: StatusCode,
    ) {
        let entry = self
            .entries
            .entry(registration.id())
            .or_insert_with(|| RegistrationStatus {
                registration: Arc::clone(registration),
                context,
                path_to_status: BTreeMap::new(),
            });
        entry.path_to_status.insert(path.to_owned(), code);
    }

    pub(crate) fn get(&self, id: RegistrationId, path: &str) -> Option<StatusCode> {
        self.entries.get(&id).and_then(|s| s.status(path))
    }

    /// Drop a registration entirely; it never lingers with an empty map.
    pub(crate) fn drop_registration(&mut self, id: RegistrationId) {
        self.entries.remove(&id);
    }

    /// Number of `(registration, path)` pairs currently active.
    pub(crate) fn active_count(&self) -> usize {
        self.entries
            .values()
            .flat_map(|s| s.path_to_status.values())
            .filter(|code| code.is_active())
            .count()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    pub(crate) fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            entries: self
                .entries
                .iter()
                .map(|(id, status)| (*id, status.clone()))
                .collect(),
        }
    }
}
