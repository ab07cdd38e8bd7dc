use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier of a registered process.
///
/// Wraps a [`Uuid`] so the representation can change without touching
/// callers. There is no setter: an id is fixed once generated and never
/// reused while the manager lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProcessId(Uuid);

impl ProcessId {
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for ProcessId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Source of process identifiers.
///
/// Every call must return an id distinct from all ids previously returned by
/// the same generator. A generator never fails.
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> ProcessId;
}

/// UUIDv7 ids: millisecond timestamp prefix plus random bits.
///
/// The timestamp makes ids sortable by creation time, which helps when
/// correlating log lines.
#[derive(Debug, Default, Clone, Copy)]
pub struct TimeOrderedIds;

impl IdGenerator for TimeOrderedIds {
    fn generate(&self) -> ProcessId {
        ProcessId(Uuid::now_v7())
    }
}

/// Monotonic counter ids under a fixed partition key.
///
/// The partition fills the high 64 bits, the counter the low 64 bits.
/// Deterministic, so tests can predict the ids they will get.
#[derive(Debug, Default)]
pub struct SequentialIds {
    partition: u64,
    next: AtomicU64,
}

impl SequentialIds {
    pub fn new(partition: u64) -> Self {
        Self {
            partition,
            next: AtomicU64::new(1),
        }
    }
}

impl IdGenerator for SequentialIds {
    fn generate(&self) -> ProcessId {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        ProcessId(Uuid::from_u64_pair(self.partition, n))
    }
}
