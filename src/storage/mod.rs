//! Pluggable process storage.
//!
//! [`ProcessStorage`] is the capability set the manager relies on: insert,
//! point removal, removal of a whole priority group, clear, and enumeration.
//! No single structure makes all of them O(1), so each variant picks its
//! trade-off:
//!
//! | Variant | insert | remove | remove_priority | processes |
//! |---|---|---|---|---|
//! | [`HashProcessStorage`] | O(1) | O(1) amortized | O(n) | O(n) |
//! | [`FifoProcessStorage`] | O(1) | O(1) amortized | O(n) | O(n) |
//! | [`PriorityProcessStorage`] | O(1) | O(1) | O(group) | O(n log n) |
//!
//! All variants accept an optional capacity. What happens when it is reached
//! is the main behavioral difference between them:
//!
//! - `HashProcessStorage` rejects the newcomer.
//! - `FifoProcessStorage` evicts the oldest process.
//! - `PriorityProcessStorage` evicts the oldest process of the lowest stored
//!   priority, but only if the newcomer outranks it.

mod fifo;
mod hash;
mod priority;

use std::collections::{HashMap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::models::{Process, ProcessId, ProcessPriority};

pub use fifo::FifoProcessStorage;
pub use hash::HashProcessStorage;
pub use priority::PriorityProcessStorage;

/// Container holding the live processes, keyed by id.
///
/// Implementations must keep every key equal to its process id and must
/// never hold two entries with the same id. Inserting an id that is already
/// present is a defect in the caller and panics.
pub trait ProcessStorage: Send {
    /// Store a new process, possibly evicting another one to make room.
    fn insert(&mut self, process: Process) -> Result<Admission, Rejection>;

    /// Remove one process. Returns `false` if the id is not stored.
    fn remove(&mut self, id: &ProcessId) -> bool;

    /// Remove every process of `priority`, returning how many were removed.
    fn remove_priority(&mut self, priority: ProcessPriority) -> usize;

    /// Remove everything, returning how many processes were removed.
    fn clear(&mut self) -> usize;

    /// All live processes in admission order.
    fn processes(&self) -> Vec<Process>;

    fn get(&self, id: &ProcessId) -> Option<&Process>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of stored processes, `None` when unbounded.
    fn capacity(&self) -> Option<usize>;
}

/// Successful insert.
#[derive(Debug, Clone)]
pub enum Admission {
    Stored,
    /// Storage was full; the oldest process was dropped.
    EvictedOldest(Process),
    /// Storage was full; the oldest process of the lowest priority was dropped.
    EvictedLowest(Process),
}

impl Admission {
    pub fn evicted(&self) -> Option<&Process> {
        match self {
            Self::Stored => None,
            Self::EvictedOldest(p) | Self::EvictedLowest(p) => Some(p),
        }
    }
}

/// Insert refused by the storage's capacity policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Full {
        capacity: usize,
    },
    Outranked {
        priority: ProcessPriority,
        lowest: ProcessPriority,
    },
}

/// Key used to order a process listing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortCriteria {
    #[default]
    Time,
    Priority,
    Id,
}

impl SortCriteria {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Time => "time",
            Self::Priority => "priority",
            Self::Id => "id",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "time" => Some(Self::Time),
            "priority" => Some(Self::Priority),
            "id" => Some(Self::Id),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }
}

/// Stable in-place sort. Processes that compare equal keep their relative
/// order for both directions.
///
/// `Time` follows [`Process::sequence`], so it is strict creation order even
/// when wall-clock timestamps tie or the clock steps backwards.
pub fn sort_processes(processes: &mut [Process], criteria: SortCriteria, order: SortOrder) {
    processes.sort_by(|a, b| {
        let ord = match criteria {
            SortCriteria::Time => a.sequence().cmp(&b.sequence()),
            SortCriteria::Priority => a.priority().cmp(&b.priority()),
            SortCriteria::Id => a.id().cmp(&b.id()),
        };
        match order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    });
}

/// Panic on a duplicate id. Ids come from a generator that never repeats, so
/// reaching this means the registry state is already corrupt.
pub(crate) fn duplicate_id(id: &ProcessId) -> ! {
    panic!("process id {id} is already stored")
}

/// Drop ids of removed processes from an admission-order queue once they
/// outnumber the live entries, keeping `remove` O(1) amortized.
pub(crate) fn sweep_tombstones<V>(
    order: &mut VecDeque<ProcessId>,
    entries: &HashMap<ProcessId, V>,
) {
    if order.len() <= 2 * entries.len() + 16 {
        return;
    }
    order.retain(|id| entries.contains_key(id));
}

/// Stored process tagged with its admission sequence number.
#[derive(Debug, Clone)]
pub(crate) struct Slot {
    pub(crate) seq: u64,
    pub(crate) process: Process,
}

pub(crate) fn in_admission_order<'a>(slots: impl Iterator<Item = &'a Slot>) -> Vec<Process> {
    let mut slots: Vec<&Slot> = slots.collect();
    slots.sort_unstable_by_key(|slot| slot.seq);
    slots.into_iter().map(|slot| slot.process.clone()).collect()
}
