use std::collections::hash_map::Entry;
use std::collections::{HashMap, VecDeque};

use super::{duplicate_id, sweep_tombstones, Admission, ProcessStorage, Rejection};
use crate::models::{Process, ProcessId, ProcessPriority};

/// Map-backed storage: O(1) insert and remove, O(n) scans for everything else.
///
/// Add and kill are the hot paths, so they get the hash map. Admission order
/// lives in `order`, a queue of ids that may still hold removed ones; listing
/// walks it and skips those. When a capacity is set and reached, new
/// processes are rejected.
#[derive(Debug, Default)]
pub struct HashProcessStorage {
    entries: HashMap<ProcessId, Process>,
    order: VecDeque<ProcessId>,
    capacity: Option<usize>,
}

impl HashProcessStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity_limit(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity),
            ..Self::default()
        }
    }
}

impl ProcessStorage for HashProcessStorage {
    fn insert(&mut self, process: Process) -> Result<Admission, Rejection> {
        if let Some(capacity) = self.capacity {
            if self.entries.len() >= capacity {
                tracing::warn!("Process storage capacity {} reached", capacity);
                return Err(Rejection::Full { capacity });
            }
        }

        let id = process.id();
        match self.entries.entry(id) {
            Entry::Occupied(e) => duplicate_id(e.key()),
            Entry::Vacant(e) => {
                tracing::debug!("{} stored", process);
                e.insert(process);
            }
        }
        self.order.push_back(id);
        Ok(Admission::Stored)
    }

    fn remove(&mut self, id: &ProcessId) -> bool {
        let removed = self.entries.remove(id).is_some();
        if removed {
            sweep_tombstones(&mut self.order, &self.entries);
        }
        removed
    }

    fn remove_priority(&mut self, priority: ProcessPriority) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, p| p.priority() != priority);
        let removed = before - self.entries.len();
        if removed > 0 {
            sweep_tombstones(&mut self.order, &self.entries);
        }
        removed
    }

    fn clear(&mut self) -> usize {
        let removed = self.entries.len();
        self.entries = HashMap::new();
        self.order = VecDeque::new();
        removed
    }

    fn processes(&self) -> Vec<Process> {
        self.order
            .iter()
            .filter_map(|id| self.entries.get(id))
            .cloned()
            .collect()
    }

    fn get(&self, id: &ProcessId) -> Option<&Process> {
        self.entries.get(id)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn capacity(&self) -> Option<usize> {
        self.capacity
    }
}
