use std::collections::{HashMap, VecDeque};

use super::{duplicate_id, sweep_tombstones, Admission, ProcessStorage, Rejection};
use crate::models::{Process, ProcessId, ProcessPriority};

/// Queue-ordered storage that makes room by evicting the oldest process.
///
/// `order` records admission order and may hold ids that were already
/// removed from `entries`. Those tombstones are skipped on every walk and
/// swept once they outnumber the live entries, which keeps `remove` O(1)
/// amortized while listing stays a plain O(n) walk with no sorting.
#[derive(Debug, Default)]
pub struct FifoProcessStorage {
    entries: HashMap<ProcessId, Process>,
    order: VecDeque<ProcessId>,
    capacity: Option<usize>,
}

impl FifoProcessStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity_limit(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity),
            ..Self::default()
        }
    }

    fn evict_oldest(&mut self) -> Option<Process> {
        while let Some(id) = self.order.pop_front() {
            if let Some(process) = self.entries.remove(&id) {
                return Some(process);
            }
        }
        None
    }
}

impl ProcessStorage for FifoProcessStorage {
    fn insert(&mut self, process: Process) -> Result<Admission, Rejection> {
        let id = process.id();
        if self.entries.contains_key(&id) {
            duplicate_id(&id);
        }

        let mut evicted = None;
        if let Some(capacity) = self.capacity {
            if self.entries.len() >= capacity {
                match self.evict_oldest() {
                    Some(oldest) => {
                        tracing::debug!("Found oldest process {} in FIFO storage", oldest);
                        evicted = Some(oldest);
                    }
                    None => return Err(Rejection::Full { capacity }),
                }
            }
        }

        tracing::debug!("{} stored", process);
        self.entries.insert(id, process);
        self.order.push_back(id);

        Ok(match evicted {
            Some(oldest) => Admission::EvictedOldest(oldest),
            None => Admission::Stored,
        })
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
