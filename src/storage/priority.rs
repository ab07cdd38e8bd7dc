use std::collections::HashMap;

use super::{duplicate_id, in_admission_order, Admission, ProcessStorage, Rejection, Slot};
use crate::models::{Process, ProcessId, ProcessPriority};

/// Storage partitioned by priority.
///
/// Each priority class has its own map, and `index` records which partition
/// holds a given id. Killing a whole priority group swaps out one partition
/// without touching the others, at the cost of a merge-and-sort on listing.
///
/// When full, a newcomer is admitted only if its priority is strictly higher
/// than the lowest stored priority. The oldest process of that lowest
/// priority is then evicted.
#[derive(Debug, Default)]
pub struct PriorityProcessStorage {
    partitions: [HashMap<ProcessId, Slot>; 3],
    index: HashMap<ProcessId, ProcessPriority>,
    next_seq: u64,
    capacity: Option<usize>,
}

impl PriorityProcessStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity_limit(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity),
            ..Self::default()
        }
    }

    fn partition(&self, priority: ProcessPriority) -> &HashMap<ProcessId, Slot> {
        &self.partitions[priority.index()]
    }

    fn partition_mut(&mut self, priority: ProcessPriority) -> &mut HashMap<ProcessId, Slot> {
        &mut self.partitions[priority.index()]
    }

    fn lowest_priority(&self) -> Option<ProcessPriority> {
        ProcessPriority::ALL
            .into_iter()
            .find(|p| !self.partition(*p).is_empty())
    }

    fn evict_oldest_of(&mut self, priority: ProcessPriority) -> Option<Process> {
        let oldest = self
            .partition(priority)
            .values()
            .min_by_key(|slot| slot.seq)
            .map(|slot| slot.process.id())?;
        self.index.remove(&oldest);
        self.partition_mut(priority).remove(&oldest).map(|slot| slot.process)
    }

    /// Decide whether a full storage can take `incoming`, evicting if so.
    fn make_room(
        &mut self,
        capacity: usize,
        incoming: ProcessPriority,
    ) -> Result<Process, Rejection> {
        let Some(lowest) = self.lowest_priority() else {
            return Err(Rejection::Full { capacity });
        };
        if incoming <= lowest {
            tracing::warn!(
                "Priority {} can not be admitted, lowest stored priority is {}",
                incoming,
                lowest
            );
            return Err(Rejection::Outranked {
                priority: incoming,
                lowest,
            });
        }
        self.evict_oldest_of(lowest).ok_or(Rejection::Full { capacity })
    }
}

impl ProcessStorage for PriorityProcessStorage {
    fn insert(&mut self, process: Process) -> Result<Admission, Rejection> {
        let id = process.id();
        if self.index.contains_key(&id) {
            duplicate_id(&id);
        }

        let mut evicted = None;
        if let Some(capacity) = self.capacity {
            if self.index.len() >= capacity {
                evicted = Some(self.make_room(capacity, process.priority())?);
            }
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        let priority = process.priority();
        tracing::debug!("{} stored in {} partition", process, priority);
        self.index.insert(id, priority);
        self.partition_mut(priority).insert(id, Slot { seq, process });

        Ok(match evicted {
            Some(lowest) => Admission::EvictedLowest(lowest),
            None => Admission::Stored,
        })
    }

    fn remove(&mut self, id: &ProcessId) -> bool {
        match self.index.remove(id) {
            Some(priority) => self.partition_mut(priority).remove(id).is_some(),
            None => false,
        }
    }

    fn remove_priority(&mut self, priority: ProcessPriority) -> usize {
        let dropped = std::mem::take(self.partition_mut(priority));
        for id in dropped.keys() {
            self.index.remove(id);
        }
        dropped.len()
    }

    fn clear(&mut self) -> usize {
        let removed = self.index.len();
        self.partitions = Default::default();
        self.index = HashMap::new();
        removed
    }

    fn processes(&self) -> Vec<Process> {
        in_admission_order(self.partitions.iter().flat_map(|p| p.values()))
    }

    fn get(&self, id: &ProcessId) -> Option<&Process> {
        let priority = self.index.get(id)?;
        self.partition(*priority).get(id).map(|slot| &slot.process)
    }

    fn len(&self) -> usize {
        self.index.len()
    }

    fn capacity(&self) -> Option<usize> {
        self.capacity
    }
}
