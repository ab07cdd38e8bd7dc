//! The task manager: public façade over a [`ProcessStorage`].
//!
//! A [`TaskManager`] is a cheap handle around shared state. Cloning it gives
//! another handle to the same registry. Every storage operation runs under a
//! single lock, so add/kill/list calls from several threads are serialized
//! and each removal is observed exactly once.
//!
//! Descriptors returned by [`TaskManager::add`] hold only a `Weak` reference
//! to that state. They never keep the manager alive.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::TaskManagerError;
use crate::models::{IdGenerator, Process, ProcessId, ProcessPriority, TimeOrderedIds};
use crate::storage::{sort_processes, HashProcessStorage, ProcessStorage, SortCriteria, SortOrder};

pub(crate) struct Shared {
    storage: Mutex<Box<dyn ProcessStorage>>,
    ids: Box<dyn IdGenerator>,
}

#[derive(Clone)]
pub struct TaskManager {
    shared: Arc<Shared>,
}

impl TaskManager {
    /// Manager over `storage`, with time-ordered ids.
    pub fn new(storage: impl ProcessStorage + 'static) -> Self {
        Self::with_id_generator(storage, TimeOrderedIds)
    }

    pub fn with_id_generator(
        storage: impl ProcessStorage + 'static,
        ids: impl IdGenerator + 'static,
    ) -> Self {
        tracing::debug!("TaskManager instance was created");
        Self {
            shared: Arc::new(Shared {
                storage: Mutex::new(Box::new(storage)),
                ids: Box::new(ids),
            }),
        }
    }

    pub(crate) fn from_shared(shared: Arc<Shared>) -> Self {
        Self { shared }
    }

    fn storage(&self) -> MutexGuard<'_, Box<dyn ProcessStorage>> {
        self.shared.storage.lock().expect("process storage lock poisoned")
    }

    /// Register a new process and return its descriptor.
    ///
    /// Fails with [`TaskManagerError::EmptyCommand`] for a blank command.
    /// With a capacity-limited storage the storage's policy may also refuse
    /// the process ([`TaskManagerError::CapacityReached`] or
    /// [`TaskManagerError::Outranked`]) or evict another one to make room.
    pub fn add(
        &self,
        command: impl Into<String>,
        priority: ProcessPriority,
    ) -> Result<Process, TaskManagerError> {
        let command = command.into();
        if command.trim().is_empty() {
            tracing::warn!("Rejected process with empty command");
            return Err(TaskManagerError::EmptyCommand);
        }

        let id = self.shared.ids.generate();
        let process = Process::new(id, command, priority, Arc::downgrade(&self.shared));

        match self.storage().insert(process.clone()) {
            Ok(admission) => {
                if let Some(evicted) = admission.evicted() {
                    tracing::warn!("{} was evicted to admit {}", evicted, process);
                }
            }
            Err(rejection) => {
                let err = TaskManagerError::from(rejection);
                tracing::error!(
                    error = err.as_label(),
                    "Failed to add {} to TaskManager: {}",
                    process,
                    err
                );
                return Err(err);
            }
        }

        tracing::info!("{} was added to TaskManager", process);
        Ok(process)
    }

    /// Terminate one process. Returns `false` if it is not registered.
    pub fn kill(&self, id: &ProcessId) -> bool {
        let removed = self.storage().remove(id);
        if removed {
            tracing::info!("Process {} was killed", id);
        } else {
            tracing::debug!("Process {} is not registered, nothing to kill", id);
        }
        removed
    }

    /// Terminate every process of `priority`, returning how many were removed.
    pub fn kill_group(&self, priority: ProcessPriority) -> usize {
        let removed = self.storage().remove_priority(priority);
        tracing::info!("Killed {} processes with {} priority", removed, priority);
        removed
    }

    /// Terminate everything, returning how many processes were removed.
    pub fn kill_all(&self) -> usize {
        let removed = self.storage().clear();
        tracing::info!("Killed all {} processes", removed);
        removed
    }

    /// Live processes in the order the storage enumerates them.
    pub fn list(&self) -> Vec<Process> {
        self.storage().processes()
    }

    pub fn list_sorted(&self, criteria: SortCriteria, order: SortOrder) -> Vec<Process> {
        let mut processes = self.list();
        sort_processes(&mut processes, criteria, order);
        processes
    }

    pub fn get(&self, id: &ProcessId) -> Option<Process> {
        self.storage().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.storage().len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage().is_empty()
    }

    pub fn capacity(&self) -> Option<usize> {
        self.storage().capacity()
    }
}

impl Default for TaskManager {
    fn default() -> Self {
        Self::new(HashProcessStorage::new())
    }
}

impl fmt::Debug for TaskManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskManager")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .finish_non_exhaustive()
    }
}
