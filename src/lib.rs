//! In-memory registry of simulated processes.
//!
//! [`TaskManager`] admits processes into a pluggable [`ProcessStorage`] and
//! hands back [`Process`] descriptors that can later terminate themselves.
//! Processes can also be terminated one at a time, by priority group, or all
//! at once.
//!
//! ```
//! use taskman::{HashProcessStorage, ProcessPriority, TaskManager};
//!
//! let manager = TaskManager::new(HashProcessStorage::new());
//! let build = manager.add("build", ProcessPriority::High).unwrap();
//! manager.add("test", ProcessPriority::Low).unwrap();
//!
//! assert_eq!(manager.kill_group(ProcessPriority::High), 1);
//! assert!(!build.kill());
//! assert_eq!(manager.len(), 1);
//! ```

pub mod config;
pub mod error;
pub mod manager;
pub mod models;
pub mod render;
pub mod storage;

pub use config::{StorageKind, TaskmanConfig};
pub use error::TaskManagerError;
pub use manager::TaskManager;
pub use models::{IdGenerator, Process, ProcessId, ProcessPriority, SequentialIds, TimeOrderedIds};
pub use storage::{
    Admission, FifoProcessStorage, HashProcessStorage, PriorityProcessStorage, ProcessStorage,
    Rejection, SortCriteria, SortOrder,
};
