//! Domain models for the task manager.
//!
//! # Core Concepts
//!
//! - [`ProcessId`]: Opaque, unique identifier assigned at admission.
//! - [`IdGenerator`]: Source of ids. [`TimeOrderedIds`] is the default,
//!   [`SequentialIds`] gives deterministic ids for tests.
//! - [`Process`]: Descriptor handed back to the caller of
//!   [`TaskManager::add`](crate::manager::TaskManager::add). It carries a
//!   non-owning handle to its manager so it can request its own termination.
//! - [`ProcessPriority`]: Grouping category used by bulk termination and by
//!   the priority-based storage.

mod pid;
mod process;

pub use pid::*;
pub use process::*;
