//! Errors surfaced to callers of [`TaskManager`](crate::manager::TaskManager).
//!
//! Only admission can fail. Every kill operation is total: a missing id or an
//! empty priority group is reported through the return value, not an error.

use thiserror::Error;

use crate::models::ProcessPriority;
use crate::storage::Rejection;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TaskManagerError {
    #[error("Validation error: command must not be empty")]
    EmptyCommand,

    #[error("Validation error: unknown priority '{0}' (expected low, medium or high)")]
    UnknownPriority(String),

    #[error("Validation error: unknown storage '{0}' (expected hash, fifo or priority)")]
    UnknownStorage(String),

    #[error("Storage capacity {capacity} reached")]
    CapacityReached { capacity: usize },

    #[error("Priority {priority} does not outrank lowest stored priority {lowest}")]
    Outranked {
        priority: ProcessPriority,
        lowest: ProcessPriority,
    },
}

impl TaskManagerError {
    /// Short snake_case label for log fields.
    pub fn as_label(&self) -> &'static str {
        match self {
            Self::EmptyCommand => "empty_command",
            Self::UnknownPriority(_) => "unknown_priority",
            Self::UnknownStorage(_) => "unknown_storage",
            Self::CapacityReached { .. } => "capacity_reached",
            Self::Outranked { .. } => "outranked",
        }
    }

    /// True for errors the caller can fix by correcting its input.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::EmptyCommand | Self::UnknownPriority(_) | Self::UnknownStorage(_)
        )
    }
}

impl From<Rejection> for TaskManagerError {
    fn from(rejection: Rejection) -> Self {
        match rejection {
            Rejection::Full { capacity } => Self::CapacityReached { capacity },
            Rejection::Outranked { priority, lowest } => Self::Outranked { priority, lowest },
        }
    }
}
