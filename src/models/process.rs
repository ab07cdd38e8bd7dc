use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Weak;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::pid::ProcessId;
use crate::error::TaskManagerError;
use crate::manager::{Shared, TaskManager};

static NEXT_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Descriptor of one submitted unit of work.
///
/// Returned by [`TaskManager::add`]. The fields are fixed at admission. The
/// descriptor may outlive its registry entry (or the manager itself); in
/// that case [`Process::kill`] quietly reports `false`.
#[derive(Debug, Clone, Serialize)]
pub struct Process {
    id: ProcessId,
    command: String,
    priority: ProcessPriority,
    created_at: DateTime<Utc>,
    /// Process-wide creation counter. Unlike `created_at` it never ties and
    /// never goes backwards.
    #[serde(skip)]
    sequence: u64,
    /// Non-owning handle used only to forward kill requests.
    #[serde(skip)]
    manager: Weak<Shared>,
}

impl Process {
    pub(crate) fn new(
        id: ProcessId,
        command: String,
        priority: ProcessPriority,
        manager: Weak<Shared>,
    ) -> Self {
        Self {
            id,
            command,
            priority,
            created_at: Utc::now(),
            sequence: NEXT_SEQUENCE.fetch_add(1, Ordering::Relaxed),
            manager,
        }
    }

    /// Build a descriptor that is not bound to any manager.
    ///
    /// Only meant for driving a [`ProcessStorage`](crate::storage::ProcessStorage)
    /// directly, as storage tests do. Descriptors for managed processes come
    /// from [`TaskManager::add`]. `kill` on a detached descriptor always
    /// returns `false`, even if an equal id is live in some manager.
    #[doc(hidden)]
    pub fn detached(id: ProcessId, command: impl Into<String>, priority: ProcessPriority) -> Self {
        Self::new(id, command.into(), priority, Weak::new())
    }

    pub fn id(&self) -> ProcessId {
        self.id
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn priority(&self) -> ProcessPriority {
        self.priority
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Position in creation order across the whole program.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Ask the owning manager to terminate this process.
    ///
    /// Same effect as `manager.kill(&process.id())`. Returns `false` when the
    /// process was already removed or the manager is gone; never an error.
    pub fn kill(&self) -> bool {
        match self.manager.upgrade() {
            Some(shared) => TaskManager::from_shared(shared).kill(&self.id),
            None => false,
        }
    }
}

impl PartialEq for Process {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Process {}

impl fmt::Display for Process {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<Process {} ({}) cmd=({}) created={}>",
            self.id,
            self.priority.as_str().to_uppercase(),
            self.command,
            self.created_at.to_rfc3339()
        )
    }
}

/// Priority class of a process.
///
/// Ordered `Low < Medium < High`. Used to group processes for bulk kills and
/// to pick eviction victims in the priority-based storage.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ProcessPriority {
    Low,
    Medium,
    High,
}

impl ProcessPriority {
    pub const ALL: [ProcessPriority; 3] = [Self::Low, Self::Medium, Self::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }

    /// Case-insensitive parse for input coming from outside the crate.
    pub fn parse(s: &str) -> Result<Self, TaskManagerError> {
        Self::from_str(&s.trim().to_ascii_lowercase())
            .ok_or_else(|| TaskManagerError::UnknownPriority(s.to_string()))
    }

    /// Dense index, `Low` = 0.
    pub(crate) fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for ProcessPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
