//! Domain types for task dependency tracking.
//!
//! This module contains the core domain types: task snapshots, dependency
//! edges between tasks, and the relationship semantics that gate status
//! transitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum task title length
pub const MAX_TITLE_LENGTH: usize = 200;

/// Maximum absolute lag, in hours (ten years).
///
/// Keeps `due_date + lag` well inside chrono's representable range.
pub const MAX_LAG_HOURS: i32 = 87_600;

/// Opaque key-value payload attached to a dependency.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Create a new identifier
            pub fn new(id: u64) -> Self {
                Self(id)
            }

            /// Get the raw numeric value
            pub fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse().map(Self)
            }
        }
    };
}

numeric_id!(
    /// Unique identifier for a task
    TaskId
);

numeric_id!(
    /// Unique identifier for a dependency edge.
    ///
    /// Assigned monotonically, so ordering by id is ordering by insertion.
    DependencyId
);

numeric_id!(
    /// Identifier of the project a task belongs to
    ProjectId
);

/// Status of a task, as reported by the owning task system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not started
    Todo,

    /// Being worked on
    InProgress,

    /// Work finished, awaiting review
    Review,

    /// Completed
    Done,

    /// Abandoned
    Cancelled,
}

impl TaskStatus {
    /// Every status, in workflow order.
    pub const ALL: [TaskStatus; 5] = [
        TaskStatus::Todo,
        TaskStatus::InProgress,
        TaskStatus::Review,
        TaskStatus::Done,
        TaskStatus::Cancelled,
    ];

    /// Whether work on the task has begun (in progress, in review, or done).
    pub fn is_started(self) -> bool {
        matches!(
            self,
            TaskStatus::InProgress | TaskStatus::Review | TaskStatus::Done
        )
    }

    /// Whether the task is finished.
    pub fn is_finished(self) -> bool {
        self == TaskStatus::Done
    }

    /// Whether a predecessor in this status releases SS and SF successors.
    ///
    /// Narrower than [`is_started`](Self::is_started): a task in review does not count.
    pub fn releases_start_gate(self) -> bool {
        matches!(self, TaskStatus::InProgress | TaskStatus::Done)
    }

    /// The wire name of the status.
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Review => "review",
            TaskStatus::Done => "done",
            TaskStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "todo" => Ok(TaskStatus::Todo),
            "in_progress" | "in-progress" => Ok(TaskStatus::InProgress),
            "review" => Ok(TaskStatus::Review),
            "done" | "completed" => Ok(TaskStatus::Done),
            "cancelled" | "canceled" => Ok(TaskStatus::Cancelled),
            other => Err(format!(
                "unknown task status '{other}' (expected todo, in_progress, review, done, cancelled)"
            )),
        }
    }
}

/// Snapshot of a task owned by the surrounding task system.
///
/// The dependency subsystem only reads identity, status, project and dates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Task identifier
    pub id: TaskId,

    /// Task title
    pub title: String,

    /// Current status
    pub status: TaskStatus,

    /// Owning project (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<ProjectId>,

    /// Planned start
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,

    /// Planned due date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,

    /// Last time the snapshot changed
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Create a task snapshot with no project or dates.
    pub fn new(id: impl Into<TaskId>, title: impl Into<String>, status: TaskStatus) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            status,
            project_id: None,
            start_date: None,
            due_date: None,
            updated_at: Utc::now(),
        }
    }

    /// Validate the snapshot.
    ///
    /// # Errors
    ///
    /// Returns a message if the title is empty or too long.
    pub fn validate(&self) -> Result<(), String> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err("Title cannot be empty".to_string());
        }
        if title.chars().count() > MAX_TITLE_LENGTH {
            return Err(format!(
                "Title cannot exceed {MAX_TITLE_LENGTH} characters"
            ));
        }
        Ok(())
    }
}

/// Relationship type of a dependency edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DependencyType {
    /// Finish-to-start: successor starts after predecessor finishes
    #[default]
    #[serde(rename = "FS")]
    FinishToStart,

    /// Start-to-start: successor starts after predecessor starts
    #[serde(rename = "SS")]
    StartToStart,

    /// Finish-to-finish: successor finishes after predecessor finishes
    #[serde(rename = "FF")]
    FinishToFinish,

    /// Start-to-finish: successor finishes after predecessor starts
    #[serde(rename = "SF")]
    StartToFinish,
}

impl DependencyType {
    /// Short code (`FS`, `SS`, `FF`, `SF`).
    pub fn code(self) -> &'static str {
        match self {
            DependencyType::FinishToStart => "FS",
            DependencyType::StartToStart => "SS",
            DependencyType::FinishToFinish => "FF",
            DependencyType::StartToFinish => "SF",
        }
    }

    /// Human-readable name.
    pub fn description(self) -> &'static str {
        match self {
            DependencyType::FinishToStart => "Finish-to-Start",
            DependencyType::StartToStart => "Start-to-Start",
            DependencyType::FinishToFinish => "Finish-to-Finish",
            DependencyType::StartToFinish => "Start-to-Finish",
        }
    }

    /// Whether the successor may hold `successor` status given the predecessor's status.
    ///
    /// | Type | Rule |
    /// |------|------|
    /// | FS | successor not started, or predecessor done |
    /// | SS | successor not started, or predecessor in progress or done |
    /// | FF | predecessor done, or successor not done |
    /// | SF | predecessor in progress or done, or successor not done |
    pub fn can_proceed(self, predecessor: TaskStatus, successor: TaskStatus) -> bool {
        match self {
            DependencyType::FinishToStart => !successor.is_started() || predecessor.is_finished(),
            DependencyType::StartToStart => {
                !successor.is_started() || predecessor.releases_start_gate()
            }
            DependencyType::FinishToFinish => {
                predecessor.is_finished() || !successor.is_finished()
            }
            DependencyType::StartToFinish => {
                predecessor.releases_start_gate() || !successor.is_finished()
            }
        }
    }

    /// The predecessor state this type waits for, as shown in violations.
    pub fn required_predecessor_state(self) -> &'static str {
        match self {
            DependencyType::FinishToStart | DependencyType::FinishToFinish => "done",
            DependencyType::StartToStart | DependencyType::StartToFinish => "in progress or done",
        }
    }

    /// The successor transition this type gates ("start" or "finish").
    pub fn gated_successor_transition(self) -> &'static str {
        match self {
            DependencyType::FinishToStart | DependencyType::StartToStart => "start",
            DependencyType::FinishToFinish | DependencyType::StartToFinish => "finish",
        }
    }
}

impl fmt::Display for DependencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for DependencyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "FS" => Ok(DependencyType::FinishToStart),
            "SS" => Ok(DependencyType::StartToStart),
            "FF" => Ok(DependencyType::FinishToFinish),
            "SF" => Ok(DependencyType::StartToFinish),
            other => Err(format!(
                "unknown dependency type '{other}' (expected FS, SS, FF, SF)"
            )),
        }
    }
}

/// A directed dependency edge from a predecessor task to a successor task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dependency {
    /// Edge identifier
    pub id: DependencyId,

    /// Task that must reach some state first
    pub predecessor_id: TaskId,

    /// Task gated by the predecessor
    pub successor_id: TaskId,

    /// Relationship type
    pub dep_type: DependencyType,

    /// Offset in hours applied to when the condition is considered satisfied
    pub lag_hours: i32,

    /// Whether the edge is in force (false = soft-deleted)
    pub is_active: bool,

    /// Opaque payload
    #[serde(default)]
    pub metadata: Metadata,

    /// Who created the edge
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,

    /// Who last changed the edge
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Dependency {
    /// The (predecessor, successor, type) triple that must be unique among active edges.
    pub fn key(&self) -> (TaskId, TaskId, DependencyType) {
        (self.predecessor_id, self.successor_id, self.dep_type)
    }

    /// Whether `task` is either endpoint of this edge.
    pub fn touches(&self, task: TaskId) -> bool {
        self.predecessor_id == task || self.successor_id == task
    }
}

/// Data for creating a new dependency
#[derive(Debug, Clone, PartialEq)]
pub struct NewDependency {
    /// Predecessor task
    pub predecessor_id: TaskId,

    /// Successor task
    pub successor_id: TaskId,

    /// Relationship type
    pub dep_type: DependencyType,

    /// Lag in hours
    pub lag_hours: i32,

    /// Opaque payload
    pub metadata: Metadata,

    /// Acting user
    pub created_by: Option<String>,
}

impl NewDependency {
    /// Create a dependency request with no lag, metadata or actor.
    pub fn new(
        predecessor_id: impl Into<TaskId>,
        successor_id: impl Into<TaskId>,
        dep_type: DependencyType,
    ) -> Self {
        Self {
            predecessor_id: predecessor_id.into(),
            successor_id: successor_id.into(),
            dep_type,
            lag_hours: 0,
            metadata: Metadata::new(),
            created_by: None,
        }
    }

    /// Set the lag in hours.
    #[must_use]
    pub fn with_lag(mut self, lag_hours: i32) -> Self {
        self.lag_hours = lag_hours;
        self
    }

    /// Validate the request.
    ///
    /// # Errors
    ///
    /// Returns a message if the lag is out of range.
    pub fn validate(&self) -> Result<(), String> {
        validate_lag(self.lag_hours)
    }
}

/// Changes to apply to an existing dependency
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DependencyUpdate {
    /// New relationship type
    pub dep_type: Option<DependencyType>,

    /// New lag
    pub lag_hours: Option<i32>,

    /// Activate or deactivate
    pub is_active: Option<bool>,

    /// Replacement metadata
    pub metadata: Option<Metadata>,

    /// Acting user
    pub updated_by: Option<String>,
}

impl DependencyUpdate {
    /// Validate the requested changes.
    ///
    /// # Errors
    ///
    /// Returns a message if the lag is out of range.
    pub fn validate(&self) -> Result<(), String> {
        match self.lag_hours {
            Some(lag) => validate_lag(lag),
            None => Ok(()),
        }
    }
}

fn validate_lag(lag_hours: i32) -> Result<(), String> {
    if lag_hours.unsigned_abs() > MAX_LAG_HOURS.unsigned_abs() {
        return Err(format!(
            "Lag must be within ±{MAX_LAG_HOURS} hours, got {lag_hours}"
        ));
    }
    Ok(())
}

/// Which edges to return when listing a task's dependencies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeDirection {
    /// Edges where the task is either endpoint
    #[default]
    Both,

    /// Edges where the task is the successor (its predecessors)
    Predecessor,

    /// Edges where the task is the predecessor (its successors)
    Successor,
}

impl FromStr for EdgeDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "both" => Ok(EdgeDirection::Both),
            "predecessor" => Ok(EdgeDirection::Predecessor),
            "successor" => Ok(EdgeDirection::Successor),
            other => Err(format!(
                "unknown direction '{other}' (expected both, predecessor, successor)"
            )),
        }
    }
}

/// Direction of a transitive chain walk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainDirection {
    /// Predecessor to successor: everything that depends on the task
    #[default]
    Forward,

    /// Successor to predecessor: everything the task depends on
    Backward,
}

impl fmt::Display for ChainDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainDirection::Forward => f.write_str("forward"),
            ChainDirection::Backward => f.write_str("backward"),
        }
    }
}

impl FromStr for ChainDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "forward" => Ok(ChainDirection::Forward),
            "backward" => Ok(ChainDirection::Backward),
            other => Err(format!(
                "unknown chain direction '{other}' (expected forward, backward)"
            )),
        }
    }
}
