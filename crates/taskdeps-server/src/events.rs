//! In-process dependency event feed.
//!
//! Handlers publish an event after every successful mutation. Any number of
//! subscribers may listen; the server runs one that logs each event.

use serde::Serialize;
use taskdeps::domain::{Dependency, DependencyId, TaskId, TaskStatus};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// Capacity of the event channel; slow subscribers skip older events.
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// A change to the dependency graph or a task status
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DependencyEvent {
    /// A new edge was created
    DependencyCreated {
        /// The created edge
        dependency: Dependency,
    },
    /// An edge's type, lag, metadata or active flag changed
    DependencyUpdated {
        /// The edge after the change
        dependency: Dependency,
    },
    /// An edge was deactivated
    DependencyRemoved {
        /// The deactivated edge
        dependency_id: DependencyId,
        /// Its predecessor
        predecessor: TaskId,
        /// Its successor
        successor: TaskId,
    },
    /// A task moved to a new status through the API
    TaskStatusChanged {
        /// The task
        task: TaskId,
        /// Status before the change
        previous: TaskStatus,
        /// Status after the change
        current: TaskStatus,
        /// Whether violations were overridden
        overridden: bool,
    },
}

impl DependencyEvent {
    /// Short name of the event kind, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DependencyCreated { .. } => "dependency_created",
            Self::DependencyUpdated { .. } => "dependency_updated",
            Self::DependencyRemoved { .. } => "dependency_removed",
            Self::TaskStatusChanged { .. } => "task_status_changed",
        }
    }

    /// Tasks affected by the event.
    pub fn tasks(&self) -> Vec<TaskId> {
        match self {
            Self::DependencyCreated { dependency } | Self::DependencyUpdated { dependency } => {
                vec![dependency.predecessor_id, dependency.successor_id]
            }
            Self::DependencyRemoved {
                predecessor,
                successor,
                ..
            } => vec![*predecessor, *successor],
            Self::TaskStatusChanged { task, .. } => vec![*task],
        }
    }
}

/// Spawn a subscriber that logs every event until the channel closes.
pub fn spawn_event_logger(mut rx: broadcast::Receiver<DependencyEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    let tasks: Vec<String> =
                        event.tasks().iter().map(ToString::to_string).collect();
                    tracing::info!(
                        event = event.kind(),
                        tasks = %tasks.join(","),
                        "Dependency event"
                    );
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Event logger fell behind");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}
