//! Status-transition constraint evaluation.
//!
//! Given a task, a proposed status, and the active edges touching the task
//! (with both endpoint snapshots), [`evaluate_transition`] decides whether the
//! change is permitted. The evaluation is pure: it reads its inputs and
//! returns a [`TransitionReport`]; applying the status is the caller's job.
//!
//! # Rules
//!
//! - **Incoming edges** (task is the successor): the relationship rule from
//!   [`DependencyType::can_proceed`] is checked against the predecessor's
//!   current status and the proposed status. A failed rule is a [`Violation`]
//!   and blocks the transition.
//! - **Outgoing edges** (task is the predecessor): if a rule that holds today
//!   would stop holding after the change, the successor has already moved
//!   past the gate. That is reported as a [`Warning`] and never blocks.
//! - **Schedule**: when the predecessor has a due date and the successor a
//!   start date, `due + lag` later than `start` produces a warning.

use crate::domain::{Dependency, DependencyId, DependencyType, Task, TaskId, TaskStatus};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// An active edge touching the evaluated task, with both endpoint snapshots.
#[derive(Debug, Clone, Copy)]
pub struct EdgeContext<'a> {
    /// The edge
    pub dependency: &'a Dependency,
    /// Snapshot of the predecessor task
    pub predecessor: &'a Task,
    /// Snapshot of the successor task
    pub successor: &'a Task,
}

/// An unmet dependency condition that blocks a transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// The violated edge
    pub dependency_id: DependencyId,
    /// Predecessor task of the edge
    pub predecessor_id: TaskId,
    /// Successor task of the edge
    pub successor_id: TaskId,
    /// Relationship type of the edge
    pub dep_type: DependencyType,
    /// The unmet condition, phrased for display
    pub reason: String,
}

/// Kind of non-blocking warning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// A successor already past its gate would lose its satisfied condition
    SuccessorInvalidated,
    /// Planned dates conflict with the edge's lag
    ScheduleConflict,
}

/// A non-blocking finding surfaced to the caller for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    /// The edge the warning concerns
    pub dependency_id: DependencyId,
    /// Warning kind
    pub kind: WarningKind,
    /// Message for display
    pub message: String,
}

/// Outcome of evaluating a proposed status change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionReport {
    /// Evaluated task
    pub task_id: TaskId,
    /// Status before the change
    pub current_status: TaskStatus,
    /// Proposed status
    pub proposed_status: TaskStatus,
    /// True iff there are no violations
    pub allowed: bool,
    /// Blocking findings
    pub violations: Vec<Violation>,
    /// Non-blocking findings
    pub warnings: Vec<Warning>,
}

impl TransitionReport {
    /// Whether any warnings were raised
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Result of applying a status change through storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionOutcome {
    /// The task after the change
    pub task: Task,
    /// The evaluation the change was checked against
    pub report: TransitionReport,
    /// True when violations existed and the change was forced through
    pub overridden: bool,
}

/// Evaluate moving `task` to `proposed` against the edges touching it.
///
/// Inactive edges and edges that do not touch `task` are ignored.
pub fn evaluate_transition(
    task: &Task,
    proposed: TaskStatus,
    edges: &[EdgeContext<'_>],
) -> TransitionReport {
    let mut violations = Vec::new();
    let mut warnings = Vec::new();

    for edge in edges {
        let dep = edge.dependency;
        if !dep.is_active || !dep.touches(task.id) {
            continue;
        }

        if dep.successor_id == task.id {
            if !dep.dep_type.can_proceed(edge.predecessor.status, proposed) {
                violations.push(Violation {
                    dependency_id: dep.id,
                    predecessor_id: dep.predecessor_id,
                    successor_id: dep.successor_id,
                    dep_type: dep.dep_type,
                    reason: violation_reason(dep, edge.predecessor),
                });
            }
        } else {
            let successor_status = edge.successor.status;
            let holds_now = dep.dep_type.can_proceed(task.status, successor_status);
            let holds_after = dep.dep_type.can_proceed(proposed, successor_status);
            if holds_now && !holds_after {
                warnings.push(Warning {
                    dependency_id: dep.id,
                    kind: WarningKind::SuccessorInvalidated,
                    message: format!(
                        "Successor task {} ({}) is already {}; moving this task to {} breaks its {} dependency",
                        edge.successor.id,
                        edge.successor.title,
                        successor_status,
                        proposed,
                        dep.dep_type
                    ),
                });
            }
        }

        if let Some(expected_start) = schedule_conflict(edge) {
            warnings.push(Warning {
                dependency_id: dep.id,
                kind: WarningKind::ScheduleConflict,
                message: format!(
                    "Based on a lag of {}h, task {} should start after {}",
                    dep.lag_hours,
                    edge.successor.id,
                    expected_start.to_rfc3339()
                ),
            });
        }
    }

    TransitionReport {
        task_id: task.id,
        current_status: task.status,
        proposed_status: proposed,
        allowed: violations.is_empty(),
        violations,
        warnings,
    }
}

fn violation_reason(dep: &Dependency, predecessor: &Task) -> String {
    format!(
        "Predecessor task {} ({}) must be {} before this task can {}, per {} dependency {}",
        predecessor.id,
        predecessor.title,
        dep.dep_type.required_predecessor_state(),
        dep.dep_type.gated_successor_transition(),
        dep.dep_type,
        dep.id
    )
}

/// Earliest successor start implied by the predecessor's due date and the lag,
/// if the successor is planned to start before it.
fn schedule_conflict(edge: &EdgeContext<'_>) -> Option<DateTime<Utc>> {
    let due = edge.predecessor.due_date?;
    let start = edge.successor.start_date?;
    let expected = due.checked_add_signed(Duration::hours(i64::from(edge.dependency.lag_hours)))?;
    (expected > start).then_some(expected)
}
