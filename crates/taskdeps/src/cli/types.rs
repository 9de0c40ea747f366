//! CLI value enums and domain type conversions.
//!
//! This module contains the value enums used for CLI argument parsing
//! and their conversions to domain types.

use clap::ValueEnum;

use crate::config::BackendKind;
use crate::domain::{ChainDirection, DependencyType, EdgeDirection, TaskStatus};

// ============================================================================
// Value Enums
// ============================================================================

/// Dependency type for CLI arguments
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyTypeArg {
    /// Finish-to-start
    #[value(name = "FS", alias = "fs")]
    Fs,
    /// Start-to-start
    #[value(name = "SS", alias = "ss")]
    Ss,
    /// Finish-to-finish
    #[value(name = "FF", alias = "ff")]
    Ff,
    /// Start-to-finish
    #[value(name = "SF", alias = "sf")]
    Sf,
}

impl std::fmt::Display for DependencyTypeArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        DependencyType::from(*self).fmt(f)
    }
}

/// Task status for CLI arguments
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatusArg {
    /// Not started
    Todo,
    /// Being worked on
    #[value(name = "in_progress", alias = "in-progress")]
    InProgress,
    /// Awaiting review
    Review,
    /// Completed
    #[value(alias = "completed")]
    Done,
    /// Abandoned
    Cancelled,
}

impl std::fmt::Display for TaskStatusArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        TaskStatus::from(*self).fmt(f)
    }
}

/// Edge listing direction for CLI arguments
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EdgeDirectionArg {
    /// Predecessors and successors
    #[default]
    Both,
    /// Edges into the task
    Predecessor,
    /// Edges out of the task
    Successor,
}

/// Chain walk direction for CLI arguments
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChainDirectionArg {
    /// Everything downstream of the task
    #[default]
    Forward,
    /// Everything the task depends on
    Backward,
}

/// Storage backend for `init`
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendArg {
    /// Ephemeral in-memory storage
    Memory,
    /// In-memory storage persisted to JSONL
    #[default]
    Jsonl,
}

// ============================================================================
// Conversions to Domain Types
// ============================================================================

impl From<DependencyTypeArg> for DependencyType {
    fn from(arg: DependencyTypeArg) -> Self {
        match arg {
            DependencyTypeArg::Fs => DependencyType::FinishToStart,
            DependencyTypeArg::Ss => DependencyType::StartToStart,
            DependencyTypeArg::Ff => DependencyType::FinishToFinish,
            DependencyTypeArg::Sf => DependencyType::StartToFinish,
        }
    }
}

impl From<TaskStatusArg> for TaskStatus {
    fn from(arg: TaskStatusArg) -> Self {
        match arg {
            TaskStatusArg::Todo => TaskStatus::Todo,
            TaskStatusArg::InProgress => TaskStatus::InProgress,
            TaskStatusArg::Review => TaskStatus::Review,
            TaskStatusArg::Done => TaskStatus::Done,
            TaskStatusArg::Cancelled => TaskStatus::Cancelled,
        }
    }
}

impl From<EdgeDirectionArg> for EdgeDirection {
    fn from(arg: EdgeDirectionArg) -> Self {
        match arg {
            EdgeDirectionArg::Both => EdgeDirection::Both,
            EdgeDirectionArg::Predecessor => EdgeDirection::Predecessor,
            EdgeDirectionArg::Successor => EdgeDirection::Successor,
        }
    }
}

impl From<ChainDirectionArg> for ChainDirection {
    fn from(arg: ChainDirectionArg) -> Self {
        match arg {
            ChainDirectionArg::Forward => ChainDirection::Forward,
            ChainDirectionArg::Backward => ChainDirection::Backward,
        }
    }
}

impl From<BackendArg> for BackendKind {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Memory => BackendKind::Memory,
            BackendArg::Jsonl => BackendKind::Jsonl,
        }
    }
}
