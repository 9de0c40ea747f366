//! Error types for taskdeps operations.

use crate::constraints::Violation;
use crate::domain::{DependencyId, DependencyType, TaskId};
use std::io;
use thiserror::Error;

/// The error type for taskdeps operations.
///
/// Every variant except `Io`, `Json` and `Storage` is a recoverable,
/// caller-facing condition; API layers translate them into 4xx responses.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Storage backend error.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Invalid input.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Task not found.
    #[error("Task not found: {0}")]
    TaskNotFound(TaskId),

    /// Dependency not found.
    #[error("Dependency not found: {0}")]
    DependencyNotFound(DependencyId),

    /// A task cannot depend on itself.
    #[error("Task {0} cannot depend on itself")]
    SelfReference(TaskId),

    /// An active edge with the same (predecessor, successor, type) already exists.
    #[error("Dependency already exists: {predecessor} -> {successor} ({dep_type})")]
    DuplicateEdge {
        /// Predecessor task
        predecessor: TaskId,
        /// Successor task
        successor: TaskId,
        /// Relationship type
        dep_type: DependencyType,
    },

    /// Adding the edge would close a cycle in the active graph.
    #[error("Circular dependency detected: {predecessor} -> {successor} would create a cycle")]
    CircularDependency {
        /// Predecessor task
        predecessor: TaskId,
        /// Successor task
        successor: TaskId,
    },

    /// A status transition conflicts with one or more active dependencies.
    #[error("Cannot move task {task} to {status}: {} dependency violation(s)", violations.len())]
    ConstraintViolation {
        /// Task whose status was being changed
        task: TaskId,
        /// Proposed status
        status: crate::domain::TaskStatus,
        /// All unmet dependency conditions
        violations: Vec<Violation>,
    },
}

/// Storage backend errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Persisted data could not be interpreted.
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    /// Record serialization failed.
    #[error("Serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    /// The configured backend is not available.
    #[error("Unsupported storage backend: {0}")]
    UnsupportedBackend(String),
}

/// Workspace configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No `.taskdeps/` directory was found.
    #[error("Not a taskdeps workspace (or any parent directory). Run 'taskdeps init' first.")]
    NotInitialized,

    /// The workspace already exists.
    #[error("Taskdeps is already initialized in this directory. Found existing '{0}'")]
    AlreadyInitialized(String),

    /// The configuration file could not be parsed or written.
    #[error("{0}")]
    Invalid(String),
}

/// A specialized Result type for taskdeps operations.
pub type Result<T> = std::result::Result<T, Error>;
