//! Storage abstraction layer for taskdeps.
//!
//! This module provides the core storage trait and factory for creating
//! storage backends:
//!
//! - **In-memory**: task snapshots and edges in maps, active edges indexed in a petgraph
//! - **JSONL**: the in-memory backend, persisted to a JSON Lines file on `save()`
//!
//! # Architecture
//!
//! The storage layer uses an async, object-safe trait so callers hold a
//! `Arc<dyn DependencyStorage>` regardless of the backend. Every method takes
//! `&self`; implementations use interior mutability and must serialise
//! check-then-write sequences (duplicate and cycle checks followed by the
//! insert) so concurrent callers cannot interleave between them.
//!
//! # Example
//!
//! ```no_run
//! use taskdeps::domain::{DependencyType, NewDependency, Task, TaskStatus};
//! use taskdeps::storage::{create_storage, StorageBackend};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let storage = create_storage(StorageBackend::InMemory).await?;
//!
//!     storage.upsert_task(Task::new(1, "Design", TaskStatus::Todo)).await?;
//!     storage.upsert_task(Task::new(2, "Build", TaskStatus::Todo)).await?;
//!
//!     let dep = storage
//!         .insert(NewDependency::new(1, 2, DependencyType::FinishToStart))
//!         .await?;
//!     println!("Created dependency {}", dep.id);
//!
//!     Ok(())
//! }
//! ```

use crate::constraints::{TransitionOutcome, TransitionReport};
use crate::domain::{
    ChainDirection, Dependency, DependencyId, DependencyUpdate, EdgeDirection, NewDependency,
    ProjectId, Task, TaskId, TaskStatus,
};
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

pub mod in_memory;

use in_memory::InMemoryStorage;

/// Everything a backend holds, suitable for export or backup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Task snapshots, ordered by id
    pub tasks: Vec<Task>,
    /// All edges including inactive ones, ordered by id
    pub dependencies: Vec<Dependency>,
}

/// Core storage trait for the dependency subsystem.
///
/// # Method Categories
///
/// - **Task snapshots**: `upsert_task`, `get_task`, `list_tasks`, `set_task_status`
/// - **Edges**: `insert`, `get_dependency`, `update`, `deactivate`
/// - **Queries**: `find_by_predecessor`, `find_by_successor`, `dependencies_for`,
///   `project_dependencies`
/// - **Graph**: `would_create_cycle`, `walk`, `can_transition`
/// - **Persistence**: `export_all`, `save`, `reload`
///
/// # Error Handling
///
/// - `TaskNotFound` / `DependencyNotFound`: unknown ids
/// - `SelfReference`, `DuplicateEdge`, `CircularDependency`: edge invariants
/// - `ConstraintViolation`: blocked status change
/// - `Validation`: malformed input (title, lag bounds)
/// - `Storage` / `Io`: backend failures
#[async_trait]
pub trait DependencyStorage: Send + Sync {
    // ========== Task Snapshots ==========

    /// Insert or replace a task snapshot.
    ///
    /// The owning task system is authoritative, so the snapshot's status is
    /// taken as-is without constraint evaluation.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` if the title is empty or too long.
    async fn upsert_task(&self, task: Task) -> Result<Task>;

    /// Get a task snapshot by ID.
    async fn get_task(&self, id: TaskId) -> Result<Option<Task>>;

    /// List task snapshots ordered by ID, optionally limited to one project.
    async fn list_tasks(&self, project: Option<ProjectId>) -> Result<Vec<Task>>;

    /// Evaluate and apply a status change in one critical section.
    ///
    /// # Errors
    ///
    /// - `Error::TaskNotFound` if the task doesn't exist
    /// - `Error::ConstraintViolation` if the change is blocked and `force` is false
    async fn set_task_status(
        &self,
        id: TaskId,
        status: TaskStatus,
        force: bool,
    ) -> Result<TransitionOutcome>;

    // ========== Edges ==========

    /// Create a new active dependency edge.
    ///
    /// # Errors
    ///
    /// - `Error::SelfReference` if predecessor and successor are the same task
    /// - `Error::Validation` if the lag is out of range
    /// - `Error::TaskNotFound` if either task is unknown
    /// - `Error::DuplicateEdge` if an active edge with the same triple exists
    /// - `Error::CircularDependency` if the edge would close a cycle
    async fn insert(&self, new: NewDependency) -> Result<Dependency>;

    /// Get an edge by ID, active or not.
    async fn get_dependency(&self, id: DependencyId) -> Result<Option<Dependency>>;

    /// Apply changes to an edge.
    ///
    /// A type change on an active edge re-checks uniqueness; reactivation
    /// re-checks both uniqueness and acyclicity.
    ///
    /// # Errors
    ///
    /// - `Error::DependencyNotFound` if the edge doesn't exist
    /// - `Error::DuplicateEdge` / `Error::CircularDependency` as for `insert`
    async fn update(&self, id: DependencyId, changes: DependencyUpdate) -> Result<Dependency>;

    /// Soft-delete an edge. Deactivating an inactive edge is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `Error::DependencyNotFound` if the edge doesn't exist.
    async fn deactivate(&self, id: DependencyId, actor: Option<String>) -> Result<Dependency>;

    // ========== Queries ==========

    /// Active edges where `task` is the predecessor, ordered by ID.
    async fn find_by_predecessor(&self, task: TaskId) -> Result<Vec<Dependency>>;

    /// Active edges where `task` is the successor, ordered by ID.
    async fn find_by_successor(&self, task: TaskId) -> Result<Vec<Dependency>>;

    /// Active edges touching `task` in the given direction, ordered by ID.
    async fn dependencies_for(
        &self,
        task: TaskId,
        direction: EdgeDirection,
    ) -> Result<Vec<Dependency>>;

    /// Edges touching any task of `project`, ordered by ID.
    async fn project_dependencies(
        &self,
        project: ProjectId,
        include_inactive: bool,
    ) -> Result<Vec<Dependency>>;

    // ========== Graph ==========

    /// Whether adding `predecessor -> successor` would close a cycle.
    ///
    /// Always true when both ids are equal.
    async fn would_create_cycle(&self, predecessor: TaskId, successor: TaskId) -> Result<bool>;

    /// Transitive closure of active edges from `task`, breadth-first.
    async fn walk(&self, task: TaskId, direction: ChainDirection) -> Result<Vec<Dependency>>;

    /// Evaluate a status change without applying it.
    async fn can_transition(&self, task: TaskId, proposed: TaskStatus)
    -> Result<TransitionReport>;

    // ========== Persistence ==========

    /// Export all tasks and edges.
    async fn export_all(&self) -> Result<Snapshot>;

    /// Save changes to persistent storage.
    ///
    /// A no-op for purely in-memory storage.
    async fn save(&self) -> Result<()>;

    /// Reload state from persistent storage, discarding unsaved changes.
    ///
    /// Long-running callers use this after a failed `save()` so memory
    /// matches disk again. A no-op for purely in-memory storage.
    async fn reload(&self) -> Result<()>;
}

/// Storage backend configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    /// In-memory storage (ephemeral)
    InMemory,

    /// JSONL file storage (persistent)
    Jsonl(PathBuf),
}

impl StorageBackend {
    /// Returns the data file path for file-based backends.
    pub fn data_path(&self) -> Option<&Path> {
        match self {
            StorageBackend::Jsonl(path) => Some(path),
            StorageBackend::InMemory => None,
        }
    }
}

/// In-memory storage whose `save()` writes a JSONL file.
///
/// `file_lock` serialises `save()` and `reload()` so a reload never reads a
/// half-replaced file and saves land in call order.
struct JsonlBackedStorage {
    inner: InMemoryStorage,
    path: PathBuf,
    file_lock: Mutex<()>,
}

impl JsonlBackedStorage {
    async fn open(path: PathBuf) -> Result<Self> {
        let inner = InMemoryStorage::new();
        let storage = Self {
            inner,
            path,
            file_lock: Mutex::new(()),
        };
        storage.reload().await?;
        Ok(storage)
    }
}

#[async_trait]
impl DependencyStorage for JsonlBackedStorage {
    async fn upsert_task(&self, task: Task) -> Result<Task> {
        self.inner.upsert_task(task).await
    }

    async fn get_task(&self, id: TaskId) -> Result<Option<Task>> {
        self.inner.get_task(id).await
    }

    async fn list_tasks(&self, project: Option<ProjectId>) -> Result<Vec<Task>> {
        self.inner.list_tasks(project).await
    }

    async fn set_task_status(
        &self,
        id: TaskId,
        status: TaskStatus,
        force: bool,
    ) -> Result<TransitionOutcome> {
        self.inner.set_task_status(id, status, force).await
    }

    async fn insert(&self, new: NewDependency) -> Result<Dependency> {
        self.inner.insert(new).await
    }

    async fn get_dependency(&self, id: DependencyId) -> Result<Option<Dependency>> {
        self.inner.get_dependency(id).await
    }

    async fn update(&self, id: DependencyId, changes: DependencyUpdate) -> Result<Dependency> {
        self.inner.update(id, changes).await
    }

    async fn deactivate(&self, id: DependencyId, actor: Option<String>) -> Result<Dependency> {
        self.inner.deactivate(id, actor).await
    }

    async fn find_by_predecessor(&self, task: TaskId) -> Result<Vec<Dependency>> {
        self.inner.find_by_predecessor(task).await
    }

    async fn find_by_successor(&self, task: TaskId) -> Result<Vec<Dependency>> {
        self.inner.find_by_successor(task).await
    }

    async fn dependencies_for(
        &self,
        task: TaskId,
        direction: EdgeDirection,
    ) -> Result<Vec<Dependency>> {
        self.inner.dependencies_for(task, direction).await
    }

    async fn project_dependencies(
        &self,
        project: ProjectId,
        include_inactive: bool,
    ) -> Result<Vec<Dependency>> {
        self.inner
            .project_dependencies(project, include_inactive)
            .await
    }

    async fn would_create_cycle(&self, predecessor: TaskId, successor: TaskId) -> Result<bool> {
        self.inner.would_create_cycle(predecessor, successor).await
    }

    async fn walk(&self, task: TaskId, direction: ChainDirection) -> Result<Vec<Dependency>> {
        self.inner.walk(task, direction).await
    }

    async fn can_transition(
        &self,
        task: TaskId,
        proposed: TaskStatus,
    ) -> Result<TransitionReport> {
        self.inner.can_transition(task, proposed).await
    }

    async fn export_all(&self) -> Result<Snapshot> {
        self.inner.export_all().await
    }

    async fn save(&self) -> Result<()> {
        let _file = self.file_lock.lock().await;
        in_memory::save_to_jsonl(&self.inner, &self.path).await
    }

    async fn reload(&self) -> Result<()> {
        let _file = self.file_lock.lock().await;
        if tokio::fs::try_exists(&self.path).await? {
            let (state, warnings) = in_memory::read_state(&self.path).await?;
            for warning in &warnings {
                tracing::warn!(
                    warning = ?warning,
                    path = %self.path.display(),
                    "JSONL load warning"
                );
            }
            self.inner.replace_state(state).await;
        } else {
            // First run: nothing on disk yet
            self.inner.clear().await;
        }
        Ok(())
    }
}

/// Create a storage instance for the given backend.
///
/// # Example
///
/// ```no_run
/// use taskdeps::storage::{create_storage, StorageBackend};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() -> anyhow::Result<()> {
///     let storage = create_storage(StorageBackend::InMemory).await?;
///     let tasks = storage.list_tasks(None).await?;
///     assert!(tasks.is_empty());
///     Ok(())
/// }
/// ```
///
/// # Errors
///
/// - `Error::Io` if the data file exists but cannot be read
/// - `Error::Storage` if the file is not valid UTF-8 JSONL
pub async fn create_storage(backend: StorageBackend) -> Result<Box<dyn DependencyStorage>> {
    match backend {
        StorageBackend::InMemory => Ok(in_memory::new_in_memory_storage()),
        StorageBackend::Jsonl(path) => {
            tracing::debug!(path = %path.display(), "Opening JSONL storage");
            Ok(Box::new(JsonlBackedStorage::open(path).await?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DependencyType;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_jsonl_backend_starts_empty_without_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("dependencies.jsonl");

        let storage = create_storage(StorageBackend::Jsonl(path.clone()))
            .await
            .unwrap();

        assert!(storage.export_all().await.unwrap().tasks.is_empty());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_jsonl_backend_reload_discards_unsaved_changes() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("dependencies.jsonl");
        let storage = create_storage(StorageBackend::Jsonl(path)).await.unwrap();

        storage
            .upsert_task(Task::new(1, "Saved", TaskStatus::Todo))
            .await
            .unwrap();
        storage
            .upsert_task(Task::new(2, "Saved too", TaskStatus::Todo))
            .await
            .unwrap();
        storage.save().await.unwrap();

        storage
            .insert(NewDependency::new(1, 2, DependencyType::FinishToStart))
            .await
            .unwrap();
        storage.reload().await.unwrap();

        let snapshot = storage.export_all().await.unwrap();
        assert_eq!(snapshot.tasks.len(), 2);
        assert!(snapshot.dependencies.is_empty());
    }

    #[test]
    fn test_data_path() {
        assert_eq!(StorageBackend::InMemory.data_path(), None);
        let backend = StorageBackend::Jsonl(PathBuf::from("deps.jsonl"));
        assert_eq!(backend.data_path(), Some(Path::new("deps.jsonl")));
    }
}
