//! JSONL persistence for in-memory storage.
//!
//! The file holds one record per line, tagged by `kind`:
//!
//! ```text
//! {"kind":"task","id":1,"title":"Design","status":"done","updated_at":"..."}
//! {"kind":"dependency","id":1,"predecessor_id":1,"successor_id":2,"dep_type":"FS",...}
//! ```
//!
//! Tasks are written first, then every edge (inactive ones included) in ID order.

use super::InMemoryStorage;
use super::inner::InMemoryStorageInner;
use crate::domain::{Dependency, DependencyId, Task, TaskId};
use crate::error::{Error, Result, StorageError};
use crate::storage::DependencyStorage;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};

/// One line of the JSONL file.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Record {
    Task(Task),
    Dependency(Dependency),
}

/// Warnings that can occur during JSONL file loading.
///
/// These are non-fatal: the load continues, skipping or deactivating the
/// offending record. Callers should log or report them, as they indicate
/// manual edits or corruption that may need attention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadWarning {
    /// Malformed JSON line that couldn't be parsed.
    ///
    /// **Effect**: The line is skipped.
    MalformedJson {
        /// 1-based line number
        line_number: usize,
        /// Parser message
        error: String,
    },

    /// Task snapshot failed validation.
    ///
    /// **Effect**: The task is skipped; edges touching it become orphaned.
    InvalidTaskData {
        /// Task from the record
        task_id: TaskId,
        /// 1-based line number
        line_number: usize,
        /// Validation message
        error: String,
    },

    /// Edge failed validation (self reference, lag out of range, reused ID).
    ///
    /// **Effect**: The edge is skipped.
    InvalidDependencyData {
        /// Edge from the record
        dependency_id: DependencyId,
        /// 1-based line number
        line_number: usize,
        /// Validation message
        error: String,
    },

    /// Edge references a task that isn't in the file.
    ///
    /// **Effect**: The edge is skipped.
    OrphanedDependency {
        /// Edge from the record
        dependency_id: DependencyId,
        /// Predecessor task
        predecessor: TaskId,
        /// Successor task
        successor: TaskId,
    },

    /// Active edge duplicates an earlier active edge's triple.
    ///
    /// **Effect**: The edge is loaded as inactive.
    DuplicateDependency {
        /// Edge from the record
        dependency_id: DependencyId,
    },

    /// Active edge would close a cycle with earlier edges.
    ///
    /// **Effect**: The edge is loaded as inactive to break the cycle.
    CircularDependency {
        /// Edge from the record
        dependency_id: DependencyId,
        /// Predecessor task
        predecessor: TaskId,
        /// Successor task
        successor: TaskId,
    },
}

/// Load storage from a JSONL file.
///
/// Returns the storage and every non-fatal warning encountered.
///
/// # Errors
///
/// - `Error::Io` if the file cannot be read
pub async fn load_from_jsonl(path: &Path) -> Result<(InMemoryStorage, Vec<LoadWarning>)> {
    let (state, warnings) = read_state(path).await?;
    Ok((InMemoryStorage::from_state(state), warnings))
}

/// Read a JSONL file into fresh inner state.
///
/// Three passes: parse every line, import valid tasks, then replay edges in
/// ID order with the same invariants `insert` enforces.
pub(crate) async fn read_state(path: &Path) -> Result<(InMemoryStorageInner, Vec<LoadWarning>)> {
    let content = tokio::fs::read_to_string(path).await?;
    let mut warnings = Vec::new();

    // First pass: parse
    let mut tasks = Vec::new();
    let mut dependencies = Vec::new();
    for (index, line) in content.lines().enumerate() {
        let line_number = index + 1;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<Record>(line) {
            Ok(Record::Task(task)) => tasks.push((line_number, task)),
            Ok(Record::Dependency(dep)) => dependencies.push((line_number, dep)),
            Err(e) => warnings.push(LoadWarning::MalformedJson {
                line_number,
                error: e.to_string(),
            }),
        }
    }

    let mut state = InMemoryStorageInner::default();

    // Second pass: tasks
    for (line_number, task) in tasks {
        if let Err(error) = task.validate() {
            warnings.push(LoadWarning::InvalidTaskData {
                task_id: task.id,
                line_number,
                error,
            });
            continue;
        }
        state.put_task(task);
    }

    // Third pass: edges, oldest first, so later edges lose conflicts
    dependencies.sort_by_key(|(_, dep)| dep.id);
    for (line_number, mut dep) in dependencies {
        if let Some(error) = dependency_record_error(&state, &dep) {
            warnings.push(LoadWarning::InvalidDependencyData {
                dependency_id: dep.id,
                line_number,
                error,
            });
            continue;
        }

        if !state.tasks.contains_key(&dep.predecessor_id)
            || !state.tasks.contains_key(&dep.successor_id)
        {
            warnings.push(LoadWarning::OrphanedDependency {
                dependency_id: dep.id,
                predecessor: dep.predecessor_id,
                successor: dep.successor_id,
            });
            continue;
        }

        if dep.is_active {
            match state
                .ensure_unique(dep.predecessor_id, dep.successor_id, dep.dep_type, None)
                .and_then(|()| state.ensure_acyclic(dep.predecessor_id, dep.successor_id))
            {
                Ok(()) => state.link(&dep)?,
                Err(Error::DuplicateEdge { .. }) => {
                    warnings.push(LoadWarning::DuplicateDependency {
                        dependency_id: dep.id,
                    });
                    dep.is_active = false;
                }
                Err(Error::CircularDependency { .. }) => {
                    warnings.push(LoadWarning::CircularDependency {
                        dependency_id: dep.id,
                        predecessor: dep.predecessor_id,
                        successor: dep.successor_id,
                    });
                    dep.is_active = false;
                }
                Err(e) => return Err(e),
            }
        }

        state.next_id = state.next_id.max(dep.id.get() + 1);
        state.dependencies.insert(dep.id, dep);
    }

    Ok((state, warnings))
}

fn dependency_record_error(state: &InMemoryStorageInner, dep: &Dependency) -> Option<String> {
    if state.dependencies.contains_key(&dep.id) {
        return Some(format!("dependency id {} appears more than once", dep.id));
    }
    if dep.predecessor_id == dep.successor_id {
        return Some(format!("task {} cannot depend on itself", dep.predecessor_id));
    }
    if dep.id.get() == u64::MAX {
        return Some("dependency id is out of range".to_string());
    }
    crate::domain::NewDependency::new(dep.predecessor_id, dep.successor_id, dep.dep_type)
        .with_lag(dep.lag_hours)
        .validate()
        .err()
}

/// Save storage to a JSONL file with atomic writes.
///
/// Writes to a uniquely named temporary file next to `path`, syncs it, then
/// renames it over `path`. If the process crashes mid-write the original file
/// remains unchanged, and concurrent saves never share a temporary file.
///
/// # Errors
///
/// - `Error::Io` if the file cannot be written or renamed
/// - `Error::Storage` if a record fails to serialize
pub async fn save_to_jsonl(storage: &dyn DependencyStorage, path: &Path) -> Result<()> {
    let snapshot = storage.export_all().await?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let temp = tempfile::Builder::new()
        .prefix(".taskdeps-")
        .suffix(".tmp")
        .tempfile_in(dir)?;
    let mut writer = BufWriter::new(File::from_std(temp.reopen()?));

    let records = snapshot
        .tasks
        .into_iter()
        .map(Record::Task)
        .chain(snapshot.dependencies.into_iter().map(Record::Dependency));

    for record in records {
        let json = serde_json::to_string(&record).map_err(StorageError::Serialization)?;
        writer.write_all(json.as_bytes()).await?;
        writer.write_all(b"\n").await?;
    }

    writer.flush().await?;
    writer.get_ref().sync_all().await?;
    drop(writer);

    // Dropping `temp` on any earlier return removes the partial file
    temp.persist(path).map_err(|e| Error::Io(e.error))?;

    tracing::debug!(path = %path.display(), "Saved dependency snapshot");
    Ok(())
}
