//! DependencyStorage trait implementation for in-memory storage.

use super::InMemoryStorage;
use super::graph::{ChainWalk, creates_cycle};
use crate::constraints::{TransitionOutcome, TransitionReport};
use crate::domain::{
    ChainDirection, Dependency, DependencyId, DependencyUpdate, EdgeDirection, NewDependency,
    ProjectId, Task, TaskId, TaskStatus,
};
use crate::error::{Error, Result};
use crate::storage::{DependencyStorage, Snapshot};
use async_trait::async_trait;
use chrono::Utc;
use petgraph::Direction;
use std::collections::HashSet;

#[async_trait]
impl DependencyStorage for InMemoryStorage {
    async fn upsert_task(&self, mut task: Task) -> Result<Task> {
        task.validate().map_err(Error::Validation)?;
        task.title = task.title.trim().to_string();
        task.updated_at = Utc::now();

        let mut inner = self.state.lock().await;
        inner.put_task(task.clone());
        Ok(task)
    }

    async fn get_task(&self, id: TaskId) -> Result<Option<Task>> {
        let inner = self.state.lock().await;
        Ok(inner.tasks.get(&id).cloned())
    }

    async fn list_tasks(&self, project: Option<ProjectId>) -> Result<Vec<Task>> {
        let inner = self.state.lock().await;
        let mut tasks: Vec<Task> = inner
            .tasks
            .values()
            .filter(|task| project.is_none() || task.project_id == project)
            .cloned()
            .collect();
        tasks.sort_by_key(|task| task.id);
        Ok(tasks)
    }

    async fn set_task_status(
        &self,
        id: TaskId,
        status: TaskStatus,
        force: bool,
    ) -> Result<TransitionOutcome> {
        let mut inner = self.state.lock().await;

        // Evaluate and apply under the same lock
        let report = inner.evaluate(id, status)?;
        if !report.allowed && !force {
            return Err(Error::ConstraintViolation {
                task: id,
                status,
                violations: report.violations,
            });
        }

        let overridden = !report.allowed;
        if overridden {
            tracing::warn!(
                task = %id,
                status = %status,
                violations = report.violations.len(),
                "Forcing status change past dependency violations"
            );
        }

        let task = inner
            .tasks
            .get_mut(&id)
            .ok_or(Error::TaskNotFound(id))?;
        task.status = status;
        task.updated_at = Utc::now();

        Ok(TransitionOutcome {
            task: task.clone(),
            report,
            overridden,
        })
    }

    async fn insert(&self, new: NewDependency) -> Result<Dependency> {
        // === Phase 1: checks that need no state ===
        if new.predecessor_id == new.successor_id {
            return Err(Error::SelfReference(new.predecessor_id));
        }
        new.validate().map_err(Error::Validation)?;

        let mut inner = self.state.lock().await;

        // === Phase 2: invariants, all under the lock ===
        inner.require_task(new.predecessor_id)?;
        inner.require_task(new.successor_id)?;
        inner.ensure_unique(new.predecessor_id, new.successor_id, new.dep_type, None)?;
        inner.ensure_acyclic(new.predecessor_id, new.successor_id)?;

        // === Phase 3: write ===
        let now = Utc::now();
        let dep = Dependency {
            id: inner.allocate_id(),
            predecessor_id: new.predecessor_id,
            successor_id: new.successor_id,
            dep_type: new.dep_type,
            lag_hours: new.lag_hours,
            is_active: true,
            metadata: new.metadata,
            updated_by: new.created_by.clone(),
            created_by: new.created_by,
            created_at: now,
            updated_at: now,
        };
        inner.link(&dep)?;
        inner.dependencies.insert(dep.id, dep.clone());

        tracing::debug!(
            dependency = %dep.id,
            predecessor = %dep.predecessor_id,
            successor = %dep.successor_id,
            dep_type = %dep.dep_type,
            "Dependency created"
        );
        Ok(dep)
    }

    async fn get_dependency(&self, id: DependencyId) -> Result<Option<Dependency>> {
        let inner = self.state.lock().await;
        Ok(inner.dependencies.get(&id).cloned())
    }

    async fn update(&self, id: DependencyId, changes: DependencyUpdate) -> Result<Dependency> {
        changes.validate().map_err(Error::Validation)?;

        let mut inner = self.state.lock().await;
        let current = inner
            .dependencies
            .get(&id)
            .cloned()
            .ok_or(Error::DependencyNotFound(id))?;

        let dep_type = changes.dep_type.unwrap_or(current.dep_type);
        let is_active = changes.is_active.unwrap_or(current.is_active);
        let reactivating = is_active && !current.is_active;

        if is_active && (reactivating || dep_type != current.dep_type) {
            inner.ensure_unique(
                current.predecessor_id,
                current.successor_id,
                dep_type,
                Some(id),
            )?;
        }
        if reactivating {
            inner.ensure_acyclic(current.predecessor_id, current.successor_id)?;
        }

        if reactivating {
            inner.link(&current)?;
        } else if current.is_active && !is_active {
            inner.unlink(&current);
        }

        let dep = inner
            .dependencies
            .get_mut(&id)
            .ok_or(Error::DependencyNotFound(id))?;
        dep.dep_type = dep_type;
        dep.is_active = is_active;
        if let Some(lag_hours) = changes.lag_hours {
            dep.lag_hours = lag_hours;
        }
        if let Some(metadata) = changes.metadata {
            dep.metadata = metadata;
        }
        if changes.updated_by.is_some() {
            dep.updated_by = changes.updated_by;
        }
        dep.updated_at = Utc::now();

        Ok(dep.clone())
    }

    async fn deactivate(&self, id: DependencyId, actor: Option<String>) -> Result<Dependency> {
        let mut inner = self.state.lock().await;
        let current = inner
            .dependencies
            .get(&id)
            .cloned()
            .ok_or(Error::DependencyNotFound(id))?;

        if !current.is_active {
            return Ok(current);
        }

        inner.unlink(&current);
        let dep = inner
            .dependencies
            .get_mut(&id)
            .ok_or(Error::DependencyNotFound(id))?;
        dep.is_active = false;
        if actor.is_some() {
            dep.updated_by = actor;
        }
        dep.updated_at = Utc::now();

        tracing::debug!(dependency = %id, "Dependency deactivated");
        Ok(dep.clone())
    }

    async fn find_by_predecessor(&self, task: TaskId) -> Result<Vec<Dependency>> {
        self.dependencies_for(task, EdgeDirection::Successor).await
    }

    async fn find_by_successor(&self, task: TaskId) -> Result<Vec<Dependency>> {
        self.dependencies_for(task, EdgeDirection::Predecessor).await
    }

    async fn dependencies_for(
        &self,
        task: TaskId,
        direction: EdgeDirection,
    ) -> Result<Vec<Dependency>> {
        let inner = self.state.lock().await;
        inner.require_task(task)?;

        // "Predecessor" lists the task's predecessors: edges pointing into it
        let mut ids = match direction {
            EdgeDirection::Predecessor => inner.active_edge_ids(task, Direction::Incoming)?,
            EdgeDirection::Successor => inner.active_edge_ids(task, Direction::Outgoing)?,
            EdgeDirection::Both => {
                let mut ids = inner.active_edge_ids(task, Direction::Incoming)?;
                ids.extend(inner.active_edge_ids(task, Direction::Outgoing)?);
                ids
            }
        };
        ids.sort_unstable();

        Ok(inner.collect_edges(&ids))
    }

    async fn project_dependencies(
        &self,
        project: ProjectId,
        include_inactive: bool,
    ) -> Result<Vec<Dependency>> {
        let inner = self.state.lock().await;
        let members: HashSet<TaskId> = inner
            .tasks
            .values()
            .filter(|task| task.project_id == Some(project))
            .map(|task| task.id)
            .collect();

        Ok(inner
            .dependencies
            .values()
            .filter(|dep| include_inactive || dep.is_active)
            .filter(|dep| {
                members.contains(&dep.predecessor_id) || members.contains(&dep.successor_id)
            })
            .cloned()
            .collect())
    }

    async fn would_create_cycle(&self, predecessor: TaskId, successor: TaskId) -> Result<bool> {
        let inner = self.state.lock().await;
        creates_cycle(&inner.graph, &inner.node_map, predecessor, successor)
    }

    async fn walk(&self, task: TaskId, direction: ChainDirection) -> Result<Vec<Dependency>> {
        let inner = self.state.lock().await;
        let start = inner
            .node_map
            .get(&task)
            .copied()
            .ok_or(Error::TaskNotFound(task))?;

        Ok(
            ChainWalk::new(&inner.graph, &inner.dependencies, start, direction)
                .cloned()
                .collect(),
        )
    }

    async fn can_transition(
        &self,
        task: TaskId,
        proposed: TaskStatus,
    ) -> Result<TransitionReport> {
        let inner = self.state.lock().await;
        inner.evaluate(task, proposed)
    }

    async fn export_all(&self) -> Result<Snapshot> {
        let inner = self.state.lock().await;
        let mut tasks: Vec<Task> = inner.tasks.values().cloned().collect();
        tasks.sort_by_key(|task| task.id);

        Ok(Snapshot {
            tasks,
            dependencies: inner.dependencies.values().cloned().collect(),
        })
    }

    async fn save(&self) -> Result<()> {
        // No-op for in-memory storage
        Ok(())
    }

    async fn reload(&self) -> Result<()> {
        // Nothing on disk to reload from
        Ok(())
    }
}
