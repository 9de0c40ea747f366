//! Core in-memory storage data structures.
//!
//! This module contains the inner storage structure that holds all data
//! and is wrapped in `Arc<Mutex<>>` for thread safety.

use super::graph::creates_cycle;
use crate::constraints::{EdgeContext, TransitionReport, evaluate_transition};
use crate::domain::{Dependency, DependencyId, DependencyType, Task, TaskId, TaskStatus};
use crate::error::{Error, Result};
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::{BTreeMap, HashMap};

/// Inner storage structure (not thread-safe).
///
/// Invariants kept by every mutation:
/// - every key of `tasks` has an entry in `node_map`
/// - the graph holds exactly the active entries of `dependencies`
/// - the graph is acyclic
#[derive(Debug)]
pub(crate) struct InMemoryStorageInner {
    /// Task snapshots indexed by ID
    pub(super) tasks: HashMap<TaskId, Task>,

    /// Every edge, active or not, in ID (insertion) order
    pub(super) dependencies: BTreeMap<DependencyId, Dependency>,

    /// Active-edge index. Nodes are tasks, edge weights are dependency IDs.
    /// Edge direction: predecessor -> successor.
    pub(super) graph: DiGraph<TaskId, DependencyId>,

    /// Mapping from TaskId to graph NodeIndex
    pub(super) node_map: HashMap<TaskId, NodeIndex>,

    /// Next dependency ID to hand out
    pub(super) next_id: u64,
}

impl Default for InMemoryStorageInner {
    fn default() -> Self {
        Self {
            tasks: HashMap::new(),
            dependencies: BTreeMap::new(),
            graph: DiGraph::new(),
            node_map: HashMap::new(),
            next_id: 1,
        }
    }
}

impl InMemoryStorageInner {
    /// Insert or replace a task, creating its graph node on first sight.
    pub(super) fn put_task(&mut self, task: Task) {
        if !self.node_map.contains_key(&task.id) {
            let node = self.graph.add_node(task.id);
            self.node_map.insert(task.id, node);
        }
        self.tasks.insert(task.id, task);
    }

    pub(super) fn require_task(&self, id: TaskId) -> Result<&Task> {
        self.tasks.get(&id).ok_or(Error::TaskNotFound(id))
    }

    fn node(&self, id: TaskId) -> Result<NodeIndex> {
        self.node_map
            .get(&id)
            .copied()
            .ok_or(Error::TaskNotFound(id))
    }

    /// Hand out the next dependency ID.
    pub(super) fn allocate_id(&mut self) -> DependencyId {
        let id = DependencyId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Add an edge to the active index.
    pub(super) fn link(&mut self, dep: &Dependency) -> Result<()> {
        let from = self.node(dep.predecessor_id)?;
        let to = self.node(dep.successor_id)?;
        self.graph.add_edge(from, to, dep.id);
        Ok(())
    }

    /// Remove an edge from the active index. Missing edges are ignored.
    pub(super) fn unlink(&mut self, dep: &Dependency) {
        let Some(&from) = self.node_map.get(&dep.predecessor_id) else {
            return;
        };
        let edge = self
            .graph
            .edges(from)
            .find(|edge| *edge.weight() == dep.id)
            .map(|edge| edge.id());
        if let Some(edge) = edge {
            self.graph.remove_edge(edge);
        }
    }

    /// Fail if another active edge already has this (predecessor, successor, type).
    pub(super) fn ensure_unique(
        &self,
        predecessor: TaskId,
        successor: TaskId,
        dep_type: DependencyType,
        ignore: Option<DependencyId>,
    ) -> Result<()> {
        let from = self.node(predecessor)?;
        let to = self.node(successor)?;
        let duplicate = self
            .graph
            .edges_connecting(from, to)
            .map(|edge| *edge.weight())
            .filter(|id| Some(*id) != ignore)
            .filter_map(|id| self.dependencies.get(&id))
            .any(|existing| existing.dep_type == dep_type);

        if duplicate {
            return Err(Error::DuplicateEdge {
                predecessor,
                successor,
                dep_type,
            });
        }
        Ok(())
    }

    /// Fail if adding `predecessor -> successor` would close a cycle.
    pub(super) fn ensure_acyclic(&self, predecessor: TaskId, successor: TaskId) -> Result<()> {
        if creates_cycle(&self.graph, &self.node_map, predecessor, successor)? {
            return Err(Error::CircularDependency {
                predecessor,
                successor,
            });
        }
        Ok(())
    }

    /// IDs of active edges touching `task` in the given graph direction, sorted.
    pub(super) fn active_edge_ids(
        &self,
        task: TaskId,
        direction: Direction,
    ) -> Result<Vec<DependencyId>> {
        let node = self.node(task)?;
        let mut ids: Vec<DependencyId> = self
            .graph
            .edges_directed(node, direction)
            .map(|edge| *edge.weight())
            .collect();
        ids.sort_unstable();
        Ok(ids)
    }

    /// Clone the edges for a list of IDs.
    pub(super) fn collect_edges(&self, ids: &[DependencyId]) -> Vec<Dependency> {
        ids.iter()
            .filter_map(|id| self.dependencies.get(id))
            .cloned()
            .collect()
    }

    /// Evaluate a status change for `task` against its active edges.
    pub(super) fn evaluate(&self, task: TaskId, proposed: TaskStatus) -> Result<TransitionReport> {
        let subject = self.require_task(task)?;

        let mut ids = self.active_edge_ids(task, Direction::Incoming)?;
        ids.extend(self.active_edge_ids(task, Direction::Outgoing)?);
        ids.sort_unstable();

        let edges: Vec<EdgeContext<'_>> = ids
            .iter()
            .filter_map(|id| {
                let dependency = self.dependencies.get(id)?;
                Some(EdgeContext {
                    dependency,
                    predecessor: self.tasks.get(&dependency.predecessor_id)?,
                    successor: self.tasks.get(&dependency.successor_id)?,
                })
            })
            .collect();

        Ok(evaluate_transition(subject, proposed, &edges))
    }
}
