//! Dependency graph operations using petgraph.
//!
//! This module provides graph algorithms for the in-memory storage:
//! - Cycle detection for proposed edges
//! - Transitive chain traversal (lazy BFS)

use crate::domain::{ChainDirection, Dependency, DependencyId, TaskId};
use crate::error::{Error, Result};
use petgraph::Direction;
use petgraph::algo;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

/// Whether adding `predecessor -> successor` would close a cycle.
///
/// True when both ids are equal, or when `successor` already reaches
/// `predecessor` over active edges. `has_path_connecting` keeps a visited
/// set, so this terminates even on a graph that already contains a cycle.
pub(super) fn creates_cycle(
    graph: &DiGraph<TaskId, DependencyId>,
    node_map: &HashMap<TaskId, NodeIndex>,
    predecessor: TaskId,
    successor: TaskId,
) -> Result<bool> {
    if predecessor == successor {
        return Ok(true);
    }

    let from_node = node_map
        .get(&predecessor)
        .ok_or(Error::TaskNotFound(predecessor))?;
    let to_node = node_map
        .get(&successor)
        .ok_or(Error::TaskNotFound(successor))?;

    Ok(algo::has_path_connecting(graph, *to_node, *from_node, None))
}

/// Lazy breadth-first walk over the active edges reachable from a task.
///
/// Forward walks follow predecessor -> successor; backward walks follow
/// successor -> predecessor. Each task is expanded at most once, so every
/// edge is yielded at most once and the walk terminates on any graph. The
/// edges out of one task are yielded in ID order.
pub struct ChainWalk<'a> {
    graph: &'a DiGraph<TaskId, DependencyId>,
    dependencies: &'a BTreeMap<DependencyId, Dependency>,
    direction: ChainDirection,
    visited: HashSet<NodeIndex>,
    queue: VecDeque<NodeIndex>,
    pending: VecDeque<DependencyId>,
}

impl<'a> ChainWalk<'a> {
    pub(super) fn new(
        graph: &'a DiGraph<TaskId, DependencyId>,
        dependencies: &'a BTreeMap<DependencyId, Dependency>,
        start: NodeIndex,
        direction: ChainDirection,
    ) -> Self {
        Self {
            graph,
            dependencies,
            direction,
            visited: HashSet::from([start]),
            queue: VecDeque::from([start]),
            pending: VecDeque::new(),
        }
    }

    fn petgraph_direction(&self) -> Direction {
        match self.direction {
            ChainDirection::Forward => Direction::Outgoing,
            ChainDirection::Backward => Direction::Incoming,
        }
    }

    /// Queue the edges leaving `node` in walk direction, sorted by ID.
    fn expand(&mut self, node: NodeIndex) {
        let mut edges: Vec<(DependencyId, NodeIndex)> = self
            .graph
            .edges_directed(node, self.petgraph_direction())
            .map(|edge| {
                let next = match self.direction {
                    ChainDirection::Forward => edge.target(),
                    ChainDirection::Backward => edge.source(),
                };
                (*edge.weight(), next)
            })
            .collect();
        edges.sort_unstable_by_key(|(id, _)| *id);

        for (id, next) in edges {
            self.pending.push_back(id);
            if self.visited.insert(next) {
                self.queue.push_back(next);
            }
        }
    }
}

impl<'a> Iterator for ChainWalk<'a> {
    type Item = &'a Dependency;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(id) = self.pending.pop_front() {
                if let Some(dep) = self.dependencies.get(&id) {
                    return Some(dep);
                }
                continue;
            }
            let node = self.queue.pop_front()?;
            self.expand(node);
        }
    }
}
