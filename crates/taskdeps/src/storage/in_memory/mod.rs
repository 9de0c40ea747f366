//! In-memory storage backend using HashMap and petgraph.
//!
//! All data is held in RAM and **lost when the process exits** unless it is
//! persisted with [`save_to_jsonl`] (or through the JSONL-backed storage
//! created by [`create_storage`](crate::storage::create_storage)).
//!
//! # Architecture
//!
//! - `HashMap<TaskId, Task>` for task snapshots
//! - `BTreeMap<DependencyId, Dependency>` for every edge ever created, active or not
//! - `petgraph::DiGraph<TaskId, DependencyId>` indexing the **active** edges only
//! - `HashMap<TaskId, NodeIndex>` mapping tasks to graph nodes
//!
//! ## Edge Direction
//!
//! Graph edges point from **predecessor to successor**, the same direction as
//! the dependency itself. The edge weight is the [`DependencyId`], so the full
//! record is always read from the map. Deactivating an edge removes it from
//! the graph; reactivating re-adds it after the cycle check.
//!
//! # Thread Safety
//!
//! The state lives behind one `Arc<tokio::sync::Mutex<_>>`. Every operation
//! holds the lock for its whole check-then-write sequence, so two concurrent
//! inserts of complementary edges can never both pass the cycle check.
//!
//! [`DependencyId`]: crate::domain::DependencyId

mod graph;
mod inner;
mod jsonl;
mod trait_impl;

use crate::storage::DependencyStorage;
use inner::InMemoryStorageInner;
use std::sync::Arc;
use tokio::sync::Mutex;

pub use graph::ChainWalk;
pub use jsonl::{LoadWarning, load_from_jsonl, save_to_jsonl};
pub(crate) use jsonl::read_state;

/// Thread-safe in-memory storage.
///
/// Cloning yields another handle to the same state.
#[derive(Clone, Default)]
pub struct InMemoryStorage {
    state: Arc<Mutex<InMemoryStorageInner>>,
}

impl InMemoryStorage {
    /// Create an empty storage instance.
    pub fn new() -> Self {
        Self::default()
    }

    fn from_state(state: InMemoryStorageInner) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Swap in freshly loaded state, discarding the current contents.
    pub(crate) async fn replace_state(&self, state: InMemoryStorageInner) {
        *self.state.lock().await = state;
    }

    /// Discard all contents.
    pub(crate) async fn clear(&self) {
        self.replace_state(InMemoryStorageInner::default()).await;
    }
}

impl std::fmt::Debug for InMemoryStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryStorage").finish_non_exhaustive()
    }
}

/// Create a new in-memory storage instance.
///
/// # Example
///
/// ```
/// use taskdeps::storage::in_memory::new_in_memory_storage;
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let storage = new_in_memory_storage();
///     assert!(storage.list_tasks(None).await.unwrap().is_empty());
/// }
/// ```
pub fn new_in_memory_storage() -> Box<dyn DependencyStorage> {
    Box::new(InMemoryStorage::new())
}
