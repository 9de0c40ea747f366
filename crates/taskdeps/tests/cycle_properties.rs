//! Property tests: no sequence of inserts can leave a cycle among active edges.

use petgraph::algo::is_cyclic_directed;
use petgraph::graphmap::DiGraphMap;
use proptest::prelude::*;
use taskdeps::domain::{DependencyType, NewDependency, TaskId};
use taskdeps::error::Error;
use taskdeps::storage::DependencyStorage;
use taskdeps::storage::in_memory::new_in_memory_storage;

mod common;
use common::seed_tasks;

const TASKS: u64 = 8;

fn edge_strategy() -> impl Strategy<Value = Vec<(u64, u64)>> {
    prop::collection::vec((1..=TASKS, 1..=TASKS), 0..40)
}

/// Insert every proposed edge, returning the accepted ones and whether the
/// store's cycle answer matched each rejection.
fn run_inserts(edges: &[(u64, u64)]) -> (Vec<(u64, u64)>, bool) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime");

    runtime.block_on(async {
        let storage = new_in_memory_storage();
        seed_tasks(storage.as_ref(), TASKS).await;

        let mut accepted = Vec::new();
        let mut consistent = true;
        for &(p, s) in edges {
            let predicted = storage
                .would_create_cycle(TaskId(p), TaskId(s))
                .await
                .expect("known tasks");
            match storage
                .insert(NewDependency::new(p, s, DependencyType::FinishToStart))
                .await
            {
                Ok(_) => {
                    consistent &= !predicted;
                    accepted.push((p, s));
                }
                Err(Error::CircularDependency { .. } | Error::SelfReference(_)) => {
                    consistent &= predicted;
                }
                Err(Error::DuplicateEdge { .. }) => {}
                Err(other) => panic!("unexpected error: {other}"),
            }
        }
        (accepted, consistent)
    })
}

proptest! {
    #[test]
    fn prop_accepted_edges_stay_acyclic(edges in edge_strategy()) {
        let (accepted, _) = run_inserts(&edges);

        let graph: DiGraphMap<u64, ()> = accepted.iter().copied().collect();
        prop_assert!(!is_cyclic_directed(&graph));
    }

    #[test]
    fn prop_cycle_check_agrees_with_insert(edges in edge_strategy()) {
        let (_, consistent) = run_inserts(&edges);
        prop_assert!(consistent);
    }

    #[test]
    fn prop_self_edge_always_cycles(id in 1..=TASKS, edges in edge_strategy()) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .expect("runtime");
        let answer = runtime.block_on(async {
            let storage = new_in_memory_storage();
            seed_tasks(storage.as_ref(), TASKS).await;
            for (p, s) in edges {
                let _ = storage
                    .insert(NewDependency::new(p, s, DependencyType::FinishToStart))
                    .await;
            }
            storage.would_create_cycle(TaskId(id), TaskId(id)).await
        });
        prop_assert!(answer.expect("known task"));
    }
}
