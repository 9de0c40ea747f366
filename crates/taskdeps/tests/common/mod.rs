//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use taskdeps::domain::{Task, TaskStatus};
use taskdeps::storage::DependencyStorage;

/// Path of the compiled taskdeps binary
pub fn taskdeps_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_taskdeps"))
}

/// Run the taskdeps binary in the specified directory
pub fn run_taskdeps_in_dir(dir: &Path, args: &[&str]) -> Output {
    Command::new(taskdeps_binary())
        .args(args)
        .current_dir(dir)
        .env("NO_COLOR", "1")
        .env_remove("TASKDEPS_ACTOR")
        .output()
        .expect("Failed to execute taskdeps binary")
}

/// Register tasks `1..=count`, all in `todo`
pub async fn seed_tasks(storage: &dyn DependencyStorage, count: u64) {
    for id in 1..=count {
        storage
            .upsert_task(Task::new(id, format!("Task {id}"), TaskStatus::Todo))
            .await
            .expect("Failed to seed task");
    }
}
