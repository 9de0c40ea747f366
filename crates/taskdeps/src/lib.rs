//! Taskdeps - a task dependency graph with cycle prevention and
//! status-transition checks.
//!
//! This crate provides both a CLI application and a library. The library
//! holds the dependency graph, evaluates FS/SS/FF/SF constraints against
//! task status changes, and persists everything to a JSONL file.
//!
//! # Example
//!
//! ```
//! use taskdeps::domain::{DependencyType, NewDependency, Task, TaskStatus};
//! use taskdeps::storage::in_memory::new_in_memory_storage;
//!
//! # tokio_test::block_on(async {
//! let storage = new_in_memory_storage();
//! storage.upsert_task(Task::new(1, "Design", TaskStatus::Todo)).await?;
//! storage.upsert_task(Task::new(2, "Build", TaskStatus::Todo)).await?;
//! storage
//!     .insert(NewDependency::new(1, 2, DependencyType::FinishToStart))
//!     .await?;
//!
//! assert!(storage.would_create_cycle(2.into(), 1.into()).await?);
//! let report = storage
//!     .can_transition(2.into(), TaskStatus::InProgress)
//!     .await?;
//! assert!(!report.allowed);
//! # Ok::<(), taskdeps::error::Error>(())
//! # }).unwrap();
//! ```

#![forbid(unsafe_code)]

// Public modules for library usage
pub mod constraints;
pub mod domain;
pub mod error;
pub mod storage;

// Public CLI module (needed by binary)
pub mod app;
pub mod cli;
pub mod output;

// Command implementations
pub mod commands;

pub mod config;
