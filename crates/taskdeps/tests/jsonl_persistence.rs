//! Integration tests for JSONL persistence and resilient loading.
//!
//! # Test Coverage
//!
//! - Round trip through `save_to_jsonl` / `load_from_jsonl`
//! - Malformed lines, orphaned edges and cyclic edges in hand-edited files
//! - The JSONL-backed storage created by `create_storage`

use chrono::Utc;
use std::io::Write;
use taskdeps::domain::{ChainDirection, DependencyType, NewDependency, TaskId};
use taskdeps::storage::in_memory::{
    LoadWarning, load_from_jsonl, new_in_memory_storage, save_to_jsonl,
};
use taskdeps::storage::{DependencyStorage, StorageBackend, create_storage};
use tempfile::{NamedTempFile, TempDir};

mod common;
use common::seed_tasks;

// =============================================================================
// Test Helpers
// =============================================================================

fn create_temp_jsonl_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write to temp file");
    file.flush().expect("Failed to flush temp file");
    file
}

fn task_line(id: u64) -> String {
    format!(
        r#"{{"kind":"task","id":{id},"title":"Task {id}","status":"todo","updated_at":"{}"}}"#,
        Utc::now().to_rfc3339()
    )
}

fn edge_line(id: u64, predecessor: u64, successor: u64, active: bool) -> String {
    let now = Utc::now().to_rfc3339();
    format!(
        r#"{{"kind":"dependency","id":{id},"predecessor_id":{predecessor},"successor_id":{successor},"dep_type":"FS","lag_hours":0,"is_active":{active},"created_at":"{now}","updated_at":"{now}"}}"#
    )
}

// =============================================================================
// Round Trip
// =============================================================================

#[tokio::test]
async fn test_save_and_load_round_trip() {
    let storage = new_in_memory_storage();
    seed_tasks(storage.as_ref(), 3).await;
    let first = storage
        .insert(NewDependency::new(1, 2, DependencyType::FinishToStart).with_lag(4))
        .await
        .unwrap();
    storage
        .insert(NewDependency::new(2, 3, DependencyType::StartToStart))
        .await
        .unwrap();
    storage.deactivate(first.id, None).await.unwrap();

    let file = NamedTempFile::new().unwrap();
    save_to_jsonl(storage.as_ref(), file.path()).await.unwrap();

    let (loaded, warnings) = load_from_jsonl(file.path()).await.unwrap();
    assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
    assert_eq!(
        loaded.export_all().await.unwrap(),
        storage.export_all().await.unwrap()
    );
}

#[tokio::test]
async fn test_loaded_storage_continues_id_sequence() {
    let content = [task_line(1), task_line(2), task_line(3), edge_line(9, 1, 2, true)]
        .join("\n");
    let file = create_temp_jsonl_file(&content);

    let (loaded, _) = load_from_jsonl(file.path()).await.unwrap();
    let dep = loaded
        .insert(NewDependency::new(2, 3, DependencyType::FinishToStart))
        .await
        .unwrap();
    assert_eq!(dep.id.get(), 10);
}

// =============================================================================
// Resilient Loading
// =============================================================================

#[tokio::test]
async fn test_malformed_lines_are_skipped() {
    let content = [
        task_line(1),
        "{not json".to_string(),
        task_line(2),
        String::new(),
        edge_line(1, 1, 2, true),
    ]
    .join("\n");
    let file = create_temp_jsonl_file(&content);

    let (loaded, warnings) = load_from_jsonl(file.path()).await.unwrap();

    assert_eq!(warnings.len(), 1);
    assert!(matches!(
        warnings[0],
        LoadWarning::MalformedJson { line_number: 2, .. }
    ));
    assert_eq!(loaded.list_tasks(None).await.unwrap().len(), 2);
    assert_eq!(loaded.find_by_predecessor(TaskId(1)).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_orphaned_edge_is_skipped() {
    let content = [task_line(1), edge_line(1, 1, 99, true)].join("\n");
    let file = create_temp_jsonl_file(&content);

    let (loaded, warnings) = load_from_jsonl(file.path()).await.unwrap();

    assert!(matches!(
        warnings.as_slice(),
        [LoadWarning::OrphanedDependency { .. }]
    ));
    assert!(loaded.export_all().await.unwrap().dependencies.is_empty());
}

#[tokio::test]
async fn test_cyclic_edge_is_loaded_inactive() {
    let content = [
        task_line(1),
        task_line(2),
        task_line(3),
        edge_line(1, 1, 2, true),
        edge_line(2, 2, 3, true),
        edge_line(3, 3, 1, true),
    ]
    .join("\n");
    let file = create_temp_jsonl_file(&content);

    let (loaded, warnings) = load_from_jsonl(file.path()).await.unwrap();

    assert!(matches!(
        warnings.as_slice(),
        [LoadWarning::CircularDependency { .. }]
    ));
    let closing = loaded
        .get_dependency(3.into())
        .await
        .unwrap()
        .expect("edge should be kept");
    assert!(!closing.is_active);

    // The walk sees only the two surviving edges
    let walked = loaded.walk(TaskId(1), ChainDirection::Forward).await.unwrap();
    assert_eq!(walked.len(), 2);
}

#[tokio::test]
async fn test_duplicate_active_edge_is_loaded_inactive() {
    let content = [
        task_line(1),
        task_line(2),
        edge_line(1, 1, 2, true),
        edge_line(2, 1, 2, true),
    ]
    .join("\n");
    let file = create_temp_jsonl_file(&content);

    let (loaded, warnings) = load_from_jsonl(file.path()).await.unwrap();

    assert!(matches!(
        warnings.as_slice(),
        [LoadWarning::DuplicateDependency { .. }]
    ));
    let second = loaded.get_dependency(2.into()).await.unwrap().unwrap();
    assert!(!second.is_active);
}

#[tokio::test]
async fn test_inactive_cycle_edge_loads_without_warning() {
    let content = [
        task_line(1),
        task_line(2),
        edge_line(1, 1, 2, true),
        edge_line(2, 2, 1, false),
    ]
    .join("\n");
    let file = create_temp_jsonl_file(&content);

    let (_, warnings) = load_from_jsonl(file.path()).await.unwrap();
    assert!(warnings.is_empty());
}

// =============================================================================
// JSONL Backend
// =============================================================================

#[tokio::test]
async fn test_jsonl_backend_save_and_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("dependencies.jsonl");

    let storage = create_storage(StorageBackend::Jsonl(path.clone()))
        .await
        .unwrap();
    seed_tasks(storage.as_ref(), 2).await;
    storage
        .insert(NewDependency::new(1, 2, DependencyType::FinishToFinish))
        .await
        .unwrap();
    storage.save().await.unwrap();

    let reopened = create_storage(StorageBackend::Jsonl(path)).await.unwrap();
    let deps = reopened.find_by_successor(TaskId(2)).await.unwrap();
    assert_eq!(deps.len(), 1);
    assert_eq!(deps[0].dep_type, DependencyType::FinishToFinish);
}

#[tokio::test]
async fn test_jsonl_backend_reload_discards_unsaved_changes() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("dependencies.jsonl");

    let storage = create_storage(StorageBackend::Jsonl(path)).await.unwrap();
    seed_tasks(storage.as_ref(), 2).await;
    storage.save().await.unwrap();

    storage
        .insert(NewDependency::new(1, 2, DependencyType::FinishToStart))
        .await
        .unwrap();
    storage.reload().await.unwrap();

    assert!(storage.find_by_predecessor(TaskId(1)).await.unwrap().is_empty());
    assert_eq!(storage.list_tasks(None).await.unwrap().len(), 2);
}
