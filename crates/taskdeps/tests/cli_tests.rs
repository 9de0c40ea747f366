//! Integration tests for the taskdeps CLI.
//!
//! These tests run the compiled binary against a temporary workspace.

use rstest::{fixture, rstest};
use tempfile::TempDir;

mod common;
use common::run_taskdeps_in_dir;

// ============================================================================
// Test Fixtures
// ============================================================================

/// Provides a fresh temporary directory for each test
#[fixture]
fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp directory")
}

/// Provides an initialized workspace holding tasks 1, 2 and 3
#[fixture]
fn seeded_dir() -> TempDir {
    let temp = TempDir::new().expect("Failed to create temp directory");
    let output = run_taskdeps_in_dir(temp.path(), &["init", "--quiet"]);
    assert!(
        output.status.success(),
        "Failed to initialize taskdeps: {:?}",
        String::from_utf8_lossy(&output.stderr)
    );
    for (id, title) in [("1", "Design"), ("2", "Build"), ("3", "Ship")] {
        let output = run_taskdeps_in_dir(temp.path(), &["task", "add", id, "--title", title]);
        assert!(output.status.success());
    }
    temp
}

fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

// ============================================================================
// Help and Init
// ============================================================================

#[test]
fn test_cli_help_shows_all_commands() {
    let dir = TempDir::new().unwrap();
    let output = run_taskdeps_in_dir(dir.path(), &["--help"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for command in ["init", "task", "dep", "chain", "check-cycle", "validate"] {
        assert!(stdout.contains(command), "Help should show '{command}'");
    }
}

#[rstest]
fn test_cli_init_creates_workspace(temp_dir: TempDir) {
    let output = run_taskdeps_in_dir(temp_dir.path(), &["init"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Initialized taskdeps"));
    assert!(temp_dir.path().join(".taskdeps/config.yaml").is_file());
    assert!(temp_dir.path().join(".taskdeps/dependencies.jsonl").is_file());
}

#[rstest]
fn test_cli_init_twice_fails(temp_dir: TempDir) {
    assert!(run_taskdeps_in_dir(temp_dir.path(), &["init"]).status.success());

    let output = run_taskdeps_in_dir(temp_dir.path(), &["init"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("already initialized"));
}

#[rstest]
fn test_cli_requires_workspace(temp_dir: TempDir) {
    let output = run_taskdeps_in_dir(temp_dir.path(), &["chain", "1"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Not a taskdeps workspace"));
}

// ============================================================================
// Dependency Commands
// ============================================================================

#[rstest]
fn test_cli_dep_add_persists(seeded_dir: TempDir) {
    let output = run_taskdeps_in_dir(seeded_dir.path(), &["dep", "add", "1", "2", "--lag", "4"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Added dependency #1"));

    let output = run_taskdeps_in_dir(seeded_dir.path(), &["--json", "dep", "show", "1"]);
    let dep = stdout_json(&output);
    assert_eq!(dep["predecessor_id"], 1);
    assert_eq!(dep["successor_id"], 2);
    assert_eq!(dep["dep_type"], "FS");
    assert_eq!(dep["lag_hours"], 4);
}

#[rstest]
fn test_cli_dep_add_rejects_cycle(seeded_dir: TempDir) {
    assert!(run_taskdeps_in_dir(seeded_dir.path(), &["dep", "add", "1", "2"]).status.success());
    assert!(run_taskdeps_in_dir(seeded_dir.path(), &["dep", "add", "2", "3"]).status.success());

    let output = run_taskdeps_in_dir(seeded_dir.path(), &["dep", "add", "3", "1"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Circular dependency"));
}

#[rstest]
fn test_cli_dep_add_rejects_duplicate(seeded_dir: TempDir) {
    assert!(run_taskdeps_in_dir(seeded_dir.path(), &["dep", "add", "1", "2"]).status.success());

    let output = run_taskdeps_in_dir(seeded_dir.path(), &["dep", "add", "1", "2"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("already exists"));

    // A different type is a different edge
    let output = run_taskdeps_in_dir(seeded_dir.path(), &["dep", "add", "1", "2", "-t", "SS"]);
    assert!(output.status.success());
}

#[rstest]
fn test_cli_dep_rm_then_readd(seeded_dir: TempDir) {
    assert!(run_taskdeps_in_dir(seeded_dir.path(), &["dep", "add", "1", "2"]).status.success());

    let output = run_taskdeps_in_dir(seeded_dir.path(), &["dep", "rm", "1", "--actor", "alice"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Deactivated dependency #1"));

    assert!(run_taskdeps_in_dir(seeded_dir.path(), &["dep", "add", "1", "2"]).status.success());

    let output = run_taskdeps_in_dir(
        seeded_dir.path(),
        &["--json", "dep", "list", "1", "-d", "successor"],
    );
    let deps = stdout_json(&output);
    assert_eq!(deps["count"], 1);
    assert_eq!(deps["data"][0]["id"], 2);
}

#[rstest]
fn test_cli_dep_update_requires_a_change(seeded_dir: TempDir) {
    assert!(run_taskdeps_in_dir(seeded_dir.path(), &["dep", "add", "1", "2"]).status.success());

    let output = run_taskdeps_in_dir(seeded_dir.path(), &["dep", "update", "1"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Nothing to update"));

    let output = run_taskdeps_in_dir(
        seeded_dir.path(),
        &["--json", "dep", "update", "1", "--type", "FF", "--lag", "-2"],
    );
    assert!(output.status.success());
    let dep = stdout_json(&output);
    assert_eq!(dep["dep_type"], "FF");
    assert_eq!(dep["lag_hours"], -2);
}

// ============================================================================
// Graph Commands
// ============================================================================

#[rstest]
fn test_cli_chain_forward(seeded_dir: TempDir) {
    assert!(run_taskdeps_in_dir(seeded_dir.path(), &["dep", "add", "1", "2"]).status.success());
    assert!(run_taskdeps_in_dir(seeded_dir.path(), &["dep", "add", "2", "3"]).status.success());

    let output = run_taskdeps_in_dir(seeded_dir.path(), &["--json", "chain", "1"]);
    assert!(output.status.success());
    let chain = stdout_json(&output);
    assert_eq!(chain["direction"], "forward");
    assert_eq!(chain["count"], 2);
    assert_eq!(chain["data"][1]["successor_id"], 3);
}

#[rstest]
#[case::closes_loop("3", "1", true)]
#[case::same_task("2", "2", true)]
#[case::parallel_branch("1", "3", false)]
fn test_cli_check_cycle(
    seeded_dir: TempDir,
    #[case] predecessor: &str,
    #[case] successor: &str,
    #[case] expected: bool,
) {
    assert!(run_taskdeps_in_dir(seeded_dir.path(), &["dep", "add", "1", "2"]).status.success());
    assert!(run_taskdeps_in_dir(seeded_dir.path(), &["dep", "add", "2", "3"]).status.success());

    let output = run_taskdeps_in_dir(
        seeded_dir.path(),
        &["--json", "check-cycle", predecessor, successor],
    );
    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["has_circular"], expected);
}

// ============================================================================
// Status Commands
// ============================================================================

#[rstest]
fn test_cli_validate_reports_violation(seeded_dir: TempDir) {
    assert!(run_taskdeps_in_dir(seeded_dir.path(), &["dep", "add", "1", "2"]).status.success());

    let output = run_taskdeps_in_dir(seeded_dir.path(), &["validate", "2", "in_progress"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("blocked"));
    assert!(stdout.contains("must be done before this task can start"));
}

#[rstest]
fn test_cli_status_blocked_then_allowed(seeded_dir: TempDir) {
    assert!(run_taskdeps_in_dir(seeded_dir.path(), &["dep", "add", "1", "2"]).status.success());

    let output = run_taskdeps_in_dir(seeded_dir.path(), &["task", "status", "2", "in_progress"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("dependency violation"));

    let output = run_taskdeps_in_dir(seeded_dir.path(), &["task", "status", "1", "done"]);
    assert!(output.status.success());

    let output = run_taskdeps_in_dir(seeded_dir.path(), &["task", "status", "2", "in_progress"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("is now in_progress"));
}

#[rstest]
fn test_cli_status_force_overrides(seeded_dir: TempDir) {
    assert!(run_taskdeps_in_dir(seeded_dir.path(), &["dep", "add", "1", "2"]).status.success());

    let output = run_taskdeps_in_dir(
        seeded_dir.path(),
        &["--json", "task", "status", "2", "done", "--force"],
    );
    assert!(output.status.success());
    let outcome = stdout_json(&output);
    assert_eq!(outcome["overridden"], true);
    assert_eq!(outcome["task"]["status"], "done");
}
