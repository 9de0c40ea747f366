//! Output formatting for CLI commands.
//!
//! This module provides utilities for formatting command output in both
//! human-readable text format and JSON format for programmatic use.
//!
//! Submodules:
//! - [`color`]: Color and styling helpers

pub mod color;

use crate::constraints::{TransitionOutcome, TransitionReport, WarningKind};
use crate::domain::{ChainDirection, Dependency, Task, TaskId};
use serde::Serialize;
use std::env;
use std::io::{self, Write};

pub use color::{error, info, success, warning};

use color::{bold, colorize_status, dimmed, format_edge};

// ============================================================================
// Output Configuration
// ============================================================================

/// Configuration for output formatting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    /// Whether to use colors in output.
    pub use_colors: bool,
}

impl OutputConfig {
    /// Create an OutputConfig by reading from environment variables.
    ///
    /// Reads:
    /// - `NO_COLOR`: Standard env var to disable colors (any value disables colors)
    /// - `TASKDEPS_COLOR`: Set to "0" or "false" to disable colors (default: true)
    pub fn from_env() -> Self {
        // https://no-color.org/
        let use_colors = env::var("NO_COLOR").is_err()
            && env::var("TASKDEPS_COLOR")
                .map(|v| v != "0" && !v.eq_ignore_ascii_case("false"))
                .unwrap_or(true);

        Self { use_colors }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { use_colors: true }
    }
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable text format
    Text,
    /// JSON format for programmatic use
    Json,
}

// ============================================================================
// Public Printers
// ============================================================================

/// Print any serializable value as pretty JSON
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_json(&mut handle, value)
}

/// Print a simple message
pub fn print_message(msg: &str) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{msg}")
}

/// Print a list of tasks in the specified format
pub fn print_tasks(tasks: &[Task], mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match mode {
        OutputMode::Text => write_tasks_text(&mut handle, tasks, &OutputConfig::from_env()),
        OutputMode::Json => write_json(&mut handle, tasks),
    }
}

/// Print a task with its direct predecessors and successors
pub fn print_task_details(
    task: &Task,
    predecessors: &[Dependency],
    successors: &[Dependency],
    mode: OutputMode,
) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match mode {
        OutputMode::Text => write_task_details_text(
            &mut handle,
            task,
            predecessors,
            successors,
            &OutputConfig::from_env(),
        ),
        OutputMode::Json => write_json(
            &mut handle,
            &serde_json::json!({
                "task": task,
                "predecessors": predecessors,
                "successors": successors,
            }),
        ),
    }
}

/// Print a list of dependencies under a heading
pub fn print_dependencies(heading: &str, deps: &[Dependency], mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match mode {
        OutputMode::Text => {
            write_dependencies_text(&mut handle, heading, deps, &OutputConfig::from_env())
        }
        OutputMode::Json => write_json(
            &mut handle,
            &serde_json::json!({ "count": deps.len(), "data": deps }),
        ),
    }
}

/// Print a single dependency
pub fn print_dependency(dep: &Dependency, mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match mode {
        OutputMode::Text => write_dependency_text(&mut handle, dep, &OutputConfig::from_env()),
        OutputMode::Json => write_json(&mut handle, dep),
    }
}

/// Print the transitive chain from a task
pub fn print_chain(
    task: TaskId,
    direction: ChainDirection,
    deps: &[Dependency],
    mode: OutputMode,
) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match mode {
        OutputMode::Text => {
            write_chain_text(&mut handle, task, direction, deps, &OutputConfig::from_env())
        }
        OutputMode::Json => write_json(
            &mut handle,
            &serde_json::json!({
                "task": task,
                "direction": direction,
                "count": deps.len(),
                "data": deps,
            }),
        ),
    }
}

/// Print a transition evaluation
pub fn print_report(report: &TransitionReport, mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match mode {
        OutputMode::Text => write_report_text(&mut handle, report, &OutputConfig::from_env()),
        OutputMode::Json => write_json(&mut handle, report),
    }
}

/// Print the result of an applied status change
pub fn print_outcome(outcome: &TransitionOutcome, mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match mode {
        OutputMode::Text => write_outcome_text(&mut handle, outcome, &OutputConfig::from_env()),
        OutputMode::Json => write_json(&mut handle, outcome),
    }
}

/// Print the answer to a cycle check
pub fn print_cycle_check(
    predecessor: TaskId,
    successor: TaskId,
    has_cycle: bool,
    mode: OutputMode,
) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match mode {
        OutputMode::Text => {
            let config = OutputConfig::from_env();
            if has_cycle {
                writeln!(
                    handle,
                    "{} {predecessor} -> {successor} would create a circular dependency",
                    error("✗", &config)
                )
            } else {
                writeln!(
                    handle,
                    "{} {predecessor} -> {successor} can be added without a cycle",
                    success("✓", &config)
                )
            }
        }
        OutputMode::Json => write_json(
            &mut handle,
            &serde_json::json!({
                "predecessor": predecessor,
                "successor": successor,
                "has_circular": has_cycle,
            }),
        ),
    }
}

// ============================================================================
// Writers
// ============================================================================

fn write_json<W: Write, T: Serialize + ?Sized>(w: &mut W, value: &T) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *w, value)?;
    writeln!(w)
}

fn write_task_line<W: Write>(w: &mut W, task: &Task, config: &OutputConfig) -> io::Result<()> {
    write!(
        w,
        "{}  [{}]  {}",
        info(&task.id.to_string(), config),
        colorize_status(task.status, config),
        task.title
    )?;
    if let Some(project) = task.project_id {
        write!(w, "  {}", dimmed(&format!("project {project}"), config))?;
    }
    writeln!(w)
}

fn write_tasks_text<W: Write>(w: &mut W, tasks: &[Task], config: &OutputConfig) -> io::Result<()> {
    if tasks.is_empty() {
        return writeln!(w, "No tasks found");
    }
    for task in tasks {
        write_task_line(w, task, config)?;
    }
    writeln!(w)?;
    writeln!(w, "{} task(s)", tasks.len())
}

fn write_task_details_text<W: Write>(
    w: &mut W,
    task: &Task,
    predecessors: &[Dependency],
    successors: &[Dependency],
    config: &OutputConfig,
) -> io::Result<()> {
    write_task_line(w, task, config)?;
    if let Some(start) = task.start_date {
        writeln!(w, "  {} {}", dimmed("Start:", config), start.to_rfc3339())?;
    }
    if let Some(due) = task.due_date {
        writeln!(w, "  {} {}", dimmed("Due:  ", config), due.to_rfc3339())?;
    }
    writeln!(w)?;
    write_dependencies_text(w, "Predecessors", predecessors, config)?;
    writeln!(w)?;
    write_dependencies_text(w, "Successors", successors, config)
}

fn write_dependencies_text<W: Write>(
    w: &mut W,
    heading: &str,
    deps: &[Dependency],
    config: &OutputConfig,
) -> io::Result<()> {
    writeln!(w, "{} ({}):", bold(heading, config), deps.len())?;
    if deps.is_empty() {
        return writeln!(w, "  {}", dimmed("(none)", config));
    }
    for dep in deps {
        writeln!(w, "  {}", format_edge(dep, config))?;
    }
    Ok(())
}

fn write_dependency_text<W: Write>(
    w: &mut W,
    dep: &Dependency,
    config: &OutputConfig,
) -> io::Result<()> {
    writeln!(w, "{}", format_edge(dep, config))?;
    writeln!(
        w,
        "  {} {}",
        dimmed("Type:   ", config),
        dep.dep_type.description()
    )?;
    writeln!(w, "  {} {}h", dimmed("Lag:    ", config), dep.lag_hours)?;
    if let Some(actor) = &dep.created_by {
        writeln!(w, "  {} {actor}", dimmed("Created:", config))?;
    }
    if let Some(actor) = &dep.updated_by {
        writeln!(w, "  {} {actor}", dimmed("Updated:", config))?;
    }
    if !dep.metadata.is_empty() {
        let metadata = serde_json::to_string(&dep.metadata)?;
        writeln!(w, "  {} {metadata}", dimmed("Meta:   ", config))?;
    }
    Ok(())
}

fn write_chain_text<W: Write>(
    w: &mut W,
    task: TaskId,
    direction: ChainDirection,
    deps: &[Dependency],
    config: &OutputConfig,
) -> io::Result<()> {
    let arrow = match direction {
        ChainDirection::Forward => "↓",
        ChainDirection::Backward => "↑",
    };
    if deps.is_empty() {
        return writeln!(w, "{arrow} Task {task} has no {direction} chain");
    }
    writeln!(
        w,
        "{arrow} {} chain from task {} ({} dependencies):",
        bold(&capitalize(&direction.to_string()), config),
        info(&task.to_string(), config),
        deps.len()
    )?;
    for dep in deps {
        writeln!(w, "  {}", format_edge(dep, config))?;
    }
    Ok(())
}

fn write_report_text<W: Write>(
    w: &mut W,
    report: &TransitionReport,
    config: &OutputConfig,
) -> io::Result<()> {
    let verdict = if report.allowed {
        success("✓ allowed", config)
    } else {
        error("✗ blocked", config)
    };
    writeln!(
        w,
        "Task {}: {} -> {}  {verdict}",
        info(&report.task_id.to_string(), config),
        colorize_status(report.current_status, config),
        colorize_status(report.proposed_status, config),
    )?;
    for violation in &report.violations {
        writeln!(w, "  {} {}", error("✗", config), violation.reason)?;
    }
    for warn in &report.warnings {
        let label = match warn.kind {
            WarningKind::SuccessorInvalidated => "successor",
            WarningKind::ScheduleConflict => "schedule",
        };
        writeln!(
            w,
            "  {} {} {}",
            warning("!", config),
            dimmed(&format!("[{label}]"), config),
            warn.message
        )?;
    }
    Ok(())
}

fn write_outcome_text<W: Write>(
    w: &mut W,
    outcome: &TransitionOutcome,
    config: &OutputConfig,
) -> io::Result<()> {
    if outcome.overridden {
        writeln!(
            w,
            "{} Forced task {} to {} past {} violation(s)",
            warning("!", config),
            outcome.task.id,
            colorize_status(outcome.task.status, config),
            outcome.report.violations.len()
        )?;
    } else {
        writeln!(
            w,
            "{} Task {} is now {}",
            success("✓", config),
            outcome.task.id,
            colorize_status(outcome.task.status, config)
        )?;
    }
    write_report_text(w, &outcome.report, config)
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::{Violation, Warning};
    use crate::domain::{DependencyId, DependencyType, Metadata, TaskStatus};
    use chrono::Utc;

    fn plain() -> OutputConfig {
        OutputConfig { use_colors: false }
    }

    fn render<F>(f: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> io::Result<()>,
    {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn dep(id: u64, pred: u64, succ: u64) -> Dependency {
        let now = Utc::now();
        Dependency {
            id: DependencyId(id),
            predecessor_id: TaskId(pred),
            successor_id: TaskId(succ),
            dep_type: DependencyType::FinishToStart,
            lag_hours: 0,
            is_active: true,
            metadata: Metadata::new(),
            created_by: Some("ana".to_string()),
            updated_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_tasks_text() {
        let mut task = Task::new(3, "Ship", TaskStatus::InProgress);
        task.project_id = Some(crate::domain::ProjectId(9));

        let out = render(|w| write_tasks_text(w, &[task], &plain()));

        assert!(out.contains("3  [in_progress]  Ship  project 9"));
        assert!(out.contains("1 task(s)"));
    }

    #[test]
    fn test_tasks_text_empty() {
        let out = render(|w| write_tasks_text(w, &[], &plain()));
        assert_eq!(out, "No tasks found\n");
    }

    #[test]
    fn test_chain_text() {
        let deps = vec![dep(1, 1, 2), dep(2, 2, 3)];
        let out = render(|w| {
            write_chain_text(w, TaskId(1), ChainDirection::Forward, &deps, &plain())
        });

        assert!(out.starts_with("↓ Forward chain from task 1 (2 dependencies):"));
        assert!(out.contains("#1  1 --[FS]--> 2"));
        assert!(out.contains("#2  2 --[FS]--> 3"));
    }

    #[test]
    fn test_chain_text_empty() {
        let out = render(|w| {
            write_chain_text(w, TaskId(5), ChainDirection::Backward, &[], &plain())
        });
        assert_eq!(out, "↑ Task 5 has no backward chain\n");
    }

    #[test]
    fn test_report_text_lists_violations_and_warnings() {
        let report = TransitionReport {
            task_id: TaskId(2),
            current_status: TaskStatus::Todo,
            proposed_status: TaskStatus::InProgress,
            allowed: false,
            violations: vec![Violation {
                dependency_id: DependencyId(1),
                predecessor_id: TaskId(1),
                successor_id: TaskId(2),
                dep_type: DependencyType::FinishToStart,
                reason: "Predecessor task 1 (A) must be done".to_string(),
            }],
            warnings: vec![Warning {
                dependency_id: DependencyId(1),
                kind: WarningKind::ScheduleConflict,
                message: "starts too early".to_string(),
            }],
        };

        let out = render(|w| write_report_text(w, &report, &plain()));

        assert!(out.contains("Task 2: todo -> in_progress  ✗ blocked"));
        assert!(out.contains("✗ Predecessor task 1 (A) must be done"));
        assert!(out.contains("! [schedule] starts too early"));
    }

    #[test]
    fn test_dependency_text_shows_description_and_actor() {
        let out = render(|w| write_dependency_text(w, &dep(4, 1, 2), &plain()));
        assert!(out.contains("Finish-to-Start"));
        assert!(out.contains("Created: ana"));
    }

    #[test]
    fn test_json_is_pretty_with_trailing_newline() {
        let out = render(|w| write_json(w, &dep(1, 1, 2)));
        assert!(out.ends_with("}\n"));
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["dep_type"], "FS");
    }
}
