//! Color and styling helpers for CLI output.
//!
//! Semantic Color Theme:
//!   - Success/Done:  green   (done status, allowed transitions)
//!   - Warning/Active: yellow (in-progress statuses, warnings)
//!   - Error/Blocked: red     (violations, cycles, cancelled)
//!   - Info/Reference: cyan   (task and dependency IDs)
//!   - Muted:         dimmed  (inactive edges, field labels)

use crate::domain::{Dependency, TaskStatus};
use colored::Colorize;

use super::OutputConfig;

/// Apply semantic "success" color (green) to text.
pub fn success(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.green().to_string()
}

/// Apply semantic "error" color (red) to text.
pub fn error(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.red().to_string()
}

/// Apply semantic "warning" color (yellow) to text.
pub fn warning(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.yellow().to_string()
}

/// Apply semantic "info" color (cyan) to text.
pub fn info(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.cyan().to_string()
}

/// Apply dimmed styling to text.
pub(crate) fn dimmed(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.dimmed().to_string()
}

/// Apply bold styling to text.
pub(crate) fn bold(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.bold().to_string()
}

/// Apply color to status text based on task status.
pub(crate) fn colorize_status(status: TaskStatus, config: &OutputConfig) -> String {
    let text = status.to_string();
    if !config.use_colors {
        return text;
    }
    match status {
        TaskStatus::Todo => text.white().to_string(),
        TaskStatus::InProgress | TaskStatus::Review => text.yellow().to_string(),
        TaskStatus::Done => text.green().to_string(),
        TaskStatus::Cancelled => text.red().to_string(),
    }
}

/// Render an edge as `#id  pred --[FS +4h]--> succ`, dimmed when inactive.
pub(crate) fn format_edge(dep: &Dependency, config: &OutputConfig) -> String {
    let lag = match dep.lag_hours {
        0 => String::new(),
        h if h > 0 => format!(" +{h}h"),
        h => format!(" {h}h"),
    };
    let line = format!(
        "{}  {} --[{}{}]--> {}",
        info(&format!("#{}", dep.id), config),
        dep.predecessor_id,
        dep.dep_type,
        lag,
        dep.successor_id
    );
    if dep.is_active {
        line
    } else {
        format!("{} {}", dimmed(&line, config), dimmed("(inactive)", config))
    }
}
