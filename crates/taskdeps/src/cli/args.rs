//! CLI argument structs for all commands.
//!
//! Each command has its own argument struct with clap derive attributes
//! for parsing and validation.

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};

use super::types::{
    BackendArg, ChainDirectionArg, DependencyTypeArg, EdgeDirectionArg, TaskStatusArg,
};
use super::validators::{parse_metadata, parse_timestamp, validate_lag, validate_title};
use crate::domain::Metadata;

/// Arguments for the `init` command
#[derive(Parser, Debug, Clone)]
pub struct InitArgs {
    /// Storage backend written to the configuration
    #[arg(short, long, value_enum, default_value = "jsonl")]
    pub backend: BackendArg,

    /// Suppress output messages
    #[arg(short, long)]
    pub quiet: bool,
}

/// Arguments for the `task` command
#[derive(Parser, Debug, Clone)]
pub struct TaskArgs {
    /// Task subcommand
    #[command(subcommand)]
    pub action: TaskAction,
}

/// Task snapshot actions
#[derive(Subcommand, Debug, Clone)]
pub enum TaskAction {
    /// Register or replace a task snapshot
    ///
    /// The status is recorded as given; use `task status` for a
    /// dependency-checked transition.
    Add {
        /// Task ID from the owning system
        id: u64,

        /// Task title
        #[arg(long, value_parser = validate_title)]
        title: String,

        /// Current status
        #[arg(short, long, value_enum, default_value = "todo")]
        status: TaskStatusArg,

        /// Owning project ID
        #[arg(short, long)]
        project: Option<u64>,

        /// Planned start (RFC 3339 or YYYY-MM-DD)
        #[arg(long, value_parser = parse_timestamp)]
        start: Option<DateTime<Utc>>,

        /// Planned due date (RFC 3339 or YYYY-MM-DD)
        #[arg(long, value_parser = parse_timestamp)]
        due: Option<DateTime<Utc>>,
    },

    /// List task snapshots
    List {
        /// Only tasks of this project
        #[arg(short, long)]
        project: Option<u64>,
    },

    /// Show a task with its direct dependencies
    Show {
        /// Task ID
        id: u64,
    },

    /// Change a task's status, enforcing its dependencies
    Status {
        /// Task ID
        id: u64,

        /// New status
        #[arg(value_enum)]
        status: TaskStatusArg,

        /// Apply the change even if dependencies are unmet
        #[arg(short, long)]
        force: bool,
    },
}

/// Arguments for the `dep` command
#[derive(Parser, Debug, Clone)]
pub struct DepArgs {
    /// Dependency subcommand
    #[command(subcommand)]
    pub action: DepAction,
}

/// Dependency management actions
#[derive(Subcommand, Debug, Clone)]
pub enum DepAction {
    /// Add a dependency
    Add {
        /// Predecessor task (must reach a state first)
        predecessor: u64,

        /// Successor task (gated by the predecessor)
        successor: u64,

        /// Dependency type
        #[arg(short = 't', long = "type", value_enum, default_value = "FS")]
        dep_type: DependencyTypeArg,

        /// Lag in hours (negative for lead time)
        #[arg(short, long, default_value = "0", value_parser = validate_lag, allow_hyphen_values = true)]
        lag: i32,

        /// Metadata as a JSON object
        #[arg(short, long, value_parser = parse_metadata)]
        metadata: Option<Metadata>,

        /// Acting user recorded on the edge
        #[arg(long, env = "TASKDEPS_ACTOR")]
        actor: Option<String>,
    },

    /// Change a dependency's type, lag, metadata or active flag
    Update {
        /// Dependency ID
        id: u64,

        /// New dependency type
        #[arg(short = 't', long = "type", value_enum)]
        dep_type: Option<DependencyTypeArg>,

        /// New lag in hours
        #[arg(short, long, value_parser = validate_lag, allow_hyphen_values = true)]
        lag: Option<i32>,

        /// Replacement metadata as a JSON object
        #[arg(short, long, value_parser = parse_metadata)]
        metadata: Option<Metadata>,

        /// Activate (true) or deactivate (false)
        #[arg(long)]
        active: Option<bool>,

        /// Acting user recorded on the edge
        #[arg(long, env = "TASKDEPS_ACTOR")]
        actor: Option<String>,
    },

    /// Deactivate a dependency (kept for audit)
    #[command(alias = "remove")]
    Rm {
        /// Dependency ID
        id: u64,

        /// Acting user recorded on the edge
        #[arg(long, env = "TASKDEPS_ACTOR")]
        actor: Option<String>,
    },

    /// Show one dependency
    Show {
        /// Dependency ID
        id: u64,
    },

    /// List active dependencies of a task
    List {
        /// Task ID
        task: u64,

        /// Which side of the task to list
        #[arg(short, long, value_enum, default_value = "both")]
        direction: EdgeDirectionArg,
    },

    /// List dependencies touching any task of a project
    Project {
        /// Project ID
        project: u64,

        /// Include deactivated dependencies
        #[arg(long)]
        include_inactive: bool,
    },
}

/// Arguments for the `chain` command
#[derive(Parser, Debug, Clone)]
pub struct ChainArgs {
    /// Task to start from
    pub task: u64,

    /// Walk direction
    #[arg(short, long, value_enum, default_value = "forward")]
    pub direction: ChainDirectionArg,
}

/// Arguments for the `check-cycle` command
#[derive(Parser, Debug, Clone)]
pub struct CheckCycleArgs {
    /// Proposed predecessor
    pub predecessor: u64,

    /// Proposed successor
    pub successor: u64,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug, Clone)]
pub struct ValidateArgs {
    /// Task ID
    pub task: u64,

    /// Proposed status
    #[arg(value_enum)]
    pub status: TaskStatusArg,
}
