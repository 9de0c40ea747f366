//! CLI argument parsing and command dispatch.
//!
//! This module provides the command-line interface for taskdeps using clap's derive API.
//!
//! # Commands
//!
//! - `init`: Initialize a new taskdeps workspace
//! - `task`: Sync task snapshots and change statuses
//! - `dep`: Add, update, deactivate and list dependencies
//! - `chain`: Walk the transitive dependency chain of a task
//! - `check-cycle`: Ask whether a proposed edge would close a cycle
//! - `validate`: Evaluate a status change without applying it
//!
//! # Global Flags
//!
//! - `--json`: Output in JSON format (applies to all commands)
//!
//! # Example
//!
//! ```bash
//! taskdeps task add 1 --title "Design schema"
//! taskdeps task add 2 --title "Write migration"
//! taskdeps dep add 1 2 --type FS --lag 4
//! taskdeps validate 2 in_progress
//! taskdeps chain 1 --direction forward
//! ```

mod args;
mod execute;
mod types;
mod validators;

use anyhow::Result;
use clap::{Parser, Subcommand};

pub use args::{
    ChainArgs, CheckCycleArgs, DepAction, DepArgs, InitArgs, TaskAction, TaskArgs, ValidateArgs,
};
pub use types::{
    BackendArg, ChainDirectionArg, DependencyTypeArg, EdgeDirectionArg, TaskStatusArg,
};
pub use validators::{parse_metadata, parse_timestamp, validate_lag, validate_title};

/// Taskdeps - task dependency graph with cycle prevention
///
/// Track FS/SS/FF/SF dependencies between tasks, reject cycles, and check
/// status changes against them. Data lives in `.taskdeps/dependencies.jsonl`.
#[derive(Parser, Debug)]
#[command(name = "taskdeps")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output in JSON format for programmatic use
    #[arg(long, global = true)]
    pub json: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Initialize a new taskdeps workspace
    ///
    /// Creates the `.taskdeps/` directory with configuration and an empty data file.
    Init(InitArgs),

    /// Manage task snapshots
    ///
    /// Tasks are owned by another system; this keeps the copy dependencies are checked against.
    Task(TaskArgs),

    /// Manage dependencies between tasks
    Dep(DepArgs),

    /// Show the transitive dependency chain of a task
    ///
    /// Forward lists everything downstream; backward lists everything upstream.
    Chain(ChainArgs),

    /// Check whether adding a dependency would create a cycle
    CheckCycle(CheckCycleArgs),

    /// Check whether a task may move to a status
    ///
    /// Reports blocking violations and non-blocking warnings without changing anything.
    Validate(ValidateArgs),
}

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        <Self as Parser>::parse()
    }

    /// Parse CLI arguments from an iterator (for testing)
    pub fn try_parse_from<I, T>(iter: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(iter)
    }

    /// Execute the CLI command
    pub async fn execute(&self) -> Result<()> {
        use crate::app::App;
        use crate::output::OutputMode;

        let output_mode = if self.json {
            OutputMode::Json
        } else {
            OutputMode::Text
        };

        let Some(command) = &self.command else {
            println!("Taskdeps dependency tracker");
            println!("Use --help for more information");
            return Ok(());
        };

        if let Commands::Init(args) = command {
            return execute::execute_init(args, output_mode).await;
        }

        let app = App::from_directory(&std::env::current_dir()?).await?;
        match command {
            Commands::Init(_) => Ok(()),
            Commands::Task(args) => execute::execute_task(&app, args, output_mode).await,
            Commands::Dep(args) => execute::execute_dep(&app, args, output_mode).await,
            Commands::Chain(args) => execute::execute_chain(&app, args, output_mode).await,
            Commands::CheckCycle(args) => {
                execute::execute_check_cycle(&app, args, output_mode).await
            }
            Commands::Validate(args) => execute::execute_validate(&app, args, output_mode).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========== CLI Parsing Tests ==========

    #[test]
    fn test_parse_no_command() {
        let cli = Cli::try_parse_from(["taskdeps"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.json);
    }

    #[test]
    fn test_parse_global_json_flag() {
        let cli = Cli::try_parse_from(["taskdeps", "chain", "3", "--json"]).unwrap();
        assert!(cli.json);
        assert!(matches!(cli.command, Some(Commands::Chain(_))));
    }

    #[test]
    fn test_parse_init_default_backend() {
        let cli = Cli::try_parse_from(["taskdeps", "init"]).unwrap();
        match cli.command {
            Some(Commands::Init(args)) => {
                assert_eq!(args.backend, BackendArg::Jsonl);
                assert!(!args.quiet);
            }
            _ => panic!("Expected Init command"),
        }
    }

    #[test]
    fn test_parse_task_add() {
        let cli = Cli::try_parse_from([
            "taskdeps", "task", "add", "7", "--title", "Write tests", "--status", "review",
            "--project", "2", "--due", "2025-05-01",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Task(TaskArgs {
                action:
                    TaskAction::Add {
                        id,
                        title,
                        status,
                        project,
                        start,
                        due,
                    },
            })) => {
                assert_eq!(id, 7);
                assert_eq!(title, "Write tests");
                assert_eq!(status, TaskStatusArg::Review);
                assert_eq!(project, Some(2));
                assert!(start.is_none());
                assert!(due.is_some());
            }
            _ => panic!("Expected Task Add command"),
        }
    }

    #[test]
    fn test_parse_task_status_force() {
        let cli =
            Cli::try_parse_from(["taskdeps", "task", "status", "2", "in-progress", "--force"])
                .unwrap();
        match cli.command {
            Some(Commands::Task(TaskArgs {
                action: TaskAction::Status { id, status, force },
            })) => {
                assert_eq!(id, 2);
                assert_eq!(status, TaskStatusArg::InProgress);
                assert!(force);
            }
            _ => panic!("Expected Task Status command"),
        }
    }

    #[test]
    fn test_parse_dep_add_defaults() {
        let cli = Cli::try_parse_from(["taskdeps", "dep", "add", "1", "2"]).unwrap();
        match cli.command {
            Some(Commands::Dep(DepArgs {
                action:
                    DepAction::Add {
                        predecessor,
                        successor,
                        dep_type,
                        lag,
                        metadata,
                        ..
                    },
            })) => {
                assert_eq!((predecessor, successor), (1, 2));
                assert_eq!(dep_type, DependencyTypeArg::Fs);
                assert_eq!(lag, 0);
                assert!(metadata.is_none());
            }
            _ => panic!("Expected Dep Add command"),
        }
    }

    #[test]
    fn test_parse_dep_add_negative_lag() {
        let cli = Cli::try_parse_from([
            "taskdeps", "dep", "add", "1", "2", "-t", "ss", "--lag", "-6",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Dep(DepArgs {
                action: DepAction::Add { dep_type, lag, .. },
            })) => {
                assert_eq!(dep_type, DependencyTypeArg::Ss);
                assert_eq!(lag, -6);
            }
            _ => panic!("Expected Dep Add command"),
        }
    }

    #[test]
    fn test_parse_dep_add_rejects_bad_type() {
        let result = Cli::try_parse_from(["taskdeps", "dep", "add", "1", "2", "-t", "XX"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_dep_remove_alias() {
        let cli = Cli::try_parse_from(["taskdeps", "dep", "remove", "4"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Dep(DepArgs {
                action: DepAction::Rm { id: 4, .. }
            }))
        ));
    }

    #[test]
    fn test_parse_dep_update_active_flag() {
        let cli =
            Cli::try_parse_from(["taskdeps", "dep", "update", "4", "--active", "true"]).unwrap();
        match cli.command {
            Some(Commands::Dep(DepArgs {
                action: DepAction::Update { id, active, dep_type, .. },
            })) => {
                assert_eq!(id, 4);
                assert_eq!(active, Some(true));
                assert!(dep_type.is_none());
            }
            _ => panic!("Expected Dep Update command"),
        }
    }

    #[test]
    fn test_parse_chain_backward() {
        let cli = Cli::try_parse_from(["taskdeps", "chain", "3", "-d", "backward"]).unwrap();
        match cli.command {
            Some(Commands::Chain(args)) => {
                assert_eq!(args.task, 3);
                assert_eq!(args.direction, ChainDirectionArg::Backward);
            }
            _ => panic!("Expected Chain command"),
        }
    }

    #[test]
    fn test_parse_check_cycle() {
        let cli = Cli::try_parse_from(["taskdeps", "check-cycle", "3", "1"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::CheckCycle(CheckCycleArgs {
                predecessor: 3,
                successor: 1
            }))
        ));
    }

    #[test]
    fn test_parse_validate_rejects_unknown_status() {
        let result = Cli::try_parse_from(["taskdeps", "validate", "3", "blocked"]);
        assert!(result.is_err());
    }
}
