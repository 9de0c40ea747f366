//! Implementation of the `init` command.
//!
//! Creates the `.taskdeps/` directory with a configuration file, an empty
//! data file, and a `.gitignore`.

use crate::config::{BackendKind, StorageConfig, TaskdepsConfig};
use crate::error::{ConfigError, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Name of the taskdeps directory
pub const TASKDEPS_DIR_NAME: &str = ".taskdeps";

/// Name of the configuration file
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Name of the data file
pub const DATA_FILE_NAME: &str = "dependencies.jsonl";

/// Name of the gitignore file within .taskdeps
pub const GITIGNORE_FILE_NAME: &str = ".gitignore";

/// Maximum directory depth to traverse when searching for the workspace root
pub const MAX_TRAVERSAL_DEPTH: usize = 256;

/// Result of the init command
#[derive(Debug)]
pub struct InitResult {
    /// Path to the created .taskdeps directory
    pub taskdeps_dir: PathBuf,
    /// Path to the created config file
    pub config_file: PathBuf,
    /// Path to the created data file (absent for the memory backend)
    pub data_file: Option<PathBuf>,
    /// Path to the created gitignore file
    pub gitignore_file: PathBuf,
}

/// Initialize a new taskdeps workspace in the given directory.
///
/// # Errors
///
/// - `ConfigError::AlreadyInitialized` if `.taskdeps/` already exists
/// - `Error::Io` if file system operations fail
pub async fn init(base_dir: &Path, backend: BackendKind) -> Result<InitResult> {
    let taskdeps_dir = base_dir.join(TASKDEPS_DIR_NAME);

    if fs::try_exists(&taskdeps_dir).await? {
        return Err(ConfigError::AlreadyInitialized(TASKDEPS_DIR_NAME.to_string()).into());
    }

    fs::create_dir_all(&taskdeps_dir).await?;

    let config_file = taskdeps_dir.join(CONFIG_FILE_NAME);
    let config = TaskdepsConfig {
        storage: StorageConfig {
            backend,
            data_file: format!("{TASKDEPS_DIR_NAME}/{DATA_FILE_NAME}"),
        },
        ..Default::default()
    };
    config.save(&config_file).await?;

    let data_file = match backend {
        BackendKind::Jsonl => {
            let path = taskdeps_dir.join(DATA_FILE_NAME);
            fs::write(&path, "").await?;
            Some(path)
        }
        BackendKind::Memory => None,
    };

    let gitignore_file = taskdeps_dir.join(GITIGNORE_FILE_NAME);
    let gitignore_content = "\
# Interrupted saves leave a temporary file behind
*.tmp
";
    fs::write(&gitignore_file, gitignore_content).await?;

    tracing::info!(path = %taskdeps_dir.display(), "Initialized taskdeps workspace");

    Ok(InitResult {
        taskdeps_dir,
        config_file,
        data_file,
        gitignore_file,
    })
}

/// Check if a directory has been initialized with taskdeps.
pub fn is_initialized(base_dir: &Path) -> bool {
    base_dir.join(TASKDEPS_DIR_NAME).is_dir()
}

/// Find the workspace root by searching up the directory tree.
///
/// Returns the directory containing `.taskdeps/`, or `None` if the
/// filesystem root or the depth limit is reached first.
pub fn find_taskdeps_root(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();
    let mut depth = 0;

    loop {
        if is_initialized(&current) {
            return Some(current);
        }

        depth += 1;
        if depth > MAX_TRAVERSAL_DEPTH || !current.pop() {
            return None;
        }
    }
}
