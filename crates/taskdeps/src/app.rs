//! Application context for CLI command execution.
//!
//! # Example
//!
//! ```no_run
//! use taskdeps::app::App;
//! use std::path::Path;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let app = App::from_directory(Path::new(".")).await?;
//!     let tasks = app.storage().list_tasks(None).await?;
//!     println!("{} tasks", tasks.len());
//!     Ok(())
//! }
//! ```

use crate::commands::init::{CONFIG_FILE_NAME, TASKDEPS_DIR_NAME, find_taskdeps_root};
use crate::config::TaskdepsConfig;
use crate::error::{ConfigError, Result};
use crate::storage::{DependencyStorage, create_storage};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Application context: a loaded workspace and its storage.
///
/// Storage is held as `Arc<dyn DependencyStorage>` so the same handle can be
/// shared with long-running consumers such as the HTTP server.
#[derive(Clone)]
pub struct App {
    storage: Arc<dyn DependencyStorage>,
    root_dir: PathBuf,
    config: TaskdepsConfig,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("root_dir", &self.root_dir)
            .field("config", &self.config)
            .field("storage", &"<dyn DependencyStorage>")
            .finish()
    }
}

impl App {
    /// Create an App instance from the given working directory.
    ///
    /// Searches up the directory tree for `.taskdeps/`, loads the
    /// configuration, and opens storage.
    ///
    /// # Errors
    ///
    /// - `ConfigError::NotInitialized` if no workspace is found
    /// - `ConfigError::Invalid` if the configuration cannot be parsed
    /// - `Error::Io` / `Error::Storage` if storage cannot be opened
    pub async fn from_directory(working_dir: &Path) -> Result<Self> {
        let root_dir = find_taskdeps_root(working_dir).ok_or(ConfigError::NotInitialized)?;
        let config_path = root_dir.join(TASKDEPS_DIR_NAME).join(CONFIG_FILE_NAME);

        let config = TaskdepsConfig::load(&config_path).await?;
        let backend = config.storage.to_backend(&root_dir)?;
        tracing::debug!(root = %root_dir.display(), backend = ?backend, "Loading workspace");
        let storage = create_storage(backend).await?;

        Ok(Self {
            storage: Arc::from(storage),
            root_dir,
            config,
        })
    }

    /// Get the storage.
    pub fn storage(&self) -> &dyn DependencyStorage {
        self.storage.as_ref()
    }

    /// Get a shared handle to the storage.
    pub fn shared_storage(&self) -> Arc<dyn DependencyStorage> {
        Arc::clone(&self.storage)
    }

    /// The loaded configuration.
    pub fn config(&self) -> &TaskdepsConfig {
        &self.config
    }

    /// The directory containing `.taskdeps/`.
    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Save storage state to persistent storage.
    ///
    /// This should be called after any mutating operation.
    pub async fn save(&self) -> Result<()> {
        self.storage.save().await
    }
}
