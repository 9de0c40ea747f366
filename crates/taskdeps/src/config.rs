//! Workspace configuration (`.taskdeps/config.yaml`).

use crate::error::{ConfigError, Result};
use crate::storage::StorageBackend;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path};
use tokio::fs;

/// Default data file, relative to the workspace root
pub const DEFAULT_DATA_FILE: &str = ".taskdeps/dependencies.jsonl";

/// Default HTTP bind address
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 3000;

/// Configuration file structure for taskdeps
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct TaskdepsConfig {
    /// Storage configuration
    pub storage: StorageConfig,

    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
}

/// Which storage backend to use
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Ephemeral, nothing written to disk
    Memory,

    /// In-memory with JSONL persistence
    #[default]
    Jsonl,
}

/// Storage configuration section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StorageConfig {
    /// Storage backend type
    pub backend: BackendKind,

    /// Path to the data file, relative to the workspace root
    pub data_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Jsonl,
            data_file: DEFAULT_DATA_FILE.to_string(),
        }
    }
}

impl StorageConfig {
    /// Resolve the configured backend against the workspace root.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if the data file is empty, absolute, or
    /// escapes the workspace root.
    pub fn to_backend(&self, root: &Path) -> Result<StorageBackend> {
        match self.backend {
            BackendKind::Memory => Ok(StorageBackend::InMemory),
            BackendKind::Jsonl => {
                let data_file = Path::new(self.data_file.trim());
                if data_file.as_os_str().is_empty() {
                    return Err(
                        ConfigError::Invalid("storage.data_file cannot be empty".into()).into(),
                    );
                }
                let escapes = data_file
                    .components()
                    .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
                if escapes {
                    return Err(ConfigError::Invalid(format!(
                        "storage.data_file must be a relative path inside the workspace, got '{}'",
                        self.data_file
                    ))
                    .into());
                }
                Ok(StorageBackend::Jsonl(root.join(data_file)))
            }
        }
    }
}

/// HTTP server configuration section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerConfig {
    /// Bind address
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl TaskdepsConfig {
    /// Load configuration from a file
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::Invalid(format!("{}: {e}", path.display())).into())
    }

    /// Save configuration to a file
    pub async fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| ConfigError::Invalid(format!("YAML error: {e}")))?;
        fs::write(path, content).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_config_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut original = TaskdepsConfig::default();
        original.server.port = 8088;
        original.save(&config_path).await.unwrap();

        let loaded = TaskdepsConfig::load(&config_path).await.unwrap();
        assert_eq!(original, loaded);
    }

    #[tokio::test]
    async fn test_config_yaml_format() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        TaskdepsConfig::default().save(&config_path).await.unwrap();

        let content = tokio::fs::read_to_string(&config_path).await.unwrap();
        assert!(content.contains("backend: jsonl"));
        assert!(content.contains("data_file: .taskdeps/dependencies.jsonl"));
        assert!(content.contains("port: 3000"));
    }

    #[test]
    fn test_server_section_is_optional() {
        let yaml = "storage:\n  backend: memory\n  data_file: deps.jsonl\n";
        let config: TaskdepsConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.storage.backend, BackendKind::Memory);
        assert_eq!(config.server, ServerConfig::default());
    }

    #[tokio::test]
    async fn test_load_rejects_garbage() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        tokio::fs::write(&config_path, "storage: [").await.unwrap();

        let err = TaskdepsConfig::load(&config_path).await.unwrap_err();
        assert!(matches!(err, crate::error::Error::Config(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_to_backend_resolves_against_root() {
        let config = StorageConfig::default();
        let backend = config.to_backend(Path::new("/work")).unwrap();
        assert_eq!(
            backend,
            StorageBackend::Jsonl(PathBuf::from("/work/.taskdeps/dependencies.jsonl"))
        );
    }

    #[test]
    fn test_to_backend_memory() {
        let config = StorageConfig {
            backend: BackendKind::Memory,
            data_file: String::new(),
        };
        assert_eq!(
            config.to_backend(Path::new("/work")).unwrap(),
            StorageBackend::InMemory
        );
    }

    #[rstest]
    #[case::empty("")]
    #[case::parent("../outside.jsonl")]
    #[case::absolute("/etc/deps.jsonl")]
    fn test_to_backend_rejects_bad_paths(#[case] data_file: &str) {
        let config = StorageConfig {
            backend: BackendKind::Jsonl,
            data_file: data_file.to_string(),
        };
        assert!(config.to_backend(Path::new("/work")).is_err());
    }
}
