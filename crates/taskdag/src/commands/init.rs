//! Implementation of the `init` command and the `.taskdag/config.yaml` format.
//!
//! `init` creates the `.taskdag/` directory with a config file, an empty
//! task data file and a `.gitignore`. Every other command locates that
//! directory with [`find_taskdag_root`] and reads [`TaskdagConfig`] from it.

use crate::error::{ConfigError, Result};
use crate::storage::StorageBackend;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Default task ID prefix if none specified
pub const DEFAULT_PREFIX: &str = "proj";

/// Name of the taskdag directory
pub const TASKDAG_DIR_NAME: &str = ".taskdag";

/// Name of the configuration file
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Name of the task data file
pub const TASKS_FILE_NAME: &str = "tasks.jsonl";

/// Name of the lock file within .taskdag
pub const LOCK_FILE_NAME: &str = "tasks.lock";

/// Name of the gitignore file within .taskdag
pub const GITIGNORE_FILE_NAME: &str = ".gitignore";

/// Minimum prefix length
pub const MIN_PREFIX_LENGTH: usize = 2;

/// Maximum prefix length
pub const MAX_PREFIX_LENGTH: usize = 20;

/// Maximum directory depth to traverse when searching for the taskdag root
pub const MAX_TRAVERSAL_DEPTH: usize = 256;

/// Backend name for JSONL-persisted in-memory storage
pub const BACKEND_MEMORY: &str = "memory";

/// Backend name for storage that is never written to disk
pub const BACKEND_EPHEMERAL: &str = "ephemeral";

/// Contents of `.taskdag/config.yaml`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskdagConfig {
    /// Task ID prefix (e.g., "proj" for "proj-k3x9")
    #[serde(rename = "task-prefix")]
    pub task_prefix: String,

    /// Storage configuration
    pub storage: StorageConfig,
}

/// Storage configuration section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StorageConfig {
    /// `memory` (persisted to `data_file` on save) or `ephemeral`
    pub backend: String,

    /// Path to the data file, relative to the repository root
    pub data_file: String,
}

impl StorageConfig {
    /// Resolve the configured backend against the repository root.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::UnknownBackend` for any backend name other than
    /// `memory` or `ephemeral`.
    pub fn to_backend(&self, root_dir: &Path) -> Result<StorageBackend> {
        match self.backend.as_str() {
            BACKEND_MEMORY => Ok(StorageBackend::Jsonl(root_dir.join(&self.data_file))),
            BACKEND_EPHEMERAL => Ok(StorageBackend::InMemory),
            other => Err(ConfigError::UnknownBackend(other.to_string()).into()),
        }
    }
}

impl TaskdagConfig {
    /// Create a new configuration with the given prefix
    pub fn new(prefix: &str) -> Self {
        Self {
            task_prefix: prefix.to_string(),
            storage: StorageConfig {
                backend: BACKEND_MEMORY.to_string(),
                data_file: format!("{}/{}", TASKDAG_DIR_NAME, TASKS_FILE_NAME),
            },
        }
    }

    /// Load configuration from a file
    ///
    /// The prefix is validated on load so a hand-edited config cannot
    /// produce IDs `init` would have refused.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        let config: Self = serde_yaml::from_str(&content).map_err(ConfigError::from)?;
        validate_prefix(&config.task_prefix)?;
        Ok(config)
    }

    /// Save configuration to a file
    pub async fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self).map_err(ConfigError::from)?;
        fs::write(path, content).await?;
        Ok(())
    }
}

impl Default for TaskdagConfig {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}

/// Result of the init command
#[derive(Debug)]
pub struct InitResult {
    /// Path to the created taskdag directory
    pub taskdag_dir: PathBuf,
    /// Path to the created config file
    pub config_file: PathBuf,
    /// Path to the created tasks file
    pub tasks_file: PathBuf,
    /// Path to the created gitignore file
    pub gitignore_file: PathBuf,
    /// The prefix used for task IDs
    pub prefix: String,
}

/// Validate task ID prefix format.
///
/// Requirements:
/// - 2-20 characters
/// - ASCII letters and digits only
///
/// Expects pre-trimmed input.
pub fn validate_prefix(prefix: &str) -> Result<()> {
    if prefix.len() < MIN_PREFIX_LENGTH {
        return Err(ConfigError::InvalidPrefix(format!(
            "Prefix must be at least {} characters",
            MIN_PREFIX_LENGTH
        ))
        .into());
    }

    if prefix.len() > MAX_PREFIX_LENGTH {
        return Err(ConfigError::InvalidPrefix(format!(
            "Prefix cannot exceed {} characters",
            MAX_PREFIX_LENGTH
        ))
        .into());
    }

    if !prefix.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ConfigError::InvalidPrefix(
            "Prefix must contain only alphanumeric characters".to_string(),
        )
        .into());
    }

    Ok(())
}

/// Initialize a new taskdag repository in the given directory.
///
/// # Errors
///
/// Returns an error if:
/// - The `.taskdag/` directory already exists
/// - The prefix is invalid
/// - File system operations fail
pub async fn init(base_dir: &Path, prefix: Option<&str>) -> Result<InitResult> {
    let prefix = prefix.unwrap_or(DEFAULT_PREFIX).trim();
    validate_prefix(prefix)?;

    if is_initialized(base_dir) {
        return Err(ConfigError::AlreadyInitialized(TASKDAG_DIR_NAME.to_string()).into());
    }

    let taskdag_dir = base_dir.join(TASKDAG_DIR_NAME);
    fs::create_dir_all(&taskdag_dir).await?;

    let config_file = taskdag_dir.join(CONFIG_FILE_NAME);
    TaskdagConfig::new(prefix).save(&config_file).await?;

    let tasks_file = taskdag_dir.join(TASKS_FILE_NAME);
    fs::write(&tasks_file, "").await?;

    // Leftovers of an interrupted atomic save, and the repository lock
    let gitignore_file = taskdag_dir.join(GITIGNORE_FILE_NAME);
    fs::write(&gitignore_file, format!("*.tmp\n{LOCK_FILE_NAME}\n")).await?;

    tracing::info!(dir = %taskdag_dir.display(), prefix, "Initialized taskdag repository");

    Ok(InitResult {
        taskdag_dir,
        config_file,
        tasks_file,
        gitignore_file,
        prefix: prefix.to_string(),
    })
}

/// Check if a directory has been initialized with taskdag.
pub fn is_initialized(base_dir: &Path) -> bool {
    base_dir.join(TASKDAG_DIR_NAME).exists()
}

/// Find the taskdag root directory by searching up the directory tree.
///
/// Returns the directory containing `.taskdag/`, or `None` if the
/// filesystem root or [`MAX_TRAVERSAL_DEPTH`] is reached first.
pub fn find_taskdag_root(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();
    let mut depth = 0;

    loop {
        if current.join(TASKDAG_DIR_NAME).is_dir() {
            return Some(current);
        }

        depth += 1;
        if depth > MAX_TRAVERSAL_DEPTH || !current.pop() {
            return None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use rstest::rstest;
    use tempfile::TempDir;

    #[rstest]
    #[case::short("ab")]
    #[case::default_prefix("proj")]
    #[case::digits("test123")]
    #[case::uppercase("PROJ")]
    #[case::max_length("a1b2c3d4e5f6g7h8i9j0")]
    fn test_validate_prefix_valid(#[case] prefix: &str) {
        assert!(validate_prefix(prefix).is_ok());
    }

    #[rstest]
    #[case::single("a", "at least 2")]
    #[case::empty("", "at least 2")]
    #[case::too_long("a".repeat(21), "cannot exceed 20")]
    #[case::hyphen("proj-test", "alphanumeric")]
    #[case::space("proj test", "alphanumeric")]
    #[case::padded("  ab  ", "alphanumeric")]
    fn test_validate_prefix_invalid(#[case] prefix: impl AsRef<str>, #[case] expected: &str) {
        let err = validate_prefix(prefix.as_ref()).unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::InvalidPrefix(_))));
        assert!(
            err.to_string().contains(expected),
            "expected '{expected}' in '{err}'"
        );
    }

    #[test]
    fn test_config_new() {
        let config = TaskdagConfig::new("myproj");
        assert_eq!(config.task_prefix, "myproj");
        assert_eq!(config.storage.backend, "memory");
        assert_eq!(config.storage.data_file, ".taskdag/tasks.jsonl");
        assert_eq!(TaskdagConfig::default().task_prefix, DEFAULT_PREFIX);
    }

    #[tokio::test]
    async fn test_config_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(CONFIG_FILE_NAME);

        let original = TaskdagConfig::new("test123");
        original.save(&path).await.unwrap();

        let content = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(content.contains("task-prefix: test123"));
        assert!(content.contains("backend: memory"));

        assert_eq!(TaskdagConfig::load(&path).await.unwrap(), original);
    }

    #[tokio::test]
    async fn test_config_load_rejects_bad_prefix() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(CONFIG_FILE_NAME);
        tokio::fs::write(
            &path,
            "task-prefix: x\nstorage:\n  backend: memory\n  data_file: t.jsonl\n",
        )
        .await
        .unwrap();

        let err = TaskdagConfig::load(&path).await.unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::InvalidPrefix(_))));
    }

    #[tokio::test]
    async fn test_config_load_rejects_malformed_yaml() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(CONFIG_FILE_NAME);
        tokio::fs::write(&path, "task-prefix: [unclosed").await.unwrap();

        let err = TaskdagConfig::load(&path).await.unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::Yaml(_))));
    }

    #[rstest]
    #[case::memory("memory", true)]
    #[case::ephemeral("ephemeral", false)]
    fn test_storage_config_to_backend(#[case] backend: &str, #[case] has_path: bool) {
        let config = StorageConfig {
            backend: backend.to_string(),
            data_file: ".taskdag/tasks.jsonl".to_string(),
        };
        let resolved = config.to_backend(Path::new("/repo")).unwrap();
        assert_eq!(resolved.data_path().is_some(), has_path);
        if has_path {
            assert_eq!(
                resolved.data_path().unwrap(),
                Path::new("/repo/.taskdag/tasks.jsonl")
            );
        }
    }

    #[test]
    fn test_storage_config_unknown_backend() {
        let config = StorageConfig {
            backend: "postgres".to_string(),
            data_file: String::new(),
        };
        let err = config.to_backend(Path::new("/repo")).unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::UnknownBackend(ref name)) if name == "postgres"
        ));
    }

    #[tokio::test]
    async fn test_init_creates_directory_structure() {
        let temp_dir = TempDir::new().unwrap();

        let result = init(temp_dir.path(), None).await.unwrap();

        assert!(result.taskdag_dir.is_dir());
        assert!(result.config_file.exists());
        assert!(result.gitignore_file.exists());
        assert_eq!(result.prefix, DEFAULT_PREFIX);
        let tasks = tokio::fs::read_to_string(&result.tasks_file).await.unwrap();
        assert!(tasks.is_empty());
    }

    #[tokio::test]
    async fn test_init_trims_custom_prefix() {
        let temp_dir = TempDir::new().unwrap();

        let result = init(temp_dir.path(), Some("  myproj ")).await.unwrap();
        assert_eq!(result.prefix, "myproj");

        let config = TaskdagConfig::load(&result.config_file).await.unwrap();
        assert_eq!(config.task_prefix, "myproj");
    }

    #[tokio::test]
    async fn test_init_fails_if_already_initialized() {
        let temp_dir = TempDir::new().unwrap();
        init(temp_dir.path(), None).await.unwrap();

        let err = init(temp_dir.path(), None).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::AlreadyInitialized(_))
        ));
    }

    #[tokio::test]
    async fn test_init_with_invalid_prefix_creates_nothing() {
        let temp_dir = TempDir::new().unwrap();

        assert!(init(temp_dir.path(), Some("a")).await.is_err());
        assert!(!is_initialized(temp_dir.path()));
    }

    #[test]
    fn test_find_taskdag_root() {
        let temp_dir = TempDir::new().unwrap();
        assert!(find_taskdag_root(temp_dir.path()).is_none());

        std::fs::create_dir(temp_dir.path().join(TASKDAG_DIR_NAME)).unwrap();
        let nested = temp_dir.path().join("sub").join("nested");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(
            find_taskdag_root(temp_dir.path()),
            Some(temp_dir.path().to_path_buf())
        );
        assert_eq!(
            find_taskdag_root(&nested),
            Some(temp_dir.path().to_path_buf())
        );
    }
}
