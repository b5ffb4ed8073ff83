use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Name of the library directory created by `sk init`.
pub const SKEIN_DIR: &str = ".skein";

/// Resolve `.skein/` under a project root.
#[must_use]
pub fn skein_dir(project_root: &Path) -> PathBuf {
    project_root.join(SKEIN_DIR)
}

/// Resolve the SQLite store path under a project root.
#[must_use]
pub fn db_path(project_root: &Path) -> PathBuf {
    skein_dir(project_root).join("skein.db")
}

/// Resolve the per-user lock directory under a project root.
#[must_use]
pub fn locks_dir(project_root: &Path) -> PathBuf {
    skein_dir(project_root).join("locks")
}

/// Resolve the project config path under a project root.
#[must_use]
pub fn config_path(project_root: &Path) -> PathBuf {
    skein_dir(project_root).join("config.toml")
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProjectConfig {
    #[serde(default)]
    pub reader: ReaderConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReaderConfig {
    /// User assumed when neither `--user` nor `SKEIN_USER` is given.
    /// Absent means anonymous visits run in guest mode.
    #[serde(default)]
    pub default_user: Option<String>,
    /// Default row count for `sk activity`.
    #[serde(default = "default_activity_limit")]
    pub activity_limit: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            default_user: None,
            activity_limit: default_activity_limit(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// How long a visit waits on another process's per-user lock.
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            lock_timeout_ms: default_lock_timeout_ms(),
        }
    }
}

impl StoreConfig {
    /// The lock timeout as a [`Duration`].
    #[must_use]
    pub const fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }
}

const fn default_activity_limit() -> usize {
    20
}

const fn default_lock_timeout_ms() -> u64 {
    2_000
}

/// Load `.skein/config.toml`, falling back to defaults when absent.
///
/// # Errors
///
/// Returns an error when the file exists but cannot be read or parsed.
pub fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
    let path = config_path(project_root);
    if !path.exists() {
        return Ok(ProjectConfig::default());
    }

    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("read config {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("parse config {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::{ProjectConfig, load_project_config};
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn defaults_are_stable() {
        let config = ProjectConfig::default();
        assert!(config.reader.default_user.is_none());
        assert_eq!(config.reader.activity_limit, 20);
        assert_eq!(config.store.lock_timeout(), Duration::from_millis(2_000));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let config = load_project_config(dir.path()).expect("load defaults");
        assert!(config.reader.default_user.is_none());
    }

    #[test]
    fn partial_config_fills_in_defaults() {
        let dir = TempDir::new().expect("create temp dir");
        let skein = dir.path().join(".skein");
        std::fs::create_dir_all(&skein).expect("mkdir");
        std::fs::write(
            skein.join("config.toml"),
            "[reader]\ndefault_user = \"alice\"\n",
        )
        .expect("write config");

        let config = load_project_config(dir.path()).expect("load");
        assert_eq!(config.reader.default_user.as_deref(), Some("alice"));
        assert_eq!(config.reader.activity_limit, 20);
        assert_eq!(config.store.lock_timeout_ms, 2_000);
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let dir = TempDir::new().expect("create temp dir");
        let skein = dir.path().join(".skein");
        std::fs::create_dir_all(&skein).expect("mkdir");
        std::fs::write(skein.join("config.toml"), "reader = not toml").expect("write config");

        assert!(load_project_config(dir.path()).is_err());
    }
}
