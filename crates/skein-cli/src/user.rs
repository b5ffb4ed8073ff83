//! Reader identity resolution for CLI commands.
//!
//! The resolution chain: `--user` flag > `SKEIN_USER` env > config
//! `reader.default_user`. A visit with no resolved identity runs in guest
//! mode: pages render, nothing is recorded.

use skein_core::config::ProjectConfig;
use std::env;

/// Environment reader trait for dependency injection in tests.
trait EnvReader {
    fn get(&self, key: &str) -> Option<String>;
}

/// Real environment reader.
struct RealEnv;

impl EnvReader for RealEnv {
    fn get(&self, key: &str) -> Option<String> {
        env::var(key).ok().filter(|v| !v.is_empty())
    }
}

/// Core resolution logic, parameterized by environment reader.
fn resolve_reader_with(
    cli_flag: Option<&str>,
    config: &ProjectConfig,
    env: &dyn EnvReader,
) -> Option<String> {
    // Step 1: explicit --user flag
    if let Some(user) = cli_flag {
        if !user.is_empty() {
            return Some(user.to_string());
        }
    }

    // Step 2: SKEIN_USER env
    if let Some(val) = env.get("SKEIN_USER") {
        return Some(val);
    }

    // Step 3: config default
    config
        .reader
        .default_user
        .clone()
        .filter(|v| !v.is_empty())
}

/// Resolve the reader identity following the 3-step chain:
///
/// 1. `--user` CLI flag (passed as `cli_flag`)
/// 2. `SKEIN_USER` environment variable
/// 3. `reader.default_user` from `.skein/config.toml`
///
/// Returns `None` for guest mode.
pub fn resolve_reader(cli_flag: Option<&str>, config: &ProjectConfig) -> Option<String> {
    resolve_reader_with(cli_flag, config, &RealEnv)
}

/// Resolve the reader identity, erroring for commands that require one
/// (history review, favorites, activity).
///
/// # Errors
///
/// Returns an error naming the resolution chain when no identity is found.
pub fn require_reader(cli_flag: Option<&str>, config: &ProjectConfig) -> anyhow::Result<String> {
    resolve_reader(cli_flag, config).ok_or_else(|| {
        anyhow::anyhow!(
            "no reader identity: pass --user, set SKEIN_USER, or set reader.default_user in .skein/config.toml"
        )
    })
}
