use crate::constants::profiles::{CONFIG_DIR_NAME, CONFIG_FILE_NAME};
use std::env;
use std::path::{Path, PathBuf};

fn env_path(name: &str) -> Option<PathBuf> {
    let raw = env::var(name).ok()?;
    let trimmed = raw.trim();
    if trimmed.is_empty() || matches!(trimmed.to_lowercase().as_str(), "undefined" | "null") {
        return None;
    }
    Some(PathBuf::from(trimmed))
}

fn home_dir() -> Option<PathBuf> {
    env_path("HOME").or_else(|| env_path("USERPROFILE"))
}

/// Expands a leading `~` to the user's home directory. Paths without one,
/// or with no resolvable home, come back unchanged.
pub fn expand_home_path(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match home_dir() {
        Some(home) if rest.as_os_str().is_empty() => home,
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}

/// `$COMMONS_CONFIG_DIR`, else `~/.cdis`.
pub fn resolve_config_dir() -> PathBuf {
    if let Some(dir) = env_path("COMMONS_CONFIG_DIR") {
        return expand_home_path(dir);
    }
    home_dir()
        .or_else(|| env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR_NAME)
}

/// `$COMMONS_CONFIG_PATH`, else `config` inside [`resolve_config_dir`].
pub fn resolve_config_path() -> PathBuf {
    match env_path("COMMONS_CONFIG_PATH") {
        Some(path) => expand_home_path(path),
        None => resolve_config_dir().join(CONFIG_FILE_NAME),
    }
}
