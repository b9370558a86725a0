//! Config loading and default paths.

use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::DaemonError;

/// The file [`load_config`] reads for `path`, or `None` when defaults apply.
///
/// An explicit path is always returned, even if it does not exist; the
/// default location is returned only when the file is present.
pub fn config_source(path: Option<&Path>) -> Option<PathBuf> {
    match path {
        Some(p) => Some(p.to_path_buf()),
        None => Some(default_config_path()).filter(|p| p.exists()),
    }
}

/// Load configuration from the given path, or the default location.
///
/// A missing file at the default location means defaults; a missing file at
/// an explicitly requested path is an error. Does not log; callers report
/// [`config_source`] once logging is set up.
pub fn load_config(path: Option<&Path>) -> Result<Config, DaemonError> {
    let Some(config_path) = config_source(path) else {
        return Ok(Config::default());
    };

    let content = match std::fs::read_to_string(&config_path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(DaemonError::Config(format!(
                "config file not found: {}",
                config_path.display()
            )));
        }
        Err(e) => return Err(DaemonError::Config(format!("failed to read config: {e}"))),
    };
    toml::from_str(&content)
        .map_err(|e| DaemonError::Config(format!("failed to parse config: {e}")))
}

/// Get the default config directory path.
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("~/.config"))
        .join("thumb-gesture")
}

/// Get the default config file path.
pub fn default_config_path() -> PathBuf {
    config_dir().join("config.toml")
}
