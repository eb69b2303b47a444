use std::path::PathBuf;

use directories::BaseDirs;

use crate::error::SetupError;

/// Claude Desktop's config file location for the current platform.
///
/// One implementation covers all three platforms: `BaseDirs::config_dir()`
/// resolves to `~/Library/Application Support` on macOS, `%APPDATA%` on
/// Windows, and `~/.config` on Linux, each of which is where Claude Desktop
/// keeps `claude_desktop_config.json`.
pub fn claude_config_path() -> Result<PathBuf, SetupError> {
    let dirs = BaseDirs::new()
        .ok_or_else(|| SetupError::NoConfigDir("no home directory found".to_string()))?;
    Ok(dirs
        .config_dir()
        .join("Claude")
        .join("claude_desktop_config.json"))
}
