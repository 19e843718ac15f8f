use std::fs;
use std::path::PathBuf;
use std::sync::LazyLock;

use anyhow::Context;

const PROJECT_NAME: &str = env!("CARGO_PKG_NAME");

/// Path to the user config file: `$HOME/.config/rom-tools.toml`
///
/// Returns `None` if the home directory cannot be determined.
pub static CONFIG_PATH: LazyLock<Option<PathBuf>> = LazyLock::new(|| {
    let home_dir = dirs::home_dir()?;
    Some(home_dir.join(".config").join(format!("{PROJECT_NAME}.toml")))
});

/// Directory for run logs: `$HOME/logs/rom-tools`
pub static LOG_DIR: LazyLock<Option<PathBuf>> = LazyLock::new(|| {
    let home_dir = dirs::home_dir()?;
    Some(home_dir.join("logs").join(PROJECT_NAME))
});

/// Read the user config file contents.
///
/// Returns `Ok(None)` when there is no home directory or the file does not exist.
///
/// # Errors
/// Returns an error if the file exists but cannot be read.
pub fn read_user_config_file() -> anyhow::Result<Option<String>> {
    let Some(path) = CONFIG_PATH.as_deref() else {
        return Ok(None);
    };

    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(error) => Err(error).with_context(|| format!("Failed to read config file {}", path.display())),
    }
}
