//! Platform-specific locations of the jobboard config and data files.
//!
//! `JOBBOARD_DATA_DIR` overrides the data directory on every platform.

use std::env;
use std::path::PathBuf;

const APP_DIR: &str = "jobboard";

fn home() -> PathBuf {
    env::var_os("HOME")
        .or_else(|| env::var_os("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(env::temp_dir)
}

/// Directory holding `settings.json`.
///
/// - **Linux**: `$XDG_CONFIG_HOME/jobboard` or `~/.config/jobboard`
/// - **macOS**: `~/Library/Application Support/jobboard`
/// - **Windows**: `%APPDATA%\jobboard`
pub fn get_config_dir() -> PathBuf {
    #[cfg(target_os = "macos")]
    {
        home().join("Library").join("Application Support").join(APP_DIR)
    }
    #[cfg(target_os = "windows")]
    {
        env::var_os("APPDATA")
            .map(PathBuf::from)
            .unwrap_or_else(home)
            .join(APP_DIR)
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| home().join(".config"))
            .join(APP_DIR)
    }
}

/// Directory holding the preference database.
///
/// - **Linux**: `$XDG_DATA_HOME/jobboard` or `~/.local/share/jobboard`
/// - **macOS**: `~/Library/Application Support/jobboard`
/// - **Windows**: `%LOCALAPPDATA%\jobboard`
pub fn get_data_dir() -> PathBuf {
    if let Some(dir) = env::var_os("JOBBOARD_DATA_DIR") {
        return PathBuf::from(dir);
    }
    #[cfg(target_os = "macos")]
    {
        home().join("Library").join("Application Support").join(APP_DIR)
    }
    #[cfg(target_os = "windows")]
    {
        env::var_os("LOCALAPPDATA")
            .map(PathBuf::from)
            .unwrap_or_else(home)
            .join(APP_DIR)
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        env::var_os("XDG_DATA_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| home().join(".local").join("share"))
            .join(APP_DIR)
    }
}
