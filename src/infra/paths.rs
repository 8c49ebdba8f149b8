// src/infra/paths.rs — Config path resolution
//
// DOCQA_HOME overrides everything; otherwise the platform config directory
// (~/.config/docqa on Linux) is used.

use directories::ProjectDirs;
use std::path::PathBuf;

/// Returns the DOCQA_HOME override, if set.
fn docqa_home() -> Option<PathBuf> {
    std::env::var_os("DOCQA_HOME").map(PathBuf::from)
}

/// Configuration directory, or `None` when no home directory can be found.
pub fn config_dir() -> Option<PathBuf> {
    if let Some(home) = docqa_home() {
        return Some(home);
    }
    ProjectDirs::from("", "", "docqa").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Config file path
pub fn config_file_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}
