use anyhow::{Result, anyhow};
use directories::ProjectDirs;
use std::path::PathBuf;

pub const APP_NAME: &str = "StaSSH";

pub fn default_data_dir() -> Result<PathBuf> {
    let project_dirs = ProjectDirs::from("", "", APP_NAME)
        .ok_or_else(|| anyhow!("unable to resolve application data directory"))?;
    Ok(project_dirs.data_dir().to_path_buf())
}

/// Directory the profile files live in. An explicit override wins over the
/// platform data directory.
pub fn resolve_data_dir(override_path: Option<PathBuf>) -> Result<PathBuf> {
    match override_path {
        Some(path) => Ok(path),
        None => default_data_dir(),
    }
}
