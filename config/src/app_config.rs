use directories::ProjectDirs;
use std::{
    env,
    path::PathBuf,
};

const ENV_PREFIX: &str = "NODE_DASHBOARD";

lazy_static::lazy_static! {
    static ref CONFIG_FOLDER: Option<PathBuf> = env::var(format!("{ENV_PREFIX}_CONFIG_DIR"))
        .ok()
        .map(PathBuf::from);
}

/// Directory searched for `config.yaml`. `NODE_DASHBOARD_CONFIG_DIR` takes
/// precedence over the platform default.
pub fn get_config_dir() -> PathBuf {
    if let Some(s) = CONFIG_FOLDER.clone() {
        s
    } else if let Some(proj_dirs) = project_directory() {
        proj_dirs.config_local_dir().to_path_buf()
    } else {
        PathBuf::from(".").join(".config")
    }
}

fn project_directory() -> Option<ProjectDirs> {
    ProjectDirs::from("org", "node-dashboard", "node-dashboard")
}
