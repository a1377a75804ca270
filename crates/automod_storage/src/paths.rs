#![forbid(unsafe_code)]

use std::env;
use std::path::{Path, PathBuf};

pub const DATA_DIR_ENV: &str = "AUTOMOD_DATA_DIR";
pub const CONFIG_FILE_NAME: &str = "automod_config.json";
pub const STRIKES_FILE_NAME: &str = "automod_strikes.json";

pub fn data_dir() -> PathBuf {
    env::var(DATA_DIR_ENV)
        .ok()
        .filter(|raw| !raw.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data"))
}

pub fn config_path_in(dir: &Path) -> PathBuf {
    dir.join(CONFIG_FILE_NAME)
}

pub fn strikes_path_in(dir: &Path) -> PathBuf {
    dir.join(STRIKES_FILE_NAME)
}

pub fn config_path() -> PathBuf {
    config_path_in(&data_dir())
}

pub fn strikes_path() -> PathBuf {
    strikes_path_in(&data_dir())
}
