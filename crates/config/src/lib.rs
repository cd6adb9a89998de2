// Configuration loading

pub mod settings;
pub mod token_cache;

use std::path::PathBuf;

pub use settings::Settings;
pub use token_cache::{CacheError, TokenCache, TOKEN_KEY, TOKEN_TTL_SECS};

/// Overrides the config directory (used by scripted runs and tests).
pub const CONFIG_DIR_ENV: &str = "GRIDFEED_CONFIG_DIR";

/// Directory holding every gridfeed config file (`~/.config/gridfeed`).
pub fn config_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|d| !d.is_empty()) {
        return PathBuf::from(dir);
    }
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("gridfeed")
}
