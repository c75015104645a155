//! # Config - appinfo-cli settings
//!
//! All settings come from environment variables, each with a default:
//!
//! ```text
//! APPINFO_PATH        file opened at startup        (default: none)
//! APPINFO_BACKUP      copy to <path>.bak before SAVE (default: "true")
//! APPINFO_LIST_LIMIT  max apps printed by APPS      (default: 50, 0 = unlimited)
//! ```
//!
//! Values that fail to parse fall back to the default.

use std::path::PathBuf;

pub const ENV_PATH: &str = "APPINFO_PATH";
pub const ENV_BACKUP: &str = "APPINFO_BACKUP";
pub const ENV_LIST_LIMIT: &str = "APPINFO_LIST_LIMIT";

/// Default number of apps printed by `APPS`.
pub const DEFAULT_LIST_LIMIT: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppinfoConfig {
    /// File to open when the shell starts.
    pub path: Option<PathBuf>,
    /// Keep a `.bak` copy of the file a SAVE overwrites.
    pub backup: bool,
    /// Maximum number of apps `APPS` prints; `0` prints all.
    pub list_limit: usize,
}

impl Default for AppinfoConfig {
    fn default() -> Self {
        Self {
            path: None,
            backup: true,
            list_limit: DEFAULT_LIST_LIMIT,
        }
    }
}

impl AppinfoConfig {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let env_or = |key: &str, default: String| lookup(key).unwrap_or(default);

        let path = lookup(ENV_PATH)
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);
        let backup = env_or(ENV_BACKUP, defaults.backup.to_string())
            .trim()
            .parse()
            .unwrap_or(defaults.backup);
        let list_limit = env_or(ENV_LIST_LIMIT, defaults.list_limit.to_string())
            .trim()
            .parse()
            .unwrap_or(defaults.list_limit);

        Self {
            path,
            backup,
            list_limit,
        }
    }
}
