use std::{env, path::PathBuf};

/// Environment variable naming the directory that holds every database
pub const ROOT_ENV: &str = "CYAN_ROOT";
/// Environment variable naming the engine executable used by the client
pub const ENGINE_ENV: &str = "CYAN_ENGINE";

/// Engine side configuration
#[derive(Debug, Clone, PartialEq)]
pub struct StoreConfig {
    /// Directory containing one subdirectory per database
    pub root: PathBuf,
}

impl StoreConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new(".")
    }
}

/// Client side configuration: where the engine executable lives.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub executable: PathBuf,
}

impl EngineConfig {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    /// Reads the executable location from `CYAN_ENGINE`.
    pub fn from_env() -> Option<Self> {
        env::var_os(ENGINE_ENV)
            .filter(|value| !value.is_empty())
            .map(Self::new)
    }
}
