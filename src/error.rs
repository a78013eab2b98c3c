use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no maze layout for level {0}")]
    UnknownLevel(u32),
    #[error("no collision-free spawn for ghost {ghost} on level {level}")]
    NoSafeSpawn { level: u32, ghost: usize },
    #[error("player spawn is inside a wall on level {0}")]
    BlockedPlayerSpawn(u32),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

pub type EngineResult<T> = Result<T, EngineError>;
