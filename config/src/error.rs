use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error while {action}: {source}")]
    Io {
        action: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("TRANSCRIPT_HOME points to {path:?}, but {reason}")]
    InvalidHome { path: PathBuf, reason: &'static str },
    #[error("could not find home directory")]
    NoHomeDir,
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid override `{raw}`: {reason}")]
    InvalidOverride { raw: String, reason: String },
}

impl ConfigError {
    pub(crate) fn io(action: &'static str, source: std::io::Error) -> Self {
        Self::Io { action, source }
    }
}
