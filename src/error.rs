use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InstallerError {
    #[error("apt-get not found. This installer targets Debian/Ubuntu hosts.")]
    AptNotInstalled,

    #[error("{0} not found in PATH")]
    MissingPrerequisite(String),

    #[error("Docker subprocess failed: {0}")]
    DockerExecution(String),

    #[error("Git error: {0}")]
    Git(String),

    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("Python environment error: {0}")]
    Python(String),

    #[error("Dependency manifest not found: {0}")]
    ManifestNotFound(PathBuf),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, InstallerError>;
