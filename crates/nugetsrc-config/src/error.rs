use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    // File errors
    #[error("NuGet configuration file does not exist: {}", path.display())]
    MissingConfigFile { path: PathBuf },

    #[error("NuGet configuration file is read only: {}", path.display())]
    ReadOnlyTarget { path: PathBuf },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Document errors
    #[error("Failed to parse NuGet configuration: {0}")]
    Parse(#[from] xmltree::ParseError),

    #[error("Invalid NuGet configuration: {message}")]
    InvalidDocument { message: String },

    #[error("Failed to write NuGet configuration: {0}")]
    Serialize(String),

    // Argument errors
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // Source errors
    #[error("Source already exists: {name}")]
    DuplicateSource { name: String },

    #[error("Source does not exist: {name}")]
    SourceNotFound { name: String },

    // Credential errors
    #[error("Credentials already exist: {name}")]
    CredentialsAlreadyExist { name: String },

    #[error("Credentials do not exist: {name}")]
    CredentialsNotFound { name: String },

    // Platform errors
    #[error("Unable to determine the default NuGet configuration path on this platform")]
    UnsupportedPlatform,
}

pub type Result<T> = std::result::Result<T, ConfigError>;
