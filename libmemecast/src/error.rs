//! Error types for Memecast

use thiserror::Error;

pub type Result<T> = std::result::Result<T, MemecastError>;

#[derive(Error, Debug)]
pub enum MemecastError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl MemecastError {
    /// Returns the appropriate exit code for this error
    ///
    /// Only startup failures should ever reach the process boundary;
    /// per-target failures are logged and the run continues.
    pub fn exit_code(&self) -> i32 {
        match self {
            MemecastError::InvalidInput(_) => 3,
            MemecastError::Platform(PlatformError::Authentication(_)) => 2,
            MemecastError::Platform(_) => 1,
            MemecastError::Config(_) => 1,
            MemecastError::Template(_) => 1,
            MemecastError::Io(_) => 1,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("Undefined placeholder: {{{0}}}")]
    UndefinedPlaceholder(String),

    #[error("Unbalanced brace in template: {0}")]
    UnbalancedBrace(String),

    #[error("Template has no candidates")]
    NoCandidates,
}

#[derive(Error, Debug, Clone)]
pub enum PlatformError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Submission failed: {0}")]
    Submission(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Media error: {0}")]
    Media(String),
}
