use thiserror::Error;

#[derive(Error, Debug)]
pub enum FormationError {
    #[error("Unknown formation mode: {0}")]
    UnknownFormationMode(String),

    #[error("Unknown allocation strategy: {0}")]
    UnknownStrategy(String),

    #[error("Harness already registered: {0}")]
    DuplicateHarness(String),

    #[error("Harness not found: {0}")]
    HarnessNotFound(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FormationError>;
