use thiserror::Error;

/// Main error type for ModelMind operations
#[derive(Error, Debug)]
pub enum ModelMindError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid file name pattern: {0}")]
    Pattern(#[from] ignore::Error),

    #[error("Invalid class pattern: {0}")]
    Regex(#[from] regex::Error),

    #[error("Document error: {0}")]
    Document(String),
}

pub type Result<T> = std::result::Result<T, ModelMindError>;
