//! Provisioning engine error types

use thiserror::Error;

/// Provisioning engine errors
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("Stack not found: {0}")]
    StackNotFound(String),

    #[error("Stack already declared: {0}")]
    DuplicateStack(String),

    #[error("Resource already declared: {0}")]
    DuplicateResource(String),

    #[error("Output already exported: {0}")]
    DuplicateOutput(String),

    #[error("Unknown reference: {0}")]
    UnknownReference(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, CloudError>;
