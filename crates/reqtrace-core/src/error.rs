use thiserror::Error;

#[derive(Debug, Error)]
pub enum TraceError {
    #[error("not initialized: run 'reqtrace init'")]
    NotInitialized,

    #[error("matrix not found: {0}")]
    MatrixNotFound(String),

    #[error("invalid feature id '{0}': must be non-empty without path separators")]
    InvalidFeatureId(String),

    #[error("invalid artifact kind: {0}")]
    InvalidArtifactKind(String),

    #[error("invalid severity: {0}")]
    InvalidSeverity(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TraceError>;
