use thiserror::Error;

pub type Result<T, E = LapseError> = std::result::Result<T, E>;

/// Unified error type covering common failure scenarios across subsystems.
#[derive(Debug, Error)]
pub enum LapseError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("catalog error: {0}")]
    Catalog(String),
    #[error("bootstrap error: {0}")]
    Bootstrap(String),
    #[error("operational error: {0}")]
    Ops(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
