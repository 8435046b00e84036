use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    /// Missing credentials or a session this store did not issue
    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("remote file not found: {path}")]
    NotFound { path: String },

    #[error("remote I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid metadata sidecar: {0}")]
    Sidecar(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;
