use std::error::Error;
use thiserror::Error;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Failure reported by an auction store, whatever the backend.
///
/// A failed write means the command that issued it is not committed.
#[derive(Debug, Error)]
#[error("{backend} store unavailable: {message}")]
pub struct StorageError {
    backend: &'static str,
    message: String,
    #[source]
    source: Box<dyn Error + Send + Sync>,
}

impl StorageError {
    /// Wrap a backend failure.
    pub fn unavailable(
        backend: &'static str,
        message: impl Into<String>,
        source: impl Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            backend,
            message: message.into(),
            source: Box::new(source),
        }
    }

    /// Name of the backend that failed (`mongodb`, `memory`).
    pub fn backend(&self) -> &'static str {
        self.backend
    }
}
