use btcm_types::ContentKey;

/// Errors from content store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No object is stored under the key.
    #[error("content not found: {0}")]
    NotFound(ContentKey),

    /// The backend could not be reached or refused the request.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored bytes no longer hash to their key (data corruption).
    #[error("hash mismatch for {key}: computed {computed}")]
    HashMismatch { key: ContentKey, computed: String },
}

impl StoreError {
    /// Returns `true` for failures of the backend itself, as opposed to
    /// lookups that reached the backend and came back empty or corrupt.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::Io(_))
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
