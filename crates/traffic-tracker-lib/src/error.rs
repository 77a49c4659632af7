use thiserror::Error;

/// Convenient result alias for document store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Failures raised by a [`DocumentStore`](crate::store::DocumentStore) backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No store handle was configured for this process.
    #[error("database not available")]
    NotInitialized,

    /// The backend could not be reached or refused the operation.
    #[error("store unavailable: {message}")]
    Unavailable { message: String },

    /// A document could not be converted to or from the backend representation.
    #[error("failed to encode document: {message}")]
    Encode { message: String },

    /// A stored document is missing its identifier or has an unreadable one.
    #[error("stored document has no usable identifier")]
    MissingId,

    /// Wrapper for MongoDB driver errors.
    #[error(transparent)]
    Mongo(#[from] mongodb::error::Error),

    /// Wrapper for JSON (de)serialization errors.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl From<mongodb::bson::ser::Error> for StoreError {
    fn from(err: mongodb::bson::ser::Error) -> Self {
        Self::Encode {
            message: err.to_string(),
        }
    }
}

/// Failures raised while recording a traffic event.
#[derive(Debug, Error)]
pub enum IngestionError {
    /// The caller supplied an empty or whitespace-only path.
    #[error("the 'path' field is required and cannot be empty")]
    MissingPath,

    /// The caller supplied an explicitly empty event name.
    #[error("the 'event' field cannot be empty")]
    EmptyEvent,

    /// The store rejected or failed the insert.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IngestionError {
    /// Whether this failure was caused by caller input rather than the store.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::MissingPath | Self::EmptyEvent)
    }
}

/// Failures raised while reading traffic events back.
#[derive(Debug, Error)]
pub enum QueryError {
    /// The requested limit falls outside `1..=max`.
    #[error("the 'limit' field must be between 1 and {max}, got {limit}")]
    InvalidLimit { limit: usize, max: usize },

    /// A stored record could not be decoded into a traffic event.
    #[error("failed to decode stored event {id}: {message}")]
    Decode { id: String, message: String },

    /// The store failed the read.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl QueryError {
    /// Whether this failure was caused by caller input rather than the store.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidLimit { .. })
    }
}
