// Error taxonomy for the sizing engine
//
// An empty match result is NOT an error: the matcher returns an empty Vec.

use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum SizingError {
    /// Caller supplied something the engine cannot size or match against
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Lead identifier absent from the lead store
    #[error("lead {0} not found")]
    NotFound(Uuid),

    /// Catalog or lead storage failed; passed through without retry
    #[error(transparent)]
    Collaborator(#[from] anyhow::Error),
}

impl SizingError {
    pub fn invalid(message: impl Into<String>) -> Self {
        SizingError::InvalidInput(message.into())
    }

    pub fn is_client_error(&self) -> bool {
        matches!(self, SizingError::InvalidInput(_) | SizingError::NotFound(_))
    }
}
