/// Failures surfaced by the dispatch core.
///
/// A client hanging up on a tracking stream is not represented here: that is
/// the normal cancellation path of a session, see [`crate::dispatch::tracking`].
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// Malformed input, rejected before anything is written.
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("intervention {0} not found")]
    NotFound(String),

    /// An identity that already exists was inserted again.
    #[error("intervention {0} already exists")]
    Conflict(String),

    /// The backing store could not be reached or rejected the operation.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[from] sqlx::Error),
}

pub type DispatchResult<T> = Result<T, DispatchError>;
