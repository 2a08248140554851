//! Error types for the segmentation metadata store

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Main error type for store operations.
///
/// A lookup that matches nothing is not an error; it comes back as `None`,
/// an empty list, `false` or zero.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Segmentation kind other than "soma" or "branch"
    #[error("Invalid segmentation type '{0}'. Must be 'soma' or 'branch'.")]
    InvalidSegmentationKind(String),

    /// Underlying SQLite failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}
