/// Errors that can occur within the storage layer.
///
/// # Examples
///
/// ```rust
/// use lumen_storage::StorageError;
///
/// let err = StorageError::NotFound {
///     entity: "rule",
///     id: "rule-99".to_string(),
/// };
/// assert!(err.to_string().contains("rule-99"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    /// A record with the given id does not exist.
    #[error("Storage: {entity} not found (id={id})")]
    NotFound { entity: &'static str, id: String },

    /// An insert used an id that is already taken.
    #[error("Storage: {entity} already exists (id={id})")]
    Duplicate { entity: &'static str, id: String },
}

/// Convenience `Result` alias for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;
