use thiserror::Error;

/// Errors reported by map lookups, cursors, and policy validation.
///
/// Every failing operation leaves the map and any cursor exactly as they were
/// before the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// The key is not stored in the map.
    #[error("the key does not belong to the map")]
    KeyNotFound,
    /// The cursor has no occupied slot left at or after its position.
    #[error("the iterator has finished iterating")]
    IteratorExhausted,
    /// A [`ResizePolicy`](crate::ResizePolicy) failed validation.
    #[error("invalid resize policy: {0}")]
    InvalidPolicy(&'static str),
}
