use thiserror::Error;

/// Enum with all errors in this crate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BKIndexError {
    /// A value was handed to the tree that it cannot store.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The operation is not supported by BK-trees.
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(&'static str),
}

pub type Result<T> = std::result::Result<T, BKIndexError>;
