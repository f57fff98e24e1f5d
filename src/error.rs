//! Error taxonomy for apicat operations
//!
//! Every error is request-scoped; nothing here is fatal to the process.
//! `Forbidden` and `NotFound` carry no detail on purpose: a caller must not
//! be able to tell a denied resource from an absent one.

/// The main error type for apicat operations
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// Missing, invalid or expired credential
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Valid credential, but the ownership rule denies the operation
    #[error("forbidden")]
    Forbidden,

    /// Resource (or its owner) does not exist, or is not visible to the caller
    #[error("not found")]
    NotFound,

    /// Upload rejected before any bytes were written (type/size/category)
    #[error("invalid attachment: {0}")]
    InvalidAttachment(String),

    /// Filesystem failure while materializing or removing a file
    #[error("storage failure: {0}")]
    Storage(String),

    /// LMDB or record (de)serialization failure
    #[error("database failure: {0}")]
    Db(String),

    /// Request payload fails a semantic check (duplicate code, bad enum, ...)
    #[error("invalid request: {0}")]
    Invalid(String),
}

/// Result type alias for apicat operations
pub type Result<T> = std::result::Result<T, Error>;

impl From<heed::Error> for Error {
    fn from(e: heed::Error) -> Self {
        Error::Db(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Db(e.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Storage(e.to_string())
    }
}
