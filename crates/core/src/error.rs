use thiserror::Error;

/// Error taxonomy for library queries. Every hard error carries a stable
/// machine-readable kind (`code`) next to the human-readable message, so
/// callers can tell "not authorized" from "empty" and "unavailable" from
/// "no results".
#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("music library permission is required to do this operation")]
    NotAuthorized,

    #[error("page size {first} is out of range (expected 1..=1000)")]
    InvalidPageSize { first: i64 },

    #[error("cursor {cursor:?} is not a valid asset id")]
    MalformedCursor { cursor: String },

    #[error("{backend} backend is unavailable: {reason}")]
    Unavailable {
        backend: &'static str,
        reason: String,
    },

    #[error("could not load assets from {backend}: {message}")]
    AssetQuery {
        backend: &'static str,
        message: String,
    },
}

impl LibraryError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotAuthorized => "E_NO_PERMISSIONS",
            Self::InvalidPageSize { .. } => "E_INVALID_PAGINATION",
            Self::MalformedCursor { .. } => "E_CURSOR",
            Self::Unavailable { .. } => "E_UNAVAILABLE",
            Self::AssetQuery { .. } => "E_UNABLE_TO_LOAD",
        }
    }
}

pub type Result<T> = std::result::Result<T, LibraryError>;
