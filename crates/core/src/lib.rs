pub mod config;
pub mod error;
pub mod ids;
pub mod model;
pub mod options;

pub use config::{AppConfig, ConfigIntervals, ScanConfig};
pub use error::{LibraryError, Result};
pub use model::{
    AggregateKind, AggregateRecord, ArtworkData, ArtworkRef, AssetPage, AuthorizationResult,
    BackendKind, LibraryEvent, TrackRecord, UNKNOWN_ALBUM, UNKNOWN_ARTIST, UNKNOWN_GENRE,
    UNKNOWN_PLAYLIST, UNKNOWN_TITLE,
};
pub use options::{AssetQueryOptions, SortKey, SortSpec, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
