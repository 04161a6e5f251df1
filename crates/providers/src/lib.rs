use async_trait::async_trait;
use musiclib_bridge_core::{
    AppConfig, ArtworkData, ArtworkRef, AuthorizationResult, BackendKind, LibraryError, Result,
    TrackRecord,
};

pub mod fs;
pub mod memory;
pub mod watch;

pub use watch::{spawn_mtime_watcher, ChangeNotifier, ChangeSubscription};

/// Pre-filter hint for backends with native query support. Applying it is
/// an optimization, not a correctness requirement: the normalizer re-applies
/// every predicate and must produce identical output either way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NativeTrackFilter {
    pub album_id: Option<String>,
    pub artist_id: Option<String>,
    pub genre_id: Option<String>,
    pub folder_id: Option<String>,
    pub created_after: Option<i64>,
    pub created_before: Option<i64>,
}

impl NativeTrackFilter {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn matches(&self, track: &TrackRecord) -> bool {
        fn id_matches(filter: &Option<String>, value: &Option<String>) -> bool {
            match filter {
                None => true,
                Some(want) => value.as_deref() == Some(want.as_str()),
            }
        }

        id_matches(&self.album_id, &track.album_id)
            && id_matches(&self.artist_id, &track.artist_id)
            && id_matches(&self.genre_id, &track.genre_id)
            && id_matches(&self.folder_id, &track.folder_id)
            && self.created_after.map_or(true, |bound| track.created_at >= bound)
            && self.created_before.map_or(true, |bound| track.created_at <= bound)
    }
}

/// One platform's native music-library index behind the bridge contract.
///
/// Fetches return fresh snapshots in the backend's own enumeration order;
/// nothing is cached across calls and the backend index is never mutated.
#[async_trait]
pub trait MediaLibraryProvider: Send + Sync {
    fn name(&self) -> &'static str;
    fn kind(&self) -> BackendKind;

    /// Synchronous authorization predicate. The boundary layer checks this
    /// before every query; providers do not re-check inside fetches.
    fn is_authorized(&self) -> bool;

    async fn request_authorization(&self) -> AuthorizationResult;

    /// Whether `fetch_tracks` honors the native pre-filter.
    fn supports_native_filter(&self) -> bool {
        false
    }

    /// Fetches a fresh snapshot of the track index.
    async fn fetch_tracks(&self, filter: Option<&NativeTrackFilter>) -> Result<Vec<TrackRecord>>;

    /// Resolves artwork for a reference. Best-effort: any failure, including
    /// missing access to the underlying binary store, yields `None`.
    async fn load_artwork(&self, artwork: &ArtworkRef) -> Option<ArtworkData>;
}

/// Picks the first backend from the configured priority list that is
/// available on this host.
pub fn build_provider(cfg: &AppConfig) -> Box<dyn MediaLibraryProvider> {
    for name in &cfg.backend_priority {
        if name.as_str() == "filesystem" && !cfg.scan.roots.is_empty() {
            return Box::new(fs::FilesystemProvider::new(cfg.scan.clone()));
        }
    }

    Box::new(NullProvider)
}

/// Stand-in backend for hosts with no configured music library. Queries
/// fail with a distinct "unavailable" error, never an empty result.
pub struct NullProvider;

#[async_trait]
impl MediaLibraryProvider for NullProvider {
    fn name(&self) -> &'static str {
        "null"
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Null
    }

    fn is_authorized(&self) -> bool {
        true
    }

    async fn request_authorization(&self) -> AuthorizationResult {
        AuthorizationResult {
            granted: true,
            can_ask_again: false,
        }
    }

    async fn fetch_tracks(&self, _filter: Option<&NativeTrackFilter>) -> Result<Vec<TrackRecord>> {
        Err(LibraryError::Unavailable {
            backend: self.name(),
            reason: "no music library backend is configured".to_string(),
        })
    }

    async fn load_artwork(&self, _artwork: &ArtworkRef) -> Option<ArtworkData> {
        None
    }
}

/// Probes encoded image bytes into an `ArtworkData`. Returns `None` when
/// the bytes cannot be recognized or decoded; artwork is a non-critical
/// enrichment and never fails a query.
pub fn decode_artwork(bytes: &[u8]) -> Option<ArtworkData> {
    let format = image::guess_format(bytes).ok()?;
    let decoded = image::load_from_memory_with_format(bytes, format).ok()?;
    use image::GenericImageView;
    let (width, height) = decoded.dimensions();
    Some(ArtworkData {
        mime: format.to_mime_type().to_string(),
        width,
        height,
        data: bytes.to_vec(),
    })
}
