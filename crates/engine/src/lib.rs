//! Normalization engine and library facade.
//!
//! The stages in [`normalize`] and [`format`] are pure functions over an
//! in-memory snapshot. [`MusicLibrary`] wires the authorization gate, the
//! backend fetch, and those stages into the public operation surface; it is
//! the only place the gate is checked, keeping the stages themselves free
//! of authorization concerns.

pub mod format;
pub mod normalize;

use musiclib_bridge_core::{
    AggregateKind, AggregateRecord, ArtworkData, ArtworkRef, AssetPage, AssetQueryOptions,
    AuthorizationResult, LibraryError, Result, TrackRecord,
};
use musiclib_bridge_providers::{
    ChangeNotifier, ChangeSubscription, MediaLibraryProvider, NativeTrackFilter,
};
pub struct MusicLibrary {
    provider: Box<dyn MediaLibraryProvider>,
    notifier: ChangeNotifier,
}

impl MusicLibrary {
    pub fn new(provider: Box<dyn MediaLibraryProvider>) -> Self {
        Self {
            provider,
            notifier: ChangeNotifier::new(),
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.provider.name()
    }

    pub fn is_authorized(&self) -> bool {
        self.provider.is_authorized()
    }

    pub async fn request_authorization(&self) -> AuthorizationResult {
        self.provider.request_authorization().await
    }

    /// The library's change event source. Feed it from whatever change
    /// signal the host exposes (see `spawn_mtime_watcher` for the
    /// filesystem backend).
    pub fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }

    pub fn subscribe(&self) -> ChangeSubscription {
        self.notifier.subscribe()
    }

    fn ensure_authorized(&self) -> Result<()> {
        if self.provider.is_authorized() {
            Ok(())
        } else {
            Err(LibraryError::NotAuthorized)
        }
    }

    /// Paginated, sorted, filtered asset listing.
    pub async fn list_assets(&self, options: &AssetQueryOptions) -> Result<AssetPage> {
        self.ensure_authorized()?;
        options.validate()?;

        let filter = NativeTrackFilter {
            album_id: options.album.clone(),
            artist_id: options.artist.clone(),
            genre_id: options.genre.clone(),
            folder_id: None,
            created_after: options.created_after,
            created_before: options.created_before,
        };
        let hint = if self.provider.supports_native_filter() {
            Some(&filter)
        } else {
            None
        };

        let tracks = self.provider.fetch_tracks(hint).await?;
        Ok(normalize::normalize(tracks, options))
    }

    pub async fn list_albums(&self) -> Result<Vec<AggregateRecord>> {
        self.list_aggregates(AggregateKind::Album).await
    }

    pub async fn list_artists(&self) -> Result<Vec<AggregateRecord>> {
        self.list_aggregates(AggregateKind::Artist).await
    }

    pub async fn list_genres(&self) -> Result<Vec<AggregateRecord>> {
        self.list_aggregates(AggregateKind::Genre).await
    }

    pub async fn list_folders(&self) -> Result<Vec<AggregateRecord>> {
        self.list_aggregates(AggregateKind::Folder).await
    }

    pub async fn list_aggregates(&self, kind: AggregateKind) -> Result<Vec<AggregateRecord>> {
        self.ensure_authorized()?;
        let tracks = self.provider.fetch_tracks(None).await?;
        Ok(format::group_tracks(&tracks, kind))
    }

    /// Every asset in one album/artist/genre/folder, unpaginated, in the
    /// backend's enumeration order. Retained for compatibility with callers
    /// that predate cursor pagination.
    pub async fn list_assets_by_group(
        &self,
        kind: AggregateKind,
        group_id: &str,
    ) -> Result<Vec<TrackRecord>> {
        self.ensure_authorized()?;

        let mut filter = NativeTrackFilter::default();
        match kind {
            AggregateKind::Album => filter.album_id = Some(group_id.to_string()),
            AggregateKind::Artist => filter.artist_id = Some(group_id.to_string()),
            AggregateKind::Genre => filter.genre_id = Some(group_id.to_string()),
            AggregateKind::Folder => filter.folder_id = Some(group_id.to_string()),
        }
        let hint = if self.provider.supports_native_filter() {
            Some(&filter)
        } else {
            None
        };

        let mut tracks = self.provider.fetch_tracks(hint).await?;
        tracks.retain(|track| format::group_key(track, kind) == Some(group_id));
        Ok(tracks)
    }

    /// Best-effort artwork resolution; `None` covers every failure path,
    /// including missing authorization to the underlying binary store.
    pub async fn load_artwork(&self, artwork: &ArtworkRef) -> Option<ArtworkData> {
        if !self.provider.is_authorized() {
            return None;
        }
        self.provider.load_artwork(artwork).await
    }
}

#[cfg(test)]
mod tests {
    use super::{normalize, MusicLibrary};
    use musiclib_bridge_core::{
        AggregateKind, ArtworkRef, AssetQueryOptions, LibraryError, SortSpec, TrackRecord,
    };
    use musiclib_bridge_providers::memory::MemoryProvider;
    use musiclib_bridge_providers::NullProvider;

    fn track(id: &str, created_at: i64, album_id: Option<&str>) -> TrackRecord {
        TrackRecord {
            id: id.into(),
            title: format!("Track {id}"),
            artist: "Artist".into(),
            duration_seconds: 60.0,
            created_at,
            modified_at: created_at,
            album_id: album_id.map(Into::into),
            artist_id: Some("7".into()),
            genre_id: None,
            folder_id: None,
            album: album_id.map(|_| "Album".into()),
            genre: None,
            folder: None,
            artwork: None,
            source_uri: None,
        }
    }

    fn library_of(tracks: Vec<TrackRecord>) -> MusicLibrary {
        MusicLibrary::new(Box::new(MemoryProvider::new(tracks)))
    }

    #[tokio::test]
    async fn queries_without_authorization_reject_distinctly() {
        let provider = MemoryProvider::new(vec![track("1", 0, None)])
            .with_authorization(false, true);
        let library = MusicLibrary::new(Box::new(provider));

        let err = library
            .list_assets(&AssetQueryOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E_NO_PERMISSIONS");

        let err = library.list_albums().await.unwrap_err();
        assert_eq!(err.code(), "E_NO_PERMISSIONS");

        let auth = library.request_authorization().await;
        assert!(!auth.granted);
        assert!(auth.can_ask_again);
    }

    #[tokio::test]
    async fn validation_rejects_before_any_fetch() {
        let library = library_of(vec![track("1", 0, None)]);

        for first in [0, -1, 1001] {
            let err = library
                .list_assets(&AssetQueryOptions {
                    first,
                    ..Default::default()
                })
                .await
                .unwrap_err();
            assert!(matches!(err, LibraryError::InvalidPageSize { .. }));
        }

        let err = library
            .list_assets(&AssetQueryOptions {
                after: Some("not-a-cursor".into()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E_CURSOR");
    }

    #[tokio::test]
    async fn missing_backend_is_unavailable_not_empty() {
        let library = MusicLibrary::new(Box::new(NullProvider));
        let err = library
            .list_assets(&AssetQueryOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E_UNAVAILABLE");
    }

    #[tokio::test]
    async fn native_prefilter_changes_nothing_observable() {
        // The memory backend pre-filters natively; running the same
        // normalization over the raw snapshot must give identical output.
        let tracks = vec![
            track("1", 100, Some("a")),
            track("2", 300, Some("b")),
            track("3", 200, Some("a")),
        ];
        let options = AssetQueryOptions {
            album: Some("a".into()),
            sort_by: SortSpec::parse_list(&["creationTime ASC"]),
            ..Default::default()
        };

        let library = library_of(tracks.clone());
        let through_backend = library.list_assets(&options).await.unwrap();
        let through_normalizer = normalize::normalize(tracks, &options);

        assert_eq!(through_backend, through_normalizer);
        assert_eq!(through_backend.total_count, 2);
    }

    #[tokio::test]
    async fn aggregates_and_group_listing_agree() {
        let library = library_of(vec![
            track("1", 1, Some("a")),
            track("2", 2, Some("b")),
            track("3", 3, Some("a")),
        ]);

        let albums = library.list_albums().await.unwrap();
        assert_eq!(albums.len(), 2);
        assert_eq!(albums[0].id, "a");
        assert_eq!(albums[0].asset_count, 2);

        let members = library
            .list_assets_by_group(AggregateKind::Album, "a")
            .await
            .unwrap();
        let ids: Vec<&str> = members.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[tokio::test]
    async fn artwork_without_authorization_is_none_not_error() {
        let provider = MemoryProvider::new(vec![track("1", 0, None)])
            .with_authorization(false, false);
        let library = MusicLibrary::new(Box::new(provider));

        assert!(library
            .load_artwork(&ArtworkRef::for_asset("1"))
            .await
            .is_none());
    }

    #[tokio::test]
    async fn change_subscription_receives_signals() {
        let library = library_of(Vec::new());
        let mut sub = library.subscribe();
        library.notifier().notify();
        assert!(sub.next().await.is_some());
    }
}
