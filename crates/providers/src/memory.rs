//! In-memory music library backend.
//!
//! Models the backend class with native query support: fetches can be
//! pre-filtered the way a SQL-backed media index filters server-side.
//! Also serves as the test double, with configurable authorization and
//! artwork bytes.

use crate::{decode_artwork, MediaLibraryProvider, NativeTrackFilter};
use async_trait::async_trait;
use musiclib_bridge_core::{
    ArtworkData, ArtworkRef, AuthorizationResult, BackendKind, Result, TrackRecord,
};
use std::collections::HashMap;

pub struct MemoryProvider {
    tracks: Vec<TrackRecord>,
    artwork: HashMap<String, Vec<u8>>,
    authorized: bool,
    can_ask_again: bool,
}

impl MemoryProvider {
    pub fn new(tracks: Vec<TrackRecord>) -> Self {
        Self {
            tracks,
            artwork: HashMap::new(),
            authorized: true,
            can_ask_again: false,
        }
    }

    pub fn with_authorization(mut self, granted: bool, can_ask_again: bool) -> Self {
        self.authorized = granted;
        self.can_ask_again = can_ask_again;
        self
    }

    pub fn with_artwork(mut self, asset_id: &str, bytes: Vec<u8>) -> Self {
        self.artwork.insert(asset_id.to_string(), bytes);
        self
    }
}

#[async_trait]
impl MediaLibraryProvider for MemoryProvider {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Memory
    }

    fn is_authorized(&self) -> bool {
        self.authorized
    }

    async fn request_authorization(&self) -> AuthorizationResult {
        AuthorizationResult {
            granted: self.authorized,
            can_ask_again: self.can_ask_again,
        }
    }

    fn supports_native_filter(&self) -> bool {
        true
    }

    async fn fetch_tracks(&self, filter: Option<&NativeTrackFilter>) -> Result<Vec<TrackRecord>> {
        let mut tracks = self.tracks.clone();
        if let Some(filter) = filter {
            tracks.retain(|track| filter.matches(track));
        }
        Ok(tracks)
    }

    async fn load_artwork(&self, artwork: &ArtworkRef) -> Option<ArtworkData> {
        let bytes = self.artwork.get(artwork.asset_id()?)?;
        decode_artwork(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryProvider;
    use crate::{MediaLibraryProvider, NativeTrackFilter};
    use musiclib_bridge_core::{ArtworkRef, TrackRecord};

    fn track(id: &str, album_id: Option<&str>) -> TrackRecord {
        TrackRecord {
            id: id.into(),
            title: format!("Track {id}"),
            artist: "Artist".into(),
            duration_seconds: 60.0,
            created_at: 1_000,
            modified_at: 1_000,
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

    #[tokio::test]
    async fn native_filter_is_applied_when_supplied() {
        let provider = MemoryProvider::new(vec![
            track("1", Some("10")),
            track("2", Some("11")),
            track("3", None),
        ]);

        let all = provider.fetch_tracks(None).await.unwrap();
        assert_eq!(all.len(), 3);

        let filter = NativeTrackFilter {
            album_id: Some("10".into()),
            ..Default::default()
        };
        let scoped = provider.fetch_tracks(Some(&filter)).await.unwrap();
        assert_eq!(scoped.len(), 1);
        assert_eq!(scoped[0].id, "1");
    }

    #[tokio::test]
    async fn authorization_is_configurable() {
        let provider =
            MemoryProvider::new(Vec::new()).with_authorization(false, true);
        assert!(!provider.is_authorized());

        let auth = provider.request_authorization().await;
        assert!(!auth.granted);
        assert!(auth.can_ask_again);
    }

    #[tokio::test]
    async fn artwork_decode_failure_degrades_to_none() {
        let provider = MemoryProvider::new(vec![track("1", None)])
            .with_artwork("1", b"not an image".to_vec());

        assert!(provider
            .load_artwork(&ArtworkRef::for_asset("1"))
            .await
            .is_none());
        assert!(provider
            .load_artwork(&ArtworkRef::for_asset("2"))
            .await
            .is_none());
    }
}
