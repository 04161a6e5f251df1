use serde::{Deserialize, Serialize};

pub const UNKNOWN_TITLE: &str = "Unknown Title";
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";
pub const UNKNOWN_ALBUM: &str = "Unknown Album";
pub const UNKNOWN_GENRE: &str = "Unknown Genre";
pub const UNKNOWN_PLAYLIST: &str = "Unknown Playlist";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum BackendKind {
    Filesystem,
    Memory,
    Null,
}

/// Lazy reference to artwork binary data, in the `music-artwork://<id>` form.
/// Resolution happens through the owning provider and is best-effort.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArtworkRef(String);

impl ArtworkRef {
    pub const SCHEME: &'static str = "music-artwork://";

    pub fn for_asset(asset_id: &str) -> Self {
        Self(format!("{}{asset_id}", Self::SCHEME))
    }

    /// The asset id the reference points at, if the URI is well-formed.
    pub fn asset_id(&self) -> Option<&str> {
        self.0.strip_prefix(Self::SCHEME)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Decoded artwork payload. `data` holds the original encoded bytes;
/// `width`/`height` come from probing them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtworkData {
    pub mime: String,
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

/// Canonical unit of playable audio. Derived read-only snapshot, computed
/// fresh per query; `id` is unique within one result and stable across
/// repeated queries against an unmodified library.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrackRecord {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub duration_seconds: f64,
    /// Milliseconds since epoch.
    pub created_at: i64,
    /// Milliseconds since epoch; equals `created_at` when the backend has
    /// no modification timestamp.
    pub modified_at: i64,
    pub album_id: Option<String>,
    pub artist_id: Option<String>,
    pub genre_id: Option<String>,
    pub folder_id: Option<String>,
    /// Display names for the groupings, where the backend knows them.
    pub album: Option<String>,
    pub genre: Option<String>,
    pub folder: Option<String>,
    pub artwork: Option<ArtworkRef>,
    pub source_uri: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum AggregateKind {
    Album,
    Artist,
    Genre,
    Folder,
}

impl AggregateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Album => "album",
            Self::Artist => "artist",
            Self::Genre => "genre",
            Self::Folder => "folder",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "album" => Some(Self::Album),
            "artist" => Some(Self::Artist),
            "genre" => Some(Self::Genre),
            "folder" => Some(Self::Folder),
            _ => None,
        }
    }
}

/// Named grouping of tracks. `artist` and `artwork` are populated for album
/// aggregates only, from the group's representative member.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AggregateRecord {
    pub id: String,
    pub title: String,
    pub asset_count: u64,
    pub artist: Option<String>,
    pub artwork: Option<ArtworkRef>,
}

/// One page of a normalized asset listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AssetPage {
    pub assets: Vec<TrackRecord>,
    /// Id of the page's last element; empty when the page is empty.
    pub end_cursor: String,
    pub has_next_page: bool,
    /// Size of the filtered and sorted sequence, not the whole library.
    pub total_count: u64,
}

impl AssetPage {
    pub fn empty() -> Self {
        Self {
            assets: Vec::new(),
            end_cursor: String::new(),
            has_next_page: false,
            total_count: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationResult {
    pub granted: bool,
    pub can_ask_again: bool,
}

/// Fire-and-forget library change signal. Carries no diff; it only means
/// "changes may exist".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LibraryEvent {
    Changed,
}

#[cfg(test)]
mod tests {
    use super::ArtworkRef;

    #[test]
    fn artwork_ref_round_trips_asset_id() {
        let artwork = ArtworkRef::for_asset("42");
        assert_eq!(artwork.as_str(), "music-artwork://42");
        assert_eq!(artwork.asset_id(), Some("42"));
    }

    #[test]
    fn artwork_ref_rejects_foreign_schemes() {
        let artwork: ArtworkRef = serde_json::from_str("\"https://example.com/a.png\"").unwrap();
        assert_eq!(artwork.asset_id(), None);
    }
}
