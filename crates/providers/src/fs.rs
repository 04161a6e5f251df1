//! Filesystem-backed music library.
//!
//! This is the backend class with no native query support: every fetch
//! re-enumerates the configured roots and hands the raw records to the
//! normalizer for filtering, sorting, and pagination. Group ids are derived
//! from tag display names, folders map to parent directories.

use crate::{decode_artwork, MediaLibraryProvider, NativeTrackFilter};
use async_trait::async_trait;
use lofty::file::{AudioFile, TaggedFileExt};
use lofty::probe::Probe;
use lofty::tag::ItemKey;
use musiclib_bridge_core::{
    ids, ArtworkData, ArtworkRef, AuthorizationResult, BackendKind, LibraryError, Result,
    ScanConfig, TrackRecord, UNKNOWN_ARTIST, UNKNOWN_TITLE,
};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use url::Url;
use walkdir::WalkDir;

const BACKEND_NAME: &str = "filesystem";

pub struct FilesystemProvider {
    scan: ScanConfig,
}

impl FilesystemProvider {
    pub fn new(scan: ScanConfig) -> Self {
        Self { scan }
    }

    fn is_audio_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|s| s.to_str())
            .map(|ext| {
                let ext = ext.to_ascii_lowercase();
                self.scan
                    .extensions
                    .iter()
                    .any(|e| e.trim().trim_start_matches('.').eq_ignore_ascii_case(&ext))
            })
            .unwrap_or(false)
    }

    /// Enumerates every audio file under the configured roots, in walk
    /// order. This order is the backend's enumeration order; callers must
    /// not assume anything further about it.
    fn audio_paths(&self) -> Result<Vec<PathBuf>> {
        let mut paths = Vec::new();

        for root in &self.scan.roots {
            if !root.exists() {
                return Err(LibraryError::Unavailable {
                    backend: BACKEND_NAME,
                    reason: format!("library root {} does not exist", root.display()),
                });
            }

            let mut walker = WalkDir::new(root).follow_links(self.scan.follow_links);
            if let Some(depth) = self.scan.max_depth {
                walker = walker.max_depth(depth);
            }

            for entry in walker.into_iter().filter_entry(|e| {
                self.scan.include_hidden || e.depth() == 0 || !is_hidden(e.path())
            }) {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(err) => {
                        let denied = err
                            .io_error()
                            .map(|e| e.kind() == std::io::ErrorKind::PermissionDenied)
                            .unwrap_or(false);
                        if denied {
                            return Err(LibraryError::NotAuthorized);
                        }
                        return Err(LibraryError::AssetQuery {
                            backend: BACKEND_NAME,
                            message: err.to_string(),
                        });
                    }
                };

                let path = entry.path();
                if path.is_file() && self.is_audio_file(path) {
                    paths.push(path.to_path_buf());
                }
            }
        }

        Ok(paths)
    }

    fn find_path_by_id(&self, asset_id: &str) -> Option<PathBuf> {
        self.audio_paths()
            .ok()?
            .into_iter()
            .find(|path| asset_id_for(path) == asset_id)
    }
}

#[async_trait]
impl MediaLibraryProvider for FilesystemProvider {
    fn name(&self) -> &'static str {
        BACKEND_NAME
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Filesystem
    }

    fn is_authorized(&self) -> bool {
        !self.scan.roots.is_empty()
            && self
                .scan
                .roots
                .iter()
                .all(|root| std::fs::read_dir(root).is_ok())
    }

    async fn request_authorization(&self) -> AuthorizationResult {
        // There is no OS prompt to raise for plain directories; access
        // either exists or it does not. A root that exists but is currently
        // unreadable may become readable, so asking again can help there.
        let granted = self.is_authorized();
        AuthorizationResult {
            granted,
            can_ask_again: !granted && self.scan.roots.iter().any(|root| root.exists()),
        }
    }

    async fn fetch_tracks(&self, _filter: Option<&NativeTrackFilter>) -> Result<Vec<TrackRecord>> {
        Ok(self
            .audio_paths()?
            .iter()
            .map(|path| extract_track(path))
            .collect())
    }

    async fn load_artwork(&self, artwork: &ArtworkRef) -> Option<ArtworkData> {
        let asset_id = artwork.asset_id()?;
        let path = self.find_path_by_id(asset_id)?;
        let tagged = Probe::open(&path).ok()?.read().ok()?;
        let tag = tagged.primary_tag().or_else(|| tagged.first_tag())?;
        let picture = tag.pictures().first()?;
        decode_artwork(picture.data())
    }
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

fn asset_id_for(path: &Path) -> String {
    ids::format(ids::derive(("asset", path.to_string_lossy().as_ref())))
}

/// Converts one file into a canonical track record. Never fails: unreadable
/// tags fall back to the file stem and the Unknown-X sentinels.
fn extract_track(path: &Path) -> TrackRecord {
    let mut title = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(UNKNOWN_TITLE)
        .to_string();
    let mut artist: Option<String> = None;
    let mut album: Option<String> = None;
    let mut genre: Option<String> = None;
    let mut duration_seconds = 0.0;
    let mut has_artwork = false;

    if let Ok(tagged) = Probe::open(path).and_then(|probe| probe.read()) {
        duration_seconds = tagged.properties().duration().as_secs_f64();

        if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
            if let Some(v) = tag.get_string(&ItemKey::TrackTitle) {
                if !v.trim().is_empty() {
                    title = v.to_string();
                }
            }
            if let Some(v) = tag.get_string(&ItemKey::TrackArtist) {
                let v = v.trim();
                if !v.is_empty() {
                    artist = Some(v.to_string());
                }
            }
            if let Some(v) = tag.get_string(&ItemKey::AlbumTitle) {
                let v = v.trim();
                if !v.is_empty() {
                    album = Some(v.to_string());
                }
            }
            if let Some(v) = tag.get_string(&ItemKey::Genre) {
                let v = v.trim();
                if !v.is_empty() {
                    genre = Some(v.to_string());
                }
            }
            has_artwork = !tag.pictures().is_empty();
        }
    }

    let artist = artist.unwrap_or_else(|| UNKNOWN_ARTIST.to_string());
    let (created_at, modified_at) = file_times(path);
    let id = asset_id_for(path);

    let album_id = album
        .as_deref()
        .map(|name| ids::format(ids::derive(("album", name))));
    let artist_id = Some(ids::format(ids::derive(("artist", artist.as_str()))));
    let genre_id = genre
        .as_deref()
        .map(|name| ids::format(ids::derive(("genre", name))));
    let folder = path
        .parent()
        .and_then(|p| p.file_name())
        .and_then(|s| s.to_str())
        .map(String::from);
    let folder_id = path
        .parent()
        .map(|p| ids::format(ids::derive(("folder", p.to_string_lossy().as_ref()))));

    TrackRecord {
        artwork: has_artwork.then(|| ArtworkRef::for_asset(&id)),
        source_uri: file_uri(path),
        id,
        title,
        artist,
        duration_seconds,
        created_at,
        modified_at,
        album_id,
        artist_id,
        genre_id,
        folder_id,
        album,
        genre,
        folder,
    }
}

fn epoch_ms(time: SystemTime) -> i64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Creation time is unsupported on some filesystems; modification time then
/// stands in for it, and a missing modification time falls back the other
/// way.
fn file_times(path: &Path) -> (i64, i64) {
    let meta = std::fs::metadata(path).ok();
    let modified = meta
        .as_ref()
        .and_then(|m| m.modified().ok())
        .map(epoch_ms);
    let created = meta
        .as_ref()
        .and_then(|m| m.created().ok())
        .map(epoch_ms);

    let created_at = created.or(modified).unwrap_or(0);
    let modified_at = modified.unwrap_or(created_at);
    (created_at, modified_at)
}

fn file_uri(path: &Path) -> Option<String> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::fs::canonicalize(path).ok()?
    };
    Url::from_file_path(absolute).ok().map(|u| u.to_string())
}
