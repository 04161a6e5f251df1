//! Collection formatter: aggregate views over raw track records.

use musiclib_bridge_core::{
    AggregateKind, AggregateRecord, TrackRecord, UNKNOWN_ALBUM, UNKNOWN_GENRE, UNKNOWN_PLAYLIST,
};
use std::collections::HashMap;

/// The grouping key of `track` for `kind`, if the backend provided one.
pub fn group_key(track: &TrackRecord, kind: AggregateKind) -> Option<&str> {
    match kind {
        AggregateKind::Album => track.album_id.as_deref(),
        AggregateKind::Artist => track.artist_id.as_deref(),
        AggregateKind::Genre => track.genre_id.as_deref(),
        AggregateKind::Folder => track.folder_id.as_deref(),
    }
}

/// Groups tracks into one aggregate per distinct key, in first-encounter
/// order; tracks without a key for this grouping are skipped. The
/// representative member supplying display metadata is the first track
/// enumerated for its group — this follows the backend's enumeration order
/// and is implementation-defined, not guaranteed stable across backends or
/// backend versions.
pub fn group_tracks(tracks: &[TrackRecord], kind: AggregateKind) -> Vec<AggregateRecord> {
    let mut aggregates: Vec<AggregateRecord> = Vec::new();
    let mut index_by_id: HashMap<&str, usize> = HashMap::new();

    for track in tracks {
        let Some(key) = group_key(track, kind) else {
            continue;
        };
        match index_by_id.get(key) {
            Some(&i) => aggregates[i].asset_count += 1,
            None => {
                index_by_id.insert(key, aggregates.len());
                aggregates.push(new_aggregate(key, track, kind));
            }
        }
    }

    aggregates
}

fn new_aggregate(id: &str, representative: &TrackRecord, kind: AggregateKind) -> AggregateRecord {
    let title = match kind {
        AggregateKind::Album => representative
            .album
            .clone()
            .unwrap_or_else(|| UNKNOWN_ALBUM.to_string()),
        AggregateKind::Artist => representative.artist.clone(),
        AggregateKind::Genre => representative
            .genre
            .clone()
            .unwrap_or_else(|| UNKNOWN_GENRE.to_string()),
        AggregateKind::Folder => representative
            .folder
            .clone()
            .unwrap_or_else(|| UNKNOWN_PLAYLIST.to_string()),
    };

    let is_album = kind == AggregateKind::Album;
    AggregateRecord {
        id: id.to_string(),
        title,
        asset_count: 1,
        artist: is_album.then(|| representative.artist.clone()),
        artwork: if is_album {
            representative.artwork.clone()
        } else {
            None
        },
    }
}
