//! The result normalization pipeline: filter → sort → cursor-paginate.
//!
//! Backends differ in what their query engines can do natively; these
//! stages impose one contract on whatever raw snapshot comes back. All
//! stages are pure, synchronous functions over an in-memory sequence.

use musiclib_bridge_core::{AssetPage, AssetQueryOptions, SortKey, SortSpec, TrackRecord};
use std::cmp::Ordering;
use tracing::debug;

/// Runs the full pipeline over a raw snapshot. `options` must already have
/// passed `AssetQueryOptions::validate`.
pub fn normalize(tracks: Vec<TrackRecord>, options: &AssetQueryOptions) -> AssetPage {
    let mut tracks = apply_filters(tracks, options);
    apply_sort(&mut tracks, &options.sort_by);
    paginate(tracks, options.first as usize, options.after.as_deref())
}

/// Filter stage. Predicates are conjunctive; an absent predicate is no
/// constraint; date bounds are inclusive at both ends. A record whose id
/// field is absent never matches a set filter on it. Input order is
/// preserved.
pub fn apply_filters(
    mut tracks: Vec<TrackRecord>,
    options: &AssetQueryOptions,
) -> Vec<TrackRecord> {
    tracks.retain(|track| {
        id_filter_matches(options.album.as_deref(), track.album_id.as_deref())
            && id_filter_matches(options.artist.as_deref(), track.artist_id.as_deref())
            && id_filter_matches(options.genre.as_deref(), track.genre_id.as_deref())
            && options
                .created_after
                .map_or(true, |bound| track.created_at >= bound)
            && options
                .created_before
                .map_or(true, |bound| track.created_at <= bound)
    });
    tracks
}

fn id_filter_matches(filter: Option<&str>, value: Option<&str>) -> bool {
    match filter {
        None => true,
        Some(want) => value == Some(want),
    }
}

/// Sort stage. Stable; keys are tried in declared order and fall through on
/// ties, so equal-primary records keep their secondary-key order and, with
/// no further keys, their input order. An empty key list keeps the backend's
/// enumeration order untouched. Title and artist compare case-sensitively,
/// byte-wise over UTF-8 (`str`'s `Ord`).
pub fn apply_sort(tracks: &mut [TrackRecord], sort_by: &[SortSpec]) {
    if sort_by.is_empty() {
        return;
    }
    tracks.sort_by(|a, b| compare(a, b, sort_by));
}

fn compare(a: &TrackRecord, b: &TrackRecord, sort_by: &[SortSpec]) -> Ordering {
    for spec in sort_by {
        let ordering = match spec.key {
            SortKey::CreationTime => a.created_at.cmp(&b.created_at),
            SortKey::ModificationTime => a.modified_at.cmp(&b.modified_at),
            SortKey::Duration => a.duration_seconds.total_cmp(&b.duration_seconds),
            SortKey::Title => a.title.cmp(&b.title),
            SortKey::Artist => a.artist.cmp(&b.artist),
        };
        let ordering = if spec.ascending {
            ordering
        } else {
            ordering.reverse()
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// Cursor paginator. The page starts after the element matching `after` in
/// the current sequence, or at the beginning when there is no cursor. A
/// cursor that matches nothing falls back to the first page: the library
/// may have mutated between page requests, and restarting beats failing.
pub fn paginate(tracks: Vec<TrackRecord>, first: usize, after: Option<&str>) -> AssetPage {
    let total_count = tracks.len();
    let start = match after {
        None => 0,
        Some(cursor) => match tracks.iter().position(|t| t.id == cursor) {
            Some(index) => index + 1,
            None => {
                debug!(cursor, "cursor not in current result set; restarting from first page");
                0
            }
        },
    };

    let has_next_page = start + first < total_count;
    let assets: Vec<TrackRecord> = tracks.into_iter().skip(start).take(first).collect();
    let end_cursor = assets.last().map(|t| t.id.clone()).unwrap_or_default();

    AssetPage {
        assets,
        end_cursor,
        has_next_page,
        total_count: total_count as u64,
    }
}
