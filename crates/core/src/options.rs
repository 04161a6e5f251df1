use crate::error::{LibraryError, Result};
use crate::ids;
use serde::{Deserialize, Serialize};

/// Page sizes above this are rejected before any native data is touched.
pub const MAX_PAGE_SIZE: i64 = 1000;
pub const DEFAULT_PAGE_SIZE: i64 = 20;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    CreationTime,
    ModificationTime,
    Duration,
    Title,
    Artist,
}

impl SortKey {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "creationTime" => Some(Self::CreationTime),
            "modificationTime" => Some(Self::ModificationTime),
            "duration" => Some(Self::Duration),
            "title" => Some(Self::Title),
            "artist" => Some(Self::Artist),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreationTime => "creationTime",
            Self::ModificationTime => "modificationTime",
            Self::Duration => "duration",
            Self::Title => "title",
            Self::Artist => "artist",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SortSpec {
    pub key: SortKey,
    pub ascending: bool,
}

impl SortSpec {
    /// Parses the wire form `"<key>"` or `"<key> ASC|DESC"`. Direction
    /// defaults to descending; unrecognized keys yield `None` and are
    /// skipped by callers, never rejected.
    pub fn parse(s: &str) -> Option<Self> {
        let mut parts = s.split_whitespace();
        let key = SortKey::parse(parts.next()?)?;
        let ascending = matches!(parts.next(), Some("ASC"));
        Some(Self { key, ascending })
    }

    pub fn parse_list<S: AsRef<str>>(specs: &[S]) -> Vec<Self> {
        specs.iter().filter_map(|s| Self::parse(s.as_ref())).collect()
    }
}

/// Input options for a paginated asset listing. Not persisted; consumed by
/// one query and dropped.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AssetQueryOptions {
    pub first: i64,
    /// Id of the last item of the previous page.
    pub after: Option<String>,
    pub album: Option<String>,
    pub artist: Option<String>,
    pub genre: Option<String>,
    /// Inclusive epoch-millisecond bounds on creation time.
    pub created_after: Option<i64>,
    pub created_before: Option<i64>,
    /// Declared-order sort keys; the first has highest precedence.
    pub sort_by: Vec<SortSpec>,
}

impl Default for AssetQueryOptions {
    fn default() -> Self {
        Self {
            first: DEFAULT_PAGE_SIZE,
            after: None,
            album: None,
            artist: None,
            genre: None,
            created_after: None,
            created_before: None,
            sort_by: Vec::new(),
        }
    }
}

impl AssetQueryOptions {
    /// Rejects out-of-range page sizes and malformed cursors up front, so a
    /// bad request never reaches the native index.
    pub fn validate(&self) -> Result<()> {
        if self.first <= 0 || self.first > MAX_PAGE_SIZE {
            return Err(LibraryError::InvalidPageSize { first: self.first });
        }
        if let Some(after) = &self.after {
            if ids::parse(after).is_none() {
                return Err(LibraryError::MalformedCursor {
                    cursor: after.clone(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{AssetQueryOptions, SortKey, SortSpec, MAX_PAGE_SIZE};
    use crate::error::LibraryError;

    #[test]
    fn sort_spec_parses_key_and_direction() {
        assert_eq!(
            SortSpec::parse("creationTime ASC"),
            Some(SortSpec {
                key: SortKey::CreationTime,
                ascending: true
            })
        );
        assert_eq!(
            SortSpec::parse("duration DESC"),
            Some(SortSpec {
                key: SortKey::Duration,
                ascending: false
            })
        );
        // Direction defaults to descending when omitted or unrecognized.
        assert_eq!(
            SortSpec::parse("title"),
            Some(SortSpec {
                key: SortKey::Title,
                ascending: false
            })
        );
        assert_eq!(
            SortSpec::parse("artist desc"),
            Some(SortSpec {
                key: SortKey::Artist,
                ascending: false
            })
        );
    }

    #[test]
    fn sort_spec_list_drops_unknown_keys() {
        let specs = SortSpec::parse_list(&["fileSize DESC", "creationTime ASC", "bitrate"]);
        assert_eq!(
            specs,
            vec![SortSpec {
                key: SortKey::CreationTime,
                ascending: true
            }]
        );
    }

    #[test]
    fn validate_enforces_page_size_bounds() {
        for first in [0, -1, MAX_PAGE_SIZE + 1] {
            let options = AssetQueryOptions {
                first,
                ..Default::default()
            };
            match options.validate() {
                Err(LibraryError::InvalidPageSize { first: reported }) => {
                    assert_eq!(reported, first)
                }
                other => panic!("expected InvalidPageSize, got {other:?}"),
            }
        }

        let options = AssetQueryOptions {
            first: MAX_PAGE_SIZE,
            ..Default::default()
        };
        assert!(options.validate().is_ok());
    }

    #[test]
    fn validate_rejects_malformed_cursors() {
        for cursor in ["", "not-an-id", "0", "-5"] {
            let options = AssetQueryOptions {
                after: Some(cursor.to_string()),
                ..Default::default()
            };
            match options.validate() {
                Err(LibraryError::MalformedCursor { cursor: reported }) => {
                    assert_eq!(reported, cursor)
                }
                other => panic!("expected MalformedCursor, got {other:?}"),
            }
        }

        let options = AssetQueryOptions {
            after: Some("91827".to_string()),
            ..Default::default()
        };
        assert!(options.validate().is_ok());
    }
}
