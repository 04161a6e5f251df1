use serde::{Deserialize, Serialize};
use std::path::PathBuf;

fn default_schema_version() -> u32 {
    1
}

/// Scan settings for the filesystem backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    pub roots: Vec<PathBuf>,
    pub extensions: Vec<String>,
    pub follow_links: bool,
    pub include_hidden: bool,
    pub max_depth: Option<usize>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            roots: Vec::new(),
            extensions: ["mp3", "flac", "wav", "ogg", "m4a", "aac"]
                .iter()
                .map(|e| e.to_string())
                .collect(),
            follow_links: false,
            include_hidden: false,
            max_depth: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigIntervals {
    pub watch_poll_ms: u64,
}

impl Default for ConfigIntervals {
    fn default() -> Self {
        Self {
            watch_poll_ms: 10_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    /// Backend names tried in order; the first one available on this host wins.
    pub backend_priority: Vec<String>,
    pub scan: ScanConfig,
    pub intervals: ConfigIntervals,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            backend_priority: vec!["filesystem".to_string()],
            scan: ScanConfig::default(),
            intervals: ConfigIntervals::default(),
            log_level: "info".to_string(),
        }
    }
}
