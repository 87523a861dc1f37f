use serde::{Deserialize, Serialize};

/// Engine settings, loadable from `panelink.toml`.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct Settings {
    /// Seconds between in-place panel refreshes.
    pub refresh_secs: u64,
    /// Progress bar width in cells.
    pub progress_width: usize,
    /// Items per queue browser page.
    pub queue_page_size: usize,
    /// Maximum candidates offered in a track selection menu.
    pub search_limit: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            refresh_secs: 3,
            progress_width: 20,
            queue_page_size: 8,
            search_limit: 10,
        }
    }
}

impl Settings {
    /// Load `panelink.toml` from the working directory. A missing file means
    /// defaults; a present but malformed file is an error.
    pub fn load() -> Result<Self, toml::de::Error> {
        match std::fs::read_to_string("panelink.toml") {
            Ok(raw) => toml::from_str(&raw),
            Err(_) => Ok(Self::default()),
        }
    }
}
