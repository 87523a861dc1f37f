use serde::{Deserialize, Serialize};

/// A single playable item, as described by the playback backend.
///
/// Read-only to this crate: tracks come out of the backend's load and search
/// operations and are only ever displayed or compared by `identifier`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    /// Stable identity, used for announcement de-duplication.
    pub identifier: String,
    pub title: String,
    pub author: String,
    /// Duration in milliseconds. 0 for live streams.
    pub length: u64,
    pub uri: Option<String>,
}
