use serde::{Deserialize, Serialize};

use crate::protocol::tracks::Track;

/// Point-in-time read of one guild's player, assumed possibly stale the
/// instant it is taken. Consumers re-read rather than cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSnapshot {
    pub track: Option<Track>,
    /// Playback position in milliseconds.
    pub position: u64,
    pub paused: bool,
    /// Single-track loop flag.
    pub looping: bool,
    /// Volume in percent, 0-1000.
    pub volume: i32,
    /// Pending tracks, insertion order = play order.
    pub queue: Vec<Track>,
}

impl Default for PlayerSnapshot {
    fn default() -> Self {
        Self {
            track: None,
            position: 0,
            paused: false,
            looping: false,
            volume: 100,
            queue: Vec::new(),
        }
    }
}

impl PlayerSnapshot {
    /// Nothing playing and nothing queued.
    pub fn is_idle(&self) -> bool {
        self.track.is_none() && self.queue.is_empty()
    }
}
