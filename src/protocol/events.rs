use serde::{Deserialize, Serialize};

use crate::{common::types::GuildId, protocol::tracks::Track};

/// Unsolicited events emitted by the playback backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PlayerEvent {
    /// Fired on every transition to a new current track, including loop
    /// repeats of the same track.
    #[serde(rename = "TrackStartEvent")]
    TrackStart {
        #[serde(rename = "guildId")]
        guild_id: GuildId,
        track: Track,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_start_tagging() {
        let event = PlayerEvent::TrackStart {
            guild_id: GuildId(42),
            track: Track {
                identifier: "abc".into(),
                title: "t".into(),
                author: "a".into(),
                length: 1000,
                uri: None,
            },
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "TrackStartEvent");
        assert_eq!(json["guildId"], 42);
    }
}
