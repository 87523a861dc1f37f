use async_trait::async_trait;

use crate::{
    common::{errors::BackendError, types::GuildId},
    protocol::{events::PlayerEvent, player::PlayerSnapshot, tracks::Track},
};

/// The streaming player this engine drives and observes.
///
/// One instance serves every guild. Implementations wrap whatever actually
/// plays audio; this crate never touches decoding or transport, it only
/// reads snapshots, issues control calls, and listens for events.
#[async_trait]
pub trait PlayerBackend: Send + Sync + 'static {
    /// Point-in-time read of the guild's player state.
    async fn snapshot(&self, guild_id: GuildId) -> PlayerSnapshot;

    /// Play `track` now if the player is idle, otherwise append it to the
    /// queue. An immediate start fires a `TrackStart` event.
    async fn play(&self, guild_id: GuildId, track: Track) -> Result<(), BackendError>;

    async fn pause(&self, guild_id: GuildId) -> Result<(), BackendError>;

    async fn resume(&self, guild_id: GuildId) -> Result<(), BackendError>;

    /// Stop playback and clear the queue.
    async fn stop(&self, guild_id: GuildId) -> Result<(), BackendError>;

    /// Drop the current track and advance to the next queued one.
    async fn skip(&self, guild_id: GuildId) -> Result<(), BackendError>;

    /// Volume in percent, 0-1000. Callers validate the range first.
    async fn set_volume(&self, guild_id: GuildId, volume: i32) -> Result<(), BackendError>;

    /// Enable or disable the single-track loop.
    async fn set_loop(&self, guild_id: GuildId, enabled: bool) -> Result<(), BackendError>;

    /// Remove one queued track by identity. Returns false when the track is
    /// no longer in the queue.
    async fn remove_queued(&self, guild_id: GuildId, track: &Track) -> Result<bool, BackendError>;

    /// Resolve a direct URL or identifier into a single track.
    async fn load_track(&self, query: &str) -> Result<Option<Track>, BackendError>;

    /// Free-text search returning up to `limit` candidates, best first.
    async fn search_tracks(&self, query: &str, limit: usize)
    -> Result<Vec<Track>, BackendError>;

    /// Subscribe to unsolicited player events. The receiver stays live for
    /// the lifetime of the backend.
    fn subscribe(&self) -> flume::Receiver<PlayerEvent>;
}
