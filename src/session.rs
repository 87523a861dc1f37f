use dashmap::DashMap;
use tokio::task::JoinHandle;

use crate::{
    common::types::{ChannelId, GuildId},
    surface::MessageRef,
};

/// Per-guild panel state. Created lazily on first interaction, removed on
/// the explicit stop command.
#[derive(Default)]
struct SessionState {
    /// Channel where unsolicited announcements are posted.
    announce_channel: Option<ChannelId>,
    /// The live now-playing panel, if one is bound.
    bound_panel: Option<MessageRef>,
    /// Identity of the track `bound_panel` was rendered for.
    bound_track: Option<String>,
    /// Identity of the last announced track, for loop de-duplication.
    last_announced: Option<String>,
    /// One-shot: swallow the next track-started notification.
    suppress_next: bool,
    /// The running refresh loop, at most one per guild.
    refresh_task: Option<JoinHandle<()>>,
}

/// Registry of every guild's panel state.
///
/// All access goes through this type so the invariants hold in one place:
/// panel reference and bound track are written together, the suppression
/// flag is consumed at most once per set, and each guild has at most one
/// live refresh task. Every method is a short synchronous critical section;
/// no map guard is ever held across an await.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: DashMap<GuildId, SessionState>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn announce_channel(&self, guild_id: GuildId) -> Option<ChannelId> {
        self.sessions.get(&guild_id).and_then(|s| s.announce_channel)
    }

    pub fn set_announce_channel(&self, guild_id: GuildId, channel_id: ChannelId) {
        self.sessions.entry(guild_id).or_default().announce_channel = Some(channel_id);
    }

    pub fn bound_panel(&self, guild_id: GuildId) -> Option<MessageRef> {
        self.sessions.get(&guild_id).and_then(|s| s.bound_panel)
    }

    pub fn bound_track(&self, guild_id: GuildId) -> Option<String> {
        self.sessions.get(&guild_id).and_then(|s| s.bound_track.clone())
    }

    /// Bind a freshly posted panel together with the track it shows.
    pub fn bind_panel(&self, guild_id: GuildId, panel: MessageRef, track_id: &str) {
        let mut state = self.sessions.entry(guild_id).or_default();
        state.bound_panel = Some(panel);
        state.bound_track = Some(track_id.to_string());
    }

    /// Replace the bound message reference alone, after a recovery
    /// re-fetch. No-op when the binding was cleared in the meantime.
    pub fn rebind_panel(&self, guild_id: GuildId, panel: MessageRef) {
        if let Some(mut state) = self.sessions.get_mut(&guild_id) {
            if state.bound_panel.is_some() {
                state.bound_panel = Some(panel);
            }
        }
    }

    pub fn last_announced(&self, guild_id: GuildId) -> Option<String> {
        self.sessions.get(&guild_id).and_then(|s| s.last_announced.clone())
    }

    pub fn set_last_announced(&self, guild_id: GuildId, track_id: &str) {
        self.sessions.entry(guild_id).or_default().last_announced = Some(track_id.to_string());
    }

    /// Arm one-shot suppression of the next track-started notification.
    pub fn arm_suppression(&self, guild_id: GuildId) {
        self.sessions.entry(guild_id).or_default().suppress_next = true;
    }

    /// Roll `arm_suppression` back after a failed play call.
    pub fn disarm_suppression(&self, guild_id: GuildId) {
        if let Some(mut state) = self.sessions.get_mut(&guild_id) {
            state.suppress_next = false;
        }
    }

    /// Consume the one-shot suppression flag, reporting whether it was set.
    pub fn consume_suppression(&self, guild_id: GuildId) -> bool {
        match self.sessions.get_mut(&guild_id) {
            Some(mut state) => std::mem::take(&mut state.suppress_next),
            None => false,
        }
    }

    /// Install a refresh task unless a live one already exists. The spawn
    /// closure only runs when the slot is free, so starting is idempotent.
    pub fn ensure_refresh(&self, guild_id: GuildId, spawn: impl FnOnce() -> JoinHandle<()>) {
        let mut state = self.sessions.entry(guild_id).or_default();
        if state
            .refresh_task
            .as_ref()
            .is_some_and(|task| !task.is_finished())
        {
            return;
        }
        state.refresh_task = Some(spawn());
    }

    /// Whether a refresh task is installed and still running.
    pub fn refresh_active(&self, guild_id: GuildId) -> bool {
        self.sessions
            .get(&guild_id)
            .is_some_and(|s| s.refresh_task.as_ref().is_some_and(|task| !task.is_finished()))
    }

    /// Drop the refresh handle; called by the loop itself on exit so a
    /// future bind can start a fresh one.
    pub fn clear_refresh(&self, guild_id: GuildId) {
        if let Some(mut state) = self.sessions.get_mut(&guild_id) {
            state.refresh_task = None;
        }
    }

    /// Tear down the guild's entry, aborting any live refresh task.
    pub fn clear(&self, guild_id: GuildId) {
        if let Some((_, state)) = self.sessions.remove(&guild_id) {
            if let Some(task) = state.refresh_task {
                task.abort();
            }
        }
    }
}
