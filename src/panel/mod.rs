//! The panel lifecycle engine: decides when a panel is created, retired,
//! rebound, or refreshed, and keeps user commands and backend notifications
//! from double-posting the same track.

mod refresh;

use std::{sync::Arc, time::Duration};

use dashmap::DashMap;
use tracing::{debug, info, warn};

use crate::{
    backend::PlayerBackend,
    common::{
        errors::{Error, Result},
        types::{ChannelId, GuildId},
    },
    config::Settings,
    protocol::{events::PlayerEvent, tracks::Track},
    queue::{QueueBrowser, QueuePage},
    render,
    session::SessionRegistry,
    surface::{Accent, ControlAction, MessageEdit, MessageRef, MessageSurface, PanelContent},
};

use refresh::{RefreshCtx, refresh_loop};

/// Outcome of a play command.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayOutcome {
    /// The track started immediately; a panel was posted and bound.
    Started { track: Track },
    /// The track was appended; an acknowledgment was posted.
    Queued { track: Track, position: usize },
    /// A free-text query produced candidates. Nothing was posted: the
    /// front-end shows `prompt` with its own selection menu and routes the
    /// pick back through `play_selected`.
    Choices {
        prompt: PanelContent,
        tracks: Vec<Track>,
    },
}

/// What the front-end should do with the message that hosted a control.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionReply {
    /// Replace the host message's content (and controls, when present).
    Update(MessageEdit),
    /// Acknowledge silently; the refresh loop or the next announcement owns
    /// the display.
    None,
}

/// The panel lifecycle engine. One instance serves every guild, generic
/// over the playback backend and the front-end message surface.
pub struct PanelEngine<B, S> {
    backend: Arc<B>,
    surface: Arc<S>,
    registry: Arc<SessionRegistry>,
    browsers: DashMap<GuildId, QueueBrowser>,
    settings: Settings,
}

impl<B: PlayerBackend, S: MessageSurface> PanelEngine<B, S> {
    pub fn new(backend: Arc<B>, surface: Arc<S>, settings: Settings) -> Self {
        Self {
            backend,
            surface,
            registry: Arc::new(SessionRegistry::new()),
            browsers: DashMap::new(),
            settings,
        }
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Drain backend events until the subscription closes.
    pub async fn run(&self) {
        let events = self.backend.subscribe();
        while let Ok(event) = events.recv_async().await {
            match event {
                PlayerEvent::TrackStart { guild_id, track } => {
                    self.on_track_started(guild_id, &track).await;
                }
            }
        }
    }

    // -- Commands -----------------------------------------------------------

    /// The play command. URL queries load a single track and either start it
    /// (posting a panel) or enqueue it (posting an ack). Free-text queries
    /// return candidates for a selection menu.
    pub async fn play(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
        query: &str,
    ) -> Result<PlayOutcome> {
        let is_url = query.starts_with("http://") || query.starts_with("https://");
        if is_url {
            let track = self
                .backend
                .load_track(query)
                .await?
                .ok_or_else(|| Error::LoadFailed(query.to_string()))?;
            return self.start_or_enqueue(guild_id, channel_id, track).await;
        }

        let results = self
            .backend
            .search_tracks(query, self.settings.search_limit)
            .await?;
        if results.is_empty() {
            return Err(Error::NoMatches(query.to_string()));
        }
        Ok(PlayOutcome::Choices {
            prompt: render::selection_prompt(query, results.len()),
            tracks: results,
        })
    }

    /// A track picked from a search selection menu; same start-or-enqueue
    /// handling as a direct play.
    pub async fn play_selected(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
        track: Track,
    ) -> Result<PlayOutcome> {
        self.start_or_enqueue(guild_id, channel_id, track).await
    }

    /// The now-playing query: post a fresh panel in `channel_id`, bind it,
    /// and take over refreshing.
    pub async fn now_playing(&self, guild_id: GuildId, channel_id: ChannelId) -> Result<MessageRef> {
        let snapshot = self.backend.snapshot(guild_id).await;
        let Some(track) = snapshot.track.clone() else {
            return Err(Error::NothingPlaying);
        };
        self.post_panel(guild_id, channel_id, &track).await
    }

    pub async fn skip(&self, guild_id: GuildId) -> Result<PanelContent> {
        let snapshot = self.backend.snapshot(guild_id).await;
        if snapshot.is_idle() {
            return Err(Error::EmptyQueue);
        }
        self.backend.skip(guild_id).await?;
        Ok(render::notice(
            "⏭ Skipped",
            "Skipped the current track.",
            Accent::Info,
        ))
    }

    /// Stop playback (the backend also clears its queue) and tear down all
    /// panel state for the guild, aborting the refresh task.
    pub async fn stop(&self, guild_id: GuildId) -> Result<PanelContent> {
        self.backend.stop(guild_id).await?;
        self.registry.clear(guild_id);
        self.browsers.remove(&guild_id);
        info!(guild = %guild_id, "stopped playback and cleared panel state");
        Ok(render::notice(
            "⏹ Stopped",
            "Stopped playback and cleared the queue.",
            Accent::Danger,
        ))
    }

    pub async fn pause(&self, guild_id: GuildId) -> Result<PanelContent> {
        self.backend.pause(guild_id).await?;
        Ok(render::notice("⏸ Paused", "Playback paused.", Accent::Warning))
    }

    pub async fn resume(&self, guild_id: GuildId) -> Result<PanelContent> {
        self.backend.resume(guild_id).await?;
        Ok(render::notice("▶ Resumed", "Playback resumed.", Accent::Success))
    }

    pub async fn toggle_loop(&self, guild_id: GuildId) -> Result<PanelContent> {
        let snapshot = self.backend.snapshot(guild_id).await;
        let enabled = !snapshot.looping;
        self.backend.set_loop(guild_id, enabled).await?;
        Ok(render::notice(
            "🔁 Loop",
            if enabled {
                "Single-track loop enabled."
            } else {
                "Single-track loop disabled."
            },
            Accent::Info,
        ))
    }

    pub async fn set_volume(&self, guild_id: GuildId, level: i32) -> Result<PanelContent> {
        if !(0..=1000).contains(&level) {
            return Err(Error::VolumeOutOfRange(level));
        }
        self.backend.set_volume(guild_id, level).await?;
        Ok(render::notice(
            "🔊 Volume",
            format!("Volume set to {level}%."),
            Accent::Info,
        ))
    }

    /// Record `channel_id` as the guild's announcement channel.
    pub fn set_announce_channel(&self, guild_id: GuildId, channel_id: ChannelId) -> PanelContent {
        self.registry.set_announce_channel(guild_id, channel_id);
        render::notice(
            "✅ Announcement Channel",
            "Now-playing panels will be posted to this channel.",
            Accent::Success,
        )
    }

    /// Open (or reset) the guild's queue browser and build its first page.
    pub async fn open_queue(&self, guild_id: GuildId) -> Result<QueuePage> {
        let snapshot = self.backend.snapshot(guild_id).await;
        if snapshot.is_idle() {
            return Err(Error::EmptyQueue);
        }
        let mut browser = QueueBrowser::new(self.settings.queue_page_size);
        let page = browser.render(&snapshot);
        self.browsers.insert(guild_id, browser);
        Ok(page)
    }

    // -- Control dispatch ---------------------------------------------------

    /// Single dispatch point for control activations.
    pub async fn handle_action(&self, guild_id: GuildId, action: ControlAction) -> Result<ActionReply> {
        match action {
            ControlAction::TogglePause => {
                let snapshot = self.backend.snapshot(guild_id).await;
                if snapshot.paused {
                    self.backend.resume(guild_id).await?;
                } else {
                    self.backend.pause(guild_id).await?;
                }
                self.panel_update(guild_id).await
            }
            ControlAction::Skip => {
                // The track-started notification for the next track reposts.
                self.backend.skip(guild_id).await?;
                Ok(ActionReply::None)
            }
            ControlAction::Stop => {
                self.stop(guild_id).await?;
                Ok(ActionReply::None)
            }
            ControlAction::VolumeDelta { step } => {
                let snapshot = self.backend.snapshot(guild_id).await;
                let level = (snapshot.volume + step).clamp(0, 1000);
                self.backend.set_volume(guild_id, level).await?;
                Ok(ActionReply::None)
            }
            ControlAction::ToggleLoop => {
                let snapshot = self.backend.snapshot(guild_id).await;
                self.backend.set_loop(guild_id, !snapshot.looping).await?;
                self.panel_update(guild_id).await
            }
            ControlAction::PagePrev => self.browse(guild_id, QueueBrowser::prev_page).await,
            ControlAction::PageNext => self.browse(guild_id, QueueBrowser::next_page).await,
            ControlAction::RemoveAt { index } => {
                let Some(mut browser) = self.take_browser(guild_id) else {
                    return Ok(ActionReply::None);
                };
                let page = browser.remove(self.backend.as_ref(), guild_id, index).await;
                self.browsers.insert(guild_id, browser);
                Ok(ActionReply::Update(MessageEdit {
                    content: Some(page.content),
                    controls: Some(page.controls),
                }))
            }
        }
    }

    // -- Backend notifications ---------------------------------------------

    /// Handler for the backend's track-started notification. Fires for every
    /// transition to a new current track, including loop repeats.
    pub async fn on_track_started(&self, guild_id: GuildId, started: &Track) {
        debug!(guild = %guild_id, track = %started.identifier, "track started");

        if self.registry.consume_suppression(guild_id) {
            info!(guild = %guild_id, "suppressing one track-start announcement");
            return;
        }

        let Some(channel_id) = self.registry.announce_channel(guild_id) else {
            info!(guild = %guild_id, "no announcement channel recorded, skipping");
            return;
        };

        // The snapshot, not the event payload, is authoritative for what is
        // playing now.
        let snapshot = self.backend.snapshot(guild_id).await;
        let Some(track) = snapshot.track.clone() else {
            info!(guild = %guild_id, "no current track, skipping announcement");
            return;
        };

        if self.registry.last_announced(guild_id).as_deref() == Some(track.identifier.as_str()) {
            info!(
                guild = %guild_id, track = %track.identifier,
                "same track as last announcement (loop), skipping"
            );
            return;
        }
        self.registry.set_last_announced(guild_id, &track.identifier);

        // Two retirement attempts: the first edit can land slowly while the
        // message is still in flight.
        self.retire_panel(guild_id).await;
        self.retire_panel(guild_id).await;

        let content = render::now_playing(&snapshot, self.settings.progress_width)
            .unwrap_or_else(|| render::started_notice(&track));
        let controls = render::player_controls(snapshot.looping);
        match self.surface.send(channel_id, &content, &controls).await {
            Ok(panel) => {
                self.registry.bind_panel(guild_id, panel, &track.identifier);
                self.ensure_refresh(guild_id);
                info!(guild = %guild_id, channel = %channel_id, "posted now-playing announcement");
            }
            Err(err) => {
                warn!(guild = %guild_id, error = %err, "failed to post announcement panel");
            }
        }
    }

    // -- Internals ----------------------------------------------------------

    /// Shared by the play command and menu selection: decide between an
    /// immediate start (with panel) and an enqueue (with ack).
    async fn start_or_enqueue(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
        track: Track,
    ) -> Result<PlayOutcome> {
        let before = self.backend.snapshot(guild_id).await;
        let starts_now = before.is_idle();

        // An immediate start fires the backend's own notification. Arm
        // suppression before the play call is awaited so the notification
        // can never outrun the flag.
        if starts_now {
            self.registry.arm_suppression(guild_id);
        }
        if let Err(err) = self.backend.play(guild_id, track.clone()).await {
            if starts_now {
                self.registry.disarm_suppression(guild_id);
            }
            return Err(err.into());
        }
        self.registry.set_announce_channel(guild_id, channel_id);

        if starts_now {
            self.registry.set_last_announced(guild_id, &track.identifier);
            self.post_panel(guild_id, channel_id, &track).await?;
            Ok(PlayOutcome::Started { track })
        } else {
            let position = before.queue.len() + 1;
            let ack = render::queued_ack(&track, position);
            self.surface.send(channel_id, &ack, &[]).await?;
            Ok(PlayOutcome::Queued { track, position })
        }
    }

    /// Retire the previous panel, post a fresh one in `channel_id`, bind
    /// it, and make sure the refresh loop is running.
    async fn post_panel(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
        track: &Track,
    ) -> Result<MessageRef> {
        self.retire_panel(guild_id).await;

        let snapshot = self.backend.snapshot(guild_id).await;
        let content = render::now_playing(&snapshot, self.settings.progress_width)
            .unwrap_or_else(|| render::started_notice(track));
        let controls = render::player_controls(snapshot.looping);
        let panel = self.surface.send(channel_id, &content, &controls).await?;

        self.registry.bind_panel(guild_id, panel, &track.identifier);
        self.ensure_refresh(guild_id);
        info!(
            guild = %guild_id, channel = %channel_id, track = %track.identifier,
            "now-playing panel posted"
        );
        Ok(panel)
    }

    /// Best-effort: disable the controls on the currently bound panel. The
    /// failure is dropped on purpose — the message may already be deleted,
    /// and a live old control row is cosmetic, not a correctness problem.
    async fn retire_panel(&self, guild_id: GuildId) {
        let Some(panel) = self.registry.bound_panel(guild_id) else {
            return;
        };
        let edit = MessageEdit::controls(render::retired_controls());
        if let Err(err) = self.surface.edit(&panel, &edit).await {
            debug!(guild = %guild_id, error = %err, "failed to retire old panel");
        }
    }

    fn ensure_refresh(&self, guild_id: GuildId) {
        let ctx = RefreshCtx {
            guild_id,
            backend: Arc::clone(&self.backend),
            surface: Arc::clone(&self.surface),
            registry: Arc::clone(&self.registry),
            interval: Duration::from_secs(self.settings.refresh_secs),
            progress_width: self.settings.progress_width,
        };
        self.registry
            .ensure_refresh(guild_id, move || tokio::spawn(refresh_loop(ctx)));
    }

    /// Rebuild panel content after a state-changing control press so the
    /// host message reflects the change immediately, not on the next tick.
    async fn panel_update(&self, guild_id: GuildId) -> Result<ActionReply> {
        let snapshot = self.backend.snapshot(guild_id).await;
        match render::now_playing(&snapshot, self.settings.progress_width) {
            Some(content) => Ok(ActionReply::Update(MessageEdit {
                content: Some(content),
                controls: Some(render::player_controls(snapshot.looping)),
            })),
            None => Ok(ActionReply::None),
        }
    }

    async fn browse(
        &self,
        guild_id: GuildId,
        nav: impl FnOnce(&mut QueueBrowser),
    ) -> Result<ActionReply> {
        let Some(mut browser) = self.take_browser(guild_id) else {
            return Ok(ActionReply::None);
        };
        nav(&mut browser);
        let snapshot = self.backend.snapshot(guild_id).await;
        let page = browser.render(&snapshot);
        self.browsers.insert(guild_id, browser);
        Ok(ActionReply::Update(MessageEdit {
            content: Some(page.content),
            controls: Some(page.controls),
        }))
    }

    /// Copy the browser out of the map so no guard is held across an await.
    fn take_browser(&self, guild_id: GuildId) -> Option<QueueBrowser> {
        self.browsers.get(&guild_id).map(|b| b.clone())
    }
}
