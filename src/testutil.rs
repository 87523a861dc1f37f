//! In-memory `PlayerBackend` / `MessageSurface` doubles for engine tests.

use std::sync::{
    Mutex,
    atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering},
};

use async_trait::async_trait;

use crate::{
    backend::PlayerBackend,
    common::{
        errors::{BackendError, SurfaceError},
        types::{ChannelId, GuildId, MessageId},
    },
    protocol::{events::PlayerEvent, player::PlayerSnapshot, tracks::Track},
    surface::{Control, MessageEdit, MessageRef, MessageSurface, PanelContent},
};

pub(crate) fn track(id: &str) -> Track {
    Track {
        identifier: id.to_string(),
        title: format!("Track {id}"),
        author: "Artist".to_string(),
        length: 180_000,
        uri: Some(format!("https://www.youtube.com/watch?v={id}")),
    }
}

/// Scripted backend: one global player state, a manual event channel, and a
/// call log. `play` applies idle-start-or-enqueue semantics but never emits
/// events on its own; tests emit them to control interleaving.
pub(crate) struct MockBackend {
    pub state: Mutex<PlayerSnapshot>,
    pub load_result: Mutex<Option<Track>>,
    pub search_results: Mutex<Vec<Track>>,
    pub calls: Mutex<Vec<String>>,
    pub fail_play: AtomicBool,
    events_tx: flume::Sender<PlayerEvent>,
    events_rx: flume::Receiver<PlayerEvent>,
}

impl MockBackend {
    pub fn new() -> Self {
        let (events_tx, events_rx) = flume::unbounded();
        Self {
            state: Mutex::new(PlayerSnapshot::default()),
            load_result: Mutex::new(None),
            search_results: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
            fail_play: AtomicBool::new(false),
            events_tx,
            events_rx,
        }
    }

    pub fn set_current(&self, current: Option<Track>) {
        self.state.lock().unwrap().track = current;
    }

    pub fn set_queue(&self, queue: Vec<Track>) {
        self.state.lock().unwrap().queue = queue;
    }

    pub fn emit_track_start(&self, guild_id: GuildId) {
        let current = self.state.lock().unwrap().track.clone();
        let track = current.expect("emit_track_start requires a current track");
        self.events_tx
            .send(PlayerEvent::TrackStart { guild_id, track })
            .unwrap();
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }
}

#[async_trait]
impl PlayerBackend for MockBackend {
    async fn snapshot(&self, _guild_id: GuildId) -> PlayerSnapshot {
        self.state.lock().unwrap().clone()
    }

    async fn play(&self, _guild_id: GuildId, track: Track) -> Result<(), BackendError> {
        self.record(format!("play:{}", track.identifier));
        if self.fail_play.load(Ordering::SeqCst) {
            return Err(BackendError::Unavailable("scripted failure".into()));
        }
        let mut state = self.state.lock().unwrap();
        if state.track.is_none() && state.queue.is_empty() {
            state.track = Some(track);
            state.position = 0;
        } else {
            state.queue.push(track);
        }
        Ok(())
    }

    async fn pause(&self, _guild_id: GuildId) -> Result<(), BackendError> {
        self.record("pause");
        self.state.lock().unwrap().paused = true;
        Ok(())
    }

    async fn resume(&self, _guild_id: GuildId) -> Result<(), BackendError> {
        self.record("resume");
        self.state.lock().unwrap().paused = false;
        Ok(())
    }

    async fn stop(&self, _guild_id: GuildId) -> Result<(), BackendError> {
        self.record("stop");
        let mut state = self.state.lock().unwrap();
        state.track = None;
        state.queue.clear();
        state.position = 0;
        Ok(())
    }

    async fn skip(&self, _guild_id: GuildId) -> Result<(), BackendError> {
        self.record("skip");
        let mut state = self.state.lock().unwrap();
        state.track = if state.queue.is_empty() {
            None
        } else {
            Some(state.queue.remove(0))
        };
        state.position = 0;
        Ok(())
    }

    async fn set_volume(&self, _guild_id: GuildId, volume: i32) -> Result<(), BackendError> {
        self.record(format!("set_volume:{volume}"));
        self.state.lock().unwrap().volume = volume;
        Ok(())
    }

    async fn set_loop(&self, _guild_id: GuildId, enabled: bool) -> Result<(), BackendError> {
        self.record(format!("set_loop:{enabled}"));
        self.state.lock().unwrap().looping = enabled;
        Ok(())
    }

    async fn remove_queued(
        &self,
        _guild_id: GuildId,
        track: &Track,
    ) -> Result<bool, BackendError> {
        self.record(format!("remove_queued:{}", track.identifier));
        let mut state = self.state.lock().unwrap();
        match state
            .queue
            .iter()
            .position(|t| t.identifier == track.identifier)
        {
            Some(index) => {
                state.queue.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn load_track(&self, query: &str) -> Result<Option<Track>, BackendError> {
        self.record(format!("load_track:{query}"));
        Ok(self.load_result.lock().unwrap().clone())
    }

    async fn search_tracks(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<Track>, BackendError> {
        self.record(format!("search_tracks:{query}:{limit}"));
        let mut results = self.search_results.lock().unwrap().clone();
        results.truncate(limit);
        Ok(results)
    }

    fn subscribe(&self) -> flume::Receiver<PlayerEvent> {
        self.events_rx.clone()
    }
}

#[derive(Debug, Clone)]
pub(crate) struct SentMessage {
    pub message: MessageRef,
    pub content: PanelContent,
    pub controls: Vec<Control>,
}

#[derive(Debug, Clone)]
pub(crate) struct RecordedEdit {
    pub message: MessageRef,
    pub edit: MessageEdit,
}

/// Recording surface. `fail_edits` makes the next N edits fail;
/// `fail_fetch` makes fetches fail.
pub(crate) struct MockSurface {
    pub sent: Mutex<Vec<SentMessage>>,
    pub edits: Mutex<Vec<RecordedEdit>>,
    pub fail_edits: AtomicUsize,
    pub fail_fetch: AtomicBool,
    next_id: AtomicU64,
}

impl MockSurface {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            edits: Mutex::new(Vec::new()),
            fail_edits: AtomicUsize::new(0),
            fail_fetch: AtomicBool::new(false),
            next_id: AtomicU64::new(0),
        }
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn last_sent(&self) -> SentMessage {
        self.sent.lock().unwrap().last().expect("nothing sent").clone()
    }

    pub fn edit_count(&self) -> usize {
        self.edits.lock().unwrap().len()
    }

    pub fn last_edit(&self) -> RecordedEdit {
        self.edits.lock().unwrap().last().expect("nothing edited").clone()
    }
}

#[async_trait]
impl MessageSurface for MockSurface {
    async fn send(
        &self,
        channel_id: ChannelId,
        content: &PanelContent,
        controls: &[Control],
    ) -> Result<MessageRef, SurfaceError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let message = MessageRef {
            channel_id,
            message_id: MessageId(id),
        };
        self.sent.lock().unwrap().push(SentMessage {
            message,
            content: content.clone(),
            controls: controls.to_vec(),
        });
        Ok(message)
    }

    async fn edit(&self, message: &MessageRef, edit: &MessageEdit) -> Result<(), SurfaceError> {
        let remaining = self.fail_edits.load(Ordering::SeqCst);
        if remaining > 0 {
            self.fail_edits.store(remaining - 1, Ordering::SeqCst);
            return Err(SurfaceError::Request("scripted edit failure".into()));
        }
        self.edits.lock().unwrap().push(RecordedEdit {
            message: *message,
            edit: edit.clone(),
        });
        Ok(())
    }

    async fn fetch(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
    ) -> Result<MessageRef, SurfaceError> {
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(SurfaceError::NotFound);
        }
        Ok(MessageRef {
            channel_id,
            message_id,
        })
    }
}
