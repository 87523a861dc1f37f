//! panelink — now-playing panel lifecycle and synchronization engine.
//!
//! Keeps exactly one live, continuously refreshed "now playing" panel per
//! guild, synchronized against a streaming player backend and an interactive
//! message surface, both supplied by the embedding application as trait
//! implementations. The engine decides when to post a new panel, when to
//! retire a superseded one, when to refresh in place, and how to deduplicate
//! backend track-started notifications against user actions that already
//! displayed the same track.

pub mod backend;
pub mod common;
pub mod config;
pub mod panel;
pub mod protocol;
pub mod queue;
pub mod render;
pub mod session;
pub mod surface;

#[cfg(test)]
pub(crate) mod testutil;

pub use backend::PlayerBackend;
pub use common::errors::{BackendError, Error, Result, SurfaceError};
pub use common::types::{ChannelId, GuildId, MessageId};
pub use config::Settings;
pub use panel::{ActionReply, PanelEngine, PlayOutcome};
pub use protocol::{events::PlayerEvent, player::PlayerSnapshot, tracks::Track};
pub use queue::{QueueBrowser, QueuePage};
pub use session::SessionRegistry;
pub use surface::{
    Accent, Control, ControlAction, ControlStyle, Field, MessageEdit, MessageRef, MessageSurface,
    PanelContent,
};
