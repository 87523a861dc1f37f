use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::common::{
    errors::SurfaceError,
    types::{ChannelId, MessageId},
};

/// Reference to a message owned by the front-end surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRef {
    pub channel_id: ChannelId,
    pub message_id: MessageId,
}

/// Accent applied to rendered content; surfaces map it onto their own
/// color scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Accent {
    Info,
    Success,
    Warning,
    Danger,
}

/// One name/value pair shown beside the main body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub value: String,
}

/// Structured display content for one message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelContent {
    pub title: String,
    /// Body lines, newline-separated.
    pub body: String,
    pub fields: Vec<Field>,
    pub thumbnail: Option<String>,
    pub footer: Option<String>,
    pub accent: Accent,
}

/// User activations a control can produce. Every control dispatches through
/// `PanelEngine::handle_action` with one of these tags; there are no
/// per-control callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ControlAction {
    TogglePause,
    Skip,
    Stop,
    /// Adjust volume by a signed step; the engine clamps into range.
    VolumeDelta { step: i32 },
    ToggleLoop,
    PagePrev,
    PageNext,
    /// Remove the queued item at this 1-based absolute index.
    RemoveAt { index: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ControlStyle {
    Primary,
    Secondary,
    Success,
    Danger,
}

/// One interactive control attached to a message. Controls with no action
/// are inert displays (the page indicator) and never dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Control {
    pub action: Option<ControlAction>,
    pub label: String,
    pub style: ControlStyle,
    pub disabled: bool,
}

impl Control {
    pub fn new(action: ControlAction, label: impl Into<String>, style: ControlStyle) -> Self {
        Self {
            action: Some(action),
            label: label.into(),
            style,
            disabled: false,
        }
    }

    /// A display-only control that can never be activated.
    pub fn inert(label: impl Into<String>, style: ControlStyle) -> Self {
        Self {
            action: None,
            label: label.into(),
            style,
            disabled: true,
        }
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }
}

/// Partial edit of an existing message. `None` fields are left untouched,
/// so content can be refreshed without rebuilding controls and controls can
/// be disabled without re-rendering content.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageEdit {
    pub content: Option<PanelContent>,
    pub controls: Option<Vec<Control>>,
}

impl MessageEdit {
    pub fn content(content: PanelContent) -> Self {
        Self {
            content: Some(content),
            controls: None,
        }
    }

    pub fn controls(controls: Vec<Control>) -> Self {
        Self {
            content: None,
            controls: Some(controls),
        }
    }
}

/// The interactive front-end this engine posts panels to.
#[async_trait]
pub trait MessageSurface: Send + Sync + 'static {
    /// Post a new message and return a reference to it.
    async fn send(
        &self,
        channel_id: ChannelId,
        content: &PanelContent,
        controls: &[Control],
    ) -> Result<MessageRef, SurfaceError>;

    /// Apply a partial edit to an existing message.
    async fn edit(&self, message: &MessageRef, edit: &MessageEdit) -> Result<(), SurfaceError>;

    /// Re-resolve a message by id, verifying it still exists.
    async fn fetch(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
    ) -> Result<MessageRef, SurfaceError>;
}
