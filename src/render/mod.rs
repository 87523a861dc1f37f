//! Builders for everything the engine displays: the now-playing panel, the
//! acknowledgments commands answer with, and the control rows. All pure
//! functions of their inputs.

pub mod progress;

use crate::{
    protocol::{player::PlayerSnapshot, tracks::Track},
    surface::{Accent, Control, ControlAction, ControlStyle, Field, PanelContent},
};
use progress::progress_line;

const FOOTER: &str = "Powered by panelink";

/// Render the now-playing panel for `snapshot`. `None` when nothing is
/// playing — that is "nothing to display", not an error.
pub fn now_playing(snapshot: &PlayerSnapshot, progress_width: usize) -> Option<PanelContent> {
    let track = snapshot.track.as_ref()?;

    let status = if snapshot.paused {
        "⏸ Paused"
    } else {
        "▶ Playing"
    };
    let accent = if snapshot.paused {
        Accent::Warning
    } else {
        Accent::Success
    };
    let line = progress_line(snapshot.position, track.length, progress_width);

    let info = format!(
        "Volume: {}%\nLoop: {}\nQueued: {} tracks",
        snapshot.volume,
        if snapshot.looping { "on" } else { "off" },
        snapshot.queue.len(),
    );

    Some(PanelContent {
        title: "🎶 Now Playing".to_string(),
        body: format!("{}\n{status}\n{line}", track_link(track)),
        fields: vec![
            Field {
                name: "Artist".to_string(),
                value: track.author.clone(),
            },
            Field {
                name: "Status".to_string(),
                value: info,
            },
        ],
        thumbnail: thumbnail_url(track),
        footer: Some(FOOTER.to_string()),
        accent,
    })
}

/// Fallback panel body for a start that raced the first snapshot.
pub fn started_notice(track: &Track) -> PanelContent {
    PanelContent {
        title: "🎶 Playback Started".to_string(),
        body: track_link(track),
        fields: vec![Field {
            name: "Artist".to_string(),
            value: track.author.clone(),
        }],
        thumbnail: thumbnail_url(track),
        footer: Some(FOOTER.to_string()),
        accent: Accent::Success,
    }
}

/// Acknowledgment for a track appended behind the current one.
pub fn queued_ack(track: &Track, position: usize) -> PanelContent {
    PanelContent {
        title: "✅ Added to Queue".to_string(),
        body: format!("{}\nPosition in queue: {position}", track_link(track)),
        fields: vec![Field {
            name: "Artist".to_string(),
            value: track.author.clone(),
        }],
        thumbnail: thumbnail_url(track),
        footer: Some(FOOTER.to_string()),
        accent: Accent::Info,
    }
}

/// Prompt shown above a track selection menu.
pub fn selection_prompt(query: &str, count: usize) -> PanelContent {
    notice(
        "🔎 Select a Track",
        format!("Found {count} results for `{query}`. Pick one from the menu."),
        Accent::Info,
    )
}

/// A plain titled notice with no fields or thumbnail.
pub fn notice(title: impl Into<String>, body: impl Into<String>, accent: Accent) -> PanelContent {
    PanelContent {
        title: title.into(),
        body: body.into(),
        fields: Vec::new(),
        thumbnail: None,
        footer: Some(FOOTER.to_string()),
        accent,
    }
}

/// The player control row. `loop_on` drives the loop toggle's label/style.
pub fn player_controls(loop_on: bool) -> Vec<Control> {
    vec![
        Control::new(
            ControlAction::TogglePause,
            "⏯ Pause/Resume",
            ControlStyle::Primary,
        ),
        Control::new(ControlAction::Skip, "⏭ Skip", ControlStyle::Secondary),
        Control::new(ControlAction::Stop, "⏹ Stop", ControlStyle::Danger),
        Control::new(
            ControlAction::VolumeDelta { step: -10 },
            "🔉 -10",
            ControlStyle::Secondary,
        ),
        Control::new(
            ControlAction::VolumeDelta { step: 10 },
            "🔊 +10",
            ControlStyle::Secondary,
        ),
        Control::new(
            ControlAction::ToggleLoop,
            if loop_on {
                "🔁 Loop: on"
            } else {
                "🔁 Loop: off"
            },
            if loop_on {
                ControlStyle::Success
            } else {
                ControlStyle::Secondary
            },
        ),
    ]
}

/// The player control row with every control disabled, used to retire a
/// superseded panel.
pub fn retired_controls() -> Vec<Control> {
    player_controls(false)
        .into_iter()
        .map(|control| control.disabled(true))
        .collect()
}

fn track_link(track: &Track) -> String {
    match &track.uri {
        Some(uri) => format!("[{}]({uri})", track.title),
        None => track.title.clone(),
    }
}

/// Thumbnail derived from the track identity: only identities in the
/// 11-character video-id format, or tracks from a recognized host, map onto
/// the public thumbnail endpoint. Anything else gets no thumbnail.
fn thumbnail_url(track: &Track) -> Option<String> {
    if track.identifier.is_empty() {
        return None;
    }
    let uri = track.uri.as_deref().unwrap_or("");
    let looks_like_video_id = track.identifier.chars().count() == 11;
    if uri.contains("youtube") || uri.contains("youtu.be") || looks_like_video_id {
        Some(format!(
            "https://img.youtube.com/vi/{}/mqdefault.jpg",
            track.identifier
        ))
    } else {
        None
    }
}
