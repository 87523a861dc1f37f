use std::{sync::Arc, time::Duration};

use tracing::debug;

use crate::{
    backend::PlayerBackend,
    common::types::GuildId,
    render,
    session::SessionRegistry,
    surface::{MessageEdit, MessageSurface},
};

/// Everything one refresh task needs, cloned out of the engine at spawn
/// time so the task owns its world.
pub(crate) struct RefreshCtx<B, S> {
    pub guild_id: GuildId,
    pub backend: Arc<B>,
    pub surface: Arc<S>,
    pub registry: Arc<SessionRegistry>,
    pub interval: Duration,
    pub progress_width: usize,
}

/// Periodic in-place panel refresh, one task per guild.
///
/// The binding is re-validated on every wake: a command handler or an
/// announcement may have rebound the session between ticks, and whoever
/// posted the newer panel owns the display from then on. Edits patch
/// content only; the control row is left as posted.
pub(crate) async fn refresh_loop<B: PlayerBackend, S: MessageSurface>(ctx: RefreshCtx<B, S>) {
    let mut ticker = tokio::time::interval(ctx.interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    ticker.tick().await; // the first tick completes immediately

    loop {
        ticker.tick().await;

        let snapshot = ctx.backend.snapshot(ctx.guild_id).await;
        let Some(current) = &snapshot.track else {
            debug!(guild = %ctx.guild_id, "playback stopped, ending panel refresh");
            break;
        };

        if let Some(bound) = ctx.registry.bound_track(ctx.guild_id) {
            if bound != current.identifier {
                debug!(guild = %ctx.guild_id, "track changed, ending panel refresh");
                break;
            }
        }

        let Some(panel) = ctx.registry.bound_panel(ctx.guild_id) else {
            // Nothing to edit this tick; the binding may appear later.
            continue;
        };

        let Some(content) = render::now_playing(&snapshot, ctx.progress_width) else {
            break;
        };
        let edit = MessageEdit::content(content);

        if ctx.surface.edit(&panel, &edit).await.is_err() {
            // One recovery attempt: re-resolve the message and retry once.
            match ctx.surface.fetch(panel.channel_id, panel.message_id).await {
                Ok(fresh) => {
                    ctx.registry.rebind_panel(ctx.guild_id, fresh);
                    if ctx.surface.edit(&fresh, &edit).await.is_err() {
                        debug!(guild = %ctx.guild_id, "panel edit failed after refetch, ending refresh");
                        break;
                    }
                }
                Err(_) => {
                    debug!(guild = %ctx.guild_id, "panel message lost, ending refresh");
                    break;
                }
            }
        }
    }

    // Free the slot so a future bind can start a fresh loop. The panel
    // binding itself stays; the explicit stop path owns clearing it.
    ctx.registry.clear_refresh(ctx.guild_id);
}
