use tracing::{debug, warn};

use crate::{
    backend::PlayerBackend,
    common::types::GuildId,
    protocol::player::PlayerSnapshot,
    render::{self, progress::format_time},
    surface::{Accent, Control, ControlAction, ControlStyle, PanelContent},
};

/// Paginated, mutable view over a guild's queue.
///
/// Holds only the page index. Every render and every mutation re-reads the
/// queue, because the backend advances it concurrently and stale indices
/// must never remove the wrong item.
#[derive(Debug, Clone)]
pub struct QueueBrowser {
    page: usize,
    page_size: usize,
}

/// One fully rebuilt queue page: display content plus the controls for it.
#[derive(Debug, Clone, PartialEq)]
pub struct QueuePage {
    pub content: PanelContent,
    pub controls: Vec<Control>,
}

impl QueueBrowser {
    pub fn new(page_size: usize) -> Self {
        Self {
            page: 0,
            page_size: page_size.max(1),
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn prev_page(&mut self) {
        self.page = self.page.saturating_sub(1);
    }

    /// Moves forward unclamped; `render` clamps against the fresh snapshot.
    pub fn next_page(&mut self) {
        self.page += 1;
    }

    fn page_count(&self, total: usize) -> usize {
        total.div_ceil(self.page_size).max(1)
    }

    /// Build the current page against `snapshot`, clamping the page index
    /// into range first.
    pub fn render(&mut self, snapshot: &PlayerSnapshot) -> QueuePage {
        let total = snapshot.queue.len();
        let page_count = self.page_count(total);
        self.page = self.page.min(page_count - 1);

        let start = self.page * self.page_size;
        let end = (start + self.page_size).min(total);
        let shown = &snapshot.queue[start..end];

        let mut lines = Vec::new();
        if let Some(track) = &snapshot.track {
            lines.push(format!(
                "**Now playing**\n{} | {}\n",
                track.title,
                format_time(track.length)
            ));
        }
        if total > 0 {
            lines.push(format!("🎶 **{total} tracks queued**\n"));
        }
        if !shown.is_empty() {
            lines.push("**Up next:**".to_string());
            for (offset, track) in shown.iter().enumerate() {
                let index = start + offset + 1;
                lines.push(format!(
                    "`{index}.` {} ({})",
                    track.title,
                    format_time(track.length)
                ));
            }
        }
        if lines.is_empty() {
            lines.push("The queue is empty.".to_string());
        }

        // Removal selector lists only the items shown on this page, keyed by
        // their 1-based absolute index.
        let mut controls: Vec<Control> = shown
            .iter()
            .enumerate()
            .map(|(offset, track)| {
                let index = start + offset + 1;
                Control::new(
                    ControlAction::RemoveAt { index },
                    format!("{index}. {}", track.title),
                    ControlStyle::Secondary,
                )
            })
            .collect();

        controls.push(
            Control::new(ControlAction::PagePrev, "<", ControlStyle::Secondary)
                .disabled(self.page == 0),
        );
        controls.push(Control::inert(
            format!("{}/{page_count}", self.page + 1),
            ControlStyle::Primary,
        ));
        controls.push(
            Control::new(ControlAction::PageNext, ">", ControlStyle::Secondary)
                .disabled(self.page + 1 >= page_count),
        );

        let content = render::notice("🎵 Queue", lines.join("\n"), Accent::Info);
        QueuePage { content, controls }
    }

    /// Remove the queued item at 1-based absolute `index`, re-resolving it
    /// against a fresh snapshot first: the queue may have advanced since the
    /// page was rendered. Out of range against the fresh snapshot is a
    /// no-op, not an error. Returns the rebuilt page.
    pub async fn remove<B: PlayerBackend>(
        &mut self,
        backend: &B,
        guild_id: GuildId,
        index: usize,
    ) -> QueuePage {
        let snapshot = backend.snapshot(guild_id).await;
        if index >= 1 && index <= snapshot.queue.len() {
            let target = snapshot.queue[index - 1].clone();
            match backend.remove_queued(guild_id, &target).await {
                Ok(false) => {
                    debug!(guild = %guild_id, index, "queued track already gone, nothing removed");
                }
                Ok(true) => {}
                Err(err) => {
                    warn!(guild = %guild_id, index, error = %err, "queue removal failed");
                }
            }
        } else {
            debug!(guild = %guild_id, index, "stale removal index out of range, ignoring");
        }

        let fresh = backend.snapshot(guild_id).await;
        self.render(&fresh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{MockBackend, track};

    const GUILD: GuildId = GuildId(1);

    fn queue_of(n: usize) -> Vec<crate::protocol::tracks::Track> {
        (1..=n).map(|i| track(&format!("q{i:02}"))).collect()
    }

    fn snapshot_with_queue(n: usize) -> PlayerSnapshot {
        PlayerSnapshot {
            track: Some(track("current0000")),
            queue: queue_of(n),
            ..PlayerSnapshot::default()
        }
    }

    fn page_indicator(page: &QueuePage) -> &str {
        &page
            .controls
            .iter()
            .find(|c| c.action.is_none())
            .expect("no page indicator")
            .label
    }

    #[test]
    fn test_twenty_items_make_three_pages() {
        let mut browser = QueueBrowser::new(8);
        let page = browser.render(&snapshot_with_queue(20));
        assert_eq!(page_indicator(&page), "1/3");
    }

    #[test]
    fn test_out_of_range_page_clamps_to_last() {
        let mut browser = QueueBrowser::new(8);
        for _ in 0..5 {
            browser.next_page();
        }
        let page = browser.render(&snapshot_with_queue(20));
        assert_eq!(browser.page(), 2);
        assert_eq!(page_indicator(&page), "3/3");
        // Last page of 20 shows items 17..=20.
        assert!(page.content.body.contains("`17.`"));
        assert!(page.content.body.contains("`20.`"));
        assert!(!page.content.body.contains("`16.`"));
    }

    #[test]
    fn test_empty_queue_still_has_one_page() {
        let mut browser = QueueBrowser::new(8);
        let snapshot = PlayerSnapshot::default();
        let page = browser.render(&snapshot);
        assert_eq!(page_indicator(&page), "1/1");
        assert!(page.content.body.contains("The queue is empty."));
    }

    #[test]
    fn test_nav_controls_disabled_at_edges() {
        let mut browser = QueueBrowser::new(8);

        let first = browser.render(&snapshot_with_queue(20));
        let prev = |page: &QueuePage| {
            page.controls
                .iter()
                .find(|c| c.action == Some(ControlAction::PagePrev))
                .unwrap()
                .disabled
        };
        let next = |page: &QueuePage| {
            page.controls
                .iter()
                .find(|c| c.action == Some(ControlAction::PageNext))
                .unwrap()
                .disabled
        };
        assert!(prev(&first));
        assert!(!next(&first));

        browser.next_page();
        browser.next_page();
        let last = browser.render(&snapshot_with_queue(20));
        assert!(!prev(&last));
        assert!(next(&last));
    }

    #[test]
    fn test_removal_selector_lists_only_shown_items() {
        let mut browser = QueueBrowser::new(8);
        browser.next_page();
        let page = browser.render(&snapshot_with_queue(20));
        let removals: Vec<usize> = page
            .controls
            .iter()
            .filter_map(|c| match c.action {
                Some(ControlAction::RemoveAt { index }) => Some(index),
                _ => None,
            })
            .collect();
        assert_eq!(removals, (9..=16).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_remove_shifts_following_items_up() {
        let backend = MockBackend::new();
        backend.set_current(Some(track("current0000")));
        backend.set_queue(queue_of(20));

        let mut browser = QueueBrowser::new(8);
        browser.next_page(); // page 1 (zero-based) shows absolute 9..=16
        browser.render(&backend.snapshot(GUILD).await);

        let page = browser.remove(&backend, GUILD, 9).await;
        // The previously-10th item now sits at position 9.
        assert!(page.content.body.contains("`9.` Track q10"));
        assert_eq!(backend.snapshot(GUILD).await.queue.len(), 19);
    }

    #[tokio::test]
    async fn test_remove_out_of_range_is_noop() {
        let backend = MockBackend::new();
        backend.set_queue(queue_of(3));

        let mut browser = QueueBrowser::new(8);
        browser.remove(&backend, GUILD, 10).await;
        assert_eq!(backend.snapshot(GUILD).await.queue.len(), 3);
        assert!(
            !backend
                .calls()
                .iter()
                .any(|call| call.starts_with("remove_queued")),
            "no removal call should reach the backend"
        );
    }

    #[tokio::test]
    async fn test_remove_reresolves_against_fresh_queue() {
        let backend = MockBackend::new();
        backend.set_queue(queue_of(5));

        let mut browser = QueueBrowser::new(8);
        browser.render(&backend.snapshot(GUILD).await);

        // The queue advances before the user activates the selector.
        backend.set_queue(queue_of(5)[1..].to_vec());

        browser.remove(&backend, GUILD, 2).await;
        let fresh = backend.snapshot(GUILD).await;
        // Index 2 resolved against the fresh queue (q03), not the stale one.
        assert!(!fresh.queue.iter().any(|t| t.identifier == "q03"));
        assert!(fresh.queue.iter().any(|t| t.identifier == "q02"));
    }
}
