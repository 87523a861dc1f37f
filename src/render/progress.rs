//! Millisecond clock formatting and the textual progress line.

const TRACK_CELL: &str = "▬";
const CURSOR_CELL: &str = "🔘";

/// `H:MM:SS` when hours are present, `M:SS` otherwise.
pub fn format_time(ms: u64) -> String {
    let total_secs = ms / 1000;
    let hours = total_secs / 3600;
    let mins = (total_secs % 3600) / 60;
    let secs = total_secs % 60;
    if hours > 0 {
        format!("{hours}:{mins:02}:{secs:02}")
    } else {
        format!("{mins}:{secs:02}")
    }
}

/// Cursor cell for `position` within a `width`-cell bar, in `[0, width]`.
/// A zero `length` counts as one millisecond so the division is defined.
pub(crate) fn cursor_cell(position: u64, length: u64, width: usize) -> usize {
    let length = length.max(1);
    let position = position.min(length);
    let cell = (position as f64 / length as f64 * width as f64) as usize;
    cell.min(width)
}

/// `{pos} ┃▬▬🔘▬▬…┃ {total}` — a fixed-width bar with one cursor glyph.
pub fn progress_line(position: u64, length: u64, width: usize) -> String {
    let shown_length = length.max(1);
    let shown_position = position.min(shown_length);
    let cursor = cursor_cell(position, length, width);

    let mut bar = String::new();
    bar.push_str(&TRACK_CELL.repeat(cursor.saturating_sub(1)));
    bar.push_str(CURSOR_CELL);
    bar.push_str(&TRACK_CELL.repeat(width - cursor));

    format!(
        "{} ┃{}┃ {}",
        format_time(shown_position),
        bar,
        format_time(shown_length)
    )
}
