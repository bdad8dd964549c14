use ratatui::buffer::Buffer;
use ratatui::layout::Alignment;
use ratatui::layout::Rect;
use ratatui::style::Style;
use unicode_width::UnicodeWidthChar;
use unicode_width::UnicodeWidthStr;

use crate::viewport::ViewportState;

pub fn render_scrollbar(area: Rect, buf: &mut Buffer, state: &ViewportState, style: Style) {
    buf.set_style(area, style);
    if area.height == 0 {
        return;
    }
    if state.content_h <= state.viewport_h as u32 || state.content_h == 0 {
        for dy in 0..area.height {
            buf.set_stringn(area.x, area.y + dy, " ", 1, style);
        }
        return;
    }

    let track_h = area.height as f64;
    let thumb_h = ((state.viewport_h as f64 / state.content_h as f64) * track_h)
        .round()
        .clamp(1.0, track_h) as u16;

    let max_y = state
        .content_h
        .saturating_sub(state.viewport_h as u32)
        .max(1) as f64;
    let thumb_top = ((state.y as f64 / max_y) * (track_h - thumb_h as f64))
        .round()
        .clamp(0.0, (track_h - thumb_h as f64).max(0.0)) as u16;

    for dy in 0..area.height {
        let ch = if dy >= thumb_top && dy < thumb_top + thumb_h {
            "█"
        } else {
            " "
        };
        buf.set_stringn(area.x, area.y + dy, ch, 1, style);
    }
}

/// Draw `input` starting `start_col` display columns into the string, writing
/// at most `max_cols` columns at `(x, y)`.
///
/// Wide characters straddling the left clip edge are skipped whole.
pub fn render_str_clipped(
    x: u16,
    y: u16,
    start_col: u32,
    max_cols: u16,
    buf: &mut Buffer,
    input: &str,
    style: Style,
) {
    if max_cols == 0 {
        return;
    }

    let start_col = start_col as usize;
    let max_cols = max_cols as usize;
    let mut col = 0usize;
    let mut out_cols = 0usize;
    let mut dx = 0u16;

    let mut tmp = [0u8; 4];

    for ch in input.chars() {
        let w = UnicodeWidthChar::width(ch).unwrap_or(0);
        if w == 0 {
            continue;
        }
        // Skip columns left of the clip edge; a wide char overlapping the
        // edge is dropped entirely.
        if col + w <= start_col || (col < start_col && col + w > start_col) {
            col += w;
            continue;
        }
        if out_cols + w > max_cols {
            return;
        }

        let s = ch.encode_utf8(&mut tmp);
        if let Some(cell) = buf.cell_mut((x + dx, y)) {
            cell.set_style(style);
            cell.set_symbol(s);
        }
        dx += 1;
        out_cols += 1;
        col += w;

        if w == 2 {
            if out_cols >= max_cols {
                return;
            }
            if let Some(cell) = buf.cell_mut((x + dx, y)) {
                cell.set_style(style);
                cell.set_symbol("");
            }
            dx += 1;
            out_cols += 1;
        }
    }
}

/// Truncate `input` to at most `max_cols` display columns.
pub fn truncate_to_width(input: &str, max_cols: u16) -> &str {
    let max_cols = max_cols as usize;
    let mut col = 0usize;
    for (i, ch) in input.char_indices() {
        let w = UnicodeWidthChar::width(ch).unwrap_or(0);
        if col + w > max_cols {
            return &input[..i];
        }
        col += w;
    }
    input
}

/// Draw `input` aligned inside a `width`-column slot at `(x, y)`.
///
/// Text wider than the slot is truncated from the right regardless of
/// alignment.
pub fn render_aligned(
    x: u16,
    y: u16,
    width: u16,
    buf: &mut Buffer,
    input: &str,
    align: Alignment,
    style: Style,
) {
    if width == 0 {
        return;
    }
    let text = truncate_to_width(input, width);
    let text_w = UnicodeWidthStr::width(text) as u16;
    let pad = width.saturating_sub(text_w);
    let dx = match align {
        Alignment::Left => 0,
        Alignment::Center => pad / 2,
        Alignment::Right => pad,
    };
    buf.set_stringn(x + dx, y, text, width.saturating_sub(dx) as usize, style);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_at_display_width() {
        assert_eq!(truncate_to_width("abcdef", 3), "abc");
        assert_eq!(truncate_to_width("abc", 10), "abc");
    }

    #[test]
    fn truncates_wide_chars_whole() {
        assert_eq!(truncate_to_width("你好", 3), "你");
        assert_eq!(truncate_to_width("你好", 4), "你好");
    }

    #[test]
    fn aligned_render_clips_and_pads() {
        let mut buf = Buffer::empty(Rect::new(0, 0, 6, 1));
        render_aligned(
            0,
            0,
            6,
            &mut buf,
            "ab",
            Alignment::Right,
            Style::default(),
        );
        assert_eq!(buf.cell((4, 0)).map(|c| c.symbol()), Some("a"));
        assert_eq!(buf.cell((5, 0)).map(|c| c.symbol()), Some("b"));
    }
}
