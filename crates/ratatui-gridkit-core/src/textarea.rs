use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use unicode_width::UnicodeWidthStr;

use crate::event::Emitter;
use crate::input::InputEvent;
use crate::input::KeyCode;
use crate::input::KeyEvent;
use crate::render;
use crate::theme::Theme;
use crate::viewport::ViewportState;

#[derive(Clone, Debug)]
pub struct TextAreaOptions {
    /// Rendered muted while the buffer is empty.
    pub placeholder: String,
    /// Maximum content length in characters; inserts past it are dropped.
    pub max_len: Option<usize>,
    pub show_scrollbar: bool,
    /// When true, Enter submits and Shift+Enter inserts a newline;
    /// otherwise Enter always inserts a newline.
    pub submit_on_enter: bool,
    pub style: Style,
}

impl Default for TextAreaOptions {
    fn default() -> Self {
        Self {
            placeholder: String::new(),
            max_len: None,
            show_scrollbar: true,
            submit_on_enter: false,
            style: Style::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cursor {
    pub row: usize,
    /// Char index within the line.
    pub col: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TextAreaAction {
    None,
    Redraw,
    Event(TextAreaEvent),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TextAreaEvent {
    Changed,
    Submitted(String),
}

/// Multi-line text input.
pub struct TextArea {
    lines: Vec<String>,
    cursor: Cursor,
    disabled: bool,
    options: TextAreaOptions,
    emitter: Emitter<TextAreaEvent>,
    pub state: ViewportState,
}

impl Default for TextArea {
    fn default() -> Self {
        Self::new()
    }
}

impl TextArea {
    pub fn new() -> Self {
        Self {
            lines: vec![String::new()],
            cursor: Cursor::default(),
            disabled: false,
            options: TextAreaOptions::default(),
            emitter: Emitter::new(),
            state: ViewportState::default(),
        }
    }

    pub fn with_options(options: TextAreaOptions) -> Self {
        Self {
            options,
            ..Self::new()
        }
    }

    pub fn subscribe(&mut self, handler: impl FnMut(&TextAreaEvent) + 'static) {
        self.emitter.subscribe(handler);
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into().replace("\r\n", "\n").replace('\r', "\n");
        self.lines = text.split('\n').map(str::to_string).collect();
        if self.lines.is_empty() {
            self.lines.push(String::new());
        }
        self.cursor = Cursor::default();
        self.sync_content();
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn is_empty(&self) -> bool {
        self.lines.len() == 1 && self.lines[0].is_empty()
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    pub fn char_count(&self) -> usize {
        let newlines = self.lines.len().saturating_sub(1);
        self.lines.iter().map(|l| l.chars().count()).sum::<usize>() + newlines
    }

    pub fn handle_event(&mut self, event: InputEvent) -> TextAreaAction {
        if self.disabled {
            return TextAreaAction::None;
        }
        match event {
            InputEvent::Key(key) => self.handle_key(key),
            InputEvent::Paste(text) => {
                let mut changed = false;
                for ch in text.chars() {
                    if ch == '\n' {
                        changed |= self.insert_newline();
                    } else if ch != '\r' {
                        changed |= self.insert_char(ch);
                    }
                }
                if changed {
                    self.changed()
                } else {
                    TextAreaAction::None
                }
            }
            InputEvent::Mouse(_) => TextAreaAction::None,
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> TextAreaAction {
        match key.code {
            KeyCode::Char(c) => {
                if self.insert_char(c) {
                    self.changed()
                } else {
                    TextAreaAction::None
                }
            }
            KeyCode::Enter => {
                if self.options.submit_on_enter && !key.modifiers.shift {
                    let text = self.text();
                    return self.commit(TextAreaEvent::Submitted(text));
                }
                if self.insert_newline() {
                    self.changed()
                } else {
                    TextAreaAction::None
                }
            }
            KeyCode::Backspace => {
                if self.delete_before() {
                    self.changed()
                } else {
                    TextAreaAction::None
                }
            }
            KeyCode::Delete => {
                if self.delete_at() {
                    self.changed()
                } else {
                    TextAreaAction::None
                }
            }
            KeyCode::Left => self.move_cursor(|s| s.cursor_left()),
            KeyCode::Right => self.move_cursor(|s| s.cursor_right()),
            KeyCode::Up => self.move_cursor(|s| s.cursor_vertical(-1)),
            KeyCode::Down => self.move_cursor(|s| s.cursor_vertical(1)),
            KeyCode::Home => self.move_cursor(|s| s.cursor.col = 0),
            KeyCode::End => self.move_cursor(|s| {
                s.cursor.col = s.lines[s.cursor.row].chars().count();
            }),
            _ => TextAreaAction::None,
        }
    }

    fn move_cursor(&mut self, f: impl FnOnce(&mut Self)) -> TextAreaAction {
        let before = self.cursor;
        f(self);
        if self.cursor == before {
            return TextAreaAction::None;
        }
        self.follow_cursor();
        TextAreaAction::Redraw
    }

    fn cursor_left(&mut self) {
        if self.cursor.col > 0 {
            self.cursor.col -= 1;
        } else if self.cursor.row > 0 {
            self.cursor.row -= 1;
            self.cursor.col = self.lines[self.cursor.row].chars().count();
        }
    }

    fn cursor_right(&mut self) {
        let len = self.lines[self.cursor.row].chars().count();
        if self.cursor.col < len {
            self.cursor.col += 1;
        } else if self.cursor.row + 1 < self.lines.len() {
            self.cursor.row += 1;
            self.cursor.col = 0;
        }
    }

    fn cursor_vertical(&mut self, dir: i64) {
        let next = self.cursor.row as i64 + dir;
        if next < 0 || next >= self.lines.len() as i64 {
            return;
        }
        self.cursor.row = next as usize;
        let len = self.lines[self.cursor.row].chars().count();
        self.cursor.col = self.cursor.col.min(len);
    }

    fn insert_char(&mut self, c: char) -> bool {
        if let Some(max) = self.options.max_len
            && self.char_count() >= max
        {
            return false;
        }
        let line = &mut self.lines[self.cursor.row];
        let byte = byte_index(line, self.cursor.col);
        line.insert(byte, c);
        self.cursor.col += 1;
        self.sync_content();
        true
    }

    fn insert_newline(&mut self) -> bool {
        if let Some(max) = self.options.max_len
            && self.char_count() >= max
        {
            return false;
        }
        let line = &mut self.lines[self.cursor.row];
        let byte = byte_index(line, self.cursor.col);
        let rest = line.split_off(byte);
        self.lines.insert(self.cursor.row + 1, rest);
        self.cursor.row += 1;
        self.cursor.col = 0;
        self.sync_content();
        true
    }

    fn delete_before(&mut self) -> bool {
        if self.cursor.col > 0 {
            let line = &mut self.lines[self.cursor.row];
            let byte = byte_index(line, self.cursor.col - 1);
            line.remove(byte);
            self.cursor.col -= 1;
        } else if self.cursor.row > 0 {
            let line = self.lines.remove(self.cursor.row);
            self.cursor.row -= 1;
            self.cursor.col = self.lines[self.cursor.row].chars().count();
            self.lines[self.cursor.row].push_str(&line);
        } else {
            return false;
        }
        self.sync_content();
        true
    }

    fn delete_at(&mut self) -> bool {
        let len = self.lines[self.cursor.row].chars().count();
        if self.cursor.col < len {
            let line = &mut self.lines[self.cursor.row];
            let byte = byte_index(line, self.cursor.col);
            line.remove(byte);
        } else if self.cursor.row + 1 < self.lines.len() {
            let next = self.lines.remove(self.cursor.row + 1);
            self.lines[self.cursor.row].push_str(&next);
        } else {
            return false;
        }
        self.sync_content();
        true
    }

    fn changed(&mut self) -> TextAreaAction {
        self.follow_cursor();
        self.commit(TextAreaEvent::Changed)
    }

    fn commit(&mut self, event: TextAreaEvent) -> TextAreaAction {
        self.emitter.emit(&event);
        TextAreaAction::Event(event)
    }

    fn sync_content(&mut self) {
        let w = self
            .lines
            .iter()
            .map(|l| UnicodeWidthStr::width(l.as_str()) as u32)
            .max()
            .unwrap_or(0);
        self.state.set_content(w, self.lines.len() as u32);
    }

    fn follow_cursor(&mut self) {
        self.state.ensure_visible_y(self.cursor.row as u32);
        let x = cursor_x(&self.lines[self.cursor.row], self.cursor.col) as u32;
        if x < self.state.x {
            self.state.x = x;
        } else if self.state.viewport_w > 0 && x >= self.state.x + self.state.viewport_w as u32 {
            self.state.x = x + 1 - self.state.viewport_w as u32;
        }
    }

    pub fn render(&mut self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let style = if self.disabled {
            theme.disabled
        } else if self.options.style == Style::default() {
            theme.text_primary
        } else {
            self.options.style
        };

        let (text_area, scrollbar_x) = if self.options.show_scrollbar && area.width >= 2 {
            (
                Rect::new(area.x, area.y, area.width - 1, area.height),
                Some(area.x + area.width - 1),
            )
        } else {
            (area, None)
        };
        self.state.set_viewport(text_area.width, text_area.height);
        buf.set_style(text_area, style);

        if self.is_empty() && !self.options.placeholder.is_empty() {
            render::render_aligned(
                text_area.x,
                text_area.y,
                text_area.width,
                buf,
                &self.options.placeholder,
                ratatui::layout::Alignment::Left,
                theme.placeholder,
            );
        } else {
            for dy in 0..text_area.height {
                let idx = self.state.y as usize + dy as usize;
                let Some(line) = self.lines.get(idx) else {
                    break;
                };
                render::render_str_clipped(
                    text_area.x,
                    text_area.y + dy,
                    self.state.x,
                    text_area.width,
                    buf,
                    line,
                    style,
                );
            }
        }

        // Cursor cell, when visible.
        if !self.disabled {
            let cx = cursor_x(&self.lines[self.cursor.row], self.cursor.col) as u32;
            let row = self.cursor.row as u32;
            if row >= self.state.y
                && row < self.state.y + text_area.height as u32
                && cx >= self.state.x
                && cx < self.state.x + text_area.width as u32
            {
                let x = text_area.x + (cx - self.state.x) as u16;
                let y = text_area.y + (row - self.state.y) as u16;
                if let Some(cell) = buf.cell_mut((x, y)) {
                    cell.set_style(theme.cursor);
                }
            }
        }

        if let Some(x) = scrollbar_x {
            render::render_scrollbar(
                Rect::new(x, area.y, 1, area.height),
                buf,
                &self.state,
                theme.text_muted,
            );
        }
    }
}

fn byte_index(line: &str, col: usize) -> usize {
    line.char_indices()
        .nth(col)
        .map(|(i, _)| i)
        .unwrap_or(line.len())
}

/// Display column of the cursor within a line.
fn cursor_x(line: &str, col: usize) -> usize {
    let byte = byte_index(line, col);
    UnicodeWidthStr::width(&line[..byte])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_str(ta: &mut TextArea, s: &str) {
        for c in s.chars() {
            ta.handle_event(InputEvent::Key(KeyEvent::new(KeyCode::Char(c))));
        }
    }

    #[test]
    fn insert_and_newline_round_trip() {
        let mut ta = TextArea::new();
        type_str(&mut ta, "ab");
        ta.handle_event(InputEvent::Key(KeyEvent::new(KeyCode::Enter)));
        type_str(&mut ta, "cd");
        assert_eq!(ta.text(), "ab\ncd");
        assert_eq!(ta.cursor(), Cursor { row: 1, col: 2 });
    }

    #[test]
    fn backspace_joins_lines() {
        let mut ta = TextArea::new();
        ta.set_text("ab\ncd");
        ta.handle_event(InputEvent::Key(KeyEvent::new(KeyCode::Down)));
        ta.handle_event(InputEvent::Key(KeyEvent::new(KeyCode::Backspace)));
        assert_eq!(ta.text(), "abcd");
    }

    #[test]
    fn max_len_drops_inserts() {
        let mut ta = TextArea::with_options(TextAreaOptions {
            max_len: Some(3),
            ..Default::default()
        });
        type_str(&mut ta, "abcdef");
        assert_eq!(ta.text(), "abc");
    }

    #[test]
    fn submit_on_enter_emits_text() {
        let mut ta = TextArea::with_options(TextAreaOptions {
            submit_on_enter: true,
            ..Default::default()
        });
        type_str(&mut ta, "hello");
        let action = ta.handle_event(InputEvent::Key(KeyEvent::new(KeyCode::Enter)));
        assert_eq!(
            action,
            TextAreaAction::Event(TextAreaEvent::Submitted("hello".into()))
        );
    }

    #[test]
    fn paste_inserts_multiline() {
        let mut ta = TextArea::new();
        ta.handle_event(InputEvent::Paste("x\ny".into()));
        assert_eq!(ta.text(), "x\ny");
    }

    #[test]
    fn disabled_textarea_ignores_keys() {
        let mut ta = TextArea::new();
        ta.set_disabled(true);
        type_str(&mut ta, "nope");
        assert!(ta.is_empty());
    }
}
