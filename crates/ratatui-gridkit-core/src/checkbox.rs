use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;

use crate::event::Emitter;
use crate::input::InputEvent;
use crate::input::KeyCode;
use crate::input::KeyEvent;
use crate::input::MouseButton;
use crate::input::MouseEvent;
use crate::input::MouseEventKind;
use crate::render;
use crate::theme::Theme;

#[derive(Clone, Debug)]
pub struct CheckboxOptions {
    pub checked_glyph: String,
    pub unchecked_glyph: String,
    pub style: Style,
    pub focus_style: Style,
}

impl Default for CheckboxOptions {
    fn default() -> Self {
        Self {
            checked_glyph: "[x]".to_string(),
            unchecked_glyph: "[ ]".to_string(),
            style: Style::default(),
            focus_style: Style::default(),
        }
    }
}

#[derive(Clone, Debug)]
pub enum CheckboxAction {
    None,
    Redraw,
    Event(CheckboxEvent),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CheckboxEvent {
    Toggled(bool),
}

/// Labelled two-state toggle. Space (or a click anywhere on the rendered
/// line) flips it; disabled checkboxes ignore input.
pub struct Checkbox {
    label: String,
    checked: bool,
    disabled: bool,
    focused: bool,
    options: CheckboxOptions,
    emitter: Emitter<CheckboxEvent>,
    area: Option<Rect>,
}

impl Checkbox {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            checked: false,
            disabled: false,
            focused: false,
            options: CheckboxOptions::default(),
            emitter: Emitter::new(),
            area: None,
        }
    }

    pub fn with_options(label: impl Into<String>, options: CheckboxOptions) -> Self {
        let mut cb = Self::new(label);
        cb.options = options;
        cb
    }

    pub fn subscribe(&mut self, handler: impl FnMut(&CheckboxEvent) + 'static) {
        self.emitter.subscribe(handler);
    }

    pub fn checked(&self) -> bool {
        self.checked
    }

    pub fn set_checked(&mut self, checked: bool) {
        self.checked = checked;
    }

    pub fn disabled(&self) -> bool {
        self.disabled
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    pub fn handle_event(&mut self, event: InputEvent) -> CheckboxAction {
        if self.disabled {
            return CheckboxAction::None;
        }
        match event {
            InputEvent::Key(KeyEvent {
                code: KeyCode::Char(' '),
                ..
            }) => self.toggle(),
            InputEvent::Mouse(MouseEvent {
                x,
                y,
                kind: MouseEventKind::Down(MouseButton::Left),
                ..
            }) => {
                let hit = self.area.is_some_and(|a| {
                    x >= a.x && x < a.x + a.width && y >= a.y && y < a.y + a.height
                });
                if hit {
                    self.toggle()
                } else {
                    CheckboxAction::None
                }
            }
            _ => CheckboxAction::None,
        }
    }

    fn toggle(&mut self) -> CheckboxAction {
        self.checked = !self.checked;
        let event = CheckboxEvent::Toggled(self.checked);
        self.emitter.emit(&event);
        CheckboxAction::Event(event)
    }

    pub fn render(&mut self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        self.area = Some(area);
        if area.width == 0 || area.height == 0 {
            return;
        }
        let style = if self.disabled {
            theme.disabled
        } else if self.focused {
            patch_or(self.options.focus_style, theme.cursor)
        } else {
            patch_or(self.options.style, theme.text_primary)
        };
        let glyph = if self.checked {
            &self.options.checked_glyph
        } else {
            &self.options.unchecked_glyph
        };
        let text = format!("{glyph} {}", self.label);
        render::render_aligned(
            area.x,
            area.y,
            area.width,
            buf,
            &text,
            ratatui::layout::Alignment::Left,
            style,
        );
    }
}

fn patch_or(option: Style, theme_slot: Style) -> Style {
    if option == Style::default() {
        theme_slot
    } else {
        option
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn space_toggles_and_emits() {
        let mut cb = Checkbox::new("Send reports");
        let action = cb.handle_event(InputEvent::Key(KeyEvent::new(KeyCode::Char(' '))));
        assert!(matches!(
            action,
            CheckboxAction::Event(CheckboxEvent::Toggled(true))
        ));
        assert!(cb.checked());
    }

    #[test]
    fn disabled_checkbox_ignores_input() {
        let mut cb = Checkbox::new("Locked");
        cb.set_disabled(true);
        let action = cb.handle_event(InputEvent::Key(KeyEvent::new(KeyCode::Char(' '))));
        assert!(matches!(action, CheckboxAction::None));
        assert!(!cb.checked());
    }

    #[test]
    fn click_inside_rendered_area_toggles() {
        let mut cb = Checkbox::new("Click me");
        let mut buf = Buffer::empty(Rect::new(0, 0, 20, 1));
        cb.render(Rect::new(0, 0, 20, 1), &mut buf, &Theme::default());
        cb.handle_event(InputEvent::Mouse(MouseEvent::down(3, 0)));
        assert!(cb.checked());
        // A click outside misses.
        cb.handle_event(InputEvent::Mouse(MouseEvent::down(3, 5)));
        assert!(cb.checked());
    }
}
