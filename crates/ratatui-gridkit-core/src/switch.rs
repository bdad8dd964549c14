use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;

use crate::event::Emitter;
use crate::input::InputEvent;
use crate::input::KeyCode;
use crate::input::KeyEvent;
use crate::render;
use crate::theme::Theme;

#[derive(Clone, Debug)]
pub struct SwitchOptions {
    pub on_glyph: String,
    pub off_glyph: String,
    pub style: Style,
    pub on_style: Style,
}

impl Default for SwitchOptions {
    fn default() -> Self {
        Self {
            on_glyph: "[  ●]".to_string(),
            off_glyph: "[●  ]".to_string(),
            style: Style::default(),
            on_style: Style::default(),
        }
    }
}

#[derive(Clone, Debug)]
pub enum SwitchAction {
    None,
    Event(SwitchEvent),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SwitchEvent {
    Changed(bool),
}

/// On/off toggle rendered as a sliding knob. Space or Enter flips it.
pub struct Switch {
    label: String,
    on: bool,
    disabled: bool,
    options: SwitchOptions,
    emitter: Emitter<SwitchEvent>,
}

impl Switch {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            on: false,
            disabled: false,
            options: SwitchOptions::default(),
            emitter: Emitter::new(),
        }
    }

    pub fn subscribe(&mut self, handler: impl FnMut(&SwitchEvent) + 'static) {
        self.emitter.subscribe(handler);
    }

    pub fn is_on(&self) -> bool {
        self.on
    }

    pub fn set_on(&mut self, on: bool) {
        self.on = on;
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    pub fn handle_event(&mut self, event: InputEvent) -> SwitchAction {
        if self.disabled {
            return SwitchAction::None;
        }
        let InputEvent::Key(KeyEvent { code, .. }) = event else {
            return SwitchAction::None;
        };
        match code {
            KeyCode::Char(' ') | KeyCode::Enter => {
                self.on = !self.on;
                let event = SwitchEvent::Changed(self.on);
                self.emitter.emit(&event);
                SwitchAction::Event(event)
            }
            _ => SwitchAction::None,
        }
    }

    pub fn render(&self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let style = if self.disabled {
            theme.disabled
        } else if self.on {
            patch_or(self.options.on_style, theme.success)
        } else {
            patch_or(self.options.style, theme.text_muted)
        };
        let glyph = if self.on {
            &self.options.on_glyph
        } else {
            &self.options.off_glyph
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
    fn toggles_on_space_and_enter() {
        let mut s = Switch::new("Dark mode");
        s.handle_event(InputEvent::Key(KeyEvent::new(KeyCode::Char(' '))));
        assert!(s.is_on());
        let action = s.handle_event(InputEvent::Key(KeyEvent::new(KeyCode::Enter)));
        assert!(matches!(
            action,
            SwitchAction::Event(SwitchEvent::Changed(false))
        ));
    }
}
