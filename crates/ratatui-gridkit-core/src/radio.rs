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
pub struct RadioOptions {
    pub selected_glyph: String,
    pub unselected_glyph: String,
    pub style: Style,
    pub selected_style: Style,
}

impl Default for RadioOptions {
    fn default() -> Self {
        Self {
            selected_glyph: "(●)".to_string(),
            unselected_glyph: "( )".to_string(),
            style: Style::default(),
            selected_style: Style::default(),
        }
    }
}

#[derive(Clone, Debug)]
pub enum RadioAction {
    None,
    Event(RadioEvent),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RadioEvent {
    Changed(usize),
}

/// Exclusive option group: exactly one option selected at a time, arrows
/// move the selection.
pub struct RadioGroup {
    options_list: Vec<String>,
    selected: usize,
    disabled: bool,
    options: RadioOptions,
    emitter: Emitter<RadioEvent>,
}

impl RadioGroup {
    pub fn new(options_list: Vec<String>) -> Self {
        Self {
            options_list,
            selected: 0,
            disabled: false,
            options: RadioOptions::default(),
            emitter: Emitter::new(),
        }
    }

    pub fn subscribe(&mut self, handler: impl FnMut(&RadioEvent) + 'static) {
        self.emitter.subscribe(handler);
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_label(&self) -> Option<&str> {
        self.options_list.get(self.selected).map(String::as_str)
    }

    pub fn set_selected(&mut self, index: usize) -> RadioAction {
        if index >= self.options_list.len() || index == self.selected {
            return RadioAction::None;
        }
        self.selected = index;
        let event = RadioEvent::Changed(index);
        self.emitter.emit(&event);
        RadioAction::Event(event)
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    pub fn handle_event(&mut self, event: InputEvent) -> RadioAction {
        if self.disabled {
            return RadioAction::None;
        }
        let InputEvent::Key(KeyEvent { code, .. }) = event else {
            return RadioAction::None;
        };
        match code {
            KeyCode::Down | KeyCode::Char('j') => {
                let next = (self.selected + 1).min(self.options_list.len().saturating_sub(1));
                self.set_selected(next)
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.set_selected(self.selected.saturating_sub(1))
            }
            _ => RadioAction::None,
        }
    }

    pub fn render(&self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let base = patch_or(self.options.style, theme.text_primary);
        let selected_style = patch_or(self.options.selected_style, theme.accent);
        for (i, label) in self.options_list.iter().enumerate() {
            if i as u16 >= area.height {
                break;
            }
            let (glyph, style) = if self.disabled {
                (&self.options.unselected_glyph, theme.disabled)
            } else if i == self.selected {
                (&self.options.selected_glyph, selected_style)
            } else {
                (&self.options.unselected_glyph, base)
            };
            let text = format!("{glyph} {label}");
            render::render_aligned(
                area.x,
                area.y + i as u16,
                area.width,
                buf,
                &text,
                ratatui::layout::Alignment::Left,
                style,
            );
        }
    }
}

fn patch_or(option: Style, theme_slot: Style) -> Style {
    if option == Style::default() {
        theme_slot
    } else {
        option
    }
}
