use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use unicode_width::UnicodeWidthStr;

use crate::event::Emitter;
use crate::input::InputEvent;
use crate::input::KeyCode;
use crate::input::KeyEvent;
use crate::input::MouseButton;
use crate::input::MouseEvent;
use crate::input::MouseEventKind;
use crate::theme::Theme;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tab {
    pub title: String,
    pub disabled: bool,
}

impl Tab {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            disabled: false,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }
}

#[derive(Clone, Debug)]
pub struct TabsOptions {
    pub divider: String,
    pub style: Style,
    pub active_style: Style,
    pub disabled_style: Style,
}

impl Default for TabsOptions {
    fn default() -> Self {
        Self {
            divider: " │ ".to_string(),
            style: Style::default(),
            active_style: Style::default(),
            disabled_style: Style::default(),
        }
    }
}

#[derive(Clone, Debug)]
pub enum TabsAction {
    None,
    Redraw,
    Event(TabsEvent),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TabsEvent {
    TabChanged { index: usize },
}

/// Tab strip. Disabled tabs are skipped by keyboard navigation and ignore
/// clicks; every committed switch emits `TabChanged`.
pub struct TabsPanel {
    tabs: Vec<Tab>,
    active: usize,
    options: TabsOptions,
    emitter: Emitter<TabsEvent>,
    /// On-screen x spans of each title from the last render, for click
    /// hit-testing.
    spans: Vec<(u16, u16)>,
    area: Option<Rect>,
}

impl TabsPanel {
    pub fn new(tabs: Vec<Tab>) -> Self {
        let mut panel = Self {
            tabs,
            active: 0,
            options: TabsOptions::default(),
            emitter: Emitter::new(),
            spans: Vec::new(),
            area: None,
        };
        // Never start on a disabled tab.
        if panel.tabs.get(panel.active).is_some_and(|t| t.disabled) {
            if let Some(first) = panel.tabs.iter().position(|t| !t.disabled) {
                panel.active = first;
            }
        }
        panel
    }

    pub fn with_options(tabs: Vec<Tab>, options: TabsOptions) -> Self {
        let mut panel = Self::new(tabs);
        panel.options = options;
        panel
    }

    pub fn subscribe(&mut self, handler: impl FnMut(&TabsEvent) + 'static) {
        self.emitter.subscribe(handler);
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn active(&self) -> usize {
        self.active
    }

    pub fn set_active(&mut self, index: usize) -> TabsAction {
        if index >= self.tabs.len() || self.tabs[index].disabled || index == self.active {
            return TabsAction::None;
        }
        self.active = index;
        let event = TabsEvent::TabChanged { index };
        self.emitter.emit(&event);
        TabsAction::Event(event)
    }

    pub fn handle_event(&mut self, event: InputEvent) -> TabsAction {
        match event {
            InputEvent::Key(key) => self.handle_key(key),
            InputEvent::Mouse(mouse) => self.handle_mouse(mouse),
            InputEvent::Paste(_) => TabsAction::None,
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> TabsAction {
        match key.code {
            KeyCode::Right | KeyCode::Char('l') => self.step(1),
            KeyCode::Left | KeyCode::Char('h') => self.step(-1),
            KeyCode::Char(c) if c.is_ascii_digit() && c != '0' => {
                let index = (c as usize) - ('1' as usize);
                self.set_active(index)
            }
            _ => TabsAction::None,
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) -> TabsAction {
        if !matches!(mouse.kind, MouseEventKind::Down(MouseButton::Left)) {
            return TabsAction::None;
        }
        let Some(area) = self.area else {
            return TabsAction::None;
        };
        if mouse.y != area.y {
            return TabsAction::None;
        }
        let hit = self
            .spans
            .iter()
            .position(|&(start, end)| mouse.x >= start && mouse.x < end);
        match hit {
            Some(index) => self.set_active(index),
            None => TabsAction::None,
        }
    }

    /// Move to the next/previous enabled tab, without wrapping.
    fn step(&mut self, dir: i32) -> TabsAction {
        let mut i = self.active as i64;
        loop {
            i += dir as i64;
            if i < 0 || i >= self.tabs.len() as i64 {
                return TabsAction::None;
            }
            if !self.tabs[i as usize].disabled {
                return self.set_active(i as usize);
            }
        }
    }

    pub fn render(&mut self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        self.area = Some(area);
        self.spans.clear();
        if area.width == 0 || area.height == 0 {
            return;
        }
        let base = patch_or(self.options.style, theme.text_muted);
        let active_style = patch_or(self.options.active_style, theme.accent);
        let disabled_style = patch_or(self.options.disabled_style, theme.disabled);
        buf.set_style(Rect::new(area.x, area.y, area.width, 1), base);

        let mut x = area.x;
        let end = area.x + area.width;
        for (i, tab) in self.tabs.iter().enumerate() {
            if i > 0 {
                let w = UnicodeWidthStr::width(self.options.divider.as_str()) as u16;
                if x + w >= end {
                    self.spans.push((end, end));
                    continue;
                }
                buf.set_stringn(x, area.y, &self.options.divider, w as usize, base);
                x += w;
            }
            let style = if tab.disabled {
                disabled_style
            } else if i == self.active {
                active_style
            } else {
                base
            };
            let w = (UnicodeWidthStr::width(tab.title.as_str()) as u16).min(end.saturating_sub(x));
            buf.set_stringn(x, area.y, &tab.title, w as usize, style);
            self.spans.push((x, x + w));
            x += w;
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

#[cfg(test)]
mod tests {
    use super::*;

    fn panel() -> TabsPanel {
        let mut p = TabsPanel::new(vec![
            Tab::new("Overview"),
            Tab::new("Details").disabled(),
            Tab::new("History"),
        ]);
        let mut buf = Buffer::empty(Rect::new(0, 0, 40, 1));
        p.render(Rect::new(0, 0, 40, 1), &mut buf, &Theme::default());
        p
    }

    #[test]
    fn arrow_navigation_skips_disabled_tabs() {
        let mut p = panel();
        let action = p.handle_event(InputEvent::Key(KeyEvent::new(KeyCode::Right)));
        assert!(matches!(
            action,
            TabsAction::Event(TabsEvent::TabChanged { index: 2 })
        ));
        let action = p.handle_event(InputEvent::Key(KeyEvent::new(KeyCode::Left)));
        assert!(matches!(
            action,
            TabsAction::Event(TabsEvent::TabChanged { index: 0 })
        ));
    }

    #[test]
    fn number_keys_jump_but_not_to_disabled() {
        let mut p = panel();
        assert!(matches!(
            p.handle_event(InputEvent::Key(KeyEvent::new(KeyCode::Char('2')))),
            TabsAction::None
        ));
        assert!(matches!(
            p.handle_event(InputEvent::Key(KeyEvent::new(KeyCode::Char('3')))),
            TabsAction::Event(TabsEvent::TabChanged { index: 2 })
        ));
    }

    #[test]
    fn clicks_hit_title_spans() {
        let mut p = panel();
        // "Overview" spans x 0..8; "History" starts after the divider.
        let (start, _) = p.spans[2];
        let action = p.handle_event(InputEvent::Mouse(MouseEvent::down(start, 0)));
        assert!(matches!(
            action,
            TabsAction::Event(TabsEvent::TabChanged { index: 2 })
        ));
        // Clicking the disabled tab does nothing.
        let (dstart, _) = p.spans[1];
        assert!(matches!(
            p.handle_event(InputEvent::Mouse(MouseEvent::down(dstart, 0))),
            TabsAction::None
        ));
    }

    #[test]
    fn never_starts_on_a_disabled_tab() {
        let p = TabsPanel::new(vec![Tab::new("A").disabled(), Tab::new("B")]);
        assert_eq!(p.active(), 1);
    }
}
