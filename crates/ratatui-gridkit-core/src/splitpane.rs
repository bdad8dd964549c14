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
use crate::theme::Theme;

/// Split direction. `Horizontal` lays panes side by side with a vertical
/// divider; `Vertical` stacks them with a horizontal divider.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SplitAxis {
    Horizontal,
    Vertical,
}

#[derive(Clone, Debug)]
pub struct SplitPaneOptions {
    pub min_first: u16,
    pub min_second: u16,
    pub divider_style: Style,
}

impl Default for SplitPaneOptions {
    fn default() -> Self {
        Self {
            min_first: 4,
            min_second: 4,
            divider_style: Style::default(),
        }
    }
}

#[derive(Clone, Debug)]
pub enum SplitAction {
    None,
    Redraw,
    Event(SplitEvent),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SplitEvent {
    /// Committed divider position: cells allotted to the first pane.
    PositionChanged { position: u16 },
}

#[derive(Clone, Copy, Debug)]
struct DividerDrag {
    start_position: u16,
    start_pointer: u16,
}

/// Two panes split by a draggable one-cell divider.
///
/// The host calls [`SplitPane::layout`] to get the pane rects, renders its
/// own content into them, then [`SplitPane::render_divider`]. Dragging the
/// divider is a session: the position applies live, commits on release, and
/// reverts on Esc.
pub struct SplitPane {
    axis: SplitAxis,
    position: u16,
    drag: Option<DividerDrag>,
    options: SplitPaneOptions,
    emitter: Emitter<SplitEvent>,
    area: Option<Rect>,
}

impl SplitPane {
    pub fn new(axis: SplitAxis, position: u16) -> Self {
        Self {
            axis,
            position,
            drag: None,
            options: SplitPaneOptions::default(),
            emitter: Emitter::new(),
            area: None,
        }
    }

    pub fn with_options(axis: SplitAxis, position: u16, options: SplitPaneOptions) -> Self {
        let mut pane = Self::new(axis, position);
        pane.options = options;
        pane
    }

    pub fn subscribe(&mut self, handler: impl FnMut(&SplitEvent) + 'static) {
        self.emitter.subscribe(handler);
    }

    pub fn axis(&self) -> SplitAxis {
        self.axis
    }

    /// Cells allotted to the first pane.
    pub fn position(&self) -> u16 {
        self.position
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Split `area` into the two pane rects, clamping the divider position
    /// to the pane minimums. The divider occupies one cell between them.
    pub fn layout(&mut self, area: Rect) -> (Rect, Rect) {
        self.area = Some(area);
        let total = match self.axis {
            SplitAxis::Horizontal => area.width,
            SplitAxis::Vertical => area.height,
        };
        self.position = clamp_position(
            self.position,
            total,
            self.options.min_first,
            self.options.min_second,
        );
        let p = self.position;
        match self.axis {
            SplitAxis::Horizontal => (
                Rect::new(area.x, area.y, p, area.height),
                Rect::new(
                    area.x + p + 1,
                    area.y,
                    area.width.saturating_sub(p + 1),
                    area.height,
                ),
            ),
            SplitAxis::Vertical => (
                Rect::new(area.x, area.y, area.width, p),
                Rect::new(
                    area.x,
                    area.y + p + 1,
                    area.width,
                    area.height.saturating_sub(p + 1),
                ),
            ),
        }
    }

    pub fn render_divider(&self, buf: &mut Buffer, theme: &Theme) {
        let Some(area) = self.area else {
            return;
        };
        let style = if self.options.divider_style == Style::default() {
            theme.border
        } else {
            self.options.divider_style
        };
        match self.axis {
            SplitAxis::Horizontal => {
                let x = area.x + self.position;
                for dy in 0..area.height {
                    buf.set_stringn(x, area.y + dy, "│", 1, style);
                }
            }
            SplitAxis::Vertical => {
                let y = area.y + self.position;
                for dx in 0..area.width {
                    buf.set_stringn(area.x + dx, y, "─", 1, style);
                }
            }
        }
    }

    pub fn handle_event(&mut self, event: InputEvent) -> SplitAction {
        match event {
            InputEvent::Key(key) => self.handle_key(key),
            InputEvent::Mouse(mouse) => self.handle_mouse(mouse),
            InputEvent::Paste(_) => SplitAction::None,
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> SplitAction {
        if key.code == KeyCode::Esc {
            let Some(drag) = self.drag.take() else {
                return SplitAction::None;
            };
            self.position = drag.start_position;
            log::trace!("divider drag cancelled");
            return SplitAction::Redraw;
        }
        if !key.modifiers.ctrl {
            return SplitAction::None;
        }
        let delta: i32 = match (self.axis, &key.code) {
            (SplitAxis::Horizontal, KeyCode::Left) => -1,
            (SplitAxis::Horizontal, KeyCode::Right) => 1,
            (SplitAxis::Vertical, KeyCode::Up) => -1,
            (SplitAxis::Vertical, KeyCode::Down) => 1,
            _ => return SplitAction::None,
        };
        let next = self.clamped(self.position.saturating_add_signed(delta as i16));
        if next == self.position {
            return SplitAction::None;
        }
        self.position = next;
        self.commit()
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) -> SplitAction {
        let Some(area) = self.area else {
            return SplitAction::None;
        };
        let pointer = match self.axis {
            SplitAxis::Horizontal => mouse.x,
            SplitAxis::Vertical => mouse.y,
        };
        let origin = match self.axis {
            SplitAxis::Horizontal => area.x,
            SplitAxis::Vertical => area.y,
        };
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if pointer != origin + self.position || !in_area(area, &mouse) {
                    return SplitAction::None;
                }
                self.drag = Some(DividerDrag {
                    start_position: self.position,
                    start_pointer: pointer,
                });
                SplitAction::Redraw
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                let Some(drag) = self.drag else {
                    return SplitAction::None;
                };
                let delta = pointer as i32 - drag.start_pointer as i32;
                let next =
                    self.clamped((drag.start_position as i32 + delta).clamp(0, u16::MAX as i32)
                        as u16);
                if next != self.position {
                    self.position = next;
                    return SplitAction::Redraw;
                }
                SplitAction::None
            }
            MouseEventKind::Up(MouseButton::Left) => {
                if self.drag.take().is_none() {
                    return SplitAction::None;
                }
                self.commit()
            }
            _ => SplitAction::None,
        }
    }

    fn clamped(&self, position: u16) -> u16 {
        let total = self.area.map_or(u16::MAX, |a| match self.axis {
            SplitAxis::Horizontal => a.width,
            SplitAxis::Vertical => a.height,
        });
        clamp_position(
            position,
            total,
            self.options.min_first,
            self.options.min_second,
        )
    }

    fn commit(&mut self) -> SplitAction {
        let event = SplitEvent::PositionChanged {
            position: self.position,
        };
        self.emitter.emit(&event);
        SplitAction::Event(event)
    }
}

fn clamp_position(position: u16, total: u16, min_first: u16, min_second: u16) -> u16 {
    let max = total.saturating_sub(min_second.saturating_add(1));
    position.clamp(min_first.min(max), max)
}

fn in_area(area: Rect, mouse: &MouseEvent) -> bool {
    mouse.x >= area.x
        && mouse.x < area.x + area.width
        && mouse.y >= area.y
        && mouse.y < area.y + area.height
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pane() -> SplitPane {
        let mut p = SplitPane::new(SplitAxis::Horizontal, 10);
        p.layout(Rect::new(0, 0, 40, 10));
        p
    }

    #[test]
    fn layout_splits_around_divider() {
        let mut p = pane();
        let (first, second) = p.layout(Rect::new(0, 0, 40, 10));
        assert_eq!(first, Rect::new(0, 0, 10, 10));
        assert_eq!(second, Rect::new(11, 0, 29, 10));
    }

    #[test]
    fn drag_applies_live_and_commits_on_release() {
        let mut p = pane();
        p.handle_event(InputEvent::Mouse(MouseEvent::down(10, 3)));
        assert!(p.is_dragging());
        p.handle_event(InputEvent::Mouse(MouseEvent::drag(16, 3)));
        assert_eq!(p.position(), 16);
        let action = p.handle_event(InputEvent::Mouse(MouseEvent::up(16, 3)));
        assert!(matches!(
            action,
            SplitAction::Event(SplitEvent::PositionChanged { position: 16 })
        ));
    }

    #[test]
    fn cancel_reverts_to_session_start() {
        let mut p = pane();
        p.handle_event(InputEvent::Mouse(MouseEvent::down(10, 3)));
        p.handle_event(InputEvent::Mouse(MouseEvent::drag(20, 3)));
        assert_eq!(p.position(), 20);
        p.handle_event(InputEvent::Key(KeyEvent::new(KeyCode::Esc)));
        assert_eq!(p.position(), 10);
        assert!(!p.is_dragging());
    }

    #[test]
    fn drag_respects_pane_minimums() {
        let mut p = pane();
        p.handle_event(InputEvent::Mouse(MouseEvent::down(10, 3)));
        p.handle_event(InputEvent::Mouse(MouseEvent::drag(0, 3)));
        assert_eq!(p.position(), 4);
        p.handle_event(InputEvent::Mouse(MouseEvent::drag(39, 3)));
        // 40 wide, divider + 4-cell second-pane minimum.
        assert_eq!(p.position(), 35);
    }

    #[test]
    fn ctrl_arrows_nudge_and_commit() {
        let mut p = pane();
        let ctrl_right = KeyEvent::new(KeyCode::Right).with_modifiers(crate::input::KeyModifiers {
            shift: false,
            ctrl: true,
            alt: false,
        });
        let action = p.handle_event(InputEvent::Key(ctrl_right));
        assert!(matches!(
            action,
            SplitAction::Event(SplitEvent::PositionChanged { position: 11 })
        ));
    }
}
