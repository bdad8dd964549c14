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

/// One reorderable entry. Disabled items render muted and are excluded from
/// being drag sources or drop targets.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SortableItem {
    pub id: String,
    pub label: String,
    pub disabled: bool,
}

impl SortableItem {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            disabled: false,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }
}

#[derive(Clone, Debug)]
pub struct SortableOptions {
    /// Prefix rendered in front of each item as its drag handle.
    pub handle: String,
    pub style: Style,
    pub drag_style: Style,
    pub cursor_style: Style,
}

impl Default for SortableOptions {
    fn default() -> Self {
        Self {
            handle: "≡ ".to_string(),
            style: Style::default(),
            drag_style: Style::default(),
            cursor_style: Style::default(),
        }
    }
}

#[derive(Clone, Debug)]
pub enum SortableAction {
    None,
    Redraw,
    Event(SortableEvent),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SortableEvent {
    /// Full new id ordering after a committed reorder.
    OrderChanged { order: Vec<String> },
    Activated { id: String },
}

#[derive(Clone, Copy, Debug)]
struct DragSession {
    from: usize,
    target: usize,
}

/// Vertical list with pointer-driven drag reordering.
///
/// A drag session never mutates the item list; the rendered preview is a
/// projection. Dropping commits the remove-and-insert reorder and emits the
/// new ordering; cancelling (Esc, or the pointer leaving the list area)
/// restores the original order with no event.
pub struct SortableList {
    items: Vec<SortableItem>,
    cursor: usize,
    drag: Option<DragSession>,
    options: SortableOptions,
    emitter: Emitter<SortableEvent>,
    area: Option<Rect>,
}

impl SortableList {
    pub fn new(items: Vec<SortableItem>) -> Self {
        Self {
            items,
            cursor: 0,
            drag: None,
            options: SortableOptions::default(),
            emitter: Emitter::new(),
            area: None,
        }
    }

    pub fn with_options(items: Vec<SortableItem>, options: SortableOptions) -> Self {
        let mut list = Self::new(items);
        list.options = options;
        list
    }

    pub fn subscribe(&mut self, handler: impl FnMut(&SortableEvent) + 'static) {
        self.emitter.subscribe(handler);
    }

    pub fn items(&self) -> &[SortableItem] {
        &self.items
    }

    pub fn order(&self) -> Vec<String> {
        self.items.iter().map(|i| i.id.clone()).collect()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn handle_event(&mut self, event: InputEvent) -> SortableAction {
        match event {
            InputEvent::Key(key) => self.handle_key(key),
            InputEvent::Mouse(mouse) => self.handle_mouse(mouse),
            InputEvent::Paste(_) => SortableAction::None,
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> SortableAction {
        if key.code == KeyCode::Esc {
            if self.drag.take().is_some() {
                log::trace!("drag cancelled, order restored");
                return SortableAction::Redraw;
            }
            return SortableAction::None;
        }
        match key.code {
            KeyCode::Down if key.modifiers.shift => self.move_item(1),
            KeyCode::Up if key.modifiers.shift => self.move_item(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor(-1),
            KeyCode::Enter => {
                let Some(item) = self.items.get(self.cursor) else {
                    return SortableAction::None;
                };
                if item.disabled {
                    return SortableAction::None;
                }
                let id = item.id.clone();
                self.commit(SortableEvent::Activated { id })
            }
            _ => SortableAction::None,
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) -> SortableAction {
        let Some(area) = self.area else {
            return SortableAction::None;
        };
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let Some(index) = self.item_at(area, mouse.y) else {
                    return SortableAction::None;
                };
                if self.items[index].disabled {
                    return SortableAction::None;
                }
                self.cursor = index;
                self.drag = Some(DragSession {
                    from: index,
                    target: index,
                });
                SortableAction::Redraw
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                let Some(mut session) = self.drag else {
                    return SortableAction::None;
                };
                // Leaving the list area cancels the session outright.
                if mouse.y < area.y
                    || mouse.y >= area.y + area.height
                    || mouse.x < area.x
                    || mouse.x >= area.x + area.width
                {
                    self.drag = None;
                    log::trace!("drag left the list area, cancelled");
                    return SortableAction::Redraw;
                }
                session.target = self.target_for(area, mouse.y, session.from);
                self.drag = Some(session);
                SortableAction::Redraw
            }
            MouseEventKind::Up(MouseButton::Left) => {
                let Some(session) = self.drag.take() else {
                    return SortableAction::None;
                };
                if session.target == session.from {
                    return SortableAction::Redraw;
                }
                self.apply_reorder(session.from, session.target);
                self.cursor = session.target;
                let order = self.order();
                self.commit(SortableEvent::OrderChanged { order })
            }
            _ => SortableAction::None,
        }
    }

    fn move_cursor(&mut self, dir: i32) -> SortableAction {
        if self.items.is_empty() {
            return SortableAction::None;
        }
        let next =
            (self.cursor as i64 + dir as i64).clamp(0, self.items.len() as i64 - 1) as usize;
        if next == self.cursor {
            return SortableAction::None;
        }
        self.cursor = next;
        SortableAction::Redraw
    }

    /// Keyboard reorder: swap the cursor item with its nearest enabled
    /// neighbor in `dir`, committing immediately.
    fn move_item(&mut self, dir: i32) -> SortableAction {
        let from = self.cursor;
        let Some(item) = self.items.get(from) else {
            return SortableAction::None;
        };
        if item.disabled {
            return SortableAction::None;
        }
        let mut to = from as i64;
        loop {
            to += dir as i64;
            if to < 0 || to >= self.items.len() as i64 {
                return SortableAction::None;
            }
            if !self.items[to as usize].disabled {
                break;
            }
        }
        let to = to as usize;
        self.apply_reorder(from, to);
        self.cursor = to;
        let order = self.order();
        self.commit(SortableEvent::OrderChanged { order })
    }

    /// Remove-and-insert reordering: the dragged item is removed, then
    /// inserted at the target index of the shortened list.
    fn apply_reorder(&mut self, from: usize, to: usize) {
        if from >= self.items.len() || to >= self.items.len() {
            return;
        }
        let item = self.items.remove(from);
        self.items.insert(to, item);
    }

    fn item_at(&self, area: Rect, y: u16) -> Option<usize> {
        if y < area.y {
            return None;
        }
        let index = (y - area.y) as usize;
        (index < self.items.len()).then_some(index)
    }

    /// Insertion index from the pointer position: the count of non-dragged
    /// items whose row midpoint lies above the pointer, snapped away from
    /// disabled rows.
    fn target_for(&self, area: Rect, y: u16, from: usize) -> usize {
        let rel = (y.saturating_sub(area.y)) as usize;
        let mut target = rel.min(self.items.len().saturating_sub(1));
        // Dropping onto a disabled item's row is not allowed; walk back
        // toward the drag origin until the slot is legal.
        while target != from && self.items.get(target).is_some_and(|i| i.disabled) {
            if target > from {
                target -= 1;
            } else {
                target += 1;
            }
        }
        target
    }

    fn commit(&mut self, event: SortableEvent) -> SortableAction {
        self.emitter.emit(&event);
        SortableAction::Event(event)
    }

    /// Render the list; during a drag the preview ordering is shown without
    /// mutating the real item list.
    pub fn render(&mut self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        self.area = Some(area);
        if area.width == 0 || area.height == 0 {
            return;
        }
        let base = patch_or(self.options.style, theme.text_primary);
        let drag_style = patch_or(self.options.drag_style, theme.accent);
        let cursor_style = patch_or(self.options.cursor_style, theme.cursor);
        buf.set_style(area, base);

        let preview: Vec<usize> = match self.drag {
            Some(session) if session.target != session.from => {
                let mut order: Vec<usize> = (0..self.items.len()).collect();
                let moved = order.remove(session.from);
                order.insert(session.target, moved);
                order
            }
            _ => (0..self.items.len()).collect(),
        };

        for (row, &index) in preview.iter().enumerate() {
            if row as u16 >= area.height {
                break;
            }
            let item = &self.items[index];
            let dragging = self.drag.is_some_and(|s| s.from == index);
            let style = if item.disabled {
                theme.disabled
            } else if dragging {
                drag_style
            } else if index == self.cursor && self.drag.is_none() {
                cursor_style
            } else {
                base
            };
            let text = if item.disabled {
                format!("  {}", item.label)
            } else {
                format!("{}{}", self.options.handle, item.label)
            };
            render::render_aligned(
                area.x,
                area.y + row as u16,
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
