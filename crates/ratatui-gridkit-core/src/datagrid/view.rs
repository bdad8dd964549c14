use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::Block;
use ratatui::widgets::Borders;
use ratatui::widgets::Widget;

use crate::datagrid::column::ColumnSet;
use crate::datagrid::column::ColumnWidth;
use crate::datagrid::edit::EditKey;
use crate::datagrid::edit::EditSession;
use crate::datagrid::filter::Filter;
use crate::datagrid::page::PageState;
use crate::datagrid::pipeline;
use crate::datagrid::pipeline::DerivedView;
use crate::datagrid::pipeline::RowHandle;
use crate::datagrid::pipeline::SortDirection;
use crate::datagrid::pipeline::SortSpec;
use crate::datagrid::selection::SelectionMode;
use crate::datagrid::selection::SelectionState;
use crate::error::ConfigError;
use crate::event::Emitter;
use crate::input::InputEvent;
use crate::input::KeyCode;
use crate::input::KeyEvent;
use crate::input::MouseButton;
use crate::input::MouseEvent;
use crate::input::MouseEventKind;
use crate::keymap;
use crate::render;
use crate::theme::Theme;
use crate::value::CellValue;
use crate::value::GridRecord;
use crate::value::RowKey;
use crate::viewport::ViewportState;

/// Result of feeding one input event to the grid.
#[derive(Clone, Debug)]
pub enum GridAction {
    None,
    Redraw,
    /// A state change committed; the same event was also delivered to every
    /// registered handler.
    Event(GridEvent),
}

/// Semantic events emitted at state commit, each carrying the full updated
/// state slice relevant to its kind.
#[derive(Clone, Debug, PartialEq)]
pub enum GridEvent {
    SortChanged(Option<SortSpec>),
    FiltersChanged(Vec<Filter>),
    PageChanged { page: usize, page_count: usize },
    SelectionChanged { keys: Vec<RowKey> },
    ColumnResized { column: String, width: u16 },
    EditCommitted {
        key: RowKey,
        column: String,
        old: CellValue,
        new: CellValue,
    },
    RowActivated { key: RowKey },
    /// A context-menu row action was chosen for the row at `key`.
    RowAction { action: String, key: RowKey },
    /// The empty-state action was triggered while the grid had no rows.
    EmptyActivated,
}

/// A named action offered in the row context menu.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RowAction {
    pub id: String,
    pub label: String,
}

impl RowAction {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// Cursor position: `row` indexes the visible page, `col` the declared
/// column order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridCursor {
    pub row: usize,
    pub col: usize,
}

/// Feature toggles and style overrides. A style left at `Style::default()`
/// falls back to the corresponding theme slot.
#[derive(Clone, Debug)]
pub struct DataGridOptions {
    pub show_header: bool,
    pub show_footer: bool,
    pub show_scrollbar: bool,
    pub striped: bool,
    pub bordered: bool,
    pub resizable: bool,
    pub sortable: bool,
    pub col_gap: u16,
    pub empty_text: String,
    /// Hint line under the empty state; Enter while the grid is empty emits
    /// [`GridEvent::EmptyActivated`] when this is set.
    pub empty_action: Option<String>,
    /// Context-menu entries offered per row (right-click or the menu key).
    pub row_actions: Vec<RowAction>,
    pub style: Style,
    pub header_style: Style,
    pub stripe_style: Style,
    pub cursor_style: Style,
    pub selected_style: Style,
    pub border_style: Style,
    pub scrollbar_style: Style,
}

impl Default for DataGridOptions {
    fn default() -> Self {
        Self {
            show_header: true,
            show_footer: true,
            show_scrollbar: true,
            striped: false,
            bordered: false,
            resizable: true,
            sortable: true,
            col_gap: 1,
            empty_text: "no rows".to_string(),
            empty_action: None,
            row_actions: Vec::new(),
            style: Style::default(),
            header_style: Style::default(),
            stripe_style: Style::default(),
            cursor_style: Style::default(),
            selected_style: Style::default(),
            border_style: Style::default(),
            scrollbar_style: Style::default(),
        }
    }
}

/// Rebindable keys for grid operations.
#[derive(Clone, Debug)]
pub struct GridBindings {
    pub sort: Vec<KeyEvent>,
    pub select: Vec<KeyEvent>,
    pub select_all: Vec<KeyEvent>,
    pub edit: Vec<KeyEvent>,
    pub next_page: Vec<KeyEvent>,
    pub prev_page: Vec<KeyEvent>,
    pub menu: Vec<KeyEvent>,
    pub toggle_expand: Vec<KeyEvent>,
}

impl Default for GridBindings {
    fn default() -> Self {
        Self {
            sort: vec![keymap::key_char('s')],
            select: vec![keymap::key_char(' ')],
            select_all: vec![keymap::key_char('a')],
            edit: vec![keymap::key_char('e')],
            next_page: vec![keymap::key_char(']')],
            prev_page: vec![keymap::key_char('[')],
            menu: vec![keymap::key_char('m')],
            toggle_expand: vec![keymap::key_char('z')],
        }
    }
}

/// One row of the rendered sequence: a filtered/paginated root, or a
/// descendant of an expanded row, addressed by its child-index path into
/// the caller-supplied records.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VisibleRow {
    pub path: Vec<usize>,
    pub key: RowKey,
    pub depth: u16,
    pub has_children: bool,
}

#[derive(Clone, Copy, Debug)]
struct ResizeSession {
    col: usize,
    start_x: u16,
    start_width: u16,
}

#[derive(Clone, Copy, Debug)]
struct ColSpan {
    index: usize,
    x: u16,
    width: u16,
    /// Columns clipped off the left edge of a scrolled middle column.
    clip_left: u16,
}

#[derive(Clone, Debug, Default)]
struct GridLayout {
    header_y: Option<u16>,
    body: Rect,
    gutter_w: u16,
    spans: Vec<ColSpan>,
    /// Gap-cell x position of each draggable column boundary.
    boundaries: Vec<(u16, usize)>,
    /// Resolved width of every column at the last layout pass.
    resolved: Vec<u16>,
}

/// Row-oriented data grid over caller-owned records.
///
/// Rendering is a pure projection of the cached derived view; every input
/// path that changes state recomputes the view through the
/// filter → sort → paginate pipeline and reports the change as a
/// [`GridEvent`].
pub struct DataGridView<R: GridRecord> {
    options: DataGridOptions,
    bindings: GridBindings,
    columns: ColumnSet,
    records: Vec<R>,
    filters: Vec<Filter>,
    sort: Option<SortSpec>,
    page: PageState,
    selection: SelectionState,
    derived: DerivedView,
    /// Flattened row sequence for the current page: page roots plus the
    /// descendants of expanded rows.
    rows: Vec<VisibleRow>,
    expanded: std::collections::BTreeSet<RowKey>,
    cursor: Option<GridCursor>,
    width_overrides: Vec<Option<u16>>,
    resize: Option<ResizeSession>,
    editing: Option<EditSession>,
    /// Open context menu: selected entry index.
    menu: Option<usize>,
    emitter: Emitter<GridEvent>,
    pub viewport: ViewportState,
    layout: GridLayout,
}

impl<R: GridRecord> DataGridView<R> {
    pub fn new(columns: ColumnSet) -> Self {
        let width_overrides = vec![None; columns.len()];
        Self {
            options: DataGridOptions::default(),
            bindings: GridBindings::default(),
            columns,
            records: Vec::new(),
            filters: Vec::new(),
            sort: None,
            page: PageState::default(),
            selection: SelectionState::default(),
            derived: DerivedView::default(),
            rows: Vec::new(),
            expanded: std::collections::BTreeSet::new(),
            cursor: None,
            width_overrides,
            resize: None,
            editing: None,
            menu: None,
            emitter: Emitter::new(),
            viewport: ViewportState::default(),
            layout: GridLayout::default(),
        }
    }

    pub fn with_options(columns: ColumnSet, options: DataGridOptions) -> Self {
        let mut grid = Self::new(columns);
        grid.options = options;
        grid
    }

    pub fn options(&self) -> &DataGridOptions {
        &self.options
    }

    pub fn set_bindings(&mut self, bindings: GridBindings) {
        self.bindings = bindings;
    }

    /// Register a handler invoked synchronously whenever a grid event
    /// commits.
    pub fn subscribe(&mut self, handler: impl FnMut(&GridEvent) + 'static) {
        self.emitter.subscribe(handler);
    }

    pub fn columns(&self) -> &ColumnSet {
        &self.columns
    }

    pub fn set_records(&mut self, records: Vec<R>) {
        self.records = records;
        self.expanded.clear();
        self.refresh();
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn record_for(&self, handle: &RowHandle) -> Option<&R> {
        self.records.get(handle.index)
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    /// Replace the active filters. Filters naming unknown or non-filterable
    /// columns are a configuration error and leave state untouched.
    pub fn set_filters(&mut self, filters: Vec<Filter>) -> Result<GridAction, ConfigError> {
        for f in &filters {
            let col = self
                .columns
                .by_key(&f.column)
                .ok_or_else(|| ConfigError::UnknownFilterColumn(f.column.clone()))?;
            if !col.filterable {
                return Err(ConfigError::ColumnNotFilterable(f.column.clone()));
            }
        }
        self.filters = filters;
        self.refresh();
        Ok(self.commit(GridEvent::FiltersChanged(self.filters.clone())))
    }

    pub fn sort(&self) -> Option<&SortSpec> {
        self.sort.as_ref()
    }

    /// Replace the sort descriptor. Sorting by an unknown or non-sortable
    /// column is a configuration error.
    pub fn set_sort(&mut self, sort: Option<SortSpec>) -> Result<GridAction, ConfigError> {
        if let Some(spec) = &sort {
            let col = self
                .columns
                .by_key(&spec.column)
                .ok_or_else(|| ConfigError::UnknownSortColumn(spec.column.clone()))?;
            if !col.sortable {
                return Err(ConfigError::ColumnNotSortable(spec.column.clone()));
            }
        }
        self.sort = sort;
        self.refresh();
        Ok(self.commit(GridEvent::SortChanged(self.sort.clone())))
    }

    pub fn page(&self) -> &PageState {
        &self.page
    }

    pub fn set_page_size(&mut self, page_size: usize) -> Result<GridAction, ConfigError> {
        self.page.set_page_size(page_size)?;
        self.refresh();
        Ok(self.commit(GridEvent::PageChanged {
            page: self.page.page(),
            page_count: self.page.page_count(),
        }))
    }

    pub fn goto_page(&mut self, page: usize) -> GridAction {
        if !self.page.set_page(page) {
            return GridAction::None;
        }
        self.after_page_change()
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn set_selection_mode(&mut self, mode: SelectionMode) -> GridAction {
        if self.selection.set_mode(mode) {
            return self.commit_selection();
        }
        GridAction::Redraw
    }

    pub fn set_preserve_selection(&mut self, preserve: bool) {
        self.selection.set_preserve_across_pages(preserve);
    }

    pub fn derived(&self) -> &DerivedView {
        &self.derived
    }

    pub fn cursor(&self) -> Option<GridCursor> {
        self.cursor
    }

    pub fn editing(&self) -> Option<&EditSession> {
        self.editing.as_ref()
    }

    /// Current effective width of a column: resize override, declared fixed
    /// width, or the flex floor when the column has not been laid out yet.
    pub fn column_width(&self, key: &str) -> Option<u16> {
        let index = self.columns.index_of(key)?;
        if let Some(w) = self.width_overrides.get(index).copied().flatten() {
            return Some(w);
        }
        match self.columns.get(index)?.width {
            ColumnWidth::Fixed(w) => Some(w),
            ColumnWidth::Flex { min } => Some(min),
        }
    }

    pub fn handle_event(&mut self, event: InputEvent) -> GridAction {
        match event {
            InputEvent::Paste(_) => GridAction::None,
            InputEvent::Key(key) => self.handle_key(key),
            InputEvent::Mouse(mouse) => self.handle_mouse(mouse),
        }
    }

    // Recompute the derived view and re-clamp dependent state. Filters,
    // sort, and pagination apply to top-level rows; descendants of expanded
    // rows are spliced under their parent afterwards.
    fn refresh(&mut self) {
        self.derived = pipeline::derive(
            &self.records,
            &self.filters,
            self.sort.as_ref(),
            &mut self.page,
        );
        self.rows.clear();
        for handle in self.derived.visible() {
            let Some(record) = self.records.get(handle.index) else {
                continue;
            };
            let row = VisibleRow {
                path: vec![handle.index],
                key: handle.key.clone(),
                depth: 0,
                has_children: !record.children().is_empty(),
            };
            let expand = self.expanded.contains(&row.key);
            self.rows.push(row);
            if expand {
                flatten_children(
                    record,
                    &handle.key,
                    vec![handle.index],
                    1,
                    &self.expanded,
                    &mut self.rows,
                );
            }
        }
        self.clamp_cursor();
        self.viewport
            .set_content(self.viewport.content_w, self.rows.len() as u32);
        self.editing = None;
        self.menu = None;
    }

    /// Rendered row sequence for the current page.
    pub fn visible_rows(&self) -> &[VisibleRow] {
        &self.rows
    }

    /// Resolve a row path back to the caller-supplied record.
    pub fn record_at(&self, path: &[usize]) -> Option<&R> {
        let (&root, rest) = path.split_first()?;
        let mut record = self.records.get(root)?;
        for &i in rest {
            record = record.children().get(i)?;
        }
        Some(record)
    }

    /// Expand or collapse the cursor row. Purely transient UI state; no
    /// event is emitted.
    fn toggle_expand_at_cursor(&mut self) -> GridAction {
        let Some(cursor) = self.cursor else {
            return GridAction::None;
        };
        let Some(row) = self.rows.get(cursor.row) else {
            return GridAction::None;
        };
        if !row.has_children {
            return GridAction::None;
        }
        let key = row.key.clone();
        if !self.expanded.remove(&key) {
            self.expanded.insert(key);
        }
        self.refresh();
        GridAction::Redraw
    }

    fn clamp_cursor(&mut self) {
        let rows = self.rows.len();
        let cols = self.columns.len();
        if rows == 0 || cols == 0 {
            self.cursor = None;
            return;
        }
        self.cursor = Some(match self.cursor {
            Some(c) => GridCursor {
                row: c.row.min(rows - 1),
                col: c.col.min(cols - 1),
            },
            None => GridCursor { row: 0, col: 0 },
        });
    }

    fn commit(&mut self, event: GridEvent) -> GridAction {
        self.emitter.emit(&event);
        GridAction::Event(event)
    }

    fn commit_selection(&mut self) -> GridAction {
        let keys: Vec<RowKey> = self.selection.keys().iter().cloned().collect();
        self.commit(GridEvent::SelectionChanged { keys })
    }

    fn after_page_change(&mut self) -> GridAction {
        self.refresh();
        self.viewport.to_top();
        let page_keys = self.rows.iter().map(|r| r.key.clone()).collect();
        if self.selection.retain_page(&page_keys) {
            self.commit_selection();
        }
        self.commit(GridEvent::PageChanged {
            page: self.page.page(),
            page_count: self.page.page_count(),
        })
    }

    fn visible_key(&self, row: usize) -> Option<RowKey> {
        self.rows.get(row).map(|r| r.key.clone())
    }

    fn handle_key(&mut self, key: KeyEvent) -> GridAction {
        if self.editing.is_some() {
            return self.handle_edit_key(&key);
        }
        if self.menu.is_some() {
            return self.handle_menu_key(&key);
        }

        if self.resize.is_some() && key.code == KeyCode::Esc {
            return self.cancel_resize();
        }

        if keymap::matches_any(&self.bindings.menu, &key) {
            return self.open_menu();
        }
        if keymap::matches_any(&self.bindings.toggle_expand, &key) {
            return self.toggle_expand_at_cursor();
        }
        if keymap::matches_any(&self.bindings.sort, &key) {
            return self.toggle_sort_at_cursor();
        }
        if keymap::matches_any(&self.bindings.select, &key) {
            return self.select_at_cursor();
        }
        if keymap::matches_any(&self.bindings.select_all, &key) {
            return self.select_all_filtered();
        }
        if keymap::matches_any(&self.bindings.edit, &key) {
            return self.begin_edit_at_cursor();
        }
        if keymap::matches_any(&self.bindings.next_page, &key) {
            if self.page.next_page() {
                return self.after_page_change();
            }
            return GridAction::None;
        }
        if keymap::matches_any(&self.bindings.prev_page, &key) {
            if self.page.prev_page() {
                return self.after_page_change();
            }
            return GridAction::None;
        }

        match key.code {
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor(1, 0),
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor(-1, 0),
            KeyCode::Right | KeyCode::Char('l') => self.move_cursor(0, 1),
            KeyCode::Left | KeyCode::Char('h') => self.move_cursor(0, -1),
            KeyCode::PageDown => {
                self.move_cursor(self.viewport.viewport_h.max(1) as i32 - 1, 0)
            }
            KeyCode::PageUp => {
                self.move_cursor(-(self.viewport.viewport_h.max(1) as i32 - 1), 0)
            }
            KeyCode::Home | KeyCode::Char('g') => self.move_cursor(i32::MIN / 2, 0),
            KeyCode::End | KeyCode::Char('G') => self.move_cursor(i32::MAX / 2, 0),
            KeyCode::Enter => {
                if self.derived.is_empty() && self.options.empty_action.is_some() {
                    return self.commit(GridEvent::EmptyActivated);
                }
                let action = self.begin_edit_at_cursor();
                if matches!(action, GridAction::Redraw) {
                    return action;
                }
                match self.cursor.and_then(|c| self.visible_key(c.row)) {
                    Some(key) => self.commit(GridEvent::RowActivated { key }),
                    None => GridAction::None,
                }
            }
            KeyCode::Esc => {
                if self.selection.clear() {
                    self.commit_selection()
                } else {
                    GridAction::None
                }
            }
            _ => GridAction::None,
        }
    }

    fn handle_edit_key(&mut self, key: &KeyEvent) -> GridAction {
        let Some(mut session) = self.editing.take() else {
            return GridAction::None;
        };
        match session.handle_key(key) {
            EditKey::Handled => {
                self.editing = Some(session);
                GridAction::Redraw
            }
            EditKey::Ignored => {
                self.editing = Some(session);
                GridAction::None
            }
            EditKey::Cancel => {
                log::debug!("edit cancelled on column {}", session.col);
                GridAction::Redraw
            }
            EditKey::Commit => {
                let Some(column) = self.columns.get(session.col) else {
                    return GridAction::Redraw;
                };
                match session.commit(column) {
                    Ok(new) => {
                        let column_key = column.key.clone();
                        let old = session.original().clone();
                        let Some(key) = self.visible_key(session.row) else {
                            return GridAction::Redraw;
                        };
                        self.commit(GridEvent::EditCommitted {
                            key,
                            column: column_key,
                            old,
                            new,
                        })
                    }
                    Err(_) => {
                        // Validation failure: stay in editing state with the
                        // inline error.
                        self.editing = Some(session);
                        GridAction::Redraw
                    }
                }
            }
        }
    }

    fn open_menu(&mut self) -> GridAction {
        if self.options.row_actions.is_empty() || self.cursor.is_none() {
            return GridAction::None;
        }
        self.menu = Some(0);
        GridAction::Redraw
    }

    fn handle_menu_key(&mut self, key: &KeyEvent) -> GridAction {
        let Some(selected) = self.menu else {
            return GridAction::None;
        };
        let count = self.options.row_actions.len();
        match key.code {
            KeyCode::Esc => {
                self.menu = None;
                GridAction::Redraw
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.menu = Some((selected + 1) % count.max(1));
                GridAction::Redraw
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.menu = Some((selected + count.max(1) - 1) % count.max(1));
                GridAction::Redraw
            }
            KeyCode::Enter => {
                self.menu = None;
                let Some(action) = self.options.row_actions.get(selected) else {
                    return GridAction::Redraw;
                };
                let action = action.id.clone();
                let Some(key) = self.cursor.and_then(|c| self.visible_key(c.row)) else {
                    return GridAction::Redraw;
                };
                self.commit(GridEvent::RowAction { action, key })
            }
            _ => GridAction::None,
        }
    }

    fn move_cursor(&mut self, drow: i32, dcol: i32) -> GridAction {
        let rows = self.rows.len();
        let cols = self.columns.len();
        if rows == 0 || cols == 0 {
            return GridAction::None;
        }
        let cur = self.cursor.unwrap_or(GridCursor { row: 0, col: 0 });
        let next = GridCursor {
            row: (cur.row as i64 + drow as i64).clamp(0, rows as i64 - 1) as usize,
            col: (cur.col as i64 + dcol as i64).clamp(0, cols as i64 - 1) as usize,
        };
        if Some(next) == self.cursor {
            return GridAction::None;
        }
        self.cursor = Some(next);
        self.viewport.ensure_visible_y(next.row as u32);
        if dcol != 0 {
            self.ensure_col_visible(next.col);
        }
        GridAction::Redraw
    }

    fn toggle_sort_at_cursor(&mut self) -> GridAction {
        let Some(cursor) = self.cursor else {
            return GridAction::None;
        };
        self.toggle_sort_on(cursor.col)
    }

    /// Cycle none → ascending → descending → none on the given column.
    fn toggle_sort_on(&mut self, col: usize) -> GridAction {
        if !self.options.sortable {
            return GridAction::None;
        }
        let Some(column) = self.columns.get(col) else {
            return GridAction::None;
        };
        if !column.sortable {
            return GridAction::None;
        }
        let key = column.key.clone();
        let next = match &self.sort {
            Some(spec) if spec.column == key => match spec.direction {
                SortDirection::Ascending => Some(SortSpec::desc(key)),
                SortDirection::Descending => None,
            },
            _ => Some(SortSpec::asc(key)),
        };
        self.sort = next;
        self.refresh();
        self.commit(GridEvent::SortChanged(self.sort.clone()))
    }

    fn select_at_cursor(&mut self) -> GridAction {
        let Some(cursor) = self.cursor else {
            return GridAction::None;
        };
        let Some(key) = self.visible_key(cursor.row) else {
            return GridAction::None;
        };
        if self.selection.click(key) {
            self.commit_selection()
        } else {
            GridAction::None
        }
    }

    fn select_all_filtered(&mut self) -> GridAction {
        let keys: Vec<RowKey> = self
            .derived
            .filtered()
            .iter()
            .map(|h| h.key.clone())
            .collect();
        if self.selection.select_all(keys) {
            self.commit_selection()
        } else {
            GridAction::None
        }
    }

    fn begin_edit_at_cursor(&mut self) -> GridAction {
        let Some(cursor) = self.cursor else {
            return GridAction::None;
        };
        let Some(column) = self.columns.get(cursor.col) else {
            return GridAction::None;
        };
        if !column.editable {
            return GridAction::None;
        }
        let Some(path) = self.rows.get(cursor.row).map(|r| r.path.clone()) else {
            return GridAction::None;
        };
        let Some(record) = self.record_at(&path) else {
            return GridAction::None;
        };
        let current = record.field(&column.key);
        self.editing = Some(EditSession::start(column, cursor.row, cursor.col, current));
        GridAction::Redraw
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) -> GridAction {
        match mouse.kind {
            MouseEventKind::ScrollDown => {
                self.viewport.scroll_y_by(3);
                GridAction::Redraw
            }
            MouseEventKind::ScrollUp => {
                self.viewport.scroll_y_by(-3);
                GridAction::Redraw
            }
            MouseEventKind::Down(MouseButton::Left) => self.mouse_down(mouse),
            MouseEventKind::Down(MouseButton::Right) => self.mouse_menu(mouse),
            MouseEventKind::Drag(MouseButton::Left) => self.mouse_drag(mouse),
            MouseEventKind::Up(MouseButton::Left) => self.mouse_up(),
            _ => GridAction::None,
        }
    }

    /// Right-click on a body row: move the cursor there and open the row
    /// context menu.
    fn mouse_menu(&mut self, mouse: MouseEvent) -> GridAction {
        let body = self.layout.body;
        if mouse.y < body.y || mouse.y >= body.y + body.height {
            return GridAction::None;
        }
        let row = self.viewport.y as usize + (mouse.y - body.y) as usize;
        if row >= self.rows.len() {
            return GridAction::None;
        }
        let col = self.span_at(mouse.x).unwrap_or(0);
        self.cursor = Some(GridCursor { row, col });
        self.open_menu()
    }

    fn mouse_down(&mut self, mouse: MouseEvent) -> GridAction {
        // Resize handles first: the gap cell on a column boundary.
        if self.options.resizable {
            let boundary = self
                .layout
                .boundaries
                .iter()
                .find(|(x, _)| *x == mouse.x)
                .map(|(_, col)| *col);
            if let Some(col) = boundary {
                let Some(column) = self.columns.get(col) else {
                    return GridAction::None;
                };
                let key = column.key.clone();
                let start_width = self.column_width(&key).unwrap_or(0);
                self.resize = Some(ResizeSession {
                    col,
                    start_x: mouse.x,
                    start_width,
                });
                log::trace!("resize session started on column {key}");
                return GridAction::Redraw;
            }
        }

        if self.layout.header_y == Some(mouse.y) {
            if let Some(col) = self.span_at(mouse.x) {
                return self.toggle_sort_on(col);
            }
            return GridAction::None;
        }

        let body = self.layout.body;
        if mouse.y >= body.y && mouse.y < body.y + body.height {
            let row = self.viewport.y as usize + (mouse.y - body.y) as usize;
            if row >= self.rows.len() {
                return GridAction::None;
            }
            let col = self.span_at(mouse.x).unwrap_or(0);
            let clicked = GridCursor { row, col };
            // A click on the cell that already holds the cursor starts
            // editing when the column allows it; the first click selects.
            if self.cursor == Some(clicked)
                && self.columns.get(col).is_some_and(|c| c.editable)
            {
                return self.begin_edit_at_cursor();
            }
            self.cursor = Some(clicked);
            let Some(key) = self.visible_key(row) else {
                return GridAction::Redraw;
            };
            if self.selection.click(key) {
                return self.commit_selection();
            }
            return GridAction::Redraw;
        }

        GridAction::None
    }

    fn mouse_drag(&mut self, mouse: MouseEvent) -> GridAction {
        let Some(session) = self.resize else {
            return GridAction::None;
        };
        let Some(column) = self.columns.get(session.col) else {
            return GridAction::None;
        };
        let delta = mouse.x as i32 - session.start_x as i32;
        let next = (session.start_width as i32 + delta)
            .clamp(column.min_width as i32, column.max_width.max(column.min_width) as i32)
            as u16;
        self.width_overrides[session.col] = Some(next);
        GridAction::Redraw
    }

    fn mouse_up(&mut self) -> GridAction {
        let Some(session) = self.resize.take() else {
            return GridAction::None;
        };
        let Some(column) = self.columns.get(session.col) else {
            return GridAction::None;
        };
        let key = column.key.clone();
        let width = self.column_width(&key).unwrap_or(session.start_width);
        log::trace!("resize session committed: column {key} width {width}");
        self.commit(GridEvent::ColumnResized { column: key, width })
    }

    fn cancel_resize(&mut self) -> GridAction {
        let Some(session) = self.resize.take() else {
            return GridAction::None;
        };
        self.width_overrides[session.col] = Some(session.start_width);
        log::trace!("resize session cancelled");
        GridAction::Redraw
    }

    fn span_at(&self, x: u16) -> Option<usize> {
        self.layout
            .spans
            .iter()
            .find(|s| x >= s.x && x < s.x + s.width)
            .map(|s| s.index)
    }

    // Layout ---------------------------------------------------------------

    fn resolve_widths(&self, avail: u16) -> Vec<u16> {
        let n = self.columns.len();
        let gap_total = self.options.col_gap.saturating_mul(n.saturating_sub(1) as u16);
        let mut widths = Vec::with_capacity(n);
        let mut flex = Vec::new();
        let mut used = 0u32;
        for (i, col) in self.columns.iter().enumerate() {
            let w = match (self.width_overrides.get(i).copied().flatten(), col.width) {
                (Some(w), _) => w,
                (None, ColumnWidth::Fixed(w)) => w,
                (None, ColumnWidth::Flex { min }) => {
                    flex.push(i);
                    min
                }
            };
            used += w as u32;
            widths.push(w);
        }
        if !flex.is_empty() {
            let leftover =
                (avail as u32).saturating_sub(used + gap_total as u32) as usize;
            let share = leftover / flex.len();
            let extra = leftover % flex.len();
            for (j, &i) in flex.iter().enumerate() {
                widths[i] += share as u16 + u16::from(j < extra);
            }
        }
        widths
    }

    fn compute_layout(&mut self, body: Rect, header_y: Option<u16>) {
        let gap = self.options.col_gap;
        let gutter_w = if self.selection.mode() == SelectionMode::Checkbox {
            4
        } else {
            0
        };
        let content = Rect::new(
            body.x + gutter_w,
            body.y,
            body.width.saturating_sub(gutter_w),
            body.height,
        );
        let widths = self.resolve_widths(content.width);
        let (left, mid, right) = self.columns.layout_order();

        let mut spans = Vec::new();
        let mut boundaries = Vec::new();

        // Left-pinned group, fixed at the left edge.
        let mut x = content.x;
        let content_end = content.x + content.width;
        for &i in &left {
            let w = widths[i].min(content_end.saturating_sub(x));
            if w == 0 {
                break;
            }
            spans.push(ColSpan {
                index: i,
                x,
                width: w,
                clip_left: 0,
            });
            x = x.saturating_add(w);
            if gap > 0 && x < content_end {
                boundaries.push((x, i));
                x = x.saturating_add(gap);
            }
        }
        let mid_start = x;

        // Right-pinned group, fixed at the right edge.
        let right_w: u32 = right
            .iter()
            .map(|&i| widths[i] as u32 + gap as u32)
            .sum();
        let mut rx = content_end.saturating_sub(right_w.min(u16::MAX as u32) as u16);
        let mid_end = rx;
        for &i in &right {
            if gap > 0 {
                rx = rx.saturating_add(gap);
            }
            let w = widths[i].min(content_end.saturating_sub(rx));
            if w == 0 {
                break;
            }
            spans.push(ColSpan {
                index: i,
                x: rx,
                width: w,
                clip_left: 0,
            });
            rx = rx.saturating_add(w);
        }

        // Scrollable middle region between the pinned groups.
        let mid_w = mid_end.saturating_sub(mid_start);
        let mut mid_content_w = 0u32;
        let mut offset = 0u32;
        let sx = self.viewport.x;
        for &i in &mid {
            let w = widths[i] as u32;
            let col_start = offset;
            let col_end = offset + w;
            mid_content_w = col_end;
            offset = col_end + gap as u32;

            // Visible horizontal slice of this column.
            let view_end = sx + mid_w as u32;
            if col_end <= sx || col_start >= view_end {
                continue;
            }
            let clip_left = sx.saturating_sub(col_start) as u16;
            let screen_x = mid_start + col_start.saturating_sub(sx) as u16;
            let visible_w = (col_end.min(view_end) - col_start.max(sx)) as u16;
            if visible_w == 0 {
                continue;
            }
            spans.push(ColSpan {
                index: i,
                x: screen_x,
                width: visible_w,
                clip_left,
            });
            let boundary_x = screen_x + visible_w;
            if gap > 0 && clip_left == 0 && visible_w == w as u16 && boundary_x < mid_end {
                boundaries.push((boundary_x, i));
            }
        }

        self.viewport.viewport_w = mid_w;
        self.viewport.content_w = mid_content_w;
        self.viewport.clamp();

        self.layout = GridLayout {
            header_y,
            body: content,
            gutter_w,
            spans,
            boundaries,
            resolved: widths,
        };
    }

    /// Scroll the middle region so an unpinned cursor column is on screen.
    fn ensure_col_visible(&mut self, col: usize) {
        let (_, mid, _) = self.columns.layout_order();
        let gap = self.options.col_gap as u32;
        let mut offset = 0u32;
        for &i in &mid {
            let w = self.layout.resolved.get(i).copied().unwrap_or(0) as u32;
            if i == col {
                if offset < self.viewport.x {
                    self.viewport.x = offset;
                } else if self.viewport.viewport_w > 0 {
                    let view_end = self.viewport.x + self.viewport.viewport_w as u32;
                    if offset + w > view_end {
                        self.viewport.x = (offset + w).saturating_sub(self.viewport.viewport_w as u32);
                    }
                }
                return;
            }
            offset += w + gap;
        }
    }

    // Rendering ------------------------------------------------------------

    pub fn render(&mut self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let base = if self.options.style == Style::default() {
            theme.text_primary
        } else {
            self.options.style
        };
        let header_style = patch_or(self.options.header_style, theme.header);
        let stripe_style = patch_or(self.options.stripe_style, theme.stripe);
        let cursor_style = patch_or(self.options.cursor_style, theme.cursor);
        let selected_style = patch_or(self.options.selected_style, theme.selection);
        let border_style = patch_or(self.options.border_style, theme.border);

        let mut inner = area;
        if self.options.bordered {
            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(border_style);
            inner = block.inner(area);
            block.render(area, buf);
            if inner.width == 0 || inner.height == 0 {
                return;
            }
        }

        let (content_area, scrollbar_x) = if self.options.show_scrollbar && inner.width >= 2 {
            (
                Rect::new(inner.x, inner.y, inner.width - 1, inner.height),
                Some(inner.x + inner.width - 1),
            )
        } else {
            (inner, None)
        };

        let header_h = u16::from(self.options.show_header).min(content_area.height);
        let footer_h = if self.options.show_footer && content_area.height > header_h {
            1
        } else {
            0
        };
        let header_y = (header_h > 0).then_some(content_area.y);
        let body = Rect::new(
            content_area.x,
            content_area.y + header_h,
            content_area.width,
            content_area.height - header_h - footer_h,
        );

        buf.set_style(content_area, base);
        self.viewport.viewport_h = body.height;
        self.viewport
            .set_content(self.viewport.content_w, self.rows.len() as u32);
        self.compute_layout(body, header_y);

        if let Some(y) = header_y {
            self.render_header(y, buf, header_style, border_style);
        }

        if self.derived.is_empty() {
            self.render_empty(body, buf, theme);
        } else {
            self.render_body(
                buf,
                theme,
                BodyStyles {
                    base,
                    stripe: stripe_style,
                    cursor: cursor_style,
                    selected: selected_style,
                    grid_line: border_style,
                },
            );
        }

        if footer_h > 0 {
            let footer_area = Rect::new(
                content_area.x,
                body.y + body.height,
                content_area.width,
                1,
            );
            self.render_footer(footer_area, buf, theme);
        }

        if self.menu.is_some() {
            self.render_menu(buf, theme);
        }

        if let Some(x) = scrollbar_x {
            render::render_scrollbar(
                Rect::new(x, body.y, 1, body.height),
                buf,
                &ViewportState {
                    x: 0,
                    y: self.viewport.y,
                    viewport_w: 1,
                    viewport_h: body.height,
                    content_w: 1,
                    content_h: self.rows.len() as u32,
                },
                patch_or(self.options.scrollbar_style, theme.text_muted),
            );
        }
    }

    fn render_header(&self, y: u16, buf: &mut Buffer, style: Style, grid_line: Style) {
        let sort_col = self
            .sort
            .as_ref()
            .and_then(|s| self.columns.index_of(&s.column));
        for span in &self.layout.spans {
            let Some(col) = self.columns.get(span.index) else {
                continue;
            };
            let mut title = col.title.clone();
            if sort_col == Some(span.index) {
                let arrow = match self.sort.as_ref().map(|s| s.direction) {
                    Some(SortDirection::Ascending) => " ▲",
                    Some(SortDirection::Descending) => " ▼",
                    None => "",
                };
                title.push_str(arrow);
            }
            render::render_str_clipped(
                span.x,
                y,
                span.clip_left as u32,
                span.width,
                buf,
                &title,
                style,
            );
        }
        for &(x, _) in &self.layout.boundaries {
            buf.set_stringn(x, y, "│", 1, grid_line);
        }
    }

    fn render_empty(&self, body: Rect, buf: &mut Buffer, theme: &Theme) {
        if body.height == 0 {
            return;
        }
        let y = body.y + body.height / 2;
        render::render_aligned(
            body.x,
            y,
            body.width,
            buf,
            &self.options.empty_text,
            ratatui::layout::Alignment::Center,
            theme.text_muted,
        );
        if let Some(hint) = &self.options.empty_action
            && y + 1 < body.y + body.height
        {
            render::render_aligned(
                body.x,
                y + 1,
                body.width,
                buf,
                hint,
                ratatui::layout::Alignment::Center,
                theme.accent,
            );
        }
    }

    fn render_body(&self, buf: &mut Buffer, theme: &Theme, styles: BodyStyles) {
        let body = self.layout.body;
        let checkbox_gutter = self.layout.gutter_w > 0;

        for dy in 0..body.height {
            let row = self.viewport.y as usize + dy as usize;
            let Some(visible_row) = self.rows.get(row) else {
                break;
            };
            let y = body.y + dy;
            let selected = self.selection.is_selected(&visible_row.key);
            let striped = self.options.striped && row % 2 == 1;
            let row_style = if selected {
                styles.selected
            } else if striped {
                styles.base.patch(styles.stripe)
            } else {
                styles.base
            };
            buf.set_style(Rect::new(body.x, y, body.width, 1), row_style);

            if checkbox_gutter {
                let mark = if selected { "[x]" } else { "[ ]" };
                buf.set_stringn(
                    body.x.saturating_sub(self.layout.gutter_w),
                    y,
                    mark,
                    3,
                    row_style,
                );
            }

            let Some(record) = self.record_at(&visible_row.path) else {
                continue;
            };
            for span in &self.layout.spans {
                let Some(col) = self.columns.get(span.index) else {
                    continue;
                };
                let is_cursor = self.cursor == Some(GridCursor {
                    row,
                    col: span.index,
                });
                let editing_here = self
                    .editing
                    .as_ref()
                    .is_some_and(|e| e.row == row && e.col == span.index);

                if !editing_here
                    && let Some(renderer) = &col.renderer
                    && span.clip_left == 0
                {
                    let value = record.field(&col.key);
                    renderer(Rect::new(span.x, y, span.width, 1), &value, buf, theme);
                    continue;
                }

                let (text, cell_style) = if editing_here {
                    let session = self.editing.as_ref().map(|e| e.display()).unwrap_or_default();
                    let style = if self.editing.as_ref().is_some_and(|e| e.error().is_some()) {
                        styles.cursor.patch(theme.danger)
                    } else {
                        styles.cursor
                    };
                    (session, style)
                } else {
                    let value = record.field(&col.key);
                    let style = if is_cursor { styles.cursor } else { row_style };
                    let mut text = col.display_value(&value);
                    // Tree affordance lives in the first declared column.
                    if span.index == 0 {
                        let marker = if visible_row.has_children {
                            if self.expanded.contains(&visible_row.key) {
                                "▾ "
                            } else {
                                "▸ "
                            }
                        } else {
                            ""
                        };
                        let indent = "  ".repeat(visible_row.depth as usize);
                        text = format!("{indent}{marker}{text}");
                    }
                    (text, style)
                };

                if span.clip_left > 0 {
                    render::render_str_clipped(
                        span.x,
                        y,
                        span.clip_left as u32,
                        span.width,
                        buf,
                        &text,
                        cell_style,
                    );
                } else {
                    render::render_aligned(
                        span.x,
                        y,
                        span.width,
                        buf,
                        &text,
                        col.align,
                        cell_style,
                    );
                }
            }
            for &(x, _) in &self.layout.boundaries {
                buf.set_stringn(x, y, "│", 1, styles.grid_line);
            }
        }
    }

    /// Context-menu overlay anchored below the cursor row.
    fn render_menu(&self, buf: &mut Buffer, theme: &Theme) {
        let Some(selected) = self.menu else {
            return;
        };
        let Some(cursor) = self.cursor else {
            return;
        };
        let body = self.layout.body;
        if body.width < 4 || body.height == 0 {
            return;
        }
        let width = self
            .options
            .row_actions
            .iter()
            .map(|a| unicode_width::UnicodeWidthStr::width(a.label.as_str()) as u16)
            .max()
            .unwrap_or(0)
            .saturating_add(2)
            .min(body.width);

        let cursor_y = body.y + (cursor.row.saturating_sub(self.viewport.y as usize)) as u16;
        let below = cursor_y + 1;
        let entries = self.options.row_actions.len() as u16;
        let y = if below + entries <= body.y + body.height {
            below
        } else {
            body.y + body.height.saturating_sub(entries)
        };
        let x = (body.x + 2).min(body.x + body.width - width);

        for (i, action) in self.options.row_actions.iter().enumerate() {
            let row_y = y + i as u16;
            if row_y >= body.y + body.height {
                break;
            }
            let style = if i == selected {
                theme.cursor
            } else {
                theme.accent
            };
            render::render_aligned(
                x,
                row_y,
                width,
                buf,
                &format!(" {}", action.label),
                ratatui::layout::Alignment::Left,
                style,
            );
        }
    }

    fn render_footer(&self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        let edit_error = self
            .editing
            .as_ref()
            .and_then(|e| e.error())
            .map(|msg| format!("  ✗ {msg}"))
            .unwrap_or_default();
        let status = format!(
            "page {}/{} · {} rows · {} selected{}",
            self.page.page(),
            self.page.page_count(),
            self.derived.total(),
            self.selection.len(),
            edit_error,
        );
        render::render_aligned(
            area.x,
            area.y,
            area.width,
            buf,
            &status,
            ratatui::layout::Alignment::Left,
            theme.text_muted,
        );
    }
}

#[derive(Clone, Copy)]
struct BodyStyles {
    base: Style,
    stripe: Style,
    cursor: Style,
    selected: Style,
    grid_line: Style,
}

fn patch_or(option: Style, theme_slot: Style) -> Style {
    if option == Style::default() {
        theme_slot
    } else {
        option
    }
}

fn flatten_children<R: GridRecord>(
    parent: &R,
    parent_key: &RowKey,
    path: Vec<usize>,
    depth: u16,
    expanded: &std::collections::BTreeSet<RowKey>,
    out: &mut Vec<VisibleRow>,
) {
    for (i, child) in parent.children().iter().enumerate() {
        let mut child_path = path.clone();
        child_path.push(i);
        // Children without explicit identity get a path-derived key; the
        // plain index fallback only distinguishes top-level rows.
        let key = child
            .record_key()
            .unwrap_or_else(|| RowKey::Text(format!("{parent_key}.{i}")));
        let has_children = !child.children().is_empty();
        let expand = expanded.contains(&key);
        out.push(VisibleRow {
            path: child_path.clone(),
            key: key.clone(),
            depth,
            has_children,
        });
        if expand {
            flatten_children(child, &key, child_path, depth + 1, expanded, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datagrid::column::GridColumn;
    use crate::datagrid::filter::FilterOp;
    use crate::value::Record;

    fn grid() -> DataGridView<Record> {
        let columns = ColumnSet::new(vec![
            GridColumn::new("id", "ID").fixed(6),
            GridColumn::new("age", "Age").fixed(8).resize_bounds(4, 120),
            GridColumn::new("name", "Name").flex(8).editable(true),
        ])
        .unwrap();
        let mut g = DataGridView::new(columns);
        g.set_records(vec![
            Record::with_key(1i64).set("id", 1).set("age", 30).set("name", "ada"),
            Record::with_key(2i64).set("id", 2).set("age", 20).set("name", "grace"),
            Record::with_key(3i64).set("id", 3).set("age", 20).set("name", "edsger"),
        ]);
        g
    }

    fn render(g: &mut DataGridView<Record>) -> Buffer {
        let mut buf = Buffer::empty(Rect::new(0, 0, 60, 12));
        g.render(Rect::new(0, 0, 60, 12), &mut buf, &Theme::default());
        buf
    }

    fn key_ev(code: KeyCode) -> InputEvent {
        InputEvent::Key(KeyEvent::new(code))
    }

    #[test]
    fn sort_toggle_cycles_and_emits() {
        let mut g = grid();
        g.cursor = Some(GridCursor { row: 0, col: 1 });

        let action = g.handle_event(key_ev(KeyCode::Char('s')));
        assert!(matches!(
            action,
            GridAction::Event(GridEvent::SortChanged(Some(ref s))) if s.direction == SortDirection::Ascending
        ));
        // Stable ascending sort on age: keys 2, 3, 1.
        let keys: Vec<_> = g.derived().visible().iter().map(|h| h.key.clone()).collect();
        assert_eq!(keys, vec![RowKey::Int(2), RowKey::Int(3), RowKey::Int(1)]);

        g.handle_event(key_ev(KeyCode::Char('s')));
        assert!(matches!(
            g.sort(),
            Some(s) if s.direction == SortDirection::Descending
        ));
        g.handle_event(key_ev(KeyCode::Char('s')));
        assert!(g.sort().is_none());
    }

    #[test]
    fn set_filters_rejects_unknown_column() {
        let mut g = grid();
        let err = g.set_filters(vec![Filter::new("nope", FilterOp::Eq, 1)]);
        assert!(matches!(err, Err(ConfigError::UnknownFilterColumn(_))));
        assert!(g.filters().is_empty());
    }

    #[test]
    fn single_select_click_sequence_keeps_one_key() {
        let mut g = grid();
        g.set_selection_mode(SelectionMode::Single);
        g.cursor = Some(GridCursor { row: 1, col: 0 });
        g.handle_event(key_ev(KeyCode::Char(' ')));
        g.cursor = Some(GridCursor { row: 2, col: 0 });
        let action = g.handle_event(key_ev(KeyCode::Char(' ')));
        match action {
            GridAction::Event(GridEvent::SelectionChanged { keys }) => {
                assert_eq!(keys, vec![RowKey::Int(3)]);
            }
            other => panic!("expected selection event, got {other:?}"),
        }
    }

    #[test]
    fn select_all_targets_filtered_set_not_page() {
        let mut g = grid();
        g.set_selection_mode(SelectionMode::Multiple);
        g.set_page_size(2).unwrap();
        assert_eq!(g.derived().visible_len(), 2);
        g.handle_event(key_ev(KeyCode::Char('a')));
        // All three filtered rows selected although only two are visible.
        assert_eq!(g.selection().len(), 3);
    }

    #[test]
    fn page_navigation_clears_offpage_selection_when_not_preserving() {
        let mut g = grid();
        g.set_selection_mode(SelectionMode::Multiple);
        g.set_preserve_selection(false);
        g.set_page_size(2).unwrap();
        g.cursor = Some(GridCursor { row: 0, col: 0 });
        g.handle_event(key_ev(KeyCode::Char(' ')));
        assert_eq!(g.selection().len(), 1);

        g.handle_event(key_ev(KeyCode::Char(']')));
        assert_eq!(g.page().page(), 2);
        assert!(g.selection().is_empty());
    }

    #[test]
    fn resize_session_clamps_to_max_and_commits() {
        let mut g = grid();
        render(&mut g);
        let boundary_x = g
            .layout
            .boundaries
            .iter()
            .find(|(_, col)| *col == 1)
            .map(|(x, _)| *x)
            .expect("age column boundary");
        assert_eq!(g.column_width("age"), Some(8));

        g.handle_event(InputEvent::Mouse(MouseEvent::down(boundary_x, 2)));
        // Start width 8, drag +120 → clamped to max 120.
        g.handle_event(InputEvent::Mouse(MouseEvent::drag(boundary_x + 120, 2)));
        let action = g.handle_event(InputEvent::Mouse(MouseEvent::up(boundary_x + 120, 2)));
        match action {
            GridAction::Event(GridEvent::ColumnResized { column, width }) => {
                assert_eq!(column, "age");
                assert_eq!(width, 120);
            }
            other => panic!("expected resize event, got {other:?}"),
        }
        assert_eq!(g.column_width("age"), Some(120));
    }

    #[test]
    fn resize_cancel_reverts_to_start_width() {
        let mut g = grid();
        render(&mut g);
        let boundary_x = g
            .layout
            .boundaries
            .iter()
            .find(|(_, col)| *col == 1)
            .map(|(x, _)| *x)
            .expect("age column boundary");

        g.handle_event(InputEvent::Mouse(MouseEvent::down(boundary_x, 2)));
        g.handle_event(InputEvent::Mouse(MouseEvent::drag(boundary_x + 10, 2)));
        assert_eq!(g.column_width("age"), Some(18));
        g.handle_event(key_ev(KeyCode::Esc));
        assert_eq!(g.column_width("age"), Some(8));
    }

    #[test]
    fn edit_commit_emits_old_and_new_without_mutating_records() {
        let mut g = grid();
        g.cursor = Some(GridCursor { row: 0, col: 2 });
        g.handle_event(key_ev(KeyCode::Char('e')));
        assert!(g.editing().is_some());

        g.handle_event(key_ev(KeyCode::Char('!')));
        let action = g.handle_event(key_ev(KeyCode::Enter));
        match action {
            GridAction::Event(GridEvent::EditCommitted { key, column, old, new }) => {
                assert_eq!(key, RowKey::Int(1));
                assert_eq!(column, "name");
                assert_eq!(old, CellValue::Text("ada".into()));
                assert_eq!(new, CellValue::Text("ada!".into()));
            }
            other => panic!("expected edit event, got {other:?}"),
        }
        // Caller-owned data untouched.
        assert_eq!(
            g.records()[0].field("name"),
            CellValue::Text("ada".into())
        );
    }

    #[test]
    fn edit_cancel_discards_draft_silently() {
        let mut g = grid();
        let count = std::rc::Rc::new(std::cell::Cell::new(0));
        let c = count.clone();
        g.subscribe(move |_| c.set(c.get() + 1));

        g.cursor = Some(GridCursor { row: 0, col: 2 });
        g.handle_event(key_ev(KeyCode::Char('e')));
        g.handle_event(key_ev(KeyCode::Char('x')));
        g.handle_event(key_ev(KeyCode::Esc));
        assert!(g.editing().is_none());
        assert_eq!(count.get(), 0, "cancel must not emit");
    }

    #[test]
    fn expanding_a_row_splices_children_with_depth() {
        let columns = ColumnSet::new(vec![GridColumn::new("name", "Name").fixed(20)]).unwrap();
        let mut g: DataGridView<Record> = DataGridView::new(columns);
        g.set_records(vec![
            Record::with_key("a")
                .set("name", "parent")
                .child(Record::with_key("a1").set("name", "child one"))
                .child(Record::with_key("a2").set("name", "child two")),
            Record::with_key("b").set("name", "sibling"),
        ]);
        assert_eq!(g.visible_rows().len(), 2);

        g.cursor = Some(GridCursor { row: 0, col: 0 });
        g.handle_event(key_ev(KeyCode::Char('z')));
        let rows = g.visible_rows();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[1].key, RowKey::Text("a1".into()));
        assert_eq!(rows[1].depth, 1);
        assert_eq!(rows[2].key, RowKey::Text("a2".into()));
        assert_eq!(rows[3].key, RowKey::Text("b".into()));
        assert_eq!(rows[3].depth, 0);

        g.handle_event(key_ev(KeyCode::Char('z')));
        assert_eq!(g.visible_rows().len(), 2);
    }

    #[test]
    fn leaf_rows_ignore_expand_toggle() {
        let mut g = grid();
        g.cursor = Some(GridCursor { row: 0, col: 0 });
        let action = g.handle_event(key_ev(KeyCode::Char('z')));
        assert!(matches!(action, GridAction::None));
    }

    #[test]
    fn custom_renderer_draws_the_cell() {
        let columns = ColumnSet::new(vec![GridColumn::new("id", "ID").fixed(6).renderer(
            |rect, value, buf, _theme| {
                let text = format!("<{}>", value.display());
                buf.set_stringn(rect.x, rect.y, text, rect.width as usize, Style::default());
            },
        )])
        .unwrap();
        let mut g = DataGridView::new(columns);
        g.set_records(vec![Record::with_key(1i64).set("id", 7)]);
        let buf = render(&mut g);
        let row: String = (0..10)
            .filter_map(|x| buf.cell((x, 1)).map(|c| c.symbol().to_string()))
            .collect();
        assert!(row.contains("<7>"), "row was: {row:?}");
    }

    #[test]
    fn context_menu_emits_row_action_for_cursor_row() {
        let mut g = grid();
        g.options.row_actions = vec![
            RowAction::new("archive", "Archive"),
            RowAction::new("delete", "Delete"),
        ];
        g.cursor = Some(GridCursor { row: 1, col: 0 });
        g.handle_event(key_ev(KeyCode::Char('m')));
        assert!(g.menu.is_some());

        g.handle_event(key_ev(KeyCode::Down));
        let action = g.handle_event(key_ev(KeyCode::Enter));
        match action {
            GridAction::Event(GridEvent::RowAction { action, key }) => {
                assert_eq!(action, "delete");
                assert_eq!(key, RowKey::Int(2));
            }
            other => panic!("expected row action, got {other:?}"),
        }
        assert!(g.menu.is_none());
    }

    #[test]
    fn menu_escape_closes_without_event() {
        let mut g = grid();
        g.options.row_actions = vec![RowAction::new("x", "X")];
        g.cursor = Some(GridCursor { row: 0, col: 0 });
        g.handle_event(key_ev(KeyCode::Char('m')));
        let action = g.handle_event(key_ev(KeyCode::Esc));
        assert!(matches!(action, GridAction::Redraw));
        assert!(g.menu.is_none());
    }

    #[test]
    fn empty_state_action_fires_on_enter() {
        let mut g = grid();
        g.options.empty_action = Some("press Enter to add a row".into());
        g.set_filters(vec![Filter::new("age", FilterOp::Gt, 100)]).unwrap();
        let action = g.handle_event(key_ev(KeyCode::Enter));
        assert!(matches!(
            action,
            GridAction::Event(GridEvent::EmptyActivated)
        ));
    }

    #[test]
    fn empty_filter_result_renders_empty_state() {
        let mut g = grid();
        g.set_filters(vec![Filter::new("age", FilterOp::Gt, 100)]).unwrap();
        assert!(g.derived().is_empty());
        let buf = render(&mut g);
        // Body spans y=1..=10 (header above, footer below); the empty-state
        // line sits at its vertical middle.
        let row: String = (0..60)
            .filter_map(|x| buf.cell((x, 6)).map(|c| c.symbol().to_string()))
            .collect();
        assert!(row.contains("no rows"), "row was: {row:?}");
    }

    #[test]
    fn header_click_sorts_column() {
        let mut g = grid();
        render(&mut g);
        // First span starts at x=0 (id column), header row y=0.
        let action = g.handle_event(InputEvent::Mouse(MouseEvent::down(1, 0)));
        assert!(matches!(
            action,
            GridAction::Event(GridEvent::SortChanged(Some(ref s))) if s.column == "id"
        ));
    }
}
