use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use ratatui::buffer::Buffer;
use ratatui::layout::Alignment;
use ratatui::layout::Rect;

use crate::error::ConfigError;
use crate::form::rules::Rule;
use crate::theme::Theme;
use crate::value::CellValue;

/// Column sizing: a fixed cell count, or a flexible share of the remaining
/// width with a floor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnWidth {
    Fixed(u16),
    Flex { min: u16 },
}

/// Side a column is pinned to. Pinned columns are exempt from horizontal
/// scrolling and keep their relative order within their group.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PinSide {
    #[default]
    None,
    Left,
    Right,
}

/// Editor rendered when a cell of this column enters editing state, and the
/// value shape commits produce.
#[derive(Clone, Debug, Default)]
pub enum CellType {
    #[default]
    Text,
    Number,
    Select(Vec<String>),
    Checkbox,
}

pub type Formatter = Arc<dyn Fn(&CellValue) -> String + Send + Sync>;

/// Full custom cell rendering: the grid hands over the cell rect and the
/// field value instead of drawing formatted text.
pub type CellRenderer = Arc<dyn Fn(Rect, &CellValue, &mut Buffer, &Theme) + Send + Sync>;

/// Configuration for one grid column.
#[derive(Clone)]
pub struct GridColumn {
    pub key: String,
    pub title: String,
    pub width: ColumnWidth,
    pub sortable: bool,
    pub filterable: bool,
    pub editable: bool,
    pub pinned: PinSide,
    pub align: Alignment,
    pub cell_type: CellType,
    pub formatter: Option<Formatter>,
    pub renderer: Option<CellRenderer>,
    pub min_width: u16,
    pub max_width: u16,
    /// Validation applied when an edit on this column commits.
    pub rules: Vec<Rule>,
}

impl GridColumn {
    pub fn new(key: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            width: ColumnWidth::Fixed(12),
            sortable: true,
            filterable: true,
            editable: false,
            pinned: PinSide::None,
            align: Alignment::Left,
            cell_type: CellType::Text,
            formatter: None,
            renderer: None,
            min_width: 3,
            max_width: u16::MAX,
            rules: Vec::new(),
        }
    }

    pub fn fixed(mut self, width: u16) -> Self {
        self.width = ColumnWidth::Fixed(width);
        self
    }

    pub fn flex(mut self, min: u16) -> Self {
        self.width = ColumnWidth::Flex { min };
        self
    }

    pub fn sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    pub fn filterable(mut self, filterable: bool) -> Self {
        self.filterable = filterable;
        self
    }

    pub fn editable(mut self, editable: bool) -> Self {
        self.editable = editable;
        self
    }

    pub fn pinned(mut self, side: PinSide) -> Self {
        self.pinned = side;
        self
    }

    pub fn align(mut self, align: Alignment) -> Self {
        self.align = align;
        self
    }

    pub fn cell_type(mut self, cell_type: CellType) -> Self {
        self.cell_type = cell_type;
        self
    }

    pub fn formatter(
        mut self,
        format: impl Fn(&CellValue) -> String + Send + Sync + 'static,
    ) -> Self {
        self.formatter = Some(Arc::new(format));
        self
    }

    pub fn renderer(
        mut self,
        render: impl Fn(Rect, &CellValue, &mut Buffer, &Theme) + Send + Sync + 'static,
    ) -> Self {
        self.renderer = Some(Arc::new(render));
        self
    }

    /// Bounds a resize session clamps to.
    pub fn resize_bounds(mut self, min: u16, max: u16) -> Self {
        self.min_width = min;
        self.max_width = max;
        self
    }

    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Cell text for a value: the formatter when one is set, otherwise the
    /// value's plain stringification.
    pub fn display_value(&self, value: &CellValue) -> String {
        match &self.formatter {
            Some(format) => format(value),
            None => value.display(),
        }
    }
}

impl fmt::Debug for GridColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridColumn")
            .field("key", &self.key)
            .field("title", &self.title)
            .field("width", &self.width)
            .field("sortable", &self.sortable)
            .field("filterable", &self.filterable)
            .field("editable", &self.editable)
            .field("pinned", &self.pinned)
            .field("cell_type", &self.cell_type)
            .finish_non_exhaustive()
    }
}

/// Validated, ordered set of columns.
#[derive(Clone, Debug)]
pub struct ColumnSet {
    columns: Vec<GridColumn>,
}

impl ColumnSet {
    /// Rejects duplicate column keys; pinned columns keep their relative
    /// order within each pinned group.
    pub fn new(columns: Vec<GridColumn>) -> Result<Self, ConfigError> {
        let mut seen = HashSet::new();
        for col in &columns {
            if !seen.insert(col.key.clone()) {
                return Err(ConfigError::DuplicateColumnKey(col.key.clone()));
            }
        }
        Ok(Self { columns })
    }

    pub fn empty() -> Self {
        Self {
            columns: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&GridColumn> {
        self.columns.get(index)
    }

    pub fn by_key(&self, key: &str) -> Option<&GridColumn> {
        self.columns.iter().find(|c| c.key == key)
    }

    pub fn index_of(&self, key: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.key == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &GridColumn> {
        self.columns.iter()
    }

    /// Column indices in layout order: left-pinned group, scrollable middle,
    /// right-pinned group. Relative order within each group is the
    /// declaration order.
    pub fn layout_order(&self) -> (Vec<usize>, Vec<usize>, Vec<usize>) {
        let mut left = Vec::new();
        let mut mid = Vec::new();
        let mut right = Vec::new();
        for (i, col) in self.columns.iter().enumerate() {
            match col.pinned {
                PinSide::Left => left.push(i),
                PinSide::None => mid.push(i),
                PinSide::Right => right.push(i),
            }
        }
        (left, mid, right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_keys_are_rejected() {
        let cols = vec![
            GridColumn::new("id", "ID"),
            GridColumn::new("name", "Name"),
            GridColumn::new("id", "Other"),
        ];
        assert!(matches!(
            ColumnSet::new(cols),
            Err(ConfigError::DuplicateColumnKey(k)) if k == "id"
        ));
    }

    #[test]
    fn layout_order_groups_pins_stably() {
        let set = ColumnSet::new(vec![
            GridColumn::new("a", "A").pinned(PinSide::Right),
            GridColumn::new("b", "B"),
            GridColumn::new("c", "C").pinned(PinSide::Left),
            GridColumn::new("d", "D").pinned(PinSide::Left),
            GridColumn::new("e", "E"),
        ])
        .unwrap();
        let (left, mid, right) = set.layout_order();
        assert_eq!(left, vec![2, 3]);
        assert_eq!(mid, vec![1, 4]);
        assert_eq!(right, vec![0]);
    }

    #[test]
    fn formatter_overrides_plain_display() {
        let col = GridColumn::new("price", "Price").formatter(|v| format!("${}", v.display()));
        assert_eq!(col.display_value(&CellValue::Int(5)), "$5");
        let plain = GridColumn::new("price", "Price");
        assert_eq!(plain.display_value(&CellValue::Int(5)), "5");
    }
}
