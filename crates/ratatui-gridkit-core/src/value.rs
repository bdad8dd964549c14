use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

/// A dynamically typed cell value.
///
/// Grid and form components read caller data through this type so that
/// filtering, sorting and validation can operate on heterogeneous records
/// without knowing their concrete shape.
#[derive(Clone, Debug, PartialEq)]
pub enum CellValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Numeric view of the value, when it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            CellValue::Int(n) => Some(n as f64),
            CellValue::Float(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            CellValue::Bool(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Rendering/stringification used by display cells and substring filters.
    ///
    /// `Null` renders as the empty string.
    pub fn display(&self) -> String {
        match self {
            CellValue::Null => String::new(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Int(n) => n.to_string(),
            CellValue::Float(f) => f.to_string(),
            CellValue::Text(s) => s.clone(),
        }
    }

    /// Total ordering across value kinds.
    ///
    /// Numbers (`Int`/`Float`) compare numerically with each other, text
    /// compares lexically, `false < true`, and `Null` sorts before
    /// everything. Mixed kinds fall back to a fixed kind rank so sorting a
    /// ragged column stays deterministic.
    pub fn compare(&self, other: &CellValue) -> Ordering {
        use CellValue::*;
        match (self, other) {
            (Null, Null) => Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Int(a), Int(b)) => a.cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            (Int(_) | Float(_), Int(_) | Float(_)) => {
                let a = self.as_f64().unwrap_or(0.0);
                let b = other.as_f64().unwrap_or(0.0);
                a.total_cmp(&b)
            }
            _ => self.kind_rank().cmp(&other.kind_rank()),
        }
    }

    fn kind_rank(&self) -> u8 {
        match self {
            CellValue::Null => 0,
            CellValue::Bool(_) => 1,
            CellValue::Int(_) | CellValue::Float(_) => 2,
            CellValue::Text(_) => 3,
        }
    }
}

impl From<bool> for CellValue {
    fn from(v: bool) -> Self {
        CellValue::Bool(v)
    }
}

impl From<i64> for CellValue {
    fn from(v: i64) -> Self {
        CellValue::Int(v)
    }
}

impl From<i32> for CellValue {
    fn from(v: i32) -> Self {
        CellValue::Int(v as i64)
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Float(v)
    }
}

impl From<&str> for CellValue {
    fn from(v: &str) -> Self {
        CellValue::Text(v.to_string())
    }
}

impl From<String> for CellValue {
    fn from(v: String) -> Self {
        CellValue::Text(v)
    }
}

/// Stable identity for a row, independent of its current position in the
/// derived view.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RowKey {
    /// Fallback identity: the row's index in the caller-supplied data.
    Index(usize),
    Int(i64),
    Text(String),
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowKey::Index(i) => write!(f, "#{i}"),
            RowKey::Int(n) => write!(f, "{n}"),
            RowKey::Text(s) => f.write_str(s),
        }
    }
}

impl From<usize> for RowKey {
    fn from(v: usize) -> Self {
        RowKey::Index(v)
    }
}

impl From<i64> for RowKey {
    fn from(v: i64) -> Self {
        RowKey::Int(v)
    }
}

impl From<&str> for RowKey {
    fn from(v: &str) -> Self {
        RowKey::Text(v.to_string())
    }
}

/// Read access the grid needs over one caller-owned data record.
///
/// The grid treats records as read-mostly: it never writes through this
/// trait. Edits are reported to the host as events carrying old and new
/// values, and the host applies them.
pub trait GridRecord {
    /// The value of the field addressed by a column key. Absent fields are
    /// `CellValue::Null`.
    fn field(&self, key: &str) -> CellValue;

    /// Explicit row identity, if the record has one. Rows without one get
    /// `RowKey::Index` of their position in the input data.
    fn record_key(&self) -> Option<RowKey> {
        None
    }

    /// Child records for hierarchical data. Children render indented under
    /// their expanded parent; give them explicit keys, since the index
    /// fallback only identifies top-level rows.
    fn children(&self) -> &[Self]
    where
        Self: Sized,
    {
        &[]
    }
}

/// Map-backed record for dynamic data, tests and examples.
#[derive(Clone, Debug, Default)]
pub struct Record {
    key: Option<RowKey>,
    fields: BTreeMap<String, CellValue>,
    children: Vec<Record>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key(key: impl Into<RowKey>) -> Self {
        Self {
            key: Some(key.into()),
            ..Self::default()
        }
    }

    pub fn set(mut self, field: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<CellValue>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn child(mut self, child: Record) -> Self {
        self.children.push(child);
        self
    }
}

impl GridRecord for Record {
    fn field(&self, key: &str) -> CellValue {
        self.fields.get(key).cloned().unwrap_or(CellValue::Null)
    }

    fn record_key(&self) -> Option<RowKey> {
        self.key.clone()
    }

    fn children(&self) -> &[Self] {
        &self.children
    }
}
