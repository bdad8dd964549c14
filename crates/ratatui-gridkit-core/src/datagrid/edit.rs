use crate::datagrid::column::CellType;
use crate::datagrid::column::GridColumn;
use crate::form::rules;
use crate::input::KeyCode;
use crate::input::KeyEvent;
use crate::value::CellValue;

/// Type-appropriate inline editor state, seeded from the current value.
#[derive(Clone, Debug)]
enum Editor {
    Text { draft: String },
    Number { draft: String },
    Select { options: Vec<String>, index: usize },
    Checkbox { checked: bool },
}

/// What a keystroke did to the edit session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditKey {
    Handled,
    Commit,
    Cancel,
    Ignored,
}

/// A short-lived editing session on one cell.
///
/// The session owns a draft; the underlying record is untouched until the
/// host applies the committed value from the grid's edit event. Cancelling
/// discards the draft without emitting anything.
#[derive(Clone, Debug)]
pub struct EditSession {
    /// Index into the derived view's visible rows.
    pub row: usize,
    /// Column index in declaration order.
    pub col: usize,
    editor: Editor,
    error: Option<String>,
    original: CellValue,
}

impl EditSession {
    pub fn start(column: &GridColumn, row: usize, col: usize, current: CellValue) -> Self {
        let editor = match &column.cell_type {
            CellType::Text => Editor::Text {
                draft: current.display(),
            },
            CellType::Number => Editor::Number {
                draft: current.display(),
            },
            CellType::Select(options) => {
                let index = options
                    .iter()
                    .position(|o| CellValue::Text(o.clone()) == current)
                    .unwrap_or(0);
                Editor::Select {
                    options: options.clone(),
                    index,
                }
            }
            CellType::Checkbox => Editor::Checkbox {
                checked: current.as_bool().unwrap_or(false),
            },
        };
        Self {
            row,
            col,
            editor,
            error: None,
            original: current,
        }
    }

    pub fn original(&self) -> &CellValue {
        &self.original
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Editor content for rendering.
    pub fn display(&self) -> String {
        match &self.editor {
            Editor::Text { draft } | Editor::Number { draft } => draft.clone(),
            Editor::Select { options, index } => options
                .get(*index)
                .map(|o| format!("‹ {o} ›"))
                .unwrap_or_default(),
            Editor::Checkbox { checked } => {
                if *checked { "[x]" } else { "[ ]" }.to_string()
            }
        }
    }

    pub fn handle_key(&mut self, key: &KeyEvent) -> EditKey {
        match key.code {
            KeyCode::Enter => return EditKey::Commit,
            KeyCode::Esc => return EditKey::Cancel,
            _ => {}
        }
        let handled = match &mut self.editor {
            Editor::Text { draft } => match &key.code {
                KeyCode::Char(c) => {
                    draft.push(*c);
                    true
                }
                KeyCode::Backspace => {
                    draft.pop();
                    true
                }
                _ => false,
            },
            Editor::Number { draft } => match &key.code {
                KeyCode::Char(c) if c.is_ascii_digit() || *c == '-' || *c == '.' => {
                    draft.push(*c);
                    true
                }
                KeyCode::Backspace => {
                    draft.pop();
                    true
                }
                _ => false,
            },
            Editor::Select { options, index } => match &key.code {
                KeyCode::Up | KeyCode::Left => {
                    if !options.is_empty() {
                        *index = (*index + options.len() - 1) % options.len();
                    }
                    true
                }
                KeyCode::Down | KeyCode::Right => {
                    if !options.is_empty() {
                        *index = (*index + 1) % options.len();
                    }
                    true
                }
                _ => false,
            },
            Editor::Checkbox { checked } => match &key.code {
                KeyCode::Char(' ') => {
                    *checked = !*checked;
                    true
                }
                _ => false,
            },
        };
        if handled {
            self.error = None;
            EditKey::Handled
        } else {
            EditKey::Ignored
        }
    }

    /// Parse the draft into a value without validating column rules.
    fn parse(&self) -> Result<CellValue, String> {
        match &self.editor {
            Editor::Text { draft } => Ok(CellValue::Text(draft.clone())),
            Editor::Number { draft } => {
                if draft.trim().is_empty() {
                    return Ok(CellValue::Null);
                }
                if let Ok(n) = draft.trim().parse::<i64>() {
                    return Ok(CellValue::Int(n));
                }
                draft
                    .trim()
                    .parse::<f64>()
                    .map(CellValue::Float)
                    .map_err(|_| "must be a number".to_string())
            }
            Editor::Select { options, index } => options
                .get(*index)
                .map(|o| CellValue::Text(o.clone()))
                .ok_or_else(|| "no option selected".to_string()),
            Editor::Checkbox { checked } => Ok(CellValue::Bool(*checked)),
        }
    }

    /// Validate and produce the committed value. On failure the session
    /// stays alive with an inline error for the view to surface.
    pub fn commit(&mut self, column: &GridColumn) -> Result<CellValue, String> {
        let result = self
            .parse()
            .and_then(|value| rules::check_all(&column.rules, &value).map(|_| value));
        if let Err(msg) = &result {
            self.error = Some(msg.clone());
        }
        result
    }
}
