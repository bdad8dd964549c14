use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;

use crate::error::ConfigError;
use crate::event::Emitter;
use crate::form::field::FieldKind;
use crate::form::field::FieldSpec;
use crate::form::rules;
use crate::input::InputEvent;
use crate::input::KeyCode;
use crate::input::KeyEvent;
use crate::render;
use crate::theme::Theme;
use crate::value::CellValue;

/// One failed field after validation.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Clone, Debug)]
pub enum FormAction {
    None,
    Redraw,
    Event(FormEvent),
}

#[derive(Clone, Debug, PartialEq)]
pub enum FormEvent {
    ValueChanged { field: String, value: CellValue },
    Submitted { values: Vec<(String, CellValue)> },
    SubmitRejected { errors: Vec<FieldError> },
}

#[derive(Clone, Debug)]
pub struct FormOptions {
    pub label_width: u16,
    pub style: Style,
    pub focus_style: Style,
    pub error_style: Style,
    pub label_style: Style,
}

impl Default for FormOptions {
    fn default() -> Self {
        Self {
            label_width: 16,
            style: Style::default(),
            focus_style: Style::default(),
            error_style: Style::default(),
            label_style: Style::default(),
        }
    }
}

/// Per-field editor state, parallel to the field specs.
#[derive(Clone, Debug)]
enum FieldState {
    Text { draft: String },
    Number { draft: String },
    Select { index: Option<usize> },
    Checkbox { checked: bool },
}

impl FieldState {
    fn seed(spec: &FieldSpec) -> Self {
        match &spec.kind {
            FieldKind::Text => FieldState::Text {
                draft: spec.initial.display(),
            },
            FieldKind::Number => FieldState::Number {
                draft: spec.initial.display(),
            },
            FieldKind::Select(options) => {
                let index = options
                    .iter()
                    .position(|o| CellValue::Text(o.clone()) == spec.initial);
                FieldState::Select { index }
            }
            FieldKind::Checkbox => FieldState::Checkbox {
                checked: spec.initial.as_bool().unwrap_or(false),
            },
        }
    }
}

/// Declarative form driven by field specs and a visibility dependency graph.
///
/// A field with a `visible_when` condition is shown only while the
/// referenced field's value equals the expected value; hidden fields keep
/// their last value but are excluded from focus, validation, and the submit
/// payload.
pub struct FormView {
    specs: Vec<FieldSpec>,
    states: Vec<FieldState>,
    errors: Vec<Option<String>>,
    focus: usize,
    options: FormOptions,
    emitter: Emitter<FormEvent>,
}

impl FormView {
    /// Duplicate field names and conditions on unknown fields are
    /// configuration errors.
    pub fn new(specs: Vec<FieldSpec>) -> Result<Self, ConfigError> {
        let mut seen = std::collections::HashSet::new();
        for spec in &specs {
            if !seen.insert(spec.name.clone()) {
                return Err(ConfigError::DuplicateFieldName(spec.name.clone()));
            }
        }
        for spec in &specs {
            if let Some(cond) = &spec.visible_when
                && !specs.iter().any(|s| s.name == cond.field)
            {
                return Err(ConfigError::UnknownDependencyField(cond.field.clone()));
            }
        }
        let states = specs.iter().map(FieldState::seed).collect();
        let errors = vec![None; specs.len()];
        let mut form = Self {
            specs,
            states,
            errors,
            focus: 0,
            options: FormOptions::default(),
            emitter: Emitter::new(),
        };
        form.fix_focus(1);
        Ok(form)
    }

    pub fn with_options(specs: Vec<FieldSpec>, options: FormOptions) -> Result<Self, ConfigError> {
        let mut form = Self::new(specs)?;
        form.options = options;
        Ok(form)
    }

    pub fn subscribe(&mut self, handler: impl FnMut(&FormEvent) + 'static) {
        self.emitter.subscribe(handler);
    }

    /// Current value of a field by name, visible or not.
    pub fn value(&self, name: &str) -> Option<CellValue> {
        let idx = self.index_of(name)?;
        Some(self.current_value(idx))
    }

    pub fn error(&self, name: &str) -> Option<&str> {
        let idx = self.index_of(name)?;
        self.errors[idx].as_deref()
    }

    pub fn focused_field(&self) -> Option<&str> {
        self.specs.get(self.focus).map(|s| s.name.as_str())
    }

    /// Whether the field at `index` is currently visible under the
    /// dependency graph.
    pub fn is_visible(&self, index: usize) -> bool {
        let Some(spec) = self.specs.get(index) else {
            return false;
        };
        match &spec.visible_when {
            None => true,
            Some(cond) => self
                .index_of(&cond.field)
                .map(|dep| self.current_value(dep) == cond.equals)
                .unwrap_or(false),
        }
    }

    pub fn visible_fields(&self) -> Vec<&str> {
        (0..self.specs.len())
            .filter(|&i| self.is_visible(i))
            .map(|i| self.specs[i].name.as_str())
            .collect()
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.specs.iter().position(|s| s.name == name)
    }

    fn current_value(&self, index: usize) -> CellValue {
        match &self.states[index] {
            FieldState::Text { draft } => {
                if draft.is_empty() {
                    CellValue::Null
                } else {
                    CellValue::Text(draft.clone())
                }
            }
            FieldState::Number { draft } => {
                let t = draft.trim();
                if t.is_empty() {
                    CellValue::Null
                } else if let Ok(n) = t.parse::<i64>() {
                    CellValue::Int(n)
                } else if let Ok(f) = t.parse::<f64>() {
                    CellValue::Float(f)
                } else {
                    CellValue::Null
                }
            }
            FieldState::Select { index: selected } => {
                let FieldKind::Select(options) = &self.specs[index].kind else {
                    return CellValue::Null;
                };
                match selected {
                    Some(i) => options
                        .get(*i)
                        .map(|o| CellValue::Text(o.clone()))
                        .unwrap_or(CellValue::Null),
                    None => CellValue::Null,
                }
            }
            FieldState::Checkbox { checked } => CellValue::Bool(*checked),
        }
    }

    pub fn handle_event(&mut self, event: InputEvent) -> FormAction {
        match event {
            InputEvent::Key(key) => self.handle_key(key),
            InputEvent::Paste(text) => self.handle_paste(&text),
            InputEvent::Mouse(_) => FormAction::None,
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> FormAction {
        match key.code {
            KeyCode::Tab if key.modifiers.shift => {
                self.move_focus(-1);
                return FormAction::Redraw;
            }
            KeyCode::Tab => {
                self.move_focus(1);
                return FormAction::Redraw;
            }
            KeyCode::Down => {
                self.move_focus(1);
                return FormAction::Redraw;
            }
            KeyCode::Up => {
                self.move_focus(-1);
                return FormAction::Redraw;
            }
            KeyCode::Enter => return self.submit(),
            _ => {}
        }

        if !self.is_visible(self.focus) {
            return FormAction::None;
        }
        let changed = match &mut self.states[self.focus] {
            FieldState::Text { draft } => match &key.code {
                KeyCode::Char(c) => {
                    draft.push(*c);
                    true
                }
                KeyCode::Backspace => draft.pop().is_some(),
                _ => false,
            },
            FieldState::Number { draft } => match &key.code {
                KeyCode::Char(c) if c.is_ascii_digit() || *c == '-' || *c == '.' => {
                    draft.push(*c);
                    true
                }
                KeyCode::Backspace => draft.pop().is_some(),
                _ => false,
            },
            FieldState::Select { index } => {
                let FieldKind::Select(options) = &self.specs[self.focus].kind else {
                    return FormAction::None;
                };
                let n = options.len();
                match &key.code {
                    KeyCode::Left if n > 0 => {
                        *index = Some(index.map_or(n - 1, |i| (i + n - 1) % n));
                        true
                    }
                    KeyCode::Right if n > 0 => {
                        *index = Some(index.map_or(0, |i| (i + 1) % n));
                        true
                    }
                    _ => false,
                }
            }
            FieldState::Checkbox { checked } => match &key.code {
                KeyCode::Char(' ') => {
                    *checked = !*checked;
                    true
                }
                _ => false,
            },
        };

        if changed {
            self.errors[self.focus] = None;
            let field = self.specs[self.focus].name.clone();
            let value = self.current_value(self.focus);
            // A value change can hide the focused field's dependents or the
            // field currently holding focus.
            self.fix_focus(1);
            return self.commit(FormEvent::ValueChanged { field, value });
        }
        FormAction::None
    }

    fn handle_paste(&mut self, text: &str) -> FormAction {
        if !self.is_visible(self.focus) {
            return FormAction::None;
        }
        let changed = match &mut self.states[self.focus] {
            FieldState::Text { draft } => {
                draft.push_str(text);
                true
            }
            FieldState::Number { draft } => {
                draft.push_str(text.trim());
                true
            }
            _ => false,
        };
        if changed {
            let field = self.specs[self.focus].name.clone();
            let value = self.current_value(self.focus);
            return self.commit(FormEvent::ValueChanged { field, value });
        }
        FormAction::None
    }

    fn move_focus(&mut self, dir: i32) {
        let n = self.specs.len();
        if n == 0 {
            return;
        }
        let mut i = self.focus;
        for _ in 0..n {
            i = if dir > 0 {
                (i + 1) % n
            } else {
                (i + n - 1) % n
            };
            if self.is_visible(i) {
                self.focus = i;
                return;
            }
        }
    }

    /// Keep focus on a visible field, scanning in `dir`.
    fn fix_focus(&mut self, dir: i32) {
        if !self.is_visible(self.focus) {
            self.move_focus(dir);
        }
    }

    /// Run all rules over visible fields; hidden fields are skipped.
    pub fn validate(&mut self) -> Vec<FieldError> {
        let mut failures = Vec::new();
        for i in 0..self.specs.len() {
            if !self.is_visible(i) {
                self.errors[i] = None;
                continue;
            }
            let value = self.current_value(i);
            match rules::check_all(&self.specs[i].rules, &value) {
                Ok(()) => self.errors[i] = None,
                Err(message) => {
                    self.errors[i] = Some(message.clone());
                    failures.push(FieldError {
                        field: self.specs[i].name.clone(),
                        message,
                    });
                }
            }
        }
        failures
    }

    /// Validate and, on success, emit the submit payload of visible fields.
    /// On failure the offending fields keep inline errors and no submit
    /// event fires.
    pub fn submit(&mut self) -> FormAction {
        let errors = self.validate();
        if !errors.is_empty() {
            log::debug!("form submit rejected: {} invalid field(s)", errors.len());
            return self.commit(FormEvent::SubmitRejected { errors });
        }
        let values: Vec<(String, CellValue)> = (0..self.specs.len())
            .filter(|&i| self.is_visible(i))
            .map(|i| (self.specs[i].name.clone(), self.current_value(i)))
            .collect();
        self.commit(FormEvent::Submitted { values })
    }

    fn commit(&mut self, event: FormEvent) -> FormAction {
        self.emitter.emit(&event);
        FormAction::Event(event)
    }

    pub fn render(&self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let base = patch_or(self.options.style, theme.text_primary);
        let label_style = patch_or(self.options.label_style, theme.text_muted);
        let focus_style = patch_or(self.options.focus_style, theme.cursor);
        let error_style = patch_or(self.options.error_style, theme.error_text);

        buf.set_style(area, base);
        let label_w = self.options.label_width.min(area.width);
        let editor_x = area.x + label_w;
        let editor_w = area.width.saturating_sub(label_w);

        let mut y = area.y;
        let bottom = area.y + area.height;
        for i in 0..self.specs.len() {
            if !self.is_visible(i) || y >= bottom {
                continue;
            }
            let spec = &self.specs[i];
            render::render_aligned(
                area.x,
                y,
                label_w,
                buf,
                &spec.label,
                ratatui::layout::Alignment::Left,
                label_style,
            );
            let text = self.editor_text(i);
            let style = if i == self.focus { focus_style } else { base };
            render::render_aligned(
                editor_x,
                y,
                editor_w,
                buf,
                &text,
                ratatui::layout::Alignment::Left,
                style,
            );
            y += 1;
            if let Some(message) = &self.errors[i]
                && y < bottom
            {
                render::render_aligned(
                    editor_x,
                    y,
                    editor_w,
                    buf,
                    &format!("✗ {message}"),
                    ratatui::layout::Alignment::Left,
                    error_style,
                );
                y += 1;
            }
        }
    }

    fn editor_text(&self, index: usize) -> String {
        match &self.states[index] {
            FieldState::Text { draft } | FieldState::Number { draft } => draft.clone(),
            FieldState::Select { index: selected } => {
                let FieldKind::Select(options) = &self.specs[index].kind else {
                    return String::new();
                };
                match selected.and_then(|i| options.get(i)) {
                    Some(o) => format!("‹ {o} ›"),
                    None => "‹ ›".to_string(),
                }
            }
            FieldState::Checkbox { checked } => {
                if *checked { "[x]" } else { "[ ]" }.to_string()
            }
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
    use crate::form::rules::Rule;

    fn specs() -> Vec<FieldSpec> {
        vec![
            FieldSpec::text("name", "Name").required(),
            FieldSpec::checkbox("subscribe", "Subscribe"),
            FieldSpec::text("email", "Email")
                .required()
                .visible_when("subscribe", true),
            FieldSpec::number("age", "Age").rule(Rule::Min(0.0)),
        ]
    }

    fn key(code: KeyCode) -> InputEvent {
        InputEvent::Key(KeyEvent::new(code))
    }

    fn type_str(form: &mut FormView, s: &str) {
        for c in s.chars() {
            form.handle_event(key(KeyCode::Char(c)));
        }
    }

    #[test]
    fn duplicate_names_rejected() {
        let err = FormView::new(vec![
            FieldSpec::text("a", "A"),
            FieldSpec::text("a", "A2"),
        ]);
        assert!(matches!(err, Err(ConfigError::DuplicateFieldName(_))));
    }

    #[test]
    fn unknown_dependency_rejected() {
        let err = FormView::new(vec![
            FieldSpec::text("a", "A").visible_when("missing", true)
        ]);
        assert!(matches!(err, Err(ConfigError::UnknownDependencyField(_))));
    }

    #[test]
    fn dependency_toggling_shows_and_hides() {
        let mut form = FormView::new(specs()).unwrap();
        assert_eq!(form.visible_fields(), vec!["name", "subscribe", "age"]);

        // Focus the checkbox and toggle it on: email appears.
        form.handle_event(key(KeyCode::Tab));
        assert_eq!(form.focused_field(), Some("subscribe"));
        form.handle_event(key(KeyCode::Char(' ')));
        assert_eq!(
            form.visible_fields(),
            vec!["name", "subscribe", "email", "age"]
        );

        form.handle_event(key(KeyCode::Char(' ')));
        assert_eq!(form.visible_fields(), vec!["name", "subscribe", "age"]);
    }

    #[test]
    fn hidden_fields_are_excluded_from_validation_and_submit() {
        let mut form = FormView::new(specs()).unwrap();
        type_str(&mut form, "ada");
        // email is hidden and required; submit must still pass.
        let action = form.submit();
        match action {
            FormAction::Event(FormEvent::Submitted { values }) => {
                let names: Vec<&str> = values.iter().map(|(n, _)| n.as_str()).collect();
                assert_eq!(names, vec!["name", "subscribe", "age"]);
            }
            other => panic!("expected submit, got {other:?}"),
        }
    }

    #[test]
    fn submit_rejection_keeps_inline_errors_local() {
        let mut form = FormView::new(specs()).unwrap();
        let action = form.submit();
        match action {
            FormAction::Event(FormEvent::SubmitRejected { errors }) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].field, "name");
            }
            other => panic!("expected rejection, got {other:?}"),
        }
        assert!(form.error("name").is_some());
        assert!(form.error("age").is_none());

        // Typing into the field clears its error.
        type_str(&mut form, "a");
        assert!(form.error("name").is_none());
    }

    #[test]
    fn value_changes_emit_events() {
        let mut form = FormView::new(specs()).unwrap();
        let action = form.handle_event(key(KeyCode::Char('x')));
        match action {
            FormAction::Event(FormEvent::ValueChanged { field, value }) => {
                assert_eq!(field, "name");
                assert_eq!(value, CellValue::Text("x".into()));
            }
            other => panic!("expected value change, got {other:?}"),
        }
    }

    #[test]
    fn focus_skips_hidden_fields() {
        let mut form = FormView::new(specs()).unwrap();
        form.handle_event(key(KeyCode::Tab));
        form.handle_event(key(KeyCode::Tab));
        // email is hidden, so focus lands on age.
        assert_eq!(form.focused_field(), Some("age"));
    }

    #[test]
    fn number_field_accepts_digits_only() {
        let mut form = FormView::new(specs()).unwrap();
        for _ in 0..3 {
            form.handle_event(key(KeyCode::Tab));
        }
        assert_eq!(form.focused_field(), Some("age"));
        type_str(&mut form, "4a2");
        assert_eq!(form.value("age"), Some(CellValue::Int(42)));
    }
}
