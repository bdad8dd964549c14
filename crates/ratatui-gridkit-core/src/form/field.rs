use crate::form::rules::Rule;
use crate::value::CellValue;

/// Editor type a field renders and the value shape it produces.
#[derive(Clone, Debug)]
pub enum FieldKind {
    Text,
    Number,
    Select(Vec<String>),
    Checkbox,
}

/// Visibility dependency: the field is shown iff the referenced field's
/// current value equals `equals`.
#[derive(Clone, Debug, PartialEq)]
pub struct Condition {
    pub field: String,
    pub equals: CellValue,
}

/// Declarative description of one form field.
#[derive(Clone, Debug)]
pub struct FieldSpec {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    pub initial: CellValue,
    pub rules: Vec<Rule>,
    pub visible_when: Option<Condition>,
}

impl FieldSpec {
    pub fn text(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, FieldKind::Text)
    }

    pub fn number(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, FieldKind::Number)
    }

    pub fn select(
        name: impl Into<String>,
        label: impl Into<String>,
        options: Vec<String>,
    ) -> Self {
        Self::new(name, label, FieldKind::Select(options))
    }

    pub fn checkbox(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, FieldKind::Checkbox).initial(false)
    }

    fn new(name: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            kind,
            initial: CellValue::Null,
            rules: Vec::new(),
            visible_when: None,
        }
    }

    pub fn initial(mut self, value: impl Into<CellValue>) -> Self {
        self.initial = value.into();
        self
    }

    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn required(self) -> Self {
        self.rule(Rule::Required)
    }

    /// Show this field only while `field`'s value equals `equals`.
    pub fn visible_when(mut self, field: impl Into<String>, equals: impl Into<CellValue>) -> Self {
        self.visible_when = Some(Condition {
            field: field.into(),
            equals: equals.into(),
        });
        self
    }
}
