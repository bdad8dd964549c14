use std::cmp::Ordering;
use std::str::FromStr;

use crate::error::ConfigError;
use crate::value::CellValue;

/// Filter comparison operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    Contains,
    StartsWith,
    EndsWith,
    In,
    Between,
}

impl FilterOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOp::Eq => "eq",
            FilterOp::Ne => "ne",
            FilterOp::Gt => "gt",
            FilterOp::Gte => "gte",
            FilterOp::Lt => "lt",
            FilterOp::Lte => "lte",
            FilterOp::Contains => "contains",
            FilterOp::StartsWith => "startsWith",
            FilterOp::EndsWith => "endsWith",
            FilterOp::In => "in",
            FilterOp::Between => "between",
        }
    }
}

impl FromStr for FilterOp {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "eq" => Ok(FilterOp::Eq),
            "ne" => Ok(FilterOp::Ne),
            "gt" => Ok(FilterOp::Gt),
            "gte" => Ok(FilterOp::Gte),
            "lt" => Ok(FilterOp::Lt),
            "lte" => Ok(FilterOp::Lte),
            "contains" => Ok(FilterOp::Contains),
            "startsWith" => Ok(FilterOp::StartsWith),
            "endsWith" => Ok(FilterOp::EndsWith),
            "in" => Ok(FilterOp::In),
            "between" => Ok(FilterOp::Between),
            other => Err(ConfigError::UnknownFilterOp(other.to_string())),
        }
    }
}

/// One filter predicate over a column. A grid's active filters combine with
/// logical AND.
#[derive(Clone, Debug, PartialEq)]
pub struct Filter {
    pub column: String,
    pub op: FilterOp,
    operands: Vec<CellValue>,
}

impl Filter {
    /// Single-operand filter (every operator except `In` and `Between`).
    pub fn new(column: impl Into<String>, op: FilterOp, value: impl Into<CellValue>) -> Self {
        Self {
            column: column.into(),
            op,
            operands: vec![value.into()],
        }
    }

    /// `In` filter: the field must equal one of `values`.
    pub fn any_of(
        column: impl Into<String>,
        values: impl IntoIterator<Item = CellValue>,
    ) -> Self {
        Self {
            column: column.into(),
            op: FilterOp::In,
            operands: values.into_iter().collect(),
        }
    }

    /// `Between` filter: inclusive range check.
    pub fn between(
        column: impl Into<String>,
        lo: impl Into<CellValue>,
        hi: impl Into<CellValue>,
    ) -> Self {
        Self {
            column: column.into(),
            op: FilterOp::Between,
            operands: vec![lo.into(), hi.into()],
        }
    }

    pub fn operands(&self) -> &[CellValue] {
        &self.operands
    }

    /// Whether a field value passes this filter.
    ///
    /// Null policy: a null/absent field fails every operator, including
    /// `Ne`. Substring operators are case-sensitive over the stringified
    /// value; ordering operators use the value's native ordering.
    pub fn matches(&self, value: &CellValue) -> bool {
        if value.is_null() {
            return false;
        }
        match self.op {
            FilterOp::Eq => self.operands.first().is_some_and(|v| value == v),
            FilterOp::Ne => self.operands.first().is_some_and(|v| value != v),
            FilterOp::Gt => self.cmp_first(value, |o| o == Ordering::Greater),
            FilterOp::Gte => self.cmp_first(value, |o| o != Ordering::Less),
            FilterOp::Lt => self.cmp_first(value, |o| o == Ordering::Less),
            FilterOp::Lte => self.cmp_first(value, |o| o != Ordering::Greater),
            FilterOp::Contains => self.text_test(value, |hay, needle| hay.contains(needle)),
            FilterOp::StartsWith => self.text_test(value, |hay, needle| hay.starts_with(needle)),
            FilterOp::EndsWith => self.text_test(value, |hay, needle| hay.ends_with(needle)),
            FilterOp::In => self.operands.iter().any(|v| value == v),
            FilterOp::Between => {
                let (Some(lo), Some(hi)) = (self.operands.first(), self.operands.get(1)) else {
                    return false;
                };
                value.compare(lo) != Ordering::Less && value.compare(hi) != Ordering::Greater
            }
        }
    }

    fn cmp_first(&self, value: &CellValue, accept: impl Fn(Ordering) -> bool) -> bool {
        self.operands
            .first()
            .is_some_and(|v| accept(value.compare(v)))
    }

    fn text_test(&self, value: &CellValue, test: impl Fn(&str, &str) -> bool) -> bool {
        self.operands
            .first()
            .is_some_and(|v| test(&value.display(), &v.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operator_names_parse_exactly() {
        assert_eq!("startsWith".parse::<FilterOp>().unwrap(), FilterOp::StartsWith);
        assert_eq!("gte".parse::<FilterOp>().unwrap(), FilterOp::Gte);
        assert!(matches!(
            "starts_with".parse::<FilterOp>(),
            Err(ConfigError::UnknownFilterOp(_))
        ));
    }

    #[test]
    fn null_fails_every_operator() {
        let ops = [
            Filter::new("c", FilterOp::Eq, CellValue::Null),
            Filter::new("c", FilterOp::Ne, 1),
            Filter::new("c", FilterOp::Contains, ""),
            Filter::any_of("c", [CellValue::Null]),
            Filter::between("c", -1, 1),
        ];
        for f in &ops {
            assert!(!f.matches(&CellValue::Null), "op {:?}", f.op);
        }
    }

    #[test]
    fn substring_ops_are_case_sensitive() {
        let f = Filter::new("c", FilterOp::Contains, "Ada");
        assert!(f.matches(&CellValue::Text("Ada Lovelace".into())));
        assert!(!f.matches(&CellValue::Text("ada lovelace".into())));

        let f = Filter::new("c", FilterOp::StartsWith, "lo");
        assert!(f.matches(&CellValue::Text("lovelace".into())));
        assert!(!f.matches(&CellValue::Text("ada".into())));
    }

    #[test]
    fn between_is_inclusive() {
        let f = Filter::between("c", 10, 20);
        assert!(f.matches(&CellValue::Int(10)));
        assert!(f.matches(&CellValue::Int(20)));
        assert!(!f.matches(&CellValue::Int(21)));
        assert!(f.matches(&CellValue::Float(19.5)));
    }

    #[test]
    fn in_checks_membership() {
        let f = Filter::any_of("c", [CellValue::Int(1), CellValue::Int(3)]);
        assert!(f.matches(&CellValue::Int(3)));
        assert!(!f.matches(&CellValue::Int(2)));
    }

    #[test]
    fn ordering_ops_compare_numerically() {
        let f = Filter::new("age", FilterOp::Gte, 25);
        assert!(f.matches(&CellValue::Int(30)));
        assert!(!f.matches(&CellValue::Int(20)));
        assert!(f.matches(&CellValue::Float(25.0)));
    }
}
