use std::fmt;
use std::sync::Arc;

use regex::Regex;

use crate::error::ConfigError;
use crate::value::CellValue;

type CustomCheck = Arc<dyn Fn(&CellValue) -> Result<(), String> + Send + Sync>;

/// A single validation rule applied to a field or an editable grid cell.
///
/// Rules run on commit; the first failure keeps the field in its error state
/// with the returned message.
#[derive(Clone)]
pub enum Rule {
    /// Non-null, and for text values non-blank.
    Required,
    /// Minimum length in characters of the displayed value.
    MinLen(usize),
    /// Maximum length in characters of the displayed value.
    MaxLen(usize),
    /// The displayed value must match the pattern.
    Pattern(Regex),
    /// Numeric lower bound (inclusive).
    Min(f64),
    /// Numeric upper bound (inclusive).
    Max(f64),
    Custom(CustomCheck),
}

impl Rule {
    /// Compile a `Pattern` rule. Bad patterns are a configuration error, not
    /// a runtime panic.
    pub fn pattern(pattern: &str) -> Result<Self, ConfigError> {
        Regex::new(pattern)
            .map(Rule::Pattern)
            .map_err(|source| ConfigError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })
    }

    pub fn custom(check: impl Fn(&CellValue) -> Result<(), String> + Send + Sync + 'static) -> Self {
        Rule::Custom(Arc::new(check))
    }

    pub fn check(&self, value: &CellValue) -> Result<(), String> {
        // Empty is valid for everything except `Required` (and custom rules,
        // which see the raw value); compose with `Required` to forbid it.
        if value.is_null() && !matches!(self, Rule::Required | Rule::Custom(_)) {
            return Ok(());
        }
        match self {
            Rule::Required => {
                let empty = match value {
                    CellValue::Null => true,
                    CellValue::Text(s) => s.trim().is_empty(),
                    _ => false,
                };
                if empty {
                    Err("required".to_string())
                } else {
                    Ok(())
                }
            }
            Rule::MinLen(min) => {
                if value.display().chars().count() < *min {
                    Err(format!("must be at least {min} characters"))
                } else {
                    Ok(())
                }
            }
            Rule::MaxLen(max) => {
                if value.display().chars().count() > *max {
                    Err(format!("must be at most {max} characters"))
                } else {
                    Ok(())
                }
            }
            Rule::Pattern(re) => {
                if re.is_match(&value.display()) {
                    Ok(())
                } else {
                    Err("does not match the expected format".to_string())
                }
            }
            Rule::Min(min) => match value.as_f64() {
                Some(n) if n >= *min => Ok(()),
                Some(_) => Err(format!("must be at least {min}")),
                None => Err("must be a number".to_string()),
            },
            Rule::Max(max) => match value.as_f64() {
                Some(n) if n <= *max => Ok(()),
                Some(_) => Err(format!("must be at most {max}")),
                None => Err("must be a number".to_string()),
            },
            Rule::Custom(check) => check(value),
        }
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Required => f.write_str("Required"),
            Rule::MinLen(n) => write!(f, "MinLen({n})"),
            Rule::MaxLen(n) => write!(f, "MaxLen({n})"),
            Rule::Pattern(re) => write!(f, "Pattern({})", re.as_str()),
            Rule::Min(n) => write!(f, "Min({n})"),
            Rule::Max(n) => write!(f, "Max({n})"),
            Rule::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Run `rules` in order, returning the first failure.
pub fn check_all(rules: &[Rule], value: &CellValue) -> Result<(), String> {
    for rule in rules {
        rule.check(value)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_rejects_null_and_blank_text() {
        assert!(Rule::Required.check(&CellValue::Null).is_err());
        assert!(Rule::Required.check(&CellValue::Text("  ".into())).is_err());
        assert!(Rule::Required.check(&CellValue::Text("x".into())).is_ok());
        assert!(Rule::Required.check(&CellValue::Bool(false)).is_ok());
    }

    #[test]
    fn null_passes_non_required_rules() {
        assert!(Rule::Min(3.0).check(&CellValue::Null).is_ok());
        assert!(Rule::MinLen(2).check(&CellValue::Null).is_ok());
        assert!(Rule::pattern("^x$").unwrap().check(&CellValue::Null).is_ok());
    }

    #[test]
    fn numeric_bounds_are_inclusive() {
        assert!(Rule::Min(3.0).check(&CellValue::Int(3)).is_ok());
        assert!(Rule::Min(3.0).check(&CellValue::Int(2)).is_err());
        assert!(Rule::Max(3.0).check(&CellValue::Float(3.0)).is_ok());
        assert!(Rule::Max(3.0).check(&CellValue::Float(3.5)).is_err());
    }

    #[test]
    fn bad_pattern_is_a_config_error() {
        assert!(matches!(
            Rule::pattern("("),
            Err(ConfigError::InvalidPattern { .. })
        ));
        let re = Rule::pattern("^[a-z]+$").unwrap();
        assert!(re.check(&CellValue::Text("abc".into())).is_ok());
        assert!(re.check(&CellValue::Text("ABC".into())).is_err());
    }

    #[test]
    fn check_all_stops_at_first_failure() {
        let rules = vec![Rule::Required, Rule::MinLen(5)];
        assert_eq!(
            check_all(&rules, &CellValue::Text("abc".into())),
            Err("must be at least 5 characters".to_string())
        );
        assert!(check_all(&rules, &CellValue::Text("abcdef".into())).is_ok());
    }
}
