//! Declarative validation of operation configs.
//!
//! A config describes each of its fields as a [`FieldRule`]: the field name,
//! its current value, the [`Check`]s it has to pass and the [`ErrorKind`]
//! reported when one of them fails. [`Validate::validate`] interprets these
//! rules and reports every offending field at once, after which the
//! config specific post-checks run.

use crate::error::{ErrorKind, ValidationError, Violation};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Value of a config field, as seen by the validator.
pub enum FieldValue<'a> {
    Str(&'a str),
    Int(u64),
    Bool(bool),
}

impl<'a> From<&'a str> for FieldValue<'a> {
    fn from(value: &'a str) -> Self {
        Self::Str(value)
    }
}

impl<'a> From<&'a String> for FieldValue<'a> {
    fn from(value: &'a String) -> Self {
        Self::Str(value.as_str())
    }
}

impl From<usize> for FieldValue<'_> {
    fn from(value: usize) -> Self {
        Self::Int(value as u64)
    }
}

impl From<bool> for FieldValue<'_> {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// A single constraint on a field.
pub enum Check {
    /// Non empty string, non zero number or `true`.
    Required,
    /// Member of one of the given identifier sets.
    OneOf(&'static [&'static [&'static str]]),
    /// Same as [`Check::OneOf`], but an empty string is accepted.
    OptionalOneOf(&'static [&'static [&'static str]]),
    /// Number equal to or larger than the bound.
    AtLeast(u64),
}

impl Check {
    fn passes(self, value: FieldValue<'_>) -> bool {
        match (self, value) {
            (Self::Required, FieldValue::Str(s)) => !s.is_empty(),
            (Self::Required, FieldValue::Int(n)) => n != 0,
            (Self::Required, FieldValue::Bool(b)) => b,
            (Self::OneOf(sets), FieldValue::Str(s)) => contains(sets, s),
            (Self::OptionalOneOf(sets), FieldValue::Str(s)) => s.is_empty() || contains(sets, s),
            (Self::AtLeast(bound), FieldValue::Int(n)) => n >= bound,
            // a check which does not apply to the value type can never pass
            _ => false,
        }
    }
}

fn contains(sets: &[&[&str]], value: &str) -> bool {
    sets.iter().any(|set| set.contains(&value))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Validation rule of a single config field.
///
/// A field without checks is validated by post-checks, if at all.
pub struct FieldRule<'a> {
    pub name: &'static str,
    pub value: FieldValue<'a>,
    pub checks: &'static [Check],
    pub error: ErrorKind,
}

impl<'a> FieldRule<'a> {
    /// Create a new rule for the field `name`.
    pub fn new(
        name: &'static str,
        value: impl Into<FieldValue<'a>>,
        checks: &'static [Check],
        error: ErrorKind,
    ) -> Self {
        Self {
            name,
            value: value.into(),
            checks,
            error,
        }
    }

    /// The violation of this rule, if any. At most one is reported per field.
    pub fn check(&self) -> Option<Violation> {
        self.checks
            .iter()
            .any(|check| !check.passes(self.value))
            .then_some(Violation {
                field: self.name,
                kind: self.error,
            })
    }
}

/// Implemented by every operation config.
pub trait Validate {
    /// The structural rules of this config, in field order.
    fn rules(&self) -> Vec<FieldRule<'_>>;

    /// Checks which span multiple fields or need parsed values.
    ///
    /// Only run once all [`Validate::rules`] pass.
    fn post_validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }

    /// Validate the config, reporting every violated rule.
    fn validate(&self) -> Result<(), ValidationError> {
        let violations: Vec<_> = self.rules().iter().filter_map(FieldRule::check).collect();
        match ValidationError::from_violations(violations) {
            Some(err) => {
                tracing::debug!(%err, "config failed validation");
                Err(err)
            }
            None => self.post_validate(),
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio_test::{assert_err, assert_ok};

    use super::*;

    const COLORS: &[&str] = &["red", "green"];
    const SHAPES: &[&str] = &["circle"];

    struct Drawing {
        color: String,
        shape: String,
        size: usize,
    }

    impl Validate for Drawing {
        fn rules(&self) -> Vec<FieldRule<'_>> {
            vec![
                FieldRule::new(
                    "color",
                    &self.color,
                    &[Check::Required, Check::OneOf(&[COLORS])],
                    ErrorKind::InvalidKeyType,
                ),
                FieldRule::new(
                    "shape",
                    &self.shape,
                    &[Check::OptionalOneOf(&[COLORS, SHAPES])],
                    ErrorKind::InvalidCurve,
                ),
                FieldRule::new(
                    "size",
                    self.size,
                    &[Check::AtLeast(10)],
                    ErrorKind::InvalidKeySize,
                ),
            ]
        }

        fn post_validate(&self) -> Result<(), ValidationError> {
            if self.size % 10 == 0 {
                Ok(())
            } else {
                Err(ValidationError::single("size", ErrorKind::InvalidKeySize))
            }
        }
    }

    fn drawing(color: &str, shape: &str, size: usize) -> Drawing {
        Drawing {
            color: color.to_owned(),
            shape: shape.to_owned(),
            size,
        }
    }

    #[test]
    fn valid_config_passes() {
        assert_ok!(drawing("red", "", 10).validate());
        assert_ok!(drawing("green", "circle", 20).validate());
        assert_ok!(drawing("green", "red", 20).validate());
    }

    #[test]
    fn every_violation_is_reported() {
        let err = assert_err!(drawing("", "square", 5).validate());
        let kinds: Vec<_> = err.kinds().collect();
        assert_eq!(
            kinds,
            vec![
                ErrorKind::InvalidKeyType,
                ErrorKind::InvalidCurve,
                ErrorKind::InvalidKeySize
            ]
        );
        assert_eq!(err.violations()[0].field, "color");
    }

    #[test]
    fn matching_is_case_sensitive() {
        let err = assert_err!(drawing("RED", "", 10).validate());
        assert_eq!(err.kinds().collect::<Vec<_>>(), vec![ErrorKind::InvalidKeyType]);
    }

    #[test]
    fn post_checks_only_run_after_rules_pass() {
        let err = assert_err!(drawing("red", "", 15).validate());
        assert_eq!(err.to_string(), format!("size: {}", ErrorKind::InvalidKeySize));

        let err = assert_err!(drawing("blue", "", 15).validate());
        assert_eq!(err.kinds().collect::<Vec<_>>(), vec![ErrorKind::InvalidKeyType]);
    }

    #[test]
    fn required_applies_to_every_value_type() {
        assert!(!Check::Required.passes(FieldValue::Str("")));
        assert!(!Check::Required.passes(FieldValue::Int(0)));
        assert!(!Check::Required.passes(FieldValue::Bool(false)));
        assert!(Check::Required.passes(FieldValue::Bool(true)));
        assert!(!Check::AtLeast(1).passes(FieldValue::Str("1")));
    }
}
