//! Built-in constraint types.
//!
//! | name          | parameter                       | violation                        |
//! |---------------|---------------------------------|----------------------------------|
//! | `pattern`     | regular expression (full match) | value does not match             |
//! | `enum`        | comma separated values          | value not in list (exact case)   |
//! | `anyCaseEnum` | comma separated values          | value not in list (any case)     |
//! | `minLength`   | integer                         | fewer characters than parameter  |
//! | `maxLength`   | integer                         | more characters than parameter   |
//! | `minValue`    | decimal                         | value below parameter            |
//! | `maxValue`    | decimal                         | value above parameter            |
//!
//! Length and value bounds report a blank or unparsable parameter as an error
//! even when the value itself is blank.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use bigdecimal::BigDecimal;
use parking_lot::RwLock;
use regex::Regex;

use crate::constraint::ConstraintType;
use crate::validation::{is_blank, ValidationErrors};

/// Returns one instance of every built-in constraint type.
#[must_use]
pub fn builtin_types() -> Vec<Arc<dyn ConstraintType>> {
    vec![
        Arc::new(PatternConstraint::new()),
        Arc::new(EnumConstraint),
        Arc::new(CaseInsensitiveEnumConstraint),
        Arc::new(MinLengthConstraint),
        Arc::new(MaxLengthConstraint),
        Arc::new(MinValueConstraint),
        Arc::new(MaxValueConstraint),
    ]
}

fn subject(is_request_context: bool, name: &str) -> String {
    if is_request_context {
        format!("ThreadContext key {name}")
    } else {
        name.to_string()
    }
}

/// Value must match a regular expression in full.
#[derive(Debug, Default)]
pub struct PatternConstraint {
    compiled: RwLock<HashMap<String, Result<Regex, String>>>,
}

impl PatternConstraint {
    /// Creates the constraint with an empty pattern cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn matches(&self, pattern: &str, value: &str) -> Result<bool, String> {
        if let Some(compiled) = self.compiled.read().get(pattern) {
            return compiled
                .as_ref()
                .map(|re| re.is_match(value))
                .map_err(Clone::clone);
        }
        let compiled =
            Regex::new(&format!("^(?:{pattern})$")).map_err(|e| e.to_string());
        let result = compiled
            .as_ref()
            .map(|re| re.is_match(value))
            .map_err(Clone::clone);
        self.compiled.write().insert(pattern.to_string(), compiled);
        result
    }
}

impl ConstraintType for PatternConstraint {
    fn name(&self) -> &str {
        "pattern"
    }

    fn validate(
        &self,
        is_request_context: bool,
        name: &str,
        value: &str,
        pattern: &str,
        errors: &mut ValidationErrors,
    ) {
        if is_blank(pattern) || is_blank(value) {
            return;
        }
        match self.matches(pattern, value) {
            Ok(true) => {}
            Ok(false) => errors.push(format!(
                "{} does not match pattern {pattern}",
                subject(is_request_context, name)
            )),
            Err(e) => errors.push(format!(
                "{} has an invalid pattern {pattern}: {e}",
                subject(is_request_context, name)
            )),
        }
    }
}

fn enum_values(enums: &str) -> impl Iterator<Item = &str> {
    enums.trim().split(',').map(str::trim)
}

/// Value must equal one of a comma separated list.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnumConstraint;

impl ConstraintType for EnumConstraint {
    fn name(&self) -> &str {
        "enum"
    }

    fn validate(
        &self,
        is_request_context: bool,
        name: &str,
        value: &str,
        enums: &str,
        errors: &mut ValidationErrors,
    ) {
        if is_blank(enums) || is_blank(value) {
            return;
        }
        if !enum_values(enums).any(|v| v == value) {
            errors.push(format!(
                "{} does not match one of the values: {enums}",
                subject(is_request_context, name)
            ));
        }
    }
}

/// Like [`EnumConstraint`] but ignores case.
#[derive(Debug, Default, Clone, Copy)]
pub struct CaseInsensitiveEnumConstraint;

impl ConstraintType for CaseInsensitiveEnumConstraint {
    fn name(&self) -> &str {
        "anyCaseEnum"
    }

    fn validate(
        &self,
        is_request_context: bool,
        name: &str,
        value: &str,
        enums: &str,
        errors: &mut ValidationErrors,
    ) {
        if is_blank(enums) || is_blank(value) {
            return;
        }
        let value = value.to_lowercase();
        if !enum_values(enums).any(|v| v.to_lowercase() == value) {
            errors.push(format!(
                "{} does not match one of the values: {enums}",
                subject(is_request_context, name)
            ));
        }
    }
}

/// Wording used by a bound constraint in its error messages.
struct BoundLabels {
    missing: &'static str,
    unparsable: &'static str,
}

/// Parses a bound parameter, recording the blank and unparsable cases.
fn parse_bound<T: FromStr>(
    is_request_context: bool,
    name: &str,
    parameter: &str,
    labels: &BoundLabels,
    errors: &mut ValidationErrors,
) -> Option<T>
where
    T::Err: std::fmt::Display,
{
    if is_blank(parameter) {
        errors.push(format!(
            "{} {}",
            subject(is_request_context, name),
            labels.missing
        ));
        return None;
    }
    match parameter.parse::<T>() {
        Ok(bound) => Some(bound),
        Err(e) => {
            errors.push(format!(
                "{} {}: {e}",
                subject(is_request_context, name),
                labels.unparsable
            ));
            None
        }
    }
}

const MIN_LENGTH: BoundLabels = BoundLabels {
    missing: "has no minimum length value defined",
    unparsable: "encountered an error trying to determine the minimum length value",
};

const MAX_LENGTH: BoundLabels = BoundLabels {
    missing: "has no maximum length value defined",
    unparsable: "encountered an error trying to determine the maximum length value",
};

const MIN_VALUE: BoundLabels = BoundLabels {
    missing: "has no minimum value defined",
    unparsable: "encountered an error trying to determine the minimum value",
};

const MAX_VALUE: BoundLabels = BoundLabels {
    missing: "has no maximum value defined",
    unparsable: "encountered an error trying to determine the maximum value",
};

/// Value must have at least the given number of UTF-16 code units.
#[derive(Debug, Default, Clone, Copy)]
pub struct MinLengthConstraint;

impl ConstraintType for MinLengthConstraint {
    fn name(&self) -> &str {
        "minLength"
    }

    fn validate(
        &self,
        is_request_context: bool,
        name: &str,
        value: &str,
        min_length: &str,
        errors: &mut ValidationErrors,
    ) {
        let Some(bound) =
            parse_bound::<i64>(is_request_context, name, min_length, &MIN_LENGTH, errors)
        else {
            return;
        };
        if is_blank(value) {
            return;
        }
        let length = i64::try_from(value.encode_utf16().count()).unwrap_or(i64::MAX);
        if length < bound {
            errors.push(format!(
                "{} does not contain {min_length} characters.",
                subject(is_request_context, name)
            ));
        }
    }
}

/// Value must have at most the given number of UTF-16 code units.
#[derive(Debug, Default, Clone, Copy)]
pub struct MaxLengthConstraint;

impl ConstraintType for MaxLengthConstraint {
    fn name(&self) -> &str {
        "maxLength"
    }

    fn validate(
        &self,
        is_request_context: bool,
        name: &str,
        value: &str,
        max_length: &str,
        errors: &mut ValidationErrors,
    ) {
        let Some(bound) =
            parse_bound::<i64>(is_request_context, name, max_length, &MAX_LENGTH, errors)
        else {
            return;
        };
        if is_blank(value) {
            return;
        }
        let length = i64::try_from(value.encode_utf16().count()).unwrap_or(i64::MAX);
        if length > bound {
            errors.push(format!(
                "{} exceeds {max_length} characters.",
                subject(is_request_context, name)
            ));
        }
    }
}

fn parse_value(
    is_request_context: bool,
    name: &str,
    value: &str,
    labels: &BoundLabels,
    errors: &mut ValidationErrors,
) -> Option<BigDecimal> {
    match BigDecimal::from_str(value) {
        Ok(v) => Some(v),
        Err(e) => {
            errors.push(format!(
                "{} {}: {e}",
                subject(is_request_context, name),
                labels.unparsable
            ));
            None
        }
    }
}

/// Decimal value must not be below the bound.
#[derive(Debug, Default, Clone, Copy)]
pub struct MinValueConstraint;

impl ConstraintType for MinValueConstraint {
    fn name(&self) -> &str {
        "minValue"
    }

    fn validate(
        &self,
        is_request_context: bool,
        name: &str,
        value: &str,
        min_value: &str,
        errors: &mut ValidationErrors,
    ) {
        let Some(bound) =
            parse_bound::<BigDecimal>(is_request_context, name, min_value, &MIN_VALUE, errors)
        else {
            return;
        };
        if is_blank(value) {
            return;
        }
        let Some(actual) = parse_value(is_request_context, name, value, &MIN_VALUE, errors) else {
            return;
        };
        if actual < bound {
            errors.push(format!(
                "{} is less than {min_value}",
                subject(is_request_context, name)
            ));
        }
    }
}

/// Decimal value must not be above the bound.
#[derive(Debug, Default, Clone, Copy)]
pub struct MaxValueConstraint;

impl ConstraintType for MaxValueConstraint {
    fn name(&self) -> &str {
        "maxValue"
    }

    fn validate(
        &self,
        is_request_context: bool,
        name: &str,
        value: &str,
        max_value: &str,
        errors: &mut ValidationErrors,
    ) {
        let Some(bound) =
            parse_bound::<BigDecimal>(is_request_context, name, max_value, &MAX_VALUE, errors)
        else {
            return;
        };
        if is_blank(value) {
            return;
        }
        let Some(actual) = parse_value(is_request_context, name, value, &MAX_VALUE, errors) else {
            return;
        };
        // Message wording is unconfirmed; the condition is value > bound.
        if actual > bound {
            errors.push(format!(
                "{} is less than {max_value}",
                subject(is_request_context, name)
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(c: &dyn ConstraintType, value: &str, parameter: &str) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        c.validate(false, "field", value, parameter, &mut errors);
        errors
    }

    #[test]
    fn test_pattern_full_match() {
        let c = PatternConstraint::new();
        assert!(check(&c, "12345", "[0-9]+").is_empty());
        assert_eq!(
            check(&c, "12a45", "[0-9]+").to_string(),
            "field does not match pattern [0-9]+"
        );
        // a partial match is not enough
        assert!(!check(&c, "x123", "[0-9]+").is_empty());
    }

    #[test]
    fn test_pattern_skips_blank_value_and_parameter() {
        let c = PatternConstraint::new();
        assert!(check(&c, "", "[0-9]+").is_empty());
        assert!(check(&c, "abc", " ").is_empty());
    }

    #[test]
    fn test_pattern_cache_reuses_compiled_regex() {
        let c = PatternConstraint::new();
        assert!(check(&c, "1", "[0-9]").is_empty());
        assert!(check(&c, "2", "[0-9]").is_empty());
        assert_eq!(c.compiled.read().len(), 1);
    }

    #[test]
    fn test_pattern_invalid_regex_is_reported() {
        let c = PatternConstraint::new();
        let errors = check(&c, "abc", "([a-z");
        assert_eq!(errors.len(), 1);
        assert!(errors.to_string().starts_with("field has an invalid pattern ([a-z:"));
    }

    #[test]
    fn test_request_context_prefix() {
        let c = PatternConstraint::new();
        let mut errors = ValidationErrors::new();
        c.validate(true, "ipAddress", "not-an-ip", "[0-9.]+", &mut errors);
        assert_eq!(
            errors.to_string(),
            "ThreadContext key ipAddress does not match pattern [0-9.]+"
        );
    }

    #[test]
    fn test_enum_is_case_sensitive_and_trims_tokens() {
        assert!(check(&EnumConstraint, "Success", " Success , Failure ").is_empty());
        assert_eq!(
            check(&EnumConstraint, "success", "Success, Failure").to_string(),
            "field does not match one of the values: Success, Failure"
        );
    }

    #[test]
    fn test_any_case_enum() {
        assert!(check(&CaseInsensitiveEnumConstraint, "SUCCESS", "Success,Failure").is_empty());
        assert!(!check(&CaseInsensitiveEnumConstraint, "pending", "Success,Failure").is_empty());
    }

    #[test]
    fn test_min_length() {
        assert!(check(&MinLengthConstraint, "abcd", "4").is_empty());
        assert_eq!(
            check(&MinLengthConstraint, "abc", "4").to_string(),
            "field does not contain 4 characters."
        );
    }

    #[test]
    fn test_max_length_counts_characters() {
        assert!(check(&MaxLengthConstraint, "héllo", "5").is_empty());
        assert_eq!(
            check(&MaxLengthConstraint, "abcdef", "5").to_string(),
            "field exceeds 5 characters."
        );
    }

    #[test]
    fn test_length_counts_utf16_units() {
        // each emoji is a surrogate pair
        assert_eq!(
            check(&MaxLengthConstraint, "😀😀", "3").to_string(),
            "field exceeds 3 characters."
        );
        assert!(check(&MinLengthConstraint, "😀😀", "4").is_empty());
    }

    #[test]
    fn test_length_bound_errors() {
        assert_eq!(
            check(&MinLengthConstraint, "abc", "").to_string(),
            "field has no minimum length value defined"
        );
        assert_eq!(
            check(&MaxLengthConstraint, "abc", " ").to_string(),
            "field has no maximum length value defined"
        );
        let errors = check(&MaxLengthConstraint, "abc", "five");
        assert!(errors
            .to_string()
            .starts_with("field encountered an error trying to determine the maximum length value: "));
    }

    #[test]
    fn test_bound_errors_even_with_blank_value() {
        assert_eq!(check(&MinLengthConstraint, "", "").len(), 1);
        assert_eq!(check(&MaxValueConstraint, "", "ten").len(), 1);
        assert!(check(&MaxValueConstraint, "", "10").is_empty());
    }

    #[test]
    fn test_min_value() {
        assert!(check(&MinValueConstraint, "1", "1").is_empty());
        assert!(check(&MinValueConstraint, "111.55", "1").is_empty());
        assert_eq!(
            check(&MinValueConstraint, "0.99", "1").to_string(),
            "field is less than 1"
        );
    }

    #[test]
    fn test_max_value_keeps_message_wording() {
        assert!(check(&MaxValueConstraint, "100.00", "100").is_empty());
        assert_eq!(
            check(&MaxValueConstraint, "100.01", "100").to_string(),
            "field is less than 100"
        );
    }

    #[test]
    fn test_value_bound_arbitrary_precision() {
        let big = "123456789012345678901234567890.000000000000000000001";
        assert!(!check(&MaxValueConstraint, big, "123456789012345678901234567890").is_empty());
        assert!(check(&MinValueConstraint, big, "123456789012345678901234567890").is_empty());
    }

    #[test]
    fn test_unparsable_value() {
        let errors = check(&MinValueConstraint, "lots", "1");
        assert!(errors
            .to_string()
            .starts_with("field encountered an error trying to determine the minimum value: "));
    }
}
