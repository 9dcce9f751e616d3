//! Property-based tests for constraint evaluators and key normalization.

use proptest::prelude::*;

use crate::plugins::{
    EnumConstraint, MaxLengthConstraint, MaxValueConstraint, MinLengthConstraint,
    MinValueConstraint,
};
use crate::{normalize_key, ConstraintRegistry, ConstraintType, ValidationErrors};

fn run(c: &dyn ConstraintType, value: &str, parameter: &str) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    c.validate(false, "field", value, parameter, &mut errors);
    errors
}

/// Strategy for parameters that are blank or not numbers at all.
fn bad_bound_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        "[ \t]{1,4}",
        "[a-z]{1,8}",
        "[0-9]{1,3}[a-z]{1,3}",
    ]
}

/// Strategy for non-blank values, numeric or not.
fn value_strategy() -> impl Strategy<Value = String> {
    prop_oneof!["[0-9]{1,6}", "[a-zA-Z0-9 ]{1,12}"]
}

fn bound_types() -> Vec<Box<dyn ConstraintType>> {
    vec![
        Box::new(MinLengthConstraint),
        Box::new(MaxLengthConstraint),
        Box::new(MinValueConstraint),
        Box::new(MaxValueConstraint),
    ]
}

proptest! {
    #[test]
    fn bad_bound_always_fails(value in value_strategy(), bound in bad_bound_strategy()) {
        for c in bound_types() {
            let errors = run(c.as_ref(), &value, &bound);
            prop_assert_eq!(errors.len(), 1, "{} passed with bound {:?}", c.name(), bound);
        }
    }

    #[test]
    fn blank_value_passes_with_valid_bound(value in "[ ]{0,3}", bound in 0u32..100) {
        for c in bound_types() {
            prop_assert!(run(c.as_ref(), &value, &bound.to_string()).is_empty());
        }
    }

    #[test]
    fn length_bounds_agree_with_utf16_length(value in "[a-zé😀]{1,20}", bound in 0usize..45) {
        let len = value.encode_utf16().count();
        let bound_str = bound.to_string();
        prop_assert_eq!(run(&MinLengthConstraint, &value, &bound_str).is_empty(), len >= bound);
        prop_assert_eq!(run(&MaxLengthConstraint, &value, &bound_str).is_empty(), len <= bound);
    }

    #[test]
    fn value_bounds_agree_with_integer_order(value in -10_000i64..10_000, bound in -10_000i64..10_000) {
        let (v, b) = (value.to_string(), bound.to_string());
        prop_assert_eq!(run(&MinValueConstraint, &v, &b).is_empty(), value >= bound);
        prop_assert_eq!(run(&MaxValueConstraint, &v, &b).is_empty(), value <= bound);
    }

    #[test]
    fn enum_accepts_every_listed_value(values in prop::collection::vec("[A-Za-z]{1,8}", 1..6), pick in any::<prop::sample::Index>()) {
        let list = values.join(" , ");
        let chosen = pick.get(&values);
        prop_assert!(run(&EnumConstraint, chosen, &list).is_empty());
    }

    #[test]
    fn every_failing_constraint_adds_one_line(value in "[a-z]{10,15}") {
        let registry = ConstraintRegistry::builtin();
        let mut errors = ValidationErrors::new();
        registry.evaluate(false, "maxLength", "field", &value, "5", &mut errors);
        registry.evaluate(false, "pattern", "field", &value, "[0-9]+", &mut errors);
        registry.evaluate(false, "enum", "field", &value, "A,B", &mut errors);
        prop_assert_eq!(errors.len(), 3);
        prop_assert_eq!(errors.to_string().lines().count(), 3);
    }

    #[test]
    fn normalized_keys_never_contain_separators(name in "[a-zA-Z./_]{0,20}") {
        let key = normalize_key(&name);
        prop_assert!(!key.contains('.') && !key.contains('/'));
        prop_assert_eq!(normalize_key(&key), key.clone());
    }
}
