//! Constraint and validator evaluation.
//!
//! Runs after coercion: the value already has its target type. Built-in
//! constraints run in declaration order and stop at the first failure for
//! the field; custom validators run afterwards, also in order, each one
//! receiving the (possibly replaced) value from its predecessor.

use caliper_core::{BindingError, Value};
use caliper_schema::{Constraint, FieldSchema};

/// Evaluates a field's constraints and validators against a coerced value.
///
/// The none-marker short-circuits: an explicit `null` for an optional field
/// is not measured against length or bound constraints.
///
/// Constraints that do not apply to the value's type (a length check on an
/// integer, a bound on text) pass silently; the schema author picked them
/// for the declared type, and coercion already guaranteed that type.
///
/// # Errors
///
/// Returns the first failing constraint or validator as a [`BindingError`]
/// located at `loc`.
///
/// # Example
///
/// ```rust
/// use caliper_bind::validate;
/// use caliper_core::{Source, Value};
/// use caliper_schema::{Constraint, FieldSchema, FieldType};
///
/// let field = FieldSchema::new("q", Source::Query, FieldType::Text)
///     .constraint(Constraint::MinLength(3));
/// let loc = vec!["query".to_string(), "q".to_string()];
///
/// assert!(validate(&field, Value::Str("abc".into()), &loc).is_ok());
///
/// let err = validate(&field, Value::Str("ab".into()), &loc).unwrap_err();
/// assert_eq!(err.kind().tag(), "string_too_short");
/// ```
pub fn validate(field: &FieldSchema, value: Value, loc: &[String]) -> Result<Value, BindingError> {
    if value.is_null() {
        return Ok(value);
    }

    for constraint in field.constraints() {
        check_constraint(constraint, &value, loc)?;
    }

    let mut value = value;
    for validator in field.validators() {
        value = validator(value).map_err(|message| BindingError::custom(loc.to_vec(), message))?;
    }
    Ok(value)
}

fn check_constraint(
    constraint: &Constraint,
    value: &Value,
    loc: &[String],
) -> Result<(), BindingError> {
    match constraint {
        Constraint::MinLength(min) => match measured_len(value) {
            Some(len) if len < *min => Err(BindingError::constraint(
                loc.to_vec(),
                constraint.kind(),
                too_short_msg(value, *min),
            )),
            _ => Ok(()),
        },
        Constraint::MaxLength(max) => match measured_len(value) {
            Some(len) if len > *max => Err(BindingError::constraint(
                loc.to_vec(),
                constraint.kind(),
                too_long_msg(value, *max),
            )),
            _ => Ok(()),
        },
        Constraint::Pattern(regex) => match value.as_str() {
            Some(s) if !regex.is_match(s) => Err(BindingError::constraint(
                loc.to_vec(),
                constraint.kind(),
                format!("String should match pattern '{}'", regex.as_str()),
            )),
            _ => Ok(()),
        },
        Constraint::GreaterThan(bound) => check_bound(
            value,
            loc,
            constraint,
            |n| n > *bound,
            &format!("Input should be greater than {bound}"),
        ),
        Constraint::GreaterEqual(bound) => check_bound(
            value,
            loc,
            constraint,
            |n| n >= *bound,
            &format!("Input should be greater than or equal to {bound}"),
        ),
        Constraint::LessThan(bound) => check_bound(
            value,
            loc,
            constraint,
            |n| n < *bound,
            &format!("Input should be less than {bound}"),
        ),
        Constraint::LessEqual(bound) => check_bound(
            value,
            loc,
            constraint,
            |n| n <= *bound,
            &format!("Input should be less than or equal to {bound}"),
        ),
    }
}

fn check_bound(
    value: &Value,
    loc: &[String],
    constraint: &Constraint,
    ok: impl Fn(f64) -> bool,
    msg: &str,
) -> Result<(), BindingError> {
    match value.as_f64() {
        Some(n) if !ok(n) => Err(BindingError::constraint(
            loc.to_vec(),
            constraint.kind(),
            msg,
        )),
        _ => Ok(()),
    }
}

/// Length of a value for length constraints: characters for text, elements
/// for sequences, `None` for anything else.
fn measured_len(value: &Value) -> Option<usize> {
    match value {
        Value::Str(s) => Some(s.chars().count()),
        Value::Seq(items) => Some(items.len()),
        _ => None,
    }
}

fn too_short_msg(value: &Value, min: usize) -> String {
    if matches!(value, Value::Seq(_)) {
        format!("List should have at least {min} {}", plural(min, "item"))
    } else {
        format!(
            "String should have at least {min} {}",
            plural(min, "character")
        )
    }
}

fn too_long_msg(value: &Value, max: usize) -> String {
    if matches!(value, Value::Seq(_)) {
        format!("List should have at most {max} {}", plural(max, "item"))
    } else {
        format!(
            "String should have at most {max} {}",
            plural(max, "character")
        )
    }
}

fn plural(n: usize, noun: &str) -> String {
    if n == 1 {
        noun.to_string()
    } else {
        format!("{noun}s")
    }
}
