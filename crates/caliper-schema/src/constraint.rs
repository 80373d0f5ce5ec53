//! Built-in field constraints.
//!
//! A constraint is a single checkable rule applied to a coerced value. The
//! order of a field's constraint list is its evaluation order; the binder
//! stops at the first failure per field.

use caliper_core::ConstraintKind;
use regex::Regex;

/// A single built-in constraint.
///
/// Length constraints apply to text (character count) and sequences
/// (element count); bound constraints apply to numeric values and compare
/// in `f64` space. Custom validators are not constraints — they live in a
/// separate ordered list on the field and run after all built-ins pass.
///
/// # Example
///
/// ```rust
/// use caliper_schema::Constraint;
/// use caliper_core::ConstraintKind;
///
/// let c = Constraint::MinLength(3);
/// assert_eq!(c.kind(), ConstraintKind::MinLength);
///
/// let p = Constraint::pattern("^fixedquery$").unwrap();
/// assert_eq!(p.kind(), ConstraintKind::Pattern);
/// ```
#[derive(Debug, Clone)]
pub enum Constraint {
    /// Minimum length in characters (text) or elements (sequence).
    MinLength(usize),
    /// Maximum length in characters (text) or elements (sequence).
    MaxLength(usize),
    /// The text must match this regular expression.
    Pattern(Regex),
    /// Numeric value must be strictly greater than the bound.
    GreaterThan(f64),
    /// Numeric value must be greater than or equal to the bound.
    GreaterEqual(f64),
    /// Numeric value must be strictly less than the bound.
    LessThan(f64),
    /// Numeric value must be less than or equal to the bound.
    LessEqual(f64),
}

impl Constraint {
    /// Compiles a pattern constraint from a regular expression source.
    ///
    /// # Errors
    ///
    /// Returns the regex compilation error for an invalid pattern.
    pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self::Pattern(Regex::new(pattern)?))
    }

    /// The kind used for error classification when this constraint fails.
    #[must_use]
    pub fn kind(&self) -> ConstraintKind {
        match self {
            Self::MinLength(_) => ConstraintKind::MinLength,
            Self::MaxLength(_) => ConstraintKind::MaxLength,
            Self::Pattern(_) => ConstraintKind::Pattern,
            Self::GreaterThan(_) => ConstraintKind::GreaterThan,
            Self::GreaterEqual(_) => ConstraintKind::GreaterEqual,
            Self::LessThan(_) => ConstraintKind::LessThan,
            Self::LessEqual(_) => ConstraintKind::LessEqual,
        }
    }
}
