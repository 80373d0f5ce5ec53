//! Error taxonomy and aggregated error reports.
//!
//! Two families of failure exist and never mix:
//!
//! - **Request-time** failures ([`BindingError`], collected into an
//!   [`ErrorReport`]) are values flowing back through the pipeline. A caller
//!   receives either a fully bound request or a complete report, never a
//!   partial mix, and never sees a panic.
//! - **Configuration-time** failures ([`SchemaError`]) are fatal at startup:
//!   duplicate registrations, conflicting filter specs, a required field
//!   declaring a default.
//!
//! The report serializes as `{"detail": [{"loc": [...], "msg": ..., "type":
//! ...}]}`; mapping it to a transport status code is the caller's job, though
//! [`ErrorReport::status_hint`] offers the conventional 422.

use http::StatusCode;
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};
use std::fmt;
use thiserror::Error;

/// The channel a raw value originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    /// A path segment (e.g. `/items/{item_id}`).
    Path,
    /// A query string parameter.
    Query,
    /// An HTTP header.
    Header,
    /// A cookie.
    Cookie,
    /// The request body.
    Body,
}

impl Source {
    /// All channels, in pipeline processing order.
    pub const ALL: [Self; 5] = [
        Self::Path,
        Self::Query,
        Self::Header,
        Self::Cookie,
        Self::Body,
    ];

    /// Lowercase channel name, as used in error locations.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Path => "path",
            Self::Query => "query",
            Self::Header => "header",
            Self::Cookie => "cookie",
            Self::Body => "body",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Built-in constraint kinds, named after the check they perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    /// Minimum string/sequence length.
    MinLength,
    /// Maximum string/sequence length.
    MaxLength,
    /// Regular expression match.
    Pattern,
    /// Exclusive lower bound.
    GreaterThan,
    /// Inclusive lower bound.
    GreaterEqual,
    /// Exclusive upper bound.
    LessThan,
    /// Inclusive upper bound.
    LessEqual,
}

impl ConstraintKind {
    /// Wire taxonomy tag for a violation of this constraint.
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Self::MinLength => "string_too_short",
            Self::MaxLength => "string_too_long",
            Self::Pattern => "string_pattern_mismatch",
            Self::GreaterThan => "greater_than",
            Self::GreaterEqual => "greater_than_equal",
            Self::LessThan => "less_than",
            Self::LessEqual => "less_than_equal",
        }
    }
}

/// Classification of a single request-time failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// A required field had no raw value.
    MissingRequired,
    /// A raw value could not be coerced to the declared type.
    TypeCoercion {
        /// Taxonomy tag for the target type (e.g. `int_parsing`).
        tag: &'static str,
        /// The offending raw value.
        raw: String,
    },
    /// A coerced value failed a built-in constraint.
    ConstraintViolation(ConstraintKind),
    /// A raw key was not claimed by any declared field (forbid policy).
    ExtraField {
        /// The unclaimed raw key.
        key: String,
    },
    /// A custom validator rejected the value.
    CustomValidation {
        /// The validator's message.
        message: String,
    },
    /// No union candidate structurally matched the object.
    UnionNoVariantMatched,
}

impl ErrorKind {
    /// Wire taxonomy tag for this kind.
    #[must_use]
    pub fn tag(&self) -> &'static str {
        match self {
            Self::MissingRequired => "missing",
            Self::TypeCoercion { tag, .. } => tag,
            Self::ConstraintViolation(kind) => kind.tag(),
            Self::ExtraField { .. } => "extra_forbidden",
            Self::CustomValidation { .. } => "value_error",
            Self::UnionNoVariantMatched => "union_no_match",
        }
    }
}

/// One structured, per-field request-time failure.
///
/// # Example
///
/// ```rust
/// use caliper_core::{BindingError, ErrorKind, Source};
///
/// let err = BindingError::missing([Source::Query.as_str().into(), "q".into()]);
/// assert_eq!(err.kind(), &ErrorKind::MissingRequired);
/// assert_eq!(err.loc(), ["query", "q"]);
/// assert_eq!(
///     serde_json::to_value(&err).unwrap()["type"],
///     serde_json::json!("missing")
/// );
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct BindingError {
    loc: Vec<String>,
    kind: ErrorKind,
    msg: String,
}

impl BindingError {
    /// Creates an error with an explicit kind and message.
    #[must_use]
    pub fn new(loc: impl Into<Vec<String>>, kind: ErrorKind, msg: impl Into<String>) -> Self {
        Self {
            loc: loc.into(),
            kind,
            msg: msg.into(),
        }
    }

    /// A required field had no raw value.
    #[must_use]
    pub fn missing(loc: impl Into<Vec<String>>) -> Self {
        Self::new(loc, ErrorKind::MissingRequired, "Field required")
    }

    /// A raw value failed type coercion.
    #[must_use]
    pub fn coercion(
        loc: impl Into<Vec<String>>,
        tag: &'static str,
        raw: impl Into<String>,
        msg: impl Into<String>,
    ) -> Self {
        Self::new(loc, ErrorKind::TypeCoercion { tag, raw: raw.into() }, msg)
    }

    /// A coerced value violated a built-in constraint.
    #[must_use]
    pub fn constraint(
        loc: impl Into<Vec<String>>,
        kind: ConstraintKind,
        msg: impl Into<String>,
    ) -> Self {
        Self::new(loc, ErrorKind::ConstraintViolation(kind), msg)
    }

    /// A raw key was rejected by the forbid extra-field policy.
    #[must_use]
    pub fn extra_field(loc: impl Into<Vec<String>>, key: impl Into<String>) -> Self {
        let key = key.into();
        Self::new(
            loc,
            ErrorKind::ExtraField { key },
            "Extra inputs are not permitted",
        )
    }

    /// A custom validator rejected the value.
    #[must_use]
    pub fn custom(loc: impl Into<Vec<String>>, message: impl Into<String>) -> Self {
        let message = message.into();
        let msg = format!("Value error, {message}");
        Self::new(loc, ErrorKind::CustomValidation { message }, msg)
    }

    /// No union candidate matched the object.
    #[must_use]
    pub fn union_no_match(loc: impl Into<Vec<String>>) -> Self {
        Self::new(
            loc,
            ErrorKind::UnionNoVariantMatched,
            "Input does not match any union variant",
        )
    }

    /// The error location, channel first (e.g. `["query", "q"]`).
    #[must_use]
    pub fn loc(&self) -> &[String] {
        &self.loc
    }

    /// The error classification.
    #[must_use]
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// The human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.msg
    }

    /// Prefixes the location with outer path segments (nested models).
    #[must_use]
    pub fn prefixed(mut self, prefix: &[String]) -> Self {
        let mut loc = prefix.to_vec();
        loc.append(&mut self.loc);
        self.loc = loc;
        self
    }
}

impl fmt::Display for BindingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.loc.join("."), self.msg)
    }
}

impl std::error::Error for BindingError {}

impl Serialize for BindingError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("BindingError", 3)?;
        state.serialize_field("loc", &self.loc)?;
        state.serialize_field("msg", &self.msg)?;
        state.serialize_field("type", self.kind.tag())?;
        state.end()
    }
}

/// Aggregated request-time failures for one whole request.
///
/// The binder collects every per-field error before returning, so the report
/// is always complete. Serializes as `{"detail": [...]}`.
///
/// # Example
///
/// ```rust
/// use caliper_core::{BindingError, ErrorReport};
///
/// let mut report = ErrorReport::new();
/// report.push(BindingError::missing(vec!["query".into(), "q".into()]));
///
/// let json = serde_json::to_value(&report).unwrap();
/// assert_eq!(json["detail"][0]["loc"], serde_json::json!(["query", "q"]));
/// assert_eq!(report.status_hint(), http::StatusCode::UNPROCESSABLE_ENTITY);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorReport {
    errors: Vec<BindingError>,
}

impl ErrorReport {
    /// Creates an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one error.
    pub fn push(&mut self, error: BindingError) {
        self.errors.push(error);
    }

    /// Appends all errors from another report.
    pub fn merge(&mut self, other: Self) {
        self.errors.extend(other.errors);
    }

    /// Returns the collected errors in collection order.
    #[must_use]
    pub fn errors(&self) -> &[BindingError] {
        &self.errors
    }

    /// Number of collected errors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Returns `true` if no errors were collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Consumes the report, yielding the errors.
    #[must_use]
    pub fn into_errors(self) -> Vec<BindingError> {
        self.errors
    }

    /// `Ok(value)` if the report is empty, `Err(self)` otherwise.
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }

    /// Conventional transport status for a request validation report.
    ///
    /// Purely advisory; the transport layer owns the final mapping.
    #[must_use]
    pub fn status_hint(&self) -> StatusCode {
        StatusCode::UNPROCESSABLE_ENTITY
    }
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} binding error(s)", self.errors.len())?;
        if let Some(first) = self.errors.first() {
            write!(f, "; first: {first}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ErrorReport {}

impl Serialize for ErrorReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("detail", &self.errors)?;
        map.end()
    }
}

impl FromIterator<BindingError> for ErrorReport {
    fn from_iter<I: IntoIterator<Item = BindingError>>(iter: I) -> Self {
        Self {
            errors: iter.into_iter().collect(),
        }
    }
}

/// Configuration-time schema errors, fatal at startup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// A field name or alias was registered twice for one channel.
    // Not named `source`: thiserror would treat that field as the error
    // chain source and demand `Source: std::error::Error`.
    #[error("duplicate field '{name}' for {channel} channel")]
    DuplicateField {
        /// The colliding name or alias.
        name: String,
        /// The channel it was registered for.
        channel: Source,
    },

    /// A filter spec populated both include and exclude sets.
    #[error("filter spec cannot populate both include and exclude")]
    FilterSpecConflict,

    /// A required field declared a default value.
    #[error("required field '{name}' cannot declare a default")]
    RequiredWithDefault {
        /// The offending field.
        name: String,
    },

    /// A model field was declared for a different channel than its model.
    #[error("field '{name}' declared for {found} channel, model binds {expected}")]
    ChannelMismatch {
        /// The offending field.
        name: String,
        /// The model's channel.
        expected: Source,
        /// The field's channel.
        found: Source,
    },
}
