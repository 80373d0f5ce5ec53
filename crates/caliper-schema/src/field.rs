//! Field schema declarations.
//!
//! A [`FieldSchema`] declares everything the pipeline needs to know about one
//! parameter or body field: where its raw value comes from, the target type,
//! whether it is required, its default, alias, constraints and custom
//! validators. Schemas are built once at startup with the chained builder
//! methods and never mutated afterwards.

use crate::{Constraint, ModelSchema};
use caliper_core::{SchemaError, Source, Value};
use std::fmt;
use std::sync::Arc;

/// A custom validator: receives the current value, returns a replacement
/// (possibly the same value, possibly a normalized one) or a message.
///
/// Validators run after all built-in constraints pass, in declaration order.
pub type Validator = Arc<dyn Fn(Value) -> Result<Value, String> + Send + Sync>;

/// The target type a raw value is coerced into.
#[derive(Debug, Clone)]
pub enum FieldType {
    /// Signed 64-bit integer, parsed from a decimal numeral.
    Integer,
    /// 64-bit float, parsed from a decimal numeral.
    Float,
    /// Boolean: case-insensitive `true/1/on/yes` or `false/0/off/no`.
    Boolean,
    /// UTF-8 text, passed through unchanged.
    Text,
    /// Sequence of text values, one element per raw occurrence of the key.
    TextSeq,
    /// UUID in canonical textual form.
    Uuid,
    /// ISO-8601 calendar date.
    Date,
    /// ISO-8601 time of day.
    Time,
    /// ISO-8601 datetime (naive input is taken as UTC).
    DateTime,
    /// ISO-8601 duration (`PnDTnHnMnS`).
    Duration,
    /// Byte payload: raw bytes from a body channel, base64 from text channels.
    Bytes,
    /// High-precision decimal, parsed like a float but kept exact.
    Decimal,
    /// A nested model (structured body fields).
    Nested(Box<ModelSchema>),
}

impl FieldType {
    /// Short type name used in diagnostics and coercion tags.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::Text => "string",
            Self::TextSeq => "string sequence",
            Self::Uuid => "uuid",
            Self::Date => "date",
            Self::Time => "time",
            Self::DateTime => "datetime",
            Self::Duration => "duration",
            Self::Bytes => "bytes",
            Self::Decimal => "decimal",
            Self::Nested(_) => "model",
        }
    }
}

/// Declaration of one field: name, channel, type, requiredness, default,
/// alias, ordered constraints and ordered custom validators.
///
/// # Example
///
/// ```rust
/// use caliper_schema::{Constraint, FieldSchema, FieldType};
/// use caliper_core::Source;
///
/// let q = FieldSchema::new("q", Source::Query, FieldType::Text)
///     .default_value(caliper_core::Value::Null)
///     .constraint(Constraint::MinLength(3))
///     .constraint(Constraint::MaxLength(50));
///
/// assert_eq!(q.name(), "q");
/// assert!(!q.is_required());
/// assert_eq!(q.constraints().len(), 2);
/// ```
///
/// An alias, when present, is the only key used for raw lookup; the original
/// name is never also matched:
///
/// ```rust
/// use caliper_schema::{FieldSchema, FieldType};
/// use caliper_core::Source;
///
/// let q = FieldSchema::new("q", Source::Query, FieldType::Text)
///     .alias("coupon-code");
/// assert_eq!(q.lookup_key(), "coupon-code");
/// ```
#[derive(Clone)]
pub struct FieldSchema {
    name: String,
    source: Source,
    ty: FieldType,
    required: bool,
    default: Option<Value>,
    alias: Option<String>,
    constraints: Vec<Constraint>,
    validators: Vec<Validator>,
    repeated: bool,
    deprecated: bool,
    title: Option<String>,
    description: Option<String>,
}

impl FieldSchema {
    /// Declares a new optional field with no default.
    ///
    /// Mark it [`required`](Self::required) or give it a
    /// [`default_value`](Self::default_value); a field left with neither
    /// binds to [`Value::Null`] when absent.
    #[must_use]
    pub fn new(name: impl Into<String>, source: Source, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            source,
            ty,
            required: false,
            default: None,
            alias: None,
            constraints: Vec::new(),
            validators: Vec::new(),
            repeated: false,
            deprecated: false,
            title: None,
            description: None,
        }
    }

    /// Marks the field required. A required field must not declare a default.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Declares the default used when no raw value is present.
    #[must_use]
    pub fn default_value(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Declares an alias. The alias becomes the only raw lookup key.
    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Appends a built-in constraint. List order is evaluation order.
    #[must_use]
    pub fn constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Appends a custom validator, run after all built-in constraints pass.
    #[must_use]
    pub fn validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(Value) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.validators.push(Arc::new(validator));
        self
    }

    /// Declares that the field accepts multiple raw occurrences of its key.
    #[must_use]
    pub fn repeated(mut self) -> Self {
        self.repeated = true;
        self
    }

    /// Marks the field deprecated. Documentation metadata only.
    #[must_use]
    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }

    /// Attaches a title. Documentation metadata only.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Attaches a description. Documentation metadata only.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// The declared field name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The channel this field reads from.
    #[must_use]
    pub fn source(&self) -> Source {
        self.source
    }

    /// The coercion target type.
    #[must_use]
    pub fn ty(&self) -> &FieldType {
        &self.ty
    }

    /// Whether the field is required.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// The declared default, if any.
    #[must_use]
    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// The declared alias, if any.
    #[must_use]
    pub fn alias_name(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// The ordered built-in constraints.
    #[must_use]
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// The ordered custom validators.
    #[must_use]
    pub fn validators(&self) -> &[Validator] {
        &self.validators
    }

    /// Whether the field accepts multiple raw occurrences.
    #[must_use]
    pub fn is_repeated(&self) -> bool {
        self.repeated || matches!(self.ty, FieldType::TextSeq)
    }

    /// Whether the field is marked deprecated.
    #[must_use]
    pub fn is_deprecated(&self) -> bool {
        self.deprecated
    }

    /// Documentation title, if any.
    #[must_use]
    pub fn doc_title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Documentation description, if any.
    #[must_use]
    pub fn doc_description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// The single key used for raw lookup: the alias when present, the name
    /// otherwise.
    #[must_use]
    pub fn lookup_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    /// Checks construction invariants (required fields have no default).
    pub(crate) fn check_invariants(&self) -> Result<(), SchemaError> {
        if self.required && self.default.is_some() {
            return Err(SchemaError::RequiredWithDefault {
                name: self.name.clone(),
            });
        }
        Ok(())
    }
}

impl fmt::Debug for FieldSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSchema")
            .field("name", &self.name)
            .field("source", &self.source)
            .field("ty", &self.ty)
            .field("required", &self.required)
            .field("default", &self.default)
            .field("alias", &self.alias)
            .field("constraints", &self.constraints)
            .field("validators", &self.validators.len())
            .field("repeated", &self.repeated)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_optional() {
        let f = FieldSchema::new("q", Source::Query, FieldType::Text);
        assert!(!f.is_required());
        assert!(f.default().is_none());
        assert_eq!(f.lookup_key(), "q");
    }

    #[test]
    fn test_alias_is_only_lookup_key() {
        let f = FieldSchema::new("q", Source::Query, FieldType::Text).alias("coupon-code");
        assert_eq!(f.lookup_key(), "coupon-code");
        assert_eq!(f.name(), "q");
    }

    #[test]
    fn test_required_with_default_is_invalid() {
        let f = FieldSchema::new("q", Source::Query, FieldType::Text)
            .required()
            .default_value("x");
        assert_eq!(
            f.check_invariants(),
            Err(SchemaError::RequiredWithDefault {
                name: "q".to_string()
            })
        );
    }

    #[test]
    fn test_text_seq_is_repeated() {
        let f = FieldSchema::new("tags", Source::Query, FieldType::TextSeq);
        assert!(f.is_repeated());
        let f = FieldSchema::new("q", Source::Query, FieldType::Text);
        assert!(!f.is_repeated());
    }

    #[test]
    fn test_constraint_order_preserved() {
        let f = FieldSchema::new("q", Source::Query, FieldType::Text)
            .constraint(Constraint::MinLength(3))
            .constraint(Constraint::MaxLength(50));
        assert!(matches!(f.constraints()[0], Constraint::MinLength(3)));
        assert!(matches!(f.constraints()[1], Constraint::MaxLength(50)));
    }

    #[test]
    fn test_validator_chain_stored_in_order() {
        let f = FieldSchema::new("id", Source::Query, FieldType::Text)
            .validator(|v| Ok(v))
            .validator(|_| Err("nope".to_string()));
        assert_eq!(f.validators().len(), 2);
    }

    #[test]
    fn test_metadata_is_carried() {
        let f = FieldSchema::new("q", Source::Query, FieldType::Text)
            .title("Query Title")
            .description("Search string")
            .deprecated();
        assert_eq!(f.doc_title(), Some("Query Title"));
        assert_eq!(f.doc_description(), Some("Search string"));
        assert!(f.is_deprecated());
    }
}
