//! Model schemas: grouping fields of one channel into one structured object.

use crate::FieldSchema;
use caliper_core::{SchemaError, Source};
use std::collections::HashSet;

/// Policy for raw keys not claimed by any declared field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtraPolicy {
    /// Unclaimed keys are silently dropped.
    #[default]
    Ignore,
    /// Each unclaimed key yields one `extra_forbidden` error.
    Forbid,
}

/// An ordered group of fields bound from a single channel.
///
/// Construction validates that every field declares the model's channel,
/// that no lookup key (name or alias) appears twice, and that no required
/// field carries a default. All checks are configuration-time fatal.
///
/// # Example
///
/// ```rust
/// use caliper_schema::{ExtraPolicy, FieldSchema, FieldType, ModelSchema};
/// use caliper_core::Source;
///
/// let filters = ModelSchema::new(
///     Source::Query,
///     vec![
///         FieldSchema::new("limit", Source::Query, FieldType::Integer).default_value(10i64),
///         FieldSchema::new("offset", Source::Query, FieldType::Integer).default_value(0i64),
///     ],
/// )
/// .unwrap()
/// .forbid_extra();
///
/// assert_eq!(filters.fields().len(), 2);
/// assert_eq!(filters.extra(), ExtraPolicy::Forbid);
/// ```
///
/// # Composition
///
/// Derived models are built by list concatenation, never by inheritance:
///
/// ```rust
/// use caliper_schema::{FieldSchema, FieldType, ModelSchema};
/// use caliper_core::Source;
///
/// let base = ModelSchema::new(
///     Source::Body,
///     vec![FieldSchema::new("username", Source::Body, FieldType::Text).required()],
/// )
/// .unwrap();
///
/// let user_in = base
///     .extend(vec![
///         FieldSchema::new("password", Source::Body, FieldType::Text).required(),
///     ])
///     .unwrap();
///
/// assert_eq!(user_in.fields().len(), 2);
/// assert_eq!(base.fields().len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct ModelSchema {
    source: Source,
    fields: Vec<FieldSchema>,
    extra: ExtraPolicy,
    normalize_names: bool,
}

impl ModelSchema {
    /// Builds a model schema over fields of one channel.
    ///
    /// # Errors
    ///
    /// - [`SchemaError::ChannelMismatch`] if a field declares another channel.
    /// - [`SchemaError::DuplicateField`] if a lookup key appears twice.
    /// - [`SchemaError::RequiredWithDefault`] if a required field has a default.
    pub fn new(source: Source, fields: Vec<FieldSchema>) -> Result<Self, SchemaError> {
        let mut claimed: HashSet<&str> = HashSet::new();
        for field in &fields {
            if field.source() != source {
                return Err(SchemaError::ChannelMismatch {
                    name: field.name().to_string(),
                    expected: source,
                    found: field.source(),
                });
            }
            field.check_invariants()?;
            for key in [Some(field.name()), field.alias_name()].into_iter().flatten() {
                if !claimed.insert(key) {
                    return Err(SchemaError::DuplicateField {
                        name: key.to_string(),
                        channel: source,
                    });
                }
            }
        }
        Ok(Self::from_parts(source, fields, ExtraPolicy::Ignore, true))
    }

    /// Assembles a model whose parts are already validated.
    pub(crate) fn from_parts(
        source: Source,
        fields: Vec<FieldSchema>,
        extra: ExtraPolicy,
        normalize_names: bool,
    ) -> Self {
        Self {
            source,
            fields,
            extra,
            normalize_names,
        }
    }

    /// Sets the extra-field policy.
    #[must_use]
    pub fn extra_policy(mut self, extra: ExtraPolicy) -> Self {
        self.extra = extra;
        self
    }

    /// Shorthand for `extra_policy(ExtraPolicy::Forbid)`.
    #[must_use]
    pub fn forbid_extra(self) -> Self {
        self.extra_policy(ExtraPolicy::Forbid)
    }

    /// Enables or disables channel name normalization (header channel:
    /// underscores become dashes, matching is case-insensitive). On by
    /// default.
    #[must_use]
    pub fn normalize_names(mut self, normalize: bool) -> Self {
        self.normalize_names = normalize;
        self
    }

    /// Derives a new model by appending extension fields to this model's
    /// field list. The receiver is unchanged; the extension re-runs all
    /// construction checks.
    pub fn extend(&self, extension: Vec<FieldSchema>) -> Result<Self, SchemaError> {
        let mut fields = self.fields.clone();
        fields.extend(extension);
        let derived = Self::new(self.source, fields)?;
        Ok(Self {
            extra: self.extra,
            normalize_names: self.normalize_names,
            ..derived
        })
    }

    /// The channel every field of this model binds from.
    #[must_use]
    pub fn source(&self) -> Source {
        self.source
    }

    /// The fields, in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[FieldSchema] {
        &self.fields
    }

    /// Looks up a field by declared name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name() == name)
    }

    /// The extra-field policy.
    #[must_use]
    pub fn extra(&self) -> ExtraPolicy {
        self.extra
    }

    /// Whether channel name normalization is enabled.
    #[must_use]
    pub fn normalizes_names(&self) -> bool {
        self.normalize_names
    }
}
