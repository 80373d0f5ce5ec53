//! Write-once schema registry.
//!
//! The registry is the startup-time catalog of every declared field. It is
//! built single-threaded through a consuming [`RegistryBuilder`] and frozen
//! into an immutable [`SchemaRegistry`]; the type system guarantees no
//! writer exists once readers do, so concurrent request processing needs no
//! synchronization.

use crate::{ExtraPolicy, FieldSchema, ModelSchema};
use caliper_core::{SchemaError, Source};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Mutable registration phase of the schema registry.
///
/// # Example
///
/// ```rust
/// use caliper_schema::{FieldSchema, FieldType, RegistryBuilder};
/// use caliper_core::Source;
///
/// let mut builder = RegistryBuilder::new();
/// builder
///     .register(FieldSchema::new("item_id", Source::Path, FieldType::Integer).required())
///     .unwrap();
/// builder
///     .register(FieldSchema::new("q", Source::Query, FieldType::Text))
///     .unwrap();
///
/// let registry = builder.freeze();
/// assert_eq!(registry.resolve(Source::Query).fields().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    fields: Vec<FieldSchema>,
    claimed: HashSet<(Source, String)>,
}

impl RegistryBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one field declaration.
    ///
    /// Both the field's name and its alias (when present) claim the
    /// `(key, source)` slot; a second claim fails.
    ///
    /// # Errors
    ///
    /// - [`SchemaError::DuplicateField`] if the name or alias is already
    ///   registered for the same channel.
    /// - [`SchemaError::RequiredWithDefault`] if the field is required and
    ///   declares a default.
    pub fn register(&mut self, field: FieldSchema) -> Result<(), SchemaError> {
        field.check_invariants()?;
        let keys: Vec<String> = std::iter::once(field.name())
            .chain(field.alias_name())
            .map(str::to_string)
            .collect();
        for key in &keys {
            if self.claimed.contains(&(field.source(), key.clone())) {
                return Err(SchemaError::DuplicateField {
                    name: key.clone(),
                    channel: field.source(),
                });
            }
        }
        for key in keys {
            self.claimed.insert((field.source(), key));
        }
        self.fields.push(field);
        Ok(())
    }

    /// Ends the registration phase, producing the read-only registry.
    #[must_use]
    pub fn freeze(self) -> SchemaRegistry {
        let mut grouped: HashMap<Source, Vec<FieldSchema>> = HashMap::new();
        for field in self.fields {
            grouped.entry(field.source()).or_default().push(field);
        }

        let mut models = HashMap::new();
        for source in Source::ALL {
            let fields = grouped.remove(&source).unwrap_or_default();
            // Duplicates and invariants were checked at registration.
            models.insert(
                source,
                ModelSchema::from_parts(source, fields, ExtraPolicy::Ignore, true),
            );
        }

        let registry = SchemaRegistry { models };
        debug!(
            path = registry.resolve(Source::Path).fields().len(),
            query = registry.resolve(Source::Query).fields().len(),
            header = registry.resolve(Source::Header).fields().len(),
            cookie = registry.resolve(Source::Cookie).fields().len(),
            body = registry.resolve(Source::Body).fields().len(),
            "schema registry frozen"
        );
        registry
    }
}

/// Immutable catalog of field declarations, grouped by channel.
///
/// Built once at startup via [`RegistryBuilder::freeze`]; read by every
/// request thereafter.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    models: HashMap<Source, ModelSchema>,
}

impl SchemaRegistry {
    /// Returns the model for a channel, with fields in registration order.
    ///
    /// A channel with no registered fields resolves to an empty model.
    #[must_use]
    pub fn resolve(&self, source: Source) -> &ModelSchema {
        // Every channel is populated at freeze time.
        &self.models[&source]
    }

    /// Total number of registered fields across all channels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.models.values().map(|m| m.fields().len()).sum()
    }

    /// Returns `true` if no fields were registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FieldType;

    #[test]
    fn test_register_and_resolve() {
        let mut builder = RegistryBuilder::new();
        builder
            .register(FieldSchema::new("item_id", Source::Path, FieldType::Integer).required())
            .unwrap();
        builder
            .register(FieldSchema::new("q", Source::Query, FieldType::Text))
            .unwrap();
        builder
            .register(FieldSchema::new("skip", Source::Query, FieldType::Integer).default_value(0i64))
            .unwrap();

        let registry = builder.freeze();
        assert_eq!(registry.len(), 3);

        let query = registry.resolve(Source::Query);
        assert_eq!(query.source(), Source::Query);
        let names: Vec<_> = query.fields().iter().map(FieldSchema::name).collect();
        assert_eq!(names, ["q", "skip"]);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut builder = RegistryBuilder::new();
        builder
            .register(FieldSchema::new("q", Source::Query, FieldType::Text))
            .unwrap();
        let err = builder
            .register(FieldSchema::new("q", Source::Query, FieldType::Integer))
            .unwrap_err();
        assert_eq!(
            err,
            SchemaError::DuplicateField {
                name: "q".to_string(),
                channel: Source::Query,
            }
        );
    }

    #[test]
    fn test_same_name_different_channel_allowed() {
        let mut builder = RegistryBuilder::new();
        builder
            .register(FieldSchema::new("id", Source::Path, FieldType::Integer))
            .unwrap();
        builder
            .register(FieldSchema::new("id", Source::Query, FieldType::Integer))
            .unwrap();
        assert_eq!(builder.freeze().len(), 2);
    }

    #[test]
    fn test_alias_claims_slot() {
        let mut builder = RegistryBuilder::new();
        builder
            .register(FieldSchema::new("q", Source::Query, FieldType::Text).alias("coupon-code"))
            .unwrap();
        let err = builder
            .register(FieldSchema::new("coupon-code", Source::Query, FieldType::Text))
            .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateField { .. }));
    }

    #[test]
    fn test_required_with_default_rejected_at_registration() {
        let mut builder = RegistryBuilder::new();
        let err = builder
            .register(
                FieldSchema::new("q", Source::Query, FieldType::Text)
                    .required()
                    .default_value("x"),
            )
            .unwrap_err();
        assert!(matches!(err, SchemaError::RequiredWithDefault { .. }));
    }

    #[test]
    fn test_empty_channel_resolves_to_empty_model() {
        let registry = RegistryBuilder::new().freeze();
        assert!(registry.is_empty());
        assert!(registry.resolve(Source::Cookie).fields().is_empty());
    }
}
