//! Bound models: the binder's output.

use caliper_core::Value;
use caliper_schema::ModelSchema;
use indexmap::IndexMap;
use std::collections::HashSet;

/// The typed result of binding one model: every declared field mapped to a
/// [`Value`], in declaration order, plus the record of which fields were
/// actually present on the wire.
///
/// A field absent from the request carries its declared default (or the
/// none-marker) and is *not* in the assigned set; response projection uses
/// that distinction for `exclude_unset`.
///
/// # Example
///
/// ```rust
/// use caliper_bind::BoundModel;
/// use caliper_core::{Source, Value};
/// use caliper_schema::{FieldSchema, FieldType, ModelSchema};
///
/// let schema = ModelSchema::new(
///     Source::Query,
///     vec![
///         FieldSchema::new("skip", Source::Query, FieldType::Integer).default_value(0i64),
///         FieldSchema::new("limit", Source::Query, FieldType::Integer).default_value(10i64),
///     ],
/// )
/// .unwrap();
///
/// let mut bound = BoundModel::with_defaults(&schema);
/// bound.set("skip", Value::Int(20));
///
/// assert_eq!(bound.get("skip"), Some(&Value::Int(20)));
/// assert_eq!(bound.get("limit"), Some(&Value::Int(10)));
/// assert!(bound.is_assigned("skip"));
/// assert!(!bound.is_assigned("limit"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundModel {
    values: IndexMap<String, Value>,
    assigned: HashSet<String>,
}

/// A fully bound request: every channel's fields merged into one model.
pub type BoundRequest = BoundModel;

impl BoundModel {
    /// Seeds a bound model from a schema: every field gets its declared
    /// default or the none-marker, and nothing is marked assigned.
    #[must_use]
    pub fn with_defaults(schema: &ModelSchema) -> Self {
        let values = schema
            .fields()
            .iter()
            .map(|f| {
                let v = f.default().cloned().unwrap_or(Value::Null);
                (f.name().to_string(), v)
            })
            .collect();
        Self {
            values,
            assigned: HashSet::new(),
        }
    }

    /// Stores a value under a declared field name and marks it assigned.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        self.assigned.insert(name.clone());
        self.values.insert(name, value);
    }

    /// Returns a field's value by declared name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Whether the field was present on the wire (not defaulted).
    #[must_use]
    pub fn is_assigned(&self, name: &str) -> bool {
        self.assigned.contains(name)
    }

    /// All values in field declaration order.
    #[must_use]
    pub fn values(&self) -> &IndexMap<String, Value> {
        &self.values
    }

    /// The set of wire-assigned field names.
    #[must_use]
    pub fn assigned(&self) -> &HashSet<String> {
        &self.assigned
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the model has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Merges another bound model's fields and assignment marks into this
    /// one. Later channels win on (registry-prevented) name collisions.
    pub fn merge(&mut self, other: Self) {
        self.values.extend(other.values);
        self.assigned.extend(other.assigned);
    }

    /// Renders the whole model as a JSON object in declaration order.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.values
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use caliper_core::Source;
    use caliper_schema::{FieldSchema, FieldType};

    fn schema() -> ModelSchema {
        ModelSchema::new(
            Source::Query,
            vec![
                FieldSchema::new("q", Source::Query, FieldType::Text),
                FieldSchema::new("skip", Source::Query, FieldType::Integer).default_value(0i64),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_defaults_seed_values_but_not_assignment() {
        let bound = BoundModel::with_defaults(&schema());
        assert_eq!(bound.get("q"), Some(&Value::Null));
        assert_eq!(bound.get("skip"), Some(&Value::Int(0)));
        assert!(!bound.is_assigned("q"));
        assert!(!bound.is_assigned("skip"));
    }

    #[test]
    fn test_set_marks_assigned() {
        let mut bound = BoundModel::with_defaults(&schema());
        bound.set("q", Value::Str("test".into()));
        assert!(bound.is_assigned("q"));
        assert!(!bound.is_assigned("skip"));
    }

    #[test]
    fn test_declaration_order_preserved() {
        let mut bound = BoundModel::with_defaults(&schema());
        bound.set("skip", Value::Int(5));
        bound.set("q", Value::Str("x".into()));
        let keys: Vec<_> = bound.values().keys().cloned().collect();
        assert_eq!(keys, ["q", "skip"]);
    }

    #[test]
    fn test_merge_keeps_assignment_marks() {
        let mut left = BoundModel::with_defaults(&schema());
        left.set("q", Value::Str("x".into()));

        let mut right = BoundModel::default();
        right.set("item_id", Value::Int(42));

        left.merge(right);
        assert!(left.is_assigned("q"));
        assert!(left.is_assigned("item_id"));
        assert_eq!(left.get("item_id"), Some(&Value::Int(42)));
    }

    #[test]
    fn test_to_json() {
        let mut bound = BoundModel::with_defaults(&schema());
        bound.set("q", Value::Str("test".into()));
        assert_eq!(
            bound.to_json(),
            serde_json::json!({"q": "test", "skip": 0})
        );
    }
}
