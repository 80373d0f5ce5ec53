//! Response projection.
//!
//! Projection turns a bound model back into an ordered field map, applying
//! a [`FilterSpec`] in a fixed rule order: include/exclude sets first, then
//! unset dropping, then default dropping, then none dropping. Output order
//! is always schema declaration order, regardless of set iteration order.

use crate::FilterSpec;
use caliper_bind::BoundModel;
use caliper_core::Value;
use caliper_schema::ModelSchema;
use indexmap::IndexMap;

/// Projects a bound model through a filter spec.
///
/// # Example
///
/// ```rust
/// use caliper_bind::BoundModel;
/// use caliper_core::{Source, Value};
/// use caliper_filter::{project, FilterSpec};
/// use caliper_schema::{FieldSchema, FieldType, ModelSchema};
///
/// let schema = ModelSchema::new(
///     Source::Body,
///     vec![
///         FieldSchema::new("name", Source::Body, FieldType::Text).required(),
///         FieldSchema::new("tax", Source::Body, FieldType::Float),
///     ],
/// )
/// .unwrap();
///
/// let mut bound = BoundModel::with_defaults(&schema);
/// bound.set("name", Value::Str("Bar".into()));
///
/// let spec = FilterSpec::builder().exclude_none(true).build().unwrap();
/// let out = project(&schema, &bound, &spec);
/// assert_eq!(out.len(), 1);
/// assert_eq!(out["name"], Value::Str("Bar".into()));
/// ```
#[must_use]
pub fn project(
    schema: &ModelSchema,
    model: &BoundModel,
    spec: &FilterSpec,
) -> IndexMap<String, Value> {
    let mut out = IndexMap::new();
    for field in schema.fields() {
        let name = field.name();
        if !spec.admits(name) {
            continue;
        }
        if spec.drops_unset() && !model.is_assigned(name) {
            continue;
        }
        let Some(value) = model.get(name) else {
            continue;
        };
        if spec.drops_defaults() && field.default() == Some(value) {
            continue;
        }
        if spec.drops_none() && value.is_null() {
            continue;
        }
        out.insert(name.to_string(), value.clone());
    }
    out
}

/// Projects straight to a JSON object, for handing to a serializer.
#[must_use]
pub fn project_json(
    schema: &ModelSchema,
    model: &BoundModel,
    spec: &FilterSpec,
) -> serde_json::Value {
    serde_json::Value::Object(
        project(schema, model, spec)
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use caliper_core::Source;
    use caliper_schema::{FieldSchema, FieldType};

    fn item_schema() -> ModelSchema {
        ModelSchema::new(
            Source::Body,
            vec![
                FieldSchema::new("name", Source::Body, FieldType::Text).required(),
                FieldSchema::new("price", Source::Body, FieldType::Float).required(),
                FieldSchema::new("description", Source::Body, FieldType::Text),
                FieldSchema::new("tax", Source::Body, FieldType::Float).default_value(10.5),
            ],
        )
        .unwrap()
    }

    fn bound_item() -> BoundModel {
        let mut bound = BoundModel::with_defaults(&item_schema());
        bound.set("name", Value::Str("Foo".into()));
        bound.set("price", Value::Float(50.2));
        bound
    }

    #[test]
    fn test_identity_projection_in_declaration_order() {
        let out = project(&item_schema(), &bound_item(), &FilterSpec::all());
        let keys: Vec<_> = out.keys().cloned().collect();
        assert_eq!(keys, ["name", "price", "description", "tax"]);
        assert_eq!(out["tax"], Value::Float(10.5));
    }

    #[test]
    fn test_include_set() {
        let spec = FilterSpec::builder()
            .include(["name", "price"])
            .build()
            .unwrap();
        let out = project(&item_schema(), &bound_item(), &spec);
        assert_eq!(out.len(), 2);
        assert!(out.contains_key("name"));
        assert!(!out.contains_key("tax"));
    }

    #[test]
    fn test_exclude_unset_keeps_only_wire_fields() {
        let spec = FilterSpec::builder().exclude_unset(true).build().unwrap();
        let out = project(&item_schema(), &bound_item(), &spec);
        let keys: Vec<_> = out.keys().cloned().collect();
        // description and tax were never assigned from the wire.
        assert_eq!(keys, ["name", "price"]);
    }

    #[test]
    fn test_exclude_defaults_drops_equal_values_only() {
        let spec = FilterSpec::builder().exclude_defaults(true).build().unwrap();

        let out = project(&item_schema(), &bound_item(), &spec);
        assert!(!out.contains_key("tax"));

        // An assigned value different from the default survives.
        let mut bound = bound_item();
        bound.set("tax", Value::Float(20.2));
        let out = project(&item_schema(), &bound, &spec);
        assert_eq!(out["tax"], Value::Float(20.2));
    }

    #[test]
    fn test_exclude_none_drops_null_fields() {
        let spec = FilterSpec::builder().exclude_none(true).build().unwrap();
        let out = project(&item_schema(), &bound_item(), &spec);
        assert!(!out.contains_key("description"));
        assert!(out.contains_key("tax"));
    }

    #[test]
    fn test_projection_does_not_mutate_model() {
        let bound = bound_item();
        let spec = FilterSpec::builder().include(["name"]).build().unwrap();
        let _ = project(&item_schema(), &bound, &spec);
        assert_eq!(bound.get("price"), Some(&Value::Float(50.2)));
    }

    #[test]
    fn test_project_json_shape() {
        let spec = FilterSpec::builder().exclude_none(true).build().unwrap();
        let json = project_json(&item_schema(), &bound_item(), &spec);
        assert_eq!(
            json,
            serde_json::json!({"name": "Foo", "price": 50.2, "tax": 10.5})
        );
    }
}
