//! Union resolution over structured payloads.
//!
//! A union declares an ordered list of candidate model schemas. Resolution
//! is structural and first-match: the first candidate whose required fields
//! are all present with compatible JSON shapes wins and is bound in full.
//! Declaration order is therefore part of the contract; narrower variants
//! belong before wider ones.

use caliper_bind::{bind_json_object, BoundModel};
use caliper_core::{BindingError, ErrorReport};
use caliper_schema::{FieldType, ModelSchema};
use tracing::debug;

/// One named union candidate.
#[derive(Debug, Clone)]
pub struct UnionVariant {
    name: String,
    schema: ModelSchema,
}

impl UnionVariant {
    /// Declares a candidate with a diagnostic name.
    #[must_use]
    pub fn new(name: impl Into<String>, schema: ModelSchema) -> Self {
        Self {
            name: name.into(),
            schema,
        }
    }

    /// The variant's diagnostic name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The variant's model schema.
    #[must_use]
    pub fn schema(&self) -> &ModelSchema {
        &self.schema
    }
}

/// An ordered union of candidate model schemas.
///
/// # Example
///
/// ```rust
/// use caliper_core::Source;
/// use caliper_filter::{UnionSpec, UnionVariant};
/// use caliper_schema::{FieldSchema, FieldType, ModelSchema};
///
/// let car = ModelSchema::new(
///     Source::Body,
///     vec![FieldSchema::new("plate", Source::Body, FieldType::Text).required()],
/// )
/// .unwrap();
/// let boat = ModelSchema::new(
///     Source::Body,
///     vec![FieldSchema::new("hull_id", Source::Body, FieldType::Text).required()],
/// )
/// .unwrap();
///
/// let union = UnionSpec::new(vec![
///     UnionVariant::new("car", car),
///     UnionVariant::new("boat", boat),
/// ]);
///
/// let payload = serde_json::json!({"hull_id": "HX-7"});
/// let (name, bound) = union
///     .resolve(payload.as_object().unwrap(), &["body".to_string()])
///     .unwrap();
/// assert_eq!(name, "boat");
/// assert!(bound.is_assigned("hull_id"));
/// ```
#[derive(Debug, Clone)]
pub struct UnionSpec {
    variants: Vec<UnionVariant>,
}

impl UnionSpec {
    /// Declares a union over candidates; list order is match order.
    #[must_use]
    pub fn new(variants: Vec<UnionVariant>) -> Self {
        Self { variants }
    }

    /// The candidates, in match order.
    #[must_use]
    pub fn variants(&self) -> &[UnionVariant] {
        &self.variants
    }

    /// Resolves a JSON object against the union and binds the winner.
    ///
    /// # Errors
    ///
    /// - A single `union_no_match` error at `loc` when no candidate's
    ///   required fields structurally match.
    /// - The winning candidate's own binding report when it matched
    ///   structurally but failed coercion or validation.
    pub fn resolve(
        &self,
        map: &serde_json::Map<String, serde_json::Value>,
        loc: &[String],
    ) -> Result<(&str, BoundModel), ErrorReport> {
        for variant in &self.variants {
            if structurally_matches(&variant.schema, map) {
                debug!(variant = %variant.name, "union variant matched");
                let bound = bind_json_object(map, &variant.schema, loc)?;
                return Ok((variant.name.as_str(), bound));
            }
        }
        Err(std::iter::once(BindingError::union_no_match(loc.to_vec())).collect())
    }
}

/// Whether every required field of the schema is present in the object with
/// a compatible JSON shape. Optional fields never disqualify a candidate.
fn structurally_matches(
    schema: &ModelSchema,
    map: &serde_json::Map<String, serde_json::Value>,
) -> bool {
    schema
        .fields()
        .iter()
        .filter(|f| f.is_required())
        .all(|f| {
            map.get(f.lookup_key())
                .is_some_and(|json| shape_compatible(f.ty(), json))
        })
}

fn shape_compatible(ty: &FieldType, json: &serde_json::Value) -> bool {
    match ty {
        FieldType::Integer => json.is_i64() || json.is_string(),
        FieldType::Float | FieldType::Decimal => json.is_number() || json.is_string(),
        FieldType::Boolean => json.is_boolean() || json.is_string(),
        FieldType::TextSeq => json.is_array(),
        FieldType::Nested(inner) => json
            .as_object()
            .is_some_and(|obj| structurally_matches(inner, obj)),
        FieldType::Duration => json.is_number() || json.is_string(),
        // Every remaining type is carried as a JSON string.
        _ => json.is_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use caliper_core::Source;
    use caliper_schema::FieldSchema;

    fn body_loc() -> Vec<String> {
        vec!["body".to_string()]
    }

    fn plane() -> ModelSchema {
        ModelSchema::new(
            Source::Body,
            vec![
                FieldSchema::new("wingspan", Source::Body, FieldType::Float).required(),
                FieldSchema::new("engines", Source::Body, FieldType::Integer).required(),
            ],
        )
        .unwrap()
    }

    fn car() -> ModelSchema {
        ModelSchema::new(
            Source::Body,
            vec![
                FieldSchema::new("plate", Source::Body, FieldType::Text).required(),
                FieldSchema::new("doors", Source::Body, FieldType::Integer),
            ],
        )
        .unwrap()
    }

    fn union() -> UnionSpec {
        UnionSpec::new(vec![
            UnionVariant::new("plane", plane()),
            UnionVariant::new("car", car()),
        ])
    }

    #[test]
    fn test_resolves_by_required_fields() {
        let payload = serde_json::json!({"plate": "AB-123"});
        let spec = union();
        let (name, bound) = spec
            .resolve(payload.as_object().unwrap(), &body_loc())
            .unwrap();
        assert_eq!(name, "car");
        assert!(bound.is_assigned("plate"));
        assert!(!bound.is_assigned("doors"));
    }

    #[test]
    fn test_first_match_wins_on_overlap() {
        // Satisfies both variants; declaration order decides.
        let payload = serde_json::json!({
            "wingspan": 35.8, "engines": 2, "plate": "AB-123"
        });
        let spec = union();
        let (name, _) = spec
            .resolve(payload.as_object().unwrap(), &body_loc())
            .unwrap();
        assert_eq!(name, "plane");
    }

    #[test]
    fn test_no_match_yields_single_error() {
        let payload = serde_json::json!({"color": "red"});
        let report = union()
            .resolve(payload.as_object().unwrap(), &body_loc())
            .unwrap_err();
        assert_eq!(report.len(), 1);
        assert_eq!(report.errors()[0].loc(), ["body"]);
        assert_eq!(report.errors()[0].kind().tag(), "union_no_match");
    }

    #[test]
    fn test_shape_mismatch_disqualifies_candidate() {
        // "engines" as an array does not fit an integer, so the plane
        // variant is skipped even though the key is present.
        let payload = serde_json::json!({
            "wingspan": 35.8, "engines": [2], "plate": "AB-123"
        });
        let spec = union();
        let (name, _) = spec
            .resolve(payload.as_object().unwrap(), &body_loc())
            .unwrap();
        assert_eq!(name, "car");
    }

    #[test]
    fn test_matched_variant_still_validates() {
        // Structurally a plane (string engines pass the shape check), but
        // coercion of "many" fails afterwards.
        let payload = serde_json::json!({"wingspan": 35.8, "engines": "many"});
        let report = union()
            .resolve(payload.as_object().unwrap(), &body_loc())
            .unwrap_err();
        assert_eq!(report.errors()[0].loc(), ["body", "engines"]);
        assert_eq!(report.errors()[0].kind().tag(), "int_parsing");
    }

    #[test]
    fn test_nested_required_fields_participate() {
        let wrapper = ModelSchema::new(
            Source::Body,
            vec![FieldSchema::new(
                "vehicle",
                Source::Body,
                FieldType::Nested(Box::new(car())),
            )
            .required()],
        )
        .unwrap();
        let union = UnionSpec::new(vec![UnionVariant::new("wrapped", wrapper)]);

        let payload = serde_json::json!({"vehicle": {"plate": "AB-123"}});
        assert!(union
            .resolve(payload.as_object().unwrap(), &body_loc())
            .is_ok());

        let payload = serde_json::json!({"vehicle": {"doors": 4}});
        assert!(union
            .resolve(payload.as_object().unwrap(), &body_loc())
            .is_err());
    }
}
