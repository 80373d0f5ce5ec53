//! # Caliper Filter
//!
//! The response-time half of the Caliper pipeline:
//!
//! - [`FilterSpec`] — declares include/exclude sets and the unset, default
//!   and none dropping rules for one projection.
//! - [`project`] / [`project_json`] — applies a spec to a bound model,
//!   producing an ordered field map or a JSON object.
//! - [`UnionSpec`] — ordered, first-match structural resolution of a
//!   payload against multiple candidate schemas.
//!
//! # Example
//!
//! ```rust
//! use caliper_bind::BoundModel;
//! use caliper_core::{Source, Value};
//! use caliper_filter::{project_json, FilterSpec};
//! use caliper_schema::{FieldSchema, FieldType, ModelSchema};
//!
//! let schema = ModelSchema::new(
//!     Source::Body,
//!     vec![
//!         FieldSchema::new("name", Source::Body, FieldType::Text).required(),
//!         FieldSchema::new("description", Source::Body, FieldType::Text),
//!     ],
//! )
//! .unwrap();
//!
//! let mut bound = BoundModel::with_defaults(&schema);
//! bound.set("name", Value::Str("Foo".into()));
//!
//! let spec = FilterSpec::builder().exclude_unset(true).build().unwrap();
//! assert_eq!(
//!     project_json(&schema, &bound, &spec),
//!     serde_json::json!({"name": "Foo"})
//! );
//! ```

#![doc(html_root_url = "https://docs.rs/caliper-filter/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod project;
mod spec;
mod union;

pub use project::{project, project_json};
pub use spec::{FilterSpec, FilterSpecBuilder};
pub use union::{UnionSpec, UnionVariant};
