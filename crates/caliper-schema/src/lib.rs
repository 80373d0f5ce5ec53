//! # Caliper Schema
//!
//! Declarative field and model schemas for the Caliper binding pipeline.
//!
//! Everything in this crate is constructed once at process startup and is
//! immutable for the process lifetime:
//!
//! - [`FieldSchema`] — one parameter or body field: channel, target type,
//!   requiredness, default, alias, ordered [`Constraint`]s and ordered
//!   custom validators.
//! - [`ModelSchema`] — an ordered group of fields from one channel, with an
//!   [`ExtraPolicy`] for unclaimed raw keys.
//! - [`SchemaRegistry`] — the write-once catalog of field declarations,
//!   built through [`RegistryBuilder`] and frozen before the first request.
//!
//! # Example
//!
//! ```rust
//! use caliper_schema::{Constraint, FieldSchema, FieldType, RegistryBuilder};
//! use caliper_core::Source;
//!
//! let mut builder = RegistryBuilder::new();
//! builder
//!     .register(
//!         FieldSchema::new("q", Source::Query, FieldType::Text)
//!             .constraint(Constraint::MinLength(3)),
//!     )
//!     .unwrap();
//!
//! let registry = builder.freeze();
//! assert_eq!(registry.resolve(Source::Query).fields().len(), 1);
//! ```

#![doc(html_root_url = "https://docs.rs/caliper-schema/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod constraint;
mod field;
mod model;
mod registry;

pub use constraint::Constraint;
pub use field::{FieldSchema, FieldType, Validator};
pub use model::{ExtraPolicy, ModelSchema};
pub use registry::{RegistryBuilder, SchemaRegistry};
