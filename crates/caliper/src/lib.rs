//! # Caliper
//!
//! **Declarative HTTP request binding, validation and response projection**
//!
//! Caliper turns raw wire data into typed, validated models against schemas
//! declared once at startup:
//!
//! - **Declare** – field schemas with channels, types, defaults, aliases,
//!   constraints and custom validators, frozen into a registry
//! - **Bind** – path, query, header, cookie and body channels coerced and
//!   validated in one pass, with every failure collected
//! - **Report** – structured `{"detail": [...]}` error reports with stable
//!   location paths and taxonomy tags
//! - **Project** – bound models filtered back out through include/exclude
//!   sets and unset/default/none rules
//!
//! ## Quick Start
//!
//! ```rust
//! use caliper::prelude::*;
//!
//! let mut builder = RegistryBuilder::new();
//! builder
//!     .register(FieldSchema::new("item_id", Source::Path, FieldType::Integer).required())
//!     .unwrap();
//! builder
//!     .register(
//!         FieldSchema::new("q", Source::Query, FieldType::Text)
//!             .constraint(Constraint::MinLength(3)),
//!     )
//!     .unwrap();
//! let registry = builder.freeze();
//!
//! let raw = RawRequest::builder()
//!     .path_param("item_id", "42")
//!     .query_string("q=test")
//!     .build();
//!
//! let bound = bind_request(&registry, &raw).unwrap();
//! assert_eq!(bound.get("item_id"), Some(&Value::Int(42)));
//! ```
//!
//! ## Architecture
//!
//! A fixed per-request pipeline over a registry frozen at startup:
//!
//! ```text
//! RawRequest → lookup → coerce → validate → BoundRequest
//!                 ↓ (any failure, all fields visited)
//!             ErrorReport {"detail": [...]}
//! ```

#![doc(html_root_url = "https://docs.rs/caliper/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use caliper_core as core;

// Re-export schema types
pub use caliper_schema as schema;

// Re-export binding types
pub use caliper_bind as bind;

// Re-export projection types
pub use caliper_filter as filter;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust
/// use caliper::prelude::*;
/// ```
pub mod prelude {
    pub use caliper_core::{
        BindingError, ConstraintKind, ErrorKind, ErrorReport, SchemaError, Source, Value,
    };

    // Re-export schema declarations
    pub use caliper_schema::{
        Constraint, ExtraPolicy, FieldSchema, FieldType, ModelSchema, RegistryBuilder,
        SchemaRegistry, Validator,
    };

    // Re-export the binder
    pub use caliper_bind::{
        bind_model, bind_pairs, bind_request, BoundModel, BoundRequest, RawBody, RawRequest,
    };

    // Re-export projection and unions
    pub use caliper_filter::{project, project_json, FilterSpec, UnionSpec, UnionVariant};
}
