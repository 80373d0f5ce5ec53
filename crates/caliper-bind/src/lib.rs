//! # Caliper Bind
//!
//! The request-time half of the Caliper pipeline: raw wire channels in,
//! typed bound models (or a complete error report) out.
//!
//! - [`RawRequest`] — the transport-agnostic input contract, one bucket of
//!   raw strings per channel plus the body.
//! - [`coerce`] / [`coerce_json`] — the per-type coercion rule tables.
//! - [`validate`] — constraint and custom-validator evaluation.
//! - [`bind_request`] / [`bind_model`] — the binder proper, producing a
//!   [`BoundRequest`] with per-field wire-assignment tracking.
//!
//! # Example
//!
//! ```rust
//! use caliper_bind::{bind_request, RawRequest};
//! use caliper_core::{Source, Value};
//! use caliper_schema::{Constraint, FieldSchema, FieldType, RegistryBuilder};
//!
//! let mut builder = RegistryBuilder::new();
//! builder
//!     .register(
//!         FieldSchema::new("q", Source::Query, FieldType::Text)
//!             .constraint(Constraint::MinLength(3)),
//!     )
//!     .unwrap();
//! let registry = builder.freeze();
//!
//! let raw = RawRequest::builder().query_string("q=ab").build();
//! let report = bind_request(&registry, &raw).unwrap_err();
//! assert_eq!(report.errors()[0].kind().tag(), "string_too_short");
//! ```

#![doc(html_root_url = "https://docs.rs/caliper-bind/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod binder;
mod bound;
mod coerce;
mod context;
mod validate;

pub use binder::{bind_json_object, bind_model, bind_pairs, bind_request};
pub use bound::{BoundModel, BoundRequest};
pub use coerce::{coerce, coerce_json, coerce_text, parse_bool, CoercionFailure, RawValue};
pub use context::{RawBody, RawRequest, RawRequestBuilder};
pub use validate::validate;
