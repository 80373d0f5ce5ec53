//! # Caliper Core
//!
//! Core value model and error taxonomy for the Caliper binding pipeline.
//!
//! This crate defines the vocabulary every other Caliper crate speaks:
//!
//! - [`Value`] — the typed value produced by coercion, carried by bound
//!   models and projected into responses.
//! - [`Source`] — the channel a raw value originates from (path, query,
//!   header, cookie, body).
//! - [`BindingError`] / [`ErrorReport`] — structured request-time failures
//!   and their aggregated `{"detail": [...]}` wire shape.
//! - [`SchemaError`] — configuration-time failures, fatal at startup.
//!
//! # Example
//!
//! ```rust
//! use caliper_core::{BindingError, ErrorReport, Source, Value};
//!
//! let mut report = ErrorReport::new();
//! report.push(BindingError::missing(vec![
//!     Source::Query.as_str().into(),
//!     "q".into(),
//! ]));
//!
//! assert_eq!(report.len(), 1);
//! assert!(Value::Null.is_null());
//! ```

#![doc(html_root_url = "https://docs.rs/caliper-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod value;

pub use error::{
    BindingError, ConstraintKind, ErrorKind, ErrorReport, SchemaError, Source,
};
pub use value::{format_duration, Value};
