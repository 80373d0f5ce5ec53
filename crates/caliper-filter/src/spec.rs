//! Projection specifications.

use caliper_core::SchemaError;
use std::collections::HashSet;

/// Declares which fields of a bound model appear in a projected response.
///
/// Field order never depends on the spec: projection always walks the
/// schema's declaration order. Include and exclude sets are mutually
/// exclusive; populating both is a configuration-time error.
///
/// # Example
///
/// ```rust
/// use caliper_filter::FilterSpec;
///
/// let spec = FilterSpec::builder()
///     .exclude(["tax"])
///     .exclude_none(true)
///     .build()
///     .unwrap();
/// assert!(spec.excludes("tax"));
/// assert!(!spec.excludes("price"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct FilterSpec {
    include: Option<HashSet<String>>,
    exclude: Option<HashSet<String>>,
    exclude_unset: bool,
    exclude_defaults: bool,
    exclude_none: bool,
}

impl FilterSpec {
    /// The identity spec: every field passes through.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Starts building a spec.
    #[must_use]
    pub fn builder() -> FilterSpecBuilder {
        FilterSpecBuilder::default()
    }

    /// Whether a field survives the include/exclude sets.
    #[must_use]
    pub fn admits(&self, name: &str) -> bool {
        if let Some(include) = &self.include {
            if !include.contains(name) {
                return false;
            }
        }
        !self.excludes(name)
    }

    /// Whether the field is named in the exclude set.
    #[must_use]
    pub fn excludes(&self, name: &str) -> bool {
        self.exclude.as_ref().is_some_and(|set| set.contains(name))
    }

    /// Whether wire-unset fields are dropped.
    #[must_use]
    pub fn drops_unset(&self) -> bool {
        self.exclude_unset
    }

    /// Whether fields equal to their declared default are dropped.
    #[must_use]
    pub fn drops_defaults(&self) -> bool {
        self.exclude_defaults
    }

    /// Whether none-marker fields are dropped.
    #[must_use]
    pub fn drops_none(&self) -> bool {
        self.exclude_none
    }
}

/// Builder for [`FilterSpec`].
#[derive(Debug, Default)]
pub struct FilterSpecBuilder {
    include: Option<HashSet<String>>,
    exclude: Option<HashSet<String>>,
    exclude_unset: bool,
    exclude_defaults: bool,
    exclude_none: bool,
}

impl FilterSpecBuilder {
    /// Keeps only the named fields.
    #[must_use]
    pub fn include<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Drops the named fields.
    #[must_use]
    pub fn exclude<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Drops fields that were not assigned from the wire.
    #[must_use]
    pub fn exclude_unset(mut self, on: bool) -> Self {
        self.exclude_unset = on;
        self
    }

    /// Drops fields whose value equals their declared default.
    #[must_use]
    pub fn exclude_defaults(mut self, on: bool) -> Self {
        self.exclude_defaults = on;
        self
    }

    /// Drops fields holding the none-marker.
    #[must_use]
    pub fn exclude_none(mut self, on: bool) -> Self {
        self.exclude_none = on;
        self
    }

    /// Finishes the spec.
    ///
    /// # Errors
    ///
    /// [`SchemaError::FilterSpecConflict`] if both include and exclude sets
    /// were populated.
    pub fn build(self) -> Result<FilterSpec, SchemaError> {
        if self.include.is_some() && self.exclude.is_some() {
            return Err(SchemaError::FilterSpecConflict);
        }
        Ok(FilterSpec {
            include: self.include,
            exclude: self.exclude,
            exclude_unset: self.exclude_unset,
            exclude_defaults: self.exclude_defaults,
            exclude_none: self.exclude_none,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_spec_admits_everything() {
        let spec = FilterSpec::all();
        assert!(spec.admits("anything"));
        assert!(!spec.drops_unset());
        assert!(!spec.drops_none());
    }

    #[test]
    fn test_include_is_a_whitelist() {
        let spec = FilterSpec::builder()
            .include(["name", "price"])
            .build()
            .unwrap();
        assert!(spec.admits("name"));
        assert!(!spec.admits("tax"));
    }

    #[test]
    fn test_exclude_is_a_blacklist() {
        let spec = FilterSpec::builder().exclude(["tax"]).build().unwrap();
        assert!(!spec.admits("tax"));
        assert!(spec.admits("name"));
    }

    #[test]
    fn test_include_and_exclude_conflict() {
        let err = FilterSpec::builder()
            .include(["name"])
            .exclude(["tax"])
            .build()
            .unwrap_err();
        assert_eq!(err, SchemaError::FilterSpecConflict);
    }
}
