//! Field-level validation errors.

use std::collections::BTreeMap;

use serde::Serialize;

/// Accumulated field-level validation failures.
///
/// Keys are input field names (dotted for nested payloads, e.g.
/// `shipping_address.city`); values are one or more human-readable
/// messages. Ordered map so error responses are stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure for a field.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of fields with at least one failure.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn fields(&self) -> &BTreeMap<String, Vec<String>> {
        &self.0
    }

    /// `Ok(())` when no failures were recorded, otherwise `Err(self)`.
    ///
    /// # Errors
    ///
    /// Returns `self` when at least one failure was recorded.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let fields: Vec<&str> = self.0.keys().map(String::as_str).collect();
        write!(f, "validation failed for: {}", fields.join(", "))
    }
}

impl std::error::Error for ValidationErrors {}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_ok() {
        assert!(ValidationErrors::new().into_result().is_ok());
    }

    #[test]
    fn test_add_accumulates_per_field() {
        let mut errors = ValidationErrors::new();
        errors.add("sku", "is required");
        errors.add("sku", "must be unique");
        errors.add("price", "must be at least 0");

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.fields()["sku"].len(), 2);
        assert!(errors.into_result().is_err());
    }

    #[test]
    fn test_display_lists_fields() {
        let mut errors = ValidationErrors::new();
        errors.add("name", "is required");
        errors.add("city", "is required");
        // BTreeMap keeps keys sorted
        assert_eq!(errors.to_string(), "validation failed for: city, name");
    }

    #[test]
    fn test_serializes_as_field_map() {
        let mut errors = ValidationErrors::new();
        errors.add("zip_code", "must be at most 20 characters");
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json["zip_code"][0], "must be at most 20 characters");
    }
}
