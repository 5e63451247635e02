//! Postal address value type.

use serde::{Deserialize, Serialize};

use super::validation::ValidationErrors;

/// Maximum length for free-text address fields.
const MAX_FIELD_LENGTH: usize = 255;

/// Maximum length for zip/postal codes and phone numbers.
const MAX_SHORT_FIELD_LENGTH: usize = 20;

/// A full postal address as captured at checkout or saved in the address
/// book.
///
/// Orders embed the shipping and billing addresses as JSON snapshots of this
/// struct rather than referencing address-book rows, so editing or deleting
/// a saved address never rewrites order history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostalAddress {
    pub first_name: String,
    pub last_name: String,
    pub address_line_1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_line_2: Option<String>,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    pub phone: String,
}

impl PostalAddress {
    /// Recipient name for labels and order summaries.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Validate all fields, recording failures under `prefix.field` keys.
    ///
    /// The prefix distinguishes the two addresses in a checkout payload
    /// (`shipping_address.city` vs `billing_address.city`).
    pub fn collect_errors(&self, prefix: &str, errors: &mut ValidationErrors) {
        let field = |name: &str| {
            if prefix.is_empty() {
                name.to_owned()
            } else {
                format!("{prefix}.{name}")
            }
        };

        let required = [
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("address_line_1", &self.address_line_1),
            ("city", &self.city),
            ("state", &self.state),
            ("country", &self.country),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                errors.add(field(name), "is required");
            } else if value.len() > MAX_FIELD_LENGTH {
                errors.add(
                    field(name),
                    format!("must be at most {MAX_FIELD_LENGTH} characters"),
                );
            }
        }

        if let Some(line_2) = &self.address_line_2
            && line_2.len() > MAX_FIELD_LENGTH
        {
            errors.add(
                field("address_line_2"),
                format!("must be at most {MAX_FIELD_LENGTH} characters"),
            );
        }

        let short = [("zip_code", &self.zip_code), ("phone", &self.phone)];
        for (name, value) in short {
            if value.trim().is_empty() {
                errors.add(field(name), "is required");
            } else if value.len() > MAX_SHORT_FIELD_LENGTH {
                errors.add(
                    field(name),
                    format!("must be at most {MAX_SHORT_FIELD_LENGTH} characters"),
                );
            }
        }
    }

    /// Validate a standalone address (unprefixed field keys).
    ///
    /// # Errors
    ///
    /// Returns the accumulated field errors when any field is missing or
    /// over length.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        self.collect_errors("", &mut errors);
        errors.into_result()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn valid_address() -> PostalAddress {
        PostalAddress {
            first_name: "Ada".to_owned(),
            last_name: "Lovelace".to_owned(),
            address_line_1: "12 Analytical Way".to_owned(),
            address_line_2: None,
            city: "London".to_owned(),
            state: "LDN".to_owned(),
            zip_code: "NW1 2DB".to_owned(),
            country: "GB".to_owned(),
            phone: "+44 20 7946 0001".to_owned(),
        }
    }

    #[test]
    fn test_valid_address_passes() {
        assert!(valid_address().validate().is_ok());
    }

    #[test]
    fn test_missing_required_fields() {
        let mut address = valid_address();
        address.city = "  ".to_owned();
        address.phone = String::new();

        let errors = address.validate().unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors.fields().contains_key("city"));
        assert!(errors.fields().contains_key("phone"));
    }

    #[test]
    fn test_length_limits() {
        let mut address = valid_address();
        address.zip_code = "9".repeat(21);
        address.address_line_2 = Some("x".repeat(256));

        let errors = address.validate().unwrap_err();
        assert!(errors.fields().contains_key("zip_code"));
        assert!(errors.fields().contains_key("address_line_2"));
    }

    #[test]
    fn test_prefixed_keys() {
        let mut address = valid_address();
        address.first_name = String::new();

        let mut errors = ValidationErrors::new();
        address.collect_errors("shipping_address", &mut errors);
        assert!(errors.fields().contains_key("shipping_address.first_name"));
    }

    #[test]
    fn test_full_name() {
        assert_eq!(valid_address().full_name(), "Ada Lovelace");
    }

    #[test]
    fn test_line_2_omitted_from_json_when_absent() {
        let json = serde_json::to_string(&valid_address()).unwrap();
        assert!(!json.contains("address_line_2"));
    }
}
