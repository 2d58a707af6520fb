//! Address types and address form validation.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::checkout::decode::{lenient_string, null_as_default};
use crate::error::{CommerceError, ValidationErrors};
use crate::ids::AddressId;

static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9\s().\-]{7,20}$").expect("valid phone pattern"));

static POSTAL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w\-]{3,10}$").expect("valid postal code pattern"));

/// Kind of address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AddressType {
    #[default]
    Home,
    Work,
    #[serde(other)]
    Other,
}

impl AddressType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AddressType::Home => "home",
            AddressType::Work => "work",
            AddressType::Other => "other",
        }
    }
}

/// A saved postal address owned by the signed-in user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    /// Server-assigned id.
    pub id: AddressId,
    /// Recipient name.
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    /// Street line.
    #[serde(default, deserialize_with = "lenient_string")]
    pub street: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub city: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub state: String,
    /// Postal/ZIP code.
    #[serde(
        default,
        alias = "zipCode",
        alias = "postalCode",
        deserialize_with = "lenient_string"
    )]
    pub zip: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub country: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub phone: String,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub address_type: AddressType,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_default: bool,
}

impl Address {
    /// Format as single line.
    pub fn one_line(&self) -> String {
        let parts: Vec<&str> = [
            self.street.as_str(),
            self.city.as_str(),
            self.state.as_str(),
            self.zip.as_str(),
            self.country.as_str(),
        ]
        .into_iter()
        .filter(|part| !part.trim().is_empty())
        .collect();
        parts.join(", ")
    }

    /// Format as multi-line.
    pub fn multi_line(&self) -> String {
        let mut lines = vec![self.name.clone(), self.street.clone()];
        lines.push(format!("{}, {} {}", self.city, self.state, self.zip));
        if !self.country.is_empty() {
            lines.push(self.country.clone());
        }
        if !self.phone.is_empty() {
            lines.push(format!("Phone: {}", self.phone));
        }
        lines.join("\n")
    }
}

/// Input for creating an address.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AddressForm {
    pub name: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
    pub phone: String,
    #[serde(rename = "type")]
    pub address_type: AddressType,
    pub is_default: bool,
}

impl AddressForm {
    /// Check required fields and formats, reporting every failing field.
    pub fn validate(&self) -> Result<(), CommerceError> {
        let mut errors = ValidationErrors::new();

        let required = [
            ("name", &self.name, "Name is required"),
            ("street", &self.street, "Street address is required"),
            ("city", &self.city, "City is required"),
            ("state", &self.state, "State is required"),
            ("zip", &self.zip, "Postal code is required"),
            ("phone", &self.phone, "Phone number is required"),
        ];
        for (field, value, message) in required {
            if value.trim().is_empty() {
                errors.add(field, message);
            }
        }

        let phone = self.phone.trim();
        if !phone.is_empty() && !PHONE_PATTERN.is_match(phone) {
            errors.add("phone", "Please enter a valid phone number");
        }

        let zip = self.zip.trim();
        if !zip.is_empty() && !POSTAL_PATTERN.is_match(zip) {
            errors.add("zip", "Please enter a valid postal code");
        }

        errors.into_result()
    }

    /// Copy of the form with surrounding whitespace removed.
    pub fn trimmed(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            street: self.street.trim().to_string(),
            city: self.city.trim().to_string(),
            state: self.state.trim().to_string(),
            zip: self.zip.trim().to_string(),
            country: self.country.trim().to_string(),
            phone: self.phone.trim().to_string(),
            address_type: self.address_type,
            is_default: self.is_default,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> AddressForm {
        AddressForm {
            name: "Jane Smith".to_string(),
            street: "456 Oak Ave".to_string(),
            city: "Los Angeles".to_string(),
            state: "CA".to_string(),
            zip: "90001".to_string(),
            country: "United States".to_string(),
            phone: "+1 (555) 010-2030".to_string(),
            address_type: AddressType::Home,
            is_default: false,
        }
    }

    fn field_errors(form: &AddressForm) -> ValidationErrors {
        match form.validate() {
            Err(CommerceError::Validation(errors)) => errors,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_form() {
        assert!(valid_form().validate().is_ok());
    }

    #[test]
    fn test_missing_fields_reported_together() {
        let form = AddressForm::default();
        let errors = field_errors(&form);

        for field in ["name", "street", "city", "state", "zip", "phone"] {
            assert!(errors.get(field).is_some(), "missing {}", field);
        }
        assert!(errors.get("country").is_none());
    }

    #[test]
    fn test_phone_format() {
        let mut form = valid_form();
        form.phone = "call me".to_string();
        assert_eq!(
            field_errors(&form).get("phone"),
            Some("Please enter a valid phone number")
        );

        form.phone = "98765 43210".to_string();
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_postal_code_format() {
        let mut form = valid_form();
        for bad in ["12", "12345678901", "90 001", "900#1"] {
            form.zip = bad.to_string();
            assert!(field_errors(&form).get("zip").is_some(), "{} accepted", bad);
        }

        for good in ["560001", "SW1A-1AA", "K1A0B1"] {
            form.zip = good.to_string();
            assert!(form.validate().is_ok(), "{} rejected", good);
        }
    }

    #[test]
    fn test_address_wire_format() {
        let json = r#"{
            "id": 7,
            "name": "Asha",
            "street": "12 MG Road",
            "city": "Bengaluru",
            "state": "KA",
            "zipCode": "560001",
            "country": "India",
            "phone": "9876543210",
            "type": "office",
            "isDefault": true
        }"#;
        let address: Address = serde_json::from_str(json).unwrap();

        assert_eq!(address.id.as_str(), "7");
        assert_eq!(address.zip, "560001");
        assert_eq!(address.address_type, AddressType::Other);
        assert!(address.is_default);
        assert_eq!(address.one_line(), "12 MG Road, Bengaluru, KA, 560001, India");
    }

    #[test]
    fn test_address_null_fields() {
        let json = r#"{
            "id": 8,
            "name": "Ravi",
            "street": "4 Park St",
            "city": "Kolkata",
            "state": null,
            "postalCode": 700016,
            "country": null,
            "phone": null,
            "type": null,
            "isDefault": null
        }"#;
        let address: Address = serde_json::from_str(json).unwrap();

        assert_eq!(address.zip, "700016");
        assert_eq!(address.state, "");
        assert_eq!(address.country, "");
        assert_eq!(address.phone, "");
        assert_eq!(address.address_type, AddressType::Home);
        assert!(!address.is_default);
        assert_eq!(address.one_line(), "4 Park St, Kolkata, 700016");
    }
}
