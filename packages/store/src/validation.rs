//! # Form schemas
//!
//! The three forms of the application are plain structs of raw text inputs
//! validated with `validator`. A failed validation becomes [`FieldErrors`]: one
//! message per field, shown next to the field.
//!
//! | Form | Rules |
//! |------|-------|
//! | [`SignInForm`] | email present and well-formed, password present |
//! | [`SignUpForm`] | name present, email well-formed, password of 6+ characters |
//! | [`ListingForm`] | all text fields present, `km`/`price` numbers ≥ 1, `year` a whole number, phone of 11 or 12 digits, description of 12+ characters |

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use validator::{Validate, ValidationError, ValidationErrors};

static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{11,12}$").expect("phone pattern is valid"));

/// First validation message of each invalid field, keyed by field name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn single(field: &str, message: &str) -> Self {
        let mut errors = Self::default();
        errors.insert(field, message);
        errors
    }

    /// Record a message unless the field already has one.
    pub fn insert(&mut self, field: &str, message: &str) {
        self.0
            .entry(field.to_string())
            .or_insert_with(|| message.to_string());
    }
}

impl From<ValidationErrors> for FieldErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields = FieldErrors::default();
        for (field, errs) in errors.field_errors() {
            if let Some(first) = errs.first() {
                let message = first
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| first.code.to_string());
                fields.insert(&field.to_string(), &message);
            }
        }
        fields
    }
}

/// Run the derived validation and collect per-field messages.
pub fn check<T: Validate>(form: &T) -> Result<(), FieldErrors> {
    form.validate().map_err(FieldErrors::from)
}

#[derive(Clone, Debug, Default, PartialEq, Validate)]
pub struct SignInForm {
    #[validate(
        length(min = 1, message = "The email field must be filled"),
        email(message = "Enter a valid email")
    )]
    pub email: String,
    #[validate(length(min = 1, message = "The password field must be filled"))]
    pub password: String,
}

#[derive(Clone, Debug, Default, PartialEq, Validate)]
pub struct SignUpForm {
    #[validate(length(min = 1, message = "Enter a valid name."))]
    pub name: String,
    #[validate(
        length(min = 1, message = "The email field must be filled"),
        email(message = "Enter a valid email")
    )]
    pub email: String,
    #[validate(length(min = 6, message = "The password must have at least 6 characters"))]
    pub password: String,
}

/// Raw inputs of the new-listing form.
#[derive(Clone, Debug, Default, PartialEq, Validate)]
pub struct ListingForm {
    #[validate(length(min = 1, message = "The car name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "The car model is required"))]
    pub model: String,
    #[validate(
        length(min = 1, message = "The car year is required"),
        custom(function = "whole_number", message = "The year must be a number")
    )]
    pub year: String,
    #[validate(custom(function = "at_least_one", message = "The car mileage is required"))]
    pub km: String,
    #[validate(custom(function = "at_least_one", message = "The car price is required"))]
    pub price: String,
    #[validate(length(min = 1, message = "The city is required"))]
    pub city: String,
    #[validate(
        length(min = 11, message = "The phone is required"),
        regex(path = *PHONE_PATTERN, message = "Invalid phone number")
    )]
    pub phone: String,
    #[validate(length(min = 12, message = "The description must have at least 12 characters"))]
    pub description: String,
}

/// Typed values of a valid [`ListingForm`].
#[derive(Clone, Debug, PartialEq)]
pub struct ListingDraft {
    /// Upper-cased, which is what prefix search compares against.
    pub name: String,
    pub model: String,
    pub year: u32,
    pub odometer_km: u64,
    pub price: f64,
    pub city: String,
    pub phone: String,
    pub description: String,
}

impl ListingForm {
    /// Validate and convert into typed values.
    pub fn parse(&self) -> Result<ListingDraft, FieldErrors> {
        check(self)?;
        let year = self
            .year
            .trim()
            .parse::<u32>()
            .map_err(|_| FieldErrors::single("year", "The year must be a number"))?;
        let km = parse_number(&self.km)
            .ok_or_else(|| FieldErrors::single("km", "The car mileage is required"))?;
        let price = parse_number(&self.price)
            .ok_or_else(|| FieldErrors::single("price", "The car price is required"))?;
        Ok(ListingDraft {
            name: self.name.trim().to_uppercase(),
            model: self.model.trim().to_string(),
            year,
            odometer_km: km as u64,
            price,
            city: self.city.trim().to_string(),
            phone: self.phone.clone(),
            description: self.description.trim().to_string(),
        })
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

fn at_least_one(value: &str) -> Result<(), ValidationError> {
    match parse_number(value) {
        Some(n) if n >= 1.0 => Ok(()),
        _ => Err(ValidationError::new("at_least_one")),
    }
}

fn whole_number(value: &str) -> Result<(), ValidationError> {
    if value.trim().parse::<u32>().is_ok() {
        Ok(())
    } else {
        Err(ValidationError::new("whole_number"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_listing_form() -> ListingForm {
        ListingForm {
            name: "Onix".into(),
            model: "1.0 LT".into(),
            year: "2019".into(),
            km: "32000".into(),
            price: "45000".into(),
            city: "Campinas".into(),
            phone: "11987654321".into(),
            description: "Single owner, full service history".into(),
        }
    }

    #[test]
    fn test_valid_listing_form_parses() {
        let draft = valid_listing_form().parse().unwrap();
        assert_eq!(draft.name, "ONIX");
        assert_eq!(draft.year, 2019);
        assert_eq!(draft.odometer_km, 32000);
        assert_eq!(draft.price, 45000.0);
    }

    #[test]
    fn test_phone_must_have_eleven_or_twelve_digits() {
        for phone in ["1198765432", "1198765432100", "11 98765-432", "abcdefghijk"] {
            let form = ListingForm {
                phone: phone.into(),
                ..valid_listing_form()
            };
            let errors = form.parse().unwrap_err();
            assert!(errors.contains("phone"), "{phone} should be rejected");
        }

        let twelve = ListingForm {
            phone: "551198765432".into(),
            ..valid_listing_form()
        };
        assert!(twelve.parse().is_ok());
    }

    #[test]
    fn test_non_numeric_phone_reports_pattern_message() {
        let form = ListingForm {
            phone: "abcdefghijk".into(),
            ..valid_listing_form()
        };
        let errors = form.parse().unwrap_err();
        assert_eq!(errors.get("phone"), Some("Invalid phone number"));
    }

    #[test]
    fn test_empty_form_reports_every_field() {
        let errors = ListingForm::default().parse().unwrap_err();
        for field in ["name", "model", "year", "km", "price", "city", "phone", "description"] {
            assert!(errors.contains(field), "missing error for {field}");
        }
        assert_eq!(errors.get("km"), Some("The car mileage is required"));
    }

    #[test]
    fn test_price_below_one_is_rejected() {
        let form = ListingForm {
            price: "0".into(),
            ..valid_listing_form()
        };
        assert_eq!(
            form.parse().unwrap_err().get("price"),
            Some("The car price is required")
        );
    }

    #[test]
    fn test_short_description_is_rejected() {
        let form = ListingForm {
            description: "too short".into(),
            ..valid_listing_form()
        };
        assert!(form.parse().unwrap_err().contains("description"));
    }

    #[test]
    fn test_sign_in_form() {
        let ok = SignInForm {
            email: "ana@example.com".into(),
            password: "x".into(),
        };
        assert!(check(&ok).is_ok());

        let bad = SignInForm {
            email: "not-an-email".into(),
            password: String::new(),
        };
        let errors = check(&bad).unwrap_err();
        assert_eq!(errors.get("email"), Some("Enter a valid email"));
        assert!(errors.contains("password"));
    }

    #[test]
    fn test_sign_up_password_length() {
        let form = SignUpForm {
            name: "Ana".into(),
            email: "ana@example.com".into(),
            password: "12345".into(),
        };
        let errors = check(&form).unwrap_err();
        assert_eq!(
            errors.get("password"),
            Some("The password must have at least 6 characters")
        );
    }
}
