//! Field-level validation of the lead form.

use std::collections::BTreeMap;

use crate::{config::ValidationRules, lead::LeadForm, phone, vin};

/// Form fields that can carry an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Make,
    Model,
    Year,
    Mileage,
    Phone,
    Name,
    Agreed,
    Vin,
}

impl Field {
    /// Key used in error maps and payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Make => "make",
            Field::Model => "model",
            Field::Year => "year",
            Field::Mileage => "mileage",
            Field::Phone => "phone",
            Field::Name => "name",
            Field::Agreed => "agreed",
            Field::Vin => "vin",
        }
    }
}

/// Errors by field; empty means the form can be submitted.
pub type ValidationErrors = BTreeMap<Field, String>;

/// Checks a form snapshot against the configured rules.
#[derive(Clone, Debug)]
pub struct FormValidator {
    rules: ValidationRules,
    current_year: i32,
}

impl FormValidator {
    pub fn new(rules: ValidationRules, current_year: i32) -> Self {
        Self {
            rules,
            current_year,
        }
    }

    /// Run every rule; nothing short-circuits.
    pub fn validate(&self, form: &LeadForm, consent: bool) -> ValidationErrors {
        let v = &form.vehicle;
        let c = &form.contact;
        let mut errors = ValidationErrors::new();

        if v.make.trim().is_empty() {
            errors.insert(Field::Make, "Select the make".into());
        }
        if v.model.trim().is_empty() {
            errors.insert(Field::Model, "Enter the model".into());
        }
        match v.year {
            Some(y) if (self.rules.min_year..=self.current_year).contains(&y) => {}
            _ => {
                errors.insert(Field::Year, "Check the year".into());
            }
        }
        match v.mileage_km {
            Some(km) if km >= 0 => {}
            _ => {
                errors.insert(Field::Mileage, "Mileage is required".into());
            }
        }
        if phone::digit_count(&c.phone) < self.rules.phone_digits {
            errors.insert(Field::Phone, "Phone is required".into());
        }
        if c.name.trim().is_empty() {
            errors.insert(Field::Name, "How should we address you?".into());
        }
        if !consent {
            errors.insert(Field::Agreed, "Consent is required".into());
        }
        if !v.vin.is_empty() && !vin::check_vin(&v.vin).is_format_valid {
            errors.insert(Field::Vin, "VIN: invalid characters".into());
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn validator() -> FormValidator {
        FormValidator::new(Config::default().validation, 2026)
    }

    fn complete_form() -> LeadForm {
        LeadForm::new("Moscow")
            .with_make("BMW")
            .with_model("M5")
            .with_year("2015")
            .with_mileage("80000")
            .with_name("Andrey")
            .with_phone("89990001234")
    }

    #[test]
    fn test_empty_form_reports_seven_errors() {
        let errors = validator().validate(&LeadForm::new("Moscow"), false);
        let keys: Vec<&str> = errors.keys().map(|f| f.as_str()).collect();
        assert_eq!(
            keys,
            vec!["make", "model", "year", "mileage", "phone", "name", "agreed"]
        );
        assert!(!errors.contains_key(&Field::Vin));
    }

    #[test]
    fn test_complete_form_is_submittable() {
        assert!(validator().validate(&complete_form(), true).is_empty());
    }

    #[test]
    fn test_year_bounds() {
        let v = validator();
        assert!(v.validate(&complete_form().with_year("1985"), true).is_empty());
        assert!(v.validate(&complete_form().with_year("2026"), true).is_empty());
        assert!(v.validate(&complete_form().with_year("1984"), true).contains_key(&Field::Year));
        assert!(v.validate(&complete_form().with_year("2027"), true).contains_key(&Field::Year));
        assert!(v.validate(&complete_form().with_year("abc"), true).contains_key(&Field::Year));
    }

    #[test]
    fn test_mileage_zero_is_fine_negative_is_not() {
        let v = validator();
        assert!(v.validate(&complete_form().with_mileage("0"), true).is_empty());
        let errors = v.validate(&complete_form().with_mileage("-1"), true);
        assert_eq!(errors.get(&Field::Mileage).map(String::as_str), Some("Mileage is required"));
    }

    #[test]
    fn test_short_phone_is_rejected() {
        let errors = validator().validate(&complete_form().with_phone("7999000"), true);
        assert_eq!(errors.len(), 1);
        assert!(errors.contains_key(&Field::Phone));
    }

    #[test]
    fn test_vin_rules() {
        let v = validator();
        assert!(v.validate(&complete_form().with_vin(""), true).is_empty());
        assert!(v.validate(&complete_form().with_vin("WVWZZZ1JZXW000001"), true).is_empty());
        assert!(v.validate(&complete_form().with_vin("WVWZZZ1JZXW00000I"), true).contains_key(&Field::Vin));
        assert!(v.validate(&complete_form().with_vin("WVW"), true).contains_key(&Field::Vin));
    }

    #[test]
    fn test_missing_consent_only() {
        let errors = validator().validate(&complete_form(), false);
        assert_eq!(errors.keys().copied().collect::<Vec<_>>(), vec![Field::Agreed]);
    }
}
