//! Lead form model: vehicle listing, contact details, and the submitted record.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

use crate::{phone, vin};

/// Vehicle condition as chosen on the form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    Excellent,
    Good,
    Fair,
    NeedsRepair,
    AfterAccident,
}

impl Condition {
    /// All conditions in display order.
    pub const ALL: [Condition; 5] = [
        Condition::Excellent,
        Condition::Good,
        Condition::Fair,
        Condition::NeedsRepair,
        Condition::AfterAccident,
    ];

    /// Stable tag used in config and payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            Condition::Excellent => "excellent",
            Condition::Good => "good",
            Condition::Fair => "fair",
            Condition::NeedsRepair => "needs_repair",
            Condition::AfterAccident => "after_accident",
        }
    }
}

/// Vehicle attributes that drive the estimate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VehicleListing {
    /// Brand name from the configured catalog.
    pub make: String,
    /// Free-text model name.
    pub model: String,
    /// Model year; `None` when missing or not a number.
    pub year: Option<i32>,
    /// Odometer reading in km; `None` when missing or not a number.
    pub mileage_km: Option<i64>,
    pub condition: Option<Condition>,
    /// Uppercased VIN, empty when not provided.
    pub vin: String,
    /// Service city from the configured list.
    pub city: String,
}

impl VehicleListing {
    /// Empty listing located in `city`, condition defaulting to good.
    pub fn new(city: impl Into<String>) -> Self {
        Self {
            make: String::new(),
            model: String::new(),
            year: None,
            mileage_km: None,
            condition: Some(Condition::Good),
            vin: String::new(),
            city: city.into(),
        }
    }
}

/// Contact details of the seller.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub name: String,
    /// Phone in the canonical `+7 (XXX) XXX-XX-XX` form (possibly partial).
    pub phone: String,
    pub comment: String,
    /// Consent to be contacted and to personal data processing.
    pub consent: bool,
}

impl Default for ContactInfo {
    fn default() -> Self {
        Self {
            name: String::new(),
            phone: String::new(),
            comment: String::new(),
            consent: true,
        }
    }
}

/// Full form snapshot. Every `with_*` call returns a new snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LeadForm {
    pub vehicle: VehicleListing,
    pub contact: ContactInfo,
    /// Seller is considering a trade-in.
    pub trade_in: bool,
    /// The car is still under a loan.
    pub on_credit: bool,
}

impl LeadForm {
    /// Blank form for the given default city.
    pub fn new(default_city: impl Into<String>) -> Self {
        Self {
            vehicle: VehicleListing::new(default_city),
            contact: ContactInfo::default(),
            trade_in: false,
            on_credit: false,
        }
    }

    pub fn with_make(&self, make: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.vehicle.make = make.into();
        next
    }

    pub fn with_model(&self, model: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.vehicle.model = model.into();
        next
    }

    /// Parse the year from raw input; anything unparseable clears it.
    pub fn with_year(&self, raw: &str) -> Self {
        let mut next = self.clone();
        next.vehicle.year = raw.trim().parse().ok();
        next
    }

    /// Parse the mileage from raw input; anything unparseable clears it.
    pub fn with_mileage(&self, raw: &str) -> Self {
        let mut next = self.clone();
        next.vehicle.mileage_km = raw.trim().parse().ok();
        next
    }

    pub fn with_condition(&self, condition: Option<Condition>) -> Self {
        let mut next = self.clone();
        next.vehicle.condition = condition;
        next
    }

    /// Store the VIN uppercased and capped at 17 characters.
    pub fn with_vin(&self, raw: &str) -> Self {
        let mut next = self.clone();
        next.vehicle.vin = vin::mask(raw);
        next
    }

    pub fn with_city(&self, city: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.vehicle.city = city.into();
        next
    }

    pub fn with_name(&self, name: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.contact.name = name.into();
        next
    }

    /// Store the phone in canonical form.
    pub fn with_phone(&self, raw: &str) -> Self {
        let mut next = self.clone();
        next.contact.phone = phone::format_phone(raw);
        next
    }

    pub fn with_comment(&self, comment: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.contact.comment = comment.into();
        next
    }

    pub fn with_consent(&self, consent: bool) -> Self {
        let mut next = self.clone();
        next.contact.consent = consent;
        next
    }

    pub fn with_trade_in(&self, trade_in: bool) -> Self {
        let mut next = self.clone();
        next.trade_in = trade_in;
        next
    }

    pub fn with_on_credit(&self, on_credit: bool) -> Self {
        let mut next = self.clone();
        next.on_credit = on_credit;
        next
    }
}

/// Finalized lead handed to the submission sink.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LeadRecord {
    pub id: Uuid,
    /// RFC 3339 timestamp of the submit.
    pub submitted_at: String,
    pub vehicle: VehicleListing,
    pub contact: ContactInfo,
    pub trade_in: bool,
    pub on_credit: bool,
    /// Estimated offer shown to the seller at submit time.
    pub estimate: i64,
    pub photos: Vec<PathBuf>,
}

impl LeadRecord {
    /// Freeze a form snapshot into a record with a fresh id.
    pub fn from_form(form: &LeadForm, estimate: i64, photos: Vec<PathBuf>) -> Self {
        Self {
            id: Uuid::new_v4(),
            submitted_at: chrono::Local::now().to_rfc3339(),
            vehicle: form.vehicle.clone(),
            contact: form.contact.clone(),
            trade_in: form.trade_in,
            on_credit: form.on_credit,
            estimate,
            photos,
        }
    }
}

/// Where a lead is in its hand-off.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitStatus {
    /// Nothing sent yet.
    Idle,
    /// Waiting for the worker.
    Sending,
    /// Delivered; carries the destination description.
    Sent(String),
    Failed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_updates_leave_previous_snapshot_untouched() {
        let before = LeadForm::new("Moscow");
        let after = before.with_make("BMW").with_model("M5");

        assert_eq!(before.vehicle.make, "");
        assert_eq!(after.vehicle.make, "BMW");
        assert_eq!(after.vehicle.model, "M5");
    }

    #[test]
    fn test_numeric_fields_parse_or_clear() {
        let form = LeadForm::new("Moscow").with_year(" 2015 ").with_mileage("80000");
        assert_eq!(form.vehicle.year, Some(2015));
        assert_eq!(form.vehicle.mileage_km, Some(80_000));

        let form = form.with_year("twenty").with_mileage("");
        assert_eq!(form.vehicle.year, None);
        assert_eq!(form.vehicle.mileage_km, None);
    }

    #[test]
    fn test_phone_and_vin_are_canonicalized() {
        let form = LeadForm::new("Moscow")
            .with_phone("8 999 000 12 34")
            .with_vin("wvwzzz1jzxw000001extra");
        assert_eq!(form.contact.phone, "+7 (999) 000-12-34");
        assert_eq!(form.vehicle.vin, "WVWZZZ1JZXW000001");
    }

    #[test]
    fn test_defaults() {
        let form = LeadForm::new("Tver");
        assert_eq!(form.vehicle.condition, Some(Condition::Good));
        assert_eq!(form.vehicle.city, "Tver");
        assert!(form.contact.consent);
        assert!(!form.trade_in && !form.on_credit);
    }

    #[test]
    fn test_condition_tags_match_serde() {
        for c in Condition::ALL {
            let json = serde_json::to_string(&c).unwrap();
            assert_eq!(json, format!("\"{}\"", c.as_str()));
        }
    }
}
