//! Config model and persistence helpers.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

use crate::lead::Condition;

/// Top-level configuration stored in `config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Selectable values shown on the form.
    pub catalog: CatalogCfg,
    /// Price estimate constants.
    pub pricing: PricingRules,
    /// Form validation constants.
    pub validation: ValidationRules,
    /// Where validated leads are sent.
    pub submission: SubmissionCfg,
}

/// Select-field options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogCfg {
    /// Brands offered in the make selector.
    pub makes: Vec<String>,
    /// Service cities; the first one is the form default.
    pub cities: Vec<String>,
    /// Display labels for vehicle conditions.
    pub conditions: Vec<ConditionOption>,
}

/// One condition choice with its label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionOption {
    pub value: Condition,
    pub label: String,
}

impl CatalogCfg {
    /// Label for a condition, `None` when the catalog has no entry.
    pub fn condition_label(&self, condition: Condition) -> Option<&str> {
        self.conditions
            .iter()
            .find(|c| c.value == condition)
            .map(|c| c.label.as_str())
    }

    /// City preselected on a new form.
    pub fn default_city(&self) -> &str {
        self.cities.first().map(String::as_str).unwrap_or("")
    }
}

/// Constants of the price heuristic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingRules {
    /// Base value of a brand-new car.
    pub base_ceiling: i64,
    /// Base value lost per year of age.
    pub depreciation_per_year: i64,
    /// Lowest base value a known year can produce.
    pub base_floor: i64,
    /// Base value used when the year is unknown.
    pub fallback_base: i64,
    /// Lowest offer ever shown.
    pub min_price: i64,
    /// Mileage multiplier past the last bracket.
    pub over_bracket_multiplier: f64,
    /// Brands with high resale liquidity.
    pub premium_brands: Vec<String>,
    pub premium_multiplier: f64,
    /// Case-insensitive regex for performance trims.
    pub trim_pattern: String,
    pub trim_multiplier: f64,
    /// Ascending brackets: a mileage below `upper_km` gets `multiplier`.
    pub mileage_brackets: Vec<MileageBracket>,
    pub condition_multipliers: Vec<ConditionMultiplier>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MileageBracket {
    pub upper_km: i64,
    pub multiplier: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionMultiplier {
    pub condition: Condition,
    pub multiplier: f64,
}

/// Constants of the form validator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationRules {
    /// Oldest accepted model year.
    pub min_year: i32,
    /// Digits a complete phone number has.
    pub phone_digits: usize,
    /// Photos accepted per lead.
    pub max_photos: usize,
}

/// Submission target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionCfg {
    /// HTTP endpoint receiving multipart leads; empty writes to the outbox.
    pub endpoint: String,
    /// Directory used when no endpoint is set.
    pub outbox_dir: String,
    /// Request timeout for the HTTP endpoint.
    pub timeout_secs: u64,
}

impl Config {
    /// Load from disk or create defaults when missing.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            let s = fs::read_to_string(path)?;
            Ok(toml::from_str(&s)?)
        } else {
            let cfg = Self::default();
            cfg.save(path)?;
            Ok(cfg)
        }
    }

    /// Persist the config as pretty TOML.
    pub fn save(&self, path: &Path) -> Result<()> {
        let s = toml::to_string_pretty(self)?;
        fs::write(path, s)?;
        Ok(())
    }
}

fn strings(xs: &[&str]) -> Vec<String> {
    xs.iter().map(|s| s.to_string()).collect()
}

impl Default for Config {
    /// Defaults match the published pricing of the buyout service.
    fn default() -> Self {
        Self {
            catalog: CatalogCfg {
                makes: strings(&[
                    "Toyota",
                    "Honda",
                    "BMW",
                    "Mercedes-Benz",
                    "Audi",
                    "Lexus",
                    "Kia",
                    "Hyundai",
                    "Volkswagen",
                    "Ford",
                    "Chevrolet",
                    "Nissan",
                ]),
                cities: strings(&[
                    "Moscow",
                    "Saint Petersburg",
                    "Tver",
                    "Khimki",
                    "Krasnogorsk",
                    "Pushkino",
                    "Mytishchi",
                ]),
                conditions: Condition::ALL
                    .into_iter()
                    .zip([
                        "Excellent",
                        "Good",
                        "Fair",
                        "Needs repair",
                        "After an accident",
                    ])
                    .map(|(value, label)| ConditionOption {
                        value,
                        label: label.into(),
                    })
                    .collect(),
            },
            pricing: PricingRules {
                base_ceiling: 1_500_000,
                depreciation_per_year: 70_000,
                base_floor: 150_000,
                fallback_base: 200_000,
                min_price: 80_000,
                over_bracket_multiplier: 0.75,
                premium_brands: strings(&["BMW", "Mercedes-Benz", "Audi", "Lexus"]),
                premium_multiplier: 1.12,
                trim_pattern: r"AMG|M\d|RS|SRT".into(),
                trim_multiplier: 1.15,
                mileage_brackets: vec![
                    MileageBracket {
                        upper_km: 50_000,
                        multiplier: 1.05,
                    },
                    MileageBracket {
                        upper_km: 100_000,
                        multiplier: 0.95,
                    },
                    MileageBracket {
                        upper_km: 150_000,
                        multiplier: 0.85,
                    },
                ],
                condition_multipliers: [
                    (Condition::Excellent, 1.1),
                    (Condition::Good, 1.0),
                    (Condition::Fair, 0.9),
                    (Condition::NeedsRepair, 0.75),
                    (Condition::AfterAccident, 0.6),
                ]
                .into_iter()
                .map(|(condition, multiplier)| ConditionMultiplier {
                    condition,
                    multiplier,
                })
                .collect(),
            },
            validation: ValidationRules {
                min_year: 1985,
                phone_digits: 11,
                max_photos: 8,
            },
            submission: SubmissionCfg {
                endpoint: "".into(),
                outbox_dir: "leads".into(),
                timeout_secs: 15,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let cfg = Config::load_or_default(&path).unwrap();
        assert!(path.exists());
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn test_saved_changes_survive_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut cfg = Config::default();
        cfg.submission.endpoint = "https://crm.example/leads".into();
        cfg.pricing.min_price = 90_000;
        cfg.save(&path).unwrap();

        let loaded = Config::load_or_default(&path).unwrap();
        assert_eq!(loaded.submission.endpoint, "https://crm.example/leads");
        assert_eq!(loaded.pricing.min_price, 90_000);
        assert_eq!(loaded.pricing.condition_multipliers.len(), 5);
    }

    #[test]
    fn test_catalog_lookups() {
        let cfg = Config::default();
        assert_eq!(cfg.catalog.default_city(), "Moscow");
        assert_eq!(
            cfg.catalog.condition_label(Condition::NeedsRepair),
            Some("Needs repair")
        );
    }
}
