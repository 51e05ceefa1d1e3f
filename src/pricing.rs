//! Heuristic price estimate with a per-factor breakdown.

use anyhow::{Context, Result};
use regex::{Regex, RegexBuilder};

use crate::{
    config::{CatalogCfg, PricingRules},
    lead::{Condition, VehicleListing},
    money,
};

/// Which adjustment a factor represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FactorKind {
    Mileage,
    Condition,
    Brand,
    Trim,
}

impl FactorKind {
    pub fn label(self) -> &'static str {
        match self {
            FactorKind::Mileage => "Mileage adjustment",
            FactorKind::Condition => "Condition",
            FactorKind::Brand => "Brand / liquidity",
            FactorKind::Trim => "Trim / package",
        }
    }
}

/// One multiplicative adjustment and its human-readable note.
#[derive(Clone, Debug, PartialEq)]
pub struct FactorContribution {
    pub kind: FactorKind,
    pub multiplier: f64,
    pub explanation: String,
}

/// Estimate and how it was reached.
#[derive(Clone, Debug, PartialEq)]
pub struct PriceBreakdown {
    /// Value derived from the vehicle age alone.
    pub base_value: i64,
    /// Note for the base value, e.g. "11 years".
    pub base_note: String,
    /// Mileage, condition, brand and trim, in that order.
    pub factors: Vec<FactorContribution>,
    /// Offer after all factors and the price floor.
    pub final_value: i64,
}

impl PriceBreakdown {
    /// Product of all factor multipliers, applied in order.
    pub fn combined_multiplier(&self) -> f64 {
        self.factors.iter().fold(1.0, |acc, f| acc * f.multiplier)
    }

    /// Five display rows: `(label, note, value)`.
    pub fn rows(&self) -> Vec<(String, String, String)> {
        let mut rows = vec![(
            "Base price by year".to_string(),
            self.base_note.clone(),
            money::format_rub(self.base_value),
        )];
        rows.extend(self.factors.iter().map(|f| {
            (
                f.kind.label().to_string(),
                f.explanation.clone(),
                money::format_factor(f.multiplier),
            )
        }));
        rows
    }
}

/// Computes estimates from a fixed rule set and reference year.
#[derive(Clone, Debug)]
pub struct PriceEstimator {
    rules: PricingRules,
    catalog: CatalogCfg,
    trim: Regex,
    current_year: i32,
}

impl PriceEstimator {
    /// Build an estimator; fails only when the trim pattern does not compile.
    pub fn new(rules: PricingRules, catalog: CatalogCfg, current_year: i32) -> Result<Self> {
        let trim = RegexBuilder::new(&rules.trim_pattern)
            .case_insensitive(true)
            .build()
            .with_context(|| format!("invalid trim_pattern {:?}", rules.trim_pattern))?;
        Ok(Self {
            rules,
            catalog,
            trim,
            current_year,
        })
    }

    pub fn estimate(&self, vehicle: &VehicleListing) -> PriceBreakdown {
        let r = &self.rules;

        let (age, base_value) = match vehicle.year {
            Some(year) => {
                let age = i64::from(self.current_year.saturating_sub(year).max(0));
                let base = (r.base_ceiling - age * r.depreciation_per_year).max(r.base_floor);
                (age, base)
            }
            None => (0, r.fallback_base),
        };

        let factors = vec![
            FactorContribution {
                kind: FactorKind::Mileage,
                multiplier: self.mileage_multiplier(vehicle.mileage_km),
                explanation: match vehicle.mileage_km {
                    Some(km) => format!("{} km", money::group_digits(km)),
                    None => "no data".into(),
                },
            },
            FactorContribution {
                kind: FactorKind::Condition,
                multiplier: self.condition_multiplier(vehicle.condition),
                explanation: vehicle
                    .condition
                    .and_then(|c| self.catalog.condition_label(c))
                    .unwrap_or("—")
                    .to_string(),
            },
            FactorContribution {
                kind: FactorKind::Brand,
                multiplier: self.brand_multiplier(&vehicle.make),
                explanation: or_dash(&vehicle.make),
            },
            FactorContribution {
                kind: FactorKind::Trim,
                multiplier: self.trim_multiplier(&vehicle.model),
                explanation: or_dash(&vehicle.model),
            },
        ];

        let raw = factors
            .iter()
            .fold(base_value as f64, |acc, f| acc * f.multiplier)
            .round() as i64;

        PriceBreakdown {
            base_value,
            base_note: format!("{age} years"),
            factors,
            final_value: raw.max(r.min_price),
        }
    }

    /// First bracket whose upper bound exceeds the mileage; unknown mileage is neutral.
    pub fn mileage_multiplier(&self, mileage_km: Option<i64>) -> f64 {
        let Some(km) = mileage_km else {
            return 1.0;
        };
        self.rules
            .mileage_brackets
            .iter()
            .find(|b| km < b.upper_km)
            .map(|b| b.multiplier)
            .unwrap_or(self.rules.over_bracket_multiplier)
    }

    pub fn condition_multiplier(&self, condition: Option<Condition>) -> f64 {
        condition
            .and_then(|c| {
                self.rules
                    .condition_multipliers
                    .iter()
                    .find(|m| m.condition == c)
            })
            .map(|m| m.multiplier)
            .unwrap_or(1.0)
    }

    pub fn brand_multiplier(&self, make: &str) -> f64 {
        if self.rules.premium_brands.iter().any(|b| b == make) {
            self.rules.premium_multiplier
        } else {
            1.0
        }
    }

    pub fn trim_multiplier(&self, model: &str) -> f64 {
        if !model.is_empty() && self.trim.is_match(model) {
            self.rules.trim_multiplier
        } else {
            1.0
        }
    }
}

fn or_dash(s: &str) -> String {
    if s.is_empty() { "—".into() } else { s.into() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    const YEAR: i32 = 2026;

    fn estimator() -> PriceEstimator {
        let cfg = Config::default();
        PriceEstimator::new(cfg.pricing, cfg.catalog, YEAR).unwrap()
    }

    fn listing(make: &str, model: &str, year: Option<i32>, km: Option<i64>) -> VehicleListing {
        VehicleListing {
            make: make.into(),
            model: model.into(),
            year,
            mileage_km: km,
            ..VehicleListing::new("Moscow")
        }
    }

    #[test]
    fn test_bmw_m5_end_to_end() {
        let b = estimator().estimate(&listing("BMW", "M5", Some(2015), Some(80_000)));

        let age = i64::from(YEAR - 2015);
        let base = (1_500_000 - age * 70_000).max(150_000);
        assert_eq!(b.base_value, base);
        assert_eq!(b.base_note, "11 years");

        let multipliers: Vec<f64> = b.factors.iter().map(|f| f.multiplier).collect();
        assert_eq!(multipliers, vec![0.95, 1.0, 1.12, 1.15]);

        let expected = ((base as f64 * 0.95 * 1.0 * 1.12 * 1.15).round() as i64).max(80_000);
        assert_eq!(b.final_value, expected);
    }

    #[test]
    fn test_breakdown_reproduces_final_value() {
        let est = estimator();
        for (make, model, year, km) in [
            ("Audi", "RS6", Some(2020), Some(30_000)),
            ("Kia", "Rio", Some(2010), Some(210_000)),
            ("Lexus", "", None, None),
        ] {
            let b = est.estimate(&listing(make, model, year, km));
            let replay = b
                .factors
                .iter()
                .fold(b.base_value as f64, |acc, f| acc * f.multiplier)
                .round() as i64;
            assert_eq!(b.final_value, replay.max(80_000));
        }
    }

    #[test]
    fn test_unknown_year_uses_fallback_base() {
        let b = estimator().estimate(&listing("", "", None, None));
        assert_eq!(b.base_value, 200_000);
        assert_eq!(b.base_note, "0 years");
        assert_eq!(b.combined_multiplier(), 1.0);
        assert_eq!(b.factors[0].explanation, "no data");
        assert_eq!(b.factors[2].explanation, "—");
        assert_eq!(b.factors[3].explanation, "—");
    }

    #[test]
    fn test_future_year_counts_as_new() {
        let b = estimator().estimate(&listing("Ford", "Focus", Some(YEAR + 3), Some(0)));
        assert_eq!(b.base_value, 1_500_000);
    }

    #[test]
    fn test_old_wreck_hits_price_floor() {
        let mut v = listing("Nissan", "Almera", Some(1990), Some(400_000));
        v.condition = Some(Condition::AfterAccident);
        let b = estimator().estimate(&v);
        assert_eq!(b.base_value, 150_000);
        // 150 000 × 0.75 × 0.6 = 67 500, below the floor.
        assert_eq!(b.final_value, 80_000);
    }

    #[test]
    fn test_final_value_never_below_floor() {
        let est = estimator();
        for year in [None, Some(1900), Some(1985), Some(2000), Some(YEAR)] {
            for km in [None, Some(-5), Some(0), Some(99_999), Some(1_000_000)] {
                for condition in [None, Some(Condition::AfterAccident), Some(Condition::Excellent)] {
                    let mut v = listing("Chevrolet", "Aveo", year, km);
                    v.condition = condition;
                    assert!(est.estimate(&v).final_value >= 80_000);
                }
            }
        }
    }

    #[test]
    fn test_mileage_multiplier_is_monotone() {
        let est = estimator();
        let samples = [0, 49_999, 50_000, 99_999, 100_000, 149_999, 150_000, 500_000];
        let ms: Vec<f64> = samples
            .iter()
            .map(|km| est.mileage_multiplier(Some(*km)))
            .collect();
        assert!(ms.windows(2).all(|w| w[1] <= w[0]), "{ms:?}");
        assert_eq!(est.mileage_multiplier(Some(150_000)), 0.75);
        assert_eq!(est.mileage_multiplier(None), 1.0);
    }

    #[test]
    fn test_condition_table() {
        let est = estimator();
        assert_eq!(est.condition_multiplier(Some(Condition::Excellent)), 1.1);
        assert_eq!(est.condition_multiplier(Some(Condition::NeedsRepair)), 0.75);
        assert_eq!(est.condition_multiplier(None), 1.0);
    }

    #[test]
    fn test_condition_missing_from_config_is_neutral() {
        let mut cfg = Config::default();
        cfg.pricing.condition_multipliers.clear();
        let est = PriceEstimator::new(cfg.pricing, cfg.catalog, YEAR).unwrap();
        assert_eq!(est.condition_multiplier(Some(Condition::Fair)), 1.0);
    }

    #[test]
    fn test_trim_pattern_is_case_insensitive() {
        let est = estimator();
        assert_eq!(est.trim_multiplier("e63 amg"), 1.15);
        assert_eq!(est.trim_multiplier("M3"), 1.15);
        assert_eq!(est.trim_multiplier("Challenger SRT"), 1.15);
        assert_eq!(est.trim_multiplier("Camry"), 1.0);
        assert_eq!(est.trim_multiplier(""), 1.0);
    }

    #[test]
    fn test_premium_brand_requires_exact_name() {
        let est = estimator();
        assert_eq!(est.brand_multiplier("Mercedes-Benz"), 1.12);
        assert_eq!(est.brand_multiplier("Toyota"), 1.0);
        assert_eq!(est.brand_multiplier("bmw"), 1.0);
    }

    #[test]
    fn test_invalid_trim_pattern_is_rejected() {
        let mut cfg = Config::default();
        cfg.pricing.trim_pattern = "(AMG".into();
        assert!(PriceEstimator::new(cfg.pricing, cfg.catalog, YEAR).is_err());
    }

    #[test]
    fn test_rows_render_five_entries() {
        let b = estimator().estimate(&listing("BMW", "M5", Some(2015), Some(80_000)));
        let rows = b.rows();
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0].2, "730 000 ₽");
        assert_eq!(rows[1].1, "80 000 km");
        assert_eq!(rows[1].2, "× 0.95");
        assert_eq!(rows[2].1, "Good");
    }
}
