//! Comfort scoring primitives.
//!
//! All functions here are pure and total over their documented domains.
//! Inputs are expected to be validated by the provider layer.

use serde::{Deserialize, Serialize};

use crate::{
    error::{AdvisorError, Result},
    model::{AirQualityIndex, ForecastSlot, ScoredSlot},
};

/// Width of the linear decay above the ideal band, in °C.
const HIGH_DECAY_SPAN_C: f64 = 20.0;

/// Precipitation at which the rain sub-score reaches zero, in mm per 3h.
const RAIN_ZERO_MM: f64 = 5.0;

/// What to do when the provider has no current air-quality reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum MissingAqiPolicy {
    /// Score air quality as best-case (1.0).
    #[default]
    AssumeBest,
    /// Refuse to build a session without a reading.
    Fail,
}

impl MissingAqiPolicy {
    pub fn apply(&self, aqi: Option<AirQualityIndex>) -> Result<Option<AirQualityIndex>> {
        match (aqi, self) {
            (Some(aqi), _) => Ok(Some(aqi)),
            (None, MissingAqiPolicy::AssumeBest) => {
                tracing::warn!("No air quality reading, scoring it as best-case");
                Ok(None)
            }
            (None, MissingAqiPolicy::Fail) => Err(AdvisorError::MissingAirQuality),
        }
    }
}

/// Ideal temperature band and composite weights.
///
/// The weights are expected to sum to 1.0; nothing renormalizes them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub ideal_low: f64,
    pub ideal_high: f64,
    pub weight_temperature: f64,
    pub weight_rain: f64,
    pub weight_air_quality: f64,
    pub missing_aqi: MissingAqiPolicy,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            ideal_low: 18.0,
            ideal_high: 28.0,
            weight_temperature: 0.40,
            weight_rain: 0.35,
            weight_air_quality: 0.25,
            missing_aqi: MissingAqiPolicy::AssumeBest,
        }
    }
}

impl ScoringConfig {
    /// Trapezoid: 1 inside `[ideal_low, ideal_high]`, `t / ideal_low` below it,
    /// `1 - (t - ideal_high) / 20` above it, never below 0.
    pub fn temperature_score(&self, t: f64) -> f64 {
        if (self.ideal_low..=self.ideal_high).contains(&t) {
            1.0
        } else if t < self.ideal_low {
            (t / self.ideal_low).max(0.0)
        } else {
            (1.0 - (t - self.ideal_high) / HIGH_DECAY_SPAN_C).max(0.0)
        }
    }

    pub fn composite_score(&self, slot: &ForecastSlot, aqi: Option<AirQualityIndex>) -> f64 {
        self.weight_temperature * self.temperature_score(slot.temperature_c)
            + self.weight_rain * rain_score(slot.rain_mm)
            + self.weight_air_quality * air_quality_score(aqi)
    }

    pub fn score(&self, slot: ForecastSlot, aqi: Option<AirQualityIndex>) -> ScoredSlot {
        ScoredSlot {
            score: self.composite_score(&slot, aqi),
            slot,
        }
    }
}

/// `1 - mm / 5`, floored at 0.
pub fn rain_score(mm: f64) -> f64 {
    (1.0 - mm / RAIN_ZERO_MM).max(0.0)
}

/// `(6 - aqi) / 5`; a missing reading counts as best-case.
pub fn air_quality_score(aqi: Option<AirQualityIndex>) -> f64 {
    match aqi {
        Some(aqi) => (6.0 - f64::from(aqi.value())) / 5.0,
        None => 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn slot(temperature_c: f64, rain_mm: f64) -> ForecastSlot {
        ForecastSlot {
            time: DateTime::from_timestamp(1_760_000_000, 0)
                .unwrap()
                .fixed_offset(),
            temperature_c,
            rain_mm,
        }
    }

    fn aqi(v: i64) -> Option<AirQualityIndex> {
        Some(AirQualityIndex::try_from(v).unwrap())
    }

    #[test]
    fn temperature_is_flat_inside_ideal_band() {
        let cfg = ScoringConfig::default();
        for t in [18.0, 20.5, 23.0, 27.9, 28.0] {
            assert_eq!(cfg.temperature_score(t), 1.0, "t = {t}");
        }
    }

    #[test]
    fn temperature_ramps_up_towards_low_edge() {
        let cfg = ScoringConfig::default();
        assert_eq!(cfg.temperature_score(0.0), 0.0);
        assert!(cfg.temperature_score(17.999) < 1.0);

        let mut prev = cfg.temperature_score(0.0);
        for t in 1..18 {
            let s = cfg.temperature_score(t as f64);
            assert!(s > prev);
            prev = s;
        }
        assert!((cfg.temperature_score(9.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn temperature_never_negative() {
        let cfg = ScoringConfig::default();
        for t in [-40.0, -0.1, 48.0, 60.0, 100.0] {
            assert!(cfg.temperature_score(t) >= 0.0, "t = {t}");
        }
        assert_eq!(cfg.temperature_score(-10.0), 0.0);
    }

    #[test]
    fn temperature_decays_to_zero_twenty_degrees_above_band() {
        let cfg = ScoringConfig::default();
        assert!((cfg.temperature_score(38.0) - 0.5).abs() < 1e-12);
        assert_eq!(cfg.temperature_score(48.0), 0.0);
        assert_eq!(cfg.temperature_score(55.0), 0.0);
    }

    #[test]
    fn temperature_follows_configured_band() {
        let cfg = ScoringConfig {
            ideal_low: 10.0,
            ideal_high: 15.0,
            ..ScoringConfig::default()
        };
        assert_eq!(cfg.temperature_score(12.0), 1.0);
        assert!((cfg.temperature_score(5.0) - 0.5).abs() < 1e-12);
        assert!((cfg.temperature_score(25.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn rain_score_is_linear_then_floored() {
        assert_eq!(rain_score(0.0), 1.0);
        assert!((rain_score(2.5) - 0.5).abs() < 1e-12);
        assert_eq!(rain_score(5.0), 0.0);
        assert_eq!(rain_score(7.5), 0.0);
        assert_eq!(rain_score(40.0), 0.0);
        assert!(rain_score(1.0) >= rain_score(1.5));
    }

    #[test]
    fn air_quality_score_decreases_with_index() {
        assert_eq!(air_quality_score(aqi(1)), 1.0);
        assert!((air_quality_score(aqi(5)) - 0.2).abs() < 1e-12);
        let scores: Vec<f64> = (1..=5).map(|v| air_quality_score(aqi(v))).collect();
        assert!(scores.windows(2).all(|w| w[0] > w[1]));
        assert_eq!(air_quality_score(None), 1.0);
    }

    #[test]
    fn composite_is_weighted_sum() {
        let cfg = ScoringConfig::default();
        assert!((cfg.composite_score(&slot(23.0, 0.0), aqi(1)) - 1.0).abs() < 1e-12);

        // 0.4 * 0.5 + 0.35 * 0.5 + 0.25 * 0.6
        let s = cfg.composite_score(&slot(38.0, 2.5), aqi(3));
        assert!((s - 0.525).abs() < 1e-12);
    }

    #[test]
    fn composite_does_not_renormalize_weights() {
        let cfg = ScoringConfig {
            weight_temperature: 1.0,
            weight_rain: 1.0,
            weight_air_quality: 1.0,
            ..ScoringConfig::default()
        };
        assert!((cfg.composite_score(&slot(23.0, 0.0), None) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn missing_aqi_policy() {
        assert_eq!(MissingAqiPolicy::AssumeBest.apply(None).unwrap(), None);
        assert_eq!(MissingAqiPolicy::Fail.apply(aqi(2)).unwrap(), aqi(2));
        assert!(matches!(
            MissingAqiPolicy::Fail.apply(None),
            Err(AdvisorError::MissingAirQuality)
        ));
    }
}
