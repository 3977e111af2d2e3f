use chrono::{DateTime, FixedOffset, NaiveTime, TimeDelta};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::error::AdvisorError;

/// Unit system requested from the forecast provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
    Standard,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
            Units::Standard => "standard",
        }
    }

    pub const fn all() -> &'static [Units] {
        &[Units::Metric, Units::Imperial, Units::Standard]
    }

    /// Convert a temperature reported in this unit system to °C.
    pub fn to_celsius(&self, value: f64) -> f64 {
        match self {
            Units::Metric => value,
            Units::Imperial => (value - 32.0) * 5.0 / 9.0,
            Units::Standard => value - 273.15,
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coordinates plus the name shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub name: String,
}

/// One 3-hour forecast bucket, already converted to the display offset and °C.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastSlot {
    pub time: DateTime<FixedOffset>,
    pub temperature_c: f64,
    /// Precipitation over the 3-hour bucket, never negative.
    pub rain_mm: f64,
}

/// Current air-quality reading on the 1 (good) to 5 (very poor) scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct AirQualityIndex(u8);

impl AirQualityIndex {
    pub const GOOD: AirQualityIndex = AirQualityIndex(1);
    pub const VERY_POOR: AirQualityIndex = AirQualityIndex(5);

    pub fn value(&self) -> u8 {
        self.0
    }

    pub fn label(&self) -> &'static str {
        match self.0 {
            1 => "Good",
            2 => "Fair",
            3 => "Moderate",
            4 => "Poor",
            _ => "Very Poor",
        }
    }

    /// Readings of 4 and 5 are unsafe for long stays outdoors.
    pub fn is_poor(&self) -> bool {
        self.0 >= 4
    }
}

impl TryFrom<i64> for AirQualityIndex {
    type Error = AdvisorError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1..=5 => Ok(AirQualityIndex(value as u8)),
            _ => Err(AdvisorError::InvalidAirQuality(value)),
        }
    }
}

impl From<AirQualityIndex> for u8 {
    fn from(aqi: AirQualityIndex) -> Self {
        aqi.0
    }
}

impl fmt::Display for AirQualityIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredSlot {
    pub slot: ForecastSlot,
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    #[default]
    Outdoor,
    Indoor,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Outdoor => "outdoor",
            EventKind::Indoor => "indoor",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "outdoor" => Ok(EventKind::Outdoor),
            "indoor" => Ok(EventKind::Indoor),
            _ => Err(format!("Unknown event type '{s}'. Expected outdoor or indoor.")),
        }
    }
}

/// A planned event: a time of day today plus its category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventQuery {
    pub time: NaiveTime,
    pub kind: EventKind,
}

impl EventQuery {
    pub fn new(time: NaiveTime, kind: EventKind) -> Self {
        Self { time, kind }
    }

    /// Place the event on `now`'s calendar date, in `now`'s offset.
    pub fn resolve(&self, now: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
        let offset = *now.offset();
        let local = now.date_naive().and_time(self.time);
        let utc = local - TimeDelta::seconds(i64::from(offset.local_minus_utc()));
        DateTime::from_naive_utc_and_offset(utc, offset)
    }
}

/// Severity lattice: `Safe < Caution < NotRecommended`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum Verdict {
    #[default]
    Safe,
    Caution,
    NotRecommended,
}

impl Verdict {
    pub fn headline(&self) -> &'static str {
        match self {
            Verdict::Safe => "Safe to go",
            Verdict::Caution => "Go with caution",
            Verdict::NotRecommended => "Not recommended",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Reason {
    RainExpected,
    PoorAirQuality,
    HighTemperature,
}

impl Reason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Reason::RainExpected => "rain expected",
            Reason::PoorAirQuality => "poor air quality",
            Reason::HighTemperature => "high temperature",
        }
    }

    /// Longer sentence for display.
    pub fn explanation(&self) -> &'static str {
        match self {
            Reason::RainExpected => "Rain is expected around this time.",
            Reason::PoorAirQuality => "Air quality is poor and unsafe outdoors.",
            Reason::HighTemperature => "High temperature may cause discomfort.",
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub verdict: Verdict,
    pub reasons: Vec<Reason>,
    /// The forecast slot nearest to the event time.
    pub evidence: ScoredSlot,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike};

    #[test]
    fn aqi_accepts_only_one_to_five() {
        for v in 1..=5 {
            assert_eq!(AirQualityIndex::try_from(v).unwrap().value() as i64, v);
        }
        assert!(matches!(
            AirQualityIndex::try_from(0),
            Err(AdvisorError::InvalidAirQuality(0))
        ));
        assert!(AirQualityIndex::try_from(6).is_err());
        assert!(AirQualityIndex::try_from(-1).is_err());
    }

    #[test]
    fn aqi_labels_and_poor_threshold() {
        let labels: Vec<_> = (1..=5)
            .map(|v| AirQualityIndex::try_from(v).unwrap().label())
            .collect();
        assert_eq!(labels, ["Good", "Fair", "Moderate", "Poor", "Very Poor"]);
        assert!(!AirQualityIndex::try_from(3).unwrap().is_poor());
        assert!(AirQualityIndex::try_from(4).unwrap().is_poor());
    }

    #[test]
    fn aqi_deserialization_validates_range() {
        let ok: AirQualityIndex = serde_json::from_str("2").unwrap();
        assert_eq!(ok.value(), 2);
        assert!(serde_json::from_str::<AirQualityIndex>("9").is_err());
    }

    #[test]
    fn verdict_severity_is_ordered() {
        assert!(Verdict::Safe < Verdict::Caution);
        assert!(Verdict::Caution < Verdict::NotRecommended);
        assert_eq!(Verdict::default(), Verdict::Safe);
    }

    #[test]
    fn event_kind_parses_case_insensitively() {
        assert_eq!("Outdoor".parse::<EventKind>(), Ok(EventKind::Outdoor));
        assert_eq!(" indoor ".parse::<EventKind>(), Ok(EventKind::Indoor));
        assert!("picnic".parse::<EventKind>().is_err());
    }

    #[test]
    fn event_resolves_to_today_in_same_offset() {
        let ist = FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap();
        let now = NaiveDate::from_ymd_opt(2026, 10, 18)
            .unwrap()
            .and_hms_opt(9, 15, 0)
            .unwrap()
            .and_local_timezone(ist)
            .unwrap();

        let time = NaiveTime::from_hms_opt(18, 30, 0).unwrap();
        let query = EventQuery::new(time, EventKind::Outdoor);
        let at = query.resolve(now);

        assert_eq!(at.date_naive(), now.date_naive());
        assert_eq!((at.hour(), at.minute()), (18, 30));
        assert_eq!(at.offset(), &ist);
    }

    #[test]
    fn units_convert_to_celsius() {
        assert_eq!(Units::Metric.to_celsius(21.5), 21.5);
        assert!((Units::Imperial.to_celsius(212.0) - 100.0).abs() < 1e-9);
        assert!((Units::Standard.to_celsius(273.15)).abs() < 1e-9);
    }
}
