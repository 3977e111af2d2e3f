//! Best-time selection, rain alerts and go/no-go decisions over a scored forecast.

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use crate::{
    error::{AdvisorError, Result},
    model::{
        AirQualityIndex, Decision, EventKind, EventQuery, ForecastSlot, Reason, ScoredSlot,
        Verdict,
    },
    scoring::ScoringConfig,
};

/// Forecast blocks consumed per session (3-hour cadence, 24 hours).
pub const MAX_SLOTS: usize = 8;

/// Hours covered by one forecast slot.
pub const SLOT_HOURS: u32 = 3;

const RAIN_THRESHOLD_MM: f64 = 0.5;
const HIGH_TEMPERATURE_C: f64 = 38.0;

/// First upcoming rain onset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RainAlert {
    pub slot_index: usize,
    pub lead_hours: u32,
    pub at: DateTime<FixedOffset>,
}

impl RainAlert {
    pub fn message(&self) -> String {
        format!("Rain likely in ~{} hours", self.lead_hours)
    }
}

/// A non-empty, time-ordered run of scored slots sharing one AQI reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredForecast {
    slots: Vec<ScoredSlot>,
    aqi: Option<AirQualityIndex>,
}

impl ScoredForecast {
    /// Score at most [`MAX_SLOTS`] slots in source order.
    pub fn build(
        slots: impl IntoIterator<Item = ForecastSlot>,
        aqi: Option<AirQualityIndex>,
        scoring: &ScoringConfig,
    ) -> Result<Self> {
        let slots: Vec<ScoredSlot> = slots
            .into_iter()
            .take(MAX_SLOTS)
            .map(|slot| scoring.score(slot, aqi))
            .collect();

        if slots.is_empty() {
            return Err(AdvisorError::EmptyForecast);
        }

        Ok(Self { slots, aqi })
    }

    pub fn slots(&self) -> &[ScoredSlot] {
        &self.slots
    }

    pub fn aqi(&self) -> Option<AirQualityIndex> {
        self.aqi
    }

    pub fn current(&self) -> &ScoredSlot {
        &self.slots[0]
    }

    pub fn high_c(&self) -> f64 {
        self.temperatures().fold(f64::NEG_INFINITY, f64::max)
    }

    pub fn low_c(&self) -> f64 {
        self.temperatures().fold(f64::INFINITY, f64::min)
    }

    fn temperatures(&self) -> impl Iterator<Item = f64> + '_ {
        self.slots.iter().map(|s| s.slot.temperature_c)
    }

    /// Highest composite score; the earliest slot wins a tie.
    pub fn best(&self) -> &ScoredSlot {
        self.slots
            .iter()
            .skip(1)
            .fold(&self.slots[0], |best, s| if s.score > best.score { s } else { best })
    }

    pub fn rain_alert(&self) -> Option<RainAlert> {
        rain_alert(self.slots.iter().map(|s| &s.slot))
    }

    /// Slot closest to `at`; the earliest slot wins a tie.
    pub fn nearest(&self, at: DateTime<FixedOffset>) -> &ScoredSlot {
        let distance = |s: &ScoredSlot| (s.slot.time - at).abs();
        self.slots.iter().skip(1).fold(&self.slots[0], |nearest, s| {
            if distance(s) < distance(nearest) { s } else { nearest }
        })
    }

    /// Decide whether an event at `query.time` today (relative to `now`) should go ahead.
    pub fn decide(&self, query: &EventQuery, now: DateTime<FixedOffset>) -> Decision {
        let at = query.resolve(now);
        let evidence = *self.nearest(at);
        tracing::debug!(event_at = %at, slot = %evidence.slot.time, "Evaluating event");
        decide(&evidence, self.aqi, query.kind)
    }
}

/// Report only the first slot with any precipitation.
pub fn rain_alert<'a>(slots: impl IntoIterator<Item = &'a ForecastSlot>) -> Option<RainAlert> {
    slots
        .into_iter()
        .enumerate()
        .find(|(_, slot)| slot.rain_mm > 0.0)
        .map(|(slot_index, slot)| RainAlert {
            slot_index,
            lead_hours: slot_index as u32 * SLOT_HOURS,
            at: slot.time,
        })
}

type Rule = fn(&ScoredSlot, Option<AirQualityIndex>, EventKind) -> Option<(Verdict, Reason)>;

/// Evaluated in order; each contributes at most one reason.
const RULES: [Rule; 3] = [rain_rule, air_quality_rule, heat_rule];

fn rain_rule(
    evidence: &ScoredSlot,
    _: Option<AirQualityIndex>,
    kind: EventKind,
) -> Option<(Verdict, Reason)> {
    (kind == EventKind::Outdoor && evidence.slot.rain_mm > RAIN_THRESHOLD_MM)
        .then_some((Verdict::NotRecommended, Reason::RainExpected))
}

fn air_quality_rule(
    _: &ScoredSlot,
    aqi: Option<AirQualityIndex>,
    kind: EventKind,
) -> Option<(Verdict, Reason)> {
    (kind == EventKind::Outdoor && aqi.is_some_and(|aqi| aqi.is_poor()))
        .then_some((Verdict::NotRecommended, Reason::PoorAirQuality))
}

fn heat_rule(
    evidence: &ScoredSlot,
    _: Option<AirQualityIndex>,
    _: EventKind,
) -> Option<(Verdict, Reason)> {
    (evidence.slot.temperature_c > HIGH_TEMPERATURE_C)
        .then_some((Verdict::Caution, Reason::HighTemperature))
}

/// Fold the rule outcomes over the severity lattice, keeping the maximum.
pub fn decide(evidence: &ScoredSlot, aqi: Option<AirQualityIndex>, kind: EventKind) -> Decision {
    let (verdict, reasons) = RULES
        .iter()
        .filter_map(|rule| rule(evidence, aqi, kind))
        .fold((Verdict::Safe, Vec::new()), |(verdict, mut reasons), (severity, reason)| {
            reasons.push(reason);
            (verdict.max(severity), reasons)
        });

    Decision {
        verdict,
        reasons,
        evidence: *evidence,
    }
}
