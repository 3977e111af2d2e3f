use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;
use std::sync::Arc;

use crate::{
    Config,
    engine::{RainAlert, ScoredForecast},
    error::Result,
    location::resolve_location,
    model::{AirQualityIndex, Decision, EventQuery, ResolvedLocation, ScoredSlot},
    provider::{Geocoder, WeatherSource, provider_from_config},
    scoring::ScoringConfig,
};

/// Everything one fetch produced. Never updated in place; a new fetch builds a new one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    pub place: ResolvedLocation,
    pub forecast: ScoredForecast,
    pub rain_alert: Option<RainAlert>,
    pub fetched_at: DateTime<FixedOffset>,
}

impl Session {
    pub fn aqi(&self) -> Option<AirQualityIndex> {
        self.forecast.aqi()
    }

    pub fn air_quality_label(&self) -> &'static str {
        self.aqi().map_or("Unknown", |aqi| aqi.label())
    }

    pub fn best(&self) -> &ScoredSlot {
        self.forecast.best()
    }

    /// Decide for an event today, relative to `now`.
    pub fn check(&self, query: &EventQuery, now: DateTime<FixedOffset>) -> Decision {
        self.forecast.decide(query, now)
    }

    /// Decide for an event today, relative to the current time in the display offset.
    pub fn check_now(&self, query: &EventQuery) -> Decision {
        self.check(query, Utc::now().with_timezone(self.fetched_at.offset()))
    }
}

/// Runs the geocode → forecast → air quality sequence and scores the result.
#[derive(Debug, Clone)]
pub struct Advisor {
    geocoder: Arc<dyn Geocoder>,
    source: Arc<dyn WeatherSource>,
    scoring: ScoringConfig,
    offset: FixedOffset,
}

impl Advisor {
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        source: Arc<dyn WeatherSource>,
        scoring: ScoringConfig,
        offset: FixedOffset,
    ) -> Self {
        Self {
            geocoder,
            source,
            scoring,
            offset,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let provider = Arc::new(provider_from_config(config)?);
        Ok(Self::new(
            provider.clone(),
            provider,
            config.scoring,
            config.display_offset(),
        ))
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub async fn fetch(&self, location: &str) -> Result<Session> {
        let place = resolve_location(location, self.geocoder.as_ref()).await?;

        let slots = self.source.forecast(place.latitude, place.longitude).await?;
        let aqi = self.source.air_quality(place.latitude, place.longitude).await?;
        let aqi = self.scoring.missing_aqi.apply(aqi)?;

        let forecast = ScoredForecast::build(slots, aqi, &self.scoring)?;
        let rain_alert = forecast.rain_alert();

        tracing::info!(
            place = %place.name,
            slots = forecast.slots().len(),
            aqi = ?aqi.map(|a| a.value()),
            "Built forecast session"
        );

        Ok(Session {
            place,
            forecast,
            rain_alert,
            fetched_at: Utc::now().with_timezone(&self.offset),
        })
    }
}
