use crate::{
    Config,
    error::{AdvisorError, Result},
    model::{AirQualityIndex, ForecastSlot, ResolvedLocation},
    provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// Name lookup for free-text locations.
#[async_trait]
pub trait Geocoder: Send + Sync + Debug {
    /// First match for `name`, or `None` when the lookup finds nothing.
    async fn geocode(&self, name: &str) -> Result<Option<ResolvedLocation>>;
}

/// Forecast and air-quality readings for a coordinate pair.
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    /// Time-ordered forecast slots, validated and converted to °C.
    async fn forecast(&self, latitude: f64, longitude: f64) -> Result<Vec<ForecastSlot>>;

    /// Current air-quality reading, `None` when the provider has none.
    async fn air_quality(&self, latitude: f64, longitude: f64) -> Result<Option<AirQualityIndex>>;
}

/// Construct the OpenWeather provider from config.
pub fn provider_from_config(config: &Config) -> Result<OpenWeatherProvider> {
    let api_key = config.api_key().ok_or(AdvisorError::MissingApiKey)?;

    OpenWeatherProvider::new(
        api_key.to_owned(),
        config.units,
        config.display_offset(),
        config.request_timeout(),
    )
}
