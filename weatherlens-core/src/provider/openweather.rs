use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};
use std::time::Duration;

use crate::{
    engine::MAX_SLOTS,
    error::{AdvisorError, Result, truncate_body},
    model::{AirQualityIndex, ForecastSlot, ResolvedLocation, Units},
};

use super::{Geocoder, WeatherSource};

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    units: Units,
    offset: FixedOffset,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(
        api_key: String,
        units: Units,
        offset: FixedOffset,
        timeout: Duration,
    ) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            units,
            offset,
            http,
        })
    }

    /// Point the provider at another host, e.g. a local mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        service: &'static str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, service, "Sending request");

        let res = self
            .http
            .get(&url)
            .query(query)
            .query(&[("appid", self.api_key.as_str())])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(AdvisorError::Upstream {
                service,
                status,
                body: truncate_body(&body),
            });
        }

        serde_json::from_str(&body).map_err(|source| AdvisorError::Parse { service, source })
    }

    fn to_slot(&self, entry: OwForecastEntry) -> Result<ForecastSlot> {
        let time = DateTime::from_timestamp(entry.dt, 0)
            .ok_or_else(|| AdvisorError::Parse {
                service: "OpenWeather forecast",
                source: serde::de::Error::custom(format!("timestamp {} out of range", entry.dt)),
            })?
            .with_timezone(&self.offset);

        let rain_mm = entry.rain.map_or(0.0, |r| r.three_hours).max(0.0);

        Ok(ForecastSlot {
            time,
            temperature_c: self.units.to_celsius(entry.main.temp),
            rain_mm,
        })
    }
}

fn coordinates(latitude: f64, longitude: f64) -> [(&'static str, String); 2] {
    [("lat", latitude.to_string()), ("lon", longitude.to_string())]
}

#[derive(Debug, Deserialize)]
struct OwPlace {
    name: String,
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwRain {
    #[serde(rename = "3h", default)]
    three_hours: f64,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwMain,
    #[serde(default)]
    rain: Option<OwRain>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}

#[derive(Debug, Deserialize)]
struct OwPollutionMain {
    aqi: i64,
}

#[derive(Debug, Deserialize)]
struct OwPollutionEntry {
    main: OwPollutionMain,
}

#[derive(Debug, Deserialize)]
struct OwPollutionResponse {
    list: Vec<OwPollutionEntry>,
}

#[async_trait]
impl Geocoder for OpenWeatherProvider {
    async fn geocode(&self, name: &str) -> Result<Option<ResolvedLocation>> {
        let places: Vec<OwPlace> = self
            .get_json(
                "OpenWeather geocoding",
                "/geo/1.0/direct",
                &[("q", name.to_string()), ("limit", "1".to_string())],
            )
            .await?;

        Ok(places.into_iter().next().map(|p| ResolvedLocation {
            latitude: p.lat,
            longitude: p.lon,
            name: p.name,
        }))
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherProvider {
    async fn forecast(&self, latitude: f64, longitude: f64) -> Result<Vec<ForecastSlot>> {
        let [lat, lon] = coordinates(latitude, longitude);
        let parsed: OwForecastResponse = self
            .get_json(
                "OpenWeather forecast",
                "/data/2.5/forecast",
                &[lat, lon, ("units", self.units.as_str().to_string())],
            )
            .await?;

        tracing::debug!(blocks = parsed.list.len(), "Parsed forecast");

        parsed
            .list
            .into_iter()
            .take(MAX_SLOTS)
            .map(|entry| self.to_slot(entry))
            .collect()
    }

    async fn air_quality(&self, latitude: f64, longitude: f64) -> Result<Option<AirQualityIndex>> {
        let parsed: OwPollutionResponse = self
            .get_json(
                "OpenWeather air pollution",
                "/data/2.5/air_pollution",
                &coordinates(latitude, longitude),
            )
            .await?;

        parsed
            .list
            .first()
            .map(|entry| AirQualityIndex::try_from(entry.main.aqi))
            .transpose()
    }
}
