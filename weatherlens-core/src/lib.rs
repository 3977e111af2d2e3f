//! Core library for the `weatherlens` CLI.
//!
//! This crate defines:
//! - Configuration loading and the API credential
//! - Location resolution (coordinates or geocoded names)
//! - The OpenWeather provider behind the `Geocoder` / `WeatherSource` traits
//! - Comfort scoring, best-time selection, rain alerts and event decisions
//! - The fetch pipeline producing an immutable `Session` snapshot
//!
//! It is used by `weatherlens-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod engine;
pub mod error;
pub mod location;
pub mod model;
pub mod provider;
pub mod scoring;
pub mod session;

pub use config::Config;
pub use engine::{RainAlert, ScoredForecast};
pub use error::AdvisorError;
pub use model::{
    AirQualityIndex, Decision, EventKind, EventQuery, ForecastSlot, Reason, ResolvedLocation,
    ScoredSlot, Units, Verdict,
};
pub use provider::{Geocoder, WeatherSource};
pub use scoring::{MissingAqiPolicy, ScoringConfig};
pub use session::{Advisor, Session};
