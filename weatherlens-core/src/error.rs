use reqwest::StatusCode;

/// Errors raised by the fetch pipeline and its collaborators.
///
/// Scoring and decision functions never return these: they operate on values
/// that were already validated when the provider response was parsed.
#[derive(Debug, thiserror::Error)]
pub enum AdvisorError {
    #[error("Location '{0}' not found")]
    LocationNotFound(String),

    #[error("{service} request failed with status {status}: {body}")]
    Upstream {
        service: &'static str,
        status: StatusCode,
        body: String,
    },

    #[error("'{0}' is not a 'lat,lon' coordinate pair")]
    MalformedInput(String),

    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to parse {service} response: {source}")]
    Parse {
        service: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Air quality index {0} is outside the 1-5 scale")]
    InvalidAirQuality(i64),

    #[error("No air quality reading available for this location")]
    MissingAirQuality,

    #[error("Forecast response contained no data")]
    EmptyForecast,

    #[error(
        "No API key configured.\n\
         Hint: run `weatherlens configure` or set WEATHERLENS_API_KEY."
    )]
    MissingApiKey,
}

pub type Result<T> = std::result::Result<T, AdvisorError>;

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
