//! Turn user input into coordinates and a display name.

use crate::{
    error::{AdvisorError, Result},
    model::ResolvedLocation,
    provider::Geocoder,
};

/// Parse `"lat,lon"` into two finite numbers. Whitespace around each part is ignored.
pub fn parse_coordinates(text: &str) -> Result<(f64, f64)> {
    let malformed = || AdvisorError::MalformedInput(text.to_string());

    let mut parts = text.split(',');
    let (Some(lat), Some(lon), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(malformed());
    };

    let lat: f64 = lat.trim().parse().map_err(|_| malformed())?;
    let lon: f64 = lon.trim().parse().map_err(|_| malformed())?;

    if !(lat.is_finite() && lon.is_finite()) {
        return Err(malformed());
    }

    Ok((lat, lon))
}

/// Coordinates are used as-is; anything else goes to the geocoder.
pub async fn resolve_location(text: &str, geocoder: &dyn Geocoder) -> Result<ResolvedLocation> {
    match parse_coordinates(text) {
        Ok((latitude, longitude)) => {
            return Ok(ResolvedLocation {
                latitude,
                longitude,
                name: text.to_string(),
            });
        }
        Err(err) => tracing::debug!("{err}, looking it up by name"),
    }

    let found = match geocoder.geocode(text).await {
        Ok(found) => found,
        Err(AdvisorError::Upstream { status, .. }) => {
            tracing::debug!(%status, "Geocoding lookup rejected");
            None
        }
        Err(err) => return Err(err),
    };

    let place = found.ok_or_else(|| AdvisorError::LocationNotFound(text.to_string()))?;
    tracing::info!(
        name = %place.name,
        lat = place.latitude,
        lon = place.longitude,
        "Resolved location"
    );
    Ok(place)
}
