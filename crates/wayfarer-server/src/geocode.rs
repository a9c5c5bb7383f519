//! Address to coordinates lookup.
//!
//! Uses enum dispatch instead of a trait object so the async lookup needs
//! no boxing. Lookups never fail the surrounding request: any problem is
//! logged and reported as "no location".

use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};
use wayfarer_types::GeoPoint;

use crate::config::GeocodingConfig;

/// Errors while setting up a geocoder.
#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    /// The HTTP client could not be built.
    #[error("failed to build geocoding client: {0}")]
    Client(#[from] reqwest::Error),
}

/// A geocoding backend.
#[derive(Debug, Clone)]
pub enum Geocoder {
    /// No key configured; every lookup returns `None`.
    Disabled,
    /// `AMap` web service geocoding.
    Amap(AmapGeocoder),
}

impl Geocoder {
    /// Build the geocoder described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Client`] if the HTTP client cannot be built.
    pub fn from_config(config: &GeocodingConfig) -> Result<Self, GeocodeError> {
        match config.api_key.as_deref().filter(|k| !k.is_empty()) {
            Some(key) => Ok(Self::Amap(AmapGeocoder::new(config, key)?)),
            None => Ok(Self::Disabled),
        }
    }

    /// Resolve `address`, or `None` if it cannot be resolved.
    pub async fn geocode(&self, address: &str) -> Option<GeoPoint> {
        let address = address.trim();
        if address.is_empty() {
            return None;
        }
        match self {
            Self::Disabled => None,
            Self::Amap(backend) => backend.geocode(address).await,
        }
    }

    /// Human-readable name for logging.
    pub const fn name(&self) -> &str {
        match self {
            Self::Disabled => "disabled",
            Self::Amap(_) => "amap",
        }
    }
}

/// Client for the `AMap` geocode endpoint.
///
/// Sends `GET {endpoint}?address=..&key=..[&city=..]` and reads the first
/// `geocodes[].location`, which is a `"longitude,latitude"` string.
#[derive(Debug, Clone)]
pub struct AmapGeocoder {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    city: Option<String>,
}

impl AmapGeocoder {
    /// Create a client with the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Client`] if the HTTP client cannot be built.
    pub fn new(config: &GeocodingConfig, api_key: &str) -> Result<Self, GeocodeError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: api_key.to_owned(),
            city: config.city.clone(),
        })
    }

    async fn geocode(&self, address: &str) -> Option<GeoPoint> {
        let mut query = vec![("address", address), ("key", self.api_key.as_str())];
        if let Some(city) = self.city.as_deref() {
            query.push(("city", city));
        }

        let response = match self.client.get(&self.endpoint).query(&query).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(address, error = %e, "geocoding request failed");
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!(address, %status, "geocoding service returned an error status");
            return None;
        }

        let json: Value = match response.json().await {
            Ok(json) => json,
            Err(e) => {
                warn!(address, error = %e, "geocoding response parse failed");
                return None;
            }
        };

        let point = parse_amap_location(&json);
        match point {
            Some(point) => debug!(
                address,
                latitude = point.latitude,
                longitude = point.longitude,
                "address geocoded"
            ),
            None => warn!(address, "geocoding returned no usable location"),
        }
        point
    }
}

/// Extract the first location from an `AMap` geocode response.
fn parse_amap_location(json: &Value) -> Option<GeoPoint> {
    if json.get("status").and_then(Value::as_str) != Some("1") {
        return None;
    }
    let location = json
        .get("geocodes")
        .and_then(|g| g.get(0))
        .and_then(|g| g.get("location"))
        .and_then(Value::as_str)?;

    let (lon, lat) = location.split_once(',')?;
    let longitude: f64 = lon.trim().parse().ok()?;
    let latitude: f64 = lat.trim().parse().ok()?;
    let in_range = (-90.0..=90.0).contains(&latitude) && (-180.0..=180.0).contains(&longitude);
    in_range.then(|| GeoPoint::new(latitude, longitude))
}
