//! Reverse geocoding client for Nominatim-compatible services.
//!
//! Only the `/reverse` endpoint is used: a coordinate goes in, the
//! service's display name for that place comes out. The client performs a
//! single attempt per lookup and never retries.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::geo::Coordinate;

/// Public OpenStreetMap Nominatim instance.
pub const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_USER_AGENT: &str = "campuswalk-pathfinder";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings for [`ReverseGeocoder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeocoderConfig {
    /// Base URL without the `/reverse` suffix.
    pub base_url: String,
    /// Nominatim's usage policy requires an identifying user agent.
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GEOCODER_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Async reverse geocoding client. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ReverseGeocoder {
    client: Client,
    reverse_url: String,
}

impl ReverseGeocoder {
    pub fn new(config: GeocoderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent)
            .build()
            .map_err(Error::Http)?;
        let reverse_url = format!("{}/reverse", config.base_url.trim_end_matches('/'));
        Ok(Self {
            client,
            reverse_url,
        })
    }

    /// Place name for `point`, or `None` when the service knows nothing there.
    ///
    /// Transport failures, timeouts, and unexpected upstream answers are
    /// reported as [`Error::Geocoder`].
    pub async fn reverse(&self, point: Coordinate) -> Result<Option<String>> {
        let response = self
            .client
            .get(&self.reverse_url)
            .query(&[
                ("format", "jsonv2".to_string()),
                ("lat", point.lat.to_string()),
                ("lon", point.lon.to_string()),
            ])
            .send()
            .await
            .map_err(|err| upstream_failure(point, err))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!(lat = point.lat, lon = point.lon, "geocoder has no place here");
            return Ok(None);
        }
        if !status.is_success() {
            warn!(lat = point.lat, lon = point.lon, %status, "geocoder rejected lookup");
            return Err(Error::Geocoder {
                message: format!("upstream answered with status {status}"),
            });
        }

        let body: ReverseResponse = response
            .json()
            .await
            .map_err(|err| upstream_failure(point, err))?;

        if let Some(reason) = body.error {
            debug!(
                lat = point.lat,
                lon = point.lon,
                reason = %reason,
                "geocoder returned no result"
            );
            return Ok(None);
        }
        Ok(body
            .display_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty()))
    }
}

fn upstream_failure(point: Coordinate, err: reqwest::Error) -> Error {
    warn!(lat = point.lat, lon = point.lon, error = %err, "geocoder request failed");
    let message = if err.is_timeout() {
        "request timed out".to_string()
    } else if err.is_decode() {
        format!("unreadable response: {err}")
    } else {
        err.to_string()
    };
    Error::Geocoder { message }
}
