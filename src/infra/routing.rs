//! Driving-distance lookups against the OpenRouteService directions API,
//! write-through cached on disk.

use reqwest::{header, Client, Url};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::entities::Coordinates;
use crate::util::version;

use super::cache::{cache_key, DistanceCache};

const DEFAULT_BASE_URL: &str = "https://api.openrouteservice.org";
const DIRECTIONS_PATH: &str = "/v2/directions/driving-car";
const ACCEPT_HEADER: &str = "application/json, application/geo+json";

#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("invalid routing URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("failed to build routing HTTP client: {0}")]
    BuildClient(reqwest::Error),
    #[error("routing request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("routing API returned status {status}: {body}")]
    Api { status: u16, body: String },
    #[error("routing response carried no route distance")]
    MissingDistance,
    #[error("no routing API key configured")]
    MissingApiKey,
}

/// Client for the directions API. Holds the distance cache so lookups only
/// leave the machine on a cache miss.
pub struct RoutingClient {
    http: Client,
    base_url: Url,
    api_key: Option<String>,
    cache: DistanceCache,
}

impl RoutingClient {
    pub fn new(api_key: Option<String>, cache: DistanceCache) -> Result<Self, RoutingError> {
        Self::with_base_url(DEFAULT_BASE_URL, api_key, cache)
    }

    pub fn with_base_url(
        base: &str,
        api_key: Option<String>,
        cache: DistanceCache,
    ) -> Result<Self, RoutingError> {
        let base_url = Url::parse(base)?;
        let http = Client::builder()
            .user_agent(version::user_agent())
            .build()
            .map_err(RoutingError::BuildClient)?;
        Ok(Self {
            http,
            base_url,
            api_key,
            cache,
        })
    }

    /// Resolve the driving distance in km between two coordinate pairs,
    /// consulting the cache first. Results are rounded to 2 decimals and
    /// written through on first resolution. Failures are terminal for the
    /// request: no retry, no substituted default.
    pub async fn route_distance_km(
        &self,
        origin: Coordinates,
        destination: Coordinates,
    ) -> Result<f64, RoutingError> {
        let key = cache_key(origin, destination);
        if let Some(hit) = self.cache.get(&key) {
            debug!(%key, distance_km = hit, "distance served from cache");
            return Ok(hit);
        }

        let api_key = self.api_key.as_deref().ok_or(RoutingError::MissingApiKey)?;

        let mut url = self.base_url.join(DIRECTIONS_PATH)?;
        // The directions API takes (longitude, latitude) pairs.
        url.query_pairs_mut()
            .append_pair(
                "start",
                &format!("{},{}", origin.longitude, origin.latitude),
            )
            .append_pair(
                "end",
                &format!("{},{}", destination.longitude, destination.latitude),
            );

        let response = self
            .http
            .get(url)
            .header(header::ACCEPT, ACCEPT_HEADER)
            .bearer_auth(api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RoutingError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let directions: DirectionsDto = response.json().await?;
        let meters = directions
            .features
            .first()
            .and_then(|feature| feature.properties.segments.first())
            .map(|segment| segment.distance)
            .ok_or(RoutingError::MissingDistance)?;

        let distance_km = round2(meters / 1000.0);
        if let Err(error) = self.cache.put(&key, distance_km) {
            warn!(%error, "failed to persist distance cache entry");
        }
        debug!(%key, distance_km, "distance resolved via API");
        Ok(distance_km)
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Debug, Deserialize)]
struct DirectionsDto {
    #[serde(default)]
    features: Vec<FeatureDto>,
}

#[derive(Debug, Deserialize)]
struct FeatureDto {
    properties: PropertiesDto,
}

#[derive(Debug, Deserialize)]
struct PropertiesDto {
    #[serde(default)]
    segments: Vec<SegmentDto>,
}

#[derive(Debug, Deserialize)]
struct SegmentDto {
    distance: f64,
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use serde_json::json;

    use super::*;

    fn coords(lat: f64, lon: f64) -> Coordinates {
        Coordinates {
            latitude: lat,
            longitude: lon,
        }
    }

    fn client_with(server: &MockServer, dir: &tempfile::TempDir) -> RoutingClient {
        RoutingClient::with_base_url(
            &server.base_url(),
            Some("test-key".to_string()),
            DistanceCache::at_path(dir.path().join("distances.json")),
        )
        .expect("client builds")
    }

    fn directions_body(meters: f64) -> serde_json::Value {
        json!({
            "features": [
                { "properties": { "segments": [ { "distance": meters } ] } }
            ]
        })
    }

    #[tokio::test]
    async fn resolves_swaps_axes_and_rounds() {
        let server = MockServer::start();
        let dir = tempfile::tempdir().expect("tempdir");
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/v2/directions/driving-car")
                .query_param("start", "-65.2995,-24.1858")
                .query_param("end", "-65.2117,-24.2566")
                .header("authorization", "Bearer test-key");
            then.status(200).json_body(directions_body(12_347.0));
        });

        let client = client_with(&server, &dir);
        let km = client
            .route_distance_km(coords(-24.1858, -65.2995), coords(-24.2566, -65.2117))
            .await
            .expect("distance resolves");

        assert_eq!(km, 12.35);
        mock.assert();
    }

    #[tokio::test]
    async fn second_resolution_is_served_from_cache() {
        let server = MockServer::start();
        let dir = tempfile::tempdir().expect("tempdir");
        let mock = server.mock(|when, then| {
            when.method(GET).path("/v2/directions/driving-car");
            then.status(200).json_body(directions_body(9_870.0));
        });

        let client = client_with(&server, &dir);
        let origin = coords(-24.1858, -65.2995);
        let destination = coords(-24.3811, -65.1166);

        let first = client
            .route_distance_km(origin, destination)
            .await
            .expect("first resolves");
        let second = client
            .route_distance_km(origin, destination)
            .await
            .expect("second resolves");

        assert_eq!(first, second);
        mock.assert_hits(1);
    }

    #[tokio::test]
    async fn non_success_statuses_surface_as_api_errors() {
        let server = MockServer::start();
        let dir = tempfile::tempdir().expect("tempdir");
        server.mock(|when, then| {
            when.method(GET).path("/v2/directions/driving-car");
            then.status(403).body("quota exceeded");
        });

        let client = client_with(&server, &dir);
        let error = client
            .route_distance_km(coords(0.0, 0.0), coords(1.0, 1.0))
            .await
            .expect_err("forbidden");

        assert!(matches!(error, RoutingError::Api { status: 403, .. }));
    }

    #[tokio::test]
    async fn responses_without_segments_are_rejected() {
        let server = MockServer::start();
        let dir = tempfile::tempdir().expect("tempdir");
        server.mock(|when, then| {
            when.method(GET).path("/v2/directions/driving-car");
            then.status(200).json_body(json!({ "features": [] }));
        });

        let client = client_with(&server, &dir);
        let error = client
            .route_distance_km(coords(0.0, 0.0), coords(1.0, 1.0))
            .await
            .expect_err("no distance");

        assert!(matches!(error, RoutingError::MissingDistance));
    }

    #[tokio::test]
    async fn cache_misses_without_an_api_key_fail_fast() {
        let server = MockServer::start();
        let dir = tempfile::tempdir().expect("tempdir");
        let client = RoutingClient::with_base_url(
            &server.base_url(),
            None,
            DistanceCache::at_path(dir.path().join("distances.json")),
        )
        .expect("client builds");

        let error = client
            .route_distance_km(coords(0.0, 0.0), coords(1.0, 1.0))
            .await
            .expect_err("no key configured");
        assert!(matches!(error, RoutingError::MissingApiKey));
    }
}
