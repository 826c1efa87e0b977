use serde::{Deserialize, Serialize};
use tracing::debug;

use nila_core::{location::Location, observation::MatrixCell};

use crate::provider::{MatrixProvider, ProviderError, REQUEST_TIMEOUT};

pub const TOMTOM_MATRIX_API_URL: &str = "https://api.tomtom.com/routing/matrix/2";

/// The synchronous Matrix Routing tier caps a call at 100 cells; against the
/// 20-location registry that allows 5 origins per call.
pub const TOMTOM_MAX_ORIGINS: usize = 5;

#[derive(Serialize)]
struct MatrixRequestBody {
    origins: Vec<MatrixPoint>,
    destinations: Vec<MatrixPoint>,
    options: MatrixOptions,
}

#[derive(Serialize)]
struct MatrixPoint {
    point: PointCoordinates,
}

#[derive(Serialize)]
struct PointCoordinates {
    latitude: f64,
    longitude: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MatrixOptions {
    depart_at: String,
    route_type: String,
    traffic: String,
    travel_mode: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TomTomMatrixResponse {
    #[serde(default)]
    pub data: Vec<TomTomMatrixCell>,
    pub detailed_error: Option<TomTomDetailedError>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TomTomMatrixCell {
    pub origin_index: usize,
    pub destination_index: usize,
    pub status_code: u16,
    pub route_summary: Option<TomTomRouteSummary>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TomTomRouteSummary {
    pub length_in_meters: i32,
    pub travel_time_in_seconds: i32,
    pub traffic_delay_in_seconds: i32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TomTomDetailedError {
    pub code: String,
    pub message: String,
}

pub struct TomTomMatrixClient {
    api_key: String,
    client: reqwest::Client,
}

impl TomTomMatrixClient {
    pub fn new(api_key: String) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(TomTomMatrixClient { api_key, client })
    }
}

fn matrix_points(locations: &[Location]) -> Vec<MatrixPoint> {
    locations
        .iter()
        .map(|loc| MatrixPoint {
            point: PointCoordinates {
                latitude: loc.lat,
                longitude: loc.lng,
            },
        })
        .collect()
}

/// Normalize a decoded Matrix Routing v2 response. TomTom reports one total
/// travel time that already includes the live-traffic delay, so the
/// free-flow baseline is the total minus the delay and the total itself is
/// the traffic-inclusive figure.
pub fn parse_tomtom_response(
    response: &TomTomMatrixResponse,
    origins: &[Location],
    destinations: &[Location],
) -> Result<Vec<MatrixCell>, ProviderError> {
    if let Some(error) = &response.detailed_error {
        return Err(ProviderError::Call {
            provider: "tomtom",
            status: error.code.clone(),
            message: error.message.clone(),
        });
    }

    let mut cells = Vec::new();

    for cell in &response.data {
        if cell.status_code != 200 {
            continue;
        }

        let (Some(origin), Some(dest)) = (
            origins.get(cell.origin_index),
            destinations.get(cell.destination_index),
        ) else {
            continue;
        };

        if origin.name == dest.name {
            continue;
        }

        let Some(summary) = &cell.route_summary else {
            continue;
        };

        cells.push(MatrixCell {
            origin: cell.origin_index,
            dest: cell.destination_index,
            distance_m: summary.length_in_meters,
            duration_s: (summary.travel_time_in_seconds - summary.traffic_delay_in_seconds).max(0),
            duration_in_traffic_s: summary.travel_time_in_seconds,
        });
    }

    Ok(cells)
}

impl MatrixProvider for TomTomMatrixClient {
    fn name(&self) -> &'static str {
        "tomtom"
    }

    fn max_origins_per_call(&self) -> usize {
        TOMTOM_MAX_ORIGINS
    }

    async fn query_batch(
        &self,
        origins: &[Location],
        destinations: &[Location],
    ) -> Result<Vec<MatrixCell>, ProviderError> {
        debug!(
            "TomTomMatrixApi: querying {} origins x {} destinations",
            origins.len(),
            destinations.len()
        );

        let body = MatrixRequestBody {
            origins: matrix_points(origins),
            destinations: matrix_points(destinations),
            options: MatrixOptions {
                depart_at: "now".to_string(),
                route_type: "fastest".to_string(),
                traffic: "live".to_string(),
                travel_mode: "car".to_string(),
            },
        };

        let response = self
            .client
            .post(TOMTOM_MATRIX_API_URL)
            .query(&[("key", &self.api_key)])
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api { status, message });
        }

        let body: TomTomMatrixResponse = response.json().await?;

        parse_tomtom_response(&body, origins, destinations)
    }
}
