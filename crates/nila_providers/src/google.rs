use serde::Deserialize;
use tracing::debug;

use nila_core::{location::Location, observation::MatrixCell};

use crate::provider::{MatrixProvider, ProviderError, REQUEST_TIMEOUT};

pub const GOOGLE_MATRIX_API_URL: &str = "https://maps.googleapis.com/maps/api/distancematrix/json";

/// Origins per call under the free Distance Matrix tier.
pub const GOOGLE_MAX_ORIGINS: usize = 10;

#[derive(Deserialize)]
pub struct GoogleMatrixResponse {
    pub status: String,
    pub error_message: Option<String>,
    #[serde(default)]
    pub rows: Vec<GoogleMatrixRow>,
}

#[derive(Deserialize)]
pub struct GoogleMatrixRow {
    pub elements: Vec<GoogleMatrixElement>,
}

#[derive(Deserialize)]
pub struct GoogleMatrixElement {
    pub status: String,
    pub distance: Option<GoogleValue>,
    pub duration: Option<GoogleValue>,
    pub duration_in_traffic: Option<GoogleValue>,
}

#[derive(Deserialize)]
pub struct GoogleValue {
    pub value: i32,
}

pub struct GoogleMatrixClient {
    api_key: String,
    client: reqwest::Client,
}

impl GoogleMatrixClient {
    pub fn new(api_key: String) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(GoogleMatrixClient { api_key, client })
    }
}

fn pipe_joined(locations: &[Location]) -> String {
    locations
        .iter()
        .map(|loc| format!("{},{}", loc.lat, loc.lng))
        .collect::<Vec<_>>()
        .join("|")
}

/// Normalize a decoded Distance Matrix response. Rows follow the origin
/// order of the call, elements the destination order; self-pairs and
/// elements with a non-OK status are dropped.
pub fn parse_google_response(
    response: &GoogleMatrixResponse,
    origins: &[Location],
    destinations: &[Location],
) -> Result<Vec<MatrixCell>, ProviderError> {
    if response.status != "OK" {
        return Err(ProviderError::Call {
            provider: "google",
            status: response.status.clone(),
            message: response.error_message.clone().unwrap_or_default(),
        });
    }

    let mut cells = Vec::new();

    for (i, (row, origin)) in response.rows.iter().zip(origins).enumerate() {
        for (j, (element, dest)) in row.elements.iter().zip(destinations).enumerate() {
            if origin.name == dest.name {
                continue;
            }
            if element.status != "OK" {
                continue;
            }

            let (Some(distance), Some(duration)) = (&element.distance, &element.duration) else {
                continue;
            };

            cells.push(MatrixCell {
                origin: i,
                dest: j,
                distance_m: distance.value,
                duration_s: duration.value,
                duration_in_traffic_s: element
                    .duration_in_traffic
                    .as_ref()
                    .map(|v| v.value)
                    .unwrap_or(duration.value),
            });
        }
    }

    Ok(cells)
}

impl MatrixProvider for GoogleMatrixClient {
    fn name(&self) -> &'static str {
        "google"
    }

    fn max_origins_per_call(&self) -> usize {
        GOOGLE_MAX_ORIGINS
    }

    async fn query_batch(
        &self,
        origins: &[Location],
        destinations: &[Location],
    ) -> Result<Vec<MatrixCell>, ProviderError> {
        debug!(
            "GoogleMatrixApi: querying {} origins x {} destinations",
            origins.len(),
            destinations.len()
        );

        let response = self
            .client
            .get(GOOGLE_MATRIX_API_URL)
            .query(&[
                ("origins", pipe_joined(origins)),
                ("destinations", pipe_joined(destinations)),
                ("key", self.api_key.clone()),
                ("mode", "driving".to_string()),
                ("departure_time", "now".to_string()),
                ("traffic_model", "best_guess".to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api { status, message });
        }

        let body: GoogleMatrixResponse = response.json().await?;

        parse_google_response(&body, origins, destinations)
    }
}
