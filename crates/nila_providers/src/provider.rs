use std::time::Duration;

use thiserror::Error;

use nila_core::{location::Location, observation::MatrixCell};

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("{provider} rejected the call: {status} - {message}")]
    Call {
        provider: &'static str,
        status: String,
        message: String,
    },
}

/// One matrix-routing provider. `query_batch` covers the full round trip for
/// one origin batch: request construction, the HTTP call, the overall call
/// status check and normalization into [`MatrixCell`]s. Cells the provider
/// marks as unavailable and self-pairs are omitted, not errors.
#[allow(async_fn_in_trait)]
pub trait MatrixProvider {
    fn name(&self) -> &'static str;

    /// Provider-specific cap on origins per call; destinations are always
    /// the full registry.
    fn max_origins_per_call(&self) -> usize;

    async fn query_batch(
        &self,
        origins: &[Location],
        destinations: &[Location],
    ) -> Result<Vec<MatrixCell>, ProviderError>;
}
