use std::time::Duration;

use jiff::Timestamp;
use tracing::{error, info};

use nila_core::{
    batch::plan_batches,
    location::Location,
    observation::{Observation, RunStamp},
};
use nila_providers::provider::MatrixProvider;
use nila_store::store::ObservationSink;

/// Pause between provider calls, to stay polite with external rate limits.
pub const INTER_BATCH_DELAY: Duration = Duration::from_secs(1);

pub struct RunSummary {
    pub started_at: Timestamp,
    pub rows_written: u64,
    pub batch_errors: u32,
}

/// One pass over the registry. The run stamp is taken once at the start so
/// every batch of the run carries the same timestamp, day and hour. Each
/// batch is independent: a query or persistence failure is counted and the
/// run moves on to the next batch.
pub async fn run<P: MatrixProvider, S: ObservationSink>(
    provider: &P,
    sink: &mut S,
    registry: &[Location],
    delay: Duration,
) -> RunSummary {
    let stamp = RunStamp::now();
    let batches = plan_batches(registry, provider.max_origins_per_call());

    info!(
        "starting {} run: {} locations, {} batches",
        provider.name(),
        registry.len(),
        batches.len()
    );

    let mut rows_written = 0u64;
    let mut batch_errors = 0u32;

    for batch in &batches {
        let cells = match provider.query_batch(batch.origins, batch.destinations).await {
            Ok(cells) => cells,
            Err(e) => {
                error!("batch at offset {} failed: {e}", batch.offset);
                batch_errors += 1;
                continue;
            }
        };

        let rows: Vec<Observation> = cells
            .iter()
            .map(|cell| Observation::from_cell(&stamp, batch.origins, batch.destinations, cell))
            .collect();

        match sink.insert_batch(&rows).await {
            Ok(written) => rows_written += written,
            Err(e) => {
                error!("batch at offset {} not persisted: {e}", batch.offset);
                batch_errors += 1;
            }
        }

        tokio::time::sleep(delay).await;
    }

    RunSummary {
        started_at: stamp.collected_at,
        rows_written,
        batch_errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use nila_core::observation::MatrixCell;
    use nila_providers::provider::ProviderError;

    struct StubProvider {
        /// Batch offsets (in batch order) whose query should fail.
        failing_batches: Vec<usize>,
    }

    impl MatrixProvider for StubProvider {
        fn name(&self) -> &'static str {
            "stub"
        }

        fn max_origins_per_call(&self) -> usize {
            2
        }

        async fn query_batch(
            &self,
            origins: &[Location],
            destinations: &[Location],
        ) -> Result<Vec<MatrixCell>, ProviderError> {
            if self.failing_batches.contains(&0) && origins[0].name == destinations[0].name {
                return Err(ProviderError::Call {
                    provider: "stub",
                    status: "UNKNOWN_ERROR".to_string(),
                    message: String::new(),
                });
            }

            // One usable cell per origin, skipping nothing.
            Ok(origins
                .iter()
                .enumerate()
                .map(|(i, _)| MatrixCell {
                    origin: i,
                    dest: destinations.len() - 1,
                    distance_m: 1_000,
                    duration_s: 100,
                    duration_in_traffic_s: 120,
                })
                .collect())
        }
    }

    struct VecSink {
        rows: Vec<Observation>,
        fail_batches: Vec<usize>,
        calls: usize,
    }

    impl VecSink {
        fn new(fail_batches: Vec<usize>) -> Self {
            VecSink {
                rows: Vec::new(),
                fail_batches,
                calls: 0,
            }
        }
    }

    impl ObservationSink for VecSink {
        async fn insert_batch(&mut self, rows: &[Observation]) -> anyhow::Result<u64> {
            let call = self.calls;
            self.calls += 1;
            if self.fail_batches.contains(&call) {
                anyhow::bail!("insert failed");
            }
            self.rows.extend_from_slice(rows);
            Ok(rows.len() as u64)
        }
    }

    fn registry(n: usize) -> Vec<Location> {
        (0..n)
            .map(|i| Location::new(&format!("loc_{i}"), 10.0 + i as f64, 76.0))
            .collect()
    }

    #[tokio::test]
    async fn test_all_batches_persisted() {
        let provider = StubProvider {
            failing_batches: vec![],
        };
        let mut sink = VecSink::new(vec![]);
        let locations = registry(6);

        let summary = run(&provider, &mut sink, &locations, Duration::ZERO).await;

        assert_eq!(summary.batch_errors, 0);
        assert_eq!(summary.rows_written, 6);
        assert_eq!(sink.rows.len(), 6);
    }

    #[tokio::test]
    async fn test_persist_failure_is_isolated() {
        let provider = StubProvider {
            failing_batches: vec![],
        };
        // Second batch's insert fails; the other two must land.
        let mut sink = VecSink::new(vec![1]);
        let locations = registry(6);

        let summary = run(&provider, &mut sink, &locations, Duration::ZERO).await;

        assert_eq!(summary.batch_errors, 1);
        assert_eq!(summary.rows_written, 4);
        assert_eq!(sink.rows.len(), 4);
    }

    #[tokio::test]
    async fn test_query_failure_skips_persist_for_that_batch() {
        let provider = StubProvider {
            failing_batches: vec![0],
        };
        let mut sink = VecSink::new(vec![]);
        let locations = registry(4);

        let summary = run(&provider, &mut sink, &locations, Duration::ZERO).await;

        assert_eq!(summary.batch_errors, 1);
        // Only the second batch reached the sink.
        assert_eq!(sink.calls, 1);
        assert_eq!(summary.rows_written, 2);
    }

    #[tokio::test]
    async fn test_all_rows_share_the_run_stamp() {
        let provider = StubProvider {
            failing_batches: vec![],
        };
        let mut sink = VecSink::new(vec![]);
        let locations = registry(6);

        let summary = run(&provider, &mut sink, &locations, Duration::ZERO).await;

        for row in &sink.rows {
            assert_eq!(row.collected_at, summary.started_at);
        }
    }
}
