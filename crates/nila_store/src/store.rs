use tokio_postgres::{Client, NoTls, types::ToSql};
use tracing::{debug, error};

use nila_core::observation::Observation;

const CREATE_TABLE_SQL: &str = "
CREATE TABLE IF NOT EXISTS traffic_data (
    id SERIAL PRIMARY KEY,
    timestamp TIMESTAMPTZ NOT NULL,
    day_of_week VARCHAR(10) NOT NULL,
    hour INTEGER NOT NULL,
    origin_name VARCHAR(100) NOT NULL,
    origin_lat DOUBLE PRECISION NOT NULL,
    origin_lng DOUBLE PRECISION NOT NULL,
    dest_name VARCHAR(100) NOT NULL,
    dest_lat DOUBLE PRECISION NOT NULL,
    dest_lng DOUBLE PRECISION NOT NULL,
    distance_m INTEGER NOT NULL,
    duration_s INTEGER NOT NULL,
    duration_in_traffic_s INTEGER NOT NULL
);
";

const INSERT_COLUMNS: &str = "INSERT INTO traffic_data \
    (timestamp, day_of_week, hour, origin_name, origin_lat, origin_lng, \
     dest_name, dest_lat, dest_lng, distance_m, duration_s, duration_in_traffic_s) \
    VALUES ";

const COLUMNS_PER_ROW: usize = 12;

/// Where normalized observation rows end up. A batch either lands whole or
/// not at all.
#[allow(async_fn_in_trait)]
pub trait ObservationSink {
    async fn insert_batch(&mut self, rows: &[Observation]) -> anyhow::Result<u64>;
}

pub struct TrafficStore {
    client: Client,
}

impl TrafficStore {
    /// Connects and spawns the connection driver task.
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let (client, connection) = tokio_postgres::connect(database_url, NoTls).await?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                error!("postgres connection error: {e}");
            }
        });

        Ok(TrafficStore { client })
    }

    /// Idempotent table bootstrap, run once before the first batch.
    pub async fn ensure_table(&self) -> anyhow::Result<()> {
        self.client.batch_execute(CREATE_TABLE_SQL).await?;
        Ok(())
    }
}

/// Builds the multi-row insert statement for `rows` rows:
/// `INSERT INTO … VALUES ($1,…,$12),($13,…,$24),…`.
fn build_insert_sql(rows: usize) -> String {
    let mut sql = String::from(INSERT_COLUMNS);

    for row in 0..rows {
        if row > 0 {
            sql.push(',');
        }
        sql.push('(');
        for col in 0..COLUMNS_PER_ROW {
            if col > 0 {
                sql.push(',');
            }
            sql.push('$');
            sql.push_str(&(row * COLUMNS_PER_ROW + col + 1).to_string());
        }
        sql.push(')');
    }

    sql
}

impl ObservationSink for TrafficStore {
    async fn insert_batch(&mut self, rows: &[Observation]) -> anyhow::Result<u64> {
        if rows.is_empty() {
            return Ok(0);
        }

        let sql = build_insert_sql(rows.len());

        let mut params: Vec<&(dyn ToSql + Sync)> = Vec::with_capacity(rows.len() * COLUMNS_PER_ROW);
        for row in rows {
            params.push(&row.collected_at);
            params.push(&row.day_of_week);
            params.push(&row.hour);
            params.push(&row.origin_name);
            params.push(&row.origin_lat);
            params.push(&row.origin_lng);
            params.push(&row.dest_name);
            params.push(&row.dest_lat);
            params.push(&row.dest_lng);
            params.push(&row.distance_m);
            params.push(&row.duration_s);
            params.push(&row.duration_in_traffic_s);
        }

        // Dropping the transaction on an early return rolls the batch back.
        let tx = self.client.transaction().await?;
        let written = tx.execute(sql.as_str(), &params).await?;
        tx.commit().await?;

        debug!("TrafficStore: committed {written} rows");

        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_row_placeholders() {
        let sql = build_insert_sql(1);
        assert!(sql.ends_with("($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12)"));
        assert!(sql.starts_with("INSERT INTO traffic_data"));
    }

    #[test]
    fn test_multi_row_placeholders_are_numbered_across_rows() {
        let sql = build_insert_sql(3);
        assert_eq!(sql.matches('(').count(), 4); // 3 value tuples + column list
        assert!(sql.contains("($13,$14,"));
        assert!(sql.ends_with("$36)"));
    }
}
