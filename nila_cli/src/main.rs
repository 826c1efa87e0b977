use clap::{Parser, ValueEnum};

use nila_core::{config::CollectorConfig, location::kerala_locations};
use nila_providers::{google::GoogleMatrixClient, tomtom::TomTomMatrixClient};
use nila_store::store::TrafficStore;

use crate::collect::INTER_BATCH_DELAY;

mod collect;

#[derive(Copy, Clone, ValueEnum)]
enum Provider {
    Google,
    Tomtom,
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Provider::Google => "google",
                Provider::Tomtom => "tomtom",
            }
        )
    }
}

impl Provider {
    fn api_key_var(self) -> &'static str {
        match self {
            Provider::Google => "GOOGLE_MAPS_API_KEY",
            Provider::Tomtom => "TOMTOM_API_KEY",
        }
    }
}

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    /// Matrix-routing provider to collect from
    #[arg(long, value_enum, default_value_t = Provider::Google)]
    provider: Provider,

    #[arg(short, long)]
    debug: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), anyhow::Error> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(if cli.debug {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    // Missing configuration is the one fatal error: nothing has been
    // attempted yet, so bail before touching the network or the database.
    let config = match CollectorConfig::from_env(cli.provider.api_key_var()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("ERROR: {e}");
            std::process::exit(1);
        }
    };

    let mut store = TrafficStore::connect(&config.database_url).await?;
    store.ensure_table().await?;

    let registry = kerala_locations();

    let summary = match cli.provider {
        Provider::Google => {
            let client = GoogleMatrixClient::new(config.api_key)?;
            collect::run(&client, &mut store, &registry, INTER_BATCH_DELAY).await
        }
        Provider::Tomtom => {
            let client = TomTomMatrixClient::new(config.api_key)?;
            collect::run(&client, &mut store, &registry, INTER_BATCH_DELAY).await
        }
    };

    println!(
        "[{}] collected {} rows, {} batch errors",
        summary.started_at, summary.rows_written, summary.batch_errors
    );

    Ok(())
}
