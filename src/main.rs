//! Command-line entrypoint for the kafka-relay service pair.
//!
//! # Usage
//!
//! ```bash
//! # Publish side: HTTP API in front of a Kafka producer
//! kafka-relay producer --port 3000 --brokers localhost:9092
//!
//! # Subscribe side: HTTP API, Kafka consumer and WebSocket fan-out
//! kafka-relay consumer --port 3001 --brokers localhost:9092 \
//!   --group-id demo-consumer-group
//! ```
//!
//! Every flag also has an environment fallback (`KAFKA_BROKER`, `PORT`,
//! `SCHEMA_REGISTRY_URL`, `CORS_ORIGINS`, ...), so a containerized
//! deployment can configure the services without arguments.

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "kafka-relay")]
#[command(about = "REST bridge for producing and consuming Kafka messages with schema validation")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the publish service
    Producer {
        #[command(flatten)]
        config: kafka_relay_producer::Config,
    },
    /// Run the subscribe service
    Consumer {
        #[command(flatten)]
        config: kafka_relay_consumer::Config,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    // SIGINT/SIGTERM cancel the token; each service tears down its broker
    // client only after its own loops have observed the cancellation.
    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            wait_for_signal().await;
            tracing::info!("Shutdown signal received");
            shutdown.cancel();
        }
    });

    match cli.command {
        Commands::Producer { config } => kafka_relay_producer::run(config, shutdown).await,
        Commands::Consumer { config } => kafka_relay_consumer::run(config, shutdown).await,
    }
}

async fn wait_for_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = ctrl_c => {}
                    _ = term.recv() => {}
                }
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {e}");
                let _ = ctrl_c.await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = ctrl_c.await;
    }
}
