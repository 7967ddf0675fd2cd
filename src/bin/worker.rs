//! Delivery worker entry point: consumes send jobs, renders, invokes the
//! gateway, and persists per-message outcomes.
//!
//! The consumer holds a prefetch window of one; run more worker processes
//! to raise delivery throughput.

use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use campaign_dispatch::config::AppConfig;
use campaign_dispatch::domain::DeliveryProcessor;
use campaign_dispatch::outbound::gateway::SimulatedGateway;
use campaign_dispatch::outbound::persistence::{DbPool, DieselMessageRepository, PoolConfig};
use campaign_dispatch::outbound::queue::{self, JobConsumer};

/// Success probability of the simulated gateway.
const GATEWAY_SUCCESS_RATE: f64 = 0.95;

fn io_error(err: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::other(err.to_string())
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let config = AppConfig::load().map_err(io_error)?;

    if let Err(e) = fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.default_log_filter())),
        )
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let pool = DbPool::new(PoolConfig::new(config.database_url()))
        .await
        .map_err(io_error)?;
    pool.ping().await.map_err(io_error)?;
    info!("connected to database");

    let connection = queue::connect(&config.amqp_uri()).await.map_err(io_error)?;
    info!("connected to RabbitMQ");

    let processor = DeliveryProcessor::new(
        Arc::new(DieselMessageRepository::new(pool)),
        Arc::new(SimulatedGateway::new(GATEWAY_SUCCESS_RATE)),
    );

    let consumer = JobConsumer::new(&connection, "delivery-worker")
        .await
        .map_err(io_error)?;

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for shutdown signal");
        }
    };

    // Runs until ctrl-c; the in-flight job is acked or nacked before exit.
    consumer.run(processor, shutdown).await.map_err(io_error)?;

    if let Err(e) = connection.close(0, "worker shutdown").await {
        warn!(error = %e, "error closing queue connection");
    }
    info!("worker stopped");
    Ok(())
}
