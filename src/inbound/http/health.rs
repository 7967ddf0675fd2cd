//! Combined readiness probe.
//!
//! Checks the store (ping, 2-second deadline) and the queue (connect
//! probe). Healthy means both dependencies are up; a down queue degrades
//! the service, a down store makes it unhealthy. Anything but healthy is
//! reported as 503 so load balancers stop routing dispatch traffic.

use std::time::Duration;

use actix_web::{get, web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::outbound::persistence::DbPool;
use crate::outbound::queue;

/// Deadline for the store ping.
const DATABASE_CHECK_TIMEOUT: Duration = Duration::from_secs(2);

/// Overall service health.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthLevel {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Per-dependency connectivity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Connected,
    Disconnected,
}

/// Per-dependency section of the health report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct ServicesReport {
    pub database: ServiceStatus,
    pub queue: ServiceStatus,
}

/// Health report returned by `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct HealthReport {
    pub status: HealthLevel,
    pub services: ServicesReport,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

/// Performs dependency checks for the readiness probe.
#[derive(Clone)]
pub struct HealthMonitor {
    pool: DbPool,
    amqp_uri: String,
    version: &'static str,
}

impl HealthMonitor {
    /// Create a monitor over the store pool and queue location.
    pub fn new(pool: DbPool, amqp_uri: String, version: &'static str) -> Self {
        Self {
            pool,
            amqp_uri,
            version,
        }
    }

    async fn check_database(&self) -> ServiceStatus {
        match tokio::time::timeout(DATABASE_CHECK_TIMEOUT, self.pool.ping()).await {
            Ok(Ok(())) => ServiceStatus::Connected,
            _ => ServiceStatus::Disconnected,
        }
    }

    async fn check_queue(&self) -> ServiceStatus {
        match queue::connect(&self.amqp_uri).await {
            Ok(connection) => {
                // Probe connections are closed immediately; errors on close
                // are irrelevant to the verdict.
                let _ = connection.close(0, "health probe").await;
                ServiceStatus::Connected
            }
            Err(_) => ServiceStatus::Disconnected,
        }
    }

    /// Run both checks and combine them into a report.
    pub async fn check(&self) -> HealthReport {
        let database = self.check_database().await;
        let queue = self.check_queue().await;

        HealthReport {
            status: combine(database, queue),
            services: ServicesReport { database, queue },
            timestamp: Utc::now(),
            version: self.version.to_owned(),
        }
    }
}

fn combine(database: ServiceStatus, queue: ServiceStatus) -> HealthLevel {
    match (database, queue) {
        (ServiceStatus::Disconnected, _) => HealthLevel::Unhealthy,
        (ServiceStatus::Connected, ServiceStatus::Disconnected) => HealthLevel::Degraded,
        (ServiceStatus::Connected, ServiceStatus::Connected) => HealthLevel::Healthy,
    }
}

/// Combined readiness probe over the store and the queue.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "All dependencies reachable", body = HealthReport),
        (status = 503, description = "Store or queue unreachable", body = HealthReport),
    ),
    tags = ["health"],
    operation_id = "health"
)]
#[get("/health")]
pub async fn health(monitor: web::Data<HealthMonitor>) -> HttpResponse {
    let report = monitor.check().await;
    match report.status {
        HealthLevel::Healthy => HttpResponse::Ok().json(report),
        HealthLevel::Degraded | HealthLevel::Unhealthy => {
            HttpResponse::ServiceUnavailable().json(report)
        }
    }
}
