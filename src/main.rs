//! Request-handler entry point: wires the campaign service, the health
//! probe, and the HTTP surface.

use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

use campaign_dispatch::config::AppConfig;
#[cfg(debug_assertions)]
use campaign_dispatch::doc::ApiDoc;
use campaign_dispatch::domain::CampaignService;
use campaign_dispatch::inbound::http::health::HealthMonitor;
use campaign_dispatch::inbound::http::{
    self, json_error_handler, path_error_handler, query_error_handler, HttpState,
};
use campaign_dispatch::outbound::persistence::{
    DbPool, DieselCampaignRepository, DieselCustomerRepository, DieselMessageRepository,
    PoolConfig,
};
use campaign_dispatch::outbound::queue::{self, AmqpJobPublisher};
use campaign_dispatch::RequestId;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn io_error(err: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::other(err.to_string())
}

#[actix_web::main]
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

    let amqp_uri = config.amqp_uri();
    let connection = queue::connect(&amqp_uri).await.map_err(io_error)?;
    let publisher = AmqpJobPublisher::new(&connection).await.map_err(io_error)?;
    info!("connected to RabbitMQ");

    let service = CampaignService::new(
        Arc::new(DieselCampaignRepository::new(pool.clone())),
        Arc::new(DieselCustomerRepository::new(pool.clone())),
        Arc::new(DieselMessageRepository::new(pool.clone())),
        Arc::new(publisher),
    );
    let state = web::Data::new(HttpState::new(service));
    let monitor = web::Data::new(HealthMonitor::new(pool, amqp_uri, VERSION));

    let port = config.server.port;
    info!(port, env = ?config.env, "API server starting");

    HttpServer::new(move || {
        let app = App::new()
            .app_data(state.clone())
            .app_data(monitor.clone())
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .app_data(web::QueryConfig::default().error_handler(query_error_handler))
            .app_data(web::PathConfig::default().error_handler(path_error_handler))
            .wrap(RequestId)
            .configure(http::configure);
        #[cfg(debug_assertions)]
        let app = app.service(
            SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
        );
        app
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
