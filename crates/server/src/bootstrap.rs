use std::sync::Arc;

use axum::Router;
use railrefund_core::config::{AppConfig, ConfigError, LoadOptions};
use railrefund_gateway::{GatewayError, RapidApiGateway};
use thiserror::Error;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::{health, routes};

pub struct Application {
    pub config: AppConfig,
    pub state: routes::AppState,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("pnr gateway setup failed: {0}")]
    Gateway(#[from] GatewayError),
}

impl Application {
    pub fn router(&self) -> Router {
        Router::new()
            .merge(health::router(&self.config.gateway.api_host))
            .merge(routes::router(self.state.clone()))
            .layer(CorsLayer::permissive())
    }
}

pub fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config)
}

pub fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let gateway = RapidApiGateway::from_config(&config.gateway)?;
    info!(
        event_name = "system.bootstrap.gateway_ready",
        correlation_id = "bootstrap",
        api_host = %config.gateway.api_host,
        timeout_secs = config.gateway.timeout_secs,
        max_retries = config.gateway.max_retries,
        "pnr gateway configured"
    );

    let state = routes::AppState::new(Arc::new(gateway), config.refund.default_payment_method);
    Ok(Application { config, state })
}
