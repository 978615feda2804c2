use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

#[derive(Clone)]
pub struct HealthState {
    gateway_host: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub gateway: HealthCheck,
    pub checked_at: String,
}

pub fn router(gateway_host: &str) -> Router {
    Router::new()
        .route("/health", get(health))
        .with_state(HealthState { gateway_host: gateway_host.to_string() })
}

/// Liveness only. The upstream provider is metered, so it is never probed here.
pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let payload = HealthResponse {
        status: "ready",
        service: HealthCheck {
            status: "ready",
            detail: "railrefund-server runtime initialized".to_string(),
        },
        gateway: HealthCheck {
            status: "configured",
            detail: format!("pnr lookups routed to {}", state.gateway_host),
        },
        checked_at: Utc::now().to_rfc3339(),
    };

    (StatusCode::OK, Json(payload))
}

#[cfg(test)]
mod tests {
    use axum::{extract::State, http::StatusCode, Json};

    use crate::health::{health, HealthState};

    #[tokio::test]
    async fn health_reports_ready_with_gateway_host() {
        let state = HealthState { gateway_host: "irctc1.p.rapidapi.com".to_string() };

        let (status, Json(payload)) = health(State(state)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload.status, "ready");
        assert_eq!(payload.service.status, "ready");
        assert_eq!(payload.gateway.status, "configured");
        assert!(payload.gateway.detail.contains("irctc1.p.rapidapi.com"));
        assert!(!payload.checked_at.is_empty());
    }
}
