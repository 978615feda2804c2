use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::NaiveDateTime;
use railrefund_core::{
    sort_for_display, ApplicationError, DomainError, InterfaceError, PaymentMethod,
    PaymentMethodCatalog, PnrNumber, RefundReport, RefundRuntime, ReservationSnapshot,
};
use railrefund_gateway::{GatewayError, PnrGateway};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info};
use uuid::Uuid;

pub type Clock = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

#[derive(Clone)]
pub struct AppState {
    gateway: Arc<dyn PnrGateway>,
    default_payment_method: PaymentMethod,
    clock: Clock,
}

impl AppState {
    pub fn new(gateway: Arc<dyn PnrGateway>, default_payment_method: PaymentMethod) -> Self {
        Self::with_clock(
            gateway,
            default_payment_method,
            Arc::new(|| chrono::Local::now().naive_local()),
        )
    }

    pub fn with_clock(
        gateway: Arc<dyn PnrGateway>,
        default_payment_method: PaymentMethod,
        clock: Clock,
    ) -> Self {
        Self { gateway, default_payment_method, clock }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RefundQuery {
    pub payment_method: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RefundResponse {
    pub reservation: ReservationSnapshot,
    pub class_name: String,
    pub report: RefundReport,
}

#[derive(Debug, Serialize)]
pub struct PaymentMethodEntry {
    pub slug: &'static str,
    pub name: &'static str,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
    correlation_id: String,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    fn from_interface(error: InterfaceError) -> Self {
        let (status, detail) = match &error {
            InterfaceError::BadRequest { message, .. } => {
                (StatusCode::BAD_REQUEST, Some(message.clone()))
            }
            InterfaceError::ServiceUnavailable { .. } => (StatusCode::BAD_GATEWAY, None),
            InterfaceError::Internal { .. } => (StatusCode::INTERNAL_SERVER_ERROR, None),
        };

        Self {
            status,
            body: ErrorBody {
                error: error.user_message().to_string(),
                detail,
                correlation_id: error.correlation_id().to_string(),
            },
        }
    }

    fn from_domain(error: DomainError, correlation_id: &str) -> Self {
        Self::from_interface(ApplicationError::from(error).into_interface(correlation_id))
    }

    fn from_gateway(error: GatewayError, correlation_id: &str) -> Self {
        let status = match &error {
            GatewayError::Rejected(_) => StatusCode::NOT_FOUND,
            GatewayError::Normalize(_) | GatewayError::Decode(_) => StatusCode::UNPROCESSABLE_ENTITY,
            GatewayError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            GatewayError::MissingApiKey | GatewayError::Client(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            GatewayError::Transport(_)
            | GatewayError::Status { .. }
            | GatewayError::Refused { .. } => StatusCode::BAD_GATEWAY,
        };
        let detail = match &error {
            GatewayError::Refused { status, message } => {
                Some(format!("provider answered HTTP {status}: {message}"))
            }
            _ => None,
        };

        error!(
            event_name = "server.pnr.gateway_error",
            correlation_id,
            error = %error,
            "pnr gateway call failed"
        );

        Self {
            status,
            body: ErrorBody {
                error: error.user_message().to_string(),
                detail,
                correlation_id: correlation_id.to_string(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/pnr/{pnr}", get(pnr_status))
        .route("/api/pnr/{pnr}/refunds", get(refund_report))
        .route("/api/payment-methods", get(payment_methods))
        .with_state(state)
}

/// Passes the provider's response through untouched.
pub async fn pnr_status(
    State(state): State<AppState>,
    Path(pnr): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let correlation_id = Uuid::new_v4().to_string();
    let pnr = PnrNumber::parse(&pnr).map_err(|error| ApiError::from_domain(error, &correlation_id))?;

    let payload = state
        .gateway
        .fetch_raw(&pnr)
        .await
        .map_err(|error| ApiError::from_gateway(error, &correlation_id))?;

    info!(
        event_name = "server.pnr.proxied",
        correlation_id = %correlation_id,
        pnr = %pnr,
        "pnr status proxied"
    );
    Ok(Json(payload))
}

pub async fn refund_report(
    State(state): State<AppState>,
    Path(pnr): Path<String>,
    Query(query): Query<RefundQuery>,
) -> Result<Json<RefundResponse>, ApiError> {
    let correlation_id = Uuid::new_v4().to_string();
    let pnr = PnrNumber::parse(&pnr).map_err(|error| ApiError::from_domain(error, &correlation_id))?;
    let payment_method = match query.payment_method.as_deref() {
        Some(raw) => raw
            .parse::<PaymentMethod>()
            .map_err(|error| ApiError::from_domain(error, &correlation_id))?,
        None => state.default_payment_method,
    };

    let reservation = state
        .gateway
        .lookup(&pnr)
        .await
        .map_err(|error| ApiError::from_gateway(error, &correlation_id))?;

    let now = (state.clock)();
    let mut report = RefundRuntime::default()
        .recompute(&reservation, payment_method, now)
        .map_err(|error| ApiError::from_domain(error, &correlation_id))?;
    sort_for_display(&mut report.scenarios);

    info!(
        event_name = "server.refund.computed",
        correlation_id = %correlation_id,
        pnr = %pnr,
        payment_method = payment_method.slug(),
        best_time = report.best_time().map(|scenario| scenario.description.as_str()).unwrap_or("none"),
        "refund scenarios computed"
    );

    Ok(Json(RefundResponse {
        class_name: reservation.class_code.full_name().to_string(),
        reservation,
        report,
    }))
}

pub async fn payment_methods() -> Json<Vec<PaymentMethodEntry>> {
    Json(
        PaymentMethodCatalog
            .methods()
            .iter()
            .map(|method| PaymentMethodEntry { slug: method.slug(), name: method.name() })
            .collect(),
    )
}
