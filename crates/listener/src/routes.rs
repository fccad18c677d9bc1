//! Route handlers. Each one decodes the request, calls the matching
//! [`FulfillmentService`] operation, and shapes the JSON response.

use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use fulfillment::{CheckoutEvent, FinancialSummary, FulfillmentError, RoutingOutcome, Settings};
use handlers::{
    FulfillmentService, IngestOutcome, SettingUpdate, SettingUpdated, TrackingQuery,
    TrackingResult,
};
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::error::ApiError;

/// Plain acknowledgement, optionally echoing the router's decision.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub router: Option<RoutingOutcome>,
}

impl MessageResponse {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            router: None,
        }
    }
}

#[derive(Debug, Serialize)]
struct TrackingMiss {
    found: bool,
    error: String,
}

fn parse_body<T: serde::de::DeserializeOwned>(body: &Bytes, error: &str) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| {
        warn!(error = %e, "rejecting malformed request body");
        ApiError::bad_request(error).with_details(e.to_string())
    })
}

/// POST /new-order
pub(crate) async fn new_order(
    State(service): State<FulfillmentService>,
    body: Bytes,
) -> Result<Json<MessageResponse>, ApiError> {
    let event: CheckoutEvent = parse_body(&body, "Invalid JSON")?;
    match service.ingest_checkout(event).await {
        Ok(IngestOutcome::Ignored) => Ok(Json(MessageResponse::new("Ignored event"))),
        Ok(IngestOutcome::Logged { router, .. }) => Ok(Json(MessageResponse {
            message: "Order logged & routed".to_string(),
            router: Some(router),
        })),
        Err(err) => Err(ApiError::from_handler(err, "Failed to log order")),
    }
}

/// GET /pod-webhook
pub(crate) async fn pod_webhook_status() -> Json<MessageResponse> {
    Json(MessageResponse::new("POD Webhook Listener Active"))
}

/// POST /pod-webhook
pub(crate) async fn pod_webhook(
    State(service): State<FulfillmentService>,
    body: Bytes,
) -> Result<Json<MessageResponse>, ApiError> {
    let payload: Value = parse_body(&body, "Invalid JSON")?;
    let outcome = service
        .apply_shipment(&payload)
        .await
        .map_err(|err| ApiError::from_handler(err, "Failed to update order"))?;
    Ok(Json(MessageResponse::new(outcome.message())))
}

/// GET /track-order?id=&email=
pub(crate) async fn track_order(
    State(service): State<FulfillmentService>,
    query: Result<Query<TrackingQuery>, QueryRejection>,
) -> Result<Json<TrackingResult>, Response> {
    let Query(query) = query.map_err(|rejection| {
        warn!(error = %rejection.body_text(), "rejecting malformed query string");
        ApiError::bad_request("Invalid query string")
            .with_details(rejection.body_text())
            .into_response()
    })?;
    match service.track_order(query).await {
        Ok(found) => Ok(Json(found)),
        Err(FulfillmentError::NotFound { message }) => Err((
            StatusCode::NOT_FOUND,
            Json(TrackingMiss {
                found: false,
                error: message,
            }),
        )
            .into_response()),
        Err(err) => Err(ApiError::from_handler(err, "Failed to fetch order").into_response()),
    }
}

/// GET /manage-settings
pub(crate) async fn list_settings(
    State(service): State<FulfillmentService>,
) -> Result<Json<Settings>, ApiError> {
    service
        .settings()
        .await
        .map(Json)
        .map_err(|err| ApiError::from_handler(err, "Failed to load settings"))
}

/// POST /manage-settings
pub(crate) async fn update_setting(
    State(service): State<FulfillmentService>,
    body: Bytes,
) -> Result<Json<SettingUpdated>, ApiError> {
    let update: SettingUpdate = parse_body(&body, "Bad Request")?;
    service
        .update_setting(update)
        .await
        .map(Json)
        .map_err(|err| ApiError::from_handler(err, "Failed to update setting"))
}

/// GET /get-stats
pub(crate) async fn stats(
    State(service): State<FulfillmentService>,
) -> Result<Json<FinancialSummary>, ApiError> {
    service
        .financial_summary()
        .await
        .map(Json)
        .map_err(|err| ApiError::from_handler(err, "Failed to fetch financial stats"))
}

/// GET /health
pub(crate) async fn health() -> &'static str {
    "ok"
}

/// Any route hit with a method it does not serve.
pub(crate) async fn method_not_allowed() -> ApiError {
    ApiError::new(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed")
}

/// Any path with no route.
pub(crate) async fn not_found() -> ApiError {
    ApiError::new(StatusCode::NOT_FOUND, "Not Found")
}
