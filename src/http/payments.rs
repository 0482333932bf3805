use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::{
    app::{AppState, ServiceError},
    jwt::Claims,
};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentRequest {
    amount: i64,
    currency: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonPaymentIntentResponse {
    client_secret: String,
}

pub async fn create_payment_intent(
    State(app_state): State<AppState>,
    _claims: Claims,
    Json(payload): Json<PaymentIntentRequest>,
) -> Result<Json<JsonPaymentIntentResponse>, ServiceError> {
    let service = app_state.payment_service.clone();
    let currency = payload.currency.unwrap_or_else(|| "usd".to_string());
    let intent = tokio::task::spawn_blocking(move || {
        service.create_payment_intent(payload.amount, &currency)
    })
    .await
    .map_err(|e| ServiceError::Internal(format!("Payment task failed: {}", e)))??;

    Ok(Json(JsonPaymentIntentResponse {
        client_secret: intent.client_secret,
    }))
}
