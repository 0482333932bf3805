use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};

use crate::{
    app::{AppState, ServiceError},
    contact_request::{ContactRequestView, RequestStatus},
    http::{JsonDeletedResponse, JsonInsertResponse, JsonMatchedResponse},
    jwt::Claims,
};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateContactRequest {
    profile_id: i64,
}

pub async fn create(
    State(app_state): State<AppState>,
    claims: Claims,
    Json(payload): Json<CreateContactRequest>,
) -> Result<Json<JsonInsertResponse>, ServiceError> {
    let id = app_state
        .contact_request_service
        .create(&claims.sub, payload.profile_id)?;
    Ok(Json(JsonInsertResponse {
        inserted_id: Some(id),
    }))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonContactRequestResponse {
    id: i64,
    profile_id: i64,
    requester_email: String,
    status: RequestStatus,
    created_at: i64,
    name: Option<String>,
    contact_email: Option<String>,
    mobile_number: Option<String>,
}

impl From<ContactRequestView> for JsonContactRequestResponse {
    fn from(view: ContactRequestView) -> Self {
        Self {
            id: view.id,
            profile_id: view.profile_id,
            requester_email: view.requester_email,
            status: view.status,
            created_at: view.created_at,
            name: view.name,
            contact_email: view.contact_email,
            mobile_number: view.mobile_number,
        }
    }
}

pub async fn list_for(
    State(app_state): State<AppState>,
    claims: Claims,
    Path(email): Path<String>,
) -> Result<Json<Vec<JsonContactRequestResponse>>, ServiceError> {
    claims.require_self(&email)?;
    let views = app_state.contact_request_service.list_for(&email)?;
    Ok(Json(views.into_iter().map(Into::into).collect()))
}

pub async fn pending(
    State(app_state): State<AppState>,
    claims: Claims,
) -> Result<Json<Vec<JsonContactRequestResponse>>, ServiceError> {
    app_state.account_service.authorize_admin(&claims.sub)?;
    let views = app_state.contact_request_service.pending()?;
    Ok(Json(views.into_iter().map(Into::into).collect()))
}

pub async fn approve(
    State(app_state): State<AppState>,
    claims: Claims,
    Path(id): Path<i64>,
) -> Result<Json<JsonMatchedResponse>, ServiceError> {
    app_state.account_service.authorize_admin(&claims.sub)?;
    let matched = app_state.contact_request_service.approve(id)?;
    Ok(Json(JsonMatchedResponse {
        matched_count: matched,
    }))
}

pub async fn remove(
    State(app_state): State<AppState>,
    claims: Claims,
    Path(id): Path<i64>,
) -> Result<Json<JsonDeletedResponse>, ServiceError> {
    let deleted = app_state
        .contact_request_service
        .remove_own(id, &claims.sub)?;
    Ok(Json(JsonDeletedResponse {
        deleted_count: deleted,
    }))
}
