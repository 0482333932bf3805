use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};

use crate::{
    account::{Account, Role, RoleGrant},
    app::{AppState, ServiceError},
    http::{JsonInsertResponse, JsonMatchedResponse},
    jwt::Claims,
};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    email: String,
    name: String,
    #[serde(default)]
    photo_url: String,
}

pub async fn register(
    State(app_state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<JsonInsertResponse>, ServiceError> {
    let outcome =
        app_state
            .account_service
            .register(&payload.email, &payload.name, &payload.photo_url)?;
    Ok(Json(JsonInsertResponse {
        inserted_id: outcome.inserted_id(),
    }))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonAccountResponse {
    id: i64,
    email: String,
    name: String,
    photo_url: String,
    role: Role,
    created_at: i64,
}

impl From<Account> for JsonAccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            email: account.email,
            name: account.name,
            photo_url: account.photo_url,
            role: account.role,
            created_at: account.created_at,
        }
    }
}

#[derive(Deserialize)]
pub struct AccountSearchQuery {
    search: Option<String>,
}

pub async fn list(
    State(app_state): State<AppState>,
    claims: Claims,
    Query(query): Query<AccountSearchQuery>,
) -> Result<Json<Vec<JsonAccountResponse>>, ServiceError> {
    app_state.account_service.authorize_admin(&claims.sub)?;
    let accounts = app_state
        .account_service
        .list_accounts(query.search.as_deref())?;
    Ok(Json(accounts.into_iter().map(Into::into).collect()))
}

#[derive(Serialize)]
pub struct JsonAdminFlagResponse {
    admin: bool,
}

pub async fn admin_flag(
    State(app_state): State<AppState>,
    claims: Claims,
    Path(email): Path<String>,
) -> Result<Json<JsonAdminFlagResponse>, ServiceError> {
    claims.require_self(&email)?;
    let admin = app_state.account_service.is_admin(&email)?;
    Ok(Json(JsonAdminFlagResponse { admin }))
}

#[derive(Deserialize)]
pub struct RoleUpdateRequest {
    role: RoleGrant,
}

pub async fn set_role(
    State(app_state): State<AppState>,
    claims: Claims,
    Path(email): Path<String>,
    Json(payload): Json<RoleUpdateRequest>,
) -> Result<Json<JsonMatchedResponse>, ServiceError> {
    app_state.account_service.authorize_admin(&claims.sub)?;
    let matched = app_state.account_service.grant_role(&email, payload.role)?;
    Ok(Json(JsonMatchedResponse {
        matched_count: matched,
    }))
}

pub async fn request_premium(
    State(app_state): State<AppState>,
    claims: Claims,
    Path(email): Path<String>,
) -> Result<Json<JsonMatchedResponse>, ServiceError> {
    claims.require_self(&email)?;
    let matched = app_state.account_service.request_premium(&email)?;
    Ok(Json(JsonMatchedResponse {
        matched_count: matched,
    }))
}
