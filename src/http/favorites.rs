use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};

use crate::{
    app::{AppState, ServiceError},
    favorite::FavoriteView,
    http::{JsonDeletedResponse, JsonInsertResponse},
    jwt::Claims,
};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddFavoriteRequest {
    profile_id: i64,
}

pub async fn add(
    State(app_state): State<AppState>,
    claims: Claims,
    Json(payload): Json<AddFavoriteRequest>,
) -> Result<Json<JsonInsertResponse>, ServiceError> {
    let id = app_state
        .favorite_service
        .add(&claims.sub, payload.profile_id)?;
    Ok(Json(JsonInsertResponse {
        inserted_id: Some(id),
    }))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonFavoriteResponse {
    id: i64,
    owner_email: String,
    profile_id: i64,
    created_at: i64,
    name: Option<String>,
    division: Option<String>,
    occupation: Option<String>,
}

impl From<FavoriteView> for JsonFavoriteResponse {
    fn from(view: FavoriteView) -> Self {
        Self {
            id: view.id,
            owner_email: view.owner_email,
            profile_id: view.profile_id,
            created_at: view.created_at,
            name: view.name,
            division: view.division,
            occupation: view.occupation,
        }
    }
}

pub async fn list_for(
    State(app_state): State<AppState>,
    claims: Claims,
    Path(email): Path<String>,
) -> Result<Json<Vec<JsonFavoriteResponse>>, ServiceError> {
    claims.require_self(&email)?;
    let views = app_state.favorite_service.list_for(&email)?;
    Ok(Json(views.into_iter().map(Into::into).collect()))
}

pub async fn remove(
    State(app_state): State<AppState>,
    claims: Claims,
    Path(id): Path<i64>,
) -> Result<Json<JsonDeletedResponse>, ServiceError> {
    let deleted = app_state.favorite_service.remove_own(id, &claims.sub)?;
    Ok(Json(JsonDeletedResponse {
        deleted_count: deleted,
    }))
}
