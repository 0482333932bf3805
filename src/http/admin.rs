use axum::{Json, extract::State};
use serde::Serialize;

use crate::{
    account::Role,
    app::{AppState, ServiceError},
    jwt::Claims,
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonAdminStatsResponse {
    total_profiles: usize,
    male_profiles: usize,
    female_profiles: usize,
    premium_accounts: usize,
    pending_contact_requests: usize,
}

pub async fn stats(
    State(app_state): State<AppState>,
    claims: Claims,
) -> Result<Json<JsonAdminStatsResponse>, ServiceError> {
    app_state.account_service.authorize_admin(&claims.sub)?;

    let profile_stats = app_state.profile_service.stats()?;
    let premium_accounts = app_state.account_service.count_by_role(Role::Premium)?;
    let pending_contact_requests = app_state.contact_request_service.count_pending()?;

    Ok(Json(JsonAdminStatsResponse {
        total_profiles: profile_stats.total,
        male_profiles: profile_stats.male,
        female_profiles: profile_stats.female,
        premium_accounts,
        pending_contact_requests,
    }))
}
