use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    app::{AppState, ServiceError},
    http::JsonInsertResponse,
    jwt::Claims,
    persistence::profiles::{AgeRange, DirectoryFilter},
    profile::{DEFAULT_PAGE_SIZE, NewProfile, Pagination, PremiumProfile, Profile, ProfileType},
};
use crate::account::Role;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryQuery {
    age_min: Option<i64>,
    age_max: Option<i64>,
    profile_type: Option<String>,
    division: Option<String>,
    page: Option<usize>,
    page_size: Option<usize>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonProfileResponse {
    profile_id: i64,
    profile_type: ProfileType,
    name: String,
    profile_image: String,
    date_of_birth: String,
    height: String,
    weight: String,
    age: i64,
    occupation: String,
    race: String,
    fathers_name: String,
    mothers_name: String,
    expected_partner_age: String,
    division: String,
    contact_email: String,
    mobile_number: String,
}

impl From<Profile> for JsonProfileResponse {
    fn from(profile: Profile) -> Self {
        Self {
            profile_id: profile.profile_id,
            profile_type: profile.profile_type,
            name: profile.name,
            profile_image: profile.profile_image,
            date_of_birth: profile.date_of_birth,
            height: profile.height,
            weight: profile.weight,
            age: profile.age,
            occupation: profile.occupation,
            race: profile.race,
            fathers_name: profile.fathers_name,
            mothers_name: profile.mothers_name,
            expected_partner_age: profile.expected_partner_age,
            division: profile.division,
            contact_email: profile.contact_email,
            mobile_number: profile.mobile_number,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonPremiumProfileResponse {
    role: Role,
    email: String,
    profile_id: Option<i64>,
    profile_type: Option<ProfileType>,
    profile_image: Option<String>,
    division: Option<String>,
    occupation: Option<String>,
    age: Option<i64>,
}

impl From<PremiumProfile> for JsonPremiumProfileResponse {
    fn from(premium: PremiumProfile) -> Self {
        Self {
            role: premium.role,
            email: premium.email,
            profile_id: premium.profile_id,
            profile_type: premium.profile_type,
            profile_image: premium.profile_image,
            division: premium.division,
            occupation: premium.occupation,
            age: premium.age,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonDirectoryResponse {
    items: Vec<JsonProfileResponse>,
    premium_items: Vec<JsonPremiumProfileResponse>,
    total_count: usize,
    total_pages: usize,
    current_page: usize,
}

fn parse_profile_type(value: &str) -> Result<ProfileType, ServiceError> {
    ProfileType::parse(value)
        .ok_or_else(|| ServiceError::BadRequest(format!("Invalid profile type: {}", value)))
}

// Age bounds only constrain the search when both ends are present.
fn age_filter(age_min: Option<i64>, age_max: Option<i64>) -> Option<AgeRange> {
    match (age_min, age_max) {
        (Some(min), Some(max)) => Some(AgeRange { min, max }),
        _ => None,
    }
}

pub async fn list(
    State(app_state): State<AppState>,
    Query(query): Query<DirectoryQuery>,
) -> Result<Json<JsonDirectoryResponse>, ServiceError> {
    let profile_type = query
        .profile_type
        .as_deref()
        .map(parse_profile_type)
        .transpose()?;
    let filter = DirectoryFilter {
        age: age_filter(query.age_min, query.age_max),
        profile_type,
        division: query.division,
    };
    let pagination = Pagination {
        page: query.page.filter(|&p| p > 0).unwrap_or(1),
        page_size: query
            .page_size
            .filter(|&s| s > 0)
            .unwrap_or(DEFAULT_PAGE_SIZE),
    };

    let page = app_state
        .profile_service
        .list_directory(&filter, &pagination)?;
    Ok(Json(JsonDirectoryResponse {
        items: page.items.into_iter().map(Into::into).collect(),
        premium_items: page.premium_items.into_iter().map(Into::into).collect(),
        total_count: page.total_count,
        total_pages: page.total_pages,
        current_page: page.current_page,
    }))
}

pub async fn get_by_id(
    State(app_state): State<AppState>,
    _claims: Claims,
    Path(profile_id): Path<i64>,
) -> Result<Json<JsonProfileResponse>, ServiceError> {
    let profile = app_state.profile_service.get_profile(profile_id)?;
    Ok(Json(profile.into()))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarQuery {
    email: String,
    profile_type: String,
}

pub async fn similar(
    State(app_state): State<AppState>,
    Query(query): Query<SimilarQuery>,
) -> Result<Json<Vec<JsonProfileResponse>>, ServiceError> {
    let profile_type = parse_profile_type(&query.profile_type)?;
    let similar = app_state
        .profile_service
        .similar_profiles(profile_type, &query.email)?;
    Ok(Json(similar.into_iter().map(Into::into).collect()))
}

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitProfileRequest {
    profile_type: String,
    name: String,
    #[serde(default)]
    profile_image: String,
    #[serde(default)]
    date_of_birth: String,
    #[serde(default)]
    height: String,
    #[serde(default)]
    weight: String,
    age: i64,
    #[serde(default)]
    occupation: String,
    #[serde(default)]
    race: String,
    #[serde(default)]
    fathers_name: String,
    #[serde(default)]
    mothers_name: String,
    #[serde(default)]
    expected_partner_age: String,
    division: String,
    #[validate(email)]
    contact_email: String,
    #[serde(default)]
    mobile_number: String,
}

pub async fn submit(
    State(app_state): State<AppState>,
    claims: Claims,
    Json(payload): Json<SubmitProfileRequest>,
) -> Result<Json<JsonInsertResponse>, ServiceError> {
    payload
        .validate()
        .map_err(|e| ServiceError::BadRequest(format!("Invalid biodata: {}", e)))?;
    // Members may only submit biodata under their own login email.
    claims.require_self(&payload.contact_email)?;
    let profile_type = parse_profile_type(&payload.profile_type)?;

    let outcome = app_state.profile_service.submit_profile(NewProfile {
        profile_type,
        name: payload.name,
        profile_image: payload.profile_image,
        date_of_birth: payload.date_of_birth,
        height: payload.height,
        weight: payload.weight,
        age: payload.age,
        occupation: payload.occupation,
        race: payload.race,
        fathers_name: payload.fathers_name,
        mothers_name: payload.mothers_name,
        expected_partner_age: payload.expected_partner_age,
        division: payload.division,
        contact_email: payload.contact_email,
        mobile_number: payload.mobile_number,
    })?;

    Ok(Json(JsonInsertResponse {
        inserted_id: outcome.inserted_id(),
    }))
}
