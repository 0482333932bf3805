use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::{
    app::{AppState, ServiceError},
    http::JsonInsertResponse,
    jwt::Claims,
    story::{NewStory, Story},
};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitStoryRequest {
    self_profile_id: i64,
    partner_profile_id: i64,
    #[serde(default)]
    couple_image: String,
    marriage_date: String,
    #[serde(default)]
    review: String,
}

pub async fn submit(
    State(app_state): State<AppState>,
    _claims: Claims,
    Json(payload): Json<SubmitStoryRequest>,
) -> Result<Json<JsonInsertResponse>, ServiceError> {
    let id = app_state.story_service.submit(NewStory {
        self_profile_id: payload.self_profile_id,
        partner_profile_id: payload.partner_profile_id,
        couple_image: payload.couple_image,
        marriage_date: payload.marriage_date,
        review: payload.review,
    })?;
    Ok(Json(JsonInsertResponse {
        inserted_id: Some(id),
    }))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonStoryResponse {
    id: i64,
    self_profile_id: i64,
    partner_profile_id: i64,
    couple_image: String,
    marriage_date: String,
    review: String,
}

impl From<Story> for JsonStoryResponse {
    fn from(story: Story) -> Self {
        Self {
            id: story.id,
            self_profile_id: story.self_profile_id,
            partner_profile_id: story.partner_profile_id,
            couple_image: story.couple_image,
            marriage_date: story.marriage_date,
            review: story.review,
        }
    }
}

pub async fn list(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<JsonStoryResponse>>, ServiceError> {
    let stories = app_state.story_service.list()?;
    Ok(Json(stories.into_iter().map(Into::into).collect()))
}
