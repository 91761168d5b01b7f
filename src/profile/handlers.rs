use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::{error, instrument};

use crate::state::AppState;

use super::repo::{self, UserProfile};
use super::services::daily_goals;

#[derive(Debug, Deserialize)]
pub struct UpsertProfileRequest {
    pub user_id: i64,
    pub height_cm: i32,
    pub weight_kg: i32,
    pub age_years: i32,
    pub gender: String,
    pub goal: String,
}

#[instrument(skip(state))]
pub async fn upsert_profile(
    State(state): State<AppState>,
    Json(body): Json<UpsertProfileRequest>,
) -> Result<Json<UserProfile>, (StatusCode, String)> {
    let goals = daily_goals(
        body.height_cm,
        body.weight_kg,
        body.age_years,
        &body.gender,
        &body.goal,
    )
    .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    let profile = UserProfile {
        user_id: body.user_id,
        height_cm: body.height_cm,
        weight_kg: body.weight_kg,
        age_years: body.age_years,
        gender: body.gender,
        goal: body.goal,
        calories: goals.calories,
        protein_g: goals.protein,
        fat_g: goals.fat,
        carbs_g: goals.carbs,
    };

    let saved = repo::upsert(&state.db, &profile).await.map_err(internal)?;
    Ok(Json(saved))
}

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<UserProfile>, (StatusCode, String)> {
    match repo::get(&state.db, user_id).await {
        Ok(Some(profile)) => Ok(Json(profile)),
        Ok(None) => Err((StatusCode::NOT_FOUND, "Profile not found".into())),
        Err(e) => {
            error!(error = %e, %user_id, "get_profile failed");
            Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}

fn internal(e: anyhow::Error) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}
