use axum::{extract::State, http::StatusCode, Json};
use tracing::{error, instrument};

use crate::state::AppState;

use super::dto::{
    selection_action, DayEndResponse, DayStartResponse, PhotoRequest, SelectRequest, TextRequest,
    TurnResponse, UserRequest,
};
use super::machine::{Action, TurnError};
use super::services::{self, ServiceError, TurnOutcome};

#[instrument(skip(state))]
pub async fn start_day(
    State(state): State<AppState>,
    Json(body): Json<UserRequest>,
) -> Result<Json<DayStartResponse>, (StatusCode, String)> {
    let started = services::start_day(&state, body.user_id)
        .await
        .map_err(service_error)?;
    Ok(Json(DayStartResponse {
        message: started.message,
        date: started.date,
        goals: started.goals,
    }))
}

#[instrument(skip(state))]
pub async fn end_day(
    State(state): State<AppState>,
    Json(body): Json<UserRequest>,
) -> Result<Json<DayEndResponse>, (StatusCode, String)> {
    let ended = services::end_day(&state, body.user_id)
        .await
        .map_err(service_error)?;
    Ok(Json(DayEndResponse {
        message: ended.message,
        date: ended.date,
        totals: ended.totals,
    }))
}

#[instrument(skip(state))]
pub async fn begin_entry(
    State(state): State<AppState>,
    Json(body): Json<UserRequest>,
) -> Result<Json<TurnResponse>, (StatusCode, String)> {
    run(&state, body.user_id, Action::NewEntry).await
}

#[instrument(skip(state))]
pub async fn select(
    State(state): State<AppState>,
    Json(body): Json<SelectRequest>,
) -> Result<Json<TurnResponse>, (StatusCode, String)> {
    let action = selection_action(&body.selection).ok_or((
        StatusCode::BAD_REQUEST,
        format!("unrecognized selection {:?}", body.selection),
    ))?;
    run(&state, body.user_id, action).await
}

#[instrument(skip(state, body))]
pub async fn text_message(
    State(state): State<AppState>,
    Json(body): Json<TextRequest>,
) -> Result<Json<TurnResponse>, (StatusCode, String)> {
    run(&state, body.user_id, Action::Text(body.text)).await
}

#[instrument(skip(state, body))]
pub async fn photo_message(
    State(state): State<AppState>,
    Json(body): Json<PhotoRequest>,
) -> Result<Json<TurnResponse>, (StatusCode, String)> {
    run(
        &state,
        body.user_id,
        Action::Photo {
            photo_ref: body.photo_ref,
            caption: body.caption,
        },
    )
    .await
}

#[instrument(skip(state))]
pub async fn ask_question(
    State(state): State<AppState>,
    Json(body): Json<UserRequest>,
) -> Result<Json<TurnResponse>, (StatusCode, String)> {
    run(&state, body.user_id, Action::AskQuestion).await
}

#[instrument(skip(state))]
pub async fn cancel(
    State(state): State<AppState>,
    Json(body): Json<UserRequest>,
) -> Result<Json<TurnResponse>, (StatusCode, String)> {
    run(&state, body.user_id, Action::Cancel).await
}

async fn run(
    state: &AppState,
    user_id: i64,
    action: Action,
) -> Result<Json<TurnResponse>, (StatusCode, String)> {
    let outcome = services::act(state, user_id, action)
        .await
        .map_err(service_error)?;
    Ok(reply(outcome))
}

fn reply(outcome: TurnOutcome) -> Json<TurnResponse> {
    Json(TurnResponse {
        message: outcome.message,
        state: outcome.state,
        totals: outcome.totals,
    })
}

fn service_error(e: ServiceError) -> (StatusCode, String) {
    match e {
        ServiceError::Turn(TurnError::Busy) => (StatusCode::CONFLICT, e.to_string()),
        ServiceError::Turn(_) => (StatusCode::BAD_REQUEST, e.to_string()),
        ServiceError::Transient(inner) => {
            error!(error = %inner, "collaborator failure");
            (
                StatusCode::BAD_GATEWAY,
                "temporary failure, please try again".into(),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_selection_is_a_local_reprompt() {
        let state = AppState::fake();
        let result = select(
            State(state),
            Json(SelectRequest {
                user_id: 1,
                selection: "brunch".into(),
            }),
        )
        .await;
        let (status, message) = result.err().expect("must be rejected");
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(message.contains("brunch"));
    }

    #[test]
    fn busy_maps_to_conflict() {
        let (status, _) = service_error(ServiceError::Turn(TurnError::Busy));
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = service_error(ServiceError::Turn(TurnError::DayNotStarted));
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, message) =
            service_error(ServiceError::Transient(anyhow::anyhow!("model down")));
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(!message.contains("model down"));
    }
}
