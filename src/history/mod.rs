mod calendar;
mod dto;
pub mod handlers;
mod services;

use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/history/day/:user_id/:date", get(handlers::day))
        .route("/history/calendar/:year/:month", get(handlers::calendar))
        .route("/history/period", post(handlers::period))
}
