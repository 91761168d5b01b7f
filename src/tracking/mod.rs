mod dto;
pub mod handlers;
pub mod machine;
pub mod recap;
mod services;
mod session;
mod totals;

pub use session::{SessionStore, TrackingSession};
pub use totals::{DailyTotals, Goals};

use crate::state::AppState;
use axum::{routing::post, Router};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/track/day/start", post(handlers::start_day))
        .route("/track/day/end", post(handlers::end_day))
        .route("/track/entry", post(handlers::begin_entry))
        .route("/track/select", post(handlers::select))
        .route("/track/text", post(handlers::text_message))
        .route("/track/photo", post(handlers::photo_message))
        .route("/track/question", post(handlers::ask_question))
        .route("/track/cancel", post(handlers::cancel))
}
