mod handlers;
pub(crate) mod repo;
mod services;

pub use repo::UserProfile;

use crate::state::AppState;
use axum::{
    routing::{get, put},
    Router,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/profile", put(handlers::upsert_profile))
        .route("/profile/:user_id", get(handlers::get_profile))
}
