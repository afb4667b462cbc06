use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post, put}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/seasons", get(handlers::list_seasons))
        .route("/api/seasons/current", get(handlers::get_current_season))
        .route("/api/seasons/at", get(handlers::get_season_at))
        .route("/api/seasons/:id", get(handlers::get_season))
        .route("/api/heatmap", post(handlers::build_heatmap))
        .route("/api/characters/:name/history", post(handlers::add_history))
        .route("/api/characters/:name/alts", put(handlers::set_alts))
        .route("/api/characters/:name/heatmap", get(handlers::get_heatmap))
        .route("/api/characters/:name/seasons", get(handlers::get_character_seasons))
        .with_state(state)
}
