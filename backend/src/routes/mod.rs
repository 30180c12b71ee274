pub mod categories;
pub mod health;
pub mod puzzles;

use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::AppState;

pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api", api_routes())
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/categories", get(categories::list_categories))
        .route("/puzzles", post(puzzles::create_puzzle))
        .route(
            "/puzzles/{id}",
            get(puzzles::get_puzzle).delete(puzzles::delete_puzzle),
        )
        .route("/puzzles/{id}/regenerate", post(puzzles::regenerate_puzzle))
        .route("/puzzles/{id}/select", post(puzzles::select_cell))
        .route("/puzzles/{id}/selection", delete(puzzles::clear_selection))
}
