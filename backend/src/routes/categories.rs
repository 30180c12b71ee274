use std::sync::Arc;

use axum::{extract::State, Json};

use crate::{categories::CategorySummary, AppState};

/// List the available puzzle categories
pub async fn list_categories(State(state): State<Arc<AppState>>) -> Json<Vec<CategorySummary>> {
    Json(state.categories.summaries())
}
