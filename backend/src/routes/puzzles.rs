use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    error::AppResult,
    game::SelectionOutcome,
    models::{PuzzleView, SelectionView},
    AppState,
};

#[derive(Debug, Default, Deserialize)]
pub struct PuzzleRequest {
    pub category: Option<String>,
}

/// A cell interaction in grid coordinates. Values outside the grid are ignored.
#[derive(Debug, Deserialize)]
pub struct SelectRequest {
    pub x: i64,
    pub y: i64,
    /// Start a new selection here instead of continuing the current one
    #[serde(default)]
    pub fresh: bool,
}

/// Create a new puzzle session
pub async fn create_puzzle(
    State(state): State<Arc<AppState>>,
    payload: Option<Json<PuzzleRequest>>,
) -> AppResult<(StatusCode, Json<PuzzleView>)> {
    let Json(request) = payload.unwrap_or_default();
    let view = state.create_session(request.category.as_deref())?;
    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn get_puzzle(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<PuzzleView>> {
    Ok(Json(state.puzzle_view(id)?))
}

/// Replace the grid, optionally switching category. Progress is reset.
pub async fn regenerate_puzzle(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    payload: Option<Json<PuzzleRequest>>,
) -> AppResult<Json<PuzzleView>> {
    let Json(request) = payload.unwrap_or_default();
    Ok(Json(state.regenerate(id, request.category.as_deref())?))
}

pub async fn select_cell(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<SelectRequest>,
) -> AppResult<Json<SelectionView>> {
    let view = state.with_session(id, |session| {
        let outcome = match session.position(request.x, request.y) {
            Some(pos) if request.fresh => session.restart(pos),
            Some(pos) => session.click(pos),
            None => {
                session.touch();
                SelectionOutcome::Ignored
            }
        };
        tracing::debug!(
            "Session {} select ({}, {}): {:?}",
            id,
            request.x,
            request.y,
            outcome
        );
        SelectionView::from_session(session, Some(outcome))
    })?;
    Ok(Json(view))
}

pub async fn clear_selection(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<SelectionView>> {
    let view = state.with_session(id, |session| {
        let outcome = session.clear_selection();
        SelectionView::from_session(session, Some(outcome))
    })?;
    Ok(Json(view))
}

pub async fn delete_puzzle(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.remove_session(id)?;
    Ok(StatusCode::NO_CONTENT)
}
