use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    game::{PuzzleSession, SelectionOutcome},
    models::{GridCell, Position, SkippedWord},
};

/// Current selection as the renderer needs it
#[derive(Debug, Clone, Serialize)]
pub struct SelectionView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<SelectionOutcome>,
    pub anchor: Option<Position>,
    pub cells: Vec<Position>,
    /// Selection flags indexed `[y][x]`
    pub mask: Vec<Vec<bool>>,
    pub found: Vec<String>,
    pub all_found: bool,
}

impl SelectionView {
    pub fn from_session(session: &PuzzleSession, outcome: Option<SelectionOutcome>) -> Self {
        let selection = session.selection();
        Self {
            outcome,
            anchor: selection.anchor(),
            cells: selection.cells().to_vec(),
            mask: selection.mask(),
            found: session.found().iter().cloned().collect(),
            all_found: session.all_found(),
        }
    }
}

/// Full puzzle snapshot. Placements stay server-side.
#[derive(Debug, Clone, Serialize)]
pub struct PuzzleView {
    pub id: Uuid,
    pub category: String,
    pub label: String,
    pub size: usize,
    pub grid: Vec<Vec<GridCell>>,
    pub words: Vec<String>,
    pub skipped: Vec<SkippedWord>,
    pub found: Vec<String>,
    pub all_found: bool,
    pub selection: SelectionView,
    pub created_at: DateTime<Utc>,
}

impl PuzzleView {
    pub fn from_session(session: &PuzzleSession, label: &str) -> Self {
        Self {
            id: session.id,
            category: session.category.clone(),
            label: label.to_string(),
            size: session.grid().size(),
            grid: session.grid().rows().to_vec(),
            words: session.words().to_vec(),
            skipped: session.skipped().to_vec(),
            found: session.found().iter().cloned().collect(),
            all_found: session.all_found(),
            selection: SelectionView::from_session(session, None),
            created_at: session.created_at,
        }
    }
}
