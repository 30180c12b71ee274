use serde::{Deserialize, Serialize};

use crate::models::{PuzzleView, SelectionView};

/// Messages sent from client to server. Coordinates are grid cells, not pixels.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    DragStart {
        x: i64,
        y: i64,
    },
    DragMove {
        x: i64,
        y: i64,
    },
    DragEnd,
    DragCancel,
    Click {
        x: i64,
        y: i64,
    },
    Clear,
    Regenerate {
        #[serde(default)]
        category: Option<String>,
    },
    Sync,
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    PuzzleState {
        puzzle: PuzzleView,
    },
    Selection {
        selection: SelectionView,
    },
    WordFound {
        word: String,
        newly_found: bool,
        found: Vec<String>,
        all_found: bool,
    },
    PuzzleComplete,
    Error {
        message: String,
    },
}
