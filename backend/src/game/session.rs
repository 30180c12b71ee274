use std::{collections::BTreeSet, time::Instant};

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    game::{
        generator::{GeneratorOptions, GridGenerator},
        selection::{SelectionTracker, TrackerEvent},
    },
    models::{Grid, Placement, Position, SkippedWord},
};

/// Result of feeding one interaction into a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SelectionOutcome {
    Ignored,
    Started,
    /// The drag was let go; the selection is kept
    Released,
    Cleared,
    Extended { word: String },
    Matched { word: String, newly_found: bool },
}

impl SelectionOutcome {
    pub fn is_match(&self) -> bool {
        matches!(self, SelectionOutcome::Matched { .. })
    }
}

/// In-memory state for one puzzle
#[derive(Debug)]
pub struct PuzzleSession {
    pub id: Uuid,
    pub category: String,
    pub created_at: DateTime<Utc>,
    pub last_active: Instant,
    grid: Grid,
    placements: Vec<Placement>,
    words: Vec<String>,
    skipped: Vec<SkippedWord>,
    found: BTreeSet<String>,
    selection: SelectionTracker,
}

impl PuzzleSession {
    pub fn new(
        category: &str,
        words: &[String],
        options: &GeneratorOptions,
        rng: &mut impl Rng,
    ) -> Self {
        let mut session = Self {
            id: Uuid::new_v4(),
            category: String::new(),
            created_at: Utc::now(),
            last_active: Instant::now(),
            grid: Grid::from_cells(Vec::new()),
            placements: Vec::new(),
            words: Vec::new(),
            skipped: Vec::new(),
            found: BTreeSet::new(),
            selection: SelectionTracker::new(options.size),
        };
        session.regenerate(category, words, options, rng);
        session
    }

    /// Replace the grid with a freshly generated one. Found words and selection are reset.
    ///
    /// Words that could not be placed are dropped from the target list so the puzzle
    /// stays completable; they remain visible through [`PuzzleSession::skipped`].
    pub fn regenerate(
        &mut self,
        category: &str,
        words: &[String],
        options: &GeneratorOptions,
        rng: &mut impl Rng,
    ) {
        let generated = GridGenerator::generate(words, options, rng);

        self.category = category.to_string();
        self.words = generated.placed_words();
        self.grid = generated.grid;
        self.placements = generated.placements;
        self.skipped = generated.skipped;
        self.found.clear();
        self.selection = SelectionTracker::new(options.size);
        self.touch();

        tracing::info!(
            "Session {} generated {} puzzle with {} words ({} skipped)",
            self.id,
            self.category,
            self.words.len(),
            self.skipped.len()
        );
    }

    pub fn touch(&mut self) {
        self.last_active = Instant::now();
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    /// Target words still reachable in the grid
    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn skipped(&self) -> &[SkippedWord] {
        &self.skipped
    }

    pub fn found(&self) -> &BTreeSet<String> {
        &self.found
    }

    pub fn selection(&self) -> &SelectionTracker {
        &self.selection
    }

    pub fn all_found(&self) -> bool {
        self.words.iter().all(|word| self.found.contains(word))
    }

    /// Translate signed client coordinates into a grid position
    pub fn position(&self, x: i64, y: i64) -> Option<Position> {
        Position::checked(x, y, self.grid.size())
    }

    /// Mouse-style interaction: continue the current selection or start a new one
    pub fn click(&mut self, pos: Position) -> SelectionOutcome {
        let event = self.selection.extend(pos);
        self.settle(event)
    }

    /// Drop the current selection and anchor a new one at `pos`, without holding a drag
    pub fn restart(&mut self, pos: Position) -> SelectionOutcome {
        self.selection.release_drag();
        let event = self.selection.start(pos);
        self.settle(event)
    }

    /// Always anchors a fresh selection at `pos`
    pub fn drag_start(&mut self, pos: Position) -> SelectionOutcome {
        let event = self.selection.drag_start(pos);
        self.settle(event)
    }

    pub fn drag_move(&mut self, pos: Position) -> SelectionOutcome {
        let event = self.selection.drag_move(pos);
        self.settle(event)
    }

    /// End of drag. The selection itself is left in place.
    pub fn drag_end(&mut self) -> SelectionOutcome {
        self.touch();
        if self.selection.release_drag() {
            SelectionOutcome::Released
        } else {
            SelectionOutcome::Ignored
        }
    }

    /// A cancelled drag discards the partial selection
    pub fn drag_cancel(&mut self) -> SelectionOutcome {
        self.touch();
        if self.selection.release_drag() {
            self.selection.reset();
            SelectionOutcome::Cleared
        } else {
            SelectionOutcome::Ignored
        }
    }

    pub fn clear_selection(&mut self) -> SelectionOutcome {
        self.touch();
        self.selection.release_drag();
        self.selection.reset();
        SelectionOutcome::Cleared
    }

    fn settle(&mut self, event: TrackerEvent) -> SelectionOutcome {
        self.touch();
        match event {
            TrackerEvent::Ignored => SelectionOutcome::Ignored,
            TrackerEvent::Started => SelectionOutcome::Started,
            TrackerEvent::Cleared => SelectionOutcome::Cleared,
            TrackerEvent::Extended => {
                let word = self.selected_word();
                if !self.words.contains(&word) {
                    return SelectionOutcome::Extended { word };
                }

                let newly_found = self.found.insert(word.clone());
                self.selection.release_drag();
                self.selection.reset();

                tracing::debug!(
                    "Session {} matched {} (newly found: {})",
                    self.id,
                    word,
                    newly_found
                );

                SelectionOutcome::Matched { word, newly_found }
            }
        }
    }

    /// Letters under the current selection, read in row-major scan order
    pub fn selected_word(&self) -> String {
        self.grid.read(self.selection.cells())
    }
}
