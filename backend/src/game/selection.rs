use serde::Serialize;

use crate::models::Position;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionState {
    /// No active selection
    Idle,
    /// A run anchored at `anchor`; `run` is kept in row-major order
    Selecting { anchor: Position, run: Vec<Position> },
}

/// What a single input did to the tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackerEvent {
    /// Input was out of range or not allowed in the current state
    Ignored,
    /// A fresh anchor was set
    Started,
    /// The run was recomputed from the anchor
    Extended,
    /// The selection was dropped
    Cleared,
}

/// Turns cell interactions into a straight-line selection run.
///
/// Drags are scoped: `drag_move` only has an effect between `drag_start` and
/// `drag_end`/`drag_cancel`. Releasing a drag keeps the selection so that a later
/// click can still complete it.
#[derive(Debug, Clone)]
pub struct SelectionTracker {
    size: usize,
    state: SelectionState,
    dragging: bool,
}

impl SelectionTracker {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            state: SelectionState::Idle,
            dragging: false,
        }
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn is_selecting(&self) -> bool {
        matches!(self.state, SelectionState::Selecting { .. })
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn anchor(&self) -> Option<Position> {
        match &self.state {
            SelectionState::Idle => None,
            SelectionState::Selecting { anchor, .. } => Some(*anchor),
        }
    }

    /// Selected cells in row-major order
    pub fn cells(&self) -> &[Position] {
        match &self.state {
            SelectionState::Idle => &[],
            SelectionState::Selecting { run, .. } => run,
        }
    }

    /// Per-cell selection flags, indexed `[y][x]`
    pub fn mask(&self) -> Vec<Vec<bool>> {
        let mut mask = vec![vec![false; self.size]; self.size];
        for pos in self.cells() {
            mask[pos.y][pos.x] = true;
        }
        mask
    }

    fn in_bounds(&self, pos: Position) -> bool {
        pos.x < self.size && pos.y < self.size
    }

    /// Drop any selection and start a new one anchored at `pos`
    pub fn start(&mut self, pos: Position) -> TrackerEvent {
        if !self.in_bounds(pos) {
            return TrackerEvent::Ignored;
        }
        self.state = SelectionState::Selecting {
            anchor: pos,
            run: vec![pos],
        };
        TrackerEvent::Started
    }

    /// Continue the current selection towards `pos`, or start one if idle
    pub fn extend(&mut self, pos: Position) -> TrackerEvent {
        if !self.in_bounds(pos) {
            return TrackerEvent::Ignored;
        }
        match &mut self.state {
            SelectionState::Idle => self.start(pos),
            SelectionState::Selecting { anchor, run } => {
                *run = Self::line(*anchor, pos);
                TrackerEvent::Extended
            }
        }
    }

    /// Return to `Idle`. The drag, if any, stays held.
    pub fn reset(&mut self) -> TrackerEvent {
        self.state = SelectionState::Idle;
        TrackerEvent::Cleared
    }

    pub fn drag_start(&mut self, pos: Position) -> TrackerEvent {
        let event = self.start(pos);
        if event == TrackerEvent::Started {
            self.dragging = true;
        }
        event
    }

    pub fn drag_move(&mut self, pos: Position) -> TrackerEvent {
        if !self.dragging || !self.is_selecting() {
            return TrackerEvent::Ignored;
        }
        self.extend(pos)
    }

    /// Release the drag. Returns whether one was held.
    pub fn release_drag(&mut self) -> bool {
        std::mem::replace(&mut self.dragging, false)
    }

    /// Axis-aligned run from `anchor` towards `target`.
    ///
    /// `|dx| >= |dy|` picks the anchor's row, otherwise the anchor's column, so ties go
    /// horizontal. Cells come back in row-major scan order regardless of drag direction.
    pub fn line(anchor: Position, target: Position) -> Vec<Position> {
        let dx = anchor.x.abs_diff(target.x);
        let dy = anchor.y.abs_diff(target.y);

        if dx >= dy {
            let (from, to) = (anchor.x.min(target.x), anchor.x.max(target.x));
            (from..=to).map(|x| Position::new(x, anchor.y)).collect()
        } else {
            let (from, to) = (anchor.y.min(target.y), anchor.y.max(target.y));
            (from..=to).map(|y| Position::new(anchor.x, y)).collect()
        }
    }
}
