use std::fmt;

use serde::{Deserialize, Serialize};

/// A grid coordinate. `x` is the column, `y` the row, origin at the top left.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Convert signed client coordinates into a position inside a `size`x`size` grid.
    /// Returns `None` for anything that lands outside.
    pub fn checked(x: i64, y: i64, size: usize) -> Option<Self> {
        let x = usize::try_from(x).ok()?;
        let y = usize::try_from(y).ok()?;
        (x < size && y < size).then_some(Self { x, y })
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Horizontal,
    Vertical,
}

impl Direction {
    /// Unit step `(dx, dy)` for this direction
    pub fn step(self) -> (usize, usize) {
        match self {
            Direction::Horizontal => (1, 0),
            Direction::Vertical => (0, 1),
        }
    }

    /// Positions covered by a run of `len` cells starting at `start`
    pub fn path(self, start: Position, len: usize) -> impl Iterator<Item = Position> {
        let (dx, dy) = self.step();
        (0..len).map(move |i| Position::new(start.x + i * dx, start.y + i * dy))
    }
}

/// Where a target word was written into the grid
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct Placement {
    pub word: String,
    pub start: Position,
    pub direction: Direction,
}

impl Placement {
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.direction.path(self.start, self.word.chars().count())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct GridCell {
    pub letter: char,
    /// Placed words running through this cell; empty for filler
    pub words: Vec<String>,
}

impl GridCell {
    pub fn is_filler(&self) -> bool {
        self.words.is_empty()
    }
}

/// Square letter grid stored row-major (`cells[y][x]`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grid {
    size: usize,
    cells: Vec<Vec<GridCell>>,
}

impl Grid {
    pub(crate) fn from_cells(cells: Vec<Vec<GridCell>>) -> Self {
        Self {
            size: cells.len(),
            cells,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, pos: Position) -> Option<&GridCell> {
        self.cells.get(pos.y).and_then(|row| row.get(pos.x))
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.x < self.size && pos.y < self.size
    }

    pub fn rows(&self) -> &[Vec<GridCell>] {
        &self.cells
    }

    /// Concatenate the letters at `positions`, skipping any that fall outside the grid
    pub fn read(&self, positions: &[Position]) -> String {
        positions
            .iter()
            .filter_map(|pos| self.get(*pos))
            .map(|cell| cell.letter)
            .collect()
    }

    /// Read a placement back out of the grid
    pub fn read_placement(&self, placement: &Placement) -> String {
        let positions: Vec<Position> = placement.positions().collect();
        self.read(&positions)
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.cells {
            let line: Vec<String> = row.iter().map(|cell| cell.letter.to_string()).collect();
            writeln!(f, "{}", line.join(" "))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    Empty,
    InvalidCharacters,
    TooLong,
    NoSlot,
}

/// A target word that could not be written into the grid
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct SkippedWord {
    pub word: String,
    pub reason: SkipReason,
}
