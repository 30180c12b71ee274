pub mod puzzle;
pub mod view;

pub use puzzle::{Direction, Grid, GridCell, Placement, Position, SkipReason, SkippedWord};
pub use view::{PuzzleView, SelectionView};
