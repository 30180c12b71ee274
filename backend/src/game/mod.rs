// Puzzle engine: grid generation, selection tracking, per-puzzle session state

pub mod generator;
pub mod selection;
pub mod session;

pub use generator::GeneratorOptions;
pub use session::{PuzzleSession, SelectionOutcome};
