use std::collections::HashSet;

use rand::Rng;

use crate::{
    models::{Direction, Grid, GridCell, Placement, Position, SkipReason, SkippedWord},
    utils::letters::FillerDistribution,
};

pub const DEFAULT_GRID_SIZE: usize = 12;
pub const DEFAULT_PLACEMENT_ATTEMPTS: usize = 100;

#[derive(Debug, Clone, Copy)]
pub struct GeneratorOptions {
    /// Grid dimension; the grid is always square
    pub size: usize,
    /// Random placement attempts per word before it is skipped
    pub max_attempts: usize,
    pub filler: FillerDistribution,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            size: DEFAULT_GRID_SIZE,
            max_attempts: DEFAULT_PLACEMENT_ATTEMPTS,
            filler: FillerDistribution::Uniform,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GeneratedPuzzle {
    pub grid: Grid,
    pub placements: Vec<Placement>,
    pub skipped: Vec<SkippedWord>,
}

impl GeneratedPuzzle {
    /// Placed words, in input order
    pub fn placed_words(&self) -> Vec<String> {
        self.placements.iter().map(|p| p.word.clone()).collect()
    }
}

/// Working cell while words are being laid out
#[derive(Debug, Clone, Default)]
struct Slot {
    letter: Option<char>,
    words: Vec<String>,
}

pub struct GridGenerator;

impl GridGenerator {
    /// Lay `words` into a square grid, then fill the rest with random letters.
    ///
    /// Each word gets up to `options.max_attempts` random tries at an orientation and start
    /// cell. A try succeeds when every cell on the path is free or already holds the same
    /// letter. Words that never fit are reported in [`GeneratedPuzzle::skipped`] instead of
    /// failing the whole puzzle.
    pub fn generate<S: AsRef<str>>(
        words: &[S],
        options: &GeneratorOptions,
        rng: &mut impl Rng,
    ) -> GeneratedPuzzle {
        let size = options.size;
        let mut slots = vec![vec![Slot::default(); size]; size];
        let mut placements = Vec::with_capacity(words.len());
        let mut skipped = Vec::new();
        let mut seen = HashSet::new();

        for word in words {
            let word = word.as_ref();
            if !seen.insert(word.to_string()) {
                tracing::debug!("Ignoring duplicate word {}", word);
                continue;
            }

            if let Some(reason) = Self::reject_reason(word, size) {
                tracing::warn!("Skipping word {:?}: {:?}", word, reason);
                skipped.push(SkippedWord {
                    word: word.to_string(),
                    reason,
                });
                continue;
            }

            match Self::place_word(&mut slots, word, options.max_attempts, rng) {
                Some(placement) => placements.push(placement),
                None => {
                    tracing::warn!(
                        "No slot found for word {} after {} attempts",
                        word,
                        options.max_attempts
                    );
                    skipped.push(SkippedWord {
                        word: word.to_string(),
                        reason: SkipReason::NoSlot,
                    });
                }
            }
        }

        let mut cells = Vec::with_capacity(size);
        for row in slots {
            let mut cell_row = Vec::with_capacity(size);
            for slot in row {
                let letter = match slot.letter {
                    Some(letter) => letter,
                    None => options.filler.random_letter(rng),
                };
                cell_row.push(GridCell {
                    letter,
                    words: slot.words,
                });
            }
            cells.push(cell_row);
        }

        tracing::debug!(
            "Generated {}x{} grid with {} placed and {} skipped words",
            size,
            size,
            placements.len(),
            skipped.len()
        );

        GeneratedPuzzle {
            grid: Grid::from_cells(cells),
            placements,
            skipped,
        }
    }

    fn reject_reason(word: &str, size: usize) -> Option<SkipReason> {
        if word.is_empty() {
            Some(SkipReason::Empty)
        } else if !word.chars().all(|c| c.is_ascii_uppercase()) {
            Some(SkipReason::InvalidCharacters)
        } else if word.len() > size {
            Some(SkipReason::TooLong)
        } else {
            None
        }
    }

    fn place_word(
        slots: &mut [Vec<Slot>],
        word: &str,
        max_attempts: usize,
        rng: &mut impl Rng,
    ) -> Option<Placement> {
        let size = slots.len();
        let letters: Vec<char> = word.chars().collect();
        // Last start index along the word's axis that still fits
        let span = size - letters.len();

        for _ in 0..max_attempts {
            let direction = if rng.random_bool(0.5) {
                Direction::Horizontal
            } else {
                Direction::Vertical
            };
            let start = match direction {
                Direction::Horizontal => {
                    Position::new(rng.random_range(0..=span), rng.random_range(0..size))
                }
                Direction::Vertical => {
                    Position::new(rng.random_range(0..size), rng.random_range(0..=span))
                }
            };

            let fits = direction
                .path(start, letters.len())
                .zip(&letters)
                .all(|(pos, letter)| match slots[pos.y][pos.x].letter {
                    None => true,
                    Some(existing) => existing == *letter,
                });
            if !fits {
                continue;
            }

            for (pos, letter) in direction.path(start, letters.len()).zip(&letters) {
                let slot = &mut slots[pos.y][pos.x];
                slot.letter = Some(*letter);
                slot.words.push(word.to_string());
            }

            return Some(Placement {
                word: word.to_string(),
                start,
                direction,
            });
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn options(size: usize) -> GeneratorOptions {
        GeneratorOptions {
            size,
            ..GeneratorOptions::default()
        }
    }

    #[test]
    fn test_grid_generation() {
        let mut rng = StdRng::seed_from_u64(1);
        let puzzle = GridGenerator::generate(&["CAT", "DOG"], &options(12), &mut rng);

        assert_eq!(puzzle.grid.size(), 12);
        assert_eq!(puzzle.grid.rows().len(), 12);
        assert!(puzzle.grid.rows().iter().all(|row| row.len() == 12));
    }

    #[test]
    fn test_placements_read_back_from_grid() {
        let words = ["ARSENAL", "CHELSEA", "LIVERPOOL", "EVERTON", "FULHAM", "BRENTFORD"];
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let puzzle = GridGenerator::generate(&words, &options(12), &mut rng);

            for placement in &puzzle.placements {
                assert_eq!(
                    puzzle.grid.read_placement(placement),
                    placement.word,
                    "seed {} placement {:?}",
                    seed,
                    placement
                );
                assert!(placement.positions().all(|pos| puzzle.grid.contains(pos)));
            }
            assert_eq!(puzzle.placements.len() + puzzle.skipped.len(), words.len());
        }
    }

    #[test]
    fn test_uncovered_cells_hold_single_filler_letter() {
        let mut rng = StdRng::seed_from_u64(99);
        let puzzle = GridGenerator::generate(&["OXYGEN", "IRON"], &options(12), &mut rng);

        let covered: HashSet<Position> = puzzle
            .placements
            .iter()
            .flat_map(|p| p.positions().collect::<Vec<_>>())
            .collect();

        for (y, row) in puzzle.grid.rows().iter().enumerate() {
            for (x, cell) in row.iter().enumerate() {
                assert!(cell.letter.is_ascii_uppercase());
                if !covered.contains(&Position::new(x, y)) {
                    assert!(cell.is_filler(), "cell ({}, {}) should be filler", x, y);
                }
            }
        }
    }

    #[test]
    fn test_overlapping_cells_record_every_word() {
        let mut rng = StdRng::seed_from_u64(3);
        // Small grid, so words are likely to cross
        let puzzle = GridGenerator::generate(&["ABC", "ABC", "AXC", "ZBZ"], &options(3), &mut rng);

        for placement in &puzzle.placements {
            for pos in placement.positions() {
                let cell = puzzle.grid.get(pos).unwrap();
                assert!(cell.words.contains(&placement.word));
            }
        }
    }

    #[test]
    fn test_word_longer_than_grid_is_skipped() {
        let mut rng = StdRng::seed_from_u64(5);
        let puzzle = GridGenerator::generate(&["WOLVERHAMPTON", "SPURS"], &options(12), &mut rng);

        assert_eq!(
            puzzle.skipped,
            vec![SkippedWord {
                word: "WOLVERHAMPTON".to_string(),
                reason: SkipReason::TooLong,
            }]
        );
        assert_eq!(puzzle.placed_words(), vec!["SPURS".to_string()]);
    }

    #[test]
    fn test_word_with_no_slot_is_skipped() {
        let mut rng = StdRng::seed_from_u64(11);
        // A 2x2 grid holds two horizontal or two vertical 2-letter words, never a conflicting third
        let puzzle = GridGenerator::generate(
            &["AB", "CD", "EF", "GH", "IJ"],
            &GeneratorOptions {
                size: 2,
                max_attempts: 50,
                filler: FillerDistribution::Uniform,
            },
            &mut rng,
        );

        assert!(puzzle.placements.len() <= 2);
        assert!(puzzle
            .skipped
            .iter()
            .all(|s| s.reason == SkipReason::NoSlot));
        assert_eq!(puzzle.placements.len() + puzzle.skipped.len(), 5);
    }

    #[test]
    fn test_invalid_and_empty_words_are_skipped() {
        let mut rng = StdRng::seed_from_u64(2);
        let puzzle =
            GridGenerator::generate(&["", "cat", "NEW YORK", "DOG"], &options(12), &mut rng);

        let reasons: Vec<_> = puzzle.skipped.iter().map(|s| s.reason).collect();
        assert_eq!(
            reasons,
            vec![
                SkipReason::Empty,
                SkipReason::InvalidCharacters,
                SkipReason::InvalidCharacters
            ]
        );
        assert_eq!(puzzle.placed_words(), vec!["DOG".to_string()]);
    }

    #[test]
    fn test_duplicate_words_are_placed_once() {
        let mut rng = StdRng::seed_from_u64(8);
        let puzzle = GridGenerator::generate(&["CAT", "CAT"], &options(12), &mut rng);

        assert_eq!(puzzle.placed_words(), vec!["CAT".to_string()]);
        assert!(puzzle.skipped.is_empty());
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let words = ["CAT", "DOG", "HORSE"];
        let a = GridGenerator::generate(&words, &options(12), &mut StdRng::seed_from_u64(21));
        let b = GridGenerator::generate(&words, &options(12), &mut StdRng::seed_from_u64(21));

        assert_eq!(a.placements, b.placements);
        assert_eq!(a.grid.to_string(), b.grid.to_string());
    }

    #[test]
    fn test_word_filling_whole_row_fits() {
        let mut rng = StdRng::seed_from_u64(4);
        let puzzle = GridGenerator::generate(&["ABCDEFGHIJKL"], &options(12), &mut rng);

        assert_eq!(puzzle.placements.len(), 1);
        let placement = &puzzle.placements[0];
        match placement.direction {
            Direction::Horizontal => assert_eq!(placement.start.x, 0),
            Direction::Vertical => assert_eq!(placement.start.y, 0),
        }
    }
}
