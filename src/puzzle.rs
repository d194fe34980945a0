use rand::{seq::SliceRandom, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::board::Board;
use crate::solver;

/// Generation gives up after this many seed-and-solve rounds. The diagonal
/// seeding solves on the first try in practice; the cap only rules out an
/// endless retry loop.
const MAX_ATTEMPTS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Easy,
    Medium,
    Hard,
    Expert,
}

impl Difficulty {
    pub const ALL: [Difficulty; 5] = [
        Difficulty::Beginner,
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::Expert,
    ];

    /// How many cells get blanked out of the 81-cell solved grid.
    pub fn cells_to_remove(self) -> usize {
        match self {
            Difficulty::Beginner => 25, // 56 clues remain
            Difficulty::Easy => 35,
            Difficulty::Medium => 45,
            Difficulty::Hard => 52,
            Difficulty::Expert => 58, // 23 clues remain
        }
    }

    pub fn clue_count(self) -> usize {
        81 - self.cells_to_remove()
    }
}

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("could not generate a puzzle after {0} attempts")]
    AttemptsExhausted(usize),
}

/// A playable puzzle plus the solved grid it was carved from. The solution is
/// ground truth for error checking and auto-solve, never shown directly.
#[derive(Debug, Clone, Copy)]
pub struct GeneratedPuzzle {
    pub puzzle: Board,
    pub solution: Board,
}

pub struct PuzzleGenerator {
    rng: rand::rngs::StdRng,
}

impl PuzzleGenerator {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => rand::rngs::StdRng::seed_from_u64(s),
            None => rand::rngs::StdRng::from_rng(rand::thread_rng()).unwrap(),
        };
        Self { rng }
    }

    /// Builds a fully solved grid, then blanks a difficulty-determined number
    /// of cells. Removal is unconditional; no uniqueness check runs afterward,
    /// so harder puzzles may admit more than one solution.
    pub fn generate(&mut self, difficulty: Difficulty) -> Result<GeneratedPuzzle, GenerateError> {
        let solution = self.complete_grid()?;
        let mut puzzle = solution;
        let mut positions: Vec<(usize, usize)> = (0..81).map(|i| (i / 9, i % 9)).collect();
        positions.shuffle(&mut self.rng);
        for &(r, c) in positions.iter().take(difficulty.cells_to_remove()) {
            puzzle.cells[r][c] = 0;
        }
        Ok(GeneratedPuzzle { puzzle, solution })
    }

    fn complete_grid(&mut self) -> Result<Board, GenerateError> {
        for attempt in 1..=MAX_ATTEMPTS {
            let seeded = self.seed_diagonal_boxes();
            if let Some(solved) = solver::solve(&seeded) {
                return Ok(solved);
            }
            log::debug!("seeded grid had no completion, retrying (attempt {attempt})");
        }
        Err(GenerateError::AttemptsExhausted(MAX_ATTEMPTS))
    }

    /// The three diagonal boxes share no row, column, or box, so each can be
    /// filled with an independent permutation of 1-9 without conflict.
    fn seed_diagonal_boxes(&mut self) -> Board {
        let mut b = Board::empty();
        for boxi in 0..3 {
            let mut digits: Vec<u8> = (1..=9).collect();
            digits.shuffle(&mut self.rng);
            let mut idx = 0;
            for r in boxi * 3..boxi * 3 + 3 {
                for c in boxi * 3..boxi * 3 + 3 {
                    b.cells[r][c] = digits[idx];
                    idx += 1;
                }
            }
        }
        b
    }
}
