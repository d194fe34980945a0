pub mod board;
pub mod game;
pub mod highscores;
pub mod puzzle;
pub mod solver;

pub use board::{find_errors, is_grid_complete, Board, CellPos};
pub use game::{format_time, Action, Game, GameState, HistoryEntry};
pub use highscores::{FileStore, HighScore, MemoryStore, ScoreStore};
pub use puzzle::{Difficulty, GenerateError, GeneratedPuzzle, PuzzleGenerator};
pub use solver::solve;
