use std::collections::BTreeSet;
use std::time::Instant;

use crate::board::{find_errors, is_grid_complete, Board, CellPos};
use crate::highscores::{self, HighScore, ScoreStore};
use crate::puzzle::{Difficulty, GenerateError, PuzzleGenerator};

/// One user-caused cell mutation. History is a stack: undo pops the newest
/// entry and restores its previous value. Writes that change nothing are
/// never recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryEntry {
    pub row: usize,
    pub col: usize,
    pub previous_value: u8,
    pub new_value: u8,
}

/// Full snapshot of a game in progress, read-only from the interaction
/// layer's perspective; all mutation goes through [`Game::dispatch`].
///
/// `initial` is the puzzle as dealt. Cells filled there are givens and stay
/// equal in `grid` for the whole game; only cells empty in `initial` accept
/// user input.
#[derive(Debug, Clone)]
pub struct GameState {
    pub grid: Board,
    pub solution: Board,
    pub initial: Board,
    pub selected_cell: Option<CellPos>,
    pub is_complete: bool,
    pub errors: BTreeSet<CellPos>,
    pub started_at: Instant,
    pub elapsed_secs: u64,
    pub difficulty: Difficulty,
    pub history: Vec<HistoryEntry>,
}

impl GameState {
    pub fn new(
        difficulty: Difficulty,
        generator: &mut PuzzleGenerator,
    ) -> Result<Self, GenerateError> {
        let generated = generator.generate(difficulty)?;
        Ok(Self {
            grid: generated.puzzle,
            solution: generated.solution,
            initial: generated.puzzle,
            selected_cell: None,
            is_complete: false,
            errors: BTreeSet::new(),
            started_at: Instant::now(),
            elapsed_secs: 0,
            difficulty,
            history: Vec::new(),
        })
    }

    /// Seconds since the game started, frozen once the game is over. Hosts
    /// rendering a running clock poll this every tick.
    pub fn current_elapsed(&self) -> u64 {
        if self.is_complete {
            self.elapsed_secs
        } else {
            self.started_at.elapsed().as_secs()
        }
    }
}

/// Everything the interaction layer can ask of a running game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    NewGame(Difficulty),
    SelectCell(Option<CellPos>),
    SetValue(u8),
    ClearCell,
    Undo,
    Reset,
    AutoSolve,
}

/// One game session: the state plus the puzzle source and the score store
/// best times are persisted through.
pub struct Game<S: ScoreStore> {
    state: GameState,
    generator: PuzzleGenerator,
    scores: S,
}

impl<S: ScoreStore> Game<S> {
    pub fn new(difficulty: Difficulty, scores: S) -> Result<Self, GenerateError> {
        Self::with_generator(difficulty, PuzzleGenerator::new(None), scores)
    }

    pub fn with_generator(
        difficulty: Difficulty,
        mut generator: PuzzleGenerator,
        scores: S,
    ) -> Result<Self, GenerateError> {
        let state = GameState::new(difficulty, &mut generator)?;
        Ok(Self { state, generator, scores })
    }

    /// Wraps an existing snapshot, e.g. one the host restored or crafted.
    pub fn resume(state: GameState, generator: PuzzleGenerator, scores: S) -> Self {
        Self { state, generator, scores }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn scores(&self) -> &S {
        &self.scores
    }

    /// Applies one action. Actions whose guards do not hold (no selection,
    /// finished game, given cell, empty history) leave the state untouched;
    /// nothing here panics. Only `NewGame` can fail, and only when puzzle
    /// generation exhausts its retries.
    pub fn dispatch(&mut self, action: Action) -> Result<(), GenerateError> {
        match action {
            Action::NewGame(difficulty) => {
                self.state = GameState::new(difficulty, &mut self.generator)?;
            }
            Action::SelectCell(cell) => self.state.selected_cell = cell,
            Action::SetValue(value) => self.set_value(value),
            Action::ClearCell => self.clear_cell(),
            Action::Undo => self.undo(),
            Action::Reset => self.reset(),
            Action::AutoSolve => self.auto_solve(),
        }
        Ok(())
    }

    /// The selected cell, provided the game is still running and the cell is
    /// not a given. Selecting a given is allowed; writing to it is not.
    fn editable_selection(&self) -> Option<CellPos> {
        let pos = self.state.selected_cell?;
        if self.state.is_complete || self.state.initial.get(pos) != 0 {
            return None;
        }
        Some(pos)
    }

    fn set_value(&mut self, value: u8) {
        if !(1..=9).contains(&value) {
            return;
        }
        let Some(pos) = self.editable_selection() else { return; };
        let previous = self.state.grid.get(pos);
        if previous == value {
            return;
        }
        self.state.grid.cells[pos.row][pos.col] = value;
        self.state.errors = find_errors(&self.state.grid, &self.state.solution);
        self.state.history.push(HistoryEntry {
            row: pos.row,
            col: pos.col,
            previous_value: previous,
            new_value: value,
        });
        if is_grid_complete(&self.state.grid, &self.state.solution) {
            self.state.is_complete = true;
            self.state.elapsed_secs = self.state.started_at.elapsed().as_secs();
            highscores::save(
                &self.scores,
                HighScore::now(self.state.difficulty, self.state.elapsed_secs),
            );
        }
    }

    fn clear_cell(&mut self) {
        let Some(pos) = self.editable_selection() else { return; };
        let previous = self.state.grid.get(pos);
        if previous == 0 {
            return;
        }
        self.state.grid.cells[pos.row][pos.col] = 0;
        self.state.history.push(HistoryEntry {
            row: pos.row,
            col: pos.col,
            previous_value: previous,
            new_value: 0,
        });
        self.state.errors = find_errors(&self.state.grid, &self.state.solution);
    }

    fn undo(&mut self) {
        if self.state.is_complete {
            return;
        }
        let Some(entry) = self.state.history.pop() else { return; };
        self.state.grid.cells[entry.row][entry.col] = entry.previous_value;
        self.state.errors = find_errors(&self.state.grid, &self.state.solution);
        self.state.selected_cell = Some(CellPos::new(entry.row, entry.col));
    }

    /// Back to the dealt puzzle, same solution, fresh clock.
    fn reset(&mut self) {
        let s = &mut self.state;
        s.grid = s.initial;
        s.selected_cell = None;
        s.is_complete = false;
        s.errors.clear();
        s.history.clear();
        s.started_at = Instant::now();
        s.elapsed_secs = 0;
    }

    fn auto_solve(&mut self) {
        let s = &mut self.state;
        if s.is_complete {
            return;
        }
        s.grid = s.solution;
        s.errors.clear();
        s.is_complete = true;
        s.elapsed_secs = s.started_at.elapsed().as_secs();
        s.selected_cell = None;
        // assisted finishes never reach the score ledger
    }
}

/// "MM:SS", zero-padded; minutes run past 59 unwrapped (3661 -> "61:01").
pub fn format_time(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
