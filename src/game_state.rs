use std::fmt;

use serde::{Deserialize, Serialize};

use crate::board::{Board, CELL_COUNT};
use crate::bot_controller::calculate_move;
use crate::log;
use crate::session_rng::SessionRng;
use crate::types::{BotDifficulty, GameStatus, Mark};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveError {
    GameOver,
    OutOfBounds,
    CellOccupied,
}

impl fmt::Display for MoveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            MoveError::GameOver => "Game is already over",
            MoveError::OutOfBounds => "Position out of bounds",
            MoveError::CellOccupied => "Cell is already marked",
        };
        write!(f, "{message}")
    }
}

impl std::error::Error for MoveError {}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveOutcome {
    pub status: GameStatus,
    pub turn: Mark,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub board: [Mark; CELL_COUNT],
    pub turn: Mark,
    pub status: GameStatus,
}

/// Owns the board, the turn and the result state for one game session.
/// All mutation goes through `place_mark`, `restart` and `set_difficulty`.
/// X moves first; a configured bot plays O.
pub struct GameState {
    board: Board,
    current_mark: Mark,
    status: GameStatus,
    difficulty: Option<BotDifficulty>,
    rng: SessionRng,
}

impl GameState {
    /// `difficulty: None` is the two-human-players mode.
    pub fn new(difficulty: Option<BotDifficulty>, rng: SessionRng) -> Self {
        Self {
            board: Board::new(),
            current_mark: Mark::X,
            status: GameStatus::InProgress,
            difficulty,
            rng,
        }
    }

    pub fn place_mark(&mut self, index: usize) -> Result<MoveOutcome, MoveError> {
        if self.status != GameStatus::InProgress {
            return Err(MoveError::GameOver);
        }

        if index >= CELL_COUNT {
            return Err(MoveError::OutOfBounds);
        }

        if self.board.get(index) != Some(Mark::Empty) {
            return Err(MoveError::CellOccupied);
        }

        self.board.set(index, self.current_mark);
        self.status = self.board.evaluate();

        if self.status == GameStatus::InProgress {
            self.switch_turn();
        }

        Ok(MoveOutcome {
            status: self.status,
            turn: self.current_mark,
        })
    }

    fn switch_turn(&mut self) {
        if self.current_mark == Mark::X {
            self.current_mark = Mark::O;
        } else {
            self.current_mark = Mark::X;
        }
    }

    /// True when the caller should schedule `play_bot_turn`. When to call it
    /// (e.g. after a render delay) is the caller's concern.
    pub fn bot_turn_pending(&self) -> bool {
        self.difficulty.is_some()
            && self.status == GameStatus::InProgress
            && self.current_mark == Mark::O
    }

    /// Invokes the configured strategy exactly once and applies the result
    /// through the same validation path as a human move.
    pub fn play_bot_turn(&mut self) -> Option<(usize, MoveOutcome)> {
        if !self.bot_turn_pending() {
            return None;
        }

        let difficulty = self.difficulty?;
        let index = calculate_move(difficulty, &self.board, self.current_mark, &mut self.rng)?;

        match self.place_mark(index) {
            Ok(outcome) => Some((index, outcome)),
            Err(e) => {
                log!("Bot failed to place mark at {}: {}", index, e);
                None
            }
        }
    }

    /// Unconditional reset; the only way out of a terminal state.
    pub fn restart(&mut self) {
        self.board = Board::new();
        self.current_mark = Mark::X;
        self.status = GameStatus::InProgress;
    }

    /// Changing the difficulty restarts the game.
    pub fn set_difficulty(&mut self, difficulty: Option<BotDifficulty>) {
        self.difficulty = difficulty;
        self.restart();
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            board: *self.board.cells(),
            turn: self.current_mark,
            status: self.status,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn current_mark(&self) -> Mark {
        self.current_mark
    }

    pub fn difficulty(&self) -> Option<BotDifficulty> {
        self.difficulty
    }

    pub fn status_line(&self) -> String {
        match self.status {
            GameStatus::InProgress => format!("Player {}'s turn", self.current_mark),
            GameStatus::XWon => "X Wins!".to_string(),
            GameStatus::OWon => "O Wins!".to_string(),
            GameStatus::Draw => "It's a Draw!".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_player_game() -> GameState {
        GameState::new(None, SessionRng::new(42))
    }

    fn bot_game(difficulty: BotDifficulty) -> GameState {
        GameState::new(Some(difficulty), SessionRng::new(42))
    }

    #[test]
    fn test_center_opening() {
        let mut game = two_player_game();

        let outcome = game.place_mark(4).unwrap();

        assert_eq!(outcome.status, GameStatus::InProgress);
        assert_eq!(outcome.turn, Mark::O);
        assert_eq!(game.board().get(4), Some(Mark::X));
        assert_eq!(game.status_line(), "Player O's turn");
    }

    #[test]
    fn test_out_of_bounds_rejected() {
        let mut game = two_player_game();
        let before = game.snapshot();

        assert_eq!(game.place_mark(9), Err(MoveError::OutOfBounds));
        assert_eq!(game.snapshot(), before);
    }

    #[test]
    fn test_occupied_cell_rejected_without_state_change() {
        let mut game = two_player_game();
        game.place_mark(2).unwrap();
        let before = game.snapshot();

        assert_eq!(game.place_mark(2), Err(MoveError::CellOccupied));
        assert_eq!(game.snapshot(), before);
    }

    #[test]
    fn test_moves_rejected_after_game_over() {
        let mut game = two_player_game();
        // X: 0, 1, 2 — top row win.
        for index in [0, 3, 1, 4, 2] {
            game.place_mark(index).unwrap();
        }
        assert_eq!(game.status(), GameStatus::XWon);
        assert_eq!(game.status_line(), "X Wins!");

        assert_eq!(game.place_mark(8), Err(MoveError::GameOver));
    }

    #[test]
    fn test_draw_detected_and_reported() {
        let mut game = two_player_game();
        // X O X / X O O / O X X with no completed line.
        for index in [0, 1, 2, 4, 3, 5, 7, 6, 8] {
            game.place_mark(index).unwrap();
        }
        assert_eq!(game.status(), GameStatus::Draw);
        assert_eq!(game.status_line(), "It's a Draw!");
    }

    #[test]
    fn test_turn_alternates_after_every_accepted_move() {
        let mut game = two_player_game();
        let mut last_turn = game.current_mark();

        for index in [4, 0, 1, 2, 6] {
            let outcome = game.place_mark(index).unwrap();
            if outcome.status == GameStatus::InProgress {
                assert_ne!(outcome.turn, last_turn);
                last_turn = outcome.turn;
            }
        }
    }

    #[test]
    fn test_restart_resets_and_is_idempotent() {
        let mut game = two_player_game();
        game.place_mark(4).unwrap();
        game.place_mark(0).unwrap();

        game.restart();
        let once = game.snapshot();
        game.restart();

        assert_eq!(game.snapshot(), once);
        assert_eq!(once.status, GameStatus::InProgress);
        assert_eq!(once.turn, Mark::X);
        assert!(once.board.iter().all(|&cell| cell == Mark::Empty));
    }

    #[test]
    fn test_set_difficulty_restarts() {
        let mut game = bot_game(BotDifficulty::Easy);
        game.place_mark(4).unwrap();

        game.set_difficulty(Some(BotDifficulty::Insane));

        assert_eq!(game.difficulty(), Some(BotDifficulty::Insane));
        assert_eq!(game.status(), GameStatus::InProgress);
        assert_eq!(game.current_mark(), Mark::X);
        assert!(game.board().cells().iter().all(|&cell| cell == Mark::Empty));
    }

    #[test]
    fn test_two_player_mode_never_schedules_bot() {
        let mut game = two_player_game();
        game.place_mark(4).unwrap();

        assert!(!game.bot_turn_pending());
        assert_eq!(game.play_bot_turn(), None);
    }

    #[test]
    fn test_bot_turn_pending_only_on_o_turn() {
        let mut game = bot_game(BotDifficulty::Easy);
        assert!(!game.bot_turn_pending());

        game.place_mark(4).unwrap();
        assert!(game.bot_turn_pending());
    }

    #[test]
    fn test_play_bot_turn_applies_one_valid_move() {
        let mut game = bot_game(BotDifficulty::Easy);
        game.place_mark(4).unwrap();

        let (index, outcome) = game.play_bot_turn().unwrap();

        assert_ne!(index, 4);
        assert_eq!(game.board().get(index), Some(Mark::O));
        assert_eq!(outcome.turn, Mark::X);
        assert!(!game.bot_turn_pending());
    }

    #[test]
    fn test_insane_bot_survives_full_game() {
        let mut game = bot_game(BotDifficulty::Insane);
        game.place_mark(0).unwrap();
        game.play_bot_turn().unwrap();

        // X greedily takes the lowest empty cell; the search side must
        // still reach a win or a draw.
        while game.status() == GameStatus::InProgress {
            let human = *game.board().empty_positions().first().unwrap();
            game.place_mark(human).unwrap();
            game.play_bot_turn();
        }

        assert_ne!(game.status(), GameStatus::XWon);
    }

    #[test]
    fn test_snapshot_round_trips_through_serde() {
        let mut game = bot_game(BotDifficulty::Hard);
        game.place_mark(4).unwrap();
        let snapshot = game.snapshot();

        let json = serde_json::to_string(&snapshot).unwrap();
        let restored: GameSnapshot = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, snapshot);
    }
}
