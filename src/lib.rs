pub mod board;
pub mod bot_controller;
pub mod game_state;
pub mod logger;
pub mod session_rng;
mod types;

pub use board::{Board, CELL_COUNT, WIN_PATTERNS};
pub use bot_controller::{calculate_move, find_best_move};
pub use game_state::{GameSnapshot, GameState, MoveError, MoveOutcome};
pub use session_rng::SessionRng;
pub use types::{BotDifficulty, GameStatus, Mark};
