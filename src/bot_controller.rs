use crate::board::Board;
use crate::session_rng::SessionRng;
use crate::types::{BotDifficulty, GameStatus, Mark};

pub fn calculate_move(
    difficulty: BotDifficulty,
    board: &Board,
    mark: Mark,
    rng: &mut SessionRng,
) -> Option<usize> {
    match difficulty {
        BotDifficulty::Easy => calculate_random_move(board, rng),
        BotDifficulty::Medium => {
            if rng.random_bool() {
                calculate_move(BotDifficulty::Hard, board, mark, rng)
            } else {
                calculate_random_move(board, rng)
            }
        }
        BotDifficulty::Hard => {
            find_best_move(board, mark).or_else(|| calculate_random_move(board, rng))
        }
        // Never random: on the unreachable no-result path, take the first
        // empty position instead.
        BotDifficulty::Insane => {
            find_best_move(board, mark).or_else(|| board.empty_positions().first().copied())
        }
    }
}

fn calculate_random_move(board: &Board, rng: &mut SessionRng) -> Option<usize> {
    rng.choose(&board.empty_positions()).copied()
}

/// Exhaustive minimax over the full game tree. Terminal scores are not
/// decayed by depth, so a forced win in one move ranks equal to a forced
/// win in five. Ties resolve to the lowest board index.
pub fn find_best_move(board: &Board, mark: Mark) -> Option<usize> {
    let opponent_mark = mark.opponent()?;
    let mut scratch = board.clone();

    let mut best_move = None;
    let mut best_score = i32::MIN;

    for index in board.empty_positions() {
        scratch.set(index, mark);
        let score = minimax(&mut scratch, false, mark, opponent_mark);
        scratch.set(index, Mark::Empty);

        if score > best_score {
            best_score = score;
            best_move = Some(index);
        }
    }

    best_move
}

fn minimax(board: &mut Board, is_maximizing: bool, bot_mark: Mark, opponent_mark: Mark) -> i32 {
    match board.evaluate() {
        GameStatus::Draw => return 0,
        status @ (GameStatus::XWon | GameStatus::OWon) => {
            return if status.winner() == Some(bot_mark) { 10 } else { -10 };
        }
        GameStatus::InProgress => {}
    }

    if is_maximizing {
        let mut max_eval = i32::MIN;
        for index in board.empty_positions() {
            board.set(index, bot_mark);
            let eval = minimax(board, false, bot_mark, opponent_mark);
            board.set(index, Mark::Empty);
            max_eval = max_eval.max(eval);
        }
        max_eval
    } else {
        let mut min_eval = i32::MAX;
        for index in board.empty_positions() {
            board.set(index, opponent_mark);
            let eval = minimax(board, true, bot_mark, opponent_mark);
            board.set(index, Mark::Empty);
            min_eval = min_eval.min(eval);
        }
        min_eval
    }
}
