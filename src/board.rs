use crate::types::{GameStatus, Mark};

pub const CELL_COUNT: usize = 9;

/// Rows, columns, diagonals — fixed for the lifetime of the process.
pub const WIN_PATTERNS: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// 3x3 board stored as a flat array; row = index / 3, col = index % 3.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    cells: [Mark; CELL_COUNT],
}

impl Board {
    pub fn new() -> Self {
        Self {
            cells: [Mark::Empty; CELL_COUNT],
        }
    }

    pub fn from_cells(cells: [Mark; CELL_COUNT]) -> Self {
        Self { cells }
    }

    pub fn cells(&self) -> &[Mark; CELL_COUNT] {
        &self.cells
    }

    pub fn get(&self, index: usize) -> Option<Mark> {
        self.cells.get(index).copied()
    }

    pub(crate) fn set(&mut self, index: usize, mark: Mark) {
        self.cells[index] = mark;
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|&cell| cell != Mark::Empty)
    }

    /// Empty indices in ascending order.
    pub fn empty_positions(&self) -> Vec<usize> {
        self.cells
            .iter()
            .enumerate()
            .filter(|&(_, &cell)| cell == Mark::Empty)
            .map(|(index, _)| index)
            .collect()
    }

    /// Accepts any configuration, including ones not reachable under
    /// alternating play; the search engine relies on this.
    pub fn evaluate(&self) -> GameStatus {
        for pattern in &WIN_PATTERNS {
            let [a, b, c] = *pattern;
            let mark = self.cells[a];
            if mark != Mark::Empty && mark == self.cells[b] && mark == self.cells[c] {
                return match mark {
                    Mark::X => GameStatus::XWon,
                    Mark::O => GameStatus::OWon,
                    Mark::Empty => unreachable!(),
                };
            }
        }

        if self.is_full() {
            GameStatus::Draw
        } else {
            GameStatus::InProgress
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
