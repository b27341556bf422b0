//! Tic-tac-toe against a uniform-random opponent.

use rand::{rngs::StdRng, seq::SliceRandom};

use super::{Coord, Outcome};

pub const SIZE: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cell {
    Empty,
    /// The human player's mark (X).
    Player,
    /// The automated opponent's mark (O).
    Opponent,
}

const LINES: [[Coord; 3]; 8] = [
    // Rows
    [(0, 0), (0, 1), (0, 2)],
    [(1, 0), (1, 1), (1, 2)],
    [(2, 0), (2, 1), (2, 2)],
    // Columns
    [(0, 0), (1, 0), (2, 0)],
    [(0, 1), (1, 1), (2, 1)],
    [(0, 2), (1, 2), (2, 2)],
    // Diagonals
    [(0, 0), (1, 1), (2, 2)],
    [(0, 2), (1, 1), (2, 0)],
];

#[derive(Debug)]
pub struct TicTacToe {
    board: [[Cell; SIZE]; SIZE],
    finished: Option<Outcome>,
    rng: StdRng,
}

impl TicTacToe {
    pub fn new(rng: StdRng) -> Self {
        Self {
            board: [[Cell::Empty; SIZE]; SIZE],
            finished: None,
            rng,
        }
    }

    pub fn cell(&self, (row, col): Coord) -> Cell {
        self.board[row][col]
    }

    pub fn rows(&self) -> &[[Cell; SIZE]; SIZE] {
        &self.board
    }

    /// Terminal outcome, once one has been reached.
    pub fn finished(&self) -> Option<Outcome> {
        self.finished
    }

    /// Mark `coord` for the player and let the opponent answer.
    ///
    /// Occupied or out-of-range cells and moves after the game ended are
    /// ignored and report `Continue`.
    pub fn make_move(&mut self, coord: Coord) -> Outcome {
        let (row, col) = coord;
        if self.finished.is_some() || row >= SIZE || col >= SIZE {
            return Outcome::Continue;
        }
        if self.board[row][col] != Cell::Empty {
            return Outcome::Continue;
        }

        self.board[row][col] = Cell::Player;
        if let Some(outcome) = self.terminal_after(Cell::Player) {
            return self.finish(outcome);
        }

        self.opponent_move();
        if let Some(outcome) = self.terminal_after(Cell::Opponent) {
            return self.finish(outcome);
        }

        Outcome::Continue
    }

    fn terminal_after(&self, mark: Cell) -> Option<Outcome> {
        if self.has_line(mark) {
            return Some(if mark == Cell::Player {
                Outcome::Win
            } else {
                Outcome::Lose
            });
        }
        if self.is_full() {
            return Some(Outcome::Draw);
        }
        None
    }

    fn finish(&mut self, outcome: Outcome) -> Outcome {
        self.finished = Some(outcome);
        outcome
    }

    fn opponent_move(&mut self) {
        let empty = self.empty_cells();
        if let Some(&(row, col)) = empty.choose(&mut self.rng) {
            self.board[row][col] = Cell::Opponent;
        }
    }

    fn empty_cells(&self) -> Vec<Coord> {
        (0..SIZE)
            .flat_map(|row| (0..SIZE).map(move |col| (row, col)))
            .filter(|&(row, col)| self.board[row][col] == Cell::Empty)
            .collect()
    }

    fn has_line(&self, mark: Cell) -> bool {
        LINES
            .iter()
            .any(|line| line.iter().all(|&(row, col)| self.board[row][col] == mark))
    }

    fn is_full(&self) -> bool {
        self.board.iter().flatten().all(|&c| c != Cell::Empty)
    }

    #[cfg(test)]
    pub(crate) fn with_board(board: [[Cell; SIZE]; SIZE], rng: StdRng) -> Self {
        Self {
            board,
            finished: None,
            rng,
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    const E: Cell = Cell::Empty;
    const X: Cell = Cell::Player;
    const O: Cell = Cell::Opponent;

    fn rng(seed: u64) -> StdRng {
        StdRng::seed_from_u64(seed)
    }

    fn count(game: &TicTacToe, mark: Cell) -> usize {
        game.rows().iter().flatten().filter(|&&c| c == mark).count()
    }

    #[test]
    fn first_move_places_player_and_one_opponent_mark() {
        for seed in 0..20 {
            let mut game = TicTacToe::new(rng(seed));
            assert_eq!(game.make_move((1, 1)), Outcome::Continue);
            assert_eq!(game.cell((1, 1)), X);
            assert_eq!(count(&game, X), 1);
            assert_eq!(count(&game, O), 1);
        }
    }

    #[test]
    fn repeat_click_on_same_cell_is_a_noop() {
        for row in 0..SIZE {
            for col in 0..SIZE {
                let mut game = TicTacToe::new(rng((row * SIZE + col) as u64));
                let first = game.make_move((row, col));
                let snapshot = *game.rows();
                if first == Outcome::Continue {
                    assert_eq!(game.make_move((row, col)), Outcome::Continue);
                    assert_eq!(*game.rows(), snapshot);
                }
            }
        }
    }

    #[test]
    fn clicking_an_opponent_cell_changes_nothing() {
        let mut game = TicTacToe::new(rng(3));
        game.make_move((0, 0));
        let (row, col) = (0..SIZE)
            .flat_map(|r| (0..SIZE).map(move |c| (r, c)))
            .find(|&pos| game.cell(pos) == O)
            .unwrap();
        let snapshot = *game.rows();
        assert_eq!(game.make_move((row, col)), Outcome::Continue);
        assert_eq!(*game.rows(), snapshot);
    }

    #[test]
    fn every_line_wins_for_the_player() {
        for line in LINES {
            let mut board = [[E; SIZE]; SIZE];
            for &(r, c) in &line[..2] {
                board[r][c] = X;
            }
            let mut game = TicTacToe::with_board(board, rng(1));
            assert_eq!(game.make_move(line[2]), Outcome::Win, "line {line:?}");
            assert_eq!(count(&game, O), 0);
            assert_eq!(game.finished(), Some(Outcome::Win));
        }
    }

    #[test]
    fn every_line_detected_for_the_opponent() {
        for line in LINES {
            let mut board = [[E; SIZE]; SIZE];
            for &(r, c) in &line {
                board[r][c] = O;
            }
            let game = TicTacToe::with_board(board, rng(1));
            assert!(game.has_line(O), "line {line:?}");
            assert!(!game.has_line(X));
        }
    }

    #[test]
    fn non_lines_are_not_wins() {
        // An L shape and a broken diagonal.
        let board = [[X, X, E], [X, E, E], [E, E, X]];
        let game = TicTacToe::with_board(board, rng(1));
        assert!(!game.has_line(X));
    }

    #[test]
    fn opponent_completing_a_line_loses() {
        // After the player takes (2,1) the only empty cell is (2,2), which
        // completes the opponent's right column.
        let board = [[X, O, O], [O, X, O], [X, E, E]];
        for seed in 0..8 {
            let mut game = TicTacToe::with_board(board, rng(seed));
            assert_eq!(game.make_move((2, 1)), Outcome::Lose);
            assert_eq!(game.cell((2, 2)), O);
            assert_eq!(game.finished(), Some(Outcome::Lose));
        }
    }

    #[test]
    fn near_misses_keep_the_game_going() {
        // (board, player move): the move leaves the player one cell short of
        // a line and no single opponent reply can complete one.
        let cases = [
            // Split row.
            ([[X, E, X], [E, O, E], [E, E, E]], (1, 0)),
            // L shape.
            ([[X, X, E], [O, E, E], [O, E, E]], (1, 1)),
            // Broken diagonal.
            ([[X, O, E], [E, E, O], [E, E, X]], (2, 0)),
            // Three corners.
            ([[X, O, E], [O, E, E], [E, E, X]], (0, 2)),
        ];
        for (board, mv) in cases {
            for seed in 0..16 {
                let mut game = TicTacToe::with_board(board, rng(seed));
                assert_eq!(game.make_move(mv), Outcome::Continue, "{board:?} {mv:?}");
                assert_eq!(game.finished(), None);
                assert!(!game.has_line(X) && !game.has_line(O));
            }
        }
    }

    #[test]
    fn forced_opponent_replies_complete_rows_and_diagonals() {
        let cases = [
            // Only (0, 2) is left for the opponent: top row.
            ([[O, O, E], [X, E, O], [X, O, X]], (1, 1), (0, 2)),
            // Only (2, 2) is left: main diagonal.
            ([[O, X, X], [X, O, O], [X, E, E]], (2, 1), (2, 2)),
        ];
        for (board, mv, reply) in cases {
            let mut game = TicTacToe::with_board(board, rng(4));
            assert_eq!(game.make_move(mv), Outcome::Lose, "{board:?}");
            assert_eq!(game.cell(reply), O);
            assert!(!game.has_line(X));
        }
    }

    #[test]
    fn full_board_without_line_is_a_draw() {
        let board = [[X, O, X], [X, O, O], [O, X, E]];
        let mut game = TicTacToe::with_board(board, rng(1));
        assert_eq!(game.make_move((2, 2)), Outcome::Draw);
        assert!(game.is_full());
    }

    #[test]
    fn opponent_filling_last_cell_without_line_is_a_draw() {
        let board = [[X, O, X], [X, O, E], [O, X, E]];
        let mut game = TicTacToe::with_board(board, rng(1));
        assert_eq!(game.make_move((2, 2)), Outcome::Draw);
        assert_eq!(game.cell((1, 2)), O);
    }

    #[test]
    fn moves_after_terminal_outcome_are_ignored() {
        let board = [[X, X, E], [O, O, E], [E, E, E]];
        let mut game = TicTacToe::with_board(board, rng(1));
        assert_eq!(game.make_move((0, 2)), Outcome::Win);
        let snapshot = *game.rows();
        assert_eq!(game.make_move((2, 2)), Outcome::Continue);
        assert_eq!(*game.rows(), snapshot);
        assert_eq!(game.finished(), Some(Outcome::Win));
    }

    #[test]
    fn out_of_range_moves_are_ignored() {
        let mut game = TicTacToe::new(rng(1));
        assert_eq!(game.make_move((3, 0)), Outcome::Continue);
        assert_eq!(game.make_move((0, 7)), Outcome::Continue);
        assert_eq!(count(&game, X) + count(&game, O), 0);
    }

    #[test]
    fn random_games_always_terminate_consistently() {
        for seed in 0..50 {
            let mut game = TicTacToe::new(rng(seed));
            let mut outcome = Outcome::Continue;
            for row in 0..SIZE {
                for col in 0..SIZE {
                    if outcome == Outcome::Continue {
                        outcome = game.make_move((row, col));
                    }
                }
            }
            assert!(outcome.is_terminal(), "seed {seed} never finished");
            match outcome {
                Outcome::Win => assert!(game.has_line(X)),
                Outcome::Lose => assert!(game.has_line(O)),
                Outcome::Draw => {
                    assert!(game.is_full());
                    assert!(!game.has_line(X) && !game.has_line(O));
                }
                Outcome::Continue => unreachable!(),
            }
        }
    }
}
