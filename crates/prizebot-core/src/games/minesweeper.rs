//! Single-player minesweeper with one-shot reveals.
//!
//! Unlike classic minesweeper, opening a zero cell does not flood-fill its
//! neighbourhood: every cell is opened by its own click.

use std::collections::HashSet;

use rand::Rng;

use super::{Coord, Outcome};

pub const DEFAULT_SIZE: usize = 5;
pub const DEFAULT_MINES: usize = 5;

/// What the player sees in a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CellView {
    Hidden,
    /// Opened safe cell with the number of adjacent mines (0..=8).
    Revealed(u8),
    /// Opened mine.
    Mine,
}

#[derive(Clone, Debug)]
pub struct Minesweeper {
    size: usize,
    mines: HashSet<Coord>,
    revealed: HashSet<Coord>,
    view: Vec<CellView>,
    finished: Option<Outcome>,
}

impl Minesweeper {
    /// New `size`x`size` board with `mines` mines placed uniformly at random.
    ///
    /// Callers guarantee `size >= 1` and `mines < size * size`; the mine
    /// count is capped at `size * size - 1` so at least one cell is safe.
    pub fn new<R: Rng + ?Sized>(size: usize, mines: usize, rng: &mut R) -> Self {
        let size = size.max(1);
        let cells = size * size;
        let mines = mines.min(cells - 1);
        let mines = rand::seq::index::sample(rng, cells, mines)
            .into_iter()
            .map(|i| (i / size, i % size))
            .collect();
        Self::from_mines(size, mines)
    }

    /// Board with a fixed mine layout for deterministic scenarios.
    #[cfg(test)]
    pub(crate) fn with_mines(size: usize, mines: HashSet<Coord>) -> Self {
        Self::from_mines(size, mines)
    }

    // Caller guarantees every mine is on the board and at least one cell is safe.
    fn from_mines(size: usize, mines: HashSet<Coord>) -> Self {
        Self {
            size,
            mines,
            revealed: HashSet::new(),
            view: vec![CellView::Hidden; size * size],
            finished: None,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn mine_count(&self) -> usize {
        self.mines.len()
    }

    pub fn revealed_count(&self) -> usize {
        self.revealed.len()
    }

    pub fn is_mine(&self, coord: Coord) -> bool {
        self.mines.contains(&coord)
    }

    pub fn view(&self, (row, col): Coord) -> CellView {
        self.view[row * self.size + col]
    }

    pub fn iter_row(&self, row: usize) -> impl Iterator<Item = &CellView> {
        let index = row * self.size;
        self.view[index..index + self.size].iter()
    }

    pub fn finished(&self) -> Option<Outcome> {
        self.finished
    }

    /// Reveal one cell.
    ///
    /// Already opened or out-of-range cells and clicks after the game ended
    /// are ignored and report `Continue`.
    pub fn open_cell(&mut self, coord: Coord) -> Outcome {
        let (row, col) = coord;
        if self.finished.is_some() || row >= self.size || col >= self.size {
            return Outcome::Continue;
        }
        if !self.revealed.insert(coord) {
            return Outcome::Continue;
        }

        let index = row * self.size + col;
        if self.mines.contains(&coord) {
            self.view[index] = CellView::Mine;
            self.finished = Some(Outcome::Lose);
            return Outcome::Lose;
        }

        self.view[index] = CellView::Revealed(self.count_adjacent(coord));
        if self.revealed.len() == self.size * self.size - self.mines.len() {
            self.finished = Some(Outcome::Win);
            return Outcome::Win;
        }
        Outcome::Continue
    }

    fn count_adjacent(&self, (row, col): Coord) -> u8 {
        let rows = row.saturating_sub(1)..=(row + 1).min(self.size - 1);
        rows.flat_map(|r| {
            (col.saturating_sub(1)..=(col + 1).min(self.size - 1)).map(move |c| (r, c))
        })
        .filter(|&pos| pos != (row, col) && self.mines.contains(&pos))
        .count() as u8
    }
}
