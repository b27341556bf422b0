use std::{collections::HashMap, sync::Arc};

use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

use crate::{
    domain::UserId,
    games::{minesweeper, Coord, GameKind, Minesweeper, Outcome, TicTacToe},
    random::SharedRng,
};

/// The one game a user is currently playing.
#[derive(Debug)]
pub enum ActiveGame {
    TicTacToe(TicTacToe),
    Minesweeper(Minesweeper),
}

impl ActiveGame {
    pub fn kind(&self) -> GameKind {
        match self {
            ActiveGame::TicTacToe(_) => GameKind::TicTacToe,
            ActiveGame::Minesweeper(_) => GameKind::Minesweeper,
        }
    }

    /// Apply a cell click to whichever engine this is.
    pub fn play(&mut self, coord: Coord) -> Outcome {
        match self {
            ActiveGame::TicTacToe(game) => game.make_move(coord),
            ActiveGame::Minesweeper(game) => game.open_cell(coord),
        }
    }

    pub fn finished(&self) -> Option<Outcome> {
        match self {
            ActiveGame::TicTacToe(game) => game.finished(),
            ActiveGame::Minesweeper(game) => game.finished(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MinesweeperSettings {
    pub size: usize,
    pub mines: usize,
}

impl Default for MinesweeperSettings {
    fn default() -> Self {
        Self {
            size: minesweeper::DEFAULT_SIZE,
            mines: minesweeper::DEFAULT_MINES,
        }
    }
}

type Slot = Arc<Mutex<Option<ActiveGame>>>;

/// In-memory map from user to their single active game.
///
/// Each user has their own slot lock; holding a `SessionGuard` serializes that
/// user's events while other users proceed in parallel.
pub struct SessionRegistry {
    slots: Mutex<HashMap<UserId, Slot>>,
    rng: SharedRng,
    minesweeper: MinesweeperSettings,
}

impl SessionRegistry {
    pub fn new(rng: SharedRng, minesweeper: MinesweeperSettings) -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            rng,
            minesweeper,
        }
    }

    /// Lock the user's slot for the duration of one event.
    pub async fn lock(&self, user_id: UserId) -> SessionGuard {
        let slot = {
            let mut map = self.slots.lock().await;
            map.entry(user_id)
                .or_insert_with(|| Arc::new(Mutex::new(None)))
                .clone()
        };
        SessionGuard {
            user_id,
            slot: slot.lock_owned().await,
            rng: self.rng.clone(),
            minesweeper: self.minesweeper,
        }
    }

    /// Replace whatever the user was playing with a fresh game of `kind`.
    pub async fn start_game(&self, user_id: UserId, kind: GameKind) {
        self.lock(user_id).await.start_game(kind);
    }

    /// Kind of the user's current game, finished or not.
    pub async fn active_kind(&self, user_id: UserId) -> Option<GameKind> {
        self.lock(user_id).await.active().map(ActiveGame::kind)
    }
}

pub struct SessionGuard {
    user_id: UserId,
    slot: OwnedMutexGuard<Option<ActiveGame>>,
    rng: SharedRng,
    minesweeper: MinesweeperSettings,
}

impl SessionGuard {
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Build a new engine of `kind`, discarding any previous game.
    pub fn start_game(&mut self, kind: GameKind) -> &mut ActiveGame {
        let game = match kind {
            GameKind::TicTacToe => ActiveGame::TicTacToe(TicTacToe::new(self.rng.fork())),
            GameKind::Minesweeper => {
                let MinesweeperSettings { size, mines } = self.minesweeper;
                ActiveGame::Minesweeper(self.rng.with(|rng| Minesweeper::new(size, mines, rng)))
            }
        };
        if let Some(previous) = self.slot.as_ref() {
            debug!(
                user_id = self.user_id.0,
                previous = ?previous.kind(),
                "replacing active game"
            );
        }
        self.slot.insert(game)
    }

    pub fn active(&self) -> Option<&ActiveGame> {
        self.slot.as_ref()
    }

    pub fn active_mut(&mut self) -> Option<&mut ActiveGame> {
        self.slot.as_mut()
    }

    #[cfg(test)]
    pub(crate) fn set_active(&mut self, game: ActiveGame) {
        *self.slot = Some(game);
    }
}
