//! The closed loop of typed cells a player's token walks around.

use soroban_sdk::{vec, Env, Vec};

use crate::{Error, GridType};

/// Cells on the default board.
pub const DEFAULT_BOARD_LEN: u32 = 18;

/// The board every new deployment starts with.
pub fn default_cells(env: &Env) -> Vec<GridType> {
    use GridType::{Blue, Gold, Red};
    vec![
        env, Blue, Blue, Red, Blue, Gold, Red, Blue, Blue, Red, Gold, Blue, Red, Blue, Blue, Gold,
        Red, Blue, Blue,
    ]
}

/// Read-only view over one epoch's board.
#[derive(Clone, Debug)]
pub struct Board {
    cells: Vec<GridType>,
}

impl Board {
    pub fn new(cells: Vec<GridType>) -> Result<Self, Error> {
        if cells.is_empty() {
            return Err(Error::InvalidConfig);
        }
        Ok(Self { cells })
    }

    pub fn len(&self) -> u32 {
        self.cells.len()
    }

    /// Cell type at `index`, taken modulo the board length.
    pub fn cell_at(&self, index: u32) -> GridType {
        let i = index % self.len();
        // `i < len` and the board is non-empty, so the slot is always present.
        self.cells.get_unchecked(i)
    }

    /// Position reached by walking `steps` cells forward from `start`.
    pub fn advance(&self, start: u32, steps: u32) -> u32 {
        let len = self.len() as u64;
        ((start as u64 % len + steps as u64) % len) as u32
    }

    /// Reduce a position stored under a previous epoch's board.
    pub fn normalize(&self, position: u32) -> u32 {
        position % self.len()
    }

    pub fn cells(&self) -> &Vec<GridType> {
        &self.cells
    }
}
