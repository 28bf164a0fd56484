use rand::{rngs::ThreadRng, seq::IteratorRandom, Rng};
use thiserror::Error;

use crate::grid::Grid;
use crate::snake::Snake;
use crate::Cell;

/// How many random draws are attempted before falling back to scanning the
/// free cells. Only matters when the board is nearly full.
const MAX_SAMPLES: usize = 32;

/// The snake covers every cell, so there is nowhere left to put food.
#[derive(Copy, Clone, Debug, Error, PartialEq, Eq)]
#[error("the board is full, no free cell left for food")]
pub struct BoardFull;

pub struct FoodSpawner<R = ThreadRng> {
    rng: R,
}

impl FoodSpawner<ThreadRng> {
    pub fn new() -> Self {
        FoodSpawner::with_rng(rand::thread_rng())
    }
}

impl<R: Rng> FoodSpawner<R> {
    pub fn with_rng(rng: R) -> Self {
        FoodSpawner { rng }
    }

    /// Picks a cell uniformly among those not occupied by the snake.
    pub fn spawn(&mut self, snake: &Snake, grid: &Grid) -> Result<Cell, BoardFull> {
        let free = grid.area().saturating_sub(snake.len());
        if free == 0 {
            return Err(BoardFull);
        }

        for _ in 0..MAX_SAMPLES {
            let candidate = (
                self.rng.gen_range(0..grid.width()),
                self.rng.gen_range(0..grid.height()),
            );
            if !snake.occupies(candidate) {
                return Ok(candidate);
            }
        }

        grid.cells()
            .filter(|cell| !snake.occupies(*cell))
            .choose(&mut self.rng)
            .ok_or(BoardFull)
    }
}
