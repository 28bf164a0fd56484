use crate::{Cell, GridInt};

/// Fixed-size rectangular board. Cells outside of it are walls.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    width: GridInt,
    height: GridInt,
}

impl Grid {
    pub fn new(width: GridInt, height: GridInt) -> Self {
        Grid { width, height }
    }

    pub fn width(&self) -> GridInt {
        self.width
    }

    pub fn height(&self) -> GridInt {
        self.height
    }

    pub fn contains(&self, cell: Cell) -> bool {
        let (x, y) = cell;
        x >= 0 && x < self.width && y >= 0 && y < self.height
    }

    /// Total number of cells on the board.
    pub fn area(&self) -> usize {
        self.width.max(0) as usize * self.height.max(0) as usize
    }

    /// Row-major iteration over every cell of the board.
    pub fn cells(&self) -> impl Iterator<Item = Cell> {
        let (width, height) = (self.width, self.height);
        (0..height).flat_map(move |y| (0..width).map(move |x| (x, y)))
    }
}
