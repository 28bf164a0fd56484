use std::collections::VecDeque;

use crate::{Cell, GridInt};
use Direction::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right
}

impl Direction {
    /// Unit vector of this direction, with `y` growing downwards.
    pub fn delta(self) -> (GridInt, GridInt) {
        match self {
            Up => (0, -1),
            Down => (0, 1),
            Left => (-1, 0),
            Right => (1, 0),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Up => Down,
            Down => Up,
            Left => Right,
            Right => Left,
        }
    }

    pub fn offset(self, cell: Cell) -> Cell {
        let (dx, dy) = self.delta();
        (cell.0 + dx, cell.1 + dy)
    }

    pub fn head_char(self) -> char {
        match self {
            Up => '^',
            Down => 'v',
            Left => '<',
            Right => '>',
        }
    }
}

/// The snake's body, tail first and head last.
#[derive(Clone, Debug)]
pub struct Snake {
    body: VecDeque<Cell>,
    heading: Direction,
}

impl Snake {
    /// Builds a straight snake of `size` cells ending at `head`, lying behind it
    /// with respect to `heading`.
    pub fn new(head: Cell, size: usize, heading: Direction) -> Self {
        let (dx, dy) = heading.delta();

        let body = (0..size.max(1) as GridInt).rev()
            .map(|i| (head.0 - dx * i, head.1 - dy * i))
            .collect();
        Snake { body, heading }
    }

    /// Cells from tail to head.
    pub fn body(&self) -> impl DoubleEndedIterator<Item = &Cell> + ExactSizeIterator {
        self.body.iter()
    }

    pub fn head(&self) -> Cell {
        // The body is never empty: it starts with at least one cell and
        // shrink_tail never removes the last one.
        self.body[self.body.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Direction the snake moved in on the last tick.
    pub fn heading(&self) -> Direction {
        self.heading
    }

    pub fn set_heading(&mut self, heading: Direction) {
        self.heading = heading;
    }

    /// Pushes a new head. Whether the tail follows is up to the caller.
    pub fn advance(&mut self, new_head: Cell) {
        self.body.push_back(new_head);
    }

    /// Drops the oldest cell, returning it. A single-cell snake is left alone.
    pub fn shrink_tail(&mut self) -> Option<Cell> {
        if self.body.len() > 1 {
            self.body.pop_front()
        } else {
            None
        }
    }

    pub fn occupies(&self, cell: Cell) -> bool {
        self.body.contains(&cell)
    }
}
