//! The game state machine.
//!
//! A [`Game`] owns everything a single run needs: the board, the snake, the
//! food, the buffered turn request, the status and the scores. Nothing here
//! knows about time or terminals; the caller decides when to [`Game::tick`]
//! and what to do with the resulting [`Snapshot`].

use log::{debug, info, trace};
use rand::{rngs::ThreadRng, Rng};
use thiserror::Error;

use crate::food::{BoardFull, FoodSpawner};
use crate::grid::Grid;
use crate::score::{ScoreStore, ScoreTracker};
use crate::snake::{Direction::{self, *}, Snake};
use crate::{Cell, GridInt};

pub const POINTS_PER_FOOD: u32 = 10;
pub const INITIAL_HEADING: Direction = Right;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GameStatus {
    Idle,
    Running,
    Paused,
    GameOver,
}

/// Why a run ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EndReason {
    WallCollision,
    SelfCollision,
    /// The snake filled the whole board.
    BoardFull,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Start,
    Pause,
    Resume,
    ToggleRunning,
    Restart,
    Turn,
    Tick,
}

/// An action that makes no sense in the current status. The game is left
/// untouched when this is returned.
#[derive(Copy, Clone, Debug, Error, PartialEq, Eq)]
#[error("cannot {action:?} while {status:?}")]
pub struct InvalidTransition {
    pub status: GameStatus,
    pub action: Action,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// The snake moved one cell.
    Moved,
    /// The snake moved onto the food and grew by one cell.
    Ate,
    Ended(EndReason),
}

/// Read-only view of the game for renderers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    /// Tail first, head last.
    pub snake: Vec<Cell>,
    pub heading: Direction,
    pub food: Option<Cell>,
    pub score: u32,
    pub best: u32,
    pub status: GameStatus,
    pub end_reason: Option<EndReason>,
}

pub struct Game<S, R = ThreadRng> {
    grid: Grid,
    initial_length: usize,
    snake: Snake,
    food: Option<Cell>,
    pending: Direction,
    status: GameStatus,
    end_reason: Option<EndReason>,
    scores: ScoreTracker<S>,
    spawner: FoodSpawner<R>,
}

impl<S: ScoreStore, R: Rng> Game<S, R> {
    /// Creates an `Idle` game with a fresh snake and food.
    pub fn new(grid: Grid, initial_length: usize, store: S, spawner: FoodSpawner<R>) -> Self {
        let snake = starting_snake(&grid, initial_length);
        let mut game = Game {
            grid,
            initial_length,
            snake,
            food: None,
            pending: INITIAL_HEADING,
            status: GameStatus::Idle,
            end_reason: None,
            scores: ScoreTracker::new(store),
            spawner,
        };
        game.reset();
        game
    }

    #[cfg(test)]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[cfg(test)]
    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    #[cfg(test)]
    pub fn food(&self) -> Option<Cell> {
        self.food
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    #[cfg(test)]
    pub fn end_reason(&self) -> Option<EndReason> {
        self.end_reason
    }

    #[cfg(test)]
    pub fn pending_direction(&self) -> Direction {
        self.pending
    }

    pub fn scores(&self) -> &ScoreTracker<S> {
        &self.scores
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            snake: self.snake.body().copied().collect(),
            heading: self.snake.heading(),
            food: self.food,
            score: self.scores.current(),
            best: self.scores.best(),
            status: self.status,
            end_reason: self.end_reason,
        }
    }

    pub fn start(&mut self) -> Result<(), InvalidTransition> {
        self.transition(Action::Start, GameStatus::Idle, GameStatus::Running)
    }

    pub fn pause(&mut self) -> Result<(), InvalidTransition> {
        self.transition(Action::Pause, GameStatus::Running, GameStatus::Paused)
    }

    pub fn resume(&mut self) -> Result<(), InvalidTransition> {
        self.transition(Action::Resume, GameStatus::Paused, GameStatus::Running)
    }

    /// Start, pause or resume depending on the current status.
    pub fn toggle_running(&mut self) -> Result<(), InvalidTransition> {
        match self.status {
            GameStatus::Idle => self.start(),
            GameStatus::Running => self.pause(),
            GameStatus::Paused => self.resume(),
            GameStatus::GameOver => Err(self.invalid(Action::ToggleRunning)),
        }
    }

    /// Throws away the current run and goes back to `Idle` with a new snake,
    /// new food and a zero score. The best score is kept.
    pub fn restart(&mut self) -> Result<(), InvalidTransition> {
        if self.status == GameStatus::Idle {
            return Err(self.invalid(Action::Restart));
        }

        self.reset();
        info!("Game restarted");
        Ok(())
    }

    /// Buffers a turn for the next tick.
    ///
    /// Turning straight back is refused for snakes longer than one cell. The
    /// check is made against the direction of the last tick, not against an
    /// earlier turn that is still waiting, so two quick key presses cannot
    /// fold the snake onto itself.
    pub fn turn(&mut self, direction: Direction) -> Result<bool, InvalidTransition> {
        if self.status == GameStatus::GameOver {
            return Err(self.invalid(Action::Turn));
        }

        if self.snake.len() >= 2 && direction == self.snake.heading().opposite() {
            debug!("Ignoring reversal to {:?}", direction);
            return Ok(false);
        }

        self.pending = direction;
        Ok(true)
    }

    /// Advances the simulation by one step. Only valid while `Running`.
    pub fn tick(&mut self) -> Result<TickOutcome, InvalidTransition> {
        if self.status != GameStatus::Running {
            return Err(self.invalid(Action::Tick));
        }

        let direction = self.pending;
        self.snake.set_heading(direction);
        let new_head = direction.offset(self.snake.head());

        if !self.grid.contains(new_head) {
            return Ok(self.end(EndReason::WallCollision));
        }

        // Checked against the whole body, including the tail cell that this
        // move would have freed.
        if self.snake.occupies(new_head) {
            return Ok(self.end(EndReason::SelfCollision));
        }

        self.snake.advance(new_head);

        if self.food == Some(new_head) {
            self.scores.add_points(POINTS_PER_FOOD);
            trace!("Ate food at {:?}, score {}", new_head, self.scores.current());

            match self.spawner.spawn(&self.snake, &self.grid) {
                Ok(food) => self.food = Some(food),
                Err(BoardFull) => {
                    self.food = None;
                    return Ok(self.end(EndReason::BoardFull));
                }
            }
            Ok(TickOutcome::Ate)
        } else {
            self.snake.shrink_tail();
            trace!("Moved to {:?}", new_head);
            Ok(TickOutcome::Moved)
        }
    }

    fn reset(&mut self) {
        self.snake = starting_snake(&self.grid, self.initial_length);
        self.pending = INITIAL_HEADING;
        self.scores.reset();
        self.food = self.spawner.spawn(&self.snake, &self.grid).ok();
        self.status = GameStatus::Idle;
        self.end_reason = None;
    }

    fn end(&mut self, reason: EndReason) -> TickOutcome {
        self.status = GameStatus::GameOver;
        self.end_reason = Some(reason);
        info!("Game over ({:?}), score {}", reason, self.scores.current());
        TickOutcome::Ended(reason)
    }

    fn transition(
        &mut self,
        action: Action,
        from: GameStatus,
        to: GameStatus,
    ) -> Result<(), InvalidTransition> {
        if self.status != from {
            return Err(self.invalid(action));
        }

        debug!("{:?}: {:?} -> {:?}", action, from, to);
        self.status = to;
        Ok(())
    }

    fn invalid(&self, action: Action) -> InvalidTransition {
        InvalidTransition { status: self.status, action }
    }
}

/// Horizontal snake centred on the middle row, heading right.
fn starting_snake(grid: &Grid, length: usize) -> Snake {
    let len = length.max(1) as GridInt;
    let start_x = grid.width() / 2 - len / 2;
    let head = (start_x + len - 1, grid.height() / 2);
    Snake::new(head, length, INITIAL_HEADING)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::MemoryStore;
    use rand::{rngs::StdRng, SeedableRng};
    use std::collections::HashSet;

    type TestGame = Game<MemoryStore, StdRng>;

    fn game(width: GridInt, height: GridInt, length: usize) -> TestGame {
        Game::new(
            Grid::new(width, height),
            length,
            MemoryStore::default(),
            FoodSpawner::with_rng(StdRng::seed_from_u64(42)),
        )
    }

    fn running(width: GridInt, height: GridInt, length: usize) -> TestGame {
        let mut game = game(width, height, length);
        game.start().unwrap();
        game
    }

    fn body(game: &TestGame) -> Vec<Cell> {
        game.snake().body().copied().collect()
    }

    fn snake_from(cells: &[Cell], heading: Direction) -> Snake {
        let mut snake = Snake::new(cells[0], 1, heading);
        for cell in &cells[1..] {
            snake.advance(*cell);
        }
        snake
    }

    #[test]
    fn starts_idle_and_centred() {
        let game = game(30, 20, 4);

        assert_eq!(game.status(), GameStatus::Idle);
        assert_eq!(body(&game), vec![(13, 10), (14, 10), (15, 10), (16, 10)]);
        assert_eq!(game.snake().heading(), Right);
        assert_eq!(game.scores().current(), 0);

        let food = game.food().unwrap();
        assert!(!game.snake().occupies(food));
    }

    #[test]
    fn ticks_need_a_running_game() {
        let mut game = game(30, 20, 4);
        let before = game.snapshot();

        let err = game.tick().unwrap_err();
        assert_eq!(err, InvalidTransition { status: GameStatus::Idle, action: Action::Tick });
        assert_eq!(game.snapshot(), before);

        game.start().unwrap();
        game.pause().unwrap();
        assert!(game.tick().is_err());
        assert_eq!(game.snapshot().snake, before.snake);
    }

    #[test]
    fn plain_move_shifts_the_snake() {
        let mut game = running(30, 20, 4);
        game.food = Some((0, 0));
        let score = game.scores().current();

        assert_eq!(game.tick(), Ok(TickOutcome::Moved));
        assert_eq!(body(&game), vec![(14, 10), (15, 10), (16, 10), (17, 10)]);
        assert_eq!(game.scores().current(), score);
        assert_eq!(game.status(), GameStatus::Running);
    }

    #[test]
    fn eating_grows_and_scores() {
        let mut game = running(30, 20, 4);
        game.food = Some((17, 10));

        assert_eq!(game.tick(), Ok(TickOutcome::Ate));
        assert_eq!(game.snake().len(), 5);
        assert_eq!(game.snake().head(), (17, 10));
        assert_eq!(game.scores().current(), 10);
        assert_eq!(game.scores().best(), 10);

        let food = game.food().unwrap();
        assert_ne!(food, (17, 10));
        assert!(!game.snake().occupies(food));
    }

    #[test]
    fn hitting_the_wall_ends_the_run() {
        let mut game = running(30, 20, 4);
        game.food = Some((0, 0));
        game.snake = Snake::new((29, 10), 4, Right);
        let before = game.snapshot();

        assert_eq!(game.tick(), Ok(TickOutcome::Ended(EndReason::WallCollision)));
        assert_eq!(game.status(), GameStatus::GameOver);
        assert_eq!(game.end_reason(), Some(EndReason::WallCollision));
        assert_eq!(game.snapshot().snake, before.snake);
        assert_eq!(game.food(), before.food);
    }

    #[test]
    fn running_into_the_body_ends_the_run() {
        let mut game = running(30, 20, 5);
        game.food = Some((0, 0));
        assert_eq!(body(&game), vec![(13, 10), (14, 10), (15, 10), (16, 10), (17, 10)]);

        game.turn(Down).unwrap();
        game.tick().unwrap();
        game.turn(Left).unwrap();
        game.tick().unwrap();
        game.turn(Up).unwrap();

        assert_eq!(game.tick(), Ok(TickOutcome::Ended(EndReason::SelfCollision)));
        assert_eq!(game.status(), GameStatus::GameOver);
    }

    #[test]
    fn moving_into_the_tail_cell_is_a_collision() {
        let mut game = running(10, 10, 4);
        game.food = Some((9, 9));
        game.snake = snake_from(&[(0, 0), (1, 0), (1, 1), (0, 1)], Left);
        game.turn(Up).unwrap();

        assert_eq!(game.tick(), Ok(TickOutcome::Ended(EndReason::SelfCollision)));
    }

    #[test]
    fn reversal_is_refused_for_long_snakes() {
        let mut game = running(30, 20, 4);

        assert_eq!(game.turn(Left), Ok(false));
        assert_eq!(game.pending_direction(), Right);

        // A waiting turn does not change what counts as reversing
        assert_eq!(game.turn(Up), Ok(true));
        assert_eq!(game.turn(Left), Ok(false));
        assert_eq!(game.turn(Down), Ok(true));
        assert_eq!(game.pending_direction(), Down);
    }

    #[test]
    fn single_cell_snake_may_reverse() {
        let mut game = running(30, 20, 1);
        game.food = Some((0, 0));

        assert_eq!(game.turn(Left), Ok(true));
        let head = game.snake().head();
        assert_eq!(game.tick(), Ok(TickOutcome::Moved));
        assert_eq!(game.snake().head(), (head.0 - 1, head.1));
    }

    #[test]
    fn filling_the_board_is_reported() {
        // 3x2 board: snake takes five cells, food the last one
        let mut game = running(3, 2, 2);
        game.snake = snake_from(&[(0, 1), (0, 0), (1, 0), (2, 0), (2, 1)], Down);
        game.food = Some((1, 1));
        game.turn(Left).unwrap();

        assert_eq!(game.tick(), Ok(TickOutcome::Ended(EndReason::BoardFull)));
        assert_eq!(game.status(), GameStatus::GameOver);
        assert_eq!(game.food(), None);
        assert_eq!(game.snake().len(), 6);
        assert_eq!(game.scores().current(), POINTS_PER_FOOD);
    }

    #[test]
    fn status_transitions() {
        let mut game = game(30, 20, 4);
        let idle = game.snapshot();

        assert!(game.restart().is_err());
        assert_eq!(game.snapshot(), idle);
        assert!(game.pause().is_err());
        assert!(game.resume().is_err());
        assert_eq!(game.snapshot(), idle);

        game.toggle_running().unwrap();
        assert_eq!(game.status(), GameStatus::Running);
        assert!(game.start().is_err());

        game.toggle_running().unwrap();
        assert_eq!(game.status(), GameStatus::Paused);
        let paused = game.snapshot();
        assert_eq!(
            game.pause(),
            Err(InvalidTransition { status: GameStatus::Paused, action: Action::Pause })
        );
        assert_eq!(game.snapshot(), paused);

        game.toggle_running().unwrap();
        assert_eq!(game.status(), GameStatus::Running);
    }

    #[test]
    fn game_over_only_leaves_through_restart() {
        let mut game = running(30, 20, 4);
        game.food = Some((0, 0));
        game.snake = Snake::new((29, 10), 4, Right);
        game.tick().unwrap();

        assert!(game.toggle_running().is_err());
        assert!(game.start().is_err());
        assert!(game.resume().is_err());
        assert!(game.tick().is_err());
        assert!(game.turn(Up).is_err());
        assert_eq!(game.status(), GameStatus::GameOver);

        game.restart().unwrap();
        assert_eq!(game.status(), GameStatus::Idle);
        assert_eq!(game.end_reason(), None);
        assert_eq!(game.snake().len(), 4);
        assert_eq!(game.pending_direction(), Right);
    }

    #[test]
    fn restart_keeps_best_score() {
        let mut game = running(30, 20, 4);
        game.food = Some((17, 10));
        game.tick().unwrap();
        assert_eq!(game.scores().best(), 10);

        game.restart().unwrap();
        assert_eq!(game.scores().current(), 0);
        assert_eq!(game.scores().best(), 10);
        assert_eq!(game.snapshot().best, 10);
    }

    #[test]
    fn random_play_keeps_invariants() {
        let directions = [Up, Down, Left, Right];
        let mut rng = StdRng::seed_from_u64(1234);

        for round in 0..20 {
            let mut game = Game::new(
                Grid::new(12, 8),
                4,
                MemoryStore::default(),
                FoodSpawner::with_rng(StdRng::seed_from_u64(round)),
            );
            game.start().unwrap();
            let mut best = game.scores().best();

            for _ in 0..400 {
                let _ = game.turn(directions[rng.gen_range(0..4)]);
                let previous = game.snake().heading();
                let long = game.snake().len() >= 2;

                match game.tick() {
                    Ok(TickOutcome::Ended(_)) => break,
                    Ok(_) => {}
                    Err(e) => panic!("unexpected {}", e),
                }

                if long {
                    assert_ne!(game.snake().heading(), previous.opposite());
                }

                let cells: Vec<Cell> = body(&game);
                let distinct: HashSet<Cell> = cells.iter().copied().collect();
                assert_eq!(distinct.len(), cells.len());
                assert!(cells.iter().all(|c| game.grid().contains(*c)));
                if let Some(food) = game.food() {
                    assert!(!distinct.contains(&food));
                }

                let score = game.scores().current();
                assert_eq!(score % POINTS_PER_FOOD, 0);
                assert!(game.scores().best() >= best);
                best = game.scores().best();
            }
        }
    }
}
