use std::time::Instant;

use log::{debug, info};

use crate::clock::{Clock, Speed};
use crate::config::Config;
use crate::error::Result;
use crate::food::FoodSpawner;
use crate::game::{Game, GameStatus, InvalidTransition, TickOutcome};
use crate::input::{self, InputEvent};
use crate::score::ScoreStore;
use crate::term::Renderer;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Single-threaded driver: waits for either input or the next tick, never
/// both at once, and redraws after every change.
pub struct SnakeApp<S, T> {
    game: Game<S>,
    clock: Clock,
    speed: Speed,
    renderer: T,
}

impl<S: ScoreStore, T: Renderer> SnakeApp<S, T> {
    pub fn new(config: &Config, store: S, renderer: T) -> Result<Self> {
        let speed = config.speed()?;
        let game = Game::new(config.grid(), config.initial_length, store, FoodSpawner::new());

        Ok(SnakeApp { game, clock: Clock::new(speed.period()), speed, renderer })
    }

    /// Runs until the player quits. The renderer is restored even when setup
    /// or the loop failed; the first error wins.
    pub fn run(&mut self) -> Result<()> {
        let res = self.renderer.setup().and_then(|_| self.main_loop());
        let restored = self.renderer.restore();
        res.and(restored)
    }

    fn main_loop(&mut self) -> Result<()> {
        self.render()?;

        loop {
            let timeout = self.clock.time_until_due(Instant::now());

            for event in input::read_events(timeout)? {
                if self.handle(event, Instant::now()) == Flow::Quit {
                    info!("Quitting with best score {}", self.game.scores().best());
                    return Ok(());
                }
            }

            if let Some(TickOutcome::Ended(reason)) = self.advance(Instant::now()) {
                debug!("Clock stopped after {:?}", reason);
            }
            self.render()?;
        }
    }

    /// Applies one player input. Status changes take effect immediately,
    /// turns are buffered until the next tick.
    pub fn handle(&mut self, event: InputEvent, now: Instant) -> Flow {
        let res = match event {
            InputEvent::Quit => return Flow::Quit,
            InputEvent::Turn(direction) => self.game.turn(direction).map(|_| ()),
            InputEvent::ToggleRunning => self.game.toggle_running(),
            InputEvent::Restart => {
                // A new run gets a fresh schedule
                self.clock.stop();
                self.game.restart().and_then(|_| self.game.start())
            }
            InputEvent::Faster => {
                self.set_speed(self.speed.faster(), now);
                Ok(())
            }
            InputEvent::Slower => {
                self.set_speed(self.speed.slower(), now);
                Ok(())
            }
            InputEvent::SetSpeed(speed) => {
                self.set_speed(speed, now);
                Ok(())
            }
        };

        if let Err(InvalidTransition { status, action }) = res {
            debug!("Ignored {:?} while {:?}", action, status);
        }

        self.sync_clock(now);
        Flow::Continue
    }

    /// Runs the tick if the clock says one is due.
    pub fn advance(&mut self, now: Instant) -> Option<TickOutcome> {
        if !self.clock.poll(now) {
            return None;
        }

        let outcome = self.game.tick().ok();
        self.sync_clock(now);
        outcome
    }

    #[cfg(test)]
    pub fn game(&self) -> &Game<S> {
        &self.game
    }

    #[cfg(test)]
    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    #[cfg(test)]
    pub fn speed(&self) -> Speed {
        self.speed
    }

    fn set_speed(&mut self, speed: Speed, now: Instant) {
        if speed != self.speed {
            debug!("Speed {} -> {}", self.speed.value(), speed.value());
            self.speed = speed;
            self.clock.set_period(speed.period(), now);
        }
    }

    /// The clock only runs while the game does.
    fn sync_clock(&mut self, now: Instant) {
        if self.game.status() == GameStatus::Running {
            self.clock.start(now);
        } else {
            self.clock.stop();
        }
    }

    fn render(&mut self) -> Result<()> {
        let snapshot = self.game.snapshot();
        self.renderer.render(&snapshot, self.speed)
    }
}
