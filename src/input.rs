use std::time::Duration;

use crossterm::event::{poll, read, Event, KeyCode, KeyEvent, KeyModifiers};

use crate::clock::Speed;
use crate::error::Result;
use crate::snake::Direction::{self, *};

/// Everything the player can ask for.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InputEvent {
    Turn(Direction),
    ToggleRunning,
    Restart,
    Faster,
    Slower,
    SetSpeed(Speed),
    Quit,
}

impl InputEvent {
    pub fn from_key(ev: &KeyEvent) -> Option<InputEvent> {
        if is_ctrl_c(ev) {
            return Some(InputEvent::Quit);
        }

        let event = match ev.code {
            KeyCode::Char('w') | KeyCode::Char('W') | KeyCode::Up => InputEvent::Turn(Up),
            KeyCode::Char('a') | KeyCode::Char('A') | KeyCode::Left => InputEvent::Turn(Left),
            KeyCode::Char('s') | KeyCode::Char('S') | KeyCode::Down => InputEvent::Turn(Down),
            KeyCode::Char('d') | KeyCode::Char('D') | KeyCode::Right => InputEvent::Turn(Right),
            KeyCode::Char(' ') | KeyCode::Char('p') => InputEvent::ToggleRunning,
            KeyCode::Char('r') | KeyCode::Char('R') => InputEvent::Restart,
            KeyCode::Char('+') | KeyCode::Char('=') => InputEvent::Faster,
            KeyCode::Char('-') => InputEvent::Slower,
            KeyCode::Char('0') => InputEvent::SetSpeed(Speed::new(10).ok()?),
            KeyCode::Char(c @ '1'..='9') => InputEvent::SetSpeed(Speed::new(c as u8 - b'0').ok()?),
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => InputEvent::Quit,
            _ => return None,
        };

        Some(event)
    }
}

/// Waits up to `timeout` for the first key press, then drains whatever else
/// is already queued without blocking. `None` waits indefinitely.
pub fn read_events(timeout: Option<Duration>) -> Result<Vec<InputEvent>> {
    let mut events = vec![];

    let ready = match timeout {
        Some(timeout) => poll(timeout)?,
        None => true,
    };
    if !ready {
        return Ok(events);
    }

    push_key(read()?, &mut events);
    while poll(Duration::from_millis(0))? {
        push_key(read()?, &mut events);
    }

    Ok(events)
}

fn push_key(event: Event, events: &mut Vec<InputEvent>) {
    if let Event::Key(ev) = event {
        events.extend(InputEvent::from_key(&ev));
    }
}

fn is_ctrl_c(ev: &KeyEvent) -> bool {
    matches!(ev, KeyEvent { code: KeyCode::Char('c'), modifiers: KeyModifiers::CONTROL })
}
