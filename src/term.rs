use std::io::{stdout, Stdout, Write};

use crossterm::{cursor, execute, queue, style, terminal};
use crossterm::terminal::{ClearType, EnterAlternateScreen, LeaveAlternateScreen};

use crate::clock::Speed;
use crate::error::{Error, Result};
use crate::game::{EndReason, GameStatus, Snapshot};
use crate::grid::Grid;
use crate::{Cell, TermInt};

const SNAKE_BODY_CHAR: char = '█';
const FOOD_CHAR: char = 'O';
const DEAD_SNAKE_CHAR: char = 'X';

/// Narrowest terminal that shows the whole status line with five digit scores.
const STATUS_WIDTH: TermInt = 36;

/// Draws game snapshots somewhere.
pub trait Renderer {
    /// Called once before the first frame.
    fn setup(&mut self) -> Result<()> {
        Ok(())
    }

    /// Called once after the last frame, also when the game loop failed.
    fn restore(&mut self) -> Result<()> {
        Ok(())
    }

    fn render(&mut self, snapshot: &Snapshot, speed: Speed) -> Result<()>;
}

/// Crossterm renderer. Keeps a copy of what is on screen and only prints the
/// characters that changed since the previous frame.
pub struct TermManager {
    width: TermInt,
    height: TermInt,
    stdout: Stdout,
    screen: Vec<char>,
    board: Board,
}

/// Where the board sits on the terminal: `top_left` is the border corner.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Board {
    top_left: (TermInt, TermInt),
    width: TermInt,
    height: TermInt,
}

impl Board {
    /// Terminal position of a board cell.
    fn to_term(&self, cell: Cell) -> (TermInt, TermInt) {
        (self.top_left.0 + 1 + cell.0 as TermInt, self.top_left.1 + 1 + cell.1 as TermInt)
    }

    fn status_row(&self) -> TermInt {
        self.top_left.1 + self.height + 2
    }
}

impl TermManager {
    pub fn new(grid: &Grid) -> Result<Self> {
        let (width, height) = terminal::size()?;
        let board = layout(grid, (width, height))?;
        let screen = vec![' '; width as usize * height as usize];
        Ok(TermManager { width, height, stdout: stdout(), screen, board })
    }

    pub fn clear(&mut self) -> Result<()> {
        execute!(self.stdout, terminal::Clear(ClearType::All))?;
        self.screen = vec![' '; self.width as usize * self.height as usize];
        Ok(())
    }

    fn flush_frame(&mut self, frame: &[char]) -> Result<()> {
        for (i, (&new, old)) in frame.iter().zip(self.screen.iter_mut()).enumerate() {
            if new != *old {
                let (x, y) = (i % self.width as usize, i / self.width as usize);
                queue!(self.stdout, cursor::MoveTo(x as TermInt, y as TermInt), style::Print(new))?;
                *old = new;
            }
        }

        self.stdout.flush()?;
        Ok(())
    }
}

impl Renderer for TermManager {
    fn setup(&mut self) -> Result<()> {
        execute!(self.stdout, EnterAlternateScreen)?;
        terminal::enable_raw_mode()?;
        execute!(self.stdout, cursor::Hide, cursor::DisableBlinking)?;
        self.clear()
    }

    fn restore(&mut self) -> Result<()> {
        terminal::disable_raw_mode()?;
        execute!(self.stdout, cursor::Show, cursor::EnableBlinking, LeaveAlternateScreen)?;
        Ok(())
    }

    fn render(&mut self, snapshot: &Snapshot, speed: Speed) -> Result<()> {
        let frame = compose(snapshot, speed, self.board, (self.width, self.height));
        self.flush_frame(&frame)
    }
}

/// Centres the board, with its border and the status line below it, on a
/// terminal of the given size.
fn layout(grid: &Grid, term: (TermInt, TermInt)) -> Result<Board> {
    let (width, height) = (grid.width() as TermInt, grid.height() as TermInt);
    let need = ((width + 2).max(STATUS_WIDTH), height + 3);

    if term.0 < need.0 || term.1 < need.1 {
        return Err(Error::TerminalTooSmall { have: term, need });
    }

    let top_left = ((term.0 - (width + 2)) / 2, (term.1 - need.1) / 2);
    Ok(Board { top_left, width, height })
}

/// Renders a whole frame into a row-major character buffer.
fn compose(snapshot: &Snapshot, speed: Speed, board: Board, term: (TermInt, TermInt)) -> Vec<char> {
    let mut canvas = Canvas::new(term.0, term.1);
    draw_borders(&mut canvas, board);

    if let Some(food) = snapshot.food {
        canvas.put(board.to_term(food), FOOD_CHAR);
    }

    let dead = snapshot.status == GameStatus::GameOver
        && snapshot.end_reason != Some(EndReason::BoardFull);
    let snake_len = snapshot.snake.len();

    for (i, cell) in snapshot.snake.iter().enumerate() {
        let ch = if dead {
            DEAD_SNAKE_CHAR
        } else if i == snake_len - 1 {
            snapshot.heading.head_char()
        } else {
            SNAKE_BODY_CHAR
        };
        canvas.put(board.to_term(*cell), ch);
    }

    let status = format!(
        "Score: {}  Best: {}  Speed: {}",
        snapshot.score,
        snapshot.best,
        speed.value()
    );
    // Lined up with the board, shifted left when it would run off the edge
    let status_x = board.top_left.0.min(term.0.saturating_sub(status.chars().count() as TermInt));
    canvas.print((status_x, board.status_row()), &status);

    let lines = message_lines(snapshot);
    if !lines.is_empty() {
        let lines: Vec<&str> = lines.iter().map(String::as_str).collect();
        canvas.message(&lines);
    }

    canvas.cells
}

fn message_lines(snapshot: &Snapshot) -> Vec<String> {
    match snapshot.status {
        GameStatus::Running => vec![],
        GameStatus::Idle => vec![
            "Arrow keys or WASD to move".into(),
            "Space to pause, R to restart".into(),
            "+/- or 1..0 to change speed".into(),
            "Q or CTRL+C to quit".into(),
            "".into(),
            "Press Space to begin".into(),
        ],
        GameStatus::Paused => vec![
            "Paused".into(),
            "Press Space to resume".into(),
        ],
        GameStatus::GameOver => {
            let headline = match snapshot.end_reason {
                Some(EndReason::BoardFull) => "You won!",
                Some(EndReason::WallCollision) => "Game over! You hit the wall.",
                Some(EndReason::SelfCollision) => "Game over! You bit yourself.",
                None => "Game over!",
            };
            vec![
                headline.into(),
                format!("Score: {}", snapshot.score),
                "".into(),
                "Press R to play again,".into(),
                "or Q to quit.".into(),
            ]
        }
    }
}

fn draw_borders(canvas: &mut Canvas, board: Board) {
    let (left, top) = board.top_left;
    let (right, bottom) = (left + board.width + 1, top + board.height + 1);

    for x in left..=right {
        let ch = if x == left || x == right {'+'} else {'-'};
        canvas.put((x, top), ch);
        canvas.put((x, bottom), ch);
    }

    for y in top + 1..bottom {
        canvas.put((left, y), '|');
        canvas.put((right, y), '|');
    }
}

/// Off-screen character grid, clipped to the terminal size.
struct Canvas {
    width: TermInt,
    height: TermInt,
    cells: Vec<char>,
}

impl Canvas {
    fn new(width: TermInt, height: TermInt) -> Self {
        Canvas { width, height, cells: vec![' '; width as usize * height as usize] }
    }

    fn put(&mut self, pos: (TermInt, TermInt), ch: char) {
        if pos.0 < self.width && pos.1 < self.height {
            self.cells[self.width as usize * pos.1 as usize + pos.0 as usize] = ch;
        }
    }

    fn print(&mut self, pos: (TermInt, TermInt), text: &str) {
        for (i, ch) in text.chars().enumerate() {
            self.put((pos.0.saturating_add(i as TermInt), pos.1), ch);
        }
    }

    /// Boxed message centred on the canvas, one blank row above and below.
    fn message(&mut self, lines: &[&str]) {
        let msg_height = (lines.len() + 2) as TermInt;
        let msg_width = (lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) + 2) as TermInt;
        let center = (self.width / 2, self.height / 2);
        let top_left = (
            center.0.saturating_sub(msg_width / 2),
            center.1.saturating_sub(msg_height / 2),
        );

        for y_diff in 0..msg_height {
            let line = match y_diff {
                0 => "",
                d if d == msg_height - 1 => "",
                d => lines[d as usize - 1],
            };
            let padded = format!("{line: ^width$}", line = line, width = msg_width as usize);
            self.print((top_left.0, top_left.1 + y_diff), &padded);
        }
    }
}
