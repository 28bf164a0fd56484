//! Errors that stop the program. Game-level conditions such as collisions are
//! plain values and live in [`crate::game`].

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("terminal error: {0}")]
    Terminal(#[from] crossterm::ErrorKind),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("could not read config file {}: {source}", .path.display())]
    ConfigRead { path: PathBuf, source: io::Error },

    #[error("could not parse config file {}: {source}", .path.display())]
    ConfigParse { path: PathBuf, source: toml::de::Error },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("could not set up logging: {0}")]
    Logging(#[from] log::SetLoggerError),

    #[error("terminal is {have:?} but the board needs at least {need:?}")]
    TerminalTooSmall { have: (u16, u16), need: (u16, u16) },
}

pub type Result<T> = std::result::Result<T, Error>;
