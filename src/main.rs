mod app;
mod clock;
mod config;
mod error;
mod food;
mod game;
mod grid;
mod input;
mod logging;
mod score;
mod snake;
mod term;

use std::process::exit;

use log::{info, warn};

use crate::app::SnakeApp;
use crate::config::{Args, Config};
use crate::score::{FileStore, MemoryStore, ScoreStore};
use crate::term::TermManager;

pub type TermInt = u16;
pub type GridInt = i16;
pub type Cell = (GridInt, GridInt);

fn main() {
    let args: Args = argh::from_env();

    if let Err(e) = run(&args) {
        eprintln!("snake: {}", e);
        exit(1);
    }
}

fn run(args: &Args) -> error::Result<()> {
    let config = Config::load(args)?;

    let log_file = config.log_file.clone()
        .unwrap_or_else(|| config::data_dir().join("snake.log"));
    logging::init(config.level_filter()?, &log_file)?;
    info!("Starting on a {}x{} board at speed {}", config.width, config.height, config.speed);

    let store: Box<dyn ScoreStore> = match config.score_file.clone().or_else(FileStore::default_path) {
        Some(path) => {
            let store = FileStore::open(path);
            info!("Best score kept in {}", store.path().display());
            Box::new(store)
        }
        None => {
            warn!("No data directory, the best score will not be saved");
            Box::new(MemoryStore::default())
        }
    };

    let term = TermManager::new(&config.grid())?;
    SnakeApp::new(&config, store, term)?.run()
}
