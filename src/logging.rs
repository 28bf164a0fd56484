//! Logger setup. The terminal is taken over by the game, so records go to a
//! file instead of stdout/stderr.

use std::path::Path;

use log::LevelFilter;

use crate::config;
use crate::error::Result;

pub fn init(level: LevelFilter, path: &Path) -> Result<()> {
    if level == LevelFilter::Off {
        return Ok(());
    }

    config::ensure_parent(path)?;

    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} [{}][{}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.target(),
                record.level(),
                message
            ))
        })
        .level(level)
        .chain(fern::log_file(path)?)
        .apply()?;

    Ok(())
}
