//! Game configuration.
//!
//! Values come from a `config.toml` (the platform config directory, or the
//! file given with `--config`) and can be overridden on the command line. A
//! missing default config file is not an error; every field has a default.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use argh::FromArgs;
use log::LevelFilter;
use serde::Deserialize;
use smart_default::SmartDefault;

use crate::clock::Speed;
use crate::error::{Error, Result};
use crate::grid::Grid;
use crate::GridInt;

/// Largest board side accepted, well within the terminal coordinate range.
pub const MAX_SIDE: u16 = 500;

/// Terminal snake.
#[derive(FromArgs, Debug, Default)]
pub struct Args {
    /// path of the config file to use instead of the default one
    #[argh(option)]
    pub config: Option<PathBuf>,

    /// board width in cells
    #[argh(option)]
    pub width: Option<u16>,

    /// board height in cells
    #[argh(option)]
    pub height: Option<u16>,

    /// starting speed, 1 (slowest) to 10 (fastest)
    #[argh(option)]
    pub speed: Option<u8>,

    /// log level: off, error, warn, info, debug or trace
    #[argh(option)]
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, SmartDefault)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    #[default = 30]
    pub width: u16,
    #[default = 20]
    pub height: u16,
    #[default = 4]
    pub initial_length: usize,
    #[default = 5]
    pub speed: u8,
    #[default(String::from("info"))]
    pub log_level: String,
    /// Where the log goes; defaults to `snake.log` in the data directory.
    pub log_file: Option<PathBuf>,
    /// Where the best score is kept; defaults to `scores.toml` in the data directory.
    pub score_file: Option<PathBuf>,
}

impl Config {
    /// Reads the config file (if any), applies the command line on top and
    /// validates the result.
    pub fn load(args: &Args) -> Result<Config> {
        let mut config = match &args.config {
            Some(path) => Config::from_file(path)?,
            None => match default_path() {
                Some(path) if path.exists() => Config::from_file(&path)?,
                _ => Config::default(),
            },
        };

        config.apply_args(args);
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Config> {
        let text = fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_owned(),
            source,
        })?;
        Config::from_toml(&text).map_err(|source| Error::ConfigParse {
            path: path.to_owned(),
            source,
        })
    }

    pub fn from_toml(text: &str) -> std::result::Result<Config, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn apply_args(&mut self, args: &Args) {
        if let Some(width) = args.width {
            self.width = width;
        }
        if let Some(height) = args.height {
            self.height = height;
        }
        if let Some(speed) = args.speed {
            self.speed = speed;
        }
        if let Some(level) = &args.log_level {
            self.log_level = level.clone();
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (name, side) in [("width", self.width), ("height", self.height)] {
            if !(2..=MAX_SIDE).contains(&side) {
                return Err(Error::InvalidConfig(format!(
                    "{} must be between 2 and {}, got {}",
                    name, MAX_SIDE, side
                )));
            }
        }

        if self.initial_length == 0 || self.initial_length > self.width as usize {
            return Err(Error::InvalidConfig(format!(
                "initial_length must be between 1 and the board width ({}), got {}",
                self.width, self.initial_length
            )));
        }

        Speed::new(self.speed).map_err(|e| Error::InvalidConfig(e.to_string()))?;
        self.level_filter()?;
        Ok(())
    }

    pub fn grid(&self) -> Grid {
        Grid::new(self.width as GridInt, self.height as GridInt)
    }

    pub fn speed(&self) -> Result<Speed> {
        Speed::new(self.speed).map_err(|e| Error::InvalidConfig(e.to_string()))
    }

    pub fn level_filter(&self) -> Result<LevelFilter> {
        self.log_level
            .parse()
            .map_err(|_| Error::InvalidConfig(format!("unknown log level {:?}", self.log_level)))
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("", "", "snake")
}

/// `config.toml` in the platform config directory.
pub fn default_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Platform data directory, falling back to the working directory.
pub fn data_dir() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().to_owned())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Makes sure the parent directory of `path` exists.
pub fn ensure_parent(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => fs::create_dir_all(dir),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_classic_board() {
        let config = Config::default();

        assert_eq!((config.width, config.height), (30, 20));
        assert_eq!(config.initial_length, 4);
        assert_eq!(config.speed, 5);
        assert_eq!(config.level_filter().unwrap(), LevelFilter::Info);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let config = Config::from_toml("width = 40\nspeed = 8\n").unwrap();

        assert_eq!(config.width, 40);
        assert_eq!(config.height, 20);
        assert_eq!(config.speed, 8);
        assert_eq!(config.score_file, None);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(Config::from_toml("colour = \"green\"").is_err());
    }

    #[test]
    fn args_override_file_values() {
        let mut config = Config::from_toml("width = 40\nheight = 25\n").unwrap();
        let args = Args {
            height: Some(12),
            speed: Some(10),
            log_level: Some("off".into()),
            ..Args::default()
        };

        config.apply_args(&args);
        assert_eq!((config.width, config.height, config.speed), (40, 12, 10));
        assert_eq!(config.level_filter().unwrap(), LevelFilter::Off);
    }

    #[test]
    fn invalid_values_are_refused() {
        let bad = [
            Config { width: 1, ..Config::default() },
            Config { height: MAX_SIDE + 1, ..Config::default() },
            Config { initial_length: 0, ..Config::default() },
            Config { initial_length: 31, ..Config::default() },
            Config { speed: 11, ..Config::default() },
            Config { log_level: "loud".into(), ..Config::default() },
        ];

        for config in &bad {
            assert!(
                matches!(config.validate(), Err(Error::InvalidConfig(_))),
                "{:?} should be invalid",
                config
            );
        }
    }

    #[test]
    fn grid_follows_config() {
        let config = Config { width: 12, height: 7, ..Config::default() };
        assert_eq!(config.grid(), Grid::new(12, 7));
    }
}
