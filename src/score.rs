use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use log::{error, info, warn};

/// Key under which the best score is persisted.
pub const BEST_SCORE_KEY: &str = "snake.highScore";

/// Synchronous key/value storage for integers.
///
/// Implementations never fail towards the caller: a missing or unreadable key
/// reads as 0 and write problems are only logged.
pub trait ScoreStore {
    fn get(&self, key: &str) -> u32;
    fn set(&mut self, key: &str, value: u32);
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, u32>,
}

impl ScoreStore for MemoryStore {
    fn get(&self, key: &str) -> u32 {
        self.values.get(key).copied().unwrap_or(0)
    }

    fn set(&mut self, key: &str, value: u32) {
        self.values.insert(key.to_owned(), value);
    }
}

/// A TOML table of `key = value` pairs, rewritten on every `set`.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: BTreeMap<String, u32>,
}

impl FileStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = Self::load(&path);
        FileStore { path, values }
    }

    /// `scores.toml` in the platform data directory, if there is one.
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "snake")
            .map(|dirs| dirs.data_dir().join("scores.toml"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(path: &Path) -> BTreeMap<String, u32> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                info!("No saved scores at {}: {}", path.display(), e);
                return BTreeMap::new();
            }
        };

        toml::from_str(&text).unwrap_or_else(|e| {
            warn!("Ignoring unreadable score file {}: {}", path.display(), e);
            BTreeMap::new()
        })
    }

    fn save(&self) {
        if let Some(dir) = self.path.parent() {
            if let Err(e) = fs::create_dir_all(dir) {
                error!("Error creating {}: {}", dir.display(), e);
                return;
            }
        }

        let text = match toml::to_string(&self.values) {
            Ok(text) => text,
            Err(e) => {
                error!("Error encoding scores: {}", e);
                return;
            }
        };

        // Readers only ever see the old file or the complete new one
        let tmp = self.tmp_path();
        if let Err(e) = fs::write(&tmp, text).and_then(|_| fs::rename(&tmp, &self.path)) {
            error!("Error saving scores to {}: {}", self.path.display(), e);
            let _ = fs::remove_file(&tmp);
        }
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl ScoreStore for FileStore {
    fn get(&self, key: &str) -> u32 {
        self.values.get(key).copied().unwrap_or(0)
    }

    fn set(&mut self, key: &str, value: u32) {
        self.values.insert(key.to_owned(), value);
        self.save();
    }
}

impl<S: ScoreStore + ?Sized> ScoreStore for Box<S> {
    fn get(&self, key: &str) -> u32 {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: u32) {
        (**self).set(key, value)
    }
}

/// Current run score plus the all-time best, which is persisted as soon as
/// it changes.
pub struct ScoreTracker<S> {
    current: u32,
    best: u32,
    store: S,
}

impl<S: ScoreStore> ScoreTracker<S> {
    pub fn new(store: S) -> Self {
        let best = store.get(BEST_SCORE_KEY);
        ScoreTracker { current: 0, best, store }
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn best(&self) -> u32 {
        self.best
    }

    pub fn add_points(&mut self, points: u32) {
        self.current = self.current.saturating_add(points);

        if self.current > self.best {
            self.best = self.current;
            self.store.set(BEST_SCORE_KEY, self.best);
            info!("New best score: {}", self.best);
        }
    }

    /// Starts a new run. The best score is kept.
    pub fn reset(&mut self) {
        self.current = 0;
    }

    #[cfg(test)]
    pub fn store(&self) -> &S {
        &self.store
    }
}
