use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::puzzle::Difficulty;

/// Best completion time for one difficulty. The store holds at most one entry
/// per difficulty, always the minimum time ever achieved without auto-solve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScore {
    pub difficulty: Difficulty,
    pub time: u64,
    pub date: String,
}

impl HighScore {
    /// A record stamped with the current UTC date in RFC 3339.
    pub fn now(difficulty: Difficulty, time: u64) -> Self {
        let date = OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_default();
        Self { difficulty, time, date }
    }
}

/// Where the serialized score list lives. Injected so the ledger can run
/// against any backing, or none at all in tests.
pub trait ScoreStore {
    fn read(&self) -> anyhow::Result<Option<String>>;
    fn write(&self, payload: &str) -> anyhow::Result<()>;
}

/// Single JSON file on disk.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ScoreStore for FileStore {
    fn read(&self) -> anyhow::Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, payload: &str) -> anyhow::Result<()> {
        fs::write(&self.path, payload)?;
        Ok(())
    }
}

/// Keeps the payload in memory. Scores vanish with the process; useful for
/// tests and for hosts without durable storage.
#[derive(Default)]
pub struct MemoryStore {
    payload: RefCell<Option<String>>,
}

impl ScoreStore for MemoryStore {
    fn read(&self) -> anyhow::Result<Option<String>> {
        Ok(self.payload.borrow().clone())
    }

    fn write(&self, payload: &str) -> anyhow::Result<()> {
        *self.payload.borrow_mut() = Some(payload.to_string());
        Ok(())
    }
}

/// All recorded best times. A missing key or unreadable payload degrades to
/// an empty list; scores are a best-effort extra, never a reason to fail.
pub fn load(store: &dyn ScoreStore) -> Vec<HighScore> {
    match store.read() {
        Ok(Some(s)) => serde_json::from_str(&s).unwrap_or_default(),
        Ok(None) => Vec::new(),
        Err(e) => {
            log::warn!("high score read failed: {e}");
            Vec::new()
        }
    }
}

/// Records `entry` if it beats (or first sets) the stored time for its
/// difficulty, then rewrites the whole list. Write failures are logged and
/// swallowed; gameplay never blocks on persistence.
pub fn save(store: &dyn ScoreStore, entry: HighScore) {
    let mut scores = load(store);
    match scores.iter_mut().find(|s| s.difficulty == entry.difficulty) {
        Some(existing) if entry.time < existing.time => *existing = entry,
        Some(_) => {}
        None => scores.push(entry),
    }
    match serde_json::to_string_pretty(&scores) {
        Ok(json) => {
            if let Err(e) = store.write(&json) {
                log::warn!("high score write failed: {e}");
            }
        }
        Err(e) => log::warn!("high score serialize failed: {e}"),
    }
}

/// True when `time` would become the best recorded time for `difficulty`.
pub fn is_new_best(store: &dyn ScoreStore, difficulty: Difficulty, time: u64) -> bool {
    load(store)
        .iter()
        .find(|s| s.difficulty == difficulty)
        .map_or(true, |s| time < s.time)
}
