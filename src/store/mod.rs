//! Configuration store
//!
//! Cached read access to the `~/.claude` directory tree: agent documents
//! under `agents/*.md`, skills under `skills/<name>/SKILL.md`, and the
//! `settings.json` mapping. Results are cached per dataset for a short TTL
//! and invalidated wholesale whenever the watcher or a writer path reports a
//! change.
//!
//! Scans are tolerant by design: an unreadable or undecodable file is logged
//! and skipped, never surfaced to the caller. Absent directories read as
//! empty datasets.

mod scaffold;
mod settings;
mod shared;

pub use settings::SETTINGS_MASK;
pub use shared::shared_store;

use crate::document::{self, Record};
use crate::error::DeckError;
use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::warn;
use walkdir::WalkDir;

/// How long a cached dataset stays valid.
pub const CACHE_TTL: Duration = Duration::from_secs(5);

/// A cached dataset value with its refresh stamp.
#[derive(Debug)]
struct Stamped<T> {
    value: T,
    refreshed: Instant,
}

impl<T: Clone> Stamped<T> {
    fn new(value: T) -> Self {
        Self {
            value,
            refreshed: Instant::now(),
        }
    }

    fn fresh(&self, ttl: Duration) -> Option<T> {
        (self.refreshed.elapsed() < ttl).then(|| self.value.clone())
    }
}

/// One slot per dataset. Invalidation clears all slots at once; there is no
/// per-key eviction.
#[derive(Debug, Default)]
struct CacheState {
    agents: Option<Stamped<Arc<Vec<Record>>>>,
    skills: Option<Stamped<Arc<Vec<Record>>>>,
    settings: Option<Stamped<Arc<Map<String, Value>>>>,
}

/// Read accessors over a configuration root, with a TTL cache.
///
/// Construct one explicitly with [`ConfigStore::new`] and pass it to the
/// components that need it; [`shared_store`] exists for hosts that want the
/// single process-wide instance instead.
#[derive(Debug)]
pub struct ConfigStore {
    root: PathBuf,
    ttl: Duration,
    cache: Mutex<CacheState>,
}

impl ConfigStore {
    /// Store over `root` with the default cache TTL.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_cache_ttl(root, CACHE_TTL)
    }

    /// Store over `root` with an explicit cache TTL.
    pub fn with_cache_ttl(root: impl Into<PathBuf>, ttl: Duration) -> Self {
        let root = root.into();
        let root = dunce::canonicalize(&root).unwrap_or(root);
        Self {
            root,
            ttl,
            cache: Mutex::new(CacheState::default()),
        }
    }

    /// Default configuration root: the user's home directory + `.claude`.
    pub fn default_root() -> Result<PathBuf, DeckError> {
        let dirs = directories::BaseDirs::new().ok_or(DeckError::NoHomeDir)?;
        Ok(dirs.home_dir().join(".claude"))
    }

    /// The (canonicalized, when possible) configuration root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All agent records under `<root>/agents/*.md`, sorted by id.
    pub fn agents(&self) -> Arc<Vec<Record>> {
        if let Some(cached) = self
            .cache
            .lock()
            .agents
            .as_ref()
            .and_then(|s| s.fresh(self.ttl))
        {
            return cached;
        }
        // scan outside the lock; concurrent misses may race, last write wins
        let scanned = Arc::new(scan_agents(&self.root));
        self.cache.lock().agents = Some(Stamped::new(Arc::clone(&scanned)));
        scanned
    }

    /// All skill records under `<root>/skills/<name>/SKILL.md`, sorted by id.
    /// Symlinked skill directories are followed.
    pub fn skills(&self) -> Arc<Vec<Record>> {
        if let Some(cached) = self
            .cache
            .lock()
            .skills
            .as_ref()
            .and_then(|s| s.fresh(self.ttl))
        {
            return cached;
        }
        let scanned = Arc::new(scan_skills(&self.root));
        self.cache.lock().skills = Some(Stamped::new(Arc::clone(&scanned)));
        scanned
    }

    /// The `settings.json` mapping, with sensitive `env` entries masked.
    ///
    /// An absent file reads as an empty mapping. A present-but-malformed file
    /// reads as a mapping holding only an `error` entry describing the
    /// failure; callers must check for that sentinel.
    pub fn settings(&self) -> Arc<Map<String, Value>> {
        if let Some(cached) = self
            .cache
            .lock()
            .settings
            .as_ref()
            .and_then(|s| s.fresh(self.ttl))
        {
            return cached;
        }
        let loaded = Arc::new(settings::load_settings(&self.root));
        self.cache.lock().settings = Some(Stamped::new(Arc::clone(&loaded)));
        loaded
    }

    /// Drop every cached dataset so the next read rescans the filesystem.
    ///
    /// Called by the watcher callback and by every writer path after it
    /// touches a watched file.
    pub fn invalidate_cache(&self) {
        *self.cache.lock() = CacheState::default();
    }

    /// Watch the configuration root, invalidating the cache and then running
    /// `callback` (debounced) on every relevant change.
    ///
    /// The watcher thread never touches caller state except through
    /// `callback`; a UI host should use it to queue a refresh message into
    /// its own event loop rather than mutate screen state directly.
    ///
    /// Takes an `Arc` receiver because the watcher holds the store for its
    /// whole lifetime; clone the `Arc` to keep using the store.
    pub fn watch<F>(self: Arc<Self>, callback: F) -> Result<crate::watch::ConfigWatcher, DeckError>
    where
        F: Fn() + Send + 'static,
    {
        let root = self.root.clone();
        crate::watch::ConfigWatcher::spawn(root, crate::watch::WatchConfig::default(), move || {
            self.invalidate_cache();
            callback();
        })
    }
}

fn scan_agents(root: &Path) -> Vec<Record> {
    let agents_dir = root.join("agents");
    if !agents_dir.is_dir() {
        return Vec::new();
    }

    let mut records = Vec::new();
    for entry in WalkDir::new(&agents_dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("failed to read agents directory entry: {e}");
                continue;
            }
        };
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().and_then(|e| e.to_str()) != Some("md") {
            continue;
        }
        let id = match path.file_stem().and_then(|s| s.to_str()) {
            Some(stem) => stem.to_string(),
            None => {
                warn!("skipping agent file with non UTF-8 name: {}", path.display());
                continue;
            }
        };
        match document::load_record(id, path) {
            Ok(record) => records.push(record),
            Err(e) => warn!("skipping unreadable agent file {}: {e}", path.display()),
        }
    }

    records.sort_by(|a, b| a.id.cmp(&b.id));
    records
}

fn scan_skills(root: &Path) -> Vec<Record> {
    let skills_dir = root.join("skills");
    if !skills_dir.is_dir() {
        return Vec::new();
    }

    let mut records = Vec::new();
    for entry in WalkDir::new(&skills_dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("failed to read skills directory entry: {e}");
                continue;
            }
        };
        if !entry.file_type().is_dir() {
            continue;
        }
        let id = match entry.file_name().to_str() {
            Some(name) => name.to_string(),
            None => {
                warn!(
                    "skipping skill directory with non UTF-8 name: {}",
                    entry.path().display()
                );
                continue;
            }
        };
        let skill_file = entry.path().join("SKILL.md");
        if !skill_file.is_file() {
            continue;
        }
        match document::load_record(id, &skill_file) {
            Ok(record) => records.push(record),
            Err(e) => warn!(
                "skipping unreadable skill file {}: {e}",
                skill_file.display()
            ),
        }
    }

    records.sort_by(|a, b| a.id.cmp(&b.id));
    records
}
