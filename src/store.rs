//! Whole-file JSON persistence and the incremental merge.
//!
//! A collection is loaded at run start (empty if absent or unreadable),
//! mutated in memory, and rewritten in full at run end. There is no append
//! path and no locking: two runs writing the same file race, last writer
//! wins the whole file.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::records::{MatchCandidate, MatchRecord};

/// The per-league match collection, keyed by game id.
#[derive(Debug, Default, PartialEq)]
pub struct MatchSet {
    matches: BTreeMap<String, MatchRecord>,
}

/// Counters returned by a merge, for run-summary logging.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct MergeOutcome {
    pub inserted: usize,
    pub backfilled: usize,
    pub skipped: usize,
}

impl MatchSet {
    /// Load a collection file. A missing file or unreadable content yields
    /// an empty set; entries without a game id are dropped.
    pub fn load(path: &Path) -> MatchSet {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(_) => return MatchSet::default(),
        };
        let rows: Vec<Value> = match serde_json::from_str(&raw) {
            Ok(rows) => rows,
            Err(e) => {
                log::warn!("unreadable collection {}: {}", path.display(), e);
                return MatchSet::default();
            }
        };
        let mut set = MatchSet::default();
        for row in rows {
            match serde_json::from_value::<MatchRecord>(row) {
                Ok(rec) if !rec.game_id.is_empty() => {
                    set.matches.insert(rec.game_id.clone(), rec);
                }
                _ => {}
            }
        }
        set
    }

    /// Overwrite the collection file with the full in-memory set. This is
    /// the only fatal failure of a run: an error here leaves the previous
    /// snapshot intact and must abort with a diagnostic.
    pub fn save(&self, path: &Path) -> Result<()> {
        save_json(path, &self.records().collect::<Vec<_>>())
    }

    /// Fold a batch of scraped candidates into the set.
    ///
    /// Candidates without a resolvable game id are dropped. New ids are
    /// inserted verbatim. For an existing id the core fields stay untouched;
    /// only an empty `stats` field is backfilled from the candidate, and a
    /// populated one is never replaced. The result does not depend on batch
    /// order, and applying the same batch twice changes nothing.
    pub fn merge<I>(&mut self, candidates: I) -> MergeOutcome
    where
        I: IntoIterator<Item = MatchCandidate>,
    {
        let mut outcome = MergeOutcome::default();
        for cand in candidates {
            let game_id = match cand.game_id() {
                Some(id) => id,
                None => {
                    log::debug!("no game id in {}", cand.match_url);
                    outcome.skipped += 1;
                    continue;
                }
            };
            match self.matches.get_mut(&game_id) {
                Some(existing) => {
                    if !existing.has_stats() {
                        if let Some(stats) = cand.stats.as_ref().filter(|s| !s.is_empty()) {
                            existing.stats = Some(stats.clone());
                            outcome.backfilled += 1;
                        }
                    }
                }
                None => {
                    self.matches.insert(game_id.clone(), cand.record(game_id));
                    outcome.inserted += 1;
                }
            }
        }
        outcome
    }

    pub fn contains(&self, game_id: &str) -> bool {
        self.matches.contains_key(game_id)
    }

    pub fn get(&self, game_id: &str) -> Option<&MatchRecord> {
        self.matches.get(game_id)
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &MatchRecord> {
        self.matches.values()
    }
}

/// Serialize a dataset to a file, creating parent directories and replacing
/// any prior content.
pub fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let file = fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer_pretty(file, value)
        .with_context(|| format!("writing {}", path.display()))?;
    log::info!("saved {}", path.display());
    Ok(())
}

/// Load a dataset file, falling back to the type's default when the file is
/// missing or malformed.
pub fn load_json_or_default<T: DeserializeOwned + Default>(path: &Path) -> T {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(_) => return T::default(),
    };
    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("unreadable dataset {}: {}", path.display(), e);
            T::default()
        }
    }
}
