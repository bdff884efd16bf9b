// src/dedup.rs
//! Persistent seen-ID store. A single JSON string array, read at run start
//! and overwritten at commit with the full updated set. Read failures are
//! treated as an empty prior set — re-notification beats silent permanent
//! failure. Ids are never removed once committed.

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::item::NewsItem;

pub struct SeenIdStore {
    path: PathBuf,
}

impl SeenIdStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the prior seen set. Missing or corrupt file ⇒ empty set + warn.
    pub fn load(&self) -> HashSet<String> {
        match fs::read_to_string(&self.path) {
            Ok(s) => match serde_json::from_str::<Vec<String>>(&s) {
                Ok(v) => v.into_iter().collect(),
                Err(e) => {
                    tracing::warn!(
                        path = %self.path.display(),
                        error = %e,
                        "corrupt seen-id file, starting from empty set"
                    );
                    HashSet::new()
                }
            },
            Err(_) => HashSet::new(),
        }
    }

    /// Persist the union of `seen` and `new_ids` as a sorted JSON array.
    /// Atomic: write to a temp file, then rename over the target.
    pub fn commit<I>(&self, seen: &HashSet<String>, new_ids: I) -> Result<()>
    where
        I: IntoIterator<Item = String>,
    {
        let mut union: Vec<String> = seen.iter().cloned().chain(new_ids).collect();
        union.sort();
        union.dedup();

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating state dir {}", parent.display()))?;
            }
        }

        let json = serde_json::to_string(&union).context("serializing seen-id set")?;
        let tmp = self.path.with_extension("json.tmp");
        let mut f = fs::File::create(&tmp)
            .with_context(|| format!("creating {}", tmp.display()))?;
        f.write_all(json.as_bytes()).context("writing seen-id set")?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("renaming into {}", self.path.display()))?;
        Ok(())
    }
}

/// Split items into (new-this-run, already-seen count).
pub fn split_new(items: Vec<NewsItem>, seen: &HashSet<String>) -> (Vec<NewsItem>, usize) {
    let mut fresh = Vec::with_capacity(items.len());
    let mut seen_before = 0usize;
    for it in items {
        if seen.contains(&it.id) {
            seen_before += 1;
        } else {
            fresh.push(it);
        }
    }
    (fresh, seen_before)
}
