//! Scrape cache: when each profile or hashtag was last scraped.
//!
//! Stored as a small CSV file with header `type,value,last_scraped`. The file
//! is read once when a discovery run starts and written once when it ends;
//! there is no locking, so the last writer wins.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::connectors::SourceKind;
use crate::error::{Error, Result};

pub const CACHE_HEADER: &str = "type,value,last_scraped";

pub const DEFAULT_COOLDOWN_HOURS: i64 = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub kind: SourceKind,
    pub value: String,
    pub last_scraped: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ScrapeCache {
    path: PathBuf,
    cooldown: Duration,
    entries: BTreeMap<(SourceKind, String), DateTime<Utc>>,
}

impl ScrapeCache {
    /// Load the cache file. A missing file is an empty cache.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let mut cache = Self {
            path,
            cooldown: Duration::hours(DEFAULT_COOLDOWN_HOURS),
            entries: BTreeMap::new(),
        };
        if !cache.path.exists() {
            info!("No scrape cache at {:?}, starting empty", cache.path);
            return Ok(cache);
        }

        let content = fs::read_to_string(&cache.path)?;
        for (n, line) in content.lines().enumerate() {
            if line.trim().is_empty() || (n == 0 && line.trim() == CACHE_HEADER) {
                continue;
            }
            match parse_line(line) {
                Some(entry) => cache.upsert(entry.kind, entry.value, entry.last_scraped),
                None => warn!("Ignoring malformed scrape cache line {}: {}", n + 1, line),
            }
        }
        debug!("Loaded {} scrape cache entries from {:?}", cache.entries.len(), cache.path);
        Ok(cache)
    }

    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last_scraped(&self, kind: SourceKind, value: &str) -> Option<DateTime<Utc>> {
        self.entries.get(&(kind, value.to_string())).copied()
    }

    /// True for an unknown source or one whose last scrape is at least a cooldown old.
    pub fn should_fetch(&self, kind: SourceKind, value: &str, now: DateTime<Utc>) -> bool {
        match self.last_scraped(kind, value) {
            Some(at) => now - at >= self.cooldown,
            None => true,
        }
    }

    pub fn record_fetch(&mut self, kind: SourceKind, value: &str, at: DateTime<Utc>) {
        self.upsert(kind, value.to_string(), at);
    }

    fn upsert(&mut self, kind: SourceKind, value: String, at: DateTime<Utc>) {
        self.entries.insert((kind, value), at);
    }

    pub fn entries(&self) -> Vec<CacheEntry> {
        self.entries
            .iter()
            .map(|((kind, value), at)| CacheEntry {
                kind: *kind,
                value: value.clone(),
                last_scraped: *at,
            })
            .collect()
    }

    /// Drop entries last scraped before `cutoff`. Returns how many were removed.
    pub fn prune_older_than(&mut self, cutoff: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, at| *at >= cutoff);
        before - self.entries.len()
    }

    /// Drop entries not refreshed within `max_age_days` of `now`.
    pub fn prune_stale(&mut self, max_age_days: u32, now: DateTime<Utc>) -> Result<usize> {
        let cutoff = now
            .checked_sub_signed(Duration::days(i64::from(max_age_days)))
            .ok_or_else(|| Error::Config(format!("cannot prune entries older than {} days", max_age_days)))?;
        Ok(self.prune_older_than(cutoff))
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut content = String::from(CACHE_HEADER);
        content.push('\n');
        for ((kind, value), at) in &self.entries {
            content.push_str(&format!("{},{},{}\n", kind, quote(value), at.to_rfc3339()));
        }
        fs::write(&self.path, content)?;
        info!("Saved {} scrape cache entries to {:?}", self.entries.len(), self.path);
        Ok(())
    }
}

fn quote(value: &str) -> String {
    if value.contains(',') || value.contains('"') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn unquote(value: &str) -> String {
    let v = value.trim();
    if v.len() >= 2 && v.starts_with('"') && v.ends_with('"') {
        v[1..v.len() - 1].replace("\"\"", "\"")
    } else {
        v.to_string()
    }
}

fn parse_line(line: &str) -> Option<CacheEntry> {
    let (kind, rest) = line.split_once(',')?;
    let (value, stamp) = rest.rsplit_once(',')?;
    Some(CacheEntry {
        kind: kind.parse().ok()?,
        value: unquote(value),
        last_scraped: parse_stamp(stamp.trim())?,
    })
}

/// RFC 3339, or the naive `YYYY-MM-DD HH:MM:SS[.ffffff]` form older cache files used (UTC).
fn parse_stamp(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(|naive| naive.and_utc())
}
