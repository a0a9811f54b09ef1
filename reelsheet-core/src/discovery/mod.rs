//! Discovery: fetch recent posts, keep the ones inside the lookback window,
//! drop duplicate URLs and store the result in a "Discovered" tab.

pub mod instagram;
pub mod youtube;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use std::collections::HashSet;

use crate::error::{Error, Result};

pub const MAX_LOOKBACK_DAYS: u32 = 365;

#[derive(Debug, Clone, Copy)]
pub struct DiscoveryParams {
    pub lookback_days: u32,
    pub now: DateTime<Utc>,
    /// Skip persisting the scrape cache.
    pub dry_run: bool,
}

impl DiscoveryParams {
    pub fn new(lookback_days: u32) -> Result<Self> {
        Self::at(lookback_days, Utc::now())
    }

    pub fn at(lookback_days: u32, now: DateTime<Utc>) -> Result<Self> {
        if lookback_days == 0 || lookback_days > MAX_LOOKBACK_DAYS {
            return Err(Error::Config(format!(
                "lookback must be between 1 and {} days, got {}",
                MAX_LOOKBACK_DAYS, lookback_days
            )));
        }
        Ok(Self { lookback_days, now, dry_run: false })
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Oldest publish time still kept.
    pub fn cutoff(&self) -> DateTime<Utc> {
        self.now - Duration::days(i64::from(self.lookback_days))
    }
}

/// Records published at or after the cutoff are kept.
pub fn within_lookback(published: DateTime<Utc>, cutoff: DateTime<Utc>) -> bool {
    published >= cutoff
}

/// Keep the first item seen for every URL, preserving order.
pub fn dedup_by_url<T, F>(items: Vec<T>, url: F) -> Vec<T>
where
    F: Fn(&T) -> &str,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(url(item).to_string()))
        .collect()
}

/// Parse a platform timestamp. Values without an offset are taken as UTC.
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    let naive = text.trim_end_matches('Z');
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(naive, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(naive, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .map(|dt| dt.and_utc())
}
