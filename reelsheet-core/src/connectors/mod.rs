//! Source connectors: where discovered posts come from.

pub mod apify;
pub mod youtube;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

pub use apify::ApifyInstagram;
pub use youtube::YouTubeApi;

/// Kind of social source a scrape targets. Also the `type` column of the scrape cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SourceKind {
    Profile,
    Hashtag,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Profile => "profile",
            SourceKind::Hashtag => "hashtag",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "profile" => Ok(SourceKind::Profile),
            "hashtag" => Ok(SourceKind::Hashtag),
            other => Err(Error::Parse(format!("unknown source type '{}'", other))),
        }
    }
}

/// One item as returned by the Instagram scraper dataset.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPost {
    pub url: Option<String>,
    pub owner_username: Option<String>,
    pub caption: Option<String>,
    pub timestamp: Option<String>,
    pub likes_count: Option<i64>,
    pub comments_count: Option<i64>,
    pub video_play_count: Option<i64>,
    pub short_code: Option<String>,
}

pub trait SocialSource {
    /// Scrape recent posts of the given profile URLs or `#hashtags`.
    fn fetch(&self, targets: &[String], kind: SourceKind) -> Result<Vec<RawPost>>;
}

/// One search hit from the video platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawVideo {
    pub video_id: String,
    pub channel_title: String,
    pub title: String,
    pub published_at: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VideoStats {
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
}

pub trait VideoSource {
    fn search(&self, keyword: &str, published_after: DateTime<Utc>) -> Result<Vec<RawVideo>>;

    fn stats(&self, ids: &[String]) -> Result<HashMap<String, VideoStats>>;

    /// Length of each video in whole seconds. Ids the platform does not know are absent.
    fn durations(&self, ids: &[String]) -> Result<HashMap<String, u64>>;
}

pub fn video_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}

/// Inverse of [`video_url`]: everything after the last `v=`.
pub fn video_id_from_url(url: &str) -> &str {
    url.rsplit("v=").next().unwrap_or(url)
}
