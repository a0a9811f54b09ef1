use chrono::{DateTime, SecondsFormat, Utc};
use log::{debug, info, warn};
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::OnceLock;

use super::{RawVideo, VideoSource, VideoStats};
use crate::error::Result;
use crate::http::{check, DEFAULT_TIMEOUT, USER_AGENT};
use crate::retry::RetryPolicy;

const API_BASE: &str = "https://www.googleapis.com/youtube/v3";

/// Upper bound on ids per `videos.list` call.
pub const IDS_PER_REQUEST: usize = 50;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchId,
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchId {
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    #[serde(default)]
    channel_title: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    published_at: String,
}

#[derive(Debug, Deserialize)]
struct VideoListResponse<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct StatsItem {
    id: String,
    #[serde(default)]
    statistics: Statistics,
}

// The API sends counts as decimal strings and omits hidden ones.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Statistics {
    view_count: Option<String>,
    like_count: Option<String>,
    comment_count: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DetailsItem {
    id: String,
    content_details: ContentDetails,
}

#[derive(Debug, Deserialize)]
struct ContentDetails {
    #[serde(default)]
    duration: String,
}

/// YouTube Data API v3 with an API key.
pub struct YouTubeApi {
    api_key: String,
    max_results: u32,
    retry: RetryPolicy,
}

impl YouTubeApi {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            max_results: 25,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results;
        self
    }

    fn videos_list<T: serde::de::DeserializeOwned>(&self, part: &str, ids: &[String]) -> Result<Vec<T>> {
        let mut items = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(IDS_PER_REQUEST) {
            let joined = chunk.join(",");
            let page: VideoListResponse<T> = self.retry.run("youtube videos.list", || {
                let resp = attohttpc::get(format!("{}/videos", API_BASE))
                    .header("User-Agent", USER_AGENT)
                    .param("part", part)
                    .param("id", &joined)
                    .param("key", &self.api_key)
                    .timeout(DEFAULT_TIMEOUT)
                    .send()?;
                Ok(check(resp)?.json()?)
            })?;
            items.extend(page.items);
        }
        Ok(items)
    }
}

impl VideoSource for YouTubeApi {
    fn search(&self, keyword: &str, published_after: DateTime<Utc>) -> Result<Vec<RawVideo>> {
        let after = published_after.to_rfc3339_opts(SecondsFormat::Secs, true);
        let resp: SearchResponse = self.retry.run("youtube search.list", || {
            let resp = attohttpc::get(format!("{}/search", API_BASE))
                .header("User-Agent", USER_AGENT)
                .param("part", "snippet")
                .param("maxResults", self.max_results)
                .param("q", keyword)
                .param("type", "video")
                .param("order", "relevance")
                .param("publishedAfter", &after)
                .param("key", &self.api_key)
                .timeout(DEFAULT_TIMEOUT)
                .send()?;
            Ok(check(resp)?.json()?)
        })?;

        let videos: Vec<RawVideo> = resp
            .items
            .into_iter()
            .filter_map(|item| {
                let video_id = item.id.video_id?;
                Some(RawVideo {
                    video_id,
                    channel_title: item.snippet.channel_title,
                    title: item.snippet.title,
                    published_at: item.snippet.published_at,
                })
            })
            .collect();
        info!("Search {} returned {} videos", keyword, videos.len());
        Ok(videos)
    }

    fn stats(&self, ids: &[String]) -> Result<HashMap<String, VideoStats>> {
        let items: Vec<StatsItem> = self.videos_list("statistics", ids)?;
        let count = |v: &Option<String>| -> u64 { v.as_deref().and_then(|s| s.parse().ok()).unwrap_or(0) };
        Ok(items
            .into_iter()
            .map(|item| {
                let stats = VideoStats {
                    views: count(&item.statistics.view_count),
                    likes: count(&item.statistics.like_count),
                    comments: count(&item.statistics.comment_count),
                };
                (item.id, stats)
            })
            .collect())
    }

    fn durations(&self, ids: &[String]) -> Result<HashMap<String, u64>> {
        let items: Vec<DetailsItem> = self.videos_list("contentDetails", ids)?;
        let mut durations = HashMap::with_capacity(items.len());
        for item in items {
            match parse_duration(&item.content_details.duration) {
                Some(secs) => {
                    durations.insert(item.id, secs);
                }
                None => warn!("Unreadable duration '{}' for video {}", item.content_details.duration, item.id),
            }
        }
        debug!("Resolved durations for {}/{} videos", durations.len(), ids.len());
        Ok(durations)
    }
}

/// Seconds in an ISO-8601 duration as the API reports it, e.g. `PT1M5S` or `P1DT2H`.
pub fn parse_duration(text: &str) -> Option<u64> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let re = PATTERN.get_or_init(|| {
        Regex::new(r"^P(?:(\d+)W)?(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?)?$")
            .expect("duration pattern is valid")
    });
    if text == "P" || text.ends_with('T') {
        return None;
    }
    let caps = re.captures(text.trim())?;
    let part = |i: usize| -> u64 { caps.get(i).and_then(|m| m.as_str().parse().ok()).unwrap_or(0) };
    Some(part(1) * 604_800 + part(2) * 86_400 + part(3) * 3_600 + part(4) * 60 + part(5))
}
