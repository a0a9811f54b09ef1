//! YouTube video discovery: keyword search plus a statistics join.

use log::{info, warn};

use super::{dedup_by_url, parse_timestamp, within_lookback, DiscoveryParams};
use crate::config::YouTubeTargets;
use crate::connectors::{video_url, RawVideo, VideoSource, VideoStats};
use crate::error::Result;
use crate::report::RunReport;
use crate::sheets::{replace_tables_staged, SheetGateway};
use crate::table::Table;

pub const DISCOVERED_COLUMNS: &[&str] = &[
    "Video URL",
    "Channel Name",
    "Video Title",
    "Publish Date",
    "Views",
    "Likes",
    "Comments",
    "Assigned Type",
    "Remarks",
    "Commercials",
];

#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveredVideo {
    pub video_id: String,
    pub url: String,
    pub channel: String,
    pub title: String,
    pub published_at: String,
    pub stats: Option<VideoStats>,
}

impl DiscoveredVideo {
    fn from_raw(raw: RawVideo) -> Self {
        Self {
            url: video_url(&raw.video_id),
            video_id: raw.video_id,
            channel: raw.channel_title,
            title: raw.title,
            published_at: raw.published_at,
            stats: None,
        }
    }

    /// Counts stay blank when the platform returned no statistics for the video.
    pub fn to_row(&self) -> Vec<String> {
        let (views, likes, comments) = match self.stats {
            Some(s) => (s.views.to_string(), s.likes.to_string(), s.comments.to_string()),
            None => Default::default(),
        };
        let mut row = vec![
            self.url.clone(),
            self.channel.clone(),
            self.title.clone(),
            self.published_at.clone(),
            views,
            likes,
            comments,
        ];
        row.resize(DISCOVERED_COLUMNS.len(), String::new());
        row
    }
}

pub fn run(
    sheets: &dyn SheetGateway,
    source: &dyn VideoSource,
    targets: &YouTubeTargets,
    params: &DiscoveryParams,
) -> RunReport {
    let mut report = RunReport::new();
    report.info(format!("YT discovery for the last {} days", params.lookback_days));
    if let Err(e) = discover(sheets, source, targets, params, &mut report) {
        log::error!("YT discovery failed: {}", e);
        report.error(format!("Error: {}", e));
    }
    report
}

fn discover(
    sheets: &dyn SheetGateway,
    source: &dyn VideoSource,
    targets: &YouTubeTargets,
    params: &DiscoveryParams,
    report: &mut RunReport,
) -> Result<()> {
    let cutoff = params.cutoff();

    let mut raw = Vec::new();
    for keyword in &targets.keywords {
        match source.search(keyword, cutoff) {
            Ok(found) => raw.extend(found),
            Err(e) => {
                warn!("Search for {} failed: {}", keyword, e);
                report.warn(format!("Search failed: {} ({})", keyword, e));
            }
        }
    }

    let fetched = raw.len();
    let mut unreadable = 0;
    let mut videos = Vec::with_capacity(fetched);
    for item in raw {
        let published = parse_timestamp(&item.published_at);
        match published {
            Some(at) if !item.video_id.is_empty() => {
                if within_lookback(at, cutoff) {
                    videos.push(DiscoveredVideo::from_raw(item));
                }
            }
            _ => unreadable += 1,
        }
    }
    if unreadable > 0 {
        report.warn(format!("Dropped {} videos with no id or unreadable publish date", unreadable));
    }

    let mut videos = dedup_by_url(videos, |v| v.url.as_str());
    report.success(format!("Discovered {} unique videos", videos.len()));

    let ids: Vec<String> = videos.iter().map(|v| v.video_id.clone()).collect();
    let stats = source.stats(&ids)?;
    info!("Statistics returned for {}/{} videos", stats.len(), ids.len());
    for video in &mut videos {
        video.stats = stats.get(&video.video_id).copied();
    }

    let mut table = Table::with_columns(DISCOVERED_COLUMNS);
    for video in &videos {
        table.push_row(video.to_row());
    }
    replace_tables_staged(sheets, &[(targets.discovered_tab.clone(), table)])?;
    report.success(format!("{} videos saved to '{}'", videos.len(), targets.discovered_tab));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video(id: &str) -> DiscoveredVideo {
        DiscoveredVideo::from_raw(RawVideo {
            video_id: id.to_string(),
            channel_title: "Campus Vlogs".to_string(),
            title: "Hostel tour".to_string(),
            published_at: "2026-10-10T08:00:00Z".to_string(),
        })
    }

    #[test]
    fn missing_statistics_leave_counts_blank() {
        let row = video("abc").to_row();
        assert_eq!(row.len(), DISCOVERED_COLUMNS.len());
        assert_eq!(row[0], "https://www.youtube.com/watch?v=abc");
        assert_eq!(&row[4..7], &["", "", ""]);
    }

    #[test]
    fn statistics_fill_counts() {
        let mut v = video("abc");
        v.stats = Some(VideoStats { views: 900, likes: 40, comments: 3 });
        let row = v.to_row();
        assert_eq!(&row[4..7], &["900", "40", "3"]);
        assert_eq!(row[7], "");
    }
}
