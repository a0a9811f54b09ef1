//! Instagram reel discovery through the scraper, with a per-source cooldown.

use chrono::{DateTime, Utc};
use log::{info, warn};

use super::{dedup_by_url, parse_timestamp, within_lookback, DiscoveryParams};
use crate::cache::ScrapeCache;
use crate::config::InstagramTargets;
use crate::connectors::{RawPost, SocialSource, SourceKind};
use crate::error::Result;
use crate::report::RunReport;
use crate::sheets::{replace_tables_staged, SheetGateway};
use crate::table::Table;

pub const PLATFORM: &str = "Instagram";

/// Layout of the Discovered tab. Columns not filled from the scrape are left
/// blank for annotation.
pub const DISCOVERED_COLUMNS: &[&str] = &[
    "Reel URL",
    "Username",
    "Caption",
    "Date",
    "Likes",
    "Comments",
    "Views",
    "Shares",
    "Assigned Type",
    "Theme",
    "Influencer Name",
    "Tag Usernames",
    "Commercials",
    "Remarks",
    "Followers",
    "Platform",
    "Email Address",
    "Mobile Number",
    "Registration Number",
    "Type of Content",
    "Points",
    "ShortCode",
    "ID",
    "Type of Influencer",
    "Account Status",
    "Payment Status",
    "Number of Reels",
    "Amount",
    "Status",
    "Commercials Per Reel",
    "From where you come to know",
];

/// A scraped post that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveredReel {
    pub url: String,
    pub username: String,
    pub caption: String,
    pub published: DateTime<Utc>,
    pub likes: i64,
    pub comments: i64,
    pub views: i64,
    pub short_code: String,
}

impl DiscoveredReel {
    /// `None` when the post has no URL or no readable timestamp.
    pub fn from_raw(raw: RawPost) -> Option<Self> {
        let url = raw.url.filter(|u| !u.trim().is_empty())?;
        let published = raw.timestamp.as_deref().and_then(parse_timestamp)?;
        Some(Self {
            url,
            username: raw.owner_username.unwrap_or_default(),
            caption: raw.caption.unwrap_or_default(),
            published,
            likes: raw.likes_count.unwrap_or(0),
            comments: raw.comments_count.unwrap_or(0),
            views: raw.video_play_count.unwrap_or(0),
            short_code: raw.short_code.unwrap_or_default(),
        })
    }

    pub fn to_row(&self) -> Vec<String> {
        DISCOVERED_COLUMNS
            .iter()
            .map(|column| match *column {
                "Reel URL" => self.url.clone(),
                "Username" => self.username.clone(),
                "Caption" => self.caption.clone(),
                "Date" => self.published.format("%Y-%m-%d").to_string(),
                "Likes" => self.likes.to_string(),
                "Comments" => self.comments.to_string(),
                "Views" => self.views.to_string(),
                "Platform" => PLATFORM.to_string(),
                "ShortCode" => self.short_code.clone(),
                _ => String::new(),
            })
            .collect()
    }
}

/// Profile URLs listed in column A of the input tab, header row excluded.
pub fn profiles_from_tab(table: &Table) -> Vec<String> {
    table
        .rows
        .iter()
        .filter_map(|row| row.first())
        .map(|cell| cell.trim())
        .filter(|cell| cell.starts_with("https://"))
        .map(str::to_string)
        .collect()
}

fn hashtag_id(tag: &str) -> String {
    format!("#{}", tag.trim().trim_start_matches('#'))
}

/// Run Instagram discovery and describe what happened.
pub fn run(
    sheets: &dyn SheetGateway,
    source: &dyn SocialSource,
    cache: &mut ScrapeCache,
    targets: &InstagramTargets,
    params: &DiscoveryParams,
) -> RunReport {
    let mut report = RunReport::new();
    report.info(format!(
        "IG discovery: {} days back, skipping sources scraped within {}h",
        params.lookback_days,
        cache.cooldown().num_hours()
    ));
    if let Err(e) = discover(sheets, source, cache, targets, params, &mut report) {
        log::error!("IG discovery failed: {}", e);
        report.error(format!("Error: {}", e));
    }
    report
}

fn discover(
    sheets: &dyn SheetGateway,
    source: &dyn SocialSource,
    cache: &mut ScrapeCache,
    targets: &InstagramTargets,
    params: &DiscoveryParams,
    report: &mut RunReport,
) -> Result<()> {
    let mut profiles = targets.profiles.clone();
    if let Some(tab) = &targets.profiles_tab {
        let listed = profiles_from_tab(&sheets.read_table(tab)?);
        info!("Read {} profile URLs from '{}'", listed.len(), tab);
        profiles.extend(listed);
    }
    let profiles = dedup_by_url(profiles, |p| p.as_str());
    let hashtags: Vec<String> = targets.hashtags.iter().map(|t| hashtag_id(t)).collect();

    let mut raw = Vec::new();
    for (kind, values) in [(SourceKind::Profile, &profiles), (SourceKind::Hashtag, &hashtags)] {
        for value in values {
            if !cache.should_fetch(kind, value, params.now) {
                report.info(format!("Skipped {} (already scraped): {}", kind, value));
                continue;
            }
            info!("Scraping {}: {}", kind, value);
            match source.fetch(std::slice::from_ref(value), kind) {
                Ok(posts) => {
                    raw.extend(posts);
                    cache.record_fetch(kind, value, params.now);
                }
                Err(e) => {
                    warn!("Scrape of {} {} failed: {}", kind, value, e);
                    report.warn(format!("{} scrape failed: {} ({})", kind, value, e));
                }
            }
        }
    }

    let fetched = raw.len();
    let mut unreadable = 0;
    let mut reels = Vec::with_capacity(fetched);
    for post in raw {
        match DiscoveredReel::from_raw(post) {
            Some(reel) => reels.push(reel),
            None => unreadable += 1,
        }
    }
    if unreadable > 0 {
        report.warn(format!("Dropped {} posts with no URL or unreadable timestamp", unreadable));
    }

    let cutoff = params.cutoff();
    reels.retain(|r| within_lookback(r.published, cutoff));
    let reels = dedup_by_url(reels, |r| r.url.as_str());
    info!("{} posts fetched, {} unique reels inside the window", fetched, reels.len());

    let mut table = Table::with_columns(DISCOVERED_COLUMNS);
    for reel in &reels {
        table.push_row(reel.to_row());
    }
    replace_tables_staged(sheets, &[(targets.discovered_tab.clone(), table)])?;
    report.success(format!("{} reels saved to '{}'", reels.len(), targets.discovered_tab));

    if !params.dry_run {
        cache.save()?;
    }
    Ok(())
}
