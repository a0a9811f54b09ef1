//! YouTube category registry. The short-form categories only take videos up to a minute long.

use log::debug;

use super::derive::{engagement_cell, month_abbrev};
use super::{accept_all, classify, write_outputs, Category, ASSIGNMENT_COLUMNS};
use crate::connectors::{video_id_from_url, VideoSource};
use crate::error::{Error, Result};
use crate::report::RunReport;
use crate::sheets::SheetGateway;
use crate::table::Record;

pub const REQUIRED_COLUMNS: &[&str] = &[
    "Video URL",
    "Video Title",
    "Channel Name",
    "Publish Date",
    "Views",
    "Likes",
    "Comments",
];

/// Field holding the looked-up video length in seconds.
pub const SECONDS_FIELD: &str = "Seconds";

/// Length assumed for videos the platform did not report.
pub const UNKNOWN_DURATION: u64 = 9999;

pub const SHORT_MAX_SECS: u64 = 60;

fn field(r: &Record, key: &str) -> String {
    r.get(key).to_string()
}

pub fn is_short(r: &Record) -> bool {
    r.get(SECONDS_FIELD)
        .parse::<u64>()
        .map(|secs| secs <= SHORT_MAX_SECS)
        .unwrap_or(false)
}

fn common(r: &Record, idx: usize) -> Vec<String> {
    vec![
        (idx + 1).to_string(),
        month_abbrev(r.get("Publish Date")),
        String::new(),
        field(r, "Video URL"),
        field(r, "Video Title"),
        field(r, "Publish Date"),
        field(r, "Channel Name"),
        field(r, "Views"),
        field(r, "Likes"),
        field(r, "Comments"),
    ]
}

fn student(r: &Record, idx: usize) -> Vec<String> {
    let mut row = common(r, idx);
    row.extend([String::new(), String::new(), String::new()]);
    row
}

fn short_commercial(r: &Record, idx: usize) -> Vec<String> {
    let mut row = common(r, idx);
    row.push(engagement_cell(&[r.get("Likes"), r.get("Comments")]));
    row.push(field(r, "Remarks"));
    row.push(field(r, "Commercials"));
    row
}

fn short_noncommercial(r: &Record, idx: usize) -> Vec<String> {
    let mut row = common(r, idx);
    row.push(engagement_cell(&[r.get("Likes"), r.get("Comments")]));
    row
}

fn creatorverse(r: &Record, _idx: usize) -> Vec<String> {
    ["Video URL", "Video Title", "Publish Date", "Channel Name", "Views", "Likes", "Comments"]
        .iter()
        .map(|k| field(r, k))
        .collect()
}

pub const REGISTRY: &[Category] = &[
    Category {
        token: "student",
        table: "Student Youtube Video",
        columns: &[
            "S. No.", "Month", "Student Name", "Link", "Video Title", "Publish Date", "Channel",
            "Views", "Likes", "Comments", "Shares", "Commercials", "Theme",
        ],
        map: student,
        accepts: accept_all,
    },
    Category {
        token: "influencer_commercial",
        table: "Youtube Short with Commercials",
        columns: &[
            "S.No", "Month", "Influencer Name", "Instagram Reel/ Youtube shorts", "Video Title",
            "Publish Date", "Channel", "Views", "Likes", "Comments", "Total Engagement", "Remarks",
            "Commercials",
        ],
        map: short_commercial,
        accepts: is_short,
    },
    Category {
        token: "influencer_noncommercial",
        table: "Youtube Short without Commercials",
        columns: &[
            "S.No", "Month", "Influencer Name", "Instagram Reel/ Youtube shorts", "Video Title",
            "Publish Date", "Channel", "Views", "Likes", "Comments", "Total Engagement",
        ],
        map: short_noncommercial,
        accepts: is_short,
    },
    Category {
        token: "creatorverse",
        table: "CreatorVerse",
        columns: &["Link", "Caption", "Date", "Channel", "Views", "Likes", "Comments"],
        map: creatorverse,
        accepts: accept_all,
    },
];

/// Classify the YouTube Discovered tab, looking up video lengths for the shorts categories.
pub fn run(sheets: &dyn SheetGateway, source: &dyn VideoSource, discovered_tab: &str) -> RunReport {
    let mut report = RunReport::new();
    report.info("Running YT classification");
    match classify_tab(sheets, source, discovered_tab, &mut report) {
        Ok(()) => report.success("YT classification complete"),
        Err(e) => {
            log::error!("YT classification failed: {}", e);
            report.error(format!("Error: {}", e));
        }
    }
    report
}

fn classify_tab(
    sheets: &dyn SheetGateway,
    source: &dyn VideoSource,
    discovered_tab: &str,
    report: &mut RunReport,
) -> Result<()> {
    let table = sheets.read_table(discovered_tab)?;
    if let Some(missing) = REQUIRED_COLUMNS.iter().find(|c| table.column_index(c).is_none()) {
        return Err(Error::Schema(format!("'{}' in '{}'", missing, discovered_tab)));
    }
    let assignment_col = table.find_column(ASSIGNMENT_COLUMNS).ok_or_else(|| {
        Error::Schema(format!("'Assigned Type' in '{}'", discovered_tab))
    })?;

    let mut records = table.records();
    let mut ids: Vec<String> = records
        .iter()
        .map(|r| video_id_from_url(r.get("Video URL")).to_string())
        .filter(|id| !id.is_empty())
        .collect();
    ids.sort();
    ids.dedup();
    let durations = source.durations(&ids)?;
    debug!("Durations known for {}/{} videos", durations.len(), ids.len());

    for record in &mut records {
        let id = video_id_from_url(record.get("Video URL")).to_string();
        let secs = durations.get(&id).copied().unwrap_or(UNKNOWN_DURATION);
        record.set(SECONDS_FIELD, secs.to_string());
    }

    let classified = classify(&records, assignment_col, REGISTRY);
    write_outputs(sheets, &classified, report)
}
