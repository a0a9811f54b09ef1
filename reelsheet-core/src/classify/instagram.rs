//! Instagram category registry.

use super::derive::{engagement_cell, month_label};
use super::{accept_all, classify, write_outputs, Category, ASSIGNMENT_COLUMNS};
use crate::error::{Error, Result};
use crate::report::RunReport;
use crate::sheets::SheetGateway;
use crate::table::Record;

const PLATFORM: &str = "Instagram";

fn field(r: &Record, key: &str) -> String {
    r.get(key).to_string()
}

fn seq(idx: usize) -> String {
    (idx + 1).to_string()
}

fn month(r: &Record) -> String {
    month_label(r.get("Date"))
}

fn engagement(r: &Record) -> String {
    engagement_cell(&[r.get("Likes"), r.get("Comments"), r.get("Shares")])
}

fn influencer_commercial(r: &Record, idx: usize) -> Vec<String> {
    vec![
        seq(idx),
        month(r),
        field(r, "Username"),
        field(r, "Theme"),
        field(r, "Reel URL"),
        field(r, "Views"),
        field(r, "Likes"),
        field(r, "Comments"),
        field(r, "Shares"),
        engagement(r),
        field(r, "Commercials"),
        PLATFORM.to_string(),
    ]
}

fn influencer_noncommercial(r: &Record, idx: usize) -> Vec<String> {
    vec![
        seq(idx),
        month(r),
        field(r, "Username"),
        field(r, "ID"),
        field(r, "Reel URL"),
        field(r, "Views"),
        field(r, "Likes"),
        field(r, "Comments"),
        field(r, "Shares"),
        engagement(r),
        PLATFORM.to_string(),
    ]
}

fn chancellor_pr(r: &Record, idx: usize) -> Vec<String> {
    vec![
        seq(idx),
        month(r),
        field(r, "Username"),
        field(r, "Followers"),
        field(r, "Reel URL"),
        field(r, "Views"),
        field(r, "Likes"),
        field(r, "Comments"),
        field(r, "Shares"),
        field(r, "Amount"),
        field(r, "Date"),
        field(r, "Payment Status"),
        PLATFORM.to_string(),
    ]
}

fn campus_reel(r: &Record, idx: usize) -> Vec<String> {
    vec![
        seq(idx),
        month(r),
        field(r, "Username"),
        field(r, "ID"),
        field(r, "Reel URL"),
        field(r, "Views"),
        field(r, "Likes"),
        field(r, "Comments"),
        field(r, "Shares"),
        PLATFORM.to_string(),
    ]
}

fn meme_marketing(r: &Record, idx: usize) -> Vec<String> {
    vec![
        seq(idx),
        month(r),
        field(r, "Username"),
        field(r, "Reel URL"),
        field(r, "Reel URL"),
        field(r, "Views"),
        field(r, "Likes"),
        field(r, "Comments"),
        field(r, "Shares"),
        field(r, "Followers"),
        PLATFORM.to_string(),
    ]
}

fn student_profile(r: &Record, idx: usize) -> Vec<String> {
    vec![
        seq(idx),
        field(r, "Username"),
        PLATFORM.to_string(),
        field(r, "Reel URL"),
        field(r, "Followers"),
        field(r, "Number of Reels"),
        field(r, "Account Status"),
    ]
}

fn lpu_confess(r: &Record, idx: usize) -> Vec<String> {
    vec![
        seq(idx),
        field(r, "Reel URL"),
        field(r, "Amount"),
        field(r, "Status"),
        PLATFORM.to_string(),
    ]
}

fn long_term_promotion(r: &Record, idx: usize) -> Vec<String> {
    vec![
        seq(idx),
        field(r, "Username"),
        PLATFORM.to_string(),
        field(r, "Reel URL"),
        field(r, "Followers"),
        field(r, "Number of Reels"),
        field(r, "Commercials Per Reel"),
    ]
}

fn shoutout(r: &Record, idx: usize) -> Vec<String> {
    vec![
        seq(idx),
        month(r),
        field(r, "ShortCode"),
        field(r, "ID"),
        field(r, "Reel URL"),
        field(r, "Views"),
        field(r, "Likes"),
        field(r, "Comments"),
        field(r, "Shares"),
        PLATFORM.to_string(),
    ]
}

fn instaconfluence(r: &Record, idx: usize) -> Vec<String> {
    vec![
        seq(idx),
        month(r),
        field(r, "Username"),
        PLATFORM.to_string(),
        field(r, "Reel URL"),
        field(r, "Views"),
        field(r, "Likes"),
        field(r, "Comments"),
        field(r, "Shares"),
        field(r, "Followers"),
    ]
}

// Competition entries carry the post date as their timestamp and have no sequence column.
fn diwali_competition(r: &Record, _idx: usize) -> Vec<String> {
    vec![
        field(r, "Date"),
        month(r),
        field(r, "Email Address"),
        field(r, "Username"),
        field(r, "Registration Number"),
        field(r, "Mobile Number"),
        field(r, "Type of Content"),
        field(r, "Reel URL"),
        field(r, "From where you come to know"),
        field(r, "ShortCode"),
        field(r, "ID"),
        field(r, "Views"),
        field(r, "Likes"),
        field(r, "Comments"),
        field(r, "Shares"),
        field(r, "Points"),
        PLATFORM.to_string(),
    ]
}

fn olympics(r: &Record, idx: usize) -> Vec<String> {
    vec![
        seq(idx),
        month(r),
        field(r, "Username"),
        PLATFORM.to_string(),
        field(r, "Reel URL"),
        field(r, "Views"),
        field(r, "Likes"),
        field(r, "Comments"),
        field(r, "Shares"),
        field(r, "Type of Influencer"),
        field(r, "ShortCode"),
        field(r, "ID"),
    ]
}

fn digital_star(r: &Record, _idx: usize) -> Vec<String> {
    vec![
        field(r, "Date"),
        month(r),
        field(r, "Email Address"),
        field(r, "Username"),
        field(r, "Registration Number"),
        field(r, "Mobile Number"),
        field(r, "Theme"),
        field(r, "Type of Content"),
        field(r, "Reel URL"),
        field(r, "ShortCode"),
        field(r, "ID"),
        field(r, "Views"),
        field(r, "Likes"),
        field(r, "Comments"),
        field(r, "Shares"),
        PLATFORM.to_string(),
    ]
}

fn outcampus(r: &Record, idx: usize) -> Vec<String> {
    vec![
        seq(idx),
        month(r),
        field(r, "Reel URL"),
        field(r, "ShortCode"),
        field(r, "ID"),
        field(r, "Views"),
        field(r, "Likes"),
        field(r, "Comments"),
        field(r, "Shares"),
        PLATFORM.to_string(),
    ]
}

pub const REGISTRY: &[Category] = &[
    Category {
        token: "influencer_commercial",
        table: "Influencer Reel with Commercials",
        columns: &[
            "S.No", "Month", "Influencer Name", "Theme", "Instagram Reel", "Views", "Likes",
            "Comments", "Shares", "Total Engagement", "Commercials", "Platform",
        ],
        map: influencer_commercial,
        accepts: accept_all,
    },
    Category {
        token: "influencer_noncommercial",
        table: "Influencer Reel without Commercials",
        columns: &[
            "S.No", "Month", "Influencer Name", "ID", "Instagram Reel", "Views", "Likes",
            "Comments", "Shares", "Total Engagement", "Platform",
        ],
        map: influencer_noncommercial,
        accepts: accept_all,
    },
    Category {
        token: "chancellor_pr",
        table: "Chancellor Sir PR",
        columns: &[
            "S.No", "Month", "Channel name", "Followers", "Live Reel Link", "Views", "Likes",
            "Comments", "share", "Amount to Be Paid (INR)", "Date Posted", "Payment Status",
            "Platform",
        ],
        map: chancellor_pr,
        accepts: accept_all,
    },
    Category {
        token: "campus_reel",
        table: "Campus Reel",
        columns: &[
            "S.No", "Month", "Account Name", "ID", "Link", "views", "Likes", "Comments", "Shares",
            "Platform",
        ],
        map: campus_reel,
        accepts: accept_all,
    },
    Category {
        token: "meme_marketing",
        table: "Meme Marketing",
        columns: &[
            "S.No", "Month", "Page Name", "link", "Live Reel Link", "Views", "Likes", "Comments",
            "Shares", "followers", "Platform",
        ],
        map: meme_marketing,
        accepts: accept_all,
    },
    Category {
        token: "student_profile",
        table: "Student Profiles",
        columns: &[
            "Sr.No", "Name", "Platform", "Profile/Channel Link", "Followers", "Number of Reels",
            "Account Status",
        ],
        map: student_profile,
        accepts: accept_all,
    },
    Category {
        token: "lpu_confess",
        table: "LPU Confess",
        columns: &["S.No", "Link", "Amount", "Status", "Platform"],
        map: lpu_confess,
        accepts: accept_all,
    },
    Category {
        token: "long_term_promotion",
        table: "Long Term Promotion",
        columns: &[
            "Sr.No", "Name", "Platform", "Profile/Channel Link", "Followers", "Number of Reels",
            "Commercials Per Reel",
        ],
        map: long_term_promotion,
        accepts: accept_all,
    },
    Category {
        token: "shoutout",
        table: "Shoutout",
        columns: &[
            "S No.", "Month", "ShortCode", "ID", "Video Link", "Views", "Likes", "Comments",
            "Shares", "Platform",
        ],
        map: shoutout,
        accepts: accept_all,
    },
    Category {
        token: "instaconfluence",
        table: "InstaConfluence",
        columns: &[
            "S.No", "Month", "Name", "Platform", "Link", "Views", "Likes", "Comments", "Share",
            "Followers",
        ],
        map: instaconfluence,
        accepts: accept_all,
    },
    Category {
        token: "diwali_competition",
        table: "Diwali Competition",
        columns: &[
            "Timestamp", "Month", "Email Address", "Name", "Registration Number", "Mobile Number",
            "Type of Content", "Link", "From where you come to know", "shortcode", "ID", "Plays",
            "Likes", "Comments", "Shares", "Points", "Platform",
        ],
        map: diwali_competition,
        accepts: accept_all,
    },
    Category {
        token: "olympics",
        table: "Olympics",
        columns: &[
            "S.No", "Month", "Influencer's Name", "Platform", "Link", "Views", "Likes", "Comments",
            "Share", "Type of Influencer", "Shortcode", "id",
        ],
        map: olympics,
        accepts: accept_all,
    },
    Category {
        token: "digital_star",
        table: "Digital Star",
        columns: &[
            "Timestamp", "Month", "Email Address", "Name", "Registration Number", "Mobile Number",
            "Themes", "Type of Content", "Link (Reel or Post on Instagram)", "shortcode", "ID",
            "Plays", "Likes", "Comments", "Shares", "Platform",
        ],
        map: digital_star,
        accepts: accept_all,
    },
    Category {
        token: "outcampus",
        table: "Outcampus",
        columns: &[
            "S.No", "Month", "Link", "shortcode", "ID", "Views", "Likes", "Comment", "Share",
            "Platform",
        ],
        map: outcampus,
        accepts: accept_all,
    },
];

/// Classify the Instagram Discovered tab into the category tabs.
pub fn run(sheets: &dyn SheetGateway, discovered_tab: &str) -> RunReport {
    let mut report = RunReport::new();
    report.info("Running IG classification");
    match classify_tab(sheets, discovered_tab, &mut report) {
        Ok(()) => report.success("IG classification complete"),
        Err(e) => {
            log::error!("IG classification failed: {}", e);
            report.error(format!("Error: {}", e));
        }
    }
    report
}

fn classify_tab(sheets: &dyn SheetGateway, discovered_tab: &str, report: &mut RunReport) -> Result<()> {
    let table = sheets.read_table(discovered_tab)?;
    let assignment_col = table.find_column(ASSIGNMENT_COLUMNS).ok_or_else(|| {
        Error::Schema(format!(
            "no 'Assignment type' or 'Assigned Type' column in '{}'",
            discovered_tab
        ))
    })?;
    let classified = classify(&table.records(), assignment_col, REGISTRY);
    write_outputs(sheets, &classified, report)
}
