//! End-to-end runs of discovery and classification against an in-memory
//! workbook and scripted connectors.

use chrono::{DateTime, Duration, TimeZone, Utc};
use reelsheet_core::cache::ScrapeCache;
use reelsheet_core::classify;
use reelsheet_core::config::{InstagramTargets, YouTubeTargets};
use reelsheet_core::connectors::{RawPost, RawVideo, SocialSource, SourceKind, VideoSource, VideoStats};
use reelsheet_core::discovery::{self, DiscoveryParams};
use reelsheet_core::report::Severity;
use reelsheet_core::sheets::{MemoryWorkbook, SheetGateway, STAGING_SUFFIX};
use reelsheet_core::{Error, Result, Table};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

const IG_TAB: &str = "Discovered IG Reels";
const YT_TAB: &str = "Discovered Videos";

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 17, 12, 0, 0).unwrap()
}

fn params(days: u32) -> DiscoveryParams {
    DiscoveryParams::at(days, now()).unwrap()
}

fn post(url: &str, ts: &str) -> RawPost {
    RawPost {
        url: Some(url.to_string()),
        owner_username: Some("lpu.vibes".to_string()),
        caption: Some("first week on campus".to_string()),
        timestamp: Some(ts.to_string()),
        likes_count: Some(120),
        comments_count: Some(8),
        video_play_count: Some(4000),
        short_code: Some(url.trim_end_matches('/').rsplit('/').next().unwrap().to_string()),
    }
}

fn table(rows: &[&[&str]]) -> Table {
    Table::from_values(
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect(),
    )
}

/// Social source answering from a script, recording every call.
#[derive(Default)]
struct ScriptedSocial {
    posts: HashMap<String, Vec<RawPost>>,
    failing: HashSet<String>,
    calls: RefCell<Vec<(SourceKind, String)>>,
}

impl ScriptedSocial {
    fn with(mut self, target: &str, posts: Vec<RawPost>) -> Self {
        self.posts.insert(target.to_string(), posts);
        self
    }

    fn failing(mut self, target: &str) -> Self {
        self.failing.insert(target.to_string());
        self
    }
}

impl SocialSource for ScriptedSocial {
    fn fetch(&self, targets: &[String], kind: SourceKind) -> Result<Vec<RawPost>> {
        let mut out = Vec::new();
        for target in targets {
            self.calls.borrow_mut().push((kind, target.clone()));
            if self.failing.contains(target) {
                return Err(Error::Api { status: 500, message: "actor crashed".to_string() });
            }
            out.extend(self.posts.get(target).cloned().unwrap_or_default());
        }
        Ok(out)
    }
}

#[derive(Default)]
struct ScriptedVideos {
    search: HashMap<String, Vec<RawVideo>>,
    stats: HashMap<String, VideoStats>,
    durations: HashMap<String, u64>,
}

impl VideoSource for ScriptedVideos {
    fn search(&self, keyword: &str, _after: DateTime<Utc>) -> Result<Vec<RawVideo>> {
        match self.search.get(keyword) {
            Some(found) => Ok(found.clone()),
            None => Err(Error::Http("connection reset".to_string())),
        }
    }

    fn stats(&self, ids: &[String]) -> Result<HashMap<String, VideoStats>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.stats.get(id).map(|s| (id.clone(), *s)))
            .collect())
    }

    fn durations(&self, ids: &[String]) -> Result<HashMap<String, u64>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.durations.get(id).map(|d| (id.clone(), *d)))
            .collect())
    }
}

/// Gateway that refuses to write one particular tab.
struct RefusingSheets<'a> {
    inner: &'a MemoryWorkbook,
    refuse: String,
}

impl SheetGateway for RefusingSheets<'_> {
    fn read_table(&self, tab: &str) -> Result<Table> {
        self.inner.read_table(tab)
    }

    fn replace_table(&self, tab: &str, table: &Table) -> Result<()> {
        if tab == self.refuse {
            return Err(Error::Api { status: 503, message: "backend unavailable".to_string() });
        }
        self.inner.replace_table(tab, table)
    }

    fn delete_table(&self, tab: &str) -> Result<()> {
        self.inner.delete_table(tab)
    }

    fn rename_table(&self, from: &str, to: &str) -> Result<()> {
        self.inner.rename_table(from, to)
    }

    fn table_names(&self) -> Result<Vec<String>> {
        self.inner.table_names()
    }
}

fn ig_targets(hashtags: &[&str]) -> InstagramTargets {
    InstagramTargets {
        profiles_tab: None,
        hashtags: hashtags.iter().map(|h| h.to_string()).collect(),
        ..InstagramTargets::default()
    }
}

/// Write `token` into the annotation column of every Discovered row.
fn annotate(book: &MemoryWorkbook, tab: &str, tokens: &[&str]) {
    let mut discovered = book.table(tab).unwrap();
    let col = discovered.column_index("Assigned Type").unwrap();
    for (row, token) in discovered.rows.iter_mut().zip(tokens) {
        row[col] = token.to_string();
    }
    book.replace_table(tab, &discovered).unwrap();
}

fn cell<'a>(table: &'a Table, row: usize, column: &str) -> &'a str {
    &table.rows[row][table.column_index(column).unwrap()]
}

// ----------------------------------------------------------------------------
// Instagram discovery
// ----------------------------------------------------------------------------

#[test]
fn discovered_reel_flows_into_its_category_tab() {
    let dir = tempfile::tempdir().unwrap();
    let mut cache = ScrapeCache::load(dir.path().join("scraped_cache.csv")).unwrap();
    let book = MemoryWorkbook::new();
    let source = ScriptedSocial::default().with(
        "#lpu",
        vec![
            post("https://www.instagram.com/reel/AAA/", "2026-10-15T09:00:00.000Z"),
            post("https://www.instagram.com/reel/AAA/", "2026-10-15T09:00:00.000Z"),
            post("https://www.instagram.com/reel/OLD/", "2026-09-01T09:00:00.000Z"),
        ],
    );

    let report = discovery::instagram::run(&book, &source, &mut cache, &ig_targets(&["lpu"]), &params(7));
    assert!(!report.has_errors(), "{:?}", report.lines());

    let discovered = book.table(IG_TAB).unwrap();
    assert_eq!(discovered.len(), 1);
    assert_eq!(cell(&discovered, 0, "Reel URL"), "https://www.instagram.com/reel/AAA/");
    assert_eq!(cell(&discovered, 0, "Date"), "2026-10-15");
    assert_eq!(cell(&discovered, 0, "ShortCode"), "AAA");

    annotate(&book, IG_TAB, &["shoutout"]);
    let report = classify::instagram::run(&book, IG_TAB);
    assert!(!report.has_errors(), "{:?}", report.lines());

    let shoutout = book.table("Shoutout").unwrap();
    assert_eq!(shoutout.len(), 1);
    assert_eq!(cell(&shoutout, 0, "S No."), "1");
    assert_eq!(cell(&shoutout, 0, "Month"), "October-2026");
    assert_eq!(cell(&shoutout, 0, "ShortCode"), "AAA");
    assert_eq!(cell(&shoutout, 0, "Video Link"), "https://www.instagram.com/reel/AAA/");
    assert_eq!(cell(&shoutout, 0, "Platform"), "Instagram");

    let reloaded = ScrapeCache::load(cache.path()).unwrap();
    assert_eq!(reloaded.last_scraped(SourceKind::Hashtag, "#lpu"), Some(now()));
}

#[test]
fn reel_published_exactly_at_the_cutoff_is_kept() {
    let dir = tempfile::tempdir().unwrap();
    let mut cache = ScrapeCache::load(dir.path().join("cache.csv")).unwrap();
    let book = MemoryWorkbook::new();
    let boundary = (now() - Duration::days(7)).to_rfc3339();
    let just_before = (now() - Duration::days(7) - Duration::seconds(1)).to_rfc3339();
    let source = ScriptedSocial::default().with(
        "#lpu",
        vec![
            post("https://www.instagram.com/reel/EDGE/", &boundary),
            post("https://www.instagram.com/reel/LATE/", &just_before),
        ],
    );

    discovery::instagram::run(&book, &source, &mut cache, &ig_targets(&["lpu"]), &params(7));
    let discovered = book.table(IG_TAB).unwrap();
    assert_eq!(discovered.len(), 1);
    assert_eq!(cell(&discovered, 0, "Reel URL"), "https://www.instagram.com/reel/EDGE/");
}

#[test]
fn recently_scraped_sources_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let mut cache = ScrapeCache::load(dir.path().join("cache.csv")).unwrap();
    cache.record_fetch(SourceKind::Hashtag, "#lpu", now() - Duration::hours(1));
    cache.record_fetch(SourceKind::Hashtag, "#lpuhostel", now() - Duration::hours(9));
    let book = MemoryWorkbook::new();
    let source = ScriptedSocial::default();

    let report = discovery::instagram::run(
        &book,
        &source,
        &mut cache,
        &ig_targets(&["lpu", "lpuhostel"]),
        &params(3),
    );

    assert_eq!(*source.calls.borrow(), vec![(SourceKind::Hashtag, "#lpuhostel".to_string())]);
    assert!(report
        .messages(Severity::Info)
        .iter()
        .any(|m| m.contains("Skipped hashtag") && m.contains("#lpu")));
    assert!(book.contains(IG_TAB));
}

#[test]
fn failing_target_is_reported_and_the_run_continues() {
    let dir = tempfile::tempdir().unwrap();
    let mut cache = ScrapeCache::load(dir.path().join("cache.csv")).unwrap();
    let book = MemoryWorkbook::new();
    let source = ScriptedSocial::default()
        .failing("#broken")
        .with("#lpu", vec![post("https://www.instagram.com/reel/OK/", "2026-10-16T00:00:00Z")]);

    let report = discovery::instagram::run(
        &book,
        &source,
        &mut cache,
        &ig_targets(&["broken", "lpu"]),
        &params(7),
    );

    assert!(!report.has_errors());
    assert_eq!(report.count(Severity::Warning), 1);
    assert_eq!(book.table(IG_TAB).unwrap().len(), 1);
    assert!(cache.should_fetch(SourceKind::Hashtag, "#broken", now()));
    assert!(!cache.should_fetch(SourceKind::Hashtag, "#lpu", now()));
}

#[test]
fn profiles_from_the_input_tab_are_scraped_before_hashtags() {
    let dir = tempfile::tempdir().unwrap();
    let mut cache = ScrapeCache::load(dir.path().join("cache.csv")).unwrap();
    let book = MemoryWorkbook::new().with_table(
        "IG Input Pages",
        table(&[
            &["Profile URL"],
            &["https://www.instagram.com/lpu_official/"],
            &["not a link"],
        ]),
    );
    let source = ScriptedSocial::default();
    let targets = InstagramTargets {
        hashtags: vec!["lpu".to_string()],
        ..InstagramTargets::default()
    };

    discovery::instagram::run(&book, &source, &mut cache, &targets, &params(7));

    assert_eq!(
        *source.calls.borrow(),
        vec![
            (SourceKind::Profile, "https://www.instagram.com/lpu_official/".to_string()),
            (SourceKind::Hashtag, "#lpu".to_string()),
        ]
    );
}

#[test]
fn dry_run_leaves_the_cache_file_alone() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.csv");
    let mut cache = ScrapeCache::load(&path).unwrap();
    let book = MemoryWorkbook::new();
    let source = ScriptedSocial::default();

    let report = discovery::instagram::run(
        &book,
        &source,
        &mut cache,
        &ig_targets(&["lpu"]),
        &params(7).dry_run(true),
    );

    assert!(!report.has_errors());
    assert!(!path.exists());
}

#[test]
fn failed_discovered_write_keeps_the_old_tab_and_the_cache_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.csv");
    let mut cache = ScrapeCache::load(&path).unwrap();
    let old = table(&[&["Reel URL"], &["https://www.instagram.com/reel/KEEP/"]]);
    let book = MemoryWorkbook::new().with_table(IG_TAB, old.clone());
    let refusing = RefusingSheets {
        inner: &book,
        refuse: format!("{}{}", IG_TAB, STAGING_SUFFIX),
    };
    let source = ScriptedSocial::default().with(
        "#lpu",
        vec![post("https://www.instagram.com/reel/NEW/", "2026-10-15T09:00:00.000Z")],
    );

    let report = discovery::instagram::run(&refusing, &source, &mut cache, &ig_targets(&["lpu"]), &params(7));

    assert!(report.has_errors(), "{:?}", report.lines());
    assert_eq!(source.calls.borrow().len(), 1);
    assert_eq!(book.table(IG_TAB).unwrap(), old);
    assert!(!path.exists());
    let names = book.table_names().unwrap();
    assert!(names.iter().all(|n| !n.ends_with(STAGING_SUFFIX)), "{:?}", names);
}

#[test]
fn missing_profiles_tab_aborts_without_writing() {
    let dir = tempfile::tempdir().unwrap();
    let mut cache = ScrapeCache::load(dir.path().join("cache.csv")).unwrap();
    let book = MemoryWorkbook::new();
    let source = ScriptedSocial::default();

    let report = discovery::instagram::run(&book, &source, &mut cache, &InstagramTargets::default(), &params(7));

    assert!(report.has_errors());
    assert!(book.snapshot().is_empty());
    assert!(source.calls.borrow().is_empty());
}

// ----------------------------------------------------------------------------
// Instagram classification
// ----------------------------------------------------------------------------

/// A Discovered tab with one fully filled row per token.
fn filled_discovered(tokens: &[&str]) -> Table {
    let columns = discovery::instagram::DISCOVERED_COLUMNS;
    let mut t = Table::with_columns(columns);
    for (i, token) in tokens.iter().enumerate() {
        let row = columns
            .iter()
            .map(|c| match *c {
                "Assigned Type" => token.to_string(),
                "Date" => "2026-10-05".to_string(),
                "Likes" | "Comments" | "Shares" | "Views" => "7".to_string(),
                "Reel URL" => format!("https://www.instagram.com/reel/R{}/", i),
                other => format!("{} {}", other, i),
            })
            .collect();
        t.push_row(row);
    }
    t
}

#[test]
fn every_token_lands_in_its_own_tab_fully_populated() {
    for category in classify::instagram::REGISTRY {
        let messy = format!("  {}  ", category.token.to_uppercase());
        let book = MemoryWorkbook::new().with_table(IG_TAB, filled_discovered(&[messy.as_str()]));

        let report = classify::instagram::run(&book, IG_TAB);
        assert!(!report.has_errors(), "{}: {:?}", category.token, report.lines());

        let names = book.table_names().unwrap();
        assert_eq!(names.len(), 2, "{}: {:?}", category.token, names);
        let out = book.table(category.table).unwrap();
        assert_eq!(out.header, category.columns);
        assert_eq!(out.len(), 1);
        for (column, value) in out.header.iter().zip(&out.rows[0]) {
            assert!(!value.is_empty(), "{} / {} is empty", category.table, column);
        }
    }
}

#[test]
fn classification_is_idempotent() {
    let book = MemoryWorkbook::new().with_table(
        IG_TAB,
        filled_discovered(&["shoutout", "campus_reel", "shoutout", "olympics"]),
    );

    classify::instagram::run(&book, IG_TAB);
    let first = book.snapshot();
    classify::instagram::run(&book, IG_TAB);
    assert_eq!(book.snapshot(), first);
    assert_eq!(first["Shoutout"].len(), 2);
    assert_eq!(cell(&first["Shoutout"], 1, "S No."), "2");
}

#[test]
fn unknown_tokens_are_counted_and_never_written() {
    let book = MemoryWorkbook::new().with_table(IG_TAB, filled_discovered(&["mystery", "shoutout", "", "Mystery "]));

    let report = classify::instagram::run(&book, IG_TAB);

    let warnings = report.messages(Severity::Warning);
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].starts_with("2 rows"), "{}", warnings[0]);
    assert!(warnings[0].contains("mystery"));
    assert_eq!(book.table_names().unwrap(), vec!["Discovered IG Reels", "Shoutout"]);
}

#[test]
fn only_unknown_tokens_write_nothing() {
    let book = MemoryWorkbook::new().with_table(IG_TAB, filled_discovered(&["mystery"]));
    let before = book.snapshot();

    let report = classify::instagram::run(&book, IG_TAB);

    assert!(!report.has_errors());
    assert_eq!(book.snapshot(), before);
}

#[test]
fn missing_assignment_column_is_an_error_and_writes_nothing() {
    let book = MemoryWorkbook::new().with_table(
        IG_TAB,
        table(&[&["Reel URL", "Category"], &["https://www.instagram.com/reel/A/", "shoutout"]]),
    );
    let before = book.snapshot();

    let report = classify::instagram::run(&book, IG_TAB);

    assert!(report.has_errors());
    assert!(report.messages(Severity::Error)[0].contains("Assigned Type"));
    assert_eq!(book.snapshot(), before);
}

#[test]
fn assignment_column_spelling_is_flexible() {
    let book = MemoryWorkbook::new().with_table(
        IG_TAB,
        table(&[
            &["Reel URL", " assignment TYPE ", "Date"],
            &["https://www.instagram.com/reel/A/", "lpu_confess", "2026-10-01"],
        ]),
    );

    let report = classify::instagram::run(&book, IG_TAB);

    assert!(!report.has_errors(), "{:?}", report.lines());
    let confess = book.table("LPU Confess").unwrap();
    assert_eq!(cell(&confess, 0, "Link"), "https://www.instagram.com/reel/A/");
}

#[test]
fn categories_without_rows_keep_their_previous_tab() {
    let old = table(&[&["S.No", "Link"], &["1", "https://old.example/"]]);
    let book = MemoryWorkbook::new()
        .with_table(IG_TAB, filled_discovered(&["shoutout"]))
        .with_table("Campus Reel", old.clone());

    classify::instagram::run(&book, IG_TAB);

    assert_eq!(book.table("Campus Reel").unwrap(), old);
    assert!(book.contains("Shoutout"));
}

#[test]
fn staging_failure_leaves_every_destination_untouched() {
    let old = table(&[&["S.No"], &["old"]]);
    let book = MemoryWorkbook::new()
        .with_table(IG_TAB, filled_discovered(&["campus_reel", "shoutout"]))
        .with_table("Campus Reel", old.clone());
    let refusing = RefusingSheets {
        inner: &book,
        refuse: format!("Shoutout{}", STAGING_SUFFIX),
    };

    let report = classify::instagram::run(&refusing, IG_TAB);

    assert!(report.has_errors());
    assert_eq!(book.table("Campus Reel").unwrap(), old);
    assert!(!book.contains("Shoutout"));
    let names = book.table_names().unwrap();
    assert!(names.iter().all(|n| !n.ends_with(STAGING_SUFFIX)), "{:?}", names);
}

// ----------------------------------------------------------------------------
// YouTube
// ----------------------------------------------------------------------------

fn raw_video(id: &str, published: &str) -> RawVideo {
    RawVideo {
        video_id: id.to_string(),
        channel_title: format!("channel-{}", id),
        title: format!("LPU vlog {}", id),
        published_at: published.to_string(),
    }
}

fn yt_targets(keywords: &[&str]) -> YouTubeTargets {
    YouTubeTargets {
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
        ..YouTubeTargets::default()
    }
}

#[test]
fn video_discovery_dedups_and_joins_statistics() {
    let book = MemoryWorkbook::new();
    let mut source = ScriptedVideos::default();
    source.search.insert(
        "\"LPU Vlog\"".to_string(),
        vec![raw_video("v1", "2026-10-16T10:00:00Z"), raw_video("v2", "2026-10-15T10:00:00Z")],
    );
    source.search.insert(
        "\"Life at LPU\"".to_string(),
        vec![raw_video("v2", "2026-10-15T10:00:00Z"), raw_video("v3", "2026-08-01T10:00:00Z")],
    );
    source.stats.insert("v1".to_string(), VideoStats { views: 1000, likes: 50, comments: 4 });

    let report = discovery::youtube::run(
        &book,
        &source,
        &yt_targets(&["\"LPU Vlog\"", "\"Life at LPU\"", "\"Offline\""]),
        &params(7),
    );

    assert!(!report.has_errors(), "{:?}", report.lines());
    assert_eq!(report.count(Severity::Warning), 1);
    let discovered = book.table(YT_TAB).unwrap();
    assert_eq!(discovered.len(), 2);
    assert_eq!(cell(&discovered, 0, "Video URL"), "https://www.youtube.com/watch?v=v1");
    assert_eq!(cell(&discovered, 0, "Views"), "1000");
    assert_eq!(cell(&discovered, 1, "Video URL"), "https://www.youtube.com/watch?v=v2");
    assert_eq!(cell(&discovered, 1, "Views"), "");
    assert_eq!(cell(&discovered, 1, "Assigned Type"), "");
}

fn yt_discovered(rows: &[(&str, &str)]) -> Table {
    let columns = discovery::youtube::DISCOVERED_COLUMNS;
    let mut t = Table::with_columns(columns);
    for (id, token) in rows {
        t.push_row(
            columns
                .iter()
                .map(|c| match *c {
                    "Video URL" => format!("https://www.youtube.com/watch?v={}", id),
                    "Publish Date" => "2026-10-15T10:00:00Z".to_string(),
                    "Views" => "300".to_string(),
                    "Likes" => "20".to_string(),
                    "Comments" => "5".to_string(),
                    "Assigned Type" => token.to_string(),
                    other => format!("{} {}", other, id),
                })
                .collect(),
        );
    }
    t
}

#[test]
fn shorts_categories_only_take_short_videos() {
    let book = MemoryWorkbook::new().with_table(
        YT_TAB,
        yt_discovered(&[
            ("short", "influencer_commercial"),
            ("long", "influencer_commercial"),
            ("unknown", "Influencer_NonCommercial"),
            ("any", "student"),
            ("cv", "creatorverse"),
        ]),
    );
    let mut source = ScriptedVideos::default();
    source.durations.insert("short".to_string(), 45);
    source.durations.insert("long".to_string(), 300);
    source.durations.insert("any".to_string(), 900);

    let report = classify::youtube::run(&book, &source, YT_TAB);

    assert!(!report.has_errors(), "{:?}", report.lines());
    let commercial = book.table("Youtube Short with Commercials").unwrap();
    assert_eq!(commercial.len(), 1);
    assert_eq!(cell(&commercial, 0, "Instagram Reel/ Youtube shorts"), "https://www.youtube.com/watch?v=short");
    assert_eq!(cell(&commercial, 0, "Total Engagement"), "25");
    assert_eq!(cell(&commercial, 0, "Month"), "Oct");
    assert!(!book.contains("Youtube Short without Commercials"));
    assert_eq!(book.table("Student Youtube Video").unwrap().len(), 1);
    assert_eq!(cell(&book.table("CreatorVerse").unwrap(), 0, "Channel"), "Channel Name cv");
    assert!(report
        .messages(Severity::Warning)
        .iter()
        .any(|m| m.starts_with("2 rows skipped as not eligible")));
}

#[test]
fn video_classification_requires_its_columns() {
    let book = MemoryWorkbook::new().with_table(
        YT_TAB,
        table(&[
            &["Video URL", "Video Title", "Assigned Type"],
            &["https://www.youtube.com/watch?v=a", "t", "student"],
        ]),
    );
    let before = book.snapshot();

    let report = classify::youtube::run(&book, &ScriptedVideos::default(), YT_TAB);

    assert!(report.has_errors());
    assert!(report.messages(Severity::Error)[0].contains("Channel Name"));
    assert_eq!(book.snapshot(), before);
}
