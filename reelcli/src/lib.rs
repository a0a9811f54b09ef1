pub use crate::app::ReelCliApp;

mod app {
    use anyhow::{Context, Result};
    use chrono::{Duration, Utc};
    use log::info;
    use reelsheet_core::cache::CacheEntry;
    use reelsheet_core::config::{load_targets, Paths, Settings, Targets};
    use reelsheet_core::{classify, discovery};
    use reelsheet_core::{
        ApifyInstagram, DiscoveryParams, DryRunSheets, GoogleSheets, RunReport, ScrapeCache,
        SheetGateway, YouTubeApi,
    };
    use std::path::PathBuf;

    pub struct ReelCliApp {
        settings: Settings,
        targets: Targets,
        cache_file: PathBuf,
    }

    impl ReelCliApp {
        pub fn new(config: Option<PathBuf>, cache: Option<PathBuf>) -> Result<Self> {
            let paths = Paths::new()?;
            let targets_file = config.unwrap_or(paths.targets_file);
            let targets = load_targets(&targets_file)?;

            Ok(Self {
                settings: Settings::from_env(),
                targets,
                cache_file: cache.unwrap_or(paths.cache_file),
            })
        }

        pub fn ig_discover(&self, days: u32, cooldown_hours: u32, dry_run: bool) -> Result<RunReport> {
            let params = DiscoveryParams::new(days)?.dry_run(dry_run);
            let ig = &self.targets.instagram;
            let source = ApifyInstagram::new(self.settings.require_apify_token()?.to_string())
                .with_actor(ig.actor_id.clone())
                .with_results_limit(ig.results_limit);
            let mut cache = ScrapeCache::load(&self.cache_file)
                .with_context(|| format!("Failed to load scrape cache {}", self.cache_file.display()))?
                .with_cooldown(Duration::hours(i64::from(cooldown_hours)));

            self.with_sheets(dry_run, |sheets| {
                discovery::instagram::run(sheets, &source, &mut cache, ig, &params)
            })
        }

        pub fn ig_classify(&self, dry_run: bool) -> Result<RunReport> {
            let tab = &self.targets.instagram.discovered_tab;
            self.with_sheets(dry_run, |sheets| classify::instagram::run(sheets, tab))
        }

        pub fn yt_discover(&self, days: u32, dry_run: bool) -> Result<RunReport> {
            let params = DiscoveryParams::new(days)?.dry_run(dry_run);
            let source = self.youtube()?;
            let yt = &self.targets.youtube;
            self.with_sheets(dry_run, |sheets| discovery::youtube::run(sheets, &source, yt, &params))
        }

        pub fn yt_classify(&self, dry_run: bool) -> Result<RunReport> {
            let source = self.youtube()?;
            let tab = &self.targets.youtube.discovered_tab;
            self.with_sheets(dry_run, |sheets| classify::youtube::run(sheets, &source, tab))
        }

        pub fn cache_entries(&self) -> Result<Vec<CacheEntry>> {
            Ok(ScrapeCache::load(&self.cache_file)?.entries())
        }

        /// Drop cache entries not refreshed in `days` days. Returns how many were removed.
        pub fn prune_cache(&self, days: u32) -> Result<usize> {
            let mut cache = ScrapeCache::load(&self.cache_file)?;
            let removed = cache.prune_stale(days, Utc::now())?;
            if removed > 0 {
                cache.save()?;
            }
            info!("Pruned {} scrape cache entries older than {} days", removed, days);
            Ok(removed)
        }

        pub fn cache_file(&self) -> &std::path::Path {
            &self.cache_file
        }

        fn youtube(&self) -> Result<YouTubeApi> {
            Ok(YouTubeApi::new(self.settings.require_youtube_api_key()?.to_string())
                .with_max_results(self.targets.youtube.max_results))
        }

        fn open_sheets(&self) -> Result<GoogleSheets> {
            let key = self.settings.service_account_key()?;
            let sheets = match &self.settings.sheet_id {
                Some(id) => GoogleSheets::open_by_id(key, id.clone()),
                None => GoogleSheets::open(key, self.settings.require_sheet_name()?)?,
            };
            Ok(sheets)
        }

        /// Run a pipeline against the spreadsheet, or against an in-memory
        /// overlay that only prints what would have been written.
        fn with_sheets<F>(&self, dry_run: bool, pipeline: F) -> Result<RunReport>
        where
            F: FnOnce(&dyn SheetGateway) -> RunReport,
        {
            let sheets = self.open_sheets()?;
            if !dry_run {
                return Ok(pipeline(&sheets));
            }

            let overlay = DryRunSheets::new(&sheets);
            let report = pipeline(&overlay);
            for (tab, table) in overlay.pending_writes() {
                println!("== {} ({} rows) ==", tab, table.len());
                for row in table.to_values() {
                    println!("{}", row.join("\t"));
                }
            }
            Ok(report)
        }
    }
}
