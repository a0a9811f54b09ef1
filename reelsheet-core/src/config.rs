//! Process configuration.
//!
//! Secrets come from the environment (a `.env` file is honoured); search
//! targets and table names come from a TOML file and fall back to built-in
//! defaults when that file does not exist.

use anyhow::Context;
use directories::ProjectDirs;
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::connectors::apify::INSTAGRAM_SCRAPER;
use crate::error::{Error, Result};
use crate::sheets::ServiceAccountKey;

pub const APIFY_TOKEN: &str = "APIFY_TOKEN";
pub const YOUTUBE_API_KEY: &str = "YOUTUBE_API_KEY";
pub const GOOGLE_SERVICE_ACCOUNT: &str = "GOOGLE_SERVICE_ACCOUNT";
pub const GOOGLE_SHEET_NAME: &str = "GOOGLE_SHEET_NAME";
pub const GOOGLE_SHEET_ID: &str = "GOOGLE_SHEET_ID";

/// Where reelsheet keeps its files.
#[derive(Debug, Clone)]
pub struct Paths {
    pub config_dir: PathBuf,
    pub targets_file: PathBuf,
    pub cache_file: PathBuf,
}

impl Paths {
    pub fn new() -> anyhow::Result<Self> {
        let proj_dirs = ProjectDirs::from("com", "reelsheet", "reelsheet")
            .context("Failed to get project directories")?;
        Ok(Self::in_dir(proj_dirs.config_dir()))
    }

    pub fn in_dir(config_dir: &Path) -> Self {
        Self {
            config_dir: config_dir.to_path_buf(),
            targets_file: config_dir.join("targets.toml"),
            cache_file: config_dir.join("scraped_cache.csv"),
        }
    }
}

/// Credentials and spreadsheet identity read from the environment.
///
/// Every value is optional here; a command asks for the ones it needs and
/// gets a configuration error naming the missing variable.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub apify_token: Option<String>,
    pub youtube_api_key: Option<String>,
    pub google_service_account: Option<String>,
    pub sheet_name: Option<String>,
    pub sheet_id: Option<String>,
}

impl Settings {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let settings = Self::from_lookup(|name| std::env::var(name).ok());
        settings.log_keys();
        settings
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        Self {
            apify_token: get(APIFY_TOKEN),
            youtube_api_key: get(YOUTUBE_API_KEY),
            google_service_account: get(GOOGLE_SERVICE_ACCOUNT),
            sheet_name: get(GOOGLE_SHEET_NAME),
            sheet_id: get(GOOGLE_SHEET_ID),
        }
    }

    pub fn require_apify_token(&self) -> Result<&str> {
        require(&self.apify_token, APIFY_TOKEN)
    }

    pub fn require_youtube_api_key(&self) -> Result<&str> {
        require(&self.youtube_api_key, YOUTUBE_API_KEY)
    }

    pub fn require_sheet_name(&self) -> Result<&str> {
        require(&self.sheet_name, GOOGLE_SHEET_NAME)
    }

    /// The service-account key, given either inline as JSON or as a path to a key file.
    pub fn service_account_key(&self) -> Result<ServiceAccountKey> {
        let raw = require(&self.google_service_account, GOOGLE_SERVICE_ACCOUNT)?;
        if raw.starts_with('{') {
            ServiceAccountKey::from_json(raw)
        } else {
            let path = Path::new(raw);
            if !path.exists() {
                return Err(Error::Config(format!(
                    "{} points to {:?}, which does not exist",
                    GOOGLE_SERVICE_ACCOUNT, path
                )));
            }
            ServiceAccountKey::from_file(path)
        }
    }

    fn log_keys(&self) {
        fn preview(val: &Option<String>) -> String {
            match val {
                Some(v) => {
                    let n: usize = v.chars().take(5).map(char::len_utf8).sum();
                    format!("{}...({} chars)", &v[..n], v.len())
                }
                None => "<not set>".to_string(),
            }
        }

        info!("Settings loaded:");
        info!("  {}: {}", APIFY_TOKEN, preview(&self.apify_token));
        info!("  {}: {}", YOUTUBE_API_KEY, preview(&self.youtube_api_key));
        info!(
            "  {}: {}",
            GOOGLE_SERVICE_ACCOUNT,
            if self.google_service_account.is_some() { "<set>" } else { "<not set>" }
        );
        info!("  {}: {}", GOOGLE_SHEET_NAME, self.sheet_name.as_deref().unwrap_or("<not set>"));
    }
}

fn require<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str> {
    value
        .as_deref()
        .ok_or_else(|| Error::Config(format!("{} is not set", name)))
}

/// Search targets and tab names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Targets {
    pub instagram: InstagramTargets,
    pub youtube: YouTubeTargets,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstagramTargets {
    /// Tab whose column A lists extra profile URLs. `None` disables it.
    pub profiles_tab: Option<String>,
    pub profiles: Vec<String>,
    /// Hashtags without the leading `#`.
    pub hashtags: Vec<String>,
    pub results_limit: u32,
    pub actor_id: String,
    pub discovered_tab: String,
}

impl Default for InstagramTargets {
    fn default() -> Self {
        Self {
            profiles_tab: Some("IG Input Pages".to_string()),
            profiles: Vec::new(),
            hashtags: [
                "lpulife",
                "lpuplacements",
                "lovelyprofessionaluniversity",
                "lpuvlogs",
                "lifeatlpu",
                "lpu",
                "lpucampus",
                "lpuhostel",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            results_limit: 50,
            actor_id: INSTAGRAM_SCRAPER.to_string(),
            discovered_tab: "Discovered IG Reels".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct YouTubeTargets {
    pub keywords: Vec<String>,
    pub max_results: u32,
    pub discovered_tab: String,
}

impl Default for YouTubeTargets {
    fn default() -> Self {
        Self {
            keywords: [
                "\"Lovely Professional University\"",
                "\"LPU Campus Tour\"",
                "\"Life at LPU\"",
                "\"LPU Hostel Tour\"",
                "\"LPU Vlog\"",
                "\"LPU Student Review\"",
                "\"Why I chose LPU\"",
                "\"My Experience at LPU\"",
                "\"LPU Placement Story\"",
                "\"Studying at LPU\"",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            max_results: 25,
            discovered_tab: "Discovered Videos".to_string(),
        }
    }
}

/// Load targets from `path`, or the defaults when the file does not exist.
pub fn load_targets(path: &Path) -> anyhow::Result<Targets> {
    if !path.exists() {
        info!("No targets file at {:?}, using built-in defaults", path);
        return Ok(Targets::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read targets file: {}", path.display()))?;
    let targets: Targets = toml::from_str(&content)
        .with_context(|| format!("Failed to parse targets file: {}", path.display()))?;
    info!(
        "Loaded targets from {:?}: {} profiles, {} hashtags, {} keywords",
        path,
        targets.instagram.profiles.len(),
        targets.instagram.hashtags.len(),
        targets.youtube.keywords.len()
    );
    Ok(targets)
}
