use log::{debug, info};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{RawPost, SocialSource, SourceKind};
use crate::error::{Error, Result};
use crate::http::{check, DEFAULT_TIMEOUT, USER_AGENT};
use crate::retry::RetryPolicy;

const BASE_URL: &str = "https://api.apify.com/v2";

/// Actor ID for apify/instagram-scraper.
pub const INSTAGRAM_SCRAPER: &str = "shu8hvrXbJbY3Eb9W";

/// Seconds the API holds a run-status request open waiting for the run to finish.
const WAIT_FOR_FINISH_SECS: u32 = 60;

/// Status requests per run before giving up, about an hour of long-polling.
const MAX_STATUS_POLLS: u32 = 60;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstagramScraperInput {
    pub direct_urls: Vec<String>,
    pub hashtag: String,
    pub results_type: String,
    pub results_limit: u32,
    pub search_type: String,
    pub search_limit: u32,
    pub add_parent_data: bool,
}

impl InstagramScraperInput {
    pub fn for_target(target: &str, kind: SourceKind, results_limit: u32) -> Self {
        let (direct_urls, hashtag, search_type) = match kind {
            SourceKind::Profile => (vec![target.to_string()], String::new(), "user"),
            SourceKind::Hashtag => (Vec::new(), target.trim_start_matches('#').to_string(), "hashtag"),
        };
        Self {
            direct_urls,
            hashtag,
            results_type: "posts".to_string(),
            results_limit,
            search_type: search_type.to_string(),
            search_limit: 1,
            add_parent_data: true,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    data: T,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunData {
    pub id: String,
    pub status: String,
    pub default_dataset_id: String,
}

/// Instagram posts through an Apify actor run: start, long-poll, read the dataset.
pub struct ApifyInstagram {
    token: String,
    actor_id: String,
    results_limit: u32,
    retry: RetryPolicy,
}

impl ApifyInstagram {
    pub fn new(token: String) -> Self {
        Self {
            token,
            actor_id: INSTAGRAM_SCRAPER.to_string(),
            results_limit: 50,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_actor(mut self, actor_id: impl Into<String>) -> Self {
        self.actor_id = actor_id.into();
        self
    }

    pub fn with_results_limit(mut self, limit: u32) -> Self {
        self.results_limit = limit;
        self
    }

    fn start_run(&self, input: &InstagramScraperInput) -> Result<RunData> {
        let url = format!("{}/acts/{}/runs", BASE_URL, self.actor_id);
        let resp = attohttpc::post(&url)
            .bearer_auth(self.token.as_str())
            .header("User-Agent", USER_AGENT)
            .timeout(DEFAULT_TIMEOUT)
            .json(input)?
            .send()?;
        let api_resp: ApiResponse<RunData> = check(resp)?.json()?;
        Ok(api_resp.data)
    }

    fn wait_for_run(&self, run_id: &str) -> Result<RunData> {
        let url = format!("{}/actor-runs/{}", BASE_URL, run_id);
        poll_run(run_id, MAX_STATUS_POLLS, || {
            self.retry.run("apify run status", || {
                let resp = attohttpc::get(&url)
                    .bearer_auth(self.token.as_str())
                    .header("User-Agent", USER_AGENT)
                    .param("waitForFinish", WAIT_FOR_FINISH_SECS)
                    .timeout(DEFAULT_TIMEOUT)
                    .send()?;
                let api_resp: ApiResponse<RunData> = check(resp)?.json()?;
                Ok(api_resp.data)
            })
        })
    }

    fn dataset_items<T: DeserializeOwned>(&self, dataset_id: &str) -> Result<Vec<T>> {
        let url = format!("{}/datasets/{}/items", BASE_URL, dataset_id);
        self.retry.run("apify dataset", || {
            let resp = attohttpc::get(&url)
                .bearer_auth(self.token.as_str())
                .header("User-Agent", USER_AGENT)
                .param("format", "json")
                .param("clean", "true")
                .timeout(DEFAULT_TIMEOUT)
                .send()?;
            Ok(check(resp)?.json()?)
        })
    }

    fn scrape_one(&self, target: &str, kind: SourceKind) -> Result<Vec<RawPost>> {
        let input = InstagramScraperInput::for_target(target, kind, self.results_limit);
        info!("Starting Instagram {} scrape for {}", kind, target);

        // Starting a run is not idempotent, so only the reads below retry.
        let run = self.start_run(&input)?;
        info!("Apify run {} started, polling for completion", run.id);

        let completed = self.wait_for_run(&run.id)?;
        let posts: Vec<RawPost> = self.dataset_items(&completed.default_dataset_id)?;
        info!("Fetched {} posts for {}", posts.len(), target);
        Ok(posts)
    }
}

/// Polls `status` until the run reaches a terminal state or `max_polls` requests are spent.
fn poll_run<F>(run_id: &str, max_polls: u32, mut status: F) -> Result<RunData>
where
    F: FnMut() -> Result<RunData>,
{
    for _ in 0..max_polls {
        let run = status()?;
        match run.status.as_str() {
            "SUCCEEDED" => return Ok(run),
            "FAILED" | "ABORTED" | "TIMED-OUT" => return Err(Error::RunFailed(run.status)),
            _ => debug!("Run {} still in progress ({})", run_id, run.status),
        }
    }
    Err(Error::RunFailed(format!(
        "run {} unfinished after {} status polls",
        run_id, max_polls
    )))
}

impl SocialSource for ApifyInstagram {
    fn fetch(&self, targets: &[String], kind: SourceKind) -> Result<Vec<RawPost>> {
        let mut posts = Vec::new();
        for target in targets {
            posts.extend(self.scrape_one(target, kind)?);
        }
        Ok(posts)
    }
}
